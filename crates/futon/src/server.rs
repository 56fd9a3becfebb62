//! Server handle: base URL, transport, and database lifecycle

use crate::database::Database;
use futon_common::{FutonError, Result};
use futon_http::{HttpClient, HttpError};
use url::Url;

/// Handle to a CouchDB-compatible server
///
/// Holds the base URL and the HTTP client. Cloning is cheap; clones share
/// the same connection pool.
#[derive(Debug, Clone)]
pub struct Server {
    base: Url,
    http: HttpClient,
}

impl Server {
    /// Default server address of a local CouchDB instance
    pub const DEFAULT_URL: &'static str = "http://localhost:5984";

    /// Connect to the given base URL with a default HTTP client
    pub fn connect(url: &str) -> Result<Self> {
        let http = HttpClient::default_client().map_err(FutonError::from)?;
        Self::with_client(url, http)
    }

    /// Connect to the given base URL with a caller-supplied HTTP client
    pub fn with_client(url: &str, http: HttpClient) -> Result<Self> {
        let base = Url::parse(url).map_err(|e| FutonError::from(HttpError::from(e)))?;
        if base.cannot_be_a_base() {
            return Err(FutonError::Transport(format!(
                "URL cannot serve as a base: {}",
                base
            )));
        }
        Ok(Self { base, http })
    }

    /// The base URL this handle points at
    pub fn url(&self) -> &Url {
        &self.base
    }

    pub(crate) fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Resolve a server-relative path into an absolute request URL
    ///
    /// Blank segments are filtered and no duplicate separators are produced,
    /// regardless of whether the base URL carries a trailing slash or a
    /// sub-path of its own.
    pub(crate) fn resolve(&self, segments: &[&str], query: &[(&str, String)]) -> Url {
        let mut url = self.base.clone();
        // cannot_be_a_base URLs are rejected at construction time
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments.iter().filter(|s| !s.trim().is_empty()));
        }
        for (name, value) in query {
            url.query_pairs_mut().append_pair(name, value);
        }
        url
    }

    /// Best-effort existence probe for a database
    ///
    /// Returns true only when the server answers the HEAD request with 200.
    /// Transport failures and every other status yield false.
    pub async fn contains_database(&self, name: &str) -> bool {
        let url = self.resolve(&[name], &[]);
        match self.http.head(url).await {
            Ok(response) => response.status_code == 200,
            Err(err) => {
                tracing::debug!(db = name, error = %err, "existence probe failed");
                false
            }
        }
    }

    /// Bind a handle to an existing database, creating it when absent
    ///
    /// Two concurrent callers may both attempt creation; the server's own
    /// semantics govern that race.
    pub async fn get_or_create_database(
        &self,
        name: &str,
        shards: Option<u32>,
        replicas: Option<u32>,
    ) -> Result<Database> {
        if self.contains_database(name).await {
            Ok(self.database(name))
        } else {
            Database::create(self, name, shards, replicas).await
        }
    }

    /// Bind a handle to a database without probing for its existence
    pub fn database(&self, name: &str) -> Database {
        Database::new(self.clone(), name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_server(base: &str) -> Server {
        Server::connect(base).unwrap()
    }

    #[test]
    fn test_rejects_non_base_url() {
        assert!(Server::connect("mailto:admin@example.com").is_err());
        assert!(Server::connect("not a url").is_err());
    }

    #[test]
    fn test_resolve_appends_segments() {
        let server = test_server("http://localhost:5984");
        let url = server.resolve(&["accounts", "doc-1"], &[]);
        assert_eq!(url.as_str(), "http://localhost:5984/accounts/doc-1");
    }

    #[test]
    fn test_resolve_filters_blank_segments() {
        let server = test_server("http://localhost:5984");
        let url = server.resolve(&["accounts", "", "  ", "doc-1"], &[]);
        assert_eq!(url.as_str(), "http://localhost:5984/accounts/doc-1");
    }

    #[test]
    fn test_resolve_no_duplicate_separators() {
        let server = test_server("http://localhost:5984/");
        let url = server.resolve(&["accounts"], &[]);
        assert_eq!(url.as_str(), "http://localhost:5984/accounts");
    }

    #[test]
    fn test_resolve_preserves_base_sub_path() {
        let server = test_server("http://proxy.local/couch/");
        let url = server.resolve(&["accounts"], &[]);
        assert_eq!(url.as_str(), "http://proxy.local/couch/accounts");
    }

    #[test]
    fn test_resolve_appends_query_parameters() {
        let server = test_server("http://localhost:5984");
        let url = server.resolve(&["accounts"], &[("q", "8".to_string()), ("n", "3".to_string())]);
        assert_eq!(url.as_str(), "http://localhost:5984/accounts?q=8&n=3");
    }
}
