//! HTTP client with connection pooling and async operations

use crate::config::HttpClientConfig;
use crate::error::HttpResult;
use crate::response::{from_reqwest, HttpResponse};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// HTTP request methods issued by the CouchDB binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
}

impl HttpMethod {
    /// Returns the method as a string slice
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Connection-pooled async HTTP client
///
/// Cloning is cheap: clones share the same underlying pool.
///
/// # Example
///
/// ```ignore
/// use futon_http::{HttpClient, HttpClientConfig};
///
/// let config = HttpClientConfig::new().timeout_secs(30.0);
/// let client = HttpClient::new(config)?;
/// let response = client.get("http://localhost:5984/_up".parse()?).await?;
/// assert!(response.is_success());
/// ```
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<HttpClientInner>,
}

struct HttpClientInner {
    client: reqwest::Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration
    pub fn new(config: HttpClientConfig) -> HttpResult<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(config.pool_idle_timeout)
            .user_agent(&config.user_agent);

        if config.follow_redirects {
            builder = builder.redirect(reqwest::redirect::Policy::limited(config.max_redirects));
        } else {
            builder = builder.redirect(reqwest::redirect::Policy::none());
        }

        let client = builder.build()?;

        Ok(Self {
            inner: Arc::new(HttpClientInner { client, config }),
        })
    }

    /// Create a client with default configuration
    pub fn default_client() -> HttpResult<Self> {
        Self::new(HttpClientConfig::default())
    }

    /// Execute a request with an optional JSON body
    ///
    /// CouchDB expects a JSON body on some GET endpoints (`_find`), so the
    /// body is accepted for every method rather than just POST/PUT.
    pub async fn execute(
        &self,
        method: HttpMethod,
        url: Url,
        body: Option<Value>,
    ) -> HttpResult<HttpResponse> {
        let start = Instant::now();

        let mut request = match method {
            HttpMethod::Get => self.inner.client.get(url),
            HttpMethod::Head => self.inner.client.head(url),
            HttpMethod::Post => self.inner.client.post(url),
            HttpMethod::Put => self.inner.client.put(url),
        };
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let latency_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(method = %method, status = response.status().as_u16(), latency_ms, "request completed");

        from_reqwest(response, latency_ms).await
    }

    /// Send a GET request
    pub async fn get(&self, url: Url) -> HttpResult<HttpResponse> {
        self.execute(HttpMethod::Get, url, None).await
    }

    /// Send a HEAD request
    pub async fn head(&self, url: Url) -> HttpResult<HttpResponse> {
        self.execute(HttpMethod::Head, url, None).await
    }

    /// Send a POST request with an optional JSON body
    pub async fn post(&self, url: Url, body: Option<Value>) -> HttpResult<HttpResponse> {
        self.execute(HttpMethod::Post, url, body).await
    }

    /// Send a PUT request with an optional JSON body
    pub async fn put(&self, url: Url, body: Option<Value>) -> HttpResult<HttpResponse> {
        self.execute(HttpMethod::Put, url, body).await
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("timeout", &self.inner.config.timeout)
            .field("user_agent", &self.inner.config.user_agent)
            .finish()
    }
}
