//! Database handle: document CRUD, queries, and batched-write sessions

use crate::document::Document;
use crate::selector::{FindResponse, SelectionBuilder};
use crate::server::Server;
use futon_common::{FutonError, Result};
use futon_http::{HttpMethod, HttpResponse};
use serde::Deserialize;
use std::future::Future;

/// Handle to one named database on a server
///
/// Operations either propagate typed errors (writes, metadata, commits) or
/// deliberately swallow failures into absent results (single-document lookup
/// and queries). See the per-method docs.
#[derive(Debug, Clone)]
pub struct Database {
    server: Server,
    name: String,
}

impl Database {
    pub(crate) fn new(server: Server, name: &str) -> Self {
        Self {
            server,
            name: name.to_string(),
        }
    }

    /// Create the database on the server and return a handle bound to it
    ///
    /// Shard (`q`) and replica (`n`) counts are encoded as query parameters
    /// when provided. A reply with `ok: false` is a [`FutonError::Remote`].
    pub async fn create(
        server: &Server,
        name: &str,
        shards: Option<u32>,
        replicas: Option<u32>,
    ) -> Result<Database> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(q) = shards {
            query.push(("q", q.to_string()));
        }
        if let Some(n) = replicas {
            query.push(("n", n.to_string()));
        }
        let url = server.resolve(&[name], &query);

        let response = server.http().put(url, None).await.map_err(FutonError::from)?;
        if !response.is_success() {
            return Err(remote_error(&response));
        }
        let operation: OperationResponse = response.json_as().map_err(FutonError::from)?;
        if !operation.ok {
            return Err(operation.into_error());
        }

        tracing::debug!(db = name, "database created");
        Ok(Database::new(server.clone(), name))
    }

    /// The database name this handle is bound to
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fetch the server-reported metadata snapshot for this database
    pub async fn get_info(&self) -> Result<DatabaseInfo> {
        let url = self.server.resolve(&[self.name.as_str()], &[]);
        let response = self.server.http().get(url).await.map_err(FutonError::from)?;
        if !response.is_success() {
            return Err(remote_error(&response));
        }
        response.json_as().map_err(FutonError::from)
    }

    /// Create a document in this database
    ///
    /// Runs the document's `validate` hook before anything touches the
    /// network. With `batch` set, the server acknowledges without full
    /// durability; close the session with [`Database::ensure_full_commit`].
    pub async fn create_document<D: Document>(
        &self,
        document: &D,
        batch: bool,
    ) -> Result<DocumentUpdateResponse> {
        document.validate()?;
        let body = serde_json::to_value(document)?;

        let url = self.server.resolve(&[self.name.as_str()], &batch_query(batch));
        let response = self
            .server
            .http()
            .post(url, Some(body))
            .await
            .map_err(FutonError::from)?;
        let update = parse_write_response(response)?;
        tracing::debug!(db = %self.name, id = %update.id, "document created");
        Ok(update)
    }

    /// Update an existing document in this database
    ///
    /// Fails with [`FutonError::InvalidState`] before any network call when
    /// the document carries no identity.
    pub async fn update_document<D: Document>(
        &self,
        document: &D,
        batch: bool,
    ) -> Result<DocumentUpdateResponse> {
        let id = document.id().ok_or_else(|| {
            FutonError::InvalidState("cannot update a document without an id".to_string())
        })?;
        document.validate()?;
        let body = serde_json::to_value(document)?;

        let url = self
            .server
            .resolve(&[self.name.as_str(), id], &batch_query(batch));
        let response = self
            .server
            .http()
            .put(url, Some(body))
            .await
            .map_err(FutonError::from)?;
        parse_write_response(response)
    }

    /// Ask the server to flush pending batched writes to stable storage
    pub async fn ensure_full_commit(&self) -> Result<()> {
        let url = self
            .server
            .resolve(&[self.name.as_str(), "_ensure_full_commit"], &[]);
        let response = self
            .server
            .http()
            .post(url, None)
            .await
            .map_err(FutonError::from)?;
        if !response.is_success() {
            return Err(remote_error(&response));
        }
        Ok(())
    }

    /// Fetch a single document by id
    ///
    /// Best-effort: a 404, a transport failure, and an undecodable body all
    /// come back as `None`. Callers that need to distinguish those cases
    /// should not use this method.
    pub async fn find_by_id<D: Document>(&self, id: &str) -> Option<D> {
        let url = self.server.resolve(&[self.name.as_str(), id], &[]);
        match self.server.http().get(url).await {
            Ok(response) if response.is_success() => response.json_as().ok(),
            Ok(response) => {
                tracing::debug!(db = %self.name, id, status = response.status_code, "lookup missed");
                None
            }
            Err(err) => {
                tracing::debug!(db = %self.name, id, error = %err, "lookup failed");
                None
            }
        }
    }

    /// Run a declarative `_find` query built by the given closure
    ///
    /// Best-effort like [`Database::find_by_id`]: any failure yields an
    /// empty vec.
    pub async fn find<D, F>(&self, build: F) -> Vec<D>
    where
        D: Document,
        F: FnOnce(SelectionBuilder<D>) -> SelectionBuilder<D>,
    {
        let selection = build(SelectionBuilder::new()).build();
        let body = match serde_json::to_value(&selection) {
            Ok(body) => body,
            Err(_) => return Vec::new(),
        };

        let url = self.server.resolve(&[self.name.as_str(), "_find"], &[]);
        let response = match self
            .server
            .http()
            .execute(HttpMethod::Get, url, Some(body))
            .await
        {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                tracing::debug!(db = %self.name, status = response.status_code, "find rejected");
                return Vec::new();
            }
            Err(err) => {
                tracing::debug!(db = %self.name, error = %err, "find failed");
                return Vec::new();
            }
        };

        match response.json_as::<FindResponse<D>>() {
            Ok(result) => result.docs,
            Err(_) => Vec::new(),
        }
    }

    /// Run a sequence of operations as one logical session
    ///
    /// The block's future is driven to completion before `scoped` returns.
    /// With `batch` set, every write issued through the scope handle goes out
    /// in batch mode and exactly one [`Database::ensure_full_commit`] follows
    /// the block. The commit is unconditional: the remote server has no
    /// client-visible transaction boundary, so writes that landed before a
    /// failed operation still need their flush.
    pub async fn scoped<T, F, Fut>(&self, batch: bool, block: F) -> Result<T>
    where
        F: FnOnce(DatabaseScope) -> Fut,
        Fut: Future<Output = T>,
    {
        let scope = DatabaseScope {
            database: self.clone(),
            batch,
        };
        let result = block(scope).await;
        if batch {
            self.ensure_full_commit().await?;
        }
        Ok(result)
    }
}

fn batch_query(batch: bool) -> Vec<(&'static str, String)> {
    if batch {
        vec![("batch", "ok".to_string())]
    } else {
        Vec::new()
    }
}

/// Map a non-success or `ok: false` reply to a typed remote error
fn remote_error(response: &HttpResponse) -> FutonError {
    match response.json_as::<OperationResponse>() {
        Ok(operation) => operation.into_error(),
        Err(_) => FutonError::Remote {
            error: format!("http_{}", response.status_code),
            reason: "no error body".to_string(),
        },
    }
}

fn parse_write_response(response: HttpResponse) -> Result<DocumentUpdateResponse> {
    if !response.is_success() {
        return Err(remote_error(&response));
    }
    let update: DocumentUpdateResponse = response.json_as().map_err(FutonError::from)?;
    if !update.ok {
        return Err(remote_error(&response));
    }
    Ok(update)
}

/// Scope handle passed to the block of [`Database::scoped`]
///
/// Forwards document operations to the bound database with the scope's
/// batch flag applied.
pub struct DatabaseScope {
    database: Database,
    batch: bool,
}

impl DatabaseScope {
    /// The database this scope is bound to
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Whether writes issued through this scope use batch mode
    pub fn is_batch(&self) -> bool {
        self.batch
    }

    /// Create a document with the scope's batch flag
    pub async fn create<D: Document>(&self, document: &mut D) -> Result<()> {
        document.create(&self.database, self.batch).await
    }

    /// Update a document with the scope's batch flag
    pub async fn update<D: Document>(&self, document: &mut D) -> Result<()> {
        document.update(&self.database, self.batch).await
    }

    /// Mutate a document in place, then update it with the scope's batch flag
    pub async fn update_with<D, F>(&self, document: &mut D, mutate: F) -> Result<()>
    where
        D: Document,
        F: FnOnce(&mut D) + Send,
    {
        document.update_with(&self.database, self.batch, mutate).await
    }

    /// Fetch a single document by id
    pub async fn find_by_id<D: Document>(&self, id: &str) -> Option<D> {
        self.database.find_by_id(id).await
    }

    /// Run a declarative `_find` query
    pub async fn find<D, F>(&self, build: F) -> Vec<D>
    where
        D: Document,
        F: FnOnce(SelectionBuilder<D>) -> SelectionBuilder<D>,
    {
        self.database.find(build).await
    }
}

/// Server reply to a database-level operation
#[derive(Debug, Clone, Deserialize)]
pub struct OperationResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl OperationResponse {
    /// Convert an `ok: false` reply into the typed error it describes
    pub fn into_error(self) -> FutonError {
        FutonError::Remote {
            error: self.error.unwrap_or_else(|| "unknown".to_string()),
            reason: self.reason.unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

/// Server reply to a document write
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentUpdateResponse {
    #[serde(default)]
    pub id: String,
    pub ok: bool,
    #[serde(default)]
    pub rev: String,
}

/// Read-only snapshot of server-reported database metadata
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseInfo {
    pub cluster: DbCluster,
    pub compact_running: bool,
    #[serde(rename = "db_name")]
    pub name: String,
    pub disk_format_version: i32,
    #[serde(rename = "doc_count")]
    pub document_count: u64,
    #[serde(rename = "doc_del_count")]
    pub deleted_document_count: u64,
    pub sizes: Sizes,
}

/// Storage topology of a database
#[derive(Debug, Clone, Deserialize)]
pub struct DbCluster {
    #[serde(rename = "n")]
    pub replicas: u32,
    #[serde(rename = "q")]
    pub shards: u32,
    #[serde(rename = "r")]
    pub read_quorum: u32,
    #[serde(rename = "w")]
    pub write_quorum: u32,
}

/// Size counters reported by the server, in bytes
#[derive(Debug, Clone, Deserialize)]
pub struct Sizes {
    pub active: u64,
    pub external: u64,
    pub file: u64,
}
