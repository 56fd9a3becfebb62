//! futon: typed async client for CouchDB-compatible document databases
//!
//! The library is a thin binding: it builds URLs, sends JSON over HTTP, and
//! maps error replies to typed errors. Durability, indexing, and consistency
//! are entirely the remote server's business.
//!
//! # Overview
//!
//! - [`Server`]: base URL plus transport; probes and creates databases
//! - [`Database`]: one bound database name; document CRUD, `_find` queries,
//!   batched-write sessions
//! - [`Document`]: capability trait for user-defined document types (identity,
//!   revision, validation hook, create/update helpers)
//! - [`SelectionBuilder`]: typed, accumulate-only builder for declarative
//!   `_find` selectors
//!
//! # Example
//!
//! ```ignore
//! use futon::{Database, Document, Field, Server, SortOrder};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct User {
//!     #[serde(rename = "_id", alias = "id", skip_serializing_if = "Option::is_none")]
//!     id: Option<String>,
//!     #[serde(rename = "_rev", alias = "rev", skip_serializing_if = "Option::is_none")]
//!     revision: Option<String>,
//!     name: String,
//!     age: u32,
//! }
//!
//! impl User {
//!     const AGE: Field<User, u32> = Field::new("age");
//! }
//!
//! impl Document for User {
//!     fn id(&self) -> Option<&str> { self.id.as_deref() }
//!     fn set_id(&mut self, id: String) { self.id = Some(id); }
//!     fn revision(&self) -> Option<&str> { self.revision.as_deref() }
//!     fn set_revision(&mut self, revision: String) { self.revision = Some(revision); }
//! }
//!
//! # async fn run() -> futon::Result<()> {
//! let server = Server::connect("http://localhost:5984")?;
//! let db = server.get_or_create_database("users", None, None).await?;
//!
//! let mut alice = User { id: None, revision: None, name: "alice".into(), age: 30 };
//! alice.create(&db, false).await?;
//!
//! let adults: Vec<User> = db
//!     .find(|q| q.gte(User::AGE, 18u32).sort(User::AGE, SortOrder::Asc))
//!     .await;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod document;
pub mod selector;
pub mod server;

pub use database::{
    Database, DatabaseInfo, DatabaseScope, DbCluster, DocumentUpdateResponse, OperationResponse,
    Sizes,
};
pub use document::Document;
pub use futon_common::{FutonError, Result};
pub use futon_http::{HttpClient, HttpClientConfig};
pub use selector::{Field, FindResponse, Operator, Selection, SelectionBuilder, SortOrder};
pub use server::Server;
