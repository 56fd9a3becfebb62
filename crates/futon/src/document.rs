//! Document contract: identity, revision, validation, lifecycle helpers
//!
//! User-defined document types implement [`Document`] by wiring the four
//! accessors to their own `Option<String>` fields. The serde attributes on
//! those fields define the wire form: `id` serializes as `_id` (with `id`
//! accepted on input), `revision` as `_rev` (with `rev` accepted), absent
//! values omitted, unknown wire fields ignored.
//!
//! ```ignore
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Note {
//!     #[serde(rename = "_id", alias = "id", skip_serializing_if = "Option::is_none")]
//!     id: Option<String>,
//!     #[serde(rename = "_rev", alias = "rev", skip_serializing_if = "Option::is_none")]
//!     revision: Option<String>,
//!     text: String,
//! }
//! ```

use crate::database::Database;
use async_trait::async_trait;
use futon_common::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Capability trait for document types stored in a CouchDB database
///
/// Identity and revision are assigned by the server: `id` on first creation,
/// `revision` on every successful write. The provided lifecycle methods
/// write both back into the document in place, so the caller keeps ownership
/// of the (now-identified) value.
#[async_trait]
pub trait Document: Serialize + DeserializeOwned + Send + Sync {
    /// The server-assigned identity, if this document has been created
    fn id(&self) -> Option<&str>;

    /// Store the server-assigned identity
    fn set_id(&mut self, id: String);

    /// The opaque revision token of the last successful write
    fn revision(&self) -> Option<&str>;

    /// Store the revision token returned by the server
    fn set_revision(&mut self, revision: String);

    /// Validation hook run before every create and update
    ///
    /// The default accepts everything. Implementations reject a pending
    /// write by returning [`futon_common::FutonError::Validation`]; the
    /// operation then aborts before any network call.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Create this document in the given database
    ///
    /// On success the server-assigned id and revision are written back into
    /// the document.
    async fn create(&mut self, database: &Database, batch: bool) -> Result<()> {
        let response = database.create_document(&*self, batch).await?;
        self.set_id(response.id);
        self.set_revision(response.rev);
        Ok(())
    }

    /// Update this document in the given database
    ///
    /// Requires a pre-existing id; fails with
    /// [`futon_common::FutonError::InvalidState`] otherwise. On success the
    /// returned id and revision are written back into the document.
    async fn update(&mut self, database: &Database, batch: bool) -> Result<()> {
        let response = database.update_document(&*self, batch).await?;
        self.set_id(response.id);
        self.set_revision(response.rev);
        Ok(())
    }

    /// Apply an in-place mutation, then update
    async fn update_with<F>(&mut self, database: &Database, batch: bool, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut Self) + Send,
    {
        mutate(self);
        self.update(database, batch).await
    }
}
