//! Generic object contract between the host and a connector.
//!
//! The host drives every synchronized object type through the same small
//! interface: list a page of summaries, load one record, and the three write
//! operations. A connector implements [`ObjectAdapter`] once per object type.

mod error;
mod listing;
mod record;

pub use error::{ObjectError, Result};
pub use listing::{to_canonical_datetime, ListMeta, ListingPage, Pagination, DATETIME_FORMAT};
pub use record::{record_id, ObjectRecord};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// CRUD interface implemented per object type.
#[async_trait]
pub trait ObjectAdapter: Send {
    /// Summary shape of one listed record.
    type Summary: Serialize + Send;

    /// One page of record summaries.
    ///
    /// `filter` is opaque to the host; adapters may ignore it.
    async fn objects_list(
        &self,
        filter: Option<&str>,
        pagination: Option<&Pagination>,
    ) -> Result<ListingPage<Self::Summary>>;

    /// Load one record and make it the current object.
    async fn load(&mut self, object_id: &str) -> Result<ObjectRecord>;

    /// Create a new record from the pending fields.
    async fn create(&mut self) -> Result<String>;

    /// Write pending fields to the current object; returns its id.
    async fn update(&mut self, needed: bool) -> Result<String>;

    /// Delete a record by id.
    async fn delete(&mut self, object_id: &str) -> Result<()>;

    /// Record a field change requested by the host.
    fn set_field(&mut self, name: &str, value: Value);

    /// Id of the current object, `None` when nothing with an id is loaded.
    fn object_identifier(&self) -> Option<String>;
}
