//! Storage seam for unique devices counts.
//!
//! A store executes a planned [`RangeQuery`] and hands back a cursor over the
//! matching rows. Each cursor item is either a decoded row, a per-row decode
//! failure the caller may skip, or a terminal [`StoreError`] after which the
//! cursor yields nothing useful.

use crate::query::RangeQuery;
use async_trait::async_trait;
use futures::stream::BoxStream;

pub mod cassandra;
#[cfg(test)]
pub mod memory;

pub use cassandra::CassandraStore;
#[cfg(test)]
pub use memory::MemoryStore;

/// The value columns of one stored count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceRow {
    pub timestamp: String,
    pub devices: u64,
    pub offset: u64,
    pub underestimate: u64,
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("could not establish storage session: {0}")]
    Session(String),

    #[error("{0}")]
    Query(String),

    #[error("{0}")]
    Stream(String),
}

/// A single row that could not be turned into a [`DeviceRow`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("could not decode row: {0}")]
pub struct RowDecodeError(pub String);

pub type DecodedRow = Result<DeviceRow, RowDecodeError>;

pub type RowCursor = BoxStream<'static, Result<DecodedRow, StoreError>>;

#[async_trait]
pub trait DeviceStore: Send + Sync {
    /// Submits the query. Errors here mean nothing was scanned.
    async fn query(&self, query: &RangeQuery) -> Result<RowCursor, StoreError>;

    fn is_ready(&self) -> bool {
        true
    }
}
