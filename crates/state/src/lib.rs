use async_trait::async_trait;
use model::{Error, RecordKey, TimestampRecord};
use std::fmt::{Debug, Display, Formatter};

/// The durable table timestamps are written to.
///
/// Implementations only offer plain get and put.
/// Idempotency is layered on top by the caller.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// `Ok(None)` when no record exists for the key. Not finding a record is not an error.
    async fn get_record(&self, key: &RecordKey) -> Result<Option<TimestampRecord>, StoreError>;

    async fn put_record(&self, record: &TimestampRecord) -> Result<(), StoreError>;

    /// Every record in the table, in no particular order.
    async fn list_records(&self) -> Result<Vec<TimestampRecord>, StoreError>;
}

/// Errors arising from the underlying store.
#[derive(Debug)]
pub struct StoreError {
    pub key: String,

    pub operation: StoreOperation,
    pub reason: StoreErrorReason,
}

#[derive(Debug)]
pub enum StoreErrorReason {
    // The stored item couldn't be mapped to or from a record
    BadState(String),
    // An error from the underlying store
    BackendFailure(Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    GetRecord,
    PutRecord,
    ListRecords,
}

impl StoreError {
    pub fn new(key: String, operation: StoreOperation, reason: StoreErrorReason) -> Self {
        StoreError {
            key,
            operation,
            reason,
        }
    }

    pub fn backend(key: &str, operation: StoreOperation, err: impl Into<Error>) -> Self {
        StoreError::new(
            key.to_string(),
            operation,
            StoreErrorReason::BackendFailure(err.into()),
        )
    }
}

impl Display for StoreErrorReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreErrorReason::BadState(detail) => write!(f, "bad state: {}", detail),
            StoreErrorReason::BackendFailure(err) => write!(f, "{}", err),
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} failed for [{}]: {}", self.operation, self.key, self.reason)
    }
}

impl std::error::Error for StoreError {}
