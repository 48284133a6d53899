use lambda_runtime::tracing;
use model::{RecordKey, TimestampRecord};
use state::{RecordStore, StoreError};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// The result of looking a record up, keeping store failures distinct from a miss.
#[derive(Debug)]
pub enum Lookup {
    Found(TimestampRecord),
    Absent,
    StoreError(StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    // The record was put and read back
    Created(TimestampRecord),
    // A record already existed under the key, nothing was written
    AlreadyExists(TimestampRecord),
}

#[derive(Debug)]
pub enum WriteError {
    // The put itself failed
    PutFailed(StoreError),
    // The put succeeded but the record couldn't be read back
    NotFoundAfterWrite(RecordKey),
}

impl Display for WriteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteError::PutFailed(err) => write!(f, "Unable to put item in DB: {}", err),
            WriteError::NotFoundAfterWrite(key) => {
                write!(f, "Record [{}] not found after write", key.record_id)
            }
        }
    }
}

impl std::error::Error for WriteError {}

/// Get-or-create access to the record store.
///
/// Idempotency is a check-then-act sequence over plain get and put, so two deliveries
/// of the same identity racing each other may both put. Both put identical attributes
/// under the same key, which leaves a single record behind.
#[derive(Clone)]
pub struct RecordAdapter {
    store: Arc<dyn RecordStore>,
}

impl RecordAdapter {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        RecordAdapter { store }
    }

    pub async fn lookup(&self, key: &RecordKey) -> Lookup {
        match self.store.get_record(key).await {
            Ok(Some(record)) => Lookup::Found(record),
            Ok(None) => Lookup::Absent,
            Err(err) => Lookup::StoreError(err),
        }
    }

    /// Fetch a record, treating a store failure as a miss.
    /// A following write under the same key is safe to repeat.
    pub async fn fetch(&self, key: &RecordKey) -> Option<TimestampRecord> {
        match self.lookup(key).await {
            Lookup::Found(record) => Some(record),
            Lookup::Absent => None,
            Lookup::StoreError(err) => {
                tracing::warn!("Treating record [{}] as absent: {}", key.record_id, err);

                None
            }
        }
    }

    /// Write the record unless one already exists under its key.
    pub async fn write_if_absent(&self, record: TimestampRecord) -> Result<WriteOutcome, WriteError> {
        let key: RecordKey = record.key();

        if let Some(existing) = self.fetch(&key).await {
            tracing::info!("Record [{}] already exists", key.record_id);

            return Ok(WriteOutcome::AlreadyExists(existing));
        }

        tracing::info!("Writing timestamp record [{}]", key.record_id);

        self.store.put_record(&record).await.map_err(|err| {
            tracing::error!("Failed to put record [{}]: {}", key.record_id, err);

            WriteError::PutFailed(err)
        })?;

        // Read back to confirm the write landed
        self.fetch(&key)
            .await
            .map(WriteOutcome::Created)
            .ok_or(WriteError::NotFoundAfterWrite(key))
    }

    /// Every stored record ordered by timestamp. Empty if the store can't be read.
    pub async fn list(&self) -> Vec<TimestampRecord> {
        let mut records: Vec<TimestampRecord> = match self.store.list_records().await {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!("Treating record list as empty: {}", err);

                Vec::new()
            }
        };

        records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use state::StoreOperation;
    use state_in_memory::InMemoryRecordStore;
    use test_utils::test_record;

    fn adapter_with(store: &InMemoryRecordStore) -> RecordAdapter {
        RecordAdapter::new(Arc::new(store.clone()))
    }

    /// Accepts puts but never returns anything.
    struct ForgetfulStore;

    #[async_trait]
    impl RecordStore for ForgetfulStore {
        async fn get_record(&self, _: &RecordKey) -> Result<Option<TimestampRecord>, StoreError> {
            Ok(None)
        }

        async fn put_record(&self, _: &TimestampRecord) -> Result<(), StoreError> {
            Ok(())
        }

        async fn list_records(&self) -> Result<Vec<TimestampRecord>, StoreError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn lookup_keeps_store_errors_distinct() {
        let store: InMemoryRecordStore = InMemoryRecordStore::default();
        let adapter: RecordAdapter = adapter_with(&store);

        assert!(matches!(adapter.lookup(&test_record().key()).await, Lookup::Absent));

        store.fail_gets(true);

        match adapter.lookup(&test_record().key()).await {
            Lookup::StoreError(err) => assert_eq!(StoreOperation::GetRecord, err.operation),
            other => panic!("Expected a store error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn fetch_treats_store_error_as_absent() {
        let store: InMemoryRecordStore = InMemoryRecordStore::default();
        let adapter: RecordAdapter = adapter_with(&store);

        adapter
            .write_if_absent(test_record())
            .await
            .expect("Write should succeed");
        store.fail_gets(true);

        assert_eq!(None, adapter.fetch(&test_record().key()).await);
    }

    #[tokio::test]
    async fn write_if_absent_creates_then_reuses() {
        let store: InMemoryRecordStore = InMemoryRecordStore::default();
        let adapter: RecordAdapter = adapter_with(&store);

        let first: WriteOutcome = adapter
            .write_if_absent(test_record())
            .await
            .expect("First write should succeed");
        let second: WriteOutcome = adapter
            .write_if_absent(test_record())
            .await
            .expect("Second write should succeed");

        assert_eq!(WriteOutcome::Created(test_record()), first);
        assert_eq!(WriteOutcome::AlreadyExists(test_record()), second);
        assert_eq!(1, store.put_count());
        assert_eq!(1, store.len());
    }

    #[tokio::test]
    async fn write_if_absent_surfaces_put_failure() {
        let store: InMemoryRecordStore = InMemoryRecordStore::default();
        store.fail_puts(true);

        let result: Result<WriteOutcome, WriteError> =
            adapter_with(&store).write_if_absent(test_record()).await;

        match result {
            Err(WriteError::PutFailed(err)) => assert_eq!(StoreOperation::PutRecord, err.operation),
            other => panic!("Expected a put failure, got {:?}", other),
        }
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn write_if_absent_writes_when_existence_is_unknown() {
        let store: InMemoryRecordStore = InMemoryRecordStore::default();
        store.fail_gets(true);

        let result: Result<WriteOutcome, WriteError> =
            adapter_with(&store).write_if_absent(test_record()).await;

        // The put lands, but it can't be confirmed while reads are failing
        assert!(matches!(result, Err(WriteError::NotFoundAfterWrite(_))));
        assert_eq!(1, store.put_count());
        assert_eq!(1, store.len());
    }

    #[tokio::test]
    async fn write_if_absent_reports_missing_read_back() {
        let adapter: RecordAdapter = RecordAdapter::new(Arc::new(ForgetfulStore));

        let result: Result<WriteOutcome, WriteError> = adapter.write_if_absent(test_record()).await;

        match result {
            Err(WriteError::NotFoundAfterWrite(key)) => assert_eq!(test_record().key(), key),
            other => panic!("Expected not found after write, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn list_orders_by_timestamp() {
        let store: InMemoryRecordStore = InMemoryRecordStore::default();
        let adapter: RecordAdapter = adapter_with(&store);

        let later: TimestampRecord =
            TimestampRecord::new(RecordKey::new("b", "2024-03-07 09:05:02.000000"), "10.0.0.2", "http");
        let earlier: TimestampRecord =
            TimestampRecord::new(RecordKey::new("a", "2024-03-07 09:05:01.000000"), "10.0.0.1", "https");

        for record in [later.clone(), earlier.clone()] {
            adapter.write_if_absent(record).await.expect("Write should succeed");
        }

        assert_eq!(vec![earlier, later], adapter.list().await);
    }

    #[tokio::test]
    async fn list_is_empty_when_store_fails() {
        let store: InMemoryRecordStore = InMemoryRecordStore::default();
        let adapter: RecordAdapter = adapter_with(&store);

        adapter
            .write_if_absent(test_record())
            .await
            .expect("Write should succeed");
        store.fail_gets(true);

        assert!(adapter.list().await.is_empty());
    }
}
