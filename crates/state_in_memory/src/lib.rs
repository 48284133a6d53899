use async_trait::async_trait;
use model::{RecordKey, TimestampRecord};
use state::StoreOperation::{GetRecord, ListRecords, PutRecord};
use state::{RecordStore, StoreError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// A record store held in process memory.
///
/// Failures can be switched on to simulate an unavailable table.
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    records: Arc<Mutex<HashMap<String, TimestampRecord>>>,
    puts: Arc<AtomicUsize>,
    fail_gets: Arc<AtomicBool>,
    fail_puts: Arc<AtomicBool>,
}

impl InMemoryRecordStore {
    /// Number of puts which reached the store, successful or not.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.lock().map(|records| records.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn fail_gets(&self, fail: bool) {
        self.fail_gets.store(fail, Ordering::SeqCst);
    }

    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, TimestampRecord>>, &'static str> {
        self.records.lock().map_err(|_| "record map poisoned")
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn get_record(&self, key: &RecordKey) -> Result<Option<TimestampRecord>, StoreError> {
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(StoreError::backend(&key.record_id, GetRecord, "store unavailable"));
        }

        let records = self
            .lock()
            .map_err(|err| StoreError::backend(&key.record_id, GetRecord, err))?;

        Ok(records
            .get(&key.record_id)
            .filter(|record| record.timestamp == key.timestamp)
            .cloned())
    }

    async fn put_record(&self, record: &TimestampRecord) -> Result<(), StoreError> {
        self.puts.fetch_add(1, Ordering::SeqCst);

        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StoreError::backend(&record.record_id, PutRecord, "store unavailable"));
        }

        self.lock()
            .map_err(|err| StoreError::backend(&record.record_id, PutRecord, err))?
            .insert(record.record_id.clone(), record.clone());

        Ok(())
    }

    async fn list_records(&self) -> Result<Vec<TimestampRecord>, StoreError> {
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(StoreError::backend("*", ListRecords, "store unavailable"));
        }

        let records = self
            .lock()
            .map_err(|err| StoreError::backend("*", ListRecords, err))?;

        Ok(records.values().cloned().collect())
    }
}
