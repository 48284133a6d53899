use async_trait::async_trait;
use aws_sdk_dynamodb::config::http::HttpResponse;
use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::operation::get_item::{GetItemError, GetItemOutput};
use aws_sdk_dynamodb::operation::put_item::{PutItemError, PutItemOutput};
use aws_sdk_dynamodb::operation::scan::ScanOutput;
use aws_sdk_dynamodb::types::AttributeValue;
use model::record::{RECORD_ID, TIMESTAMP};
use model::{RecordKey, TimestampRecord};
use state::StoreErrorReason::BadState;
use state::StoreOperation::{GetRecord, ListRecords, PutRecord};
use state::{RecordStore, StoreError};
use std::collections::HashMap;

type Item = HashMap<String, AttributeValue>;

/// Records kept in a DynamoDB table keyed by `recordId` with `timestamp` as range key.
pub struct DynamoDbRecordStore {
    table_name: String,
    dynamodb_client: aws_sdk_dynamodb::Client,
    consistent_read: bool,
}

impl DynamoDbRecordStore {
    pub fn new(dynamodb_client: aws_sdk_dynamodb::Client, table_name: String) -> Self {
        DynamoDbRecordStore {
            table_name,
            dynamodb_client,
            consistent_read: true,
        }
    }

    /// Eventually consistent reads may miss a record straight after it was put.
    pub fn with_consistent_read(mut self, consistent_read: bool) -> Self {
        self.consistent_read = consistent_read;
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

#[async_trait]
impl RecordStore for DynamoDbRecordStore {
    async fn get_record(&self, key: &RecordKey) -> Result<Option<TimestampRecord>, StoreError> {
        let output: GetItemOutput = self.get_item(key).await.map_err(|err| {
            StoreError::backend(&key.record_id, GetRecord, DisplayErrorContext(&err).to_string())
        })?;

        output
            .item
            .map(|item| to_record(&key.record_id, GetRecord, item))
            .transpose()
    }

    async fn put_record(&self, record: &TimestampRecord) -> Result<(), StoreError> {
        let item: Item = serde_dynamo::to_item(record).map_err(|err| {
            StoreError::new(record.record_id.clone(), PutRecord, BadState(err.to_string()))
        })?;

        self.put_item(item).await.map_err(|err| {
            StoreError::backend(&record.record_id, PutRecord, DisplayErrorContext(&err).to_string())
        })?;

        Ok(())
    }

    async fn list_records(&self) -> Result<Vec<TimestampRecord>, StoreError> {
        let mut records: Vec<TimestampRecord> = Vec::new();
        let mut start_key: Option<Item> = None;

        // Follow scan pages until the table is exhausted
        loop {
            let output: ScanOutput = self
                .dynamodb_client
                .scan()
                .table_name(&self.table_name)
                .consistent_read(self.consistent_read)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|err| {
                    StoreError::backend(
                        &self.table_name,
                        ListRecords,
                        DisplayErrorContext(&err).to_string(),
                    )
                })?;

            for item in output.items.unwrap_or_default() {
                records.push(to_record(&self.table_name, ListRecords, item)?);
            }

            match output.last_evaluated_key {
                Some(last_key) if !last_key.is_empty() => start_key = Some(last_key),
                _ => break,
            }
        }

        Ok(records)
    }
}

impl DynamoDbRecordStore {
    async fn get_item(
        &self,
        key: &RecordKey,
    ) -> Result<GetItemOutput, SdkError<GetItemError, HttpResponse>> {
        let key: Item = HashMap::from([
            (RECORD_ID.to_string(), AttributeValue::S(key.record_id.clone())),
            (TIMESTAMP.to_string(), AttributeValue::S(key.timestamp.clone())),
        ]);

        self.dynamodb_client
            .get_item()
            .table_name(&self.table_name)
            .consistent_read(self.consistent_read)
            .set_key(Some(key))
            .send()
            .await
    }

    async fn put_item(
        &self,
        item: Item,
    ) -> Result<PutItemOutput, SdkError<PutItemError, HttpResponse>> {
        self.dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
    }
}

fn to_record(
    key: &str,
    operation: state::StoreOperation,
    item: Item,
) -> Result<TimestampRecord, StoreError> {
    serde_dynamo::from_item(item)
        .map_err(|err| StoreError::new(key.to_string(), operation, BadState(err.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::types::error::ResourceNotFoundException;
    use aws_smithy_mocks::{RuleMode, mock, mock_client};
    use state::StoreErrorReason;
    use model::HandlerConfig;
    use test_utils::{TEST_TABLE, dynamodb_item, setup_default_env, test_record};

    #[tokio::test]
    async fn get_record_reads_item_by_composite_key() {
        let record: TimestampRecord = test_record();
        let expected_id: String = record.record_id.clone();
        let item: Item = dynamodb_item(&record);

        let get_rule = mock!(aws_sdk_dynamodb::Client::get_item)
            .match_requests(move |req| {
                let key = req.key().cloned().unwrap_or_default();

                req.table_name() == Some(TEST_TABLE)
                    && req.consistent_read() == Some(true)
                    && key.get(RECORD_ID) == Some(&AttributeValue::S(expected_id.clone()))
                    && key.contains_key(TIMESTAMP)
            })
            .then_output(move || GetItemOutput::builder().set_item(Some(item.clone())).build());

        let client = mock_client!(aws_sdk_dynamodb, RuleMode::MatchAny, [&get_rule]);
        let store: DynamoDbRecordStore = DynamoDbRecordStore::new(client, TEST_TABLE.to_string());

        let stored: Option<TimestampRecord> = store
            .get_record(&record.key())
            .await
            .expect("Get should succeed");

        assert_eq!(Some(record), stored);
    }

    #[tokio::test]
    async fn get_record_without_item_is_absent() {
        let get_rule = mock!(aws_sdk_dynamodb::Client::get_item)
            .then_output(|| GetItemOutput::builder().build());

        let client = mock_client!(aws_sdk_dynamodb, RuleMode::MatchAny, [&get_rule]);
        let store: DynamoDbRecordStore = DynamoDbRecordStore::new(client, TEST_TABLE.to_string());

        let stored: Option<TimestampRecord> = store
            .get_record(&test_record().key())
            .await
            .expect("Get should succeed");

        assert_eq!(None, stored);
    }

    #[tokio::test]
    async fn get_record_rejects_malformed_item() {
        let get_rule = mock!(aws_sdk_dynamodb::Client::get_item).then_output(|| {
            GetItemOutput::builder()
                .item(RECORD_ID, AttributeValue::S("only-a-key".to_string()))
                .build()
        });

        let client = mock_client!(aws_sdk_dynamodb, RuleMode::MatchAny, [&get_rule]);
        let store: DynamoDbRecordStore = DynamoDbRecordStore::new(client, TEST_TABLE.to_string());

        let err: StoreError = store
            .get_record(&test_record().key())
            .await
            .expect_err("Item is missing attributes");

        assert_eq!(GetRecord, err.operation);
        assert!(matches!(err.reason, StoreErrorReason::BadState(_)));
    }

    #[tokio::test]
    async fn put_record_writes_all_attributes() {
        let record: TimestampRecord = test_record();
        let expected: Item = dynamodb_item(&record);

        let put_rule = mock!(aws_sdk_dynamodb::Client::put_item)
            .match_requests(move |req| {
                req.table_name() == Some(TEST_TABLE) && req.item() == Some(&expected)
            })
            .then_output(|| PutItemOutput::builder().build());

        let client = mock_client!(aws_sdk_dynamodb, RuleMode::MatchAny, [&put_rule]);
        let store: DynamoDbRecordStore = DynamoDbRecordStore::new(client, TEST_TABLE.to_string());

        store.put_record(&record).await.expect("Put should succeed");
    }

    #[tokio::test]
    async fn put_record_surfaces_service_error() {
        let put_rule = mock!(aws_sdk_dynamodb::Client::put_item).then_error(|| {
            PutItemError::ResourceNotFoundException(
                ResourceNotFoundException::builder()
                    .message("Requested resource not found")
                    .build(),
            )
        });

        let client = mock_client!(aws_sdk_dynamodb, RuleMode::MatchAny, [&put_rule]);
        let store: DynamoDbRecordStore = DynamoDbRecordStore::new(client, TEST_TABLE.to_string());

        let err: StoreError = store
            .put_record(&test_record())
            .await
            .expect_err("Put should fail");

        assert_eq!(PutRecord, err.operation);
        assert!(matches!(err.reason, StoreErrorReason::BackendFailure(_)));
        assert!(err.to_string().contains("Requested resource not found"));
    }

    #[tokio::test]
    async fn list_records_follows_scan_pages() {
        let first: TimestampRecord = test_record();
        let mut second: TimestampRecord = test_record();
        second.record_id = "second".to_string();

        let first_item: Item = dynamodb_item(&first);
        let second_item: Item = dynamodb_item(&second);
        let last_key: Item = HashMap::from([(
            RECORD_ID.to_string(),
            AttributeValue::S(first.record_id.clone()),
        )]);

        let first_page = mock!(aws_sdk_dynamodb::Client::scan)
            .match_requests(|req| req.exclusive_start_key().is_none())
            .then_output(move || {
                ScanOutput::builder()
                    .items(first_item.clone())
                    .set_last_evaluated_key(Some(last_key.clone()))
                    .build()
            });
        let second_page = mock!(aws_sdk_dynamodb::Client::scan)
            .match_requests(|req| req.exclusive_start_key().is_some())
            .then_output(move || ScanOutput::builder().items(second_item.clone()).build());

        let client = mock_client!(
            aws_sdk_dynamodb,
            RuleMode::MatchAny,
            [&first_page, &second_page]
        );
        let store: DynamoDbRecordStore = DynamoDbRecordStore::new(client, TEST_TABLE.to_string());

        let records: Vec<TimestampRecord> =
            store.list_records().await.expect("List should succeed");

        assert_eq!(vec![first, second], records);
    }

    #[tokio::test]
    async fn store_writes_to_table_from_environment() {
        setup_default_env();

        let config: HandlerConfig = HandlerConfig::from_env().expect("Config should parse");

        let put_rule = mock!(aws_sdk_dynamodb::Client::put_item)
            .match_requests(|req| req.table_name() == Some(TEST_TABLE))
            .then_output(|| PutItemOutput::builder().build());

        let client = mock_client!(aws_sdk_dynamodb, RuleMode::MatchAny, [&put_rule]);
        let store: DynamoDbRecordStore = DynamoDbRecordStore::new(client, config.table_name)
            .with_consistent_read(config.consistent_read);

        assert_eq!(TEST_TABLE, store.table_name());
        store.put_record(&test_record()).await.expect("Put should succeed");
    }
}
