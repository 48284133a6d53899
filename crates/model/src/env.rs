/// Environment variable containing the DynamoDB table name
pub const DB_TABLE: &'static str = "DB_TABLE";
/// Environment variable containing the region of the table
pub const REGION: &'static str = "REGION";
/// Optional override of the DynamoDB endpoint, e.g. for a local table
pub const DB_ENDPOINT_URL: &'static str = "DB_ENDPOINT_URL";
/// Optional `true`/`false` toggle for strongly consistent reads, defaults to `true`
pub const DB_CONSISTENT_READ: &'static str = "DB_CONSISTENT_READ";
