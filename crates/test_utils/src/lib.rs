use aws_lambda_events::alb::AlbTargetGroupRequest;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, TimeZone, Utc};
use model::env::{DB_TABLE, REGION};
use model::request::{FORWARDED_FOR, FORWARDED_PORT, FORWARDED_PROTO, TRACE_ID, USER_AGENT};
use model::{Clock, InboundRequest, RecordKey, TimestampRecord};
use std::collections::HashMap;
use std::env;
use std::sync::Mutex;

/// Test table values
pub const TEST_TABLE: &str = "timestamps";
pub const TEST_REGION: &str = "eu-west-1";

/// Forwarded header values used by default in requests
pub const TEST_TRACE_ID: &str = "Root=1-65f9a1b2-0123456789abcdef01234567";
pub const TEST_CLIENT_IP: &str = "203.0.113.7";
pub const TEST_PORT: &str = "443";
pub const TEST_PROTOCOL: &str = "https";

pub const HEALTH_CHECKER: &str = "ELB-HealthChecker/2.0";

/// The instant a `FixedClock::default()` reports, formatted
pub const TEST_TIMESTAMP: &str = "2024-03-07 09:05:01.000042";

/// A clock which always reports the same instant unless moved.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        FixedClock {
            now: Mutex::new(now),
        }
    }

    /// Move the clock forward by some microseconds.
    pub fn advance_micros(&self, micros: i64) {
        if let Ok(mut now) = self.now.lock() {
            *now += chrono::Duration::microseconds(micros);
        }
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        let now: DateTime<Utc> = Utc
            .with_ymd_and_hms(2024, 3, 7, 9, 5, 1)
            .single()
            .expect("Valid test instant")
            + chrono::Duration::microseconds(42);

        FixedClock::at(now)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|now| *now).unwrap_or_default()
    }
}

/// Every forwarded header the handler requires.
pub fn forwarded_headers() -> HashMap<String, String> {
    [
        (TRACE_ID, TEST_TRACE_ID),
        (FORWARDED_FOR, TEST_CLIENT_IP),
        (FORWARDED_PORT, TEST_PORT),
        (FORWARDED_PROTO, TEST_PROTOCOL),
        (USER_AGENT, "curl/8.4.0"),
    ]
    .iter()
    .map(|&(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// A request carrying every forwarded header.
pub fn forwarded_request(method: &str, path: &str) -> InboundRequest {
    InboundRequest::new(method, path, forwarded_headers())
}

/// A request with one header removed.
pub fn request_without(method: &str, path: &str, missing: &str) -> InboundRequest {
    let mut headers: HashMap<String, String> = forwarded_headers();
    headers.remove(missing);

    InboundRequest::new(method, path, headers)
}

/// The probe sent by the load balancer health checker.
pub fn health_check_request() -> InboundRequest {
    InboundRequest::new(
        "GET",
        "/health",
        HashMap::from([(USER_AGENT.to_string(), HEALTH_CHECKER.to_string())]),
    )
}

/// A raw load balancer event as delivered to the function.
pub fn alb_event(method: &str, path: &str, headers: &HashMap<String, String>) -> AlbTargetGroupRequest {
    let value: serde_json::Value = serde_json::json!({
        "requestContext": {
            "elb": {
                "targetGroupArn": "arn:aws:elasticloadbalancing:eu-west-1:123456789012:targetgroup/timestamps/abc123"
            }
        },
        "httpMethod": method,
        "path": path,
        "queryStringParameters": {},
        "headers": headers,
        "isBase64Encoded": false,
        "body": ""
    });

    serde_json::from_value(value).expect("Test event should deserialize")
}

/// The record `FixedClock::default()` and `forwarded_headers()` produce.
pub fn test_record() -> TimestampRecord {
    TimestampRecord::new(
        RecordKey::new(TEST_TRACE_ID, TEST_TIMESTAMP),
        TEST_CLIENT_IP,
        TEST_PROTOCOL,
    )
}

/// A record as stored in DynamoDB.
pub fn dynamodb_item(record: &TimestampRecord) -> HashMap<String, AttributeValue> {
    HashMap::from([
        ("recordId".to_string(), AttributeValue::S(record.record_id.clone())),
        ("timestamp".to_string(), AttributeValue::S(record.timestamp.clone())),
        ("clientIp".to_string(), AttributeValue::S(record.client_ip.clone())),
        ("protocol".to_string(), AttributeValue::S(record.protocol.clone())),
    ])
}

/// Setup default environment variables used in testing
pub fn setup_default_env() {
    unsafe {
        env::set_var(DB_TABLE, TEST_TABLE);
        env::set_var(REGION, TEST_REGION);
    }
}
