use model::{ContentType, ResponseEnvelope, TimestampRecord};
use serde_json::{Value, json};

/// Page served for the home page and health checks.
pub const WELCOME_PAGE: &str = "<html><head><title>writeDB</title><style>html, body {margin: 0; padding: 0;font-family: arial; \
font-weight: 700; font-size: 3em; text-align: center;}</style></head><body><p>Welcome to HomePage</p></body></html>";

const BAD_REQUEST: &str =
    "Bad Request, Server is unable to understand the request. No timestamp has been recorded yet.";
const NOT_FOUND: &str = "Requested Resource is not found. No timestamp is recorded yet.";

/// Everything a request can end in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    HealthOk,
    Welcome,
    BadRequest,
    NotFound,
    // No route serves the path
    RouteNotFound { path: String },
    // The path is served, but not for this method
    MethodNotAllowed { method: String, path: String },
    ServerError(String),
    Created(TimestampRecord),
    AlreadyExists(TimestampRecord),
    Record(TimestampRecord),
    Records(Vec<TimestampRecord>),
}

impl Outcome {
    pub fn status_code(&self) -> u16 {
        match self {
            Outcome::HealthOk | Outcome::Welcome => 200,
            Outcome::AlreadyExists(_) | Outcome::Record(_) | Outcome::Records(_) => 200,
            Outcome::Created(_) => 201,
            Outcome::BadRequest => 400,
            Outcome::NotFound | Outcome::RouteNotFound { .. } => 404,
            Outcome::MethodNotAllowed { .. } => 405,
            Outcome::ServerError(_) => 500,
        }
    }

    pub fn into_response(self) -> ResponseEnvelope {
        let status_code: u16 = self.status_code();

        match self {
            Outcome::HealthOk | Outcome::Welcome => {
                ResponseEnvelope::new(status_code, ContentType::Html, WELCOME_PAGE)
            }
            Outcome::BadRequest => json_response(status_code, error_body(BAD_REQUEST)),
            Outcome::NotFound => json_response(status_code, error_body(NOT_FOUND)),
            Outcome::RouteNotFound { path } => json_response(
                status_code,
                error_body(&format!("No resource is served at {}.", path)),
            ),
            Outcome::MethodNotAllowed { method, path } => json_response(
                status_code,
                error_body(&format!("Method {} is not allowed on {}.", method, path)),
            ),
            Outcome::ServerError(detail) => json_response(
                status_code,
                error_body(&format!("Unable to put item in DB: {}", detail)),
            ),
            Outcome::Created(record) | Outcome::AlreadyExists(record) | Outcome::Record(record) => {
                json_response(status_code, record_body(&record))
            }
            Outcome::Records(records) => json_response(
                status_code,
                Value::Array(records.iter().map(record_body).collect()),
            ),
        }
    }
}

fn json_response(status_code: u16, body: Value) -> ResponseEnvelope {
    ResponseEnvelope::new(status_code, ContentType::Json, &body.to_string())
}

fn error_body(message: &str) -> Value {
    json!({ "error": message })
}

fn record_body(record: &TimestampRecord) -> Value {
    json!({
        "recordId": record.record_id,
        "timestamp": record.timestamp,
        "clientIp": record.client_ip,
        "protocol": record.protocol,
    })
}
