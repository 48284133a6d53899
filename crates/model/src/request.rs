use crate::record::{RecordKey, TimestampRecord};
use aws_lambda_events::alb::AlbTargetGroupRequest;
use std::collections::HashMap;

/// Headers set by the load balancer which the handler relies on.
pub const USER_AGENT: &str = "user-agent";
pub const TRACE_ID: &str = "x-amzn-trace-id";
pub const FORWARDED_FOR: &str = "x-forwarded-for";
pub const FORWARDED_PORT: &str = "x-forwarded-port";
pub const FORWARDED_PROTO: &str = "x-forwarded-proto";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    /// Only the methods the function serves are recognised.
    pub fn parse(method: &str) -> Option<Method> {
        match method.to_ascii_uppercase().as_str() {
            "GET" => Some(Method::Get),
            "POST" => Some(Method::Post),
            _ => None,
        }
    }
}

/// The parts of a load balancer event the handler looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundRequest {
    pub method: String,
    pub path: String,
    // Header names are lower-cased
    pub headers: HashMap<String, String>,
}

impl InboundRequest {
    pub fn new(method: &str, path: &str, headers: HashMap<String, String>) -> Self {
        InboundRequest {
            method: method.to_string(),
            path: path.to_string(),
            headers: headers
                .into_iter()
                .map(|(name, value)| (name.to_ascii_lowercase(), value))
                .collect(),
        }
    }

    /// A header value, treating blank values as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }
}

impl From<AlbTargetGroupRequest> for InboundRequest {
    fn from(event: AlbTargetGroupRequest) -> Self {
        let headers: HashMap<String, String> = event
            .headers
            .iter()
            .filter_map(|(name, value)| {
                let value: &str = value.to_str().ok()?;

                Some((name.as_str().to_ascii_lowercase(), value.to_string()))
            })
            .collect();

        InboundRequest {
            method: event.http_method.as_str().to_string(),
            path: event.path.unwrap_or_default(),
            headers,
        }
    }
}

/// A request which carried every forwarded header needed to record a timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub method: Option<Method>,
    pub path: String,
    pub trace_id: String,
    pub client_ip: String,
    pub port: String,
    pub protocol: String,
    pub timestamp: String,
}

impl RequestDescriptor {
    /// Validate the forwarded headers of a request.
    /// Returns `None` if any of them is missing or blank.
    pub fn from_request(request: &InboundRequest, timestamp: String) -> Option<Self> {
        Some(RequestDescriptor {
            method: Method::parse(&request.method),
            path: request.path.clone(),
            trace_id: request.header(TRACE_ID)?.to_string(),
            client_ip: request.header(FORWARDED_FOR)?.to_string(),
            port: request.header(FORWARDED_PORT)?.to_string(),
            protocol: request.header(FORWARDED_PROTO)?.to_string(),
            timestamp,
        })
    }

    pub fn key(&self) -> RecordKey {
        RecordKey::new(&self.trace_id, &self.timestamp)
    }

    /// The record this request would persist.
    pub fn record(&self) -> TimestampRecord {
        TimestampRecord::new(self.key(), &self.client_ip, &self.protocol)
    }
}
