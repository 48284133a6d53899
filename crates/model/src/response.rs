use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const CONTENT_TYPE: &str = "Content-Type";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Html,
    Json,
}

impl ContentType {
    pub fn mime(&self) -> &'static str {
        match self {
            ContentType::Html => "text/html",
            ContentType::Json => "application/json",
        }
    }
}

/// The response returned to the load balancer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status_code: u16,
    pub status_description: String,
    pub is_base64_encoded: bool,
    pub body: String,
    pub headers: BTreeMap<String, String>,
}

impl ResponseEnvelope {
    pub fn new(status_code: u16, content_type: ContentType, body: &str) -> Self {
        ResponseEnvelope {
            status_code,
            status_description: status_description(status_code),
            is_base64_encoded: false,
            body: format!("{}\n", body),
            headers: BTreeMap::from([(
                CONTENT_TYPE.to_string(),
                format!("{}; charset=utf-8", content_type.mime()),
            )]),
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).map(String::as_str)
    }
}

/// `OK` for any 2xx code, otherwise `NOT OK`.
pub fn status_description(status_code: u16) -> String {
    let verdict: &str = if status_code.to_string().starts_with('2') {
        "OK"
    } else {
        "NOT OK"
    };

    format!("{} {}", status_code, verdict)
}
