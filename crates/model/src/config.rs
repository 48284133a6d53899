use crate::env::{DB_CONSISTENT_READ, DB_ENDPOINT_URL, DB_TABLE, REGION};
use std::fmt::{Display, Formatter};

/// Configuration injected into the function at provision time.
/// Read once when the process starts, never per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    pub table_name: String,
    pub region: String,
    pub endpoint_url: Option<String>,
    pub consistent_read: bool,
}

impl HandlerConfig {
    pub fn new(table_name: impl Into<String>, region: impl Into<String>) -> Self {
        HandlerConfig {
            table_name: table_name.into(),
            region: region.into(),
            endpoint_url: None,
            consistent_read: true,
        }
    }

    /// Pull configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let table_name: String = required(DB_TABLE)?;
        let region: String = required(REGION)?;
        let endpoint_url: Option<String> =
            lookup(DB_ENDPOINT_URL).filter(|value| !value.trim().is_empty());

        let consistent_read: bool = match lookup(DB_CONSISTENT_READ) {
            None => true,
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => return Err(ConfigError::Invalid(DB_CONSISTENT_READ, value)),
            },
        };

        Ok(HandlerConfig {
            table_name,
            region,
            endpoint_url,
            consistent_read,
        })
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    // A required variable was unset or blank
    Missing(&'static str),
    // A variable was set to a value which couldn't be parsed
    Invalid(&'static str, String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(name) => write!(f, "Missing {} environment variable", name),
            ConfigError::Invalid(name, value) => {
                write!(f, "Invalid value [{}] for {} environment variable", value, name)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
