pub mod clock;
pub mod config;
pub mod env;
pub mod record;
pub mod request;
pub mod response;

pub use clock::{Clock, SystemClock};
pub use config::{ConfigError, HandlerConfig};
pub use record::{RecordKey, TimestampRecord};
pub use request::{InboundRequest, Method, RequestDescriptor};
pub use response::{ContentType, ResponseEnvelope};

pub type Error = Box<dyn std::error::Error + Send + Sync>;
