use crate::adapter::{RecordAdapter, WriteError, WriteOutcome};
use crate::response::Outcome;
use crate::router::{Classification, Route};
use aws_lambda_events::alb::AlbTargetGroupRequest;
use lambda_runtime::tracing::{Instrument, Span};
use lambda_runtime::{LambdaEvent, tracing};
use model::{Clock, Error, InboundRequest, RequestDescriptor, ResponseEnvelope};
use state::RecordStore;
use std::sync::Arc;

pub mod adapter;
pub mod response;
pub mod router;

/// Records a timestamp per request behind a load balancer.
///
/// Built once per process and shared by every invocation.
///
/// ```no_compile
/// use handler::{TimestampHandler, handler_fn};
/// use lambda_runtime::{service_fn, LambdaEvent};
/// use model::SystemClock;
/// use state_in_memory::InMemoryRecordStore;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), model::Error> {
///     let handler: TimestampHandler =
///         TimestampHandler::new(Arc::new(InMemoryRecordStore::default()), Arc::new(SystemClock));
///
///     lambda_runtime::run(service_fn(|event: LambdaEvent<_>| handler_fn(&handler, event))).await
/// }
/// ```
#[derive(Clone)]
pub struct TimestampHandler {
    adapter: RecordAdapter,
    clock: Arc<dyn Clock>,
}

impl TimestampHandler {
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        TimestampHandler {
            adapter: RecordAdapter::new(store),
            clock,
        }
    }

    pub async fn handle(&self, request: InboundRequest) -> ResponseEnvelope {
        let outcome: Outcome = match router::classify(&request, self.clock.as_ref()) {
            Classification::Respond(outcome) => outcome,
            Classification::Route(route, descriptor) => {
                let trace_id: &str = descriptor.trace_id.as_str();
                let request_span: Span = tracing::span!(tracing::Level::INFO, "Request", trace_id);

                self.dispatch(route, &descriptor)
                    .instrument(request_span)
                    .await
            }
        };

        tracing::info!(
            path = request.path.as_str(),
            status_code = outcome.status_code(),
            "Handled request"
        );

        outcome.into_response()
    }

    async fn dispatch(&self, route: Route, descriptor: &RequestDescriptor) -> Outcome {
        match route {
            Route::Write => match self.adapter.write_if_absent(descriptor.record()).await {
                Ok(WriteOutcome::Created(record)) => Outcome::Created(record),
                Ok(WriteOutcome::AlreadyExists(record)) => Outcome::AlreadyExists(record),
                Err(WriteError::PutFailed(err)) => Outcome::ServerError(err.reason.to_string()),
                Err(WriteError::NotFoundAfterWrite(key)) => {
                    tracing::error!("Record [{}] missing after write", key.record_id);

                    Outcome::NotFound
                }
            },
            Route::Read => match self.adapter.fetch(&descriptor.key()).await {
                Some(record) => Outcome::Record(record),
                None => Outcome::NotFound,
            },
            Route::List => {
                let records = self.adapter.list().await;

                if records.is_empty() {
                    Outcome::NotFound
                } else {
                    Outcome::Records(records)
                }
            }
        }
    }
}

/// Handler for the load balancer event, for use with `lambda_runtime::run()`.
pub async fn handler_fn(
    handler: &TimestampHandler,
    event: LambdaEvent<AlbTargetGroupRequest>,
) -> Result<ResponseEnvelope, Error> {
    let request: InboundRequest = event.payload.into();

    Ok(handler.handle(request).await)
}
