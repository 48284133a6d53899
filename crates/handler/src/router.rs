use crate::response::Outcome;
use lambda_runtime::tracing;
use model::request::USER_AGENT;
use model::{Clock, InboundRequest, Method, RequestDescriptor};

pub const HEALTH_PATH: &str = "/health";
pub const ROOT_PATH: &str = "/";
pub const APP_PATH: &str = "/app";
pub const RECORDS_PATH: &str = "/app/records";

/// User agent of the load balancer health checker.
pub const HEALTH_CHECKER_AGENT: &str = "ELB-HealthChecker/2.0";

const KNOWN_PATHS: [&str; 4] = [HEALTH_PATH, ROOT_PATH, APP_PATH, RECORDS_PATH];

/// Requests which need the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Write,
    Read,
    List,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    // The request is answered without touching the store
    Respond(Outcome),
    Route(Route, RequestDescriptor),
}

/// Classify a request.
///
/// Health checks are answered before any header validation, so a probe is never
/// turned away for lacking forwarded headers. Every other request must carry them all,
/// whatever its path.
pub fn classify(request: &InboundRequest, clock: &dyn Clock) -> Classification {
    if request.path == HEALTH_PATH {
        if request.header(USER_AGENT) == Some(HEALTH_CHECKER_AGENT) {
            return Classification::Respond(Outcome::HealthOk);
        }

        tracing::debug!("Health path requested by another agent");

        return Classification::Respond(Outcome::RouteNotFound {
            path: request.path.clone(),
        });
    }

    let descriptor: RequestDescriptor =
        match RequestDescriptor::from_request(request, clock.timestamp()) {
            Some(descriptor) => descriptor,
            None => {
                tracing::info!(
                    path = request.path.as_str(),
                    "Rejecting request missing forwarded headers"
                );

                return Classification::Respond(Outcome::BadRequest);
            }
        };

    tracing::debug!(
        method = request.method.as_str(),
        path = descriptor.path.as_str(),
        trace_id = descriptor.trace_id.as_str(),
        client_ip = descriptor.client_ip.as_str(),
        port = descriptor.port.as_str(),
        protocol = descriptor.protocol.as_str(),
        "Routing request"
    );

    let route: Route = match (descriptor.path.as_str(), descriptor.method) {
        (ROOT_PATH, Some(Method::Get)) => return Classification::Respond(Outcome::Welcome),
        (APP_PATH, Some(Method::Post)) => Route::Write,
        (APP_PATH, Some(Method::Get)) => Route::Read,
        (RECORDS_PATH, Some(Method::Get)) => Route::List,
        (path, _) if KNOWN_PATHS.contains(&path) => {
            return Classification::Respond(Outcome::MethodNotAllowed {
                method: request.method.clone(),
                path: path.to_string(),
            });
        }
        (path, _) => {
            return Classification::Respond(Outcome::RouteNotFound {
                path: path.to_string(),
            });
        }
    };

    Classification::Route(route, descriptor)
}
