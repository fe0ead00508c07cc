use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::TraceLayer;

/// `TraceLayer` applied to every gateway router.
///
/// Uses `tower_http`'s default classification, which logs requests and
/// responses at `DEBUG` and 5xx responses as failures.
pub fn default_trace() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}
