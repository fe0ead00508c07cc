use std::fmt;

/// Errors raised while assembling a gateway.
///
/// These are construction-time faults: the gateway refuses to come up
/// rather than serving with an ambiguous configuration. Request-time faults
/// never surface as `GatewayError`; they map straight to an HTTP status.
#[derive(Debug)]
pub enum GatewayError {
    /// More than one interceptor was supplied where at most one is allowed.
    TooManyInterceptors { count: usize },
    /// Two routes resolved to the same URL path.
    DuplicateRoute(String),
    /// Binding or serving on the listener failed.
    Io(std::io::Error),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::TooManyInterceptors { count } => write!(
                f,
                "at most one interceptor can be attached to a gateway, got {count} \
                 (compose them with InterceptorChain)"
            ),
            GatewayError::DuplicateRoute(path) => write!(f, "duplicate route path: {path}"),
            GatewayError::Io(err) => write!(f, "gateway I/O error: {err}"),
        }
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GatewayError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        GatewayError::Io(err)
    }
}
