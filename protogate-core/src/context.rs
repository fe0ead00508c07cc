use http::{Extensions, HeaderMap};
use tonic::metadata::MetadataMap;

/// Per-call context handed to method wrappers and interceptors.
///
/// Built from the inbound HTTP request. Headers become gRPC metadata when
/// the call reaches the wrapped tonic service.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    route: &'static str,
    headers: HeaderMap,
    extensions: Extensions,
}

impl CallContext {
    pub fn new(route: &'static str, headers: HeaderMap, extensions: Extensions) -> Self {
        Self {
            route,
            headers,
            extensions,
        }
    }

    /// URL path of the route that received the call.
    pub fn route(&self) -> &'static str {
        self.route
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// Wrap `message` in a `tonic::Request` carrying this context.
    pub fn into_request<T>(self, message: T) -> tonic::Request<T> {
        tonic::Request::from_parts(
            MetadataMap::from_headers(self.headers),
            self.extensions,
            message,
        )
    }
}
