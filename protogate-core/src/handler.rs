//! The per-request contract every generated route follows.
//!
//! 1. Anything but `POST` is answered with `405` and an empty body.
//! 2. The body is decoded into the method input; an empty body decodes to
//!    the default input, anything unparsable is `400`.
//! 3. The method runs (through the interceptor when one is attached).
//! 4. A method error is `500` with an empty body.
//! 5. Success is `200` with the JSON-encoded output.
//! 6. If the output cannot be encoded the response falls back to
//!    `text/plain` and `500`.

use std::future::Future;
use std::sync::Arc;

use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use axum::routing::{any, MethodRouter};
use http::header::{ALLOW, CONTENT_TYPE};
use http::{HeaderValue, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tonic::Status;
use tracing::{debug, warn};

use crate::codec::JsonCodec;
use crate::context::CallContext;

pub const APPLICATION_JSON: &str = "application/json";
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Build the route handler for one unary method.
///
/// `call` receives the per-call context and the decoded input; it is
/// usually a closure over a generated gateway that forwards to the typed
/// method wrapper.
pub fn unary<I, O, F, Fut>(path: &'static str, codec: Arc<JsonCodec>, call: F) -> MethodRouter
where
    I: DeserializeOwned + Default + Send + 'static,
    O: Serialize + Send + 'static,
    F: Fn(CallContext, I) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<O, Status>> + Send + 'static,
{
    any(move |request: Request| {
        let codec = codec.clone();
        let call = call.clone();
        async move { dispatch(path, &codec, call, request).await }
    })
}

async fn dispatch<I, O, F, Fut>(
    path: &'static str,
    codec: &JsonCodec,
    call: F,
    request: Request,
) -> Response
where
    I: DeserializeOwned + Default,
    O: Serialize,
    F: Fn(CallContext, I) -> Fut,
    Fut: Future<Output = Result<O, Status>>,
{
    if request.method() != Method::POST {
        debug!(route = path, method = %request.method(), "rejected non-POST request");
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            [(ALLOW, HeaderValue::from_static("POST"))],
        )
            .into_response();
    }

    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, codec.options().body_limit).await {
        Ok(bytes) => bytes,
        Err(err) => {
            debug!(route = path, error = %err, "failed to read request body");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let input: I = match codec.decode(&bytes) {
        Ok(input) => input,
        Err(err) => {
            debug!(route = path, error = %err, "rejected request body");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let ctx = CallContext::new(path, parts.headers, parts.extensions);
    let output = match call(ctx, input).await {
        Ok(output) => output,
        Err(status) => {
            warn!(
                route = path,
                code = ?status.code(),
                message = status.message(),
                "method returned an error"
            );
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match codec.encode(&output) {
        Ok(body) => {
            debug!(route = path, "call succeeded");
            (
                StatusCode::OK,
                [(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON))],
                body,
            )
                .into_response()
        }
        Err(err) => {
            warn!(route = path, error = %err, "failed to encode response");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN))],
                err.to_string(),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    struct Echo {
        text: String,
        count: u32,
    }

    fn router() -> axum::Router {
        let route = unary("/echo/echo", Arc::new(JsonCodec::default()), |_ctx, echo: Echo| async move {
            if echo.text == "fail" {
                Err(Status::unavailable("down"))
            } else {
                Ok(echo)
            }
        });
        axum::Router::new().route("/echo/echo", route)
    }

    async fn send(method: Method, body: &'static str) -> (StatusCode, Option<HeaderValue>, Vec<u8>) {
        let request = http::Request::builder()
            .method(method)
            .uri("/echo/echo")
            .body(Body::from(body))
            .unwrap();
        let response = router().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response.headers().get(CONTENT_TYPE).cloned();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, content_type, bytes.to_vec())
    }

    #[tokio::test]
    async fn get_is_method_not_allowed() {
        let (status, _, body) = send(Method::GET, "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn empty_body_is_default_input() {
        let (status, content_type, body) = send(Method::POST, "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.unwrap(), APPLICATION_JSON);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({"text": "", "count": 0}));
    }

    #[tokio::test]
    async fn bad_json_is_bad_request() {
        let (status, _, body) = send(Method::POST, "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.is_empty());
    }

    /// Output whose serialization always fails.
    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("unencodable output"))
        }
    }

    #[tokio::test]
    async fn encode_failure_is_plain_text_internal_error() {
        let route = unary("/echo/broken", Arc::new(JsonCodec::default()), |_ctx, _echo: Echo| async {
            Ok::<_, Status>(Unencodable)
        });
        let request = http::Request::builder()
            .method(Method::POST)
            .uri("/echo/broken")
            .body(Body::empty())
            .unwrap();
        let response = axum::Router::new()
            .route("/echo/broken", route)
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), TEXT_PLAIN);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(String::from_utf8_lossy(&body).contains("unencodable output"));
    }

    #[tokio::test]
    async fn method_error_is_internal_error() {
        let (status, _, body) = send(Method::POST, r#"{"text":"fail"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.is_empty());
    }
}
