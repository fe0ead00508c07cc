use axum::body::Body;
use axum::Router;
use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, IntoHeaderName, ALLOW, CONTENT_TYPE};
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tower::util::ServiceExt;

/// In-process HTTP test client wrapping a gateway `Router`.
///
/// Uses `tower::ServiceExt::oneshot` to dispatch requests without binding
/// to a TCP port.
pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    /// Start building a POST request, the only method gateway routes accept.
    pub fn post(&self, path: &str) -> TestRequest<'_> {
        TestRequest::new(self, Method::POST, path)
    }

    pub fn get(&self, path: &str) -> TestRequest<'_> {
        TestRequest::new(self, Method::GET, path)
    }

    /// Start building a request with an arbitrary HTTP method.
    pub fn request(&self, method: Method, path: &str) -> TestRequest<'_> {
        TestRequest::new(self, method, path)
    }

    /// POST `body` as JSON to `path` and return the response.
    pub async fn call(&self, path: &str, body: &impl Serialize) -> TestResponse {
        self.post(path).json(body).send().await
    }

    /// POST to `path` without a body, which gateways decode as the
    /// method's default input.
    pub async fn call_empty(&self, path: &str) -> TestResponse {
        self.post(path).send().await
    }
}

/// Builder for constructing and sending a test HTTP request.
pub struct TestRequest<'a> {
    app: &'a TestApp,
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl<'a> TestRequest<'a> {
    fn new(app: &'a TestApp, method: Method, path: &str) -> Self {
        Self {
            app,
            method,
            path: path.to_string(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: impl IntoHeaderName, value: impl AsRef<str>) -> Self {
        self.headers.insert(name, value.as_ref().parse().unwrap());
        self
    }

    /// Set the request body as JSON. Also sets Content-Type to `application/json`.
    pub fn json(mut self, body: &impl Serialize) -> Self {
        self.body = Some(serde_json::to_vec(body).unwrap());
        self.headers
            .insert(CONTENT_TYPE, "application/json".parse().unwrap());
        self
    }

    /// Set a raw request body.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub async fn send(self) -> TestResponse {
        let body = match self.body {
            Some(b) => Body::from(b),
            None => Body::empty(),
        };

        let mut builder = Request::builder().method(self.method).uri(&self.path);
        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }
        let request = builder.body(body).unwrap();

        let response = self
            .app
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("failed to read response body")
            .to_bytes();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Response wrapper with status, header and body assertions.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn assert_ok(self) -> Self {
        self.assert_status(StatusCode::OK)
    }

    pub fn assert_bad_request(self) -> Self {
        self.assert_status(StatusCode::BAD_REQUEST)
    }

    pub fn assert_not_found(self) -> Self {
        self.assert_status(StatusCode::NOT_FOUND)
    }

    pub fn assert_method_not_allowed(self) -> Self {
        self.assert_status(StatusCode::METHOD_NOT_ALLOWED)
    }

    pub fn assert_internal_error(self) -> Self {
        self.assert_status(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.status,
            expected,
            "Expected {expected}, got {}\nBody: {}",
            self.status,
            self.text()
        );
        self
    }

    /// Assert the outcome of a failed method call: `500` and no body.
    pub fn assert_call_failed(self) -> Self {
        self.assert_internal_error().assert_empty_body()
    }

    /// Assert a `405` that advertises `allowed` in its `Allow` header.
    pub fn assert_allow(self, allowed: &str) -> Self {
        let response = self.assert_method_not_allowed();
        assert_eq!(
            response.header(ALLOW.as_str()),
            Some(allowed),
            "unexpected Allow header"
        );
        response
    }

    /// Assert the body is a JSON object with exactly `fields` as keys.
    ///
    /// Gateways emit every field by default, so this pins the shape of a
    /// message without fixing its values.
    pub fn assert_json_object(self, fields: &[&str]) -> Self {
        let root: Value = self.json();
        let Value::Object(map) = &root else {
            panic!("Expected a JSON object, got: {root}");
        };
        let mut actual: Vec<&str> = map.keys().map(String::as_str).collect();
        let mut expected = fields.to_vec();
        actual.sort_unstable();
        expected.sort_unstable();
        assert_eq!(actual, expected, "JSON object fields mismatch\n  Body: {root}");
        self
    }

    pub fn assert_empty_body(self) -> Self {
        assert!(
            self.body.is_empty(),
            "Expected an empty body, got: {}",
            self.text()
        );
        self
    }

    /// Assert the exact `Content-Type` header value.
    pub fn assert_content_type(self, expected: &str) -> Self {
        assert_eq!(
            self.header(CONTENT_TYPE.as_str()),
            Some(expected),
            "unexpected Content-Type"
        );
        self
    }

    /// Assert the whole body equals `expected` as JSON.
    pub fn assert_json(self, expected: Value) -> Self {
        let actual: Value = self.json();
        assert_eq!(actual, expected, "JSON body mismatch");
        self
    }

    /// Assert the value at a JSON pointer (`/reply/count`, `/items/0`).
    pub fn assert_json_pointer(self, pointer: &str, expected: impl Into<Value>) -> Self {
        let root: Value = self.json();
        let expected = expected.into();
        let actual = root.pointer(pointer).cloned().unwrap_or(Value::Null);
        assert_eq!(
            actual, expected,
            "JSON pointer \"{pointer}\" assertion failed\n  Expected: {expected}\n  Actual:   {actual}\n  Body: {root}",
        );
        self
    }

    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        let name: HeaderName = name.as_ref().parse().ok()?;
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Deserialize the entire response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body)
            .unwrap_or_else(|e| panic!("Failed to parse JSON: {e}\nBody: {}", self.text()))
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}
