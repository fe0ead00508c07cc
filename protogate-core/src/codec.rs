//! JSON codec shared by every route of a gateway.
//!
//! A [`JsonCodec`] is built once when a gateway is constructed and handed to
//! each route as an `Arc`. There is no process-wide marshaler: two gateways
//! in the same process can run with different [`CodecOptions`].
//!
//! Message types are expected to be prost structs that also derive
//! `serde::Serialize`/`serde::Deserialize` with `#[serde(default)]`.
//! Enumerations are `i32` fields in that representation, so they are always
//! written as integers.

use std::fmt;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default maximum request body size, matching axum's default body limit.
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Tuning knobs for [`JsonCodec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecOptions {
    /// Emit every field, including those holding their default value.
    ///
    /// On by default so that the shape of a response does not depend on
    /// which fields the service happened to set.
    pub emit_defaults: bool,
    /// Maximum number of body bytes read from a request.
    pub body_limit: usize,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            emit_defaults: true,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

/// Request body could not be turned into the method's input type.
#[derive(Debug)]
pub struct DecodeError(serde_json::Error);

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid JSON request body: {}", self.0)
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

/// Method output could not be rendered as JSON.
#[derive(Debug)]
pub struct EncodeError(serde_json::Error);

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to encode JSON response: {}", self.0)
    }
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

/// JSON encoder/decoder owned by a gateway.
#[derive(Debug, Clone, Default)]
pub struct JsonCodec {
    options: CodecOptions,
}

impl JsonCodec {
    pub fn new(options: CodecOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Decode a request body into a fresh `T`.
    ///
    /// An empty (or whitespace-only) body is not an error: it decodes to
    /// `T::default()`, which lets callers invoke methods that have no
    /// required fields without sending `{}`.
    pub fn decode<T>(&self, body: &[u8]) -> Result<T, DecodeError>
    where
        T: DeserializeOwned + Default,
    {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(T::default());
        }
        serde_json::from_slice(body).map_err(DecodeError)
    }

    /// Encode a method output as JSON.
    pub fn encode<T>(&self, value: &T) -> Result<Bytes, EncodeError>
    where
        T: Serialize + ?Sized,
    {
        if self.options.emit_defaults {
            return serde_json::to_vec(value).map(Bytes::from).map_err(EncodeError);
        }
        let mut tree = serde_json::to_value(value).map_err(EncodeError)?;
        prune_defaults(&mut tree);
        serde_json::to_vec(&tree).map(Bytes::from).map_err(EncodeError)
    }
}

/// Strip proto3 default values out of an object tree.
fn prune_defaults(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for child in map.values_mut() {
                prune_defaults(child);
            }
            map.retain(|_, child| !is_default(child));
        }
        Value::Array(items) => items.iter_mut().for_each(prune_defaults),
        _ => {}
    }
}

fn is_default(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// HTTP-side stand-in for `google.protobuf.Empty`.
///
/// prost maps `Empty` to `()`, which serde writes as `null` and cannot
/// read from `{}`. Gateways take and return this type instead, so the
/// JSON form is always `{}`, and convert to `()` at the tonic boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Empty {}

impl From<()> for Empty {
    fn from(_: ()) -> Self {
        Empty {}
    }
}

impl From<Empty> for () {
    fn from(_: Empty) -> Self {}
}
