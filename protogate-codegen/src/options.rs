//! Generator options, read from the protoc parameter string.
//!
//! ```text
//! protoc --protogate_out=pb_path=crate::pb,extern_path=.common=::common_pb:out ...
//! ```

use crate::error::GenerateError;

pub const DEFAULT_RUNTIME_PATH: &str = "::protogate";

/// Maps a protobuf package prefix to the Rust module that holds its types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternPath {
    /// Fully qualified package prefix, e.g. `.google.protobuf`.
    pub proto_prefix: String,
    pub rust_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Rust module holding the message types and server traits of the
    /// file's own package.
    pub pb_path: String,
    pub extern_paths: Vec<ExternPath>,
    /// Path of the runtime crate generated code links against.
    pub runtime_path: String,
    /// Emit interceptor-aware gateways.
    pub interceptors: bool,
}

impl GeneratorOptions {
    pub fn new(pb_path: impl Into<String>) -> Self {
        Self {
            pb_path: pb_path.into(),
            extern_paths: Vec::new(),
            runtime_path: DEFAULT_RUNTIME_PATH.to_owned(),
            interceptors: true,
        }
    }

    pub fn extern_path(mut self, proto_prefix: impl Into<String>, rust_path: impl Into<String>) -> Self {
        self.extern_paths.push(ExternPath {
            proto_prefix: proto_prefix.into(),
            rust_path: rust_path.into(),
        });
        self
    }

    pub fn runtime_path(mut self, path: impl Into<String>) -> Self {
        self.runtime_path = path.into();
        self
    }

    pub fn interceptors(mut self, enabled: bool) -> Self {
        self.interceptors = enabled;
        self
    }

    /// Parse a `key=value[,key=value]...` parameter string.
    pub fn parse(parameter: Option<&str>) -> Result<Self, GenerateError> {
        let mut pb_path = None;
        let mut options = Self::new(String::new());

        for pair in parameter.unwrap_or_default().split(',') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| invalid(pair, "expected `key=value`"))?;
            match key.trim() {
                "pb_path" => pb_path = Some(checked_path(key, value.trim())?),
                "extern_path" => {
                    let (prefix, path) = value
                        .split_once('=')
                        .ok_or_else(|| invalid(key, "expected `.proto.package=rust::path`"))?;
                    let prefix = prefix.trim();
                    if !prefix.starts_with('.') || prefix.len() < 2 {
                        return Err(invalid(key, format!("`{prefix}` is not a fully qualified package")));
                    }
                    let path = checked_path(key, path.trim())?;
                    options = options.extern_path(prefix, path);
                }
                "runtime_path" => options.runtime_path = checked_path(key, value.trim())?,
                "interceptors" => {
                    options.interceptors = value
                        .trim()
                        .parse()
                        .map_err(|_| invalid(key, format!("expected `true` or `false`, got `{value}`")))?;
                }
                other => return Err(invalid(other, "unknown parameter")),
            }
        }

        options.pb_path = pb_path.ok_or(GenerateError::MissingOption("pb_path"))?;
        Ok(options)
    }

    /// Rust module for `package`, when an `extern_path` covers it.
    ///
    /// The longest matching prefix wins; package segments below the prefix
    /// become nested modules.
    pub fn extern_module(&self, package: &str) -> Option<String> {
        let qualified = format!(".{package}");
        self.extern_paths
            .iter()
            .filter(|ext| {
                qualified == ext.proto_prefix
                    || qualified
                        .strip_prefix(&ext.proto_prefix)
                        .is_some_and(|rest| rest.starts_with('.'))
            })
            .max_by_key(|ext| ext.proto_prefix.len())
            .map(|ext| {
                let rest = &qualified[ext.proto_prefix.len()..];
                rest.split('.')
                    .filter(|segment| !segment.is_empty())
                    .fold(ext.rust_path.clone(), |path, segment| {
                        format!("{path}::{}", crate::resolver::module_ident(segment))
                    })
            })
    }
}

fn checked_path(key: &str, value: &str) -> Result<String, GenerateError> {
    syn::parse_str::<syn::Path>(value)
        .map(|_| value.to_owned())
        .map_err(|err| invalid(key, format!("`{value}` is not a Rust path: {err}")))
}

fn invalid(option: &str, reason: impl Into<String>) -> GenerateError {
    GenerateError::InvalidOption {
        option: option.to_owned(),
        reason: reason.into(),
    }
}
