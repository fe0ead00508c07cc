use std::fmt;

/// Fatal generation errors.
///
/// Every variant aborts the whole run: no response file is produced for
/// any input once one of these is raised.
#[derive(Debug)]
pub enum GenerateError {
    /// The request envelope could not be decoded.
    Decode(prost::DecodeError),
    /// `file_to_generate` was empty.
    NoFilesToGenerate,
    /// A required generator option was not supplied.
    MissingOption(&'static str),
    /// A generator option was malformed or unknown.
    InvalidOption { option: String, reason: String },
    /// A file listed in `file_to_generate` is absent from the request.
    UnknownFile(String),
    /// A method references a message type that cannot be named in Rust.
    UnresolvedType {
        file: String,
        type_name: String,
        reason: String,
    },
    /// The synthesized output is not a valid Rust item.
    Render { file: String, reason: String },
    /// Reading input or writing output failed.
    Io(std::io::Error),
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::Decode(err) => write!(f, "parsing input proto: {err}"),
            GenerateError::NoFilesToGenerate => write!(f, "no files to generate"),
            GenerateError::MissingOption(option) => write!(
                f,
                "parameter `{option}` is required (e.g. --protogate_out={option}=crate::pb:<out dir>)"
            ),
            GenerateError::InvalidOption { option, reason } => {
                write!(f, "invalid parameter `{option}`: {reason}")
            }
            GenerateError::UnknownFile(name) => {
                write!(f, "file to generate `{name}` is not part of the request")
            }
            GenerateError::UnresolvedType {
                file,
                type_name,
                reason,
            } => write!(f, "{file}: cannot resolve type `{type_name}`: {reason}"),
            GenerateError::Render { file, reason } => {
                write!(f, "{file}: failed to render generated code: {reason}")
            }
            GenerateError::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for GenerateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenerateError::Decode(err) => Some(err),
            GenerateError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<prost::DecodeError> for GenerateError {
    fn from(err: prost::DecodeError) -> Self {
        GenerateError::Decode(err)
    }
}

impl From<std::io::Error> for GenerateError {
    fn from(err: std::io::Error) -> Self {
        GenerateError::Io(err)
    }
}
