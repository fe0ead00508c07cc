//! Generator for protogate HTTP/JSON gateways.
//!
//! Consumes protoc's `CodeGeneratorRequest` and emits, per `.proto` file
//! declaring at least one service, a `<name>.http.rs` file containing:
//!
//! - one `<Service>Gateway<S>` per service wrapping a tonic server trait
//!   implementation, with a route per unary method;
//! - a `Server` type merging the gateways of the file into one router.
//!
//! Generation is all-or-nothing: the first error aborts the run and no file
//! is produced.
//!
//! ```ignore
//! let request = protogate_codegen::request_from_descriptor_set(&set, &["helloworld.proto"], "pb_path=crate::pb");
//! let files = protogate_codegen::generate_files(&request)?;
//! protogate_codegen::write_files(&files, out_dir)?;
//! ```

pub mod error;
pub mod gateway;
pub mod mangle;
pub mod options;
pub mod render;
pub mod resolver;
pub mod routes;
pub mod schema;
mod synth;

use std::path::Path;

use prost::Message;
use prost_types::compiler::code_generator_response::{Feature, File};
use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};
use prost_types::FileDescriptorSet;
use tracing::debug;

pub use error::GenerateError;
pub use gateway::GatewaySpec;
pub use mangle::mangle;
pub use options::GeneratorOptions;
pub use schema::SchemaFile;

/// One generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path relative to the output directory.
    pub name: String,
    pub content: String,
}

impl From<GeneratedFile> for File {
    fn from(file: GeneratedFile) -> Self {
        File {
            name: Some(file.name),
            content: Some(file.content),
            ..Default::default()
        }
    }
}

/// Decode a protoc request envelope.
pub fn decode_request(bytes: &[u8]) -> Result<CodeGeneratorRequest, GenerateError> {
    Ok(CodeGeneratorRequest::decode(bytes)?)
}

/// Build a request from a `FileDescriptorSet`, as produced by
/// `protoc --include_imports --descriptor_set_out`.
pub fn request_from_descriptor_set<S: AsRef<str>>(
    set: &FileDescriptorSet,
    files: &[S],
    parameter: &str,
) -> CodeGeneratorRequest {
    CodeGeneratorRequest {
        file_to_generate: files.iter().map(|f| f.as_ref().to_owned()).collect(),
        parameter: (!parameter.is_empty()).then(|| parameter.to_owned()),
        proto_file: set.file.clone(),
        ..Default::default()
    }
}

/// Generate the files for every entry of `file_to_generate`, in order.
pub fn generate_files(request: &CodeGeneratorRequest) -> Result<Vec<GeneratedFile>, GenerateError> {
    if request.file_to_generate.is_empty() {
        return Err(GenerateError::NoFilesToGenerate);
    }
    let options = GeneratorOptions::parse(request.parameter.as_deref())?;
    let index = resolver::DescriptorIndex::new(&request.proto_file);
    debug!(
        files = request.file_to_generate.len(),
        messages = index.len(),
        "generating gateways"
    );

    let mut generated = Vec::new();
    for name in &request.file_to_generate {
        let proto = request
            .proto_file
            .iter()
            .find(|file| file.name() == name.as_str())
            .ok_or_else(|| GenerateError::UnknownFile(name.clone()))?;
        let schema = SchemaFile::from_proto(proto);
        let Some(spec) = GatewaySpec::build(&schema, &index, &options)? else {
            continue;
        };
        let content = render::render(&spec)?;
        debug!(file = %schema.name, output = %spec.output_file, "generated gateway");
        generated.push(GeneratedFile {
            name: spec.output_file,
            content,
        });
    }
    Ok(generated)
}

/// Run a full plugin pass and wrap the result in a protoc response.
pub fn generate(request: &CodeGeneratorRequest) -> Result<CodeGeneratorResponse, GenerateError> {
    let files = generate_files(request)?;
    Ok(CodeGeneratorResponse {
        supported_features: Some(Feature::Proto3Optional as u64),
        file: files.into_iter().map(File::from).collect(),
        ..Default::default()
    })
}

/// Write generated files below `out_dir`, creating directories as needed.
pub fn write_files(files: &[GeneratedFile], out_dir: &Path) -> Result<(), GenerateError> {
    for file in files {
        let path = out_dir.join(&file.name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, &file.content)?;
        debug!(path = %path.display(), "wrote generated file");
    }
    Ok(())
}
