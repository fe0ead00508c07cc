//! Command implementations for `protoc-gen-protogate`.

/// Plugin mode: `CodeGeneratorRequest` on stdin, `CodeGeneratorResponse`
/// on stdout.
pub mod plugin;

/// Route listing over a descriptor set (`--list-routes`).
pub mod routes;

/// Standalone mode: generate from a `FileDescriptorSet` file into
/// `--out-dir`.
pub mod standalone;

use std::path::Path;

use prost::Message;
use prost_types::FileDescriptorSet;
use protogate_codegen::GenerateError;

/// Read a `FileDescriptorSet` written by `protoc --descriptor_set_out`.
pub fn read_descriptor_set(path: &Path) -> Result<FileDescriptorSet, GenerateError> {
    let bytes = std::fs::read(path)?;
    Ok(FileDescriptorSet::decode(bytes.as_slice())?)
}

/// Files to generate: the explicit list, or every file declaring a service.
pub fn files_to_generate(set: &FileDescriptorSet, explicit: &[String]) -> Vec<String> {
    if !explicit.is_empty() {
        return explicit.to_vec();
    }
    set.file
        .iter()
        .filter(|file| !file.service.is_empty())
        .map(|file| file.name().to_owned())
        .collect()
}
