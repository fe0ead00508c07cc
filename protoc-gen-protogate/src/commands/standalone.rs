use std::path::Path;

use colored::Colorize;
use protogate_codegen::{generate_files, request_from_descriptor_set, write_files, GenerateError};

use super::{files_to_generate, read_descriptor_set};

/// Generate gateways for a descriptor set and write them below `out_dir`.
///
/// `params` are `key=value` generator options, joined the way protoc
/// passes them. Returns the paths written, relative to `out_dir`.
pub fn run(
    descriptor_set: &Path,
    files: &[String],
    params: &[String],
    out_dir: &Path,
) -> Result<Vec<String>, GenerateError> {
    let set = read_descriptor_set(descriptor_set)?;
    let files = files_to_generate(&set, files);
    let request = request_from_descriptor_set(&set, &files, &params.join(","));
    let generated = generate_files(&request)?;
    write_files(&generated, out_dir)?;

    let written: Vec<String> = generated.into_iter().map(|file| file.name).collect();
    for name in &written {
        println!("  {} {}", "✓".green(), out_dir.join(name).display());
    }
    Ok(written)
}
