use std::path::Path;

use colored::Colorize;
use protogate_codegen::gateway::GatewaySpec;
use protogate_codegen::resolver::DescriptorIndex;
use protogate_codegen::{GenerateError, GeneratorOptions, SchemaFile};

use super::{files_to_generate, read_descriptor_set};

/// One row of the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRow {
    pub path: String,
    pub full_method: String,
    pub input: String,
    pub output: String,
}

/// Collect the routes the generator would emit, without rendering code.
pub fn collect(descriptor_set: &Path, files: &[String], params: &[String]) -> Result<Vec<RouteRow>, GenerateError> {
    let set = read_descriptor_set(descriptor_set)?;
    let files = files_to_generate(&set, files);
    if files.is_empty() {
        return Err(GenerateError::NoFilesToGenerate);
    }
    let options = GeneratorOptions::parse(Some(&params.join(",")))?;
    let index = DescriptorIndex::new(&set.file);

    let mut rows = Vec::new();
    for name in &files {
        let proto = set
            .file
            .iter()
            .find(|file| file.name() == name.as_str())
            .ok_or_else(|| GenerateError::UnknownFile(name.clone()))?;
        let schema = SchemaFile::from_proto(proto);
        let Some(spec) = GatewaySpec::build(&schema, &index, &options)? else {
            continue;
        };
        for service in &spec.services {
            rows.extend(service.routes.iter().map(|route| RouteRow {
                path: route.path.clone(),
                full_method: route.full_method.clone(),
                input: route.input.proto.to_string(),
                output: route.output.proto.to_string(),
            }));
        }
    }
    Ok(rows)
}

/// Print the route table to stdout.
pub fn run(descriptor_set: &Path, files: &[String], params: &[String]) -> Result<(), GenerateError> {
    let rows = collect(descriptor_set, files, params)?;
    if rows.is_empty() {
        println!("{}", "No routes found.".yellow());
        return Ok(());
    }

    println!("{}", "Gateway routes:".bold());
    println!();

    let path_width = rows.iter().map(|row| row.path.len()).max().unwrap_or(4).max(4);
    let method_width = rows.iter().map(|row| row.full_method.len()).max().unwrap_or(6).max(6);
    println!(
        "  {:<path_width$}  {:<method_width$}  {}",
        "PATH".dimmed(),
        "METHOD".dimmed(),
        "TYPES".dimmed(),
    );
    for row in &rows {
        println!(
            "  {:<path_width$}  {:<method_width$}  {} -> {}",
            row.path.green(),
            row.full_method,
            row.input.dimmed(),
            row.output.dimmed(),
        );
    }
    println!();
    println!("  {} route(s), all POST", rows.len());
    Ok(())
}
