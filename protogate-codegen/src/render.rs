use crate::error::GenerateError;
use crate::gateway::GatewaySpec;
use crate::synth::synthesize;

pub const GENERATED_HEADER: &str = "// Code generated by protoc-gen-protogate. DO NOT EDIT.";

/// Render the full contents of one generated file.
///
/// The output holds no inner attributes so it can be `include!`d inside a
/// module.
pub fn render(spec: &GatewaySpec) -> Result<String, GenerateError> {
    let file = synthesize(spec)?;
    Ok(format!(
        "{GENERATED_HEADER}\n// source: {}\n\n{}",
        spec.source,
        prettyplease::unparse(&file)
    ))
}
