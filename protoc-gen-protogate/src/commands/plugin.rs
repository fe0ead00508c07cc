use std::io::{Read, Write};

use prost::Message;
use protogate_codegen::{decode_request, generate, GenerateError};
use tracing::debug;

/// Read a `CodeGeneratorRequest` from `input` and write the encoded
/// `CodeGeneratorResponse` to `output`.
///
/// Nothing is written when generation fails.
pub fn run<R: Read, W: Write>(mut input: R, mut output: W) -> Result<(), GenerateError> {
    let mut bytes = Vec::new();
    input.read_to_end(&mut bytes)?;
    let request = decode_request(&bytes)?;
    debug!(
        files = request.file_to_generate.len(),
        parameter = request.parameter(),
        "received code generator request"
    );

    let response = generate(&request)?;
    output.write_all(&response.encode_to_vec())?;
    output.flush()?;
    Ok(())
}
