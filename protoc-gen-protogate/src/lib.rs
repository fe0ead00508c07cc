//! # protoc-gen-protogate
//!
//! protoc plugin generating protogate HTTP/JSON gateways.
//!
//! | Invocation | Description |
//! |------------|-------------|
//! | `protoc --protogate_out=pb_path=crate::pb:out ...` | Plugin mode: request on stdin, response on stdout |
//! | `protoc-gen-protogate --descriptor-set FILE --out-dir DIR` | Standalone mode over a `FileDescriptorSet` |
//! | `protoc-gen-protogate --descriptor-set FILE --list-routes` | Print the route table without writing files |
//!
//! Diagnostics go to stderr; stdout is reserved for the protoc response.

pub mod commands;
pub mod logging;
