//! protogate - HTTP/JSON gateways for tonic services.
//!
//! Code generated by `protoc-gen-protogate` only names paths under this
//! crate, so a consumer needs a single runtime dependency:
//!
//! ```ignore
//! mod gateway {
//!     include!(concat!(env!("OUT_DIR"), "/helloworld.http.rs"));
//! }
//!
//! let mut server = gateway::Server::new(None)?;
//! server.register_greeter_server(MyGreeter::default())?;
//! server.serve(protogate::TcpListener::bind("0.0.0.0:8080").await?).await?;
//! ```
//!
//! # Feature flags
//!
//! | Feature   | Default | Crate               |
//! |-----------|---------|---------------------|
//! | `codegen` | no      | `protogate-codegen` |

pub extern crate protogate_core;

pub use protogate_core::*;

pub use tonic;

#[cfg(feature = "codegen")]
pub use protogate_codegen as codegen;

pub mod prelude {
    pub use protogate_core::{
        BoxFuture, CallContext, CodecOptions, DynMessage, Empty, GatewayError, GatewayServer,
        InterceptResult, Interceptor, InterceptorChain, MethodInfo, Next,
    };
    pub use tonic::{Request, Response, Status};
}
