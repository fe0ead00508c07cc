pub mod codec;
pub mod context;
pub mod error;
pub mod handler;
pub mod interceptors;
pub mod layers;
pub mod routes;
pub mod server;

pub use codec::{CodecOptions, DecodeError, EncodeError, Empty, JsonCodec, DEFAULT_BODY_LIMIT};
pub use context::CallContext;
pub use error::GatewayError;
pub use handler::unary;
pub use interceptors::{
    downcast_message, invoke_intercepted, BoxFuture, DynMessage, InterceptResult, Interceptor,
    InterceptorChain, InterceptorSlot, MethodInfo, Next,
};
pub use layers::default_trace;
pub use routes::{Route, RouteMap};
pub use server::{shutdown_signal, GatewayServer};

pub use axum::Router;
pub use tokio::net::TcpListener;
