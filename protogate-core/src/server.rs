use std::future::Future;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::codec::{CodecOptions, JsonCodec};
use crate::error::GatewayError;
use crate::interceptors::{Interceptor, InterceptorSlot};
use crate::layers::default_trace;
use crate::routes::RouteMap;

/// Aggregate server merging the routes of several gateways.
///
/// Owns the interceptor slot and codec that registered gateways share.
/// Generated `Server` types wrap one of these and add a typed
/// `register_<service>_server` method per service.
#[derive(Debug)]
pub struct GatewayServer {
    interceptor: InterceptorSlot,
    codec: Arc<JsonCodec>,
    routes: RouteMap,
}

impl Default for GatewayServer {
    /// A server without interceptor, using the default codec.
    fn default() -> Self {
        Self {
            interceptor: InterceptorSlot::empty(),
            codec: Arc::new(JsonCodec::default()),
            routes: RouteMap::new(),
        }
    }
}

impl GatewayServer {
    /// Create a server with zero or one interceptor.
    pub fn new<I>(interceptors: I) -> Result<Self, GatewayError>
    where
        I: IntoIterator<Item = Arc<dyn Interceptor>>,
    {
        Ok(Self {
            interceptor: InterceptorSlot::from_interceptors(interceptors)?,
            ..Self::default()
        })
    }

    /// Replace the codec used by gateways registered from now on.
    pub fn with_codec_options(mut self, options: CodecOptions) -> Self {
        self.codec = Arc::new(JsonCodec::new(options));
        self
    }

    pub fn interceptor(&self) -> &InterceptorSlot {
        &self.interceptor
    }

    pub fn codec(&self) -> &Arc<JsonCodec> {
        &self.codec
    }

    pub fn routes(&self) -> &RouteMap {
        &self.routes
    }

    /// Merge a gateway's routes into the server.
    pub fn register(&mut self, routes: RouteMap) -> Result<&mut Self, GatewayError> {
        self.routes.merge(routes)?;
        Ok(self)
    }

    pub fn into_router(self) -> Router {
        self.routes.into_router().layer(default_trace())
    }

    /// Serve until Ctrl-C or SIGTERM.
    pub async fn serve(self, listener: TcpListener) -> Result<(), GatewayError> {
        self.serve_with_shutdown(listener, shutdown_signal()).await
    }

    /// Serve until `signal` resolves, then drain in-flight requests.
    pub async fn serve_with_shutdown<F>(self, listener: TcpListener, signal: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        info!(%addr, routes = self.routes.len(), "protogate gateway listening");
        axum::serve(listener, self.into_router())
            .with_graceful_shutdown(signal)
            .await?;
        info!("protogate gateway stopped");
        Ok(())
    }
}

/// Wait for a shutdown signal (Ctrl-C or SIGTERM on Unix).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received, starting graceful shutdown");
}
