//! Cross-cutting interception of gateway calls.
//!
//! A gateway carries at most one [`Interceptor`], held in an
//! [`InterceptorSlot`]. When present, every generated method wrapper routes
//! its call through it; when absent, wrappers call the service directly.
//!
//! The interceptor sees the decoded request as a type-erased
//! [`DynMessage`] together with [`MethodInfo`] and a [`Next`] continuation
//! that performs the real typed call. Crossing back into the typed world is
//! a checked downcast: a mismatch becomes `Status::internal`, never a panic.
//!
//! Several interceptors can be composed into one with [`InterceptorChain`];
//! the chain then occupies the single slot.

use std::any::{Any, TypeId};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Serialize;
use tonic::Status;

use crate::context::CallContext;
use crate::error::GatewayError;

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result of an intercepted call.
pub type InterceptResult = Result<Box<dyn DynMessage>, Status>;

/// A request or response message with its concrete type erased.
///
/// Implemented for every `Serialize + Send + Sync + 'static` type, which
/// covers serde-enabled prost messages.
pub trait DynMessage: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;

    /// Name of the concrete type, for diagnostics.
    fn type_name(&self) -> &'static str;

    /// Render the message as a JSON tree, e.g. for audit logging.
    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error>;
}

impl<T> DynMessage for T
where
    T: Serialize + Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl dyn DynMessage {
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().type_id() == TypeId::of::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }
}

impl fmt::Debug for dyn DynMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynMessage")
            .field("type", &self.type_name())
            .finish()
    }
}

/// Move a type-erased message back into `T`.
pub fn downcast_message<T: Any>(message: Box<dyn DynMessage>) -> Result<T, Status> {
    let found = message.type_name();
    message
        .into_any()
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| {
            Status::internal(format!(
                "interceptor produced a `{found}` where `{}` was expected",
                std::any::type_name::<T>()
            ))
        })
}

/// Identifies the method being called.
#[derive(Clone)]
pub struct MethodInfo {
    /// Fully-qualified gRPC method name, `/package.Service/Method`.
    pub full_method: &'static str,
    /// The wrapped service implementation.
    pub service: Arc<dyn Any + Send + Sync>,
}

impl MethodInfo {
    pub fn new(full_method: &'static str, service: Arc<dyn Any + Send + Sync>) -> Self {
        Self {
            full_method,
            service,
        }
    }

    /// `package.Service` part of the full method name.
    pub fn service_name(&self) -> &'static str {
        self.split().0
    }

    /// `Method` part of the full method name.
    pub fn method_name(&self) -> &'static str {
        self.split().1
    }

    /// Borrow the wrapped service as its concrete type.
    pub fn service_ref<S: Any>(&self) -> Option<&S> {
        self.service.downcast_ref()
    }

    fn split(&self) -> (&'static str, &'static str) {
        let trimmed = self.full_method.trim_start_matches('/');
        trimmed.rsplit_once('/').unwrap_or((trimmed, ""))
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInfo")
            .field("full_method", &self.full_method)
            .finish_non_exhaustive()
    }
}

type NextFn<'a> = Box<dyn FnOnce(CallContext, Box<dyn DynMessage>) -> BoxFuture<'a, InterceptResult> + Send + 'a>;

/// Continuation handed to an interceptor.
///
/// Calling [`Next::run`] performs the wrapped call (or the next interceptor
/// of a chain). Not calling it short-circuits the method.
pub struct Next<'a> {
    inner: NextFn<'a>,
}

impl<'a> Next<'a> {
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(CallContext, Box<dyn DynMessage>) -> BoxFuture<'a, InterceptResult> + Send + 'a,
    {
        Self { inner: Box::new(f) }
    }

    pub fn run(self, ctx: CallContext, request: Box<dyn DynMessage>) -> BoxFuture<'a, InterceptResult> {
        (self.inner)(ctx, request)
    }
}

/// Interceptor invoked around every gateway call.
///
/// An implementation may inspect or replace the request (keeping its
/// concrete type), transform the response, or return its own `Status`
/// without calling `next`.
///
/// ```ignore
/// struct Audit;
///
/// impl Interceptor for Audit {
///     fn intercept<'a>(
///         &'a self,
///         ctx: CallContext,
///         request: Box<dyn DynMessage>,
///         info: &'a MethodInfo,
///         next: Next<'a>,
///     ) -> BoxFuture<'a, InterceptResult> {
///         Box::pin(async move {
///             tracing::info!(method = info.full_method, "call");
///             next.run(ctx, request).await
///         })
///     }
/// }
/// ```
pub trait Interceptor: Send + Sync + 'static {
    fn intercept<'a>(
        &'a self,
        ctx: CallContext,
        request: Box<dyn DynMessage>,
        info: &'a MethodInfo,
        next: Next<'a>,
    ) -> BoxFuture<'a, InterceptResult>;
}

impl<I: Interceptor + ?Sized> Interceptor for Arc<I> {
    fn intercept<'a>(
        &'a self,
        ctx: CallContext,
        request: Box<dyn DynMessage>,
        info: &'a MethodInfo,
        next: Next<'a>,
    ) -> BoxFuture<'a, InterceptResult> {
        (**self).intercept(ctx, request, info, next)
    }
}

/// Holds zero or one interceptor.
#[derive(Clone, Default)]
pub struct InterceptorSlot(Option<Arc<dyn Interceptor>>);

impl InterceptorSlot {
    pub fn empty() -> Self {
        Self(None)
    }

    pub fn new(interceptor: impl Interceptor) -> Self {
        Self(Some(Arc::new(interceptor)))
    }

    /// Build a slot from a list of interceptors.
    ///
    /// Zero or one interceptor is accepted; anything more is a
    /// configuration error.
    pub fn from_interceptors<I>(interceptors: I) -> Result<Self, GatewayError>
    where
        I: IntoIterator<Item = Arc<dyn Interceptor>>,
    {
        let mut interceptors: Vec<_> = interceptors.into_iter().collect();
        match interceptors.len() {
            0 => Ok(Self(None)),
            1 => Ok(Self(interceptors.pop())),
            count => Err(GatewayError::TooManyInterceptors { count }),
        }
    }

    pub fn get(&self) -> Option<&Arc<dyn Interceptor>> {
        self.0.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

impl From<Option<Arc<dyn Interceptor>>> for InterceptorSlot {
    fn from(interceptor: Option<Arc<dyn Interceptor>>) -> Self {
        Self(interceptor)
    }
}

impl fmt::Debug for InterceptorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InterceptorSlot")
            .field(&if self.0.is_some() { "attached" } else { "empty" })
            .finish()
    }
}

/// Ordered composition of interceptors.
///
/// The first interceptor is the outermost: it runs first on the way in and
/// last on the way out. A chain is itself an [`Interceptor`], so it can be
/// attached to a gateway's single slot.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Arc<[Arc<dyn Interceptor>]>,
}

impl InterceptorChain {
    pub fn new(interceptors: Vec<Arc<dyn Interceptor>>) -> Self {
        Self {
            interceptors: interceptors.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}

impl Interceptor for InterceptorChain {
    fn intercept<'a>(
        &'a self,
        ctx: CallContext,
        request: Box<dyn DynMessage>,
        info: &'a MethodInfo,
        next: Next<'a>,
    ) -> BoxFuture<'a, InterceptResult> {
        run_chain(&self.interceptors, ctx, request, info, next)
    }
}

fn run_chain<'a>(
    interceptors: &'a [Arc<dyn Interceptor>],
    ctx: CallContext,
    request: Box<dyn DynMessage>,
    info: &'a MethodInfo,
    next: Next<'a>,
) -> BoxFuture<'a, InterceptResult> {
    match interceptors.split_first() {
        None => next.run(ctx, request),
        Some((head, rest)) => {
            let inner = Next::new(move |ctx, request| run_chain(rest, ctx, request, info, next));
            head.intercept(ctx, request, info, inner)
        }
    }
}

/// Run a typed call through `interceptor`.
///
/// The request is erased before entering the interceptor and the
/// continuation restores it to `I` before invoking `call`; the interceptor's
/// result is restored to `O` on the way out.
pub async fn invoke_intercepted<I, O, F, Fut>(
    interceptor: &dyn Interceptor,
    info: &MethodInfo,
    ctx: CallContext,
    input: I,
    call: F,
) -> Result<O, Status>
where
    I: Serialize + Send + Sync + 'static,
    O: Serialize + Send + Sync + 'static,
    F: FnOnce(CallContext, I) -> Fut + Send + 'static,
    Fut: Future<Output = Result<O, Status>> + Send + 'static,
{
    let next = Next::new(move |ctx, request| {
        Box::pin(async move {
            let input = downcast_message::<I>(request)?;
            let output = call(ctx, input).await?;
            Ok::<_, Status>(Box::new(output) as Box<dyn DynMessage>)
        })
    });
    let output = interceptor.intercept(ctx, Box::new(input), info, next).await?;
    downcast_message::<O>(output)
}
