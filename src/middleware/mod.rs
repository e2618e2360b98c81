//! Middleware layer.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns: structured tracing, session cookies, and CORS
//! header injection.
//!
//! Two shapes exist, as two distinct named traits — which one you want is a
//! question of *when* the behavior runs:
//!
//! - [`RequestMiddleware`] runs **per request**. It receives the request and
//!   a [`Next`] continuation, and may short-circuit, transform the request,
//!   or post-process the response. Any
//!   `async fn(Request, Next) -> Response` qualifies. Compose with
//!   [`App::wrap`](crate::App::wrap).
//! - [`HandlerMiddleware`] runs **once, at composition time**, producing a
//!   replacement handler. The typical use is attaching static headers to a
//!   handler's shared metadata — no per-request work at all.
//!   [`Cors`](crate::Cors) is one. Compose with
//!   [`App::apply`](crate::App::apply).
//!
//! Stacked wraps nest: the *last* wrap applied intercepts first, and its
//! `next` resolves to everything applied before it, terminating at the
//! normalized handler.
//!
//! Built-ins:
//! - [`session`] — session-identifier cookie, minted per visitor
//! - [`trace`] — per-request log line with method, path, status, latency

mod session;
mod trace;

pub use session::Session;
pub use trace::trace;

use crate::bind::BoundHandler;
use crate::handler::{BoxFuture, BoxedHandler};
use crate::request::Request;
use crate::response::Response;

/// Per-request middleware: intercepts every call through the handler chain.
///
/// Implemented automatically for any
/// `Fn(Request, Next) -> impl Future<Output = Response>`:
///
/// ```rust
/// use riposte::{Next, Request, Response};
///
/// async fn always_ok(req: Request, next: Next) -> Response {
///     let mut response = next.run(req).await;
///     response.set_status(200);
///     response
/// }
/// ```
pub trait RequestMiddleware: Send + Sync + 'static {
    fn handle(&self, req: Request, next: Next) -> BoxFuture;
}

impl<F, Fut> RequestMiddleware for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Response> + Send + 'static,
{
    fn handle(&self, req: Request, next: Next) -> BoxFuture {
        Box::pin(self(req, next))
    }
}

/// Composition-time middleware: transforms a bound handler once, before any
/// request arrives. The result is used wherever the handler would have been.
pub trait HandlerMiddleware {
    fn transform(&self, handler: BoundHandler) -> BoundHandler;
}

impl<F> HandlerMiddleware for F
where
    F: Fn(BoundHandler) -> BoundHandler,
{
    fn transform(&self, handler: BoundHandler) -> BoundHandler {
        self(handler)
    }
}

/// The continuation handed to request middleware: everything beneath the
/// current layer, down to the normalized handler.
pub struct Next {
    pub(crate) inner: BoxedHandler,
}

impl Next {
    /// Runs the rest of the handler chain.
    pub async fn run(self, req: Request) -> Response {
        self.inner.call(req).await
    }
}
