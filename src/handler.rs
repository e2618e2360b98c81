//! Handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! The router needs to hold handlers of *different* types in a single route
//! table. Rust collections can only hold one concrete type, so we use
//! **trait objects** (`dyn ErasedHandler`) to hide the concrete handler type
//! behind a common interface and store everything uniformly.
//!
//! The chain from user code to vtable call is:
//!
//! ```text
//! async fn hello(req: Request) -> impl Into<Reply> { … }   ← user writes this
//!        ↓ app.get("/", hello)
//! hello.into_bound()                                       ← binding (see crate::bind)
//!        ↓
//! Arc::new(FnHandler { f: hello, meta })                   ← normalizing wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(req)  at request time                       ← one vtable dispatch
//!        ↓
//! Box::pin(async { normalize(hello(req).await.into(), meta.headers) })
//! ```
//!
//! The normalizing wrapper is the *innermost* layer of every handler chain:
//! middleware wraps around it and only ever sees finished [`Response`]
//! values. It reads the shared metadata headers at call time, so headers
//! attached after binding (CORS decoration, composition) still apply.
//!
//! The only runtime cost per request is **one Arc clone** (atomic inc) +
//! **one virtual call** — negligible compared to network I/O.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::bind::RouteMeta;
use crate::reply::{Reply, normalize};
use crate::request::Request;
use crate::response::Response;

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
///
/// `Pin<Box<…>>` is required because the async runtime must be able to poll
/// the future in-place — it cannot move it in memory after the first poll.
/// `Send + 'static` let tokio move the future across threads safely.
///
/// `#[doc(hidden)] pub` because it appears in the signatures of
/// [`ErasedHandler::call`] and
/// [`RequestMiddleware::handle`](crate::middleware::RequestMiddleware::handle).
#[doc(hidden)]
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_normalizing` method.
/// External crates cannot usefully interact with this trait.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A heap-allocated, type-erased handler shared across concurrent requests.
///
/// `#[doc(hidden)] pub` for the same reason as `ErasedHandler`.
/// `Arc` gives us cheap, thread-safe shared ownership (one atomic reference
/// count increment per request) without copying the handler.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` with the signature:
///
/// ```text
/// async fn name(req: Request) -> impl Into<Reply>
/// ```
///
/// which covers plain-value returns like `u16`, `String`,
/// `serde_json::Value`, `(u16, serde_json::Value)`, and prebuilt
/// [`Response`] values.
///
/// The trait is **sealed** (via the private `Sealed` supertrait): only the
/// blanket impl below can satisfy it. This prevents accidental misuse and
/// keeps the API surface stable across versions.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_normalizing(self, meta: Arc<RouteMeta>) -> BoxedHandler;
}

/// The sealing module. Because `Sealed` is private, external crates cannot
/// name it and therefore cannot implement `Handler` on their own types.
mod private {
    pub trait Sealed {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

/// Implement the sealing trait for any function with the right signature.
///
/// `Fn(Request) -> Fut` covers:
///   - named `async fn` items
///   - `async` closures
///   - any struct that implements `Fn`
impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Reply> + Send + 'static,
{
}

/// Implement `Handler` for any function with the right signature.
impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Reply> + Send + 'static,
{
    fn into_normalizing(self, meta: Arc<RouteMeta>) -> BoxedHandler {
        Arc::new(FnHandler { f: self, meta })
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Holds a concrete handler `F` plus the shared route metadata, and
/// implements [`ErasedHandler`], bridging the typed world to the trait-object
/// world. This is where response normalization happens — exactly once per
/// request, no matter how many middleware layers wrap around it.
struct FnHandler<F> {
    f: F,
    meta: Arc<RouteMeta>,
}

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Reply> + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        // Call the wrapped function — this returns the concrete `Fut`.
        // We then normalize its plain-value result into a `Response`,
        // merging the metadata headers accumulated by CORS decoration and
        // middleware composition.
        let fut = (self.f)(req);
        let meta = Arc::clone(&self.meta);
        Box::pin(async move {
            let reply = fut.await.into();
            meta.with_headers(|headers| normalize(reply, headers))
        })
    }
}
