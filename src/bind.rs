//! Route metadata and handler binding.
//!
//! Every logical handler owns exactly one [`RouteMeta`] record, created the
//! first time the handler is bound and shared — by `Arc`, never copied — with
//! every middleware layer composed onto it afterwards. The record carries:
//!
//! - the headers merged into every response the handler produces (CORS
//!   decoration writes here), and
//! - the ids of every route the handler currently serves (composition reads
//!   this list to re-target already-registered routes at the new wrapper).
//!
//! Preflight synthesis reads the fully merged header set at startup, which
//! is why all layers must see the *same live* record: a copy taken at wrap
//! time would miss headers attached later.
//!
//! Mutation only happens on the declaring thread while the application is
//! being built. Once the server is running, request tasks take read locks
//! only.

use std::sync::{Arc, Mutex, RwLock};

use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::reply::Headers;
use crate::request::Request;
use crate::router::RouteId;

// ── RouteMeta ─────────────────────────────────────────────────────────────────

/// Shared per-logical-handler record of accumulated headers and registered
/// routes. One per handler chain; held by `Arc` from every layer.
#[derive(Default)]
pub struct RouteMeta {
    headers: RwLock<Headers>,
    routes: Mutex<Vec<RouteId>>,
}

impl RouteMeta {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Sets a metadata header. Later writes overwrite earlier values for the
    /// same key; keys are kept case-sensitive as given.
    pub(crate) fn insert_header(&self, name: &str, value: &str) {
        self.lock_headers().insert(name.to_owned(), value.to_owned());
    }

    /// Exact-key metadata header lookup.
    pub(crate) fn header(&self, name: &str) -> Option<String> {
        self.headers
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Runs `f` with the current header set under the read lock.
    pub(crate) fn with_headers<T>(&self, f: impl FnOnce(&Headers) -> T) -> T {
        f(&self.headers.read().unwrap_or_else(std::sync::PoisonError::into_inner))
    }

    pub(crate) fn push_route(&self, id: RouteId) {
        self.lock_routes().push(id);
    }

    /// The routes this handler chain currently serves, in registration order.
    pub(crate) fn route_ids(&self) -> Vec<RouteId> {
        self.lock_routes().clone()
    }

    fn lock_headers(&self) -> std::sync::RwLockWriteGuard<'_, Headers> {
        self.headers.write().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn lock_routes(&self) -> std::sync::MutexGuard<'_, Vec<RouteId>> {
        self.routes.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

// ── BoundHandler ──────────────────────────────────────────────────────────────

/// A handler wrapped with response normalization, plus its shared metadata.
///
/// Returned by every route-declaration method on [`App`](crate::App); pass it
/// to [`App::wrap`](crate::App::wrap) or a
/// [`HandlerMiddleware`](crate::middleware::HandlerMiddleware) to compose
/// behavior onto it. Cloning is cheap and preserves identity: clones share
/// the same normalizing wrapper and the same metadata record.
#[derive(Clone)]
pub struct BoundHandler {
    pub(crate) inner: BoxedHandler,
    pub(crate) meta: Arc<RouteMeta>,
}

impl BoundHandler {
    /// Invokes the full handler chain for one request.
    pub(crate) fn call(&self, req: Request) -> BoxFuture {
        self.inner.call(req)
    }

    /// The shared metadata record.
    pub(crate) fn meta(&self) -> &Arc<RouteMeta> {
        &self.meta
    }

    /// Attaches a static header to every response this handler chain
    /// produces. Later writes overwrite earlier values for the same key.
    ///
    /// This is the building block for handler middleware like
    /// [`Cors`](crate::Cors): it mutates the shared metadata, so the header
    /// applies no matter which wrapper layer the request enters through.
    pub fn set_header(&self, name: &str, value: &str) {
        self.meta.insert_header(name, value);
    }
}

// ── Binding ───────────────────────────────────────────────────────────────────

/// Conversion into a [`BoundHandler`] — the binding step.
///
/// Binding is idempotent: a raw `async fn` gets fresh metadata and a
/// normalizing wrapper; an already-bound handler passes through unchanged,
/// same wrapper, same metadata record. This is what prevents double
/// normalization when the same handler reaches the framework from multiple
/// code paths (a second route declaration, a middleware wrap).
pub trait IntoBound {
    fn into_bound(self) -> BoundHandler;
}

impl IntoBound for BoundHandler {
    fn into_bound(self) -> BoundHandler {
        self
    }
}

impl<H: Handler> IntoBound for H {
    fn into_bound(self) -> BoundHandler {
        let meta = Arc::new(RouteMeta::new());
        let inner = self.into_normalizing(Arc::clone(&meta));
        BoundHandler { inner, meta }
    }
}
