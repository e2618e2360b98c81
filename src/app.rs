//! Application builder: route declarations and middleware composition.

use std::sync::Arc;

use crate::bind::{BoundHandler, IntoBound};
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::method::Method;
use crate::middleware::{HandlerMiddleware, Next, RequestMiddleware};
use crate::router::{RouteMethod, Router};

/// The application under construction.
///
/// Declare routes and compose middleware while building; then hand the app
/// to [`Server::serve`](crate::Server::serve), which runs CORS preflight
/// synthesis once and starts accepting connections. `serve` takes the `App`
/// by value — the building phase ends there and cannot resume.
///
/// ```rust,no_run
/// use riposte::{App, Cors, Request, Server, middleware};
/// use serde_json::json;
///
/// async fn hello(_req: Request) -> serde_json::Value {
///     json!({"message": "Hello, World!"})
/// }
///
/// async fn not_found(_req: Request) -> impl Into<riposte::Reply> {
///     (404, json!({"message": "Not Found"}))
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let mut app = App::new();
///     let hello = app.get("/", hello);
///     let hello = app.wrap(hello, middleware::trace);
///     app.apply(hello, Cors::new("*"));
///     app.get("/missing", not_found);
///
///     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
/// }
/// ```
pub struct App {
    router: Router,
}

impl App {
    pub fn new() -> Self {
        Self { router: Router::new() }
    }

    /// Registers a handler for any method on `path` (the `"*"` wildcard).
    pub fn any(&mut self, path: &str, handler: impl IntoBound) -> BoundHandler {
        self.add(RouteMethod::Any, path, handler)
    }

    /// Registers a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax — `req.param("name")` retrieves
    /// them. Returns the bound handler: pass it to [`wrap`](Self::wrap) or
    /// [`apply`](Self::apply) to compose middleware onto it, or to another
    /// route declaration to serve a second path with the same chain.
    ///
    /// # Panics
    ///
    /// Panics if the matcher rejects the path template.
    pub fn route(&mut self, method: Method, path: &str, handler: impl IntoBound) -> BoundHandler {
        self.add(RouteMethod::Only(method), path, handler)
    }

    pub fn options(&mut self, path: &str, handler: impl IntoBound) -> BoundHandler {
        self.route(Method::Options, path, handler)
    }
    pub fn head(&mut self, path: &str, handler: impl IntoBound) -> BoundHandler {
        self.route(Method::Head, path, handler)
    }
    pub fn get(&mut self, path: &str, handler: impl IntoBound) -> BoundHandler {
        self.route(Method::Get, path, handler)
    }
    pub fn post(&mut self, path: &str, handler: impl IntoBound) -> BoundHandler {
        self.route(Method::Post, path, handler)
    }
    pub fn put(&mut self, path: &str, handler: impl IntoBound) -> BoundHandler {
        self.route(Method::Put, path, handler)
    }
    pub fn patch(&mut self, path: &str, handler: impl IntoBound) -> BoundHandler {
        self.route(Method::Patch, path, handler)
    }
    pub fn delete(&mut self, path: &str, handler: impl IntoBound) -> BoundHandler {
        self.route(Method::Delete, path, handler)
    }

    fn add(&mut self, method: RouteMethod, path: &str, handler: impl IntoBound) -> BoundHandler {
        let bound = handler.into_bound();
        let id = self.router.add_route(
            method,
            path,
            Arc::clone(&bound.inner),
            Arc::clone(bound.meta()),
        );
        bound.meta().push_route(id);
        bound
    }

    /// Composes request middleware around a handler.
    ///
    /// Every route the handler already serves is re-targeted at the new
    /// wrapper in place, and the wrapper shares the handler's metadata
    /// record — same headers, same route list, same identity. Wrap the
    /// result again to stack: the last wrap applied intercepts first.
    pub fn wrap(
        &mut self,
        handler: impl IntoBound,
        middleware: impl RequestMiddleware,
    ) -> BoundHandler {
        let bound = handler.into_bound();
        let wrapped: BoxedHandler = Arc::new(Wrapped {
            middleware,
            inner: Arc::clone(&bound.inner),
        });
        for id in bound.meta().route_ids() {
            self.router.set_handler(id, Arc::clone(&wrapped));
        }
        BoundHandler { inner: wrapped, meta: Arc::clone(bound.meta()) }
    }

    /// Applies handler middleware: a one-shot transformation of the bound
    /// handler at composition time, with no route re-targeting (the result
    /// is used wherever the handler would have been).
    pub fn apply(
        &mut self,
        handler: impl IntoBound,
        middleware: impl HandlerMiddleware,
    ) -> BoundHandler {
        middleware.transform(handler.into_bound())
    }

    /// Ends the building phase, surrendering the route table.
    pub(crate) fn into_router(self) -> Router {
        self.router
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// A request-middleware layer in the handler chain. Holds the middleware and
/// the next handler down; the shared metadata lives on the [`BoundHandler`]
/// wrapping this.
struct Wrapped<M> {
    middleware: M,
    inner: BoxedHandler,
}

impl<M: RequestMiddleware> ErasedHandler for Wrapped<M> {
    fn call(&self, req: crate::request::Request) -> BoxFuture {
        self.middleware.handle(req, Next { inner: Arc::clone(&self.inner) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;
    use crate::response::Response;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn request(method: Method, path: &str) -> Request {
        Request::new(method, path.to_owned(), Vec::new(), Vec::new(), HashMap::new())
    }

    type Recorder = Arc<Mutex<Vec<&'static str>>>;

    fn recording(
        tag_in: &'static str,
        tag_out: &'static str,
        rec: Recorder,
    ) -> impl Fn(Request, Next) -> BoxFuture + Send + Sync + 'static {
        move |req, next| {
            let rec = Arc::clone(&rec);
            Box::pin(async move {
                rec.lock().unwrap().push(tag_in);
                let res = next.run(req).await;
                rec.lock().unwrap().push(tag_out);
                res
            })
        }
    }

    #[tokio::test]
    async fn middleware_nests_last_wrap_outermost() {
        let rec: Recorder = Arc::new(Mutex::new(Vec::new()));

        let handler_rec = Arc::clone(&rec);
        let mut app = App::new();
        let bound = app.get("/x", move |_req: Request| {
            let rec = Arc::clone(&handler_rec);
            async move {
                rec.lock().unwrap().push("H");
                200u16
            }
        });
        let bound = app.wrap(bound, recording("B:in", "B:out", Arc::clone(&rec)));
        app.wrap(bound, recording("A:in", "A:out", Arc::clone(&rec)));

        let router = app.into_router();
        let (handler, _) = router.lookup(Method::Get, "/x").unwrap();
        let res = handler.call(request(Method::Get, "/x")).await;

        assert_eq!(res.status_code(), 200);
        assert_eq!(*rec.lock().unwrap(), ["A:in", "B:in", "H", "B:out", "A:out"]);
    }

    #[tokio::test]
    async fn wrap_retargets_already_registered_routes() {
        let mut app = App::new();
        let bound = app.get("/x", |_req: Request| async { 200u16 });
        app.wrap(bound, |req: Request, next: Next| async move {
            let mut res = next.run(req).await;
            res.set_header("x-wrapped", "yes");
            res
        });

        let router = app.into_router();
        let (handler, _) = router.lookup(Method::Get, "/x").unwrap();
        let res = handler.call(request(Method::Get, "/x")).await;
        assert_eq!(res.header("x-wrapped"), Some("yes"));
    }

    #[tokio::test]
    async fn composition_shares_one_metadata_record() {
        let mut app = App::new();
        let bound = app.get("/x", |_req: Request| async { 200u16 });
        let wrapped = app.wrap(bound.clone(), |req: Request, next: Next| async move {
            next.run(req).await
        });

        assert!(Arc::ptr_eq(bound.meta(), wrapped.meta()));

        // Headers attached through the outer layer reach the innermost
        // normalization step.
        wrapped.set_header("x-shared", "live");
        let router = app.into_router();
        let (handler, _) = router.lookup(Method::Get, "/x").unwrap();
        let res = handler.call(request(Method::Get, "/x")).await;
        assert_eq!(res.header("x-shared"), Some("live"));
    }

    #[tokio::test]
    async fn one_chain_can_serve_several_routes() {
        let mut app = App::new();
        let bound = app.get("/a", |_req: Request| async { "shared" });
        app.post("/b", bound.clone());
        app.wrap(bound.clone(), |req: Request, next: Next| async move {
            let mut res = next.run(req).await;
            res.set_header("x-wrapped", "yes");
            res
        });

        assert_eq!(bound.meta().route_ids().len(), 2);

        // Both registrations dispatch to the wrapper.
        let router = app.into_router();
        for (method, path) in [(Method::Get, "/a"), (Method::Post, "/b")] {
            let (handler, _) = router.lookup(method, path).unwrap();
            let res = handler.call(request(method, path)).await;
            assert_eq!(res.header("x-wrapped"), Some("yes"));
            assert_eq!(res.body(), b"shared");
        }
    }

    #[tokio::test]
    async fn prebuilt_response_gains_cors_header_from_handler_middleware() {
        let mut app = App::new();
        let bound = app.get("/x", |_req: Request| async {
            Response::builder().header("x-own", "kept").text("body")
        });
        app.apply(bound, crate::Cors::new("https://x"));

        let router = app.into_router();
        let (handler, _) = router.lookup(Method::Get, "/x").unwrap();
        let res = handler.call(request(Method::Get, "/x")).await;
        assert_eq!(res.header("x-own"), Some("kept"));
        assert_eq!(res.header("Access-Control-Allow-Origin"), Some("https://x"));
        assert_eq!(res.body(), b"body");
    }
}
