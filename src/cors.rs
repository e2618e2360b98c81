//! CORS decoration and preflight synthesis.
//!
//! [`Cors`] is handler middleware: applying it merges the CORS response
//! headers into the handler's shared metadata, so every response the chain
//! produces carries them.
//!
//! [`synthesize`] is the startup pass that derives `OPTIONS` preflight
//! routes from that metadata. It runs exactly once, at the transition from
//! building to serving — running it earlier would miss routes declared
//! later, and [`Server::serve`](crate::Server::serve) consuming the `App`
//! makes running it twice impossible.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::bind::{BoundHandler, IntoBound};
use crate::method::Method;
use crate::middleware::HandlerMiddleware;
use crate::reply::Headers;
use crate::request::Request;
use crate::router::{RouteMethod, Router};

pub(crate) const ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
pub(crate) const ALLOW_CREDENTIALS: &str = "Access-Control-Allow-Credentials";
pub(crate) const EXPOSE_HEADERS: &str = "Access-Control-Expose-Headers";
pub(crate) const ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";
pub(crate) const ALLOW_METHODS: &str = "Access-Control-Allow-Methods";

// ── Cors ──────────────────────────────────────────────────────────────────────

/// Handler middleware that opts a route into CORS.
///
/// ```rust,no_run
/// use riposte::{App, Cors, Request};
/// use serde_json::json;
///
/// # async fn list(_req: Request) -> serde_json::Value { json!([]) }
/// let mut app = App::new();
/// let handler = app.get("/items", list);
/// app.apply(handler, Cors::new("https://example.com")
///     .expose_headers(["X-Total-Count"])
///     .credentials(true));
/// ```
///
/// At startup, every resource with at least one CORS-decorated route gets a
/// synthesized `OPTIONS` preflight route — see [`synthesize`].
pub struct Cors {
    origin: String,
    expose_headers: Vec<String>,
    credentials: bool,
}

impl Cors {
    pub fn new(origin: impl Into<String>) -> Self {
        Self { origin: origin.into(), expose_headers: Vec::new(), credentials: false }
    }

    /// Headers scripts on the allowed origin may read from responses.
    pub fn expose_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expose_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the browser may send credentials (cookies, authorization).
    pub fn credentials(mut self, credentials: bool) -> Self {
        self.credentials = credentials;
        self
    }
}

impl HandlerMiddleware for Cors {
    fn transform(&self, handler: BoundHandler) -> BoundHandler {
        handler.set_header(ALLOW_ORIGIN, &self.origin);
        if self.credentials {
            handler.set_header(ALLOW_CREDENTIALS, "true");
        }
        if !self.expose_headers.is_empty() {
            handler.set_header(EXPOSE_HEADERS, &self.expose_headers.join(", "));
        }
        handler
    }
}

// ── Preflight synthesis ───────────────────────────────────────────────────────

/// Walks every resource and registers a synthetic `OPTIONS` preflight route
/// where one is warranted. Called exactly once, after all routes are
/// registered and before the server accepts connections.
///
/// Per resource: routes without an `Access-Control-Allow-Origin` metadata
/// header opted out and contribute nothing, not even their method. Among the
/// opted-in routes the last-registered origin wins when they disagree — a
/// documented ambiguity, not a merge policy. Resources that already carry an
/// explicit `OPTIONS` route are left untouched.
pub(crate) fn synthesize(router: &mut Router) {
    let mut planned: Vec<(String, Headers)> = Vec::new();

    for resource in router.resources() {
        let mut origin: Option<String> = None;
        let mut credentials = false;
        let mut expose: BTreeSet<String> = BTreeSet::new();
        let mut methods: BTreeSet<String> = BTreeSet::new();
        let mut has_options = false;

        for route in &resource.routes {
            if route.method == RouteMethod::Only(Method::Options) {
                has_options = true;
            }
            let Some(route_origin) = route.meta.header(ALLOW_ORIGIN) else {
                // No CORS opt-in: skip the route entirely.
                continue;
            };
            origin = Some(route_origin);
            if route.meta.header(ALLOW_CREDENTIALS).is_some_and(|v| !v.is_empty()) {
                credentials = true;
            }
            if let Some(list) = route.meta.header(EXPOSE_HEADERS) {
                expose.extend(list.split(", ").map(str::to_owned));
            }
            methods.insert(route.method.as_str().to_uppercase());
        }

        let Some(origin) = origin else { continue };
        if has_options || methods.contains("OPTIONS") {
            continue;
        }
        methods.insert("OPTIONS".to_owned());

        let mut headers = Headers::new();
        headers.insert(ALLOW_ORIGIN.to_owned(), origin);
        if credentials {
            headers.insert(ALLOW_CREDENTIALS.to_owned(), "true".to_owned());
        }
        if !expose.is_empty() {
            let joined = expose.into_iter().collect::<Vec<_>>().join(", ");
            headers.insert(ALLOW_HEADERS.to_owned(), joined);
        }
        let joined = methods.into_iter().collect::<Vec<_>>().join(", ");
        headers.insert(ALLOW_METHODS.to_owned(), joined);

        planned.push((resource.path.clone(), headers));
    }

    for (path, headers) in planned {
        let bound = preflight.into_bound();
        for (name, value) in &headers {
            bound.set_header(name, value);
        }
        let id = router.add_route(
            RouteMethod::Only(Method::Options),
            &path,
            Arc::clone(&bound.inner),
            Arc::clone(bound.meta()),
        );
        bound.meta().push_route(id);
    }
}

/// The synthesized preflight handler: bare 200, no body. The interesting
/// part — the preflight headers — lives in its metadata.
async fn preflight(_req: Request) -> u16 {
    200
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::App;
    use crate::response::Response;
    use std::collections::HashMap;

    async fn plain(_req: Request) -> u16 {
        200
    }

    async fn preflight_response(router: &Router, path: &str) -> Option<Response> {
        let (handler, _) = router.lookup(Method::Options, path)?;
        let req = Request::new(
            Method::Options,
            path.to_owned(),
            Vec::new(),
            Vec::new(),
            HashMap::new(),
        );
        Some(handler.call(req).await)
    }

    #[tokio::test]
    async fn synthesizes_one_options_route_from_opted_in_methods() {
        let mut app = App::new();
        let get = app.get("/r", plain);
        app.apply(get, Cors::new("https://x"));
        app.post("/r", plain); // no CORS: excluded from the method list

        let mut router = app.into_router();
        synthesize(&mut router);

        assert_eq!(router.resources()[0].routes.len(), 3);
        let res = preflight_response(&router, "/r").await.unwrap();
        assert_eq!(res.status_code(), 200);
        assert!(res.body().is_empty());
        assert_eq!(res.header(ALLOW_ORIGIN), Some("https://x"));
        assert_eq!(res.header(ALLOW_METHODS), Some("GET, OPTIONS"));
        assert_eq!(res.header(ALLOW_CREDENTIALS), None);
    }

    #[tokio::test]
    async fn credentials_and_expose_headers_aggregate() {
        let mut app = App::new();
        let get = app.get("/r", plain);
        app.apply(get, Cors::new("https://x")
            .credentials(true)
            .expose_headers(["X-B", "X-A"]));
        let put = app.put("/r", plain);
        app.apply(put, Cors::new("https://x").expose_headers(["X-C"]));

        let mut router = app.into_router();
        synthesize(&mut router);

        let res = preflight_response(&router, "/r").await.unwrap();
        assert_eq!(res.header(ALLOW_CREDENTIALS), Some("true"));
        // Sorted union across routes.
        assert_eq!(res.header(ALLOW_HEADERS), Some("X-A, X-B, X-C"));
        assert_eq!(res.header(ALLOW_METHODS), Some("GET, OPTIONS, PUT"));
    }

    #[test]
    fn explicit_options_route_suppresses_synthesis() {
        let mut app = App::new();
        let get = app.get("/r", plain);
        app.apply(get, Cors::new("https://x"));
        app.options("/r", plain);

        let mut router = app.into_router();
        synthesize(&mut router);

        // Still just the two declared routes.
        assert_eq!(router.resources()[0].routes.len(), 2);
    }

    #[test]
    fn resource_without_cors_gets_no_preflight() {
        let mut app = App::new();
        app.get("/plain", plain);

        let mut router = app.into_router();
        synthesize(&mut router);

        assert_eq!(router.resources()[0].routes.len(), 1);
        assert!(router.lookup(Method::Options, "/plain").is_none());
    }

    #[tokio::test]
    async fn wildcard_route_shadows_its_synthesized_preflight() {
        let mut app = App::new();
        let any = app.any("/r", plain);
        app.apply(any, Cors::new("https://x"));

        let mut router = app.into_router();
        synthesize(&mut router);

        // The preflight route is registered, with the wildcard contributing
        // "*" to the method list…
        assert_eq!(router.resources()[0].routes.len(), 2);
        let synthesized = &router.resources()[0].routes[1];
        assert_eq!(synthesized.meta.header(ALLOW_METHODS).as_deref(), Some("*, OPTIONS"));

        // …but dispatch tries routes in registration order, so the earlier
        // wildcard answers OPTIONS itself and the preflight headers are
        // never served on this resource.
        let res = preflight_response(&router, "/r").await.unwrap();
        assert_eq!(res.header(ALLOW_METHODS), None);
        assert_eq!(res.header(ALLOW_ORIGIN), Some("https://x"));
    }

    #[tokio::test]
    async fn conflicting_origins_last_registration_wins() {
        let mut app = App::new();
        let get = app.get("/r", plain);
        app.apply(get, Cors::new("https://first"));
        let post = app.post("/r", plain);
        app.apply(post, Cors::new("https://second"));

        let mut router = app.into_router();
        synthesize(&mut router);

        let res = preflight_response(&router, "/r").await.unwrap();
        assert_eq!(res.header(ALLOW_ORIGIN), Some("https://second"));
    }
}
