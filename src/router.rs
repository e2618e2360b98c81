//! Resource-table request router.
//!
//! A [`matchit`] radix tree maps each path template to a **resource**: the
//! group of all routes registered on that path across methods. Each route
//! stores its handler in a replaceable slot, addressed by [`RouteId`], so
//! middleware composition can re-target an already-registered route at a new
//! wrapper without re-registration — already-matched paths immediately
//! dispatch to the latest wrapper.
//!
//! The table is only mutated while the application is being built; the
//! server freezes it behind an `Arc` before accepting connections.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::bind::RouteMeta;
use crate::handler::BoxedHandler;
use crate::method::Method;

/// Stable address of one registered route: which resource, which slot.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RouteId {
    pub(crate) resource: usize,
    pub(crate) index: usize,
}

/// The method pattern a route answers to. `Any` is the `"*"` wildcard.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum RouteMethod {
    Any,
    Only(Method),
}

impl RouteMethod {
    pub(crate) fn matches(self, method: Method) -> bool {
        match self {
            Self::Any => true,
            Self::Only(m) => m == method,
        }
    }

    /// Wire representation: the method name, or `"*"` for the wildcard.
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Any => "*",
            Self::Only(m) => m.as_str(),
        }
    }
}

/// One registered route: method pattern, replaceable handler target, and the
/// shared metadata of the handler chain serving it.
pub(crate) struct Route {
    pub(crate) method: RouteMethod,
    pub(crate) handler: BoxedHandler,
    pub(crate) meta: Arc<RouteMeta>,
}

/// All routes sharing one path template, in registration order.
pub(crate) struct Resource {
    pub(crate) path: String,
    pub(crate) routes: Vec<Route>,
}

/// The application route table.
pub(crate) struct Router {
    tree: MatchitRouter<usize>,
    by_path: HashMap<String, usize>,
    resources: Vec<Resource>,
}

impl Router {
    pub(crate) fn new() -> Self {
        Self {
            tree: MatchitRouter::new(),
            by_path: HashMap::new(),
            resources: Vec::new(),
        }
    }

    /// Registers a route and returns its id. Appends to the existing
    /// resource when the path template is already known, otherwise inserts a
    /// new resource into the tree.
    ///
    /// # Panics
    ///
    /// Panics if the matcher rejects the path template — a programming
    /// error caught while the application is being built.
    pub(crate) fn add_route(
        &mut self,
        method: RouteMethod,
        path: &str,
        handler: BoxedHandler,
        meta: Arc<RouteMeta>,
    ) -> RouteId {
        let resource = match self.by_path.get(path) {
            Some(&index) => index,
            None => {
                let index = self.resources.len();
                self.tree
                    .insert(path, index)
                    .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
                self.by_path.insert(path.to_owned(), index);
                self.resources.push(Resource { path: path.to_owned(), routes: Vec::new() });
                index
            }
        };
        let index = self.resources[resource].routes.len();
        self.resources[resource].routes.push(Route { method, handler, meta });
        RouteId { resource, index }
    }

    /// Replaces a route's handler target in place. Composition calls this for
    /// every route the wrapped handler serves.
    pub(crate) fn set_handler(&mut self, id: RouteId, handler: BoxedHandler) {
        self.resources[id.resource].routes[id.index].handler = handler;
    }

    /// Read-only view of every resource, in registration order. Preflight
    /// synthesis walks this once at startup.
    pub(crate) fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Resolves a request to a handler and its path parameters.
    ///
    /// Routes on a resource are tried in registration order; the wildcard
    /// method matches anything.
    pub(crate) fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let matched = self.tree.at(path).ok()?;
        let resource = &self.resources[*matched.value];
        let route = resource.routes.iter().find(|r| r.method.matches(method))?;
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((Arc::clone(&route.handler), params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::IntoBound;
    use crate::request::Request;

    fn bound() -> crate::bind::BoundHandler {
        (|_req: Request| async { 200u16 }).into_bound()
    }

    #[test]
    fn routes_on_one_path_share_a_resource() {
        let mut router = Router::new();
        let get = bound();
        let post = bound();
        router.add_route(RouteMethod::Only(Method::Get), "/r", Arc::clone(&get.inner), Arc::clone(get.meta()));
        router.add_route(RouteMethod::Only(Method::Post), "/r", Arc::clone(&post.inner), Arc::clone(post.meta()));

        assert_eq!(router.resources().len(), 1);
        assert_eq!(router.resources()[0].routes.len(), 2);
    }

    #[test]
    fn lookup_respects_method_and_wildcard() {
        let mut router = Router::new();
        let get = bound();
        let any = bound();
        router.add_route(RouteMethod::Only(Method::Get), "/a", Arc::clone(&get.inner), Arc::clone(get.meta()));
        router.add_route(RouteMethod::Any, "/b", Arc::clone(&any.inner), Arc::clone(any.meta()));

        assert!(router.lookup(Method::Get, "/a").is_some());
        assert!(router.lookup(Method::Post, "/a").is_none());
        assert!(router.lookup(Method::Delete, "/b").is_some());
        assert!(router.lookup(Method::Get, "/missing").is_none());
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn invalid_path_template_panics_at_registration() {
        let mut router = Router::new();
        let get = bound();
        router.add_route(
            RouteMethod::Only(Method::Get),
            "/users/{id",
            Arc::clone(&get.inner),
            Arc::clone(get.meta()),
        );
    }

    #[test]
    fn lookup_extracts_path_parameters() {
        let mut router = Router::new();
        let get = bound();
        router.add_route(RouteMethod::Only(Method::Get), "/users/{id}", Arc::clone(&get.inner), Arc::clone(get.meta()));

        let (_, params) = router.lookup(Method::Get, "/users/42").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("42"));
    }
}
