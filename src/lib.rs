//! # riposte
//!
//! A minimal HTTP framework where handlers return plain values.
//! Nothing more. Nothing less.
//!
//! ## The contract
//!
//! A handler says what it means and nothing else: a status code, a JSON
//! value, a byte string, or — when it really needs to — a prebuilt
//! [`Response`]. The framework turns that plain value into a well-formed
//! HTTP response exactly once, at the innermost layer of the handler chain:
//!
//! - `return 410` — bare status, empty body
//! - `return json!({"message": "Hello"})` — 200, `application/json`,
//!   deterministic formatting (sorted keys, 4-space indent)
//! - `return (404, json!({"message": "Not Found"}))` — status + body
//! - `return (302, headers, body)` — status + explicit headers + body
//!
//! Cross-cutting behavior composes around that:
//!
//! - **Request middleware** (`async fn(Request, Next) -> Response`)
//!   intercepts every call — tracing, sessions, auth.
//! - **Handler middleware** transforms a handler once at setup —
//!   [`Cors`] attaches its headers this way.
//! - Every layer shares one live metadata record per handler, so wrappers
//!   attach headers and re-target routes without clobbering each other.
//! - At startup, resources with CORS-decorated routes get their `OPTIONS`
//!   preflight route synthesized from that metadata automatically.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use riposte::{App, Cors, Request, Server, middleware};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut app = App::new();
//!
//!     let users = app.get("/users/{id}", get_user);
//!     let users = app.wrap(users, middleware::trace);
//!     app.apply(users, Cors::new("https://example.com"));
//!
//!     app.post("/users", create_user);
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn get_user(req: Request) -> serde_json::Value {
//!     let id = req.param("id").unwrap_or("unknown");
//!     json!({"id": id, "name": "alice"})
//! }
//!
//! async fn create_user(req: Request) -> impl Into<riposte::Reply> {
//!     if req.body().is_empty() {
//!         return (400, json!({"message": "empty body"}));
//!     }
//!     (201, json!({"id": 99}))
//! }
//! ```

mod app;
mod bind;
mod cors;
mod error;
mod handler;
mod method;
mod reply;
mod request;
mod response;
mod router;
mod server;

pub mod middleware;

pub use app::App;
pub use bind::{BoundHandler, IntoBound};
pub use cors::Cors;
pub use error::Error;
pub use handler::Handler;
pub use method::Method;
pub use middleware::{HandlerMiddleware, Next, RequestMiddleware};
pub use reply::{Body, Headers, Reply, Xml};
pub use request::Request;
pub use response::{ContentType, Response, ResponseBuilder};
pub use server::Server;
