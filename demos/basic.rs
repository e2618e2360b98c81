//! Minimal riposte example — plain-value handlers, CORS, sessions.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl -X POST http://localhost:3000/users \
//!        -H 'content-type: application/json' \
//!        -d '{"name":"alice"}'
//!   curl -X OPTIONS -i http://localhost:3000/users/42   # synthesized preflight
//!   curl -i http://localhost:3000/whoami                # session cookie

use riposte::{App, Cors, Reply, Request, Server, middleware};
use serde_json::json;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let mut app = App::new();

    // GET /users/{id} — CORS-decorated, so startup synthesizes
    // `OPTIONS /users/{id}` with Allow-Methods "GET, OPTIONS".
    let user = app.get("/users/{id}", get_user);
    let user = app.wrap(user, middleware::trace);
    app.apply(user, Cors::new("https://example.com").expose_headers(["X-Total-Count"]));

    app.post("/users", create_user);
    app.delete("/users/{id}", delete_user);

    let whoami = app.get("/whoami", whoami);
    app.wrap(whoami, middleware::Session::new().secure(false));

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}

// GET /users/{id} — return the JSON value itself; the framework renders it
// with sorted keys, 4-space indentation, and a trailing newline.
async fn get_user(req: Request) -> serde_json::Value {
    let id = req.param("id").unwrap_or("unknown");
    json!({"id": id, "name": "alice"})
}

// POST /users — status + body pairs for the non-200 cases.
async fn create_user(req: Request) -> impl Into<Reply> {
    if req.body().is_empty() {
        return (400, json!({"message": "empty body"}));
    }
    (201, json!({"id": 99, "name": "new_user"}))
}

// DELETE /users/{id} — a bare status is a complete reply.
async fn delete_user(_req: Request) -> u16 {
    204
}

// GET /whoami — session middleware mints and persists the identifier.
async fn whoami(req: Request) -> String {
    format!("you are {}", req.session().unwrap_or("anonymous"))
}
