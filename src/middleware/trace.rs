//! Per-request tracing middleware.

use std::time::Instant;

use tracing::info;

use crate::middleware::Next;
use crate::request::Request;
use crate::response::Response;

/// Logs one line per request: method, path, response status, latency.
///
/// A plain `async fn`, so it composes like any other request middleware:
///
/// ```rust,no_run
/// use riposte::{App, middleware};
///
/// # async fn index(_req: riposte::Request) -> u16 { 200 }
/// let mut app = App::new();
/// let handler = app.get("/", index);
/// app.wrap(handler, middleware::trace);
/// ```
pub async fn trace(req: Request, next: Next) -> Response {
    let method = req.method();
    let path = req.path().to_owned();
    let start = Instant::now();
    let response = next.run(req).await;
    info!(
        %method,
        path,
        status = response.status_code(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "request"
    );
    response
}
