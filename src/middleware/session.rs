//! Session-identifier cookie middleware.

use uuid::Uuid;

use crate::handler::BoxFuture;
use crate::middleware::{Next, RequestMiddleware};
use crate::request::Request;

const SECONDS: u64 = 1;
const MINUTES: u64 = 60 * SECONDS;
const HOURS: u64 = 60 * MINUTES;
const DAYS: u64 = 24 * HOURS;
const YEARS: u64 = 365 * DAYS;

/// Request middleware that gives every visitor a stable session identifier.
///
/// On the way in: reads the `session` cookie, or mints a UUID when the
/// request carries none, and exposes it via
/// [`Request::session`](crate::Request::session). On the way out: sets the
/// cookie on the response so the identifier sticks.
///
/// ```rust,no_run
/// use riposte::{App, Request, middleware::Session};
///
/// # async fn whoami(req: Request) -> String {
/// #     req.session().unwrap_or("anonymous").to_owned()
/// # }
/// let mut app = App::new();
/// let handler = app.get("/whoami", whoami);
/// app.wrap(handler, Session::new());
/// ```
pub struct Session {
    max_age: u64,
    secure: bool,
    http_only: bool,
}

impl Session {
    /// Defaults: ten-year lifetime, `Secure`, `HttpOnly`, `Path=/`.
    pub fn new() -> Self {
        Self { max_age: 10 * YEARS, secure: true, http_only: true }
    }

    /// Cookie lifetime in seconds.
    pub fn max_age(mut self, seconds: u64) -> Self {
        self.max_age = seconds;
        self
    }

    /// Whether to mark the cookie `Secure` (HTTPS only).
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Whether to mark the cookie `HttpOnly` (invisible to scripts).
    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    fn cookie(&self, id: &str) -> String {
        let mut cookie = format!("session={id}; Max-Age={}; Path=/", self.max_age);
        if self.secure {
            cookie.push_str("; Secure");
        }
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        cookie
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestMiddleware for Session {
    fn handle(&self, mut req: Request, next: Next) -> BoxFuture {
        let id = match req.cookie("session") {
            Some(id) => id.to_owned(),
            None => Uuid::new_v4().to_string(),
        };
        req.set_session(id.clone());
        let cookie = self.cookie(&id);
        Box::pin(async move {
            let mut response = next.run(req).await;
            response.append_header("set-cookie", &cookie);
            response
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::IntoBound;
    use crate::method::Method;
    use std::collections::HashMap;

    fn next() -> Next {
        let bound = (|req: Request| async move {
            // Echo the session id the middleware installed.
            req.session().unwrap_or("none").to_owned()
        })
        .into_bound();
        Next { inner: bound.inner }
    }

    fn request(headers: Vec<(String, String)>) -> Request {
        Request::new(Method::Get, "/".to_owned(), headers, Vec::new(), HashMap::new())
    }

    #[tokio::test]
    async fn mints_an_id_when_no_cookie_is_present() {
        let res = Session::new().handle(request(Vec::new()), next()).await;
        let cookie = res.header("set-cookie").unwrap();
        assert!(cookie.starts_with("session="));
        assert!(cookie.contains("Max-Age=315360000"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("HttpOnly"));
        // The handler saw the same id the cookie carries.
        let id = cookie.strip_prefix("session=").unwrap().split(';').next().unwrap();
        assert_eq!(res.body(), id.as_bytes());
    }

    #[tokio::test]
    async fn echoes_an_existing_session_cookie() {
        let req = request(vec![("cookie".to_owned(), "session=abc123".to_owned())]);
        let res = Session::new().handle(req, next()).await;
        assert_eq!(res.body(), b"abc123");
        assert!(res.header("set-cookie").unwrap().starts_with("session=abc123;"));
    }

    #[tokio::test]
    async fn attributes_follow_configuration() {
        let req = request(Vec::new());
        let res = Session::new().max_age(60).secure(false).http_only(false)
            .handle(req, next()).await;
        let cookie = res.header("set-cookie").unwrap();
        assert!(cookie.contains("Max-Age=60"));
        assert!(!cookie.contains("Secure"));
        assert!(!cookie.contains("HttpOnly"));
    }
}
