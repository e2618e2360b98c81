//! Incoming HTTP request type.

use std::collections::HashMap;

use crate::method::Method;

/// An incoming HTTP request.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Vec<u8>,
    pub(crate) params: HashMap<String, String>,
    pub(crate) session: Option<String>,
}

impl Request {
    pub(crate) fn new(
        method: Method,
        path: String,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
        params: HashMap<String, String>,
    ) -> Self {
        Self { method, path, headers, body, params, session: None }
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns a cookie value from the `cookie` request header.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.header("cookie")?
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v)
    }

    /// The session identifier, if session middleware is installed.
    ///
    /// `None` unless the handler chain includes
    /// [`middleware::session`](crate::middleware::session).
    pub fn session(&self) -> Option<&str> {
        self.session.as_deref()
    }

    /// Sets the session identifier for this request. Called by session
    /// middleware; visible to everything downstream of it.
    pub fn set_session(&mut self, id: impl Into<String>) {
        self.session = Some(id.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_headers(headers: Vec<(String, String)>) -> Request {
        Request::new(Method::Get, "/".to_owned(), headers, Vec::new(), HashMap::new())
    }

    #[test]
    fn cookie_lookup_handles_multiple_pairs() {
        let req = request_with_headers(vec![
            ("Cookie".to_owned(), "theme=dark; session=abc123; lang=en".to_owned()),
        ]);
        assert_eq!(req.cookie("session"), Some("abc123"));
        assert_eq!(req.cookie("lang"), Some("en"));
        assert_eq!(req.cookie("missing"), None);
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = request_with_headers(vec![
            ("X-Request-Id".to_owned(), "42".to_owned()),
        ]);
        assert_eq!(req.header("x-request-id"), Some("42"));
    }
}
