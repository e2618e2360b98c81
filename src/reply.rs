//! Plain-value handler returns and their normalization into a [`Response`].
//!
//! Handlers do not build protocol objects. They return the thing they mean:
//!
//! ```rust
//! use riposte::{Reply, Request};
//! use serde_json::json;
//!
//! async fn created(_req: Request) -> impl Into<Reply> {
//!     (201, json!({"id": 42}))
//! }
//!
//! async fn gone(_req: Request) -> u16 {
//!     410
//! }
//! ```
//!
//! The conversion into an HTTP response happens exactly once, at the
//! innermost layer of the handler chain, in [`normalize`]. Middleware wraps
//! around that layer and only ever sees a finished [`Response`].
//!
//! [`Reply`] and [`Body`] are closed sums: a handler return that has no
//! normalization rule does not typecheck, so there is no "unsupported body"
//! failure left to handle at request time.

use std::collections::HashMap;

use serde::Serialize;

use crate::response::Response;

/// Headers attached to a reply or accumulated on a handler's metadata.
pub type Headers = HashMap<String, String>;

// ── Reply ─────────────────────────────────────────────────────────────────────

/// Everything a handler may return, as one closed union.
///
/// Handlers rarely name this type. The `From` conversions cover the plain
/// forms directly:
///
/// - `410` — status only, empty body
/// - `json!({"message": "Hello"})` — body only, status 200
/// - `(404, json!({"message": "Not Found"}))` — status + body
/// - `(302, headers, body)` — status + explicit headers + body
pub enum Reply {
    /// Bare status, no body.
    Status(u16),
    /// Body with implied status 200.
    Body(Body),
    /// Status and body.
    StatusBody(u16, Body),
    /// Status, explicit headers, and body.
    Full(u16, Headers, Body),
}

/// The body half of a [`Reply`].
pub enum Body {
    /// No body at all.
    Empty,
    /// Raw bytes, sent as-is with no implied content type.
    Bytes(Vec<u8>),
    /// Plain text, `text/plain; charset=utf-8`.
    Text(String),
    /// A JSON value, rendered deterministically — see [`normalize`].
    Json(serde_json::Value),
    /// An XML document, sent as `text/xml` with an XML declaration.
    Xml(Xml),
    /// An already-built response. Normalization overrides its status and
    /// merges headers onto it; the body is untouched.
    Response(Response),
}

/// An XML document body.
///
/// Holds the serialized element tree. Normalization prepends the XML
/// declaration unless the document already carries one.
pub struct Xml(pub(crate) String);

impl Xml {
    pub fn new(document: impl Into<String>) -> Self {
        Self(document.into())
    }
}

// ── Conversions ───────────────────────────────────────────────────────────────

impl From<u16> for Reply {
    fn from(status: u16) -> Self {
        Reply::Status(status)
    }
}

impl<B: Into<Body>> From<(u16, B)> for Reply {
    fn from((status, body): (u16, B)) -> Self {
        Reply::StatusBody(status, body.into())
    }
}

impl<B: Into<Body>> From<(u16, Headers, B)> for Reply {
    fn from((status, headers, body): (u16, Headers, B)) -> Self {
        Reply::Full(status, headers, body.into())
    }
}

impl From<Body> for Reply {
    fn from(body: Body) -> Self {
        Reply::Body(body)
    }
}

impl From<()> for Body {
    fn from((): ()) -> Self {
        Body::Empty
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Bytes(bytes)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_owned())
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<serde_json::Value> for Body {
    fn from(value: serde_json::Value) -> Self {
        Body::Json(value)
    }
}

impl From<Xml> for Body {
    fn from(doc: Xml) -> Self {
        Body::Xml(doc)
    }
}

impl From<Response> for Body {
    fn from(response: Response) -> Self {
        Body::Response(response)
    }
}

// Body-only forms at the Reply level, so `return json!(…)` and friends work
// without naming Body.
macro_rules! reply_from_body {
    ($($ty:ty),* $(,)?) => {$(
        impl From<$ty> for Reply {
            fn from(value: $ty) -> Self {
                Reply::Body(value.into())
            }
        }
    )*};
}

reply_from_body!((), Vec<u8>, &str, String, serde_json::Value, Xml, Response);

// ── Normalization ─────────────────────────────────────────────────────────────

/// Converts a handler's [`Reply`] into a finished [`Response`].
///
/// `extra` is the handler's accumulated metadata headers (CORS and friends);
/// on a key collision it wins over the reply's own headers, because metadata
/// represents wrapping applied *after* the handler.
///
/// JSON bodies render deterministically: object keys sorted, 4-space
/// indentation, a trailing newline, and non-ASCII characters preserved
/// literally. Non-finite numbers cannot occur — `serde_json::Number` refuses
/// them at construction.
pub(crate) fn normalize(reply: Reply, extra: &Headers) -> Response {
    let (status, mut headers, body) = match reply {
        Reply::Status(status) => (status, Headers::new(), Body::Empty),
        Reply::Body(body) => (200, Headers::new(), body),
        Reply::StatusBody(status, body) => (status, Headers::new(), body),
        Reply::Full(status, headers, body) => (status, headers, body),
    };
    for (name, value) in extra {
        headers.insert(name.clone(), value.clone());
    }

    let mut response = match body {
        Body::Empty => Response::status(status),
        Body::Response(mut response) => {
            response.set_status(status);
            for (name, value) in &headers {
                response.set_header(name, value);
            }
            return response;
        }
        Body::Bytes(bytes) => {
            let mut response = Response::status(status);
            response.body = bytes;
            response
        }
        Body::Text(text) => {
            let mut response = Response::text(text);
            response.set_status(status);
            response
        }
        Body::Json(value) => {
            let mut response = Response::json(render_json(&value));
            response.set_status(status);
            response
        }
        Body::Xml(doc) => Response::builder()
            .status(status)
            .bytes(crate::response::ContentType::Xml, render_xml(doc).into_bytes()),
    };
    for (name, value) in &headers {
        response.set_header(name, value);
    }
    response
}

/// Deterministic JSON rendering: sorted keys (serde_json maps are B-trees),
/// 4-space indent, trailing newline, non-ASCII left unescaped.
fn render_json(value: &serde_json::Value) -> Vec<u8> {
    let mut buf = Vec::with_capacity(128);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    // Serializing a Value into a Vec cannot fail.
    if let Err(e) = value.serialize(&mut ser) {
        tracing::error!("json render failed: {e}");
        return b"null\n".to_vec();
    }
    buf.push(b'\n');
    buf
}

fn render_xml(doc: Xml) -> String {
    if doc.0.starts_with("<?xml") {
        return doc.0;
    }
    format!("<?xml version=\"1.0\" encoding=\"utf-8\"?>{}", doc.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_status_yields_empty_response() {
        for status in [200u16, 404, 500] {
            let res = normalize(status.into(), &Headers::new());
            assert_eq!(res.status_code(), status);
            assert!(res.body().is_empty());
            assert!(res.headers().is_empty());
        }
    }

    #[test]
    fn json_body_round_trips_with_deterministic_layout() {
        let value = json!({"zebra": 1, "alpha": "héllo", "mid": [1, 2]});
        let res = normalize(value.clone().into(), &Headers::new());

        assert_eq!(res.status_code(), 200);
        assert_eq!(res.header("content-type"), Some("application/json"));

        let text = std::str::from_utf8(res.body()).unwrap();
        // Round-trip law.
        let parsed: serde_json::Value = serde_json::from_str(text).unwrap();
        assert_eq!(parsed, value);
        // Sorted keys.
        let alpha = text.find("\"alpha\"").unwrap();
        let mid = text.find("\"mid\"").unwrap();
        let zebra = text.find("\"zebra\"").unwrap();
        assert!(alpha < mid && mid < zebra);
        // 4-space indent, trailing newline, literal non-ASCII.
        assert!(text.contains("\n    \"alpha\""));
        assert!(text.ends_with('\n'));
        assert!(text.contains("héllo"));
    }

    #[test]
    fn status_body_pair() {
        let res = normalize((404u16, json!({"message": "Not Found"})).into(), &Headers::new());
        assert_eq!(res.status_code(), 404);
        let text = std::str::from_utf8(res.body()).unwrap();
        assert_eq!(text, "{\n    \"message\": \"Not Found\"\n}\n");
    }

    #[test]
    fn metadata_headers_win_over_reply_headers() {
        let mut own = Headers::new();
        own.insert("x-owner".to_owned(), "handler".to_owned());
        let mut extra = Headers::new();
        extra.insert("x-owner".to_owned(), "middleware".to_owned());

        let res = normalize((200u16, own, "body").into(), &extra);
        assert_eq!(res.header("x-owner"), Some("middleware"));
    }

    #[test]
    fn prebuilt_response_keeps_body_and_gains_headers() {
        let prebuilt = Response::builder()
            .header("x-original", "yes")
            .text("untouched");
        let mut extra = Headers::new();
        extra.insert("Access-Control-Allow-Origin".to_owned(), "https://x".to_owned());

        let res = normalize((201u16, prebuilt).into(), &extra);
        assert_eq!(res.status_code(), 201);
        assert_eq!(res.body(), b"untouched");
        assert_eq!(res.header("x-original"), Some("yes"));
        assert_eq!(res.header("Access-Control-Allow-Origin"), Some("https://x"));
    }

    #[test]
    fn text_and_bytes_bodies() {
        let res = normalize("hello".into(), &Headers::new());
        assert_eq!(res.header("content-type"), Some("text/plain; charset=utf-8"));
        assert_eq!(res.body(), b"hello");

        let res = normalize(vec![0xde, 0xad].into(), &Headers::new());
        assert_eq!(res.header("content-type"), None);
        assert_eq!(res.body(), &[0xde, 0xad]);
    }

    #[test]
    fn xml_body_gets_declaration_and_content_type() {
        let res = normalize(Xml::new("<ok/>").into(), &Headers::new());
        assert_eq!(res.header("content-type"), Some("text/xml"));
        assert_eq!(res.body(), b"<?xml version=\"1.0\" encoding=\"utf-8\"?><ok/>");
    }
}
