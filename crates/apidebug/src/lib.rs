//! apidebug - captured API calls and payload pretty-printing for debug toolbars
//!
//! This crate provides the two leaf pieces an API debug toolbar needs:
//!
//! - [`CallRecord`] - the record of one outbound API call, with memoized
//!   URL decomposition ([`UrlElements`]) and query parameter parsing.
//!   [`CapturedCall`] is a ready-made implementation for collectors.
//! - [`PrettyPrinter`] - renders a payload as an HTML fragment based on its
//!   mime type (JSON, XML/HTML as text, form data, images, plain text).
//!
//! ```
//! use apidebug::{CallRecord, CapturedCall, Headers, PrettyPrinter};
//!
//! let mut call = CapturedCall::new("users", "GET", "https://api.example.com/users?page=2");
//! let mut headers = Headers::new();
//! headers.insert("Content-Type".into(), "application/json; charset=utf-8".into());
//! call.record_response(200, headers, Some(r#"{"id":1}"#.into()));
//!
//! assert_eq!(call.url_query_parameters()["page"], "2");
//!
//! let printer = PrettyPrinter::default();
//! let mime = call.response_content_type().unwrap_or_default();
//! let html = printer.prettify(call.response_body().unwrap_or_default(), mime);
//! assert!(html.is_renderable());
//! ```

mod captured;
mod error;
mod mime;
mod record;
mod render;
mod url_elements;

pub use captured::{CapturedCall, CapturedResponse};
pub use error::ApiDebugError;
pub use mime::{base_mime_type, sniff_mime_type};
pub use record::{find_header, CallRecord, Headers};
pub use render::{
    escape_html, PrettyPrinter, PrettyPrinterBuilder, Rendering, DEFAULT_IMAGE_MAX_HEIGHT_PX,
    DEFAULT_IMAGE_MAX_WIDTH, DEFAULT_JSON_INDENT,
};
pub use url_elements::{
    parse_query_string, parse_query_string_strict, QueryParameters, UrlCache, UrlComponent,
    UrlElements,
};
