//! HTML pretty-printing of payloads by mime type
//!
//! Design: [`PrettyPrinter`] dispatches on the exact base mime type to one
//! rendering strategy. Every strategy degrades to an escaped raw code block
//! instead of failing, and types without a strategy yield
//! [`Rendering::NotRenderable`].

use crate::mime::sniff_mime_type;
use base64::Engine;
use indexmap::IndexMap;
use serde::Serialize;
use std::borrow::Cow;
use tracing::debug;

/// Default maximum height of inline images, in pixels
pub const DEFAULT_IMAGE_MAX_HEIGHT_PX: u32 = 200;

/// Default maximum width of inline images, as a CSS length
pub const DEFAULT_IMAGE_MAX_WIDTH: &str = "100%";

/// Default JSON indentation width, in spaces
pub const DEFAULT_JSON_INDENT: usize = 4;

/// Mime types rendered as indented JSON
const JSON_TYPES: &[&str] = &[
    "application/json",
    "application/x-javascript",
    "text/javascript",
    "text/x-javascript",
    "text/x-json",
];

const XML_TYPES: &[&str] = &["application/xml", "text/xml"];

const IMAGE_TYPES: &[&str] = &["image/gif", "image/jpeg", "image/png"];

/// Result of pretty-printing a payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendering {
    /// HTML fragment ready for embedding
    Html(String),
    /// The mime type has no renderable form
    NotRenderable,
}

impl Rendering {
    pub fn is_renderable(&self) -> bool {
        matches!(self, Rendering::Html(_))
    }

    pub fn as_html(&self) -> Option<&str> {
        match self {
            Rendering::Html(html) => Some(html),
            Rendering::NotRenderable => None,
        }
    }

    pub fn into_html(self) -> Option<String> {
        match self {
            Rendering::Html(html) => Some(html),
            Rendering::NotRenderable => None,
        }
    }
}

/// Builder for configuring the pretty-printer
#[derive(Debug, Clone, Copy)]
pub struct PrettyPrinterBuilder {
    image_max_height_px: u32,
    image_max_width: &'static str,
    json_indent: usize,
}

impl Default for PrettyPrinterBuilder {
    fn default() -> Self {
        Self {
            image_max_height_px: DEFAULT_IMAGE_MAX_HEIGHT_PX,
            image_max_width: DEFAULT_IMAGE_MAX_WIDTH,
            json_indent: DEFAULT_JSON_INDENT,
        }
    }
}

impl PrettyPrinterBuilder {
    /// Create a builder with the default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum inline image height
    pub fn image_max_height_px(mut self, px: u32) -> Self {
        self.image_max_height_px = px;
        self
    }

    /// Set the maximum inline image width (any CSS length)
    pub fn image_max_width(mut self, width: &'static str) -> Self {
        self.image_max_width = width;
        self
    }

    /// Set the JSON indentation width
    pub fn json_indent(mut self, spaces: usize) -> Self {
        self.json_indent = spaces;
        self
    }

    /// Build the printer
    pub fn build(self) -> PrettyPrinter {
        PrettyPrinter {
            image_max_height_px: self.image_max_height_px,
            image_max_width: self.image_max_width,
            json_indent: self.json_indent,
        }
    }
}

/// Stateless payload pretty-printer
///
/// Cheap to copy; create one per call site or share it freely.
#[derive(Debug, Clone, Copy)]
pub struct PrettyPrinter {
    image_max_height_px: u32,
    image_max_width: &'static str,
    json_indent: usize,
}

impl Default for PrettyPrinter {
    fn default() -> Self {
        PrettyPrinterBuilder::new().build()
    }
}

impl PrettyPrinter {
    /// Create a new printer builder
    pub fn builder() -> PrettyPrinterBuilder {
        PrettyPrinterBuilder::new()
    }

    /// Render a payload as HTML according to its base mime type
    ///
    /// Matching is exact and case-sensitive; strip parameters with
    /// [`base_mime_type`](crate::base_mime_type) first. `text/plain` is
    /// returned as is, without markup.
    pub fn prettify(&self, buffer: &[u8], mime_type: &str) -> Rendering {
        let html = match mime_type {
            t if JSON_TYPES.contains(&t) => self.render_json(buffer),
            t if XML_TYPES.contains(&t) => render_raw(buffer, "xml"),
            "text/html" => render_raw(buffer, "html"),
            "application/x-www-form-urlencoded" => render_form_data(buffer),
            t if IMAGE_TYPES.contains(&t) => self.render_image(t, buffer),
            "text/plain" => String::from_utf8_lossy(buffer).into_owned(),
            _ => {
                debug!(mime_type = %mime_type, "No renderer for mime type");
                return Rendering::NotRenderable;
            }
        };

        Rendering::Html(html)
    }

    /// Render a payload whose mime type may be unknown
    ///
    /// Uses the declared type when given, otherwise a type sniffed from the
    /// payload's leading bytes.
    pub fn prettify_detected(&self, buffer: &[u8], declared: Option<&str>) -> Rendering {
        match declared.or_else(|| sniff_mime_type(buffer)) {
            Some(mime_type) => self.prettify(buffer, mime_type),
            None => Rendering::NotRenderable,
        }
    }

    fn render_image(&self, mime_type: &str, buffer: &[u8]) -> String {
        let data = base64::engine::general_purpose::STANDARD.encode(buffer);
        format!(
            "<img style=\"max-width: {}; max-height: {}px;\" src=\"data:{};base64,{}\"/>",
            escape_html(self.image_max_width),
            self.image_max_height_px,
            mime_type,
            data
        )
    }

    fn render_json(&self, buffer: &[u8]) -> String {
        match serde_json::from_slice::<serde_json::Value>(buffer) {
            Ok(value) => match self.to_indented_json(&value) {
                Some(pretty) => render_code(&pretty, Some("json")),
                None => render_code(&String::from_utf8_lossy(buffer), None),
            },
            Err(e) => {
                debug!(error = %e, "Payload is not valid JSON, rendering raw");
                render_code(&String::from_utf8_lossy(buffer), None)
            }
        }
    }

    fn to_indented_json(&self, value: &serde_json::Value) -> Option<String> {
        let indent = " ".repeat(self.json_indent);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
        let mut out = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        value.serialize(&mut serializer).ok()?;
        String::from_utf8(out).ok()
    }
}

/// Decode form data and render it as `key: value` lines
///
/// Standard form decoding applies (percent escapes, `+` as space). A
/// repeated key keeps its first position and takes the last value.
fn render_form_data(buffer: &[u8]) -> String {
    let fields: IndexMap<Cow<'_, str>, Cow<'_, str>> =
        url::form_urlencoded::parse(buffer).collect();

    let mut text = String::new();
    for (name, value) in &fields {
        text.push_str(name);
        text.push_str(": ");
        text.push_str(value);
        text.push('\n');
    }

    render_code(&text, None)
}

/// Escaped markup with the payload's content left byte for byte as is.
/// No parse and re-serialize pass.
fn render_raw(buffer: &[u8], lang: &str) -> String {
    render_code(&String::from_utf8_lossy(buffer), Some(lang))
}

/// Wrap text in an escaped code block, optionally tagged with a language
fn render_code(code: &str, lang: Option<&str>) -> String {
    let code = escape_html(code);
    match lang {
        Some(lang) => format!(
            "<pre class=\"code\" data-lang=\"{}\">{}</pre>",
            escape_html(lang),
            code
        ),
        None => format!("<pre class=\"code\">{}</pre>", code),
    }
}

/// Escape text for embedding in HTML content or attribute values
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html(rendering: Rendering) -> String {
        rendering.into_html().expect("expected renderable output")
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("plain"), "plain");
        assert!(matches!(escape_html("plain"), Cow::Borrowed(_)));
        assert_eq!(
            escape_html("<a href=\"x\">Tom & Jerry's</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#039;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_render_code() {
        assert_eq!(render_code("a<b", None), "<pre class=\"code\">a&lt;b</pre>");
        assert_eq!(
            render_code("1", Some("json")),
            "<pre class=\"code\" data-lang=\"json\">1</pre>"
        );
    }

    #[test]
    fn test_json_is_indented() {
        let printer = PrettyPrinter::default();
        let out = html(printer.prettify(br#"{"a":1,"b":[true,null]}"#, "application/json"));
        assert_eq!(
            out,
            "<pre class=\"code\" data-lang=\"json\">{\n    &quot;a&quot;: 1,\n    &quot;b&quot;: [\n        true,\n        null\n    ]\n}</pre>"
        );
    }

    #[test]
    fn test_json_preserves_key_order() {
        let printer = PrettyPrinter::builder().json_indent(2).build();
        let out = html(printer.prettify(br#"{"z":1,"a":2}"#, "text/x-json"));
        assert!(out.contains("{\n  &quot;z&quot;: 1,\n  &quot;a&quot;: 2\n}"));
    }

    #[test]
    fn test_json_aliases() {
        let printer = PrettyPrinter::default();
        for mime in JSON_TYPES {
            let out = html(printer.prettify(b"[1]", mime));
            assert!(out.contains("data-lang=\"json\""), "{mime}");
        }
    }

    #[test]
    fn test_invalid_json_is_raw() {
        let printer = PrettyPrinter::default();
        let out = html(printer.prettify(b"not <json>", "application/json"));
        assert_eq!(out, "<pre class=\"code\">not &lt;json&gt;</pre>");
    }

    #[test]
    fn test_xml_and_html_are_not_reformatted() {
        let printer = PrettyPrinter::default();
        let xml = "<?xml version=\"1.0\"?>\n<root><item id='1'>A &amp; B</item></root>";
        let out = html(printer.prettify(xml.as_bytes(), "text/xml"));
        assert!(out.starts_with("<pre class=\"code\" data-lang=\"xml\">"));
        assert!(out.contains("&lt;root&gt;&lt;item id=&#039;1&#039;&gt;A &amp;amp; B"));

        let out = html(printer.prettify(b"<p>hi</p>", "text/html"));
        assert_eq!(
            out,
            "<pre class=\"code\" data-lang=\"html\">&lt;p&gt;hi&lt;/p&gt;</pre>"
        );
    }

    #[test]
    fn test_form_data() {
        let printer = PrettyPrinter::default();
        let out = html(printer.prettify(
            b"name=Jane+Doe&city=K%C3%B8benhavn&name=John&empty=",
            "application/x-www-form-urlencoded",
        ));
        assert_eq!(
            out,
            "<pre class=\"code\">name: John\ncity: København\nempty: \n</pre>"
        );
    }

    #[test]
    fn test_form_data_is_escaped() {
        let printer = PrettyPrinter::default();
        let out = html(printer.prettify(b"q=%3Cscript%3E", "application/x-www-form-urlencoded"));
        assert_eq!(out, "<pre class=\"code\">q: &lt;script&gt;\n</pre>");
    }

    #[test]
    fn test_image() {
        let printer = PrettyPrinter::default();
        let out = html(printer.prettify(b"GIF89a", "image/gif"));
        assert_eq!(
            out,
            "<img style=\"max-width: 100%; max-height: 200px;\" src=\"data:image/gif;base64,R0lGODlh\"/>"
        );
    }

    #[test]
    fn test_image_size_is_configurable() {
        let printer = PrettyPrinter::builder()
            .image_max_height_px(64)
            .image_max_width("50vw")
            .build();
        let out = html(printer.prettify(b"", "image/png"));
        assert!(out.contains("max-width: 50vw; max-height: 64px;"));
        assert!(out.contains("src=\"data:image/png;base64,\""));
    }

    #[test]
    fn test_plain_text_is_verbatim() {
        let printer = PrettyPrinter::default();
        assert_eq!(
            printer.prettify(b"<b>as is</b>", "text/plain"),
            Rendering::Html("<b>as is</b>".to_string())
        );
    }

    #[test]
    fn test_unknown_types() {
        let printer = PrettyPrinter::default();
        assert_eq!(
            printer.prettify(b"{}", "application/octet-stream"),
            Rendering::NotRenderable
        );
        assert_eq!(
            printer.prettify(b"{}", "Application/JSON"),
            Rendering::NotRenderable
        );
        assert_eq!(
            printer.prettify(b"{}", "application/json; charset=utf-8"),
            Rendering::NotRenderable
        );
        assert!(!printer.prettify(b"", "").is_renderable());
    }

    #[test]
    fn test_invalid_utf8() {
        let printer = PrettyPrinter::default();
        let out = html(printer.prettify(b"ok\xff\xfe", "text/plain"));
        assert_eq!(out, "ok\u{fffd}\u{fffd}");

        let out = html(printer.prettify(b"<a>\xff</a>", "application/xml"));
        assert!(out.contains("&lt;a&gt;\u{fffd}&lt;/a&gt;"));
    }

    #[test]
    fn test_prettify_detected() {
        let printer = PrettyPrinter::default();
        let out = printer.prettify_detected(b"\x89PNG\r\n\x1a\n", None);
        assert!(out.as_html().unwrap().contains("data:image/png;base64,"));

        let out = printer.prettify_detected(b"{\"a\":1}", Some("text/plain"));
        assert_eq!(out.as_html(), Some("{\"a\":1}"));

        assert_eq!(
            printer.prettify_detected(b"just words", None),
            Rendering::NotRenderable
        );
    }
}
