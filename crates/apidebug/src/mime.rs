//! Mime type helpers
//!
//! The printer dispatches on exact base mime types, so header values have
//! to be reduced to `type/subtype` first. Sniffing covers the case where a
//! payload arrives without a declared type.

/// Strip parameters and surrounding whitespace from a Content-Type value
///
/// `"application/json; charset=utf-8"` becomes `"application/json"`.
/// Case is preserved; dispatch is case-sensitive.
pub fn base_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
}

/// Guess a mime type from the first bytes of a payload
///
/// Recognizes PNG, GIF and JPEG signatures, then JSON, XML and HTML text.
/// Returns `None` when nothing matches.
pub fn sniff_mime_type(buffer: &[u8]) -> Option<&'static str> {
    if buffer.starts_with(b"\x89PNG\r\n\x1a\n") {
        return Some("image/png");
    }
    if buffer.starts_with(b"GIF87a") || buffer.starts_with(b"GIF89a") {
        return Some("image/gif");
    }
    if buffer.starts_with(&[0xff, 0xd8, 0xff]) {
        return Some("image/jpeg");
    }

    let text = buffer
        .strip_prefix(b"\xef\xbb\xbf".as_slice())
        .unwrap_or(buffer);
    let start = text
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .map(|i| &text[i..])?;

    if start.starts_with(b"{") || start.starts_with(b"[") {
        return Some("application/json");
    }
    if start.starts_with(b"<?xml") {
        return Some("application/xml");
    }

    let head: Vec<u8> = start.iter().take(14).map(u8::to_ascii_lowercase).collect();
    if head.starts_with(b"<!doctype html") || head.starts_with(b"<html") {
        return Some("text/html");
    }

    None
}
