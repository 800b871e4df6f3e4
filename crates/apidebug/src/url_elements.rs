//! URL decomposition and query string parsing for call records
//!
//! Components follow a `parse_url`-style contract: every part is optional,
//! and a URL that cannot be decomposed simply has no parts. Query parameter
//! values are kept raw (not percent-decoded) so they display exactly as the
//! call sent them.

use crate::error::ApiDebugError;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::debug;
use url::Url;

/// Query parameters in order of first appearance, raw values
pub type QueryParameters = IndexMap<String, String>;

/// Named URL component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlComponent {
    Scheme,
    Host,
    Port,
    User,
    Password,
    Path,
    Query,
    Fragment,
}

impl FromStr for UrlComponent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheme" => Ok(UrlComponent::Scheme),
            "host" => Ok(UrlComponent::Host),
            "port" => Ok(UrlComponent::Port),
            "user" => Ok(UrlComponent::User),
            "pass" | "password" => Ok(UrlComponent::Password),
            "path" => Ok(UrlComponent::Path),
            "query" => Ok(UrlComponent::Query),
            "fragment" => Ok(UrlComponent::Fragment),
            _ => Err(format!("Unknown URL component: {}", s)),
        }
    }
}

impl std::fmt::Display for UrlComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            UrlComponent::Scheme => "scheme",
            UrlComponent::Host => "host",
            UrlComponent::Port => "port",
            UrlComponent::User => "user",
            UrlComponent::Password => "pass",
            UrlComponent::Path => "path",
            UrlComponent::Query => "query",
            UrlComponent::Fragment => "fragment",
        };
        f.write_str(name)
    }
}

/// Decomposed URL
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UrlElements {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Only set when the URL names a port
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragment: Option<String>,
}

impl UrlElements {
    /// Decompose a URL, leaving every component absent if it is malformed
    pub fn parse(raw: &str) -> Self {
        match Self::try_parse(raw) {
            Ok(elements) => elements,
            Err(e) => {
                debug!(url = %raw, error = %e, "Could not decompose URL");
                Self::default()
            }
        }
    }

    /// Decompose a URL, reporting why it could not be parsed
    ///
    /// The parser validates the URL and supplies scheme, host and
    /// userinfo. Path, query and fragment are cut from the captured text
    /// so they read exactly as sent. A port is reported whenever the URL
    /// names one, default or not.
    ///
    /// Relative references (`/path?query#fragment`) are accepted and only
    /// carry path, query and fragment. Scheme-relative references
    /// (`//host/path`) carry everything except the scheme.
    pub fn try_parse(raw: &str) -> Result<Self, ApiDebugError> {
        let raw = raw.trim();
        match Url::parse(raw) {
            Ok(url) => {
                let after_scheme = raw.split_once(':').map_or(raw, |(_, rest)| rest);
                Ok(Self::from_url(&url, after_scheme))
            }
            Err(url::ParseError::RelativeUrlWithoutBase) if raw.starts_with("//") => {
                let url =
                    Url::parse(&format!("http:{}", raw)).map_err(ApiDebugError::MalformedUrl)?;
                Ok(Self {
                    scheme: None,
                    ..Self::from_url(&url, raw)
                })
            }
            Err(url::ParseError::RelativeUrlWithoutBase) => Ok(Self::from_relative(raw)),
            Err(e) => Err(ApiDebugError::MalformedUrl(e)),
        }
    }

    /// `rest` is the captured text following `scheme:`
    fn from_url(url: &Url, rest: &str) -> Self {
        let (hier, query, fragment) = split_reference(rest);
        let (authority, path) = match hier.strip_prefix("//") {
            Some(after) => {
                let end = after.find('/').unwrap_or(after.len());
                (Some(&after[..end]), &after[end..])
            }
            None => (None, hier),
        };

        Self {
            scheme: Some(url.scheme().to_string()),
            host: url.host_str().map(str::to_string),
            port: url
                .port_or_known_default()
                .filter(|_| authority.is_some_and(has_explicit_port)),
            user: Some(url.username())
                .filter(|u| !u.is_empty())
                .map(str::to_string),
            password: url.password().map(str::to_string),
            path: non_empty(path),
            query,
            fragment,
        }
    }

    fn from_relative(raw: &str) -> Self {
        let (path, query, fragment) = split_reference(raw);

        Self {
            path: non_empty(path),
            query,
            fragment,
            ..Default::default()
        }
    }

    /// Look up a component by name; absent components yield `None`
    pub fn get(&self, component: UrlComponent) -> Option<Cow<'_, str>> {
        match component {
            UrlComponent::Scheme => borrowed(&self.scheme),
            UrlComponent::Host => borrowed(&self.host),
            UrlComponent::Port => self.port.map(|p| Cow::Owned(p.to_string())),
            UrlComponent::User => borrowed(&self.user),
            UrlComponent::Password => borrowed(&self.password),
            UrlComponent::Path => borrowed(&self.path),
            UrlComponent::Query => borrowed(&self.query),
            UrlComponent::Fragment => borrowed(&self.fragment),
        }
    }
}

fn borrowed(value: &Option<String>) -> Option<Cow<'_, str>> {
    value.as_deref().map(Cow::Borrowed)
}

/// Split captured text into the part before `?`, the query and the fragment
fn split_reference(text: &str) -> (&str, Option<String>, Option<String>) {
    let (rest, fragment) = match text.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment.to_string())),
        None => (text, None),
    };
    match rest.split_once('?') {
        Some((before, query)) => (before, Some(query.to_string()), fragment),
        None => (rest, None, fragment),
    }
}

fn non_empty(text: &str) -> Option<String> {
    Some(text).filter(|t| !t.is_empty()).map(str::to_string)
}

/// Check whether an authority (`user:pass@host:port`) names a port
fn has_explicit_port(authority: &str) -> bool {
    let host_port = authority.rsplit('@').next().unwrap_or(authority);
    let after_host = match host_port.rfind(']') {
        Some(end) => &host_port[end + 1..],
        None => host_port,
    };
    after_host.contains(':')
}

/// Split a query segment into name and value
///
/// Only segments with exactly one `=` are well formed.
fn split_segment(segment: &str) -> Option<(&str, &str)> {
    let mut parts = segment.split('=');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(name), Some(value), None) => Some((name, value)),
        _ => None,
    }
}

/// Parse a query string into raw parameters, skipping malformed segments
///
/// Splits on `&`, then on `=`. A repeated name keeps its first position
/// and takes the last value. Segments without exactly one `=` (including
/// empty ones) are skipped.
pub fn parse_query_string(query: &str) -> QueryParameters {
    let mut params = QueryParameters::new();
    if query.is_empty() {
        return params;
    }

    for segment in query.split('&') {
        match split_segment(segment) {
            Some((name, value)) => {
                params.insert(name.to_string(), value.to_string());
            }
            None => {
                debug!(segment = %segment, "Skipping malformed query segment");
            }
        }
    }

    params
}

/// Parse a query string into raw parameters, failing on the first
/// malformed segment
pub fn parse_query_string_strict(query: &str) -> Result<QueryParameters, ApiDebugError> {
    let mut params = QueryParameters::new();
    if query.is_empty() {
        return Ok(params);
    }

    for segment in query.split('&') {
        let (name, value) =
            split_segment(segment).ok_or_else(|| ApiDebugError::MalformedQueryString {
                segment: segment.to_string(),
            })?;
        params.insert(name.to_string(), value.to_string());
    }

    Ok(params)
}

/// Per-record memo for the derived URL data
///
/// Each value is computed at most once, even when the record is shared
/// between threads. Records embed one of these and hand it out through
/// [`CallRecord::url_cache`](crate::CallRecord::url_cache).
#[derive(Debug, Clone, Default)]
pub struct UrlCache {
    elements: OnceLock<UrlElements>,
    query_parameters: OnceLock<QueryParameters>,
}

impl UrlCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached URL elements, parsing the URL produced by `url` on first use
    pub fn elements_with<F, S>(&self, url: F) -> &UrlElements
    where
        F: FnOnce() -> S,
        S: AsRef<str>,
    {
        self.elements.get_or_init(|| UrlElements::parse(url().as_ref()))
    }

    /// Cached query parameters, parsing the query produced by `query` on
    /// first use
    pub fn query_parameters_with<F, S>(&self, query: F) -> &QueryParameters
    where
        F: FnOnce() -> Option<S>,
        S: AsRef<str>,
    {
        self.query_parameters.get_or_init(|| match query() {
            Some(query) => parse_query_string(query.as_ref()),
            None => QueryParameters::new(),
        })
    }

    /// True once the URL elements have been computed
    pub fn is_populated(&self) -> bool {
        self.elements.get().is_some()
    }
}
