//! Captured API call records
//!
//! Design: [`CallRecord`] is the capability set the toolbar reads. Each
//! HTTP client integration provides its own implementation and only has to
//! supply the raw fields; the URL decomposition and query parsing are
//! provided methods, memoized through the record's [`UrlCache`].

use crate::url_elements::{QueryParameters, UrlCache, UrlComponent, UrlElements};
use indexmap::IndexMap;
use std::borrow::Cow;

/// Header name to value mapping, in capture order
pub type Headers = IndexMap<String, String>;

/// One captured outbound API call
pub trait CallRecord: Send + Sync {
    /// Returns true if the call received a response
    fn has_response(&self) -> bool;

    /// Request method as sent
    fn method(&self) -> &str;

    /// Full URL of the endpoint that was called, as captured
    fn url(&self) -> &str;

    /// Response status code
    ///
    /// `None` when there is no response yet. Check
    /// [`has_response`](Self::has_response) first.
    fn response_status_code(&self) -> Option<u16>;

    /// Request headers, if any were captured
    fn request_headers(&self) -> Option<&Headers>;

    /// Response headers, if there is a response
    fn response_headers(&self) -> Option<&Headers>;

    /// Name of the API being called
    fn api_name(&self) -> &str;

    /// Memo storage for the derived URL data
    fn url_cache(&self) -> &UrlCache;

    /// True if request headers exist and are not empty
    fn has_request_headers(&self) -> bool {
        self.request_headers().is_some_and(|h| !h.is_empty())
    }

    /// True if response headers exist and are not empty
    fn has_response_headers(&self) -> bool {
        self.response_headers().is_some_and(|h| !h.is_empty())
    }

    /// URL components, parsed on first access and cached afterwards
    fn url_elements(&self) -> &UrlElements {
        self.url_cache().elements_with(|| self.url())
    }

    /// Named URL component, or `None` if the URL does not have it
    fn url_element(&self, component: UrlComponent) -> Option<Cow<'_, str>> {
        self.url_elements().get(component)
    }

    /// URL scheme, e.g. `https`
    fn url_scheme(&self) -> Option<&str> {
        self.url_elements().scheme.as_deref()
    }

    /// URL host, as normalized by the parser
    fn url_host(&self) -> Option<&str> {
        self.url_elements().host.as_deref()
    }

    /// Port, only when the URL names one
    fn url_port(&self) -> Option<u16> {
        self.url_elements().port
    }

    /// User name from the URL's userinfo
    fn url_user(&self) -> Option<&str> {
        self.url_elements().user.as_deref()
    }

    /// Password from the URL's userinfo
    fn url_password(&self) -> Option<&str> {
        self.url_elements().password.as_deref()
    }

    /// Path, as captured
    fn url_path(&self) -> Option<&str> {
        self.url_elements().path.as_deref()
    }

    /// Fragment without the leading `#`, as captured
    fn url_fragment(&self) -> Option<&str> {
        self.url_elements().fragment.as_deref()
    }

    /// Query string without the leading `?`, as captured
    fn url_query_string(&self) -> Option<&str> {
        self.url_elements().query.as_deref()
    }

    /// Query parameters with raw values, last occurrence winning
    ///
    /// Malformed segments are skipped; see
    /// [`parse_query_string`](crate::parse_query_string).
    fn url_query_parameters(&self) -> &QueryParameters {
        self.url_cache().query_parameters_with(|| self.url_query_string())
    }
}

/// Find a header value by name, ignoring ASCII case
pub fn find_header<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubCall {
        url: String,
        request_headers: Option<Headers>,
        cache: UrlCache,
    }

    impl StubCall {
        fn new(url: &str) -> Self {
            Self {
                url: url.to_string(),
                request_headers: None,
                cache: UrlCache::new(),
            }
        }
    }

    impl CallRecord for StubCall {
        fn has_response(&self) -> bool {
            false
        }

        fn method(&self) -> &str {
            "GET"
        }

        fn url(&self) -> &str {
            &self.url
        }

        fn response_status_code(&self) -> Option<u16> {
            None
        }

        fn request_headers(&self) -> Option<&Headers> {
            self.request_headers.as_ref()
        }

        fn response_headers(&self) -> Option<&Headers> {
            None
        }

        fn api_name(&self) -> &str {
            "stub"
        }

        fn url_cache(&self) -> &UrlCache {
            &self.cache
        }
    }

    #[test]
    fn test_has_headers() {
        let mut call = StubCall::new("http://example.com/");
        assert!(!call.has_request_headers());
        assert!(!call.has_response_headers());

        call.request_headers = Some(Headers::new());
        assert!(!call.has_request_headers());

        let mut headers = Headers::new();
        headers.insert("Accept".to_string(), "*/*".to_string());
        call.request_headers = Some(headers);
        assert!(call.has_request_headers());
    }

    #[test]
    fn test_named_wrappers() {
        let call = StubCall::new("ftp://anon:pw@files.example.org:2121/pub/readme.txt?v=2#l10");
        assert_eq!(call.url_scheme(), Some("ftp"));
        assert_eq!(call.url_host(), Some("files.example.org"));
        assert_eq!(call.url_port(), Some(2121));
        assert_eq!(call.url_user(), Some("anon"));
        assert_eq!(call.url_password(), Some("pw"));
        assert_eq!(call.url_path(), Some("/pub/readme.txt"));
        assert_eq!(call.url_query_string(), Some("v=2"));
        assert_eq!(call.url_fragment(), Some("l10"));
        assert_eq!(
            call.url_element(UrlComponent::Port).as_deref(),
            Some("2121")
        );
    }

    #[test]
    fn test_absent_components() {
        let call = StubCall::new("https://example.com/items");
        assert_eq!(call.url_port(), None);
        assert_eq!(call.url_user(), None);
        assert_eq!(call.url_password(), None);
        assert_eq!(call.url_query_string(), None);
        assert_eq!(call.url_fragment(), None);
        assert!(call.url_query_parameters().is_empty());
    }

    #[test]
    fn test_query_parameters_are_memoized() {
        let mut call = StubCall::new("https://example.com/?a=1&b=2");
        assert_eq!(call.url_query_parameters().len(), 2);

        call.url = "https://example.com/?c=3".to_string();
        assert_eq!(call.url_host(), Some("example.com"));
        assert_eq!(call.url_query_parameters()["a"], "1");
        assert!(!call.url_query_parameters().contains_key("c"));
    }

    #[test]
    fn test_find_header() {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "text/xml".to_string());
        assert_eq!(find_header(&headers, "content-type"), Some("text/xml"));
        assert_eq!(find_header(&headers, "CONTENT-TYPE"), Some("text/xml"));
        assert_eq!(find_header(&headers, "accept"), None);
    }
}
