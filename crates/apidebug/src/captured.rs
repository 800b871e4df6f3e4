//! Generic captured call
//!
//! A plain [`CallRecord`] implementation that collectors can fill in
//! directly: request fields at construction, response fields once the call
//! completes.

use crate::mime::base_mime_type;
use crate::record::{find_header, CallRecord, Headers};
use crate::url_elements::UrlCache;
use bytes::Bytes;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Response half of a captured call
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CapturedResponse {
    /// HTTP status code
    pub status_code: u16,

    #[serde(default, skip_serializing_if = "Headers::is_empty")]
    #[schemars(with = "HashMap<String, String>")]
    pub headers: Headers,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<Vec<u8>>")]
    pub body: Option<Bytes>,
}

/// Captured outbound API call
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CapturedCall {
    /// Logical API or service name
    pub api_name: String,

    /// Request method
    pub method: String,

    /// Full request URL
    url: String,

    #[serde(default, skip_serializing_if = "Headers::is_empty")]
    #[schemars(with = "HashMap<String, String>")]
    pub request_headers: Headers,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<Vec<u8>>")]
    pub request_body: Option<Bytes>,

    /// Set once the call completes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<CapturedResponse>,

    #[serde(skip)]
    cache: UrlCache,
}

impl CapturedCall {
    /// Create a record for a call that has just been sent
    pub fn new(
        api_name: impl Into<String>,
        method: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            api_name: api_name.into(),
            method: method.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    /// Add a request header
    pub fn with_request_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.request_headers.insert(name.into(), value.into());
        self
    }

    /// Set the request body
    pub fn with_request_body(mut self, body: impl Into<Bytes>) -> Self {
        self.request_body = Some(body.into());
        self
    }

    /// Record the response once the call completes
    pub fn record_response(&mut self, status_code: u16, headers: Headers, body: Option<Bytes>) {
        tracing::debug!(
            api = %self.api_name,
            method = %self.method,
            url = %self.url,
            status_code,
            "Recorded API call response"
        );
        self.response = Some(CapturedResponse {
            status_code,
            headers,
            body,
        });
    }

    pub fn request_body(&self) -> Option<&[u8]> {
        self.request_body.as_deref()
    }

    pub fn response_body(&self) -> Option<&[u8]> {
        self.response.as_ref().and_then(|r| r.body.as_deref())
    }

    /// Base mime type of the request body, from its Content-Type header
    pub fn request_content_type(&self) -> Option<&str> {
        find_header(&self.request_headers, "content-type").map(base_mime_type)
    }

    /// Base mime type of the response body, from its Content-Type header
    pub fn response_content_type(&self) -> Option<&str> {
        self.response
            .as_ref()
            .and_then(|r| find_header(&r.headers, "content-type"))
            .map(base_mime_type)
    }
}

impl CallRecord for CapturedCall {
    fn has_response(&self) -> bool {
        self.response.is_some()
    }

    fn method(&self) -> &str {
        &self.method
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn response_status_code(&self) -> Option<u16> {
        self.response.as_ref().map(|r| r.status_code)
    }

    fn request_headers(&self) -> Option<&Headers> {
        Some(&self.request_headers)
    }

    fn response_headers(&self) -> Option<&Headers> {
        self.response.as_ref().map(|r| &r.headers)
    }

    fn api_name(&self) -> &str {
        &self.api_name
    }

    fn url_cache(&self) -> &UrlCache {
        &self.cache
    }
}
