//! Error types for apidebug

use thiserror::Error;

/// Errors surfaced by the strict parsing entry points
///
/// The record accessors never return these; they degrade to absent values
/// instead. Use [`UrlElements::try_parse`](crate::UrlElements::try_parse)
/// and [`parse_query_string_strict`](crate::parse_query_string_strict) when
/// malformed input has to be reported.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiDebugError {
    /// URL could not be decomposed
    #[error("Malformed URL: {0}")]
    MalformedUrl(#[source] url::ParseError),

    /// Query segment without exactly one `=`
    #[error("Malformed query string segment: {segment:?}")]
    MalformedQueryString { segment: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ApiDebugError::MalformedUrl(url::ParseError::EmptyHost).to_string(),
            "Malformed URL: empty host"
        );
        assert_eq!(
            ApiDebugError::MalformedQueryString {
                segment: "flag".to_string()
            }
            .to_string(),
            "Malformed query string segment: \"flag\""
        );
    }

    #[test]
    fn test_malformed_url_source() {
        use std::error::Error as _;

        let err = ApiDebugError::MalformedUrl(url::ParseError::InvalidPort);
        assert!(err.source().is_some());
    }
}
