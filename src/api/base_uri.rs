use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, StatusCode},
};

/// Base URI of the current request, used to build absolute links.
///
/// Derived from request headers:
/// - X-Forwarded-Proto: Optional scheme, defaults to `http`
/// - X-Forwarded-Host / Host: Authority, defaults to `localhost`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBaseUri(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for RequestBaseUri
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

impl RequestBaseUri {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let scheme = extract_header_value(headers, "x-forwarded-proto")
            .unwrap_or_else(|| "http".to_string());
        let host = extract_header_value(headers, "x-forwarded-host")
            .or_else(|| extract_header_value(headers, "host"))
            .unwrap_or_else(|| "localhost".to_string());
        Self(format!("{}://{}", scheme, host))
    }
}

/// Extract header value as string, taking the first entry of a
/// comma-separated list
fn extract_header_value(headers: &HeaderMap, header_name: &str) -> Option<String> {
    headers
        .get(header_name)
        .and_then(|value| value.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};

    #[test]
    fn test_base_uri_from_host() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("host"),
            HeaderValue::from_static("api.example.com:8080"),
        );

        assert_eq!(
            RequestBaseUri::from_headers(&headers),
            RequestBaseUri("http://api.example.com:8080".to_string())
        );
    }

    #[test]
    fn test_base_uri_behind_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("host"), HeaderValue::from_static("10.0.0.4"));
        headers.insert(
            HeaderName::from_static("x-forwarded-proto"),
            HeaderValue::from_static("https"),
        );
        headers.insert(
            HeaderName::from_static("x-forwarded-host"),
            HeaderValue::from_static("shop.example.com, lb.internal"),
        );

        assert_eq!(
            RequestBaseUri::from_headers(&headers).0,
            "https://shop.example.com"
        );
    }

    #[test]
    fn test_base_uri_without_headers() {
        assert_eq!(RequestBaseUri::from_headers(&HeaderMap::new()).0, "http://localhost");
    }
}
