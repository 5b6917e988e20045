//! # HTTP Retrieval Utilities
//!
//! This module provides an asynchronous API client wrapper around `reqwest`
//! with standardized JSON response handling and a raw-bytes variant for
//! binary image payloads.
//!
//! The client never turns a non-2xx status into an `Err`: HTTP-level
//! failures are reported through [`ApiResponse::success`] so callers can
//! apply their own degradation policy. Only transport-level problems
//! (connection refused, invalid URL joins, undecodable bodies) surface as
//! errors.

use bytes::Bytes;
use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

/// A standardized container for API responses.
///
/// This struct wraps the deserialized data along with metadata about the
/// HTTP transaction, such as the status code and success flag.
#[derive(Debug)]
pub struct ApiResponse<T> {
    /// The successfully deserialized response body, if any.
    pub data: Option<T>,
    /// The raw error body returned by the server if the request failed.
    pub error_body: Option<String>,
    /// The numeric HTTP status code.
    pub status: u16,
    /// Indicates if the status code was in the 2xx range.
    pub success: bool,
}

/// A flexible asynchronous HTTP client.
///
/// Built on top of `reqwest`, it handles base URLs, query parameters, and
/// JSON bodies. One instance is shared per backend and reused across all
/// requests to leverage connection pooling.
pub struct ApiClient {
    /// The underlying reqwest client.
    inner: reqwest::Client,
    /// The base URL to which all relative paths are joined.
    base_url: Url,
}

impl ApiClient {
    /// Creates a new `ApiClient` instance.
    ///
    /// # Arguments
    /// * `base_url` - The absolute base URL for the API (e.g., "http://localhost:8080/").
    ///   A trailing slash is appended if missing so that relative paths join
    ///   underneath it rather than replacing the last segment.
    ///
    /// # Panics
    /// Panics if the `base_url` is not a valid absolute URL.
    pub fn new(base_url: &str) -> Self {
        let mut normalized = base_url.to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let url = Url::parse(&normalized).expect("Invalid Base URL (must be absolute)");

        Self {
            inner: reqwest::Client::new(),
            base_url: url,
        }
    }

    /// The base URL all relative paths are joined against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Performs a generic HTTP request and handles the JSON response.
    ///
    /// This method manages URL joining, query parameters, and JSON
    /// serialization/deserialization.
    ///
    /// # Arguments
    /// * `method` - The HTTP verb (GET, PUT, DELETE, etc.).
    /// * `path` - The relative path to append to the base URL.
    /// * `query` - Optional query parameters for this specific request.
    /// * `body` - Optional serializable object to send as the JSON body.
    ///
    /// # Errors
    /// Returns an `anyhow::Error` if URL joining or network execution fails,
    /// or if a 2xx body cannot be decoded into `T`.
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(&str, String)]>,
        body: Option<B>,
    ) -> anyhow::Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        // 1. Construct the full absolute URL
        let full_url = self.base_url.join(path)?;
        let mut req = self.inner.request(method, full_url);

        // 2. Add query parameters if provided
        if let Some(q) = query {
            req = req.query(q);
        }

        // 3. Serialize and attach the JSON body if present
        if let Some(b) = body {
            req = req.json(&b);
        }

        // 4. Execute the request and capture response metadata
        let response: reqwest::Response = req.send().await?;
        let status = response.status();
        let success = status.is_success();

        // 5. Handle the result based on success status
        if success {
            // Attempt to deserialize the body into the target type T
            let data = response.json::<T>().await?;
            Ok(ApiResponse {
                data: Some(data),
                error_body: None,
                status: status.as_u16(),
                success: true,
            })
        } else {
            // Capture the error body as a string for debugging
            let error_text = response.text().await.ok();
            Ok(ApiResponse {
                data: None,
                error_body: error_text,
                status: status.as_u16(),
                success: false,
            })
        }
    }

    /// Performs a GET request for a raw binary payload.
    ///
    /// Used for image endpoints that return the bytes of a JPEG/PNG rather
    /// than a JSON envelope. The same non-throwing status policy applies.
    ///
    /// # Errors
    /// Returns an `anyhow::Error` if URL joining or network execution fails.
    pub async fn fetch_bytes(&self, path: &str) -> anyhow::Result<ApiResponse<Bytes>> {
        let full_url = self.base_url.join(path)?;
        let response = self.inner.get(full_url).send().await?;
        let status = response.status();
        let success = status.is_success();

        if success {
            let payload = response.bytes().await?;
            Ok(ApiResponse {
                data: Some(payload),
                error_body: None,
                status: status.as_u16(),
                success: true,
            })
        } else {
            let error_text = response.text().await.ok();
            Ok(ApiResponse {
                data: None,
                error_body: error_text,
                status: status.as_u16(),
                success: false,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        let api = ApiClient::new("http://localhost:8080");
        assert_eq!(api.base_url().as_str(), "http://localhost:8080/");

        let joined = api.base_url().join("sample/score/7").unwrap();
        assert_eq!(joined.as_str(), "http://localhost:8080/sample/score/7");
    }

    #[test]
    #[should_panic(expected = "Invalid Base URL")]
    fn relative_base_url_is_rejected() {
        let _ = ApiClient::new("no scheme at all");
    }
}
