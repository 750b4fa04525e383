//! Common utilities for the network client
//!
//! Provides the authenticated HTTP wrapper, provider error decoding and the
//! long-running-operation plumbing shared by all resource operations.

use crate::error::NetworkError;
use crate::models::{AsyncOperationBody, ErrorResponse};
use crate::operation::{OperationHandle, OperationKind, OperationStatus, PollTarget};
use reqwest::header::HeaderMap;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const ASYNC_OPERATION_HEADER: &str = "Azure-AsyncOperation";
const LOCATION_HEADER: &str = "Location";
const RETRY_AFTER_HEADER: &str = "Retry-After";

/// HTTP client wrapper with authentication
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: String,
    api_version: String,
}

impl HttpClient {
    /// Create a new HTTP client wrapper
    pub fn new(client: Client, base_url: String, token: String, api_version: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            api_version,
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL from a resource path
    ///
    /// Absolute URLs (poll locations handed out by the provider) are used verbatim;
    /// resource paths get the base URL and the `api-version` query parameter.
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            return path.to_string();
        }
        let separator = if path.contains('?') { '&' } else { '?' };
        format!("{}{}{}api-version={}", self.base_url, path, separator, self.api_version)
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Make a GET request and decode the JSON body
    pub async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, NetworkError> {
        let url = self.build_url(path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(NetworkError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(decode_error(status, &body, &format!("GET {}", path)));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(NetworkError::Serialization)
    }

    /// Make a PUT request, returning a handle to the resulting operation
    pub async fn put(&self, path: &str, body: &serde_json::Value) -> Result<OperationHandle, NetworkError> {
        let url = self.build_url(path);
        debug!("PUT {} with body: {}", url, serde_json::to_string_pretty(body).unwrap_or_default());

        let response = self
            .client
            .put(&url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(NetworkError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(decode_error(status, &body_text, &format!("PUT {}", path)));
        }

        Ok(handle_from_response(OperationKind::CreateOrUpdate, path, &response))
    }

    /// Make a DELETE request, returning a handle to the resulting operation
    pub async fn delete(&self, path: &str) -> Result<OperationHandle, NetworkError> {
        let url = self.build_url(path);
        debug!("DELETE {}", url);

        let response = self
            .client
            .delete(&url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(NetworkError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(decode_error(status, &body, &format!("DELETE {}", path)));
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(OperationHandle::completed(OperationKind::Delete, path));
        }
        Ok(handle_from_response(OperationKind::Delete, path, &response))
    }

    /// Poll an operation once
    pub async fn poll(&self, handle: &OperationHandle) -> Result<OperationStatus, NetworkError> {
        match &handle.target {
            PollTarget::Completed => Ok(OperationStatus::Succeeded),
            PollTarget::Token(token) => Err(NetworkError::InvalidRequest(format!(
                "operation token {} was not issued by the HTTP client",
                token
            ))),
            PollTarget::AsyncOperation(url) => self.poll_async_operation(url).await,
            PollTarget::Location(url) => self.poll_location(url).await,
        }
    }

    async fn poll_async_operation(&self, url: &str) -> Result<OperationStatus, NetworkError> {
        let response = self.poll_request(url).await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(OperationStatus::NotFound);
        }
        let retry_after = retry_after(response.headers());
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(decode_error(status, &text, "poll operation"));
        }

        let body: AsyncOperationBody = serde_json::from_str(&text)?;
        let (code, message) = body
            .error
            .map(|e| (e.code, e.message))
            .unwrap_or_default();
        Ok(match OperationStatus::from_provider_status(&body.status, code, message) {
            OperationStatus::InProgress { .. } => OperationStatus::InProgress { retry_after },
            terminal => terminal,
        })
    }

    async fn poll_location(&self, url: &str) -> Result<OperationStatus, NetworkError> {
        let response = self.poll_request(url).await?;
        let status = response.status();
        match status {
            StatusCode::ACCEPTED => Ok(OperationStatus::InProgress {
                retry_after: retry_after(response.headers()),
            }),
            StatusCode::NOT_FOUND => Ok(OperationStatus::NotFound),
            s if s.is_success() => Ok(OperationStatus::Succeeded),
            s => {
                let text = response.text().await.unwrap_or_default();
                let (code, message) = error_parts(s, &text);
                Ok(OperationStatus::Failed { code, message })
            }
        }
    }

    async fn poll_request(&self, url: &str) -> Result<Response, NetworkError> {
        debug!("Polling operation {}", url);
        self.client
            .get(url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(NetworkError::Http)
    }
}

/// Percent-encode one path segment
pub fn encode(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// Build an operation handle from the headers of an accepted mutation
pub fn handle_from_response(kind: OperationKind, path: &str, response: &Response) -> OperationHandle {
    handle_from_headers(kind, path, response.headers())
}

/// Build an operation handle from response headers
pub fn handle_from_headers(kind: OperationKind, path: &str, headers: &HeaderMap) -> OperationHandle {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let target = if let Some(url) = header(ASYNC_OPERATION_HEADER) {
        PollTarget::AsyncOperation(url)
    } else if let Some(url) = header(LOCATION_HEADER) {
        PollTarget::Location(url)
    } else {
        PollTarget::Completed
    };

    OperationHandle {
        kind,
        resource_path: path.to_string(),
        target,
        retry_after: retry_after(headers),
    }
}

/// Parse a `Retry-After` header expressed in seconds
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Decode a provider error body into a [`NetworkError`]
pub fn decode_error(status: StatusCode, body: &str, context: &str) -> NetworkError {
    let (code, message) = error_parts(status, body);
    match status {
        StatusCode::NOT_FOUND => NetworkError::NotFound(format!("{}: {}", context, message)),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            NetworkError::Authentication(format!("{}: {} - {}", context, status, message))
        }
        _ => NetworkError::Api {
            status: status.as_u16(),
            code,
            message,
        },
    }
}

fn error_parts(status: StatusCode, body: &str) -> (String, String) {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse { error: Some(detail) }) => (detail.code, detail.message),
        _ => (
            status.canonical_reason().unwrap_or("Unknown").to_string(),
            body.chars().take(500).collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn http() -> HttpClient {
        HttpClient::new(
            Client::new(),
            "https://management.azure.com/".to_string(),
            "token".to_string(),
            "2020-03-01".to_string(),
        )
    }

    #[test]
    fn test_build_url_appends_api_version() {
        let url = http().build_url("/subscriptions/s/resourceGroups/rg");
        assert_eq!(url, "https://management.azure.com/subscriptions/s/resourceGroups/rg?api-version=2020-03-01");
    }

    #[test]
    fn test_build_url_keeps_existing_query() {
        let url = http().build_url("/subscriptions/s/resourceGroups/rg/providers/x/y?$expand=z");
        assert!(url.ends_with("?$expand=z&api-version=2020-03-01"));
    }

    #[test]
    fn test_build_url_passes_absolute_poll_urls_through() {
        let poll = "https://management.azure.com/operations/1?api-version=2020-03-01";
        assert_eq!(http().build_url(poll), poll);
    }

    #[test]
    fn test_auth_header_is_bearer() {
        assert_eq!(http().auth_header(), "Bearer token");
    }

    #[test]
    fn test_handle_prefers_async_operation_header() {
        let mut headers = HeaderMap::new();
        headers.insert("Azure-AsyncOperation", HeaderValue::from_static("https://poll/async"));
        headers.insert("Location", HeaderValue::from_static("https://poll/location"));
        headers.insert("Retry-After", HeaderValue::from_static("10"));

        let handle = handle_from_headers(OperationKind::CreateOrUpdate, "/pe", &headers);
        assert_eq!(handle.target, PollTarget::AsyncOperation("https://poll/async".to_string()));
        assert_eq!(handle.retry_after, Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_handle_falls_back_to_location_then_completed() {
        let mut headers = HeaderMap::new();
        headers.insert("Location", HeaderValue::from_static("https://poll/location"));
        let handle = handle_from_headers(OperationKind::Delete, "/pe", &headers);
        assert_eq!(handle.target, PollTarget::Location("https://poll/location".to_string()));

        let handle = handle_from_headers(OperationKind::Delete, "/pe", &HeaderMap::new());
        assert_eq!(handle.target, PollTarget::Completed);
        assert_eq!(handle.retry_after, None);
    }

    #[test]
    fn test_decode_error_extracts_provider_detail() {
        let body = r#"{"error":{"code":"PrivateEndpointBadRequest","message":"Call to Microsoft.Sql/servers failed. Error message: Private Endpoint is missing required parameter 'group Id'."}}"#;
        let err = decode_error(StatusCode::BAD_REQUEST, body, "PUT /pe");
        match err {
            NetworkError::Api { status, code, message } => {
                assert_eq!(status, 400);
                assert_eq!(code, "PrivateEndpointBadRequest");
                assert!(message.contains("group Id"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_decode_error_classifies_not_found_and_auth() {
        assert!(decode_error(StatusCode::NOT_FOUND, "", "GET /pe").is_not_found());
        assert!(matches!(
            decode_error(StatusCode::FORBIDDEN, "denied", "GET /pe"),
            NetworkError::Authentication(_)
        ));
    }

    #[test]
    fn test_decode_error_with_unstructured_body() {
        match decode_error(StatusCode::BAD_GATEWAY, "upstream down", "GET /pe") {
            NetworkError::Api { code, message, .. } => {
                assert_eq!(code, "Bad Gateway");
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
