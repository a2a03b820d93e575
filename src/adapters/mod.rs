// Adapters layer: HTTP clients for the two remote systems.

pub mod checkmarx;
pub mod port;

use crate::utils::error::{Result, SyncError};
use reqwest::{Client, Response};
use std::time::Duration;
use url::Url;

pub(crate) fn build_http_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

pub(crate) fn parse_base_url(field: &str, raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| SyncError::InvalidConfigValueError {
        field: field.to_string(),
        value: raw.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })
}

/// 在 base URL 之後附加路徑片段，片段會被 percent-encode
pub(crate) fn join_segments(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| SyncError::InvalidConfigValueError {
            field: "base_url".to_string(),
            value: base.to_string(),
            reason: "URL cannot be used as a base".to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Turn a non-success response into `SyncError::UnexpectedStatus`, keeping the body.
pub(crate) async fn error_for_status(response: Response, operation: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!("{} returned {}: {}", operation, status, body);
    Err(SyncError::UnexpectedStatus {
        operation: operation.to_string(),
        status,
        body,
    })
}
