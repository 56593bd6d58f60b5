//! Shared HTTP plumbing for every outbound client.

use std::time::Duration;

use locas_core::error::ProviderError;
use tracing::warn;

/// Build the shared client. One per process; every request inherits the
/// per-call timeout.
pub fn build_client(timeout: Duration, user_agent: &str) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(|e| ProviderError::NotConfigured(format!("failed to create HTTP client: {e}")))
}

/// Map a reqwest transport failure onto our error taxonomy.
pub(crate) fn transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string())
    } else {
        ProviderError::Network(e.to_string())
    }
}

/// Turn non-success statuses into typed errors, passing 2xx through.
pub(crate) async fn check_status(
    service: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status().as_u16();

    if status == 429 {
        return Err(ProviderError::RateLimited { retry_after_secs: 5 });
    }

    if status == 401 || status == 403 {
        return Err(ProviderError::AuthenticationFailed(format!(
            "{service}: invalid API key or insufficient permissions"
        )));
    }

    if !(200..300).contains(&status) {
        let error_body = response.text().await.unwrap_or_default();
        warn!(service, status, body = %error_body, "Upstream returned error");
        return Err(ProviderError::ApiError {
            status_code: status,
            message: error_body,
        });
    }

    Ok(response)
}

/// Read the body as JSON, mapping decode failures to `InvalidResponse`.
pub(crate) async fn read_json(service: &str, response: reqwest::Response) -> Result<serde_json::Value, ProviderError> {
    response
        .json()
        .await
        .map_err(|e| ProviderError::InvalidResponse(format!("{service}: failed to parse response: {e}")))
}
