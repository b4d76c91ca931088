//! Shared HTTP client and auth header utilities.

use std::sync::OnceLock;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};

use crate::error::ParleyError;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// User agent sent to every external service.
pub const PARLEY_USER_AGENT: &str = concat!("parley/", env!("CARGO_PKG_VERSION"));

/// Get (or create) the shared reqwest client.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .pool_max_idle_per_host(10)
            .user_agent(PARLEY_USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    })
}

/// Build default headers for a Bearer-token API.
pub fn bearer_headers(api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(&format!("Bearer {api_key}")) {
        headers.insert(AUTHORIZATION, val);
    }
    headers
}

/// Build Gemini headers (x-goog-api-key).
pub fn google_headers(api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(api_key) {
        headers.insert("x-goog-api-key", val);
    }
    headers
}

/// Build GitHub REST headers for a personal access token.
pub fn github_headers(token: &str) -> HeaderMap {
    let mut headers = bearer_headers(token);
    headers.insert(
        "accept",
        HeaderValue::from_static("application/vnd.github+json"),
    );
    headers.insert(
        "x-github-api-version",
        HeaderValue::from_static("2022-11-28"),
    );
    headers.insert(USER_AGENT, HeaderValue::from_static(PARLEY_USER_AGENT));
    headers
}

/// Map a non-success HTTP status to an error.
pub fn status_to_error(status: u16, body: &str) -> ParleyError {
    match status {
        401 | 403 => ParleyError::Authentication(body.to_string()),
        429 => ParleyError::RateLimited {
            retry_after_ms: extract_retry_after(body),
        },
        _ => ParleyError::api(status, body),
    }
}

fn extract_retry_after(body: &str) -> Option<u64> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("retry_after"))
                .and_then(|r| r.as_f64())
                .map(|s| (s * 1000.0) as u64)
        })
}

/// Read a JSON body, turning non-2xx statuses into errors.
pub async fn json_or_error<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ParleyError> {
    let status = resp.status();
    if !status.is_success() {
        let body_text = resp.text().await.unwrap_or_default();
        return Err(status_to_error(status.as_u16(), &body_text));
    }
    Ok(resp.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert!(matches!(status_to_error(401, "x"), ParleyError::Authentication(_)));
        assert!(matches!(
            status_to_error(429, r#"{"error":{"retry_after":1.5}}"#),
            ParleyError::RateLimited { retry_after_ms: Some(1500) }
        ));
        assert!(matches!(status_to_error(500, "boom"), ParleyError::Api { status: 500, .. }));
    }

    #[test]
    fn bearer_header_is_set() {
        let headers = bearer_headers("sk-test");
        assert_eq!(headers[AUTHORIZATION], "Bearer sk-test");
    }
}
