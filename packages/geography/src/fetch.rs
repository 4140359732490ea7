//! Remote boundary document download.
//!
//! Certificate verification stays on. The request is retried with
//! exponential backoff, and the response body is logged (truncated) when
//! it cannot be used.

use std::time::Duration;

use geojson::GeoJson;

use crate::GeoError;

/// User-Agent sent with boundary requests.
const USER_AGENT: &str = concat!("sdoh-map/", env!("CARGO_PKG_VERSION"));

/// Builds a `reqwest::Client` for boundary downloads.
///
/// # Errors
///
/// Returns [`GeoError`] if the client cannot be built.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, GeoError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(Into::into)
}

/// Truncates a string for logging.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

/// Longest wait between two attempts.
const MAX_RETRY_DELAY_SECS: u64 = 60;

/// Backoff before the given (1-based) retry: 2s, 4s, 8s, ... capped at
/// [`MAX_RETRY_DELAY_SECS`].
fn retry_delay(attempt: u32) -> Duration {
    let secs = 1u64
        .checked_shl(attempt)
        .map_or(MAX_RETRY_DELAY_SECS, |s| s.min(MAX_RETRY_DELAY_SECS));
    Duration::from_secs(secs)
}

/// Downloads and parses a `GeoJSON` document, retrying transport errors,
/// non-success statuses, and unparseable bodies.
///
/// # Errors
///
/// Returns [`GeoError::Conversion`] describing the last failure once all
/// `max_retries` attempts are used up.
pub async fn fetch_geojson_with_retry(
    client: &reqwest::Client,
    url: &str,
    max_retries: u32,
) -> Result<GeoJson, GeoError> {
    let mut last_error = String::new();

    for attempt in 0..max_retries {
        if attempt > 0 {
            let delay = retry_delay(attempt);
            log::warn!(
                "Boundary download: retry {attempt}/{max_retries} in {}s...",
                delay.as_secs()
            );
            tokio::time::sleep(delay).await;
        }

        let resp = match client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                last_error = format!("HTTP request error: {e}");
                log::warn!("Boundary download (attempt {attempt}): {last_error}");
                continue;
            }
        };

        let status = resp.status();
        let body = match resp.text().await {
            Ok(b) => b,
            Err(e) => {
                last_error = format!("Failed to read response body: {e}");
                log::warn!("Boundary download (attempt {attempt}): {last_error}");
                continue;
            }
        };

        if !status.is_success() {
            last_error = format!("HTTP {status}");
            log::warn!(
                "Boundary download (attempt {attempt}): {last_error}. Response body: {}",
                truncate_for_log(&body, 500)
            );
            continue;
        }

        match body.parse::<GeoJson>() {
            Ok(doc) => {
                log::info!("Downloaded boundary document ({} bytes)", body.len());
                return Ok(doc);
            }
            Err(e) => {
                last_error = format!("GeoJSON parse error: {e}");
                log::warn!(
                    "Boundary download (attempt {attempt}): {last_error}. Response body: {}",
                    truncate_for_log(&body, 500)
                );
            }
        }
    }

    Err(GeoError::Conversion {
        message: format!(
            "Boundary download from {url} failed after {max_retries} attempts: {last_error}"
        ),
    })
}
