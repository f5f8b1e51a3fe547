//! Plumbing shared by the HTTP handlers.

use std::time::{Duration, Instant};

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{BackendError, BackendId};

/// Map a reqwest failure, keeping timeouts distinguishable from other transport errors.
pub(crate) fn transport_error(backend: BackendId, timeout: Duration, error: reqwest::Error) -> BackendError {
    if error.is_timeout() {
        BackendError::Timeout {
            backend,
            after: timeout,
        }
    } else {
        BackendError::Network {
            backend,
            source: error,
        }
    }
}

/// Pass 2xx responses through; turn everything else into a `BackendError`.
pub(crate) async fn check_status(backend: BackendId, response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(BackendError::RateLimited { backend });
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
    Err(BackendError::Api {
        backend,
        status: status.as_u16(),
        body,
    })
}

/// Read and decode a JSON body.
pub(crate) async fn read_json<T: DeserializeOwned>(
    backend: BackendId,
    timeout: Duration,
    response: Response,
) -> Result<T, BackendError> {
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(backend, timeout, e))?;

    serde_json::from_str(&body).map_err(|e| BackendError::MalformedResponse {
        backend,
        details: e.to_string(),
    })
}

/// Time a GET against `url`. Any HTTP answer counts as reachable.
pub(crate) async fn probe(
    client: &reqwest::Client,
    backend: BackendId,
    url: &str,
    timeout: Duration,
) -> Result<Duration, BackendError> {
    let started = Instant::now();
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| transport_error(backend, timeout, e))?;
    let elapsed = started.elapsed();

    debug!(
        "{} warm-up answered {} in {:?}",
        backend,
        response.status(),
        elapsed
    );
    Ok(elapsed)
}
