//! Blocking HTTP fetches against the release host.
//!
//! Whole bodies are buffered in memory: the largest artifact is a single
//! zipped executable, and the checksum must be verified before anything
//! touches the disk.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use thiserror::Error;

/// Per-request timeout of the shared client.
pub const TIMEOUT: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Build the client shared by every request of a run.
pub fn client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(TIMEOUT)
        .user_agent(crate::USER_AGENT)
        .build()
}

/// GET `url` and return the full body. Any non-2xx status is an error.
pub fn get_bytes(client: &Client, url: &str) -> Result<Vec<u8>, FetchError> {
    tracing::debug!("GET {url}");

    let transport = |source: reqwest::Error| FetchError::Transport {
        url: url.to_string(),
        source,
    };

    let resp = client.get(url).send().map_err(transport)?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    let body = resp.bytes().map_err(transport)?;
    tracing::debug!("fetched {} bytes from {url}", body.len());
    Ok(body.to_vec())
}
