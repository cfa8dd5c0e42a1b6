//! Pull request diff download.
//!
//! The CI server publishes the unified diff of a pull request build at
//! `{build_url}/diff.txt?api_token={token}`. A 200 response body is written
//! verbatim to a temporary `.diff` file whose path is handed to `git apply`.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use ci_checkout_core::DiffSource;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::info;

/// Timeout for the whole diff request.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const USER_AGENT: &str = concat!("ci-checkout/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum DiffError {
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Can't download diff file from {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Can't download diff file from {url}, HTTP status code: {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to write diff file: {0}")]
    Io(#[from] std::io::Error),
}

/// Obtains a pull request's diff as a local file.
pub trait DiffFetcher {
    fn fetch_diff(&self, source: &DiffSource) -> Result<PathBuf, DiffError>;
}

/// Downloads the diff over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDiffFetcher {
    client: Client,
}

impl HttpDiffFetcher {
    pub fn new() -> Result<Self, DiffError> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(DiffError::Client)?;
        Ok(Self { client })
    }
}

impl DiffFetcher for HttpDiffFetcher {
    fn fetch_diff(&self, source: &DiffSource) -> Result<PathBuf, DiffError> {
        // The token stays out of the URL used in logs and errors.
        let url = source.diff_url();
        info!(url = %url, "downloading diff file");

        let response = self
            .client
            .get(&url)
            .query(&[("api_token", source.api_token.as_str())])
            .send()
            .map_err(|source| DiffError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DiffError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(|source| DiffError::Request {
            url: url.clone(),
            source,
        })?;

        let prefix = format!("{}-", source.pr_id.as_deref().unwrap_or("pr"));
        let mut file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".diff")
            .tempfile()?;
        file.write_all(&body)?;
        let (_, path) = file.keep().map_err(|e| DiffError::Io(e.error))?;

        info!(path = %path.display(), bytes = body.len(), "diff file downloaded");
        Ok(path)
    }
}
