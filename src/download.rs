//! Fetch the sample click dataset to a local path
//!
//! An existing file is kept unless overwrite is requested, in which case no
//! request is made at all.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::info;

/// Public sample of the Criteo click-through-rate dataset (first 10,000 rows)
pub const DEFAULT_URL: &str =
    "https://github.com/RecoHut-Projects/AB-Testing-Tutorial/raw/main/data/criteo_sampled_data.csv";

/// Where the runner looks for data by default
pub const DEFAULT_OUTPUT: &str = "data/raw/criteo_sample.csv";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors that can occur while downloading
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to fetch '{url}': {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What happened to the destination file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// File already existed and overwrite was not requested
    Kept,
    Downloaded { bytes: usize },
}

/// Download `url` to `destination`
///
/// Creates missing parent directories. Returns [`DownloadOutcome::Kept`] without
/// touching the network when the destination exists and `overwrite` is false.
pub fn download(
    url: &str,
    destination: &Path,
    overwrite: bool,
) -> Result<DownloadOutcome, DownloadError> {
    if destination.exists() && !overwrite {
        info!(path = %destination.display(), "keeping existing file");
        return Ok(DownloadOutcome::Kept);
    }

    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| DownloadError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let request_error = |source| DownloadError::Request {
        url: url.to_string(),
        source,
    };

    info!(url, path = %destination.display(), "downloading");

    let client = reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(request_error)?;

    let body = client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.bytes())
        .map_err(request_error)?;

    fs::write(destination, &body).map_err(|source| DownloadError::Write {
        path: destination.to_path_buf(),
        source,
    })?;

    Ok(DownloadOutcome::Downloaded { bytes: body.len() })
}
