//! HTTP fetch primitives over curl Easy handles.
//!
//! Two modes: a buffered text fetch for the listing page, and a streamed
//! download that writes the body incrementally to a local file.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use crate::config::GeozipConfig;

/// Error from a single fetch (curl failure, HTTP error, or local write failure).
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, invalid URL, etc.).
    #[error(transparent)]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Local file write failed (e.g. disk full, permission denied).
    #[error("i/o: {0}")]
    Io(#[from] io::Error),
}

/// Per-request tuning shared by all fetches in a run.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl FetchOptions {
    pub fn from_config(cfg: &GeozipConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            request_timeout: Duration::from_secs(cfg.request_timeout_secs),
        }
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(3600),
        }
    }
}

fn configured_handle(url: &str, opts: &FetchOptions) -> Result<curl::easy::Easy, FetchError> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.timeout(opts.request_timeout)?;
    Ok(easy)
}

/// Fetches `url` with a single GET and returns the body as text.
///
/// HTML listings are not guaranteed to declare a charset, so invalid UTF-8 is
/// replaced rather than rejected.
pub fn fetch_text(url: &str, opts: &FetchOptions) -> Result<String, FetchError> {
    let mut easy = configured_handle(url, opts)?;
    let mut body: Vec<u8> = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(FetchError::Http(code));
    }
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Downloads `url` to `dest`, streaming the body to disk. Returns the number
/// of bytes written.
///
/// On failure the partial destination file is removed, so callers can treat
/// a download error as "no local file exists".
pub fn download_to_path(url: &str, dest: &Path, opts: &FetchOptions) -> Result<u64, FetchError> {
    match stream_to_file(url, dest, opts) {
        Ok(written) => Ok(written),
        Err(err) => {
            if dest.exists() {
                if let Err(rm_err) = fs::remove_file(dest) {
                    tracing::warn!(
                        "could not remove partial file '{}': {}",
                        dest.display(),
                        rm_err
                    );
                }
            }
            Err(err)
        }
    }
}

fn stream_to_file(url: &str, dest: &Path, opts: &FetchOptions) -> Result<u64, FetchError> {
    let mut easy = configured_handle(url, opts)?;
    let mut writer = BufWriter::new(File::create(dest)?);
    let mut written: u64 = 0;
    let mut write_err: Option<io::Error> = None;

    let transfer_result = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match writer.write_all(data) {
            Ok(()) => {
                written += data.len() as u64;
                Ok(data.len())
            }
            Err(e) => {
                write_err = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        transfer.perform()
    };

    // A failed local write surfaces as a curl write error; report the io error instead.
    if let Some(e) = write_err {
        return Err(FetchError::Io(e));
    }
    transfer_result?;
    writer.flush()?;

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(FetchError::Http(code));
    }
    Ok(written)
}
