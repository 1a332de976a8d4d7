//! Batch orchestration: readme, listing, then per-file download+extract+delete.
//!
//! Runs per-file work on a bounded pool (up to `max_concurrent` items in
//! flight) and awaits every item before returning, collecting a structured
//! outcome per item instead of swallowing failures.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;
use url::Url;

use crate::archive::{self, ExtractError};
use crate::config::GeozipConfig;
use crate::fetch::{self, FetchError, FetchOptions};
use crate::listing;

/// Transient pairing of a remote URL and its local destination; lives only
/// for one download+extract+delete cycle.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub file_name: String,
    pub url: String,
    pub dest: PathBuf,
}

/// Failure of a single item. Download failures skip extraction and deletion
/// (the fetcher leaves no file behind); extraction failures still delete.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("download failed: {0}")]
    Download(#[from] FetchError),
    #[error("extract failed: {0}")]
    Extract(#[from] ExtractError),
}

/// Outcome of one item, reported back to the batch for the run summary.
#[derive(Debug)]
pub struct ItemOutcome {
    pub file_name: String,
    pub result: Result<(), ItemError>,
}

#[derive(Debug, Clone)]
pub struct ItemFailure {
    pub file_name: String,
    pub reason: String,
}

/// End-of-run report across all items.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<ItemFailure>,
}

impl BatchSummary {
    pub fn record(&mut self, outcome: ItemOutcome) {
        match outcome.result {
            Ok(()) => self.succeeded += 1,
            Err(err) => self.failures.push(ItemFailure {
                file_name: outcome.file_name,
                reason: err.to_string(),
            }),
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Builds one job per filename: remote URL = base joined with the filename,
/// local path = output directory + filename.
pub fn plan_jobs(base_url: &str, output_dir: &Path, names: &[String]) -> Result<Vec<DownloadJob>> {
    let base = Url::parse(base_url).with_context(|| format!("invalid source URL '{}'", base_url))?;
    names
        .iter()
        .map(|name| {
            let url = base
                .join(name)
                .with_context(|| format!("building URL for '{}'", name))?;
            Ok(DownloadJob {
                file_name: name.clone(),
                url: url.to_string(),
                dest: output_dir.join(name),
            })
        })
        .collect()
}

/// Runs one full batch: ensure the output directory, fetch the readme
/// (best-effort), fetch and parse the listing, then run every job with at
/// most `max_concurrent` in flight, awaiting all of them.
///
/// Only setup and listing failures are returned as errors; per-item failures
/// land in the summary.
pub async fn run_batch(cfg: &GeozipConfig) -> Result<BatchSummary> {
    fs::create_dir_all(&cfg.output_dir).with_context(|| {
        format!("creating output directory '{}'", cfg.output_dir.display())
    })?;
    let opts = FetchOptions::from_config(cfg);

    download_readme(cfg, &opts).await;

    let names = {
        let url = cfg.source_url.clone();
        let suffix = cfg.archive_suffix.clone();
        let opts = opts.clone();
        tokio::task::spawn_blocking(move || listing::fetch_listing(&url, &suffix, &opts))
            .await
            .map_err(|e| anyhow::anyhow!("listing task join: {}", e))??
    };

    let jobs = plan_jobs(&cfg.source_url, &cfg.output_dir, &names)?;
    let mut summary = BatchSummary {
        attempted: jobs.len(),
        ..BatchSummary::default()
    };
    if jobs.is_empty() {
        return Ok(summary);
    }
    tracing::info!(
        "downloading {} file(s) from '{}' to '{}'",
        jobs.len(),
        cfg.source_url,
        cfg.output_dir.display()
    );

    let max_concurrent = cfg.max_concurrent.max(1);
    let mut queue = jobs.into_iter();
    let mut join_set = tokio::task::JoinSet::new();

    loop {
        while join_set.len() < max_concurrent {
            let Some(job) = queue.next() else {
                break;
            };
            let opts = opts.clone();
            join_set.spawn_blocking(move || process_item(job, &opts));
        }

        if join_set.is_empty() {
            break;
        }

        let Some(res) = join_set.join_next().await else {
            break;
        };
        let outcome = res.map_err(|e| anyhow::anyhow!("worker task join: {}", e))?;
        summary.record(outcome);
    }

    Ok(summary)
}

/// Fetches the fixed readme resource into the output directory. Failures are
/// logged and never affect the batch.
async fn download_readme(cfg: &GeozipConfig, opts: &FetchOptions) {
    let url = match Url::parse(&cfg.source_url).and_then(|base| base.join(&cfg.readme_name)) {
        Ok(url) => url.to_string(),
        Err(err) => {
            tracing::warn!("skipping readme: bad URL for '{}': {}", cfg.readme_name, err);
            return;
        }
    };
    let dest = cfg.output_dir.join(&cfg.readme_name);

    let task = {
        let url = url.clone();
        let dest = dest.clone();
        let opts = opts.clone();
        tokio::task::spawn_blocking(move || fetch::download_to_path(&url, &dest, &opts))
    };
    match task.await {
        Ok(Ok(bytes)) => tracing::debug!("downloaded '{}' ({} bytes)", dest.display(), bytes),
        Ok(Err(err)) => tracing::warn!("readme download '{}' failed: {}", url, err),
        Err(err) => tracing::warn!("readme task join: {}", err),
    }
}

fn process_item(job: DownloadJob, opts: &FetchOptions) -> ItemOutcome {
    let result = download_extract_delete(&job, opts);
    if let Err(err) = &result {
        tracing::warn!("'{}': {}", job.file_name, err);
    }
    ItemOutcome {
        file_name: job.file_name,
        result,
    }
}

fn download_extract_delete(job: &DownloadJob, opts: &FetchOptions) -> Result<(), ItemError> {
    tracing::info!("downloading '{}' to '{}'", job.url, job.dest.display());
    fetch::download_to_path(&job.url, &job.dest, opts)?;

    let out_dir = job.dest.parent().unwrap_or(Path::new("."));
    let extracted = archive::extract_zip(&job.dest, out_dir);

    // The archive is deleted after the extraction attempt, success or not.
    tracing::info!("deleting '{}'", job.dest.display());
    if let Err(err) = fs::remove_file(&job.dest) {
        tracing::warn!("could not delete '{}': {}", job.dest.display(), err);
    }

    extracted?;
    Ok(())
}
