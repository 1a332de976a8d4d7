//! CLI for the geozip postal-code archive fetcher.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use geozip_core::config::{self, GeozipConfig};
use std::path::PathBuf;

use commands::{run_fetch, run_list};

/// Top-level CLI for geozip.
#[derive(Debug, Parser)]
#[command(name = "geozip")]
#[command(about = "geozip: download and extract postal-code archives from a listing page", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Scrape the listing, then download, extract and delete each archive.
    Run {
        /// Base URL of the remote directory listing (overrides config).
        #[arg(long, value_name = "URL")]
        source_url: Option<String>,

        /// Output directory for extracted files (overrides config).
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Run up to N download+extract workers at once (overrides config).
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,

        /// Filename suffix the listing entries must end in (overrides config).
        #[arg(long, value_name = "SUFFIX")]
        suffix: Option<String>,

        /// Exit non-zero if any item failed.
        #[arg(long)]
        strict: bool,
    },

    /// Print the filenames the listing page offers, without downloading.
    List {
        /// Base URL of the remote directory listing (overrides config).
        #[arg(long, value_name = "URL")]
        source_url: Option<String>,

        /// Filename suffix the listing entries must end in (overrides config).
        #[arg(long, value_name = "SUFFIX")]
        suffix: Option<String>,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                source_url,
                output_dir,
                jobs,
                suffix,
                strict,
            } => {
                apply_overrides(&mut cfg, source_url, suffix);
                if let Some(dir) = output_dir {
                    cfg.output_dir = dir;
                }
                if let Some(jobs) = jobs {
                    cfg.max_concurrent = jobs;
                }
                run_fetch(&cfg, strict).await?;
            }
            CliCommand::List { source_url, suffix } => {
                apply_overrides(&mut cfg, source_url, suffix);
                run_list(&cfg).await?;
            }
        }

        Ok(())
    }
}

fn apply_overrides(cfg: &mut GeozipConfig, source_url: Option<String>, suffix: Option<String>) {
    if let Some(url) = source_url {
        cfg.source_url = url;
    }
    if let Some(suffix) = suffix {
        cfg.archive_suffix = suffix;
    }
}

#[cfg(test)]
mod tests;
