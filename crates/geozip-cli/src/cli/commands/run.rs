//! `geozip run` – the full download+extract+delete batch.

use anyhow::Result;
use geozip_core::batch;
use geozip_core::config::GeozipConfig;

pub async fn run_fetch(cfg: &GeozipConfig, strict: bool) -> Result<()> {
    let summary = batch::run_batch(cfg).await?;

    if summary.attempted == 0 {
        println!("No matching files in listing.");
    } else {
        println!(
            "{} file(s): {} succeeded, {} failed.",
            summary.attempted,
            summary.succeeded,
            summary.failures.len()
        );
        for failure in &summary.failures {
            println!("  {}: {}", failure.file_name, failure.reason);
        }
    }

    if strict && !summary.all_succeeded() {
        anyhow::bail!("{} item(s) failed", summary.failures.len());
    }
    Ok(())
}
