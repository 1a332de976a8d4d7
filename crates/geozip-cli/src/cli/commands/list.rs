//! `geozip list` – print the listing without downloading anything.

use anyhow::Result;
use geozip_core::config::GeozipConfig;
use geozip_core::fetch::FetchOptions;
use geozip_core::listing;

pub async fn run_list(cfg: &GeozipConfig) -> Result<()> {
    let url = cfg.source_url.clone();
    let suffix = cfg.archive_suffix.clone();
    let opts = FetchOptions::from_config(cfg);
    let names = tokio::task::spawn_blocking(move || listing::fetch_listing(&url, &suffix, &opts))
        .await
        .map_err(|e| anyhow::anyhow!("listing task join: {}", e))??;

    if names.is_empty() {
        println!("No matching files.");
        return Ok(());
    }
    for name in names {
        println!("{}", name);
    }
    Ok(())
}
