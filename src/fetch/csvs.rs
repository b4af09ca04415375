use anyhow::{Context, Result};
use reqwest::Client;
use std::path::Path;
use tokio::fs;
use url::Url;

use crate::fetch::urls;

/// Download one CSV source, keeping a snapshot under `raw_dir` named after the
/// last URL path segment. Returns the raw bytes.
///
/// No retries: a failed source is fatal for the run, and the error context
/// names the URL that failed.
pub async fn download_csv(
    client: &Client,
    url_str: &str,
    raw_dir: impl AsRef<Path>,
) -> Result<Vec<u8>> {
    let url = Url::parse(url_str).with_context(|| format!("parsing source url {}", url_str))?;
    let filename = url
        .path_segments()
        .and_then(|segments| segments.last())
        .filter(|name| !name.is_empty())
        .unwrap_or("download.csv");

    let resp = client
        .get(url.as_str())
        .send()
        .await
        .with_context(|| format!("requesting {}", url_str))?
        .error_for_status()
        .with_context(|| format!("fetching {}", url_str))?;
    let bytes = resp
        .bytes()
        .await
        .with_context(|| format!("reading body of {}", url_str))?;

    let dest = raw_dir.as_ref().join(filename);
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(&dest, &bytes)
        .await
        .with_context(|| format!("writing {}", dest.display()))?;

    Ok(bytes.to_vec())
}

/// Download the three sources concurrently: (cases, deaths, population lookup).
pub async fn download_all(
    client: &Client,
    raw_dir: &Path,
) -> Result<(Vec<u8>, Vec<u8>, Vec<u8>)> {
    tokio::try_join!(
        download_csv(client, urls::CASES_URL, raw_dir),
        download_csv(client, urls::DEATHS_URL, raw_dir),
        download_csv(client, urls::LOOKUP_URL, raw_dir),
    )
}
