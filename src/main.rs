use anyhow::Result;
use covidcrunch::{fetch, process, report};
use reqwest::Client;
use std::{fs, path::PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,covidcrunch=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) configure dirs ───────────────────────────────────────────
    let raw_dir = PathBuf::from("raw");
    let out_dir = PathBuf::from("out");
    for d in &[&raw_dir, &out_dir] {
        fs::create_dir_all(d)?;
    }

    // ─── 3) download the three sources ───────────────────────────────
    let client = Client::new();
    let (cases_csv, deaths_csv, lookup_csv) = fetch::csvs::download_all(&client, &raw_dir).await?;
    info!(
        cases_bytes = cases_csv.len(),
        deaths_bytes = deaths_csv.len(),
        lookup_bytes = lookup_csv.len(),
        "downloaded sources"
    );

    // ─── 4) run the pipeline ─────────────────────────────────────────
    let output = process::run_pipeline(&cases_csv, &deaths_csv, &lookup_csv)?;
    info!(
        joined = output.joined.len(),
        dates = output.global_daily.len(),
        countries = output.leaderboard.len(),
        "pipeline complete"
    );

    // ─── 5) write outputs ────────────────────────────────────────────
    report::write_all(&out_dir, &output)?;

    for (rank, country) in output.leaderboard.iter().take(5).enumerate() {
        info!(
            rank = rank + 1,
            country = %country.country_region,
            cases = country.total_cases,
            deaths = country.total_deaths,
            "leaderboard"
        );
    }

    info!("all done");
    Ok(())
}
