use anyhow::{Context, Result};
use std::{fs::File, io::BufWriter, path::Path};
use tracing::info;

use crate::process::aggregate::CountrySummary;

/// Write the leaderboard as pretty JSON for quick inspection.
pub fn write_leaderboard_json(path: &Path, leaderboard: &[CountrySummary]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), leaderboard)
        .with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), rows = leaderboard.len(), "wrote leaderboard json");
    Ok(())
}
