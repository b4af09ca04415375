pub mod parquet;
pub mod summary;

use anyhow::Result;
use std::path::Path;

use crate::process::PipelineOutput;

/// Write every output table under `out_dir`. Field names in the files match
/// the in-memory structs; downstream consumers bind by name.
pub fn write_all(out_dir: &Path, output: &PipelineOutput) -> Result<()> {
    parquet::write_joined(&out_dir.join("joined.parquet"), &output.joined)?;
    parquet::write_global_daily(&out_dir.join("global_daily.parquet"), &output.global_daily)?;
    parquet::write_leaderboard(&out_dir.join("leaderboard.parquet"), &output.leaderboard)?;
    summary::write_leaderboard_json(&out_dir.join("leaderboard.json"), &output.leaderboard)?;
    Ok(())
}
