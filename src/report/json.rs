use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::report::RunSummary;

pub const SUMMARY_FILE: &str = "summary.json";

pub fn render_summary_json(summary: &RunSummary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

pub fn write_summary_json(results_dir: &Path, summary: &RunSummary) -> Result<()> {
    let json = render_summary_json(summary)?;
    fs::write(results_dir.join(SUMMARY_FILE), json + "\n")?;
    Ok(())
}
