use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;

use crate::error::{PipelineError, Result};
use crate::model::records::RESULT_EXT;

pub mod gencode;
pub mod gene_map;
pub mod result_table;
pub mod tissue_table;

pub const PAIRWISE_DIR: &str = "pairwise_results";
pub const MASKED_DIR: &str = "masked_results";
pub const MATCHED_DIR: &str = "matched_results";
pub const UNMATCHED_DIR: &str = "unmatched_results";
pub const RESULTS_DIR: &str = "results";
pub const DE_SCRIPT_NAME: &str = "edgeR-pairwise-DE.R";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CohortLayout {
    pub tissue_dir: PathBuf,
    pub tissue_df: PathBuf,
    pub pc_path: PathBuf,
    pub pairwise_dir: PathBuf,
    pub masked_dir: PathBuf,
    pub matched_dir: PathBuf,
    pub unmatched_dir: PathBuf,
    pub results_dir: PathBuf,
}

impl CohortLayout {
    pub fn from_tissue_df(tissue_df: &Path) -> Self {
        let tissue_dir = tissue_df
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
        let stem = tissue_df
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let pairwise_dir = tissue_dir.join(PAIRWISE_DIR);
        Self {
            pc_path: tissue_dir.join(format!("{stem}_pc.tsv")),
            masked_dir: pairwise_dir.join(MASKED_DIR),
            matched_dir: pairwise_dir.join(MATCHED_DIR),
            unmatched_dir: pairwise_dir.join(UNMATCHED_DIR),
            results_dir: tissue_dir.join(RESULTS_DIR),
            tissue_df: tissue_df.to_path_buf(),
            pairwise_dir,
            tissue_dir,
        }
    }

    pub fn default_de_script(&self) -> PathBuf {
        self.tissue_dir.join(DE_SCRIPT_NAME)
    }

    pub fn ensure_job_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.pairwise_dir)?;
        Ok(())
    }

    pub fn ensure_aggregate_dirs(&self) -> Result<()> {
        for dir in [
            &self.results_dir,
            &self.masked_dir,
            &self.matched_dir,
            &self.unmatched_dir,
        ] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    pub fn ranked_path(&self, result_set_dir: &Path) -> PathBuf {
        let name = result_set_dir
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.results_dir.join(format!("{name}-ranked.tsv"))
    }
}

/// Result files (`*.tsv`) directly inside `dir`, sorted by file name.
/// Accumulation order follows this listing.
pub fn list_result_files(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Err(PipelineError::MissingInput(format!(
            "result directory {} does not exist",
            dir.display()
        )));
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(RESULT_EXT) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

pub fn open_maybe_gz(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).map_err(|e| {
        PipelineError::MissingInput(format!("cannot open {}: {e}", path.display()))
    })?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
