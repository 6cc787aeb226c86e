use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::input::result_table::{ResultTable, read_result_table, write_result_table};
use crate::model::records::SampleType;
use crate::model::thresholds::ThresholdProfile;

pub const MASKED_GENES_SUFFIX: &str = "_masked_genes";

#[derive(Debug, Clone, PartialEq)]
pub struct MaskedResult {
    pub subject: String,
    pub table: ResultTable,
    pub masked_genes: Vec<String>,
    pub removed: usize,
    pub misses: usize,
}

pub fn mask_tumor(
    subject: &str,
    normal: &ResultTable,
    tumor: &ResultTable,
    cutoff: f64,
) -> MaskedResult {
    let masked_genes: Vec<String> = normal
        .records()
        .filter(|r| ThresholdProfile::is_significant(r.p_value, cutoff))
        .map(|r| r.gene_id.clone())
        .collect();
    let mask: HashSet<&str> = masked_genes.iter().map(String::as_str).collect();
    let table = tumor.without_genes(&mask);
    let removed = tumor.len() - table.len();
    MaskedResult {
        subject: subject.to_string(),
        misses: masked_genes.len() - removed,
        removed,
        table,
        masked_genes,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaskTotals {
    pub subjects: usize,
    pub masked_genes: usize,
    pub removed: usize,
    pub misses: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskPaths {
    pub table: PathBuf,
    pub masked_genes: PathBuf,
}

pub fn mask_paths(masked_dir: &Path, subject: &str) -> MaskPaths {
    MaskPaths {
        table: masked_dir.join(SampleType::Tumor.file_name(subject)),
        masked_genes: masked_dir.join(format!("{subject}{MASKED_GENES_SUFFIX}")),
    }
}

pub fn write_masked_result(masked_dir: &Path, result: &MaskedResult) -> Result<MaskPaths> {
    let paths = mask_paths(masked_dir, &result.subject);
    write_result_table(&paths.table, &result.table)?;
    fs::write(&paths.masked_genes, result.masked_genes.join("\n"))?;
    Ok(paths)
}

pub fn run_stage4(
    source_dir: &Path,
    masked_dir: &Path,
    subjects: &BTreeSet<String>,
    thresholds: &ThresholdProfile,
) -> Result<MaskTotals> {
    crate::info!("producing masks for {} matched samples", subjects.len());
    let mut totals = MaskTotals::default();
    for subject in subjects {
        let normal = read_result_table(&source_dir.join(SampleType::Normal.file_name(subject)))?;
        let tumor = read_result_table(&source_dir.join(SampleType::Tumor.file_name(subject)))?;
        let result = mask_tumor(subject, &normal, &tumor, thresholds.mask_p);
        crate::debug!(
            "match {}: {} genes masked, {} removed, {} absent from tumor",
            subject,
            result.masked_genes.len(),
            result.removed,
            result.misses
        );
        if result.table.is_empty() {
            crate::warn!("match {subject}: every tumor gene was masked");
        }
        write_masked_result(masked_dir, &result)?;
        totals.subjects += 1;
        totals.masked_genes += result.masked_genes.len();
        totals.removed += result.removed;
        totals.misses += result.misses;
    }
    Ok(totals)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_mask.rs"]
mod tests;
