pub mod json;

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSetSummary {
    pub name: String,
    pub n_files: usize,
    pub n_genes_ranked: usize,
    pub n_genes_dropped_underrepresented: usize,
    pub n_mapping_misses: usize,
    pub ranked_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub tool: String,
    pub version: String,
    pub n_units_run: usize,
    pub n_result_files: usize,
    pub n_matched_subjects: usize,
    pub n_unmatched_files: usize,
    pub classification_anomalies: Vec<String>,
    pub n_masked_genes: usize,
    pub n_masking_misses: usize,
    pub drop_underrepresented: bool,
    pub result_sets: Vec<ResultSetSummary>,
}

/// Median with the two middle values averaged for even lengths. Any NaN yields NaN.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() || values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    var.sqrt()
}

pub fn count_below(values: &[f64], cutoff: f64) -> usize {
    values.iter().filter(|&&v| v < cutoff).count()
}

const SCIENTIFIC_BELOW: f64 = 1e-4;

pub fn format_f64(v: f64) -> String {
    if v.is_nan() {
        "NA".to_string()
    } else if v != 0.0 && v.abs() < SCIENTIFIC_BELOW {
        format!("{v:e}")
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
