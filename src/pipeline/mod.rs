pub mod stage1_prepare;
pub mod stage2_jobs;
pub mod stage3_classify;
pub mod stage4_mask;
pub mod stage5_rank;
pub mod stage6_names;
pub mod stage7_report;

use std::path::Path;

use crate::error::Result;
use crate::input::gene_map::load_gene_map;
use crate::input::{CohortLayout, list_result_files};
use crate::model::thresholds::ThresholdProfile;
use crate::report::json::write_summary_json;
use crate::report::{ResultSetSummary, RunSummary};
use stage1_prepare::{Stage1Params, run_stage1};
use stage2_jobs::{JobExecutor, run_jobs};
use stage3_classify::{apply_relocations, run_stage3};
use stage4_mask::run_stage4;
use stage5_rank::run_stage5;
use stage6_names::run_stage6;
use stage7_report::write_ranked_table;

#[derive(Debug, Clone)]
pub struct AggregateParams<'a> {
    pub layout: &'a CohortLayout,
    pub gene_map: &'a Path,
    pub thresholds: ThresholdProfile,
    pub drop_underrepresented: bool,
}

pub fn run_aggregation(params: &AggregateParams<'_>, n_units_run: usize) -> Result<RunSummary> {
    let layout = params.layout;
    layout.ensure_aggregate_dirs()?;
    let gene_map = load_gene_map(params.gene_map)?;
    if gene_map.is_empty() {
        crate::warn!(
            "gene map {} has no entries; raw ids will be reported",
            params.gene_map.display()
        );
    } else {
        crate::info!("{} gene names loaded", gene_map.len());
    }

    crate::info!("compiling pairwise results");
    let files = list_result_files(&layout.pairwise_dir)?;
    let classification = run_stage3(layout, &files);

    let masks = run_stage4(
        &layout.pairwise_dir,
        &layout.masked_dir,
        &classification.matched_subjects,
        &params.thresholds,
    )?;
    crate::info!(
        "masked {} subjects: {} genes removed from tumor tables, {} masked genes absent",
        masks.subjects,
        masks.removed,
        masks.misses
    );

    let plan = classification.relocation_plan(
        &layout.pairwise_dir,
        &layout.matched_dir,
        &layout.unmatched_dir,
    );
    apply_relocations(&plan)?;

    let mut result_sets = Vec::with_capacity(2);
    for dir in [&layout.masked_dir, &layout.unmatched_dir] {
        let mut ranked = run_stage5(dir, &params.thresholds, params.drop_underrepresented)?;
        let misses = run_stage6(&mut ranked.ranked, &gene_map);
        let out_path = layout.ranked_path(dir);
        crate::info!("saving ranked TSV file to: {}", out_path.display());
        write_ranked_table(&out_path, &ranked.ranked)?;
        result_sets.push(ResultSetSummary {
            name: result_set_name(dir),
            n_files: ranked.n_files,
            n_genes_ranked: ranked.ranked.len(),
            n_genes_dropped_underrepresented: ranked.n_dropped,
            n_mapping_misses: misses,
            ranked_path: out_path.display().to_string(),
        });
    }

    let summary = RunSummary {
        tool: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        n_units_run,
        n_result_files: files.len(),
        n_matched_subjects: classification.matched_subjects.len(),
        n_unmatched_files: classification.unmatched_files.len(),
        classification_anomalies: classification
            .anomalies
            .iter()
            .map(|a| a.describe())
            .collect(),
        n_masked_genes: masks.masked_genes,
        n_masking_misses: masks.misses,
        drop_underrepresented: params.drop_underrepresented,
        result_sets,
    };
    write_summary_json(&layout.results_dir, &summary)?;
    Ok(summary)
}

#[derive(Debug, Clone)]
pub struct RunParams<'a> {
    pub aggregate: AggregateParams<'a>,
    pub gencode: &'a Path,
    pub unit_marker: &'a str,
    pub cores: usize,
}

/// Prepare the cohort, run every unit through `executor`, then aggregate.
/// A failing unit aborts before any ranking.
pub fn run_pipeline<E: JobExecutor>(params: &RunParams<'_>, executor: &E) -> Result<RunSummary> {
    let layout = params.aggregate.layout;
    let prepared = run_stage1(&Stage1Params {
        layout,
        gencode: params.gencode,
        unit_marker: params.unit_marker,
    })?;
    crate::info!(
        "{} units will be compared using {}",
        prepared.units.len(),
        prepared.expression_table.display()
    );
    let report = run_jobs(&prepared.units, params.cores, executor)?;
    run_aggregation(&params.aggregate, report.completed)
}

fn result_set_name(dir: &Path) -> String {
    dir.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/mod.rs"]
mod tests;
