use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::error::PipelineError;
use crate::pipeline::stage7_report::read_ranked_table;
use crate::report::json::SUMMARY_FILE;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("kira_pairwisede_pipeline_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

const HEADER: &str = "\tlogFC\tlogCPM\tPValue\n";

fn write_result(dir: &Path, name: &str, rows: &[(&str, f64, f64)]) {
    let mut text = HEADER.to_string();
    for (gene, fc, p) in rows {
        text.push_str(&format!("{gene}\t{fc}\t5\t{p}\n"));
    }
    fs::write(dir.join(name), text).unwrap();
}

fn cohort(dir: &Path) -> (CohortLayout, PathBuf) {
    let tissue_df = dir.join("combined.tsv");
    fs::write(
        &tissue_df,
        "\tGTEX-1\tTCGA-AA-0001-01\tTCGA-AA-0001-11\nENSG1\t1\t2\t3\n",
    )
    .unwrap();
    let gene_map = dir.join("attrs.tsv");
    fs::write(&gene_map, "geneId\tgeneName\tgeneType\ng1\tTP53\tpc\ng2\tBRCA1\tpc\n").unwrap();
    (CohortLayout::from_tissue_df(&tissue_df), gene_map)
}

fn params<'a>(layout: &'a CohortLayout, gene_map: &'a Path) -> AggregateParams<'a> {
    AggregateParams {
        layout,
        gene_map,
        thresholds: ThresholdProfile::default_v1(),
        drop_underrepresented: false,
    }
}

#[test]
fn test_aggregation_masks_relocates_and_ranks() {
    let dir = make_temp_dir();
    let (layout, gene_map) = cohort(&dir);
    fs::create_dir_all(&layout.pairwise_dir).unwrap();
    let pw = &layout.pairwise_dir;
    write_result(pw, "A.11.tsv", &[("g1", 0.5, 0.0001), ("g2", 0.5, 0.5)]);
    write_result(
        pw,
        "A.01.tsv",
        &[("g1", 2.0, 0.0002), ("g2", 1.0, 0.0003), ("g3", -1.0, 0.9)],
    );
    write_result(pw, "B.01.tsv", &[("g1", 1.0, 0.0001), ("g5", 3.0, 0.2)]);
    write_result(pw, "C.11.tsv", &[("g1", 2.0, 0.00001), ("g5", 1.0, 0.0005)]);

    let summary = run_aggregation(&params(&layout, &gene_map), 0).unwrap();

    assert_eq!(summary.n_result_files, 4);
    assert_eq!(summary.n_matched_subjects, 1);
    assert_eq!(summary.n_unmatched_files, 2);
    assert!(summary.classification_anomalies.is_empty());
    assert_eq!(summary.n_masked_genes, 1);
    assert_eq!(summary.n_masking_misses, 0);

    // Every source file left the pairwise directory.
    assert!(list_result_files(pw).unwrap().is_empty());
    assert!(layout.matched_dir.join("A.01.tsv").exists());
    assert!(layout.matched_dir.join("A.11.tsv").exists());
    assert!(layout.unmatched_dir.join("B.01.tsv").exists());
    assert!(layout.unmatched_dir.join("C.11.tsv").exists());
    assert_eq!(
        fs::read_to_string(layout.masked_dir.join("A_masked_genes")).unwrap(),
        "g1"
    );

    let masked = read_ranked_table(&layout.results_dir.join("masked_results-ranked.tsv")).unwrap();
    let ids: Vec<&str> = masked.iter().map(|r| r.gene_id.as_str()).collect();
    assert_eq!(ids, vec!["g2", "g3"]);
    assert_eq!(masked[0].gene_name, "BRCA1");
    assert_eq!(masked[0].pval_below_threshold_count, 1);
    assert_eq!(masked[1].gene_name, "g3");

    let unmatched =
        read_ranked_table(&layout.results_dir.join("unmatched_results-ranked.tsv")).unwrap();
    let ids: Vec<&str> = unmatched.iter().map(|r| r.gene_id.as_str()).collect();
    assert_eq!(ids, vec!["g1", "g5"]);
    assert_eq!(unmatched[0].gene_name, "TP53");
    assert_eq!(unmatched[0].pval_below_threshold_count, 2);
    assert_eq!(unmatched[0].num_samples, 2);
    assert_eq!(unmatched[0].fc_median, 1.5);
    assert_eq!(unmatched[1].pval_below_threshold_count, 1);

    assert_eq!(summary.result_sets.len(), 2);
    assert_eq!(summary.result_sets[0].name, "masked_results");
    assert_eq!(summary.result_sets[0].n_files, 1);
    assert_eq!(summary.result_sets[0].n_mapping_misses, 1);
    assert_eq!(summary.result_sets[1].name, "unmatched_results");
    assert_eq!(summary.result_sets[1].n_files, 2);
    assert_eq!(summary.result_sets[1].n_mapping_misses, 1);

    let json: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(layout.results_dir.join(SUMMARY_FILE)).unwrap(),
    )
    .unwrap();
    assert_eq!(json["n_matched_subjects"], 1);
    assert_eq!(json["result_sets"][1]["n_genes_ranked"], 2);
}

#[test]
fn test_aggregation_reports_anomalies() {
    let dir = make_temp_dir();
    let (layout, gene_map) = cohort(&dir);
    fs::create_dir_all(&layout.pairwise_dir).unwrap();
    let pw = &layout.pairwise_dir;
    write_result(pw, "D.01.tsv", &[("g1", 1.0, 0.0001)]);
    write_result(pw, "D.02.tsv", &[("g1", 1.0, 0.0001)]);

    let summary = run_aggregation(&params(&layout, &gene_map), 0).unwrap();
    assert_eq!(summary.n_matched_subjects, 0);
    assert_eq!(summary.n_unmatched_files, 2);
    assert_eq!(summary.classification_anomalies, vec!["D: D.01.tsv,D.02.tsv"]);
    assert_eq!(summary.result_sets[0].n_files, 0);
    assert_eq!(summary.result_sets[0].n_genes_ranked, 0);
}

#[test]
fn test_missing_gene_map_fails_before_moving_files() {
    let dir = make_temp_dir();
    let (layout, _) = cohort(&dir);
    fs::create_dir_all(&layout.pairwise_dir).unwrap();
    write_result(&layout.pairwise_dir, "B.01.tsv", &[("g1", 1.0, 0.0001)]);

    let missing = dir.join("no_such_attrs.tsv");
    let err = run_aggregation(&params(&layout, &missing), 0).unwrap_err();
    assert!(matches!(err, PipelineError::MissingInput(_)));
    assert!(layout.pairwise_dir.join("B.01.tsv").exists());
    assert!(!layout.results_dir.join("unmatched_results-ranked.tsv").exists());
}

struct WritingExecutor {
    out_dir: PathBuf,
    fail: Option<&'static str>,
}

impl JobExecutor for WritingExecutor {
    fn execute(&self, unit: &str) -> Result<()> {
        if self.fail == Some(unit) {
            return Err(PipelineError::InvalidInput(format!("DE failed for {unit}")));
        }
        let text = format!("{HEADER}g1\t1.5\t5\t0.0001\ng2\t-1\t5\t0.2\n");
        fs::write(self.out_dir.join(format!("{unit}.tsv")), text)?;
        Ok(())
    }
}

fn gencode(dir: &Path) -> PathBuf {
    let path = dir.join("gencode.gtf");
    fs::write(
        &path,
        "chr1\tHAVANA\tgene\t1\t10\t.\t+\t.\tgene_id \"ENSG1\"; gene_type \"protein_coding\";\n",
    )
    .unwrap();
    path
}

#[test]
fn test_pipeline_runs_units_then_aggregates() {
    let dir = make_temp_dir();
    let (layout, gene_map) = cohort(&dir);
    let gtf = gencode(&dir);
    let executor = WritingExecutor {
        out_dir: layout.pairwise_dir.clone(),
        fail: None,
    };
    let run = RunParams {
        aggregate: params(&layout, &gene_map),
        gencode: &gtf,
        unit_marker: "TCGA",
        cores: 2,
    };

    let summary = run_pipeline(&run, &executor).unwrap();
    assert_eq!(summary.n_units_run, 2);
    assert_eq!(summary.n_matched_subjects, 1);
    // g1 is significant in the normal sample, so only g2 survives masking.
    let masked = read_ranked_table(&layout.ranked_path(&layout.masked_dir)).unwrap();
    assert_eq!(masked.len(), 1);
    assert_eq!(masked[0].gene_id, "g2");
    assert!(layout.pc_path.exists());
}

#[test]
fn test_failed_unit_aborts_before_ranking() {
    let dir = make_temp_dir();
    let (layout, gene_map) = cohort(&dir);
    let gtf = gencode(&dir);
    let executor = WritingExecutor {
        out_dir: layout.pairwise_dir.clone(),
        fail: Some("TCGA.AA.0001.11"),
    };
    let run = RunParams {
        aggregate: params(&layout, &gene_map),
        gencode: &gtf,
        unit_marker: "TCGA",
        cores: 1,
    };

    let err = run_pipeline(&run, &executor).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidInput(_)));
    assert!(!layout.results_dir.exists());
    assert!(!layout.ranked_path(&layout.masked_dir).exists());
    assert!(!layout.ranked_path(&layout.unmatched_dir).exists());
}
