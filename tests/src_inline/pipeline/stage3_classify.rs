use std::path::PathBuf;

use super::*;

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_matched_and_unmatched_partition() {
    let files = names(&["A.01.tsv", "A.11.tsv", "B.01.tsv", "C.11.tsv"]);
    let c = classify_result_files(&files);
    assert_eq!(
        c.matched_subjects.iter().cloned().collect::<Vec<_>>(),
        vec!["A".to_string()]
    );
    assert_eq!(c.matched_files, names(&["A.01.tsv", "A.11.tsv"]));
    assert_eq!(c.unmatched_files, names(&["B.01.tsv", "C.11.tsv"]));
    assert!(c.anomalies.is_empty());
    assert_eq!(c.n_files(), 4);
}

#[test]
fn test_tcga_style_subject_ids() {
    let files = names(&["TCGA.AB.0001.01.tsv", "TCGA.AB.0001.11.tsv", "TCGA.AB.0002.01.tsv"]);
    let c = classify_result_files(&files);
    assert!(c.matched_subjects.contains("TCGA.AB.0001"));
    assert_eq!(c.unmatched_files, names(&["TCGA.AB.0002.01.tsv"]));
}

#[test]
fn test_two_files_of_other_types_are_not_matched() {
    // Same subject, two files, but not one of each of 01/11.
    let files = names(&["D.01.tsv", "D.02.tsv"]);
    let c = classify_result_files(&files);
    assert!(c.matched_subjects.is_empty());
    assert_eq!(c.unmatched_files, files);
    assert_eq!(
        c.anomalies,
        vec![ClassificationAnomaly::TypeMismatch {
            subject: "D".to_string(),
            files: names(&["D.01.tsv", "D.02.tsv"]),
        }]
    );
}

#[test]
fn test_more_than_two_files_excluded_once() {
    let files = names(&["E.01.tsv", "E.06.tsv", "E.11.tsv", "F.01.tsv", "F.11.tsv"]);
    let c = classify_result_files(&files);
    assert_eq!(
        c.matched_subjects.iter().cloned().collect::<Vec<_>>(),
        vec!["F".to_string()]
    );
    assert_eq!(c.unmatched_files, names(&["E.01.tsv", "E.06.tsv", "E.11.tsv"]));
    assert_eq!(c.n_files(), files.len());
    assert_eq!(
        c.anomalies,
        vec![ClassificationAnomaly::Multiplicity {
            subject: "E".to_string(),
            files: 3,
        }]
    );
}

#[test]
fn test_short_names_are_unmatched() {
    let files = names(&["x.tsv", "G.01.tsv"]);
    let c = classify_result_files(&files);
    assert!(c.matched_subjects.is_empty());
    assert_eq!(c.unmatched_files, names(&["G.01.tsv", "x.tsv"]));
}

#[test]
fn test_relocation_plan_targets() {
    let files = names(&["A.01.tsv", "A.11.tsv", "B.01.tsv"]);
    let c = classify_result_files(&files);
    let plan = c.relocation_plan(
        Path::new("/p"),
        Path::new("/p/matched_results"),
        Path::new("/p/unmatched_results"),
    );
    assert_eq!(plan.len(), 3);
    assert!(plan.contains(&Relocation {
        from: PathBuf::from("/p/B.01.tsv"),
        to: PathBuf::from("/p/unmatched_results/B.01.tsv"),
    }));
    assert!(plan.contains(&Relocation {
        from: PathBuf::from("/p/A.11.tsv"),
        to: PathBuf::from("/p/matched_results/A.11.tsv"),
    }));
}

#[test]
fn test_apply_relocations_moves_files() {
    let dir = std::env::temp_dir().join(format!(
        "kira_pairwisede_classify_{}",
        std::process::id()
    ));
    let dest = dir.join("unmatched_results");
    fs::create_dir_all(&dest).unwrap();
    fs::write(dir.join("B.01.tsv"), "x").unwrap();

    apply_relocations(&[Relocation {
        from: dir.join("B.01.tsv"),
        to: dest.join("B.01.tsv"),
    }])
    .unwrap();
    assert!(!dir.join("B.01.tsv").exists());
    assert_eq!(fs::read_to_string(dest.join("B.01.tsv")).unwrap(), "x");
}
