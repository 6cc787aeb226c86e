use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::input::CohortLayout;
use crate::model::records::{SampleType, subject_id};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationAnomaly {
    Multiplicity { subject: String, files: usize },
    TypeMismatch { subject: String, files: Vec<String> },
}

impl ClassificationAnomaly {
    pub fn describe(&self) -> String {
        match self {
            ClassificationAnomaly::Multiplicity { subject, files } => {
                format!("{subject}: {files} result files")
            }
            ClassificationAnomaly::TypeMismatch { subject, files } => {
                format!("{subject}: {}", files.join(","))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub from: PathBuf,
    pub to: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub matched_subjects: BTreeSet<String>,
    pub matched_files: Vec<String>,
    pub unmatched_files: Vec<String>,
    pub anomalies: Vec<ClassificationAnomaly>,
}

impl Classification {
    pub fn n_files(&self) -> usize {
        self.matched_files.len() + self.unmatched_files.len()
    }

    pub fn relocation_plan(
        &self,
        source_dir: &Path,
        matched_dir: &Path,
        unmatched_dir: &Path,
    ) -> Vec<Relocation> {
        let matched = self.matched_files.iter().map(|f| (f, matched_dir));
        let unmatched = self.unmatched_files.iter().map(|f| (f, unmatched_dir));
        unmatched
            .chain(matched)
            .map(|(name, dest)| Relocation {
                from: source_dir.join(name),
                to: dest.join(name),
            })
            .collect()
    }
}

pub fn classify_result_files(files: &[String]) -> Classification {
    let mut by_subject: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    let mut unparsed = Vec::new();
    for name in files {
        match subject_id(name) {
            Some(subject) => by_subject.entry(subject).or_default().push(name.as_str()),
            None => unparsed.push(name.clone()),
        }
    }

    let mut out = Classification::default();
    out.unmatched_files.extend(unparsed);

    for (subject, names) in by_subject {
        if names.len() == 2 {
            let normal = SampleType::Normal.file_name(subject);
            let tumor = SampleType::Tumor.file_name(subject);
            if names.contains(&normal.as_str()) && names.contains(&tumor.as_str()) {
                out.matched_subjects.insert(subject.to_string());
                out.matched_files.push(normal);
                out.matched_files.push(tumor);
                continue;
            }
            out.anomalies.push(ClassificationAnomaly::TypeMismatch {
                subject: subject.to_string(),
                files: names.iter().map(|s| s.to_string()).collect(),
            });
        } else if names.len() > 2 {
            out.anomalies.push(ClassificationAnomaly::Multiplicity {
                subject: subject.to_string(),
                files: names.len(),
            });
        }
        out.unmatched_files
            .extend(names.iter().map(|s| s.to_string()));
    }

    out.matched_files.sort();
    out.unmatched_files.sort();
    out
}

pub fn run_stage3(layout: &CohortLayout, files: &[String]) -> Classification {
    let classification = classify_result_files(files);
    crate::info!(
        "classified {} result files: {} matched subjects, {} unmatched files",
        classification.n_files(),
        classification.matched_subjects.len(),
        classification.unmatched_files.len()
    );
    for anomaly in &classification.anomalies {
        crate::warn!(
            "subject excluded from matching in {}: {}",
            layout.pairwise_dir.display(),
            anomaly.describe()
        );
    }
    classification
}

pub fn apply_relocations(plan: &[Relocation]) -> Result<()> {
    for step in plan {
        crate::debug!("moving {} -> {}", step.from.display(), step.to.display());
        move_file(&step.from, &step.to)?;
    }
    Ok(())
}

fn move_file(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    // rename fails across filesystems
    fs::copy(from, to)?;
    fs::remove_file(from)?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_classify.rs"]
mod tests;
