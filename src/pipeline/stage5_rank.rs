use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;
use crate::input::list_result_files;
use crate::input::result_table::read_result_table;
use crate::model::records::{RankedGeneRecord, ResultRecord};
use crate::model::thresholds::ThresholdProfile;
use crate::report::{count_below, median, std_dev};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneSeries {
    pub gene_id: String,
    pub p_values: Vec<f64>,
    pub fold_changes: Vec<f64>,
    pub log_cpms: Vec<f64>,
}

impl GeneSeries {
    fn len(&self) -> usize {
        self.p_values.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct GeneStatAccumulator {
    index: HashMap<String, usize>,
    genes: Vec<GeneSeries>,
    n_files: usize,
}

impl GeneStatAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file<'a, I>(&mut self, records: I)
    where
        I: IntoIterator<Item = &'a ResultRecord>,
    {
        self.n_files += 1;
        for record in records {
            let slot = match self.index.get(&record.gene_id) {
                Some(&slot) => slot,
                None => {
                    let slot = self.genes.len();
                    self.index.insert(record.gene_id.clone(), slot);
                    self.genes.push(GeneSeries {
                        gene_id: record.gene_id.clone(),
                        ..GeneSeries::default()
                    });
                    slot
                }
            };
            let series = &mut self.genes[slot];
            series.p_values.push(record.p_value);
            series.fold_changes.push(record.log_fc);
            series.log_cpms.push(record.log_cpm);
        }
    }

    pub fn n_files(&self) -> usize {
        self.n_files
    }

    pub fn n_genes(&self) -> usize {
        self.genes.len()
    }

    #[cfg(test)]
    pub fn series(&self, gene_id: &str) -> Option<&GeneSeries> {
        self.index.get(gene_id).map(|&slot| &self.genes[slot])
    }

    pub fn drop_underrepresented(&mut self, thresholds: &ThresholdProfile) -> usize {
        let min_obs = thresholds.min_observations(self.n_files);
        let before = self.genes.len();
        self.genes.retain(|g| {
            let keep = g.len() >= min_obs;
            if !keep {
                crate::debug!("removing underrepresented gene: {}", g.gene_id);
            }
            keep
        });
        self.index = self
            .genes
            .iter()
            .enumerate()
            .map(|(slot, g)| (g.gene_id.clone(), slot))
            .collect();
        before - self.genes.len()
    }

    /// Summarizes every gene and orders by significant-p count, descending.
    /// Ties keep first-seen order.
    pub fn into_ranked(self, thresholds: &ThresholdProfile) -> Vec<RankedGeneRecord> {
        let mut ranked: Vec<RankedGeneRecord> = self
            .genes
            .into_iter()
            .map(|g| RankedGeneRecord {
                pval_median: median(&g.p_values),
                pval_below_threshold_count: count_below(&g.p_values, thresholds.rank_p),
                pval_std: std_dev(&g.p_values),
                fc_median: median(&g.fold_changes),
                fc_std: std_dev(&g.fold_changes),
                cpm_median: median(&g.log_cpms),
                cpm_std: std_dev(&g.log_cpms),
                num_samples: g.len(),
                gene_name: g.gene_id.clone(),
                gene_id: g.gene_id,
            })
            .collect();
        sort_ranked(&mut ranked);
        ranked
    }
}

pub fn sort_ranked(ranked: &mut [RankedGeneRecord]) {
    ranked.sort_by(|a, b| b.pval_below_threshold_count.cmp(&a.pval_below_threshold_count));
}

#[derive(Debug, Clone)]
pub struct Stage5Output {
    pub ranked: Vec<RankedGeneRecord>,
    pub n_files: usize,
    pub n_dropped: usize,
}

pub fn run_stage5(
    dir: &Path,
    thresholds: &ThresholdProfile,
    drop_underrepresented: bool,
) -> Result<Stage5Output> {
    crate::info!("reading in ranked tables from: {}", dir.display());
    let files = list_result_files(dir)?;
    let mut acc = GeneStatAccumulator::new();
    for name in &files {
        crate::debug!("ranking: {name}");
        let table = read_result_table(&dir.join(name))?;
        acc.add_file(table.records());
    }

    let n_dropped = if drop_underrepresented {
        let n = acc.drop_underrepresented(thresholds);
        crate::info!("dropped {n} underrepresented genes");
        n
    } else {
        0
    };

    crate::info!(
        "ranking {} genes from {} files by pval < {}",
        acc.n_genes(),
        acc.n_files(),
        thresholds.rank_p
    );
    let n_files = acc.n_files();
    Ok(Stage5Output {
        ranked: acc.into_ranked(thresholds),
        n_files,
        n_dropped,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_rank.rs"]
mod tests;
