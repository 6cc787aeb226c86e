use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};
use crate::input::CohortLayout;
use crate::input::gencode::protein_coding_genes;
use crate::input::tissue_table::{read_unit_ids, write_filtered_table};

#[derive(Debug, Clone)]
pub struct Stage1Params<'a> {
    pub layout: &'a CohortLayout,
    pub gencode: &'a Path,
    pub unit_marker: &'a str,
}

#[derive(Debug, Clone)]
pub struct Stage1Output {
    pub units: Vec<String>,
    pub expression_table: PathBuf,
}

pub fn run_stage1(params: &Stage1Params<'_>) -> Result<Stage1Output> {
    let layout = params.layout;
    crate::info!("reading expression table {}", layout.tissue_df.display());
    let units = read_unit_ids(&layout.tissue_df, params.unit_marker)?;
    if units.is_empty() {
        return Err(PipelineError::InvalidInput(format!(
            "no sample columns containing {:?} in {}",
            params.unit_marker,
            layout.tissue_df.display()
        )));
    }
    layout.ensure_job_dirs()?;

    if layout.pc_path.exists() {
        crate::info!(
            "reusing protein coding table {}",
            layout.pc_path.display()
        );
    } else {
        crate::info!("creating table with non-protein coding genes removed");
        let keep = protein_coding_genes(params.gencode)?;
        let stats = write_filtered_table(&layout.tissue_df, &layout.pc_path, &keep)?;
        crate::info!(
            "kept {} of {} genes in {}",
            stats.rows_kept,
            stats.rows_in,
            layout.pc_path.display()
        );
    }

    Ok(Stage1Output {
        units,
        expression_table: layout.pc_path.clone(),
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_prepare.rs"]
mod tests;
