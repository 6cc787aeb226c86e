use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{PipelineError, Result};
use crate::model::records::{RANKED_COLUMNS, RankedGeneRecord};
use crate::report::format_f64;

pub fn write_ranked_table(path: &Path, ranked: &[RankedGeneRecord]) -> Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    writeln!(w, "{}", RANKED_COLUMNS.join("\t"))?;
    for r in ranked {
        let row = [
            r.gene_id.clone(),
            format_f64(r.pval_median),
            r.pval_below_threshold_count.to_string(),
            format_f64(r.pval_std),
            format_f64(r.fc_median),
            format_f64(r.fc_std),
            format_f64(r.cpm_median),
            format_f64(r.cpm_std),
            r.num_samples.to_string(),
            r.gene_name.clone(),
        ]
        .join("\t");
        writeln!(w, "{row}")?;
    }
    w.flush()?;
    Ok(())
}

pub fn read_ranked_table(path: &Path) -> Result<Vec<RankedGeneRecord>> {
    let reader = BufReader::new(File::open(path).map_err(|e| {
        PipelineError::MissingInput(format!("cannot open {}: {e}", path.display()))
    })?);
    let mut lines = reader.lines();

    let header = lines
        .next()
        .transpose()?
        .ok_or_else(|| PipelineError::Parse(format!("{} is empty", path.display())))?;
    let cols: Vec<&str> = header.split('\t').collect();
    if cols != RANKED_COLUMNS {
        return Err(PipelineError::Parse(format!(
            "{} does not have a ranked table header",
            path.display()
        )));
    }

    let mut out = Vec::new();
    for (i, line) in lines.enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let line_no = i + 2;
        let f: Vec<&str> = line.split('\t').collect();
        if f.len() != RANKED_COLUMNS.len() {
            return Err(PipelineError::Parse(format!(
                "{} line {}: expected {} fields, found {}",
                path.display(),
                line_no,
                RANKED_COLUMNS.len(),
                f.len()
            )));
        }
        let float = |s: &str| parse_f64(s, path, line_no);
        let count = |s: &str| {
            s.parse::<usize>().map_err(|_| {
                PipelineError::Parse(format!(
                    "{} line {}: invalid count {:?}",
                    path.display(),
                    line_no,
                    s
                ))
            })
        };
        out.push(RankedGeneRecord {
            gene_id: f[0].to_string(),
            pval_median: float(f[1])?,
            pval_below_threshold_count: count(f[2])?,
            pval_std: float(f[3])?,
            fc_median: float(f[4])?,
            fc_std: float(f[5])?,
            cpm_median: float(f[6])?,
            cpm_std: float(f[7])?,
            num_samples: count(f[8])?,
            gene_name: f[9].to_string(),
        });
    }
    Ok(out)
}

fn parse_f64(s: &str, path: &Path, line_no: usize) -> Result<f64> {
    if s == "NA" {
        return Ok(f64::NAN);
    }
    s.parse::<f64>().map_err(|_| {
        PipelineError::Parse(format!(
            "{} line {}: invalid number {:?}",
            path.display(),
            line_no,
            s
        ))
    })
}

pub fn render_top(ranked: &[RankedGeneRecord], n: usize) -> String {
    let mut out = String::new();
    out.push_str("rank\tgene_name\tgene_id\tpval_counts\tnum_samples\tpval_median\tfc_median\n");
    for (i, r) in ranked.iter().take(n).enumerate() {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{:.6}\t{:.6}\n",
            i + 1,
            r.gene_name,
            r.gene_id,
            r.pval_below_threshold_count,
            r.num_samples,
            r.pval_median,
            r.fc_median
        ));
    }
    out
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage7_report.rs"]
mod tests;
