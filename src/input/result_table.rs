use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

use crate::error::{PipelineError, Result};
use crate::input::open_maybe_gz;
use crate::model::records::ResultRecord;

pub const PVALUE_COL: &str = "PValue";
pub const LOGFC_COL: &str = "logFC";
pub const LOGCPM_COL: &str = "logCPM";

#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub record: ResultRecord,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    pub index_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn records(&self) -> impl Iterator<Item = &ResultRecord> {
        self.rows.iter().map(|r| &r.record)
    }

    #[cfg(test)]
    pub fn gene_ids(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.record.gene_id.as_str())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn without_genes(&self, genes: &HashSet<&str>) -> ResultTable {
        ResultTable {
            index_name: self.index_name.clone(),
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|r| !genes.contains(r.record.gene_id.as_str()))
                .cloned()
                .collect(),
        }
    }
}

pub fn read_result_table(path: &Path) -> Result<ResultTable> {
    let mut reader = open_maybe_gz(path)?;
    let mut buf = String::new();

    let read = reader.read_line(&mut buf)?;
    if read == 0 {
        return Err(PipelineError::Parse(format!(
            "result table {} is empty",
            path.display()
        )));
    }
    let header: Vec<String> = buf
        .trim_end_matches(['\r', '\n'])
        .split('\t')
        .map(|s| s.trim().to_string())
        .collect();

    let mut index_name: Option<String> = None;
    let mut columns: Option<Vec<String>> = None;
    let mut positions: Option<[usize; 3]> = None;
    let mut seen: HashSet<String> = HashSet::new();
    let mut rows = Vec::new();
    let mut line_no = 1usize;

    loop {
        buf.clear();
        let read = reader.read_line(&mut buf)?;
        if read == 0 {
            break;
        }
        line_no += 1;
        let line = buf.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            continue;
        }
        let cols: Vec<&str> = line.split('\t').collect();

        if columns.is_none() {
            // R writes the header without an index cell unless col.names=NA was given.
            let (idx_name, data_cols) = if header.len() + 1 == cols.len() {
                (String::new(), header.clone())
            } else if header.len() == cols.len() {
                (header[0].clone(), header[1..].to_vec())
            } else {
                return Err(PipelineError::Parse(format!(
                    "{} line {}: {} fields, header has {}",
                    path.display(),
                    line_no,
                    cols.len(),
                    header.len()
                )));
            };
            positions = Some(locate_columns(path, &data_cols)?);
            index_name = Some(idx_name);
            columns = Some(data_cols);
        }

        let n_data = columns.as_ref().map_or(0, |c| c.len());
        if cols.len() != n_data + 1 {
            return Err(PipelineError::Parse(format!(
                "{} line {}: expected {} fields, found {}",
                path.display(),
                line_no,
                n_data + 1,
                cols.len()
            )));
        }

        let gene_id = cols[0].trim().to_string();
        if !seen.insert(gene_id.clone()) {
            return Err(PipelineError::Parse(format!(
                "{} line {}: duplicate gene id {}",
                path.display(),
                line_no,
                gene_id
            )));
        }
        let fields: Vec<String> = cols[1..].iter().map(|s| s.trim().to_string()).collect();
        let [p_pos, fc_pos, cpm_pos] = positions.unwrap_or([0, 0, 0]);
        let record = ResultRecord {
            p_value: parse_value(&fields[p_pos], path, line_no)?,
            log_fc: parse_value(&fields[fc_pos], path, line_no)?,
            log_cpm: parse_value(&fields[cpm_pos], path, line_no)?,
            gene_id,
        };
        rows.push(ResultRow { record, fields });
    }

    let (index_name, columns) = match (index_name, columns) {
        (Some(i), Some(c)) => (i, c),
        _ => {
            // Header only; a leading cell that is not a data column names the index.
            let has_index = header
                .first()
                .is_some_and(|h| ![PVALUE_COL, LOGFC_COL, LOGCPM_COL].contains(&h.as_str()));
            let (idx, data_cols) = if has_index {
                (header[0].clone(), header[1..].to_vec())
            } else {
                (String::new(), header.clone())
            };
            locate_columns(path, &data_cols)?;
            (idx, data_cols)
        }
    };

    Ok(ResultTable {
        index_name,
        columns,
        rows,
    })
}

pub fn write_result_table(path: &Path, table: &ResultTable) -> Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    writeln!(w, "{}\t{}", table.index_name, table.columns.join("\t"))?;
    for row in &table.rows {
        writeln!(w, "{}\t{}", row.record.gene_id, row.fields.join("\t"))?;
    }
    w.flush()?;
    Ok(())
}

fn locate_columns(path: &Path, columns: &[String]) -> Result<[usize; 3]> {
    let find = |name: &str| {
        columns.iter().position(|c| c == name).ok_or_else(|| {
            PipelineError::Parse(format!(
                "{} is missing required column {}",
                path.display(),
                name
            ))
        })
    };
    Ok([find(PVALUE_COL)?, find(LOGFC_COL)?, find(LOGCPM_COL)?])
}

fn parse_value(raw: &str, path: &Path, line_no: usize) -> Result<f64> {
    if raw == "NA" || raw.is_empty() {
        return Ok(f64::NAN);
    }
    raw.parse::<f64>().map_err(|_| {
        PipelineError::Parse(format!(
            "{} line {}: invalid number {:?}",
            path.display(),
            line_no,
            raw
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/result_table.rs"]
mod tests;
