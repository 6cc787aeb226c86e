use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

use crate::error::{PipelineError, Result};
use crate::input::open_maybe_gz;

pub const DEFAULT_UNIT_MARKER: &str = "TCGA";

pub fn read_unit_ids(path: &Path, marker: &str) -> Result<Vec<String>> {
    let mut reader = open_maybe_gz(path)?;
    let mut header = String::new();
    if reader.read_line(&mut header)? == 0 {
        return Err(PipelineError::Parse(format!(
            "expression table {} is empty",
            path.display()
        )));
    }
    let units: Vec<String> = header
        .trim_end_matches(['\r', '\n'])
        .split('\t')
        .skip(1)
        .filter(|name| name.contains(marker))
        .map(|name| name.trim().replace('-', "."))
        .collect();
    Ok(units)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterStats {
    pub rows_in: usize,
    pub rows_kept: usize,
}

pub fn write_filtered_table(
    input: &Path,
    output: &Path,
    keep: &HashSet<String>,
) -> Result<FilterStats> {
    let mut reader = open_maybe_gz(input)?;
    let mut w = BufWriter::new(File::create(output)?);
    let mut buf = String::new();

    if reader.read_line(&mut buf)? == 0 {
        return Err(PipelineError::Parse(format!(
            "expression table {} is empty",
            input.display()
        )));
    }
    writeln!(w, "{}", buf.trim_end_matches(['\r', '\n']))?;

    let mut stats = FilterStats {
        rows_in: 0,
        rows_kept: 0,
    };
    loop {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        let line = buf.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            continue;
        }
        stats.rows_in += 1;
        let gene_id = line.split('\t').next().unwrap_or("").trim();
        if keep.contains(gene_id) {
            writeln!(w, "{line}")?;
            stats.rows_kept += 1;
        }
    }
    w.flush()?;
    Ok(stats)
}
