use std::collections::HashSet;
use std::io::BufRead;
use std::path::Path;

use crate::error::{PipelineError, Result};
use crate::input::open_maybe_gz;

const PROTEIN_CODING: &str = "\"protein_coding\";";

pub fn protein_coding_genes(gtf_path: &Path) -> Result<HashSet<String>> {
    let mut reader = open_maybe_gz(gtf_path)?;
    let mut buf = String::new();
    let mut genes = HashSet::new();

    loop {
        buf.clear();
        let read = reader.read_line(&mut buf)?;
        if read == 0 {
            break;
        }
        if buf.starts_with('#') {
            continue;
        }
        if let Some(gene_id) = protein_coding_gene_id(&buf) {
            genes.insert(gene_id.to_string());
        }
    }

    if genes.is_empty() {
        return Err(PipelineError::InvalidInput(format!(
            "no protein coding genes found in {}",
            gtf_path.display()
        )));
    }
    Ok(genes)
}

fn protein_coding_gene_id(line: &str) -> Option<&str> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let attr = |key: &str| {
        tokens
            .iter()
            .position(|&t| t == key)
            .and_then(|i| tokens.get(i + 1).copied())
    };
    if attr("gene_type")? != PROTEIN_CODING {
        return None;
    }
    attr("gene_id")?.split('"').nth(1)
}
