use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use crate::error::{PipelineError, Result};
use crate::input::open_maybe_gz;

pub const GENE_ID_COL: &str = "geneId";
pub const GENE_NAME_COL: &str = "geneName";

#[derive(Debug, Clone, Default)]
pub struct GeneNameMap {
    names: HashMap<String, String>,
}

impl GeneNameMap {
    #[cfg(test)]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            names: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, gene_id: &str) -> Option<&str> {
        self.names.get(gene_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

pub fn load_gene_map(path: &Path) -> Result<GeneNameMap> {
    let mut reader = open_maybe_gz(path)?;
    let mut buf = String::new();

    let read = reader.read_line(&mut buf)?;
    if read == 0 {
        return Err(PipelineError::Parse(format!(
            "gene map {} is empty",
            path.display()
        )));
    }
    let header: Vec<String> = buf
        .trim_end_matches(['\r', '\n'])
        .split('\t')
        .map(|s| s.trim().to_string())
        .collect();
    let find = |name: &str| {
        header.iter().position(|h| h == name).ok_or_else(|| {
            PipelineError::Parse(format!(
                "gene map {} is missing column {}",
                path.display(),
                name
            ))
        })
    };
    let id_col = find(GENE_ID_COL)?;
    let name_col = find(GENE_NAME_COL)?;

    let mut names = HashMap::new();
    loop {
        buf.clear();
        let read = reader.read_line(&mut buf)?;
        if read == 0 {
            break;
        }
        let line = buf.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            continue;
        }
        let cols: Vec<&str> = line.split('\t').collect();
        let (Some(id), Some(name)) = (cols.get(id_col), cols.get(name_col)) else {
            continue;
        };
        // Later rows win for a repeated id.
        names.insert(id.trim().to_string(), name.trim().to_string());
    }

    crate::debug!("loaded {} gene names from {}", names.len(), path.display());
    Ok(GeneNameMap { names })
}
