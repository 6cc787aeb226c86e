use crate::input::gene_map::GeneNameMap;
use crate::model::records::RankedGeneRecord;

pub fn add_mapped_genes(ranked: &mut [RankedGeneRecord], map: &GeneNameMap) -> usize {
    let mut misses = 0usize;
    for record in ranked.iter_mut() {
        match map.get(&record.gene_id) {
            Some(name) => record.gene_name = name.to_string(),
            None => {
                misses += 1;
                record.gene_name = record.gene_id.clone();
            }
        }
    }
    misses
}

pub fn run_stage6(ranked: &mut [RankedGeneRecord], map: &GeneNameMap) -> usize {
    crate::info!("adding mapped genes");
    let misses = add_mapped_genes(ranked, map);
    if misses > 0 {
        crate::debug!("{misses} gene ids have no mapped name");
    }
    misses
}
