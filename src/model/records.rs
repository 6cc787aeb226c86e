pub const RESULT_EXT: &str = ".tsv";

pub const TYPE_SUFFIX_LEN: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SampleType {
    Tumor,
    Normal,
}

impl SampleType {
    pub fn code(self) -> &'static str {
        match self {
            SampleType::Tumor => "01",
            SampleType::Normal => "11",
        }
    }

    pub fn file_name(self, subject_id: &str) -> String {
        format!("{}.{}{}", subject_id, self.code(), RESULT_EXT)
    }
}

pub fn subject_id(file_name: &str) -> Option<&str> {
    if !file_name.ends_with(RESULT_EXT) || file_name.len() < TYPE_SUFFIX_LEN {
        return None;
    }
    let cut = file_name.len() - TYPE_SUFFIX_LEN;
    if !file_name.is_char_boundary(cut) {
        return None;
    }
    Some(&file_name[..cut])
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    pub gene_id: String,
    pub p_value: f64,
    pub log_fc: f64,
    pub log_cpm: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedGeneRecord {
    pub gene_id: String,
    pub pval_median: f64,
    pub pval_below_threshold_count: usize,
    pub pval_std: f64,
    pub fc_median: f64,
    pub fc_std: f64,
    pub cpm_median: f64,
    pub cpm_std: f64,
    pub num_samples: usize,
    pub gene_name: String,
}

pub const RANKED_COLUMNS: [&str; 10] = [
    "gene_id",
    "pval_median",
    "pval_below_threshold_count",
    "pval_std",
    "fc_median",
    "fc_std",
    "cpm_median",
    "cpm_std",
    "num_samples",
    "gene_name",
];
