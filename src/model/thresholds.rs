pub const SIGNIFICANCE_P: f64 = 0.001;

pub const MIN_REPRESENTATION: f64 = 0.90;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdProfile {
    pub mask_p: f64,
    pub rank_p: f64,
    pub min_representation: f64,
}

impl ThresholdProfile {
    pub fn default_v1() -> Self {
        Self {
            mask_p: SIGNIFICANCE_P,
            rank_p: SIGNIFICANCE_P,
            min_representation: MIN_REPRESENTATION,
        }
    }

    pub fn is_significant(p: f64, cutoff: f64) -> bool {
        // NaN compares false, so NA p-values never count.
        p < cutoff
    }

    pub fn min_observations(&self, n_files: usize) -> usize {
        (n_files as f64 * self.min_representation).floor() as usize
    }
}

impl Default for ThresholdProfile {
    fn default() -> Self {
        Self::default_v1()
    }
}
