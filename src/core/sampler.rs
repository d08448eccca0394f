use crate::domain::model::AddressRecord;
use rand::rngs::StdRng;
use rand::SeedableRng;

pub const DEFAULT_SAMPLE_SEED: u64 = 133;

/// Parameters of a proportion estimate: the expected proportion `p` and the
/// bound `B` on the error of estimation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleParams {
    pub proportion: f64,
    pub bound: f64,
}

impl Default for SampleParams {
    fn default() -> Self {
        Self {
            proportion: 0.5,
            bound: 0.02,
        }
    }
}

/// Minimum sample size for estimating a proportion over a finite population:
/// `n = ceil(N·p·q / ((N-1)·D + p·q))` with `D = B²/4` and `q = 1-p`.
pub fn prop_sample_size(population: usize, params: SampleParams) -> usize {
    if population == 0 {
        return 0;
    }

    let n = population as f64;
    let p = params.proportion;
    let q = 1.0 - p;
    let d = params.bound.powi(2) / 4.0;
    let size = ((n * p * q) / ((n - 1.0) * d + p * q)).ceil() as usize;

    size.clamp(1, population)
}

/// Draws `size` distinct rows uniformly at random; reproducible for a given seed.
pub fn draw_sample(table: &[AddressRecord], size: usize, seed: u64) -> Vec<AddressRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let amount = size.min(table.len());

    rand::seq::index::sample(&mut rng, table.len(), amount)
        .into_iter()
        .map(|i| table[i].clone())
        .collect()
}
