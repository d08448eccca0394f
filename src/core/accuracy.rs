use crate::domain::model::{GeocodeResult, MatchKind};
use std::fmt;

/// Match-type tally of a geocoded sample.
#[derive(Debug, Clone, PartialEq)]
pub struct AccuracyReport {
    pub sample_size: usize,
    pub exact: usize,
    pub non_exact: usize,
    pub no_match: usize,
    pub overall_match_percent: f64,
}

impl AccuracyReport {
    pub fn from_results(results: &[GeocodeResult]) -> Self {
        let mut exact = 0;
        let mut non_exact = 0;
        let mut no_match = 0;
        for result in results {
            match result.match_kind() {
                MatchKind::Exact => exact += 1,
                MatchKind::NonExact => non_exact += 1,
                MatchKind::Missing => no_match += 1,
                MatchKind::Other => {}
            }
        }

        let sample_size = results.len();
        let overall_match_percent = if sample_size == 0 {
            0.0
        } else {
            let percent = (exact + non_exact) as f64 / sample_size as f64 * 100.0;
            (percent * 100.0).round() / 100.0
        };

        Self {
            sample_size,
            exact,
            non_exact,
            no_match,
            overall_match_percent,
        }
    }
}

impl fmt::Display for AccuracyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Debug keeps the decimal point on whole percents: 90.0, not 90.
        writeln!(f, "Overall Match Percent = {:?}", self.overall_match_percent)?;
        writeln!(f, "Exact Matches = {}", self.exact)?;
        writeln!(f, "Non Exact Matches = {}", self.non_exact)?;
        write!(f, "No Matches = {}", self.no_match)
    }
}
