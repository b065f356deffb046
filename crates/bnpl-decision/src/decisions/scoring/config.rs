use serde::{Deserialize, Serialize};

/// Threshold tables for the scoring rubric, modeled as immutable data so the
/// engine carries no hidden shared state.
///
/// Each band is an inclusive lower bound paired with a point contribution;
/// bands are scanned highest-first. `Default` encodes the production tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Average daily balance bands in dollars (0-30 points).
    pub balance_bands: Vec<(f64, i64)>,
    pub balance_negative_points: i64,
    /// Income-to-spending ratio bands (0-30 points).
    pub income_ratio_bands: Vec<(f64, i64)>,
    /// NSF counts paired with points, highest count first (0-25 points).
    pub nsf_bands: Vec<(u32, i64)>,
    pub nsf_clean_points: i64,
    /// Income regularity bands (0-15 points).
    pub regularity_bands: Vec<(f64, i64)>,
    /// Thin-file penalty: transaction count lower bounds paired with the
    /// (non-positive) adjustment, highest count first.
    pub thin_file_bands: Vec<(u32, i64)>,
    pub thin_file_floor_penalty: i64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            balance_bands: vec![(1000.0, 30), (500.0, 25), (100.0, 15), (0.0, 10)],
            balance_negative_points: 0,
            income_ratio_bands: vec![(1.3, 30), (1.1, 25), (1.0, 15), (0.8, 5)],
            nsf_bands: vec![(5, 0), (3, 5), (1, 15)],
            nsf_clean_points: 25,
            regularity_bands: vec![(0.8, 15), (0.5, 10), (0.3, 5)],
            thin_file_bands: vec![(30, 0), (20, -10), (10, -20)],
            thin_file_floor_penalty: -30,
        }
    }
}
