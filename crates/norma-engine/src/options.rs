use serde::{Deserialize, Serialize};

/// Default cap on models selected by an unpartitioned team query.
pub const DEFAULT_MAX_TEAM_MATCHES: usize = 100_000;

/// Tunables shared by the analysis entry points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Stop collecting matches for an unpartitioned query after this many models.
    pub max_team_matches: usize,
    /// Number of attack targets kept in a strategy report.
    pub top_attack_targets: usize,
    /// Number of own vulnerabilities kept in a strategy report.
    pub top_vulnerabilities: usize,
    /// Number of entries in a vulnerability scan.
    pub vulnerability_scan_size: usize,
    /// Number of sample models attached to reports.
    pub sample_size: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            max_team_matches: DEFAULT_MAX_TEAM_MATCHES,
            top_attack_targets: 5,
            top_vulnerabilities: 3,
            vulnerability_scan_size: 5,
            sample_size: 5,
        }
    }
}
