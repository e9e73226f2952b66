use crate::common::Hsp;
use crate::config::Thresholds;

/// Why an HSP was left out of the reports. Checks run in this order and the
/// first failing one is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    EValue,
    Identity,
    Coverage,
}

/// Percentages computed while filtering, reused by both reports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HspMetrics {
    pub identity_percent: f64,
    pub query_coverage_percent: f64,
}

/// E-value is an inclusive upper bound.
pub fn passes_evalue(hsp: &Hsp, max_evalue: f64) -> bool {
    hsp.expect_value <= max_evalue
}

/// Identity is an inclusive lower bound.
pub fn passes_identity(identity_percent: f64, min_identity: f64) -> bool {
    identity_percent >= min_identity
}

/// Query coverage is an inclusive lower bound.
pub fn passes_coverage(coverage_percent: f64, min_coverage: f64) -> bool {
    coverage_percent >= min_coverage
}

/// Apply the per-HSP thresholds.
pub fn assess_hsp(
    hsp: &Hsp,
    query_length: u64,
    thresholds: &Thresholds,
) -> Result<HspMetrics, Rejection> {
    if !passes_evalue(hsp, thresholds.max_evalue) {
        return Err(Rejection::EValue);
    }

    let identity_percent = hsp.identity_percent();
    if !passes_identity(identity_percent, thresholds.min_identity_percent) {
        return Err(Rejection::Identity);
    }

    let query_coverage_percent = hsp.query_coverage_percent(query_length);
    if !passes_coverage(query_coverage_percent, thresholds.min_query_coverage_percent) {
        return Err(Rejection::Coverage);
    }

    Ok(HspMetrics {
        identity_percent,
        query_coverage_percent,
    })
}
