//! Per-record ranking and HSP selection.
//!
//! Hits are re-sorted by their best HSP score, ranked from 1, and every HSP of
//! a ranked hit is run through the thresholds. The resulting [`Selection`] is
//! the single sequence both report writers consume, which is what keeps the
//! table and the alignment report in step.

use crate::common::{Alignment, Hsp, SearchRecord};
use crate::config::Thresholds;

use super::filter::{assess_hsp, Rejection};

/// One HSP that passed every threshold, with the context the reports need.
#[derive(Debug, Clone, Copy)]
pub struct RankedHsp<'a> {
    pub record: &'a SearchRecord,
    pub alignment: &'a Alignment,
    pub hsp: &'a Hsp,
    pub rank: usize,
    pub identity_percent: f64,
    pub query_coverage_percent: f64,
}

/// Counters for one or more records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionStats {
    /// Hits that were given a rank
    pub alignments_ranked: usize,
    pub skipped_by_rank: usize,
    pub skipped_by_hsp_count: usize,
    pub rejected_evalue: usize,
    pub rejected_identity: usize,
    pub rejected_coverage: usize,
    pub hsps_selected: usize,
}

impl SelectionStats {
    fn reject(&mut self, reason: Rejection) {
        match reason {
            Rejection::EValue => self.rejected_evalue += 1,
            Rejection::Identity => self.rejected_identity += 1,
            Rejection::Coverage => self.rejected_coverage += 1,
        }
    }

    pub fn hsps_rejected(&self) -> usize {
        self.rejected_evalue + self.rejected_identity + self.rejected_coverage
    }

    pub fn merge(&mut self, other: &SelectionStats) {
        self.alignments_ranked += other.alignments_ranked;
        self.skipped_by_rank += other.skipped_by_rank;
        self.skipped_by_hsp_count += other.skipped_by_hsp_count;
        self.rejected_evalue += other.rejected_evalue;
        self.rejected_identity += other.rejected_identity;
        self.rejected_coverage += other.rejected_coverage;
        self.hsps_selected += other.hsps_selected;
    }
}

/// Selected HSPs of one record, in output order.
#[derive(Debug, Clone, Default)]
pub struct Selection<'a> {
    pub hsps: Vec<RankedHsp<'a>>,
    pub stats: SelectionStats,
}

/// Rank the hits of `record` and keep the HSPs that pass `thresholds`.
///
/// Rank only advances for hits that are actually ranked: a hit skipped for
/// exceeding `max_rank` or for having more than `max_hsp_per_hit` HSPs does
/// not consume a rank. A ranked hit whose HSPs all fail the thresholds still
/// does, so gaps in the reported ranks are expected.
pub fn select_hsps<'a>(record: &'a SearchRecord, thresholds: &Thresholds) -> Selection<'a> {
    let mut selection = Selection::default();
    if record.alignments.is_empty() {
        return selection;
    }

    let mut rank = 1;
    for alignment in record.ranked_alignments() {
        if rank > thresholds.max_rank {
            selection.stats.skipped_by_rank += 1;
            continue;
        }
        if alignment.hsps.len() > thresholds.max_hsp_per_hit {
            selection.stats.skipped_by_hsp_count += 1;
            continue;
        }

        let this_rank = rank;
        rank += 1;
        selection.stats.alignments_ranked += 1;

        for hsp in &alignment.hsps {
            match assess_hsp(hsp, record.query_length, thresholds) {
                Ok(metrics) => {
                    selection.hsps.push(RankedHsp {
                        record,
                        alignment,
                        hsp,
                        rank: this_rank,
                        identity_percent: metrics.identity_percent,
                        query_coverage_percent: metrics.query_coverage_percent,
                    });
                }
                Err(reason) => selection.stats.reject(reason),
            }
        }
    }

    selection.stats.hsps_selected = selection.hsps.len();
    selection
}
