//! Search result model shared by the reader, the filter and the reports.
//!
//! A [`SearchRecord`] is one `<Iteration>` of a BLAST XML document: a query and
//! every target it hit. Records are produced one at a time and dropped before
//! the next one is read, so nothing here is shared across records.

use std::cmp::Ordering;

/// Strand of one side of an HSP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strand {
    Plus,
    Minus,
}

impl Strand {
    /// BLAST reports reverse-strand matches with a negative frame.
    pub fn from_frame(frame: i32) -> Self {
        if frame < 0 {
            Strand::Minus
        } else {
            Strand::Plus
        }
    }
}

/// One high-scoring segment pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Hsp {
    /// `Hsp_num`, 1-based position within the hit
    pub num: usize,
    pub bit_score: f64,
    /// Raw score, used for ranking
    pub score: f64,
    pub expect_value: f64,
    pub identities: u64,
    pub align_length: u64,
    pub gaps: u64,
    pub query_start: u64,
    pub query_end: u64,
    pub subject_start: u64,
    pub subject_end: u64,
    /// (query, subject) strand; only nucleotide searches report one
    pub strand: Option<(Strand, Strand)>,
    pub query_line: String,
    pub match_line: String,
    pub subject_line: String,
}

impl Hsp {
    /// Percentage of aligned columns that are identical.
    ///
    /// An empty alignment yields 0 % instead of dividing by zero.
    pub fn identity_percent(&self) -> f64 {
        percent(self.identities, self.align_length)
    }

    /// Percentage of the query covered by the ungapped part of the alignment.
    ///
    /// Coverage is `(align_length - gaps) / query_length * 100`; a zero-length
    /// query yields 0 %.
    pub fn query_coverage_percent(&self, query_length: u64) -> f64 {
        percent(self.align_length.saturating_sub(self.gaps), query_length)
    }

    /// True only when both sides are on the plus strand.
    pub fn is_plus_plus(&self) -> bool {
        matches!(self.strand, Some((Strand::Plus, Strand::Plus)))
    }
}

/// `numerator / denominator * 100`, or 0 when the denominator is 0.
pub fn percent(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 * 100.0 / denominator as f64
    }
}

/// One target sequence hit by the query.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    pub hit_id: String,
    pub hit_definition: String,
    pub accession: String,
    /// Target sequence length
    pub length: u64,
    pub hsps: Vec<Hsp>,
}

impl Alignment {
    /// Highest raw HSP score of this hit.
    ///
    /// A hit without HSPs gets negative infinity and sorts after every other hit.
    pub fn best_score(&self) -> f64 {
        self.hsps
            .iter()
            .map(|hsp| hsp.score)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Order hits by best score, highest first.
///
/// `total_cmp` keeps the order total even for NaN scores, so a stable sort with
/// this comparator is deterministic.
pub fn compare_by_best_score(a: &Alignment, b: &Alignment) -> Ordering {
    b.best_score().total_cmp(&a.best_score())
}

/// All hits of one query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRecord {
    /// 1-based position of the record in the document
    pub index: usize,
    pub query_id: String,
    pub query_def: String,
    pub query_length: u64,
    pub alignments: Vec<Alignment>,
}

impl SearchRecord {
    /// The label printed in the `Input_query-ID` column: the query definition
    /// line, or the query ID when BLAST wrote no definition.
    pub fn query_label(&self) -> &str {
        if self.query_def.is_empty() {
            &self.query_id
        } else {
            &self.query_def
        }
    }

    /// Hits sorted by best score, highest first. Ties keep document order.
    pub fn ranked_alignments(&self) -> Vec<&Alignment> {
        let mut ranked: Vec<&Alignment> = self.alignments.iter().collect();
        ranked.sort_by(|a, b| compare_by_best_score(a, b));
        ranked
    }
}
