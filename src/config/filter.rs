//! Filter thresholds and table column selection.

use crate::error::{FilterError, Result};

/// Optional table columns. Each flag adds one column to the table; `score`
/// and `strand` also add an entry to the alignment metadata line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnSelection {
    pub query_id: bool,
    pub query_length: bool,
    pub target_length: bool,
    pub score: bool,
    pub query_start: bool,
    pub query_end: bool,
    pub target_start: bool,
    pub target_end: bool,
    pub strand: bool,
    pub match_length: bool,
}

impl ColumnSelection {
    /// Every optional column enabled.
    pub fn all() -> Self {
        Self {
            query_id: true,
            query_length: true,
            target_length: true,
            score: true,
            query_start: true,
            query_end: true,
            target_start: true,
            target_end: true,
            strand: true,
            match_length: true,
        }
    }
}

/// Inclusion thresholds applied to every hit and HSP.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Maximum number of hits reported per query, by score rank
    pub max_rank: usize,
    /// Hits with more HSPs than this are skipped entirely
    pub max_hsp_per_hit: usize,
    /// Inclusive upper bound on the HSP E-value
    pub max_evalue: f64,
    /// Inclusive lower bound on identity (%)
    pub min_identity_percent: f64,
    /// Inclusive lower bound on query coverage (%)
    pub min_query_coverage_percent: f64,
}

impl Thresholds {
    fn validate(&self) -> Result<()> {
        if self.max_rank == 0 {
            return Err(FilterError::config("max rank must be at least 1"));
        }
        if self.max_hsp_per_hit == 0 {
            return Err(FilterError::config(
                "max HSPs per hit must be at least 1",
            ));
        }
        if !self.max_evalue.is_finite() || self.max_evalue <= 0.0 {
            return Err(FilterError::config(format!(
                "max E-value must be a positive number, got {}",
                self.max_evalue
            )));
        }
        check_percentage("min identity", self.min_identity_percent)?;
        check_percentage("min query coverage", self.min_query_coverage_percent)?;
        Ok(())
    }
}

fn check_percentage(name: &str, value: f64) -> Result<()> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(FilterError::config(format!(
            "{} must be between 0 and 100, got {}",
            name, value
        )))
    }
}

/// Validated run configuration.
///
/// Constructed once per run through [`FilterConfig::new`]; fields are private
/// so an unvalidated configuration can never reach the exporter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterConfig {
    columns: ColumnSelection,
    thresholds: Thresholds,
}

impl FilterConfig {
    pub fn new(columns: ColumnSelection, thresholds: Thresholds) -> Result<Self> {
        thresholds.validate()?;
        Ok(Self {
            columns,
            thresholds,
        })
    }

    pub fn columns(&self) -> &ColumnSelection {
        &self.columns
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }
}
