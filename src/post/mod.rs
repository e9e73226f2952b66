//! Post-processing of parsed search results
//!
//! - `filter` - per-HSP threshold checks
//! - `rank` - hit ordering, rank assignment and HSP selection for one record

pub mod filter;
pub mod rank;

pub use filter::{assess_hsp, HspMetrics, Rejection};
pub use rank::{select_hsps, RankedHsp, Selection, SelectionStats};
