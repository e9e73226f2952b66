//! Run configuration
//!
//! - `filter` - thresholds and column selection ([`FilterConfig`])
//! - `request` - input/output paths bundled with the settings of one run

pub mod filter;
pub mod request;

pub use filter::{ColumnSelection, FilterConfig, Thresholds};
pub use request::{default_alignment_path, resolve_path, ExportRequest};
