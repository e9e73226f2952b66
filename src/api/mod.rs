//! Export API
//!
//! - `export` - the filter/export pipeline over a record source
//! - `control` - cooperative cancellation shared with the caller
//! - `worker` - run one export on a dedicated background thread

pub mod control;
pub mod export;
pub mod worker;

pub use control::ExportControl;
pub use export::{export_files, export_records, ExportSummary};
pub use worker::{spawn_export, spawn_export_with, ExportHandle};
