//! Command line input
//!
//! - `filter_args` - arguments of the `filter` command and their conversion
//!   into a validated [`ExportRequest`](crate::config::ExportRequest)

pub mod filter_args;

pub use filter_args::FilterArgs;
