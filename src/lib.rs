pub mod common;
pub mod error;

pub mod config;
pub mod format;
pub mod post;
pub mod report;

pub mod api;
pub mod blastinput;

pub use error::{FilterError, Result};
