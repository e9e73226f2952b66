//! Output reports
//!
//! - `table` - delimited table, one row per reported HSP
//! - `pairwise` - alignment report, one block per reported HSP
//! - `number` - float rendering shared by both

pub mod number;
pub mod pairwise;
pub mod table;

pub use number::NumberStyle;
pub use pairwise::PairwiseWriter;
pub use table::{Column, TableWriter};

use crate::error::{FilterError, Result};

/// Settings shared by both report writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    /// Field delimiter of the table (default: comma)
    pub delimiter: char,
    pub number_style: NumberStyle,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            number_style: NumberStyle::Plain,
        }
    }
}

impl OutputConfig {
    /// A quote or line break cannot delimit fields.
    pub fn validate(&self) -> Result<()> {
        if matches!(self.delimiter, '"' | '\n' | '\r') {
            return Err(FilterError::config(format!(
                "{:?} cannot be used as the table delimiter",
                self.delimiter
            )));
        }
        Ok(())
    }
}
