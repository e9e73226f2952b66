//! Pairwise alignment report
//!
//! One block per reported HSP:
//!
//! ```text
//! > Gene X, partial
//! rank = 1	Score = 167.3	Expect = 1e-05	Identities = 90.0	Strand = 1
//! Query  ACGTACGT
//!        ||| ||||
//! Sbjct  ACGAACGT
//! ```
//!
//! Blocks are separated by one empty line. The aligned rows are printed as
//! BLAST wrote them, without re-wrapping.

use std::io::{self, Write};

use super::table::strand_flag;
use super::OutputConfig;
use crate::config::ColumnSelection;
use crate::post::RankedHsp;

pub const QUERY_LABEL: &str = "Query  ";
pub const MATCH_LABEL: &str = "       ";
pub const SUBJECT_LABEL: &str = "Sbjct  ";

pub struct PairwiseWriter<W: Write> {
    writer: W,
    show_score: bool,
    show_strand: bool,
    config: OutputConfig,
    blocks: usize,
}

impl<W: Write> PairwiseWriter<W> {
    pub fn new(writer: W, selection: &ColumnSelection, config: OutputConfig) -> Self {
        Self {
            writer,
            show_score: selection.score,
            show_strand: selection.strand,
            config,
            blocks: 0,
        }
    }

    /// Metadata entries in fixed order: rank, score, E-value, identity, strand.
    pub fn metadata(&self, row: &RankedHsp) -> Vec<String> {
        let style = self.config.number_style;
        let mut items = Vec::with_capacity(5);
        items.push(format!("rank = {}", row.rank));
        if self.show_score {
            items.push(format!("Score = {}", style.bit_score(row.hsp.bit_score)));
        }
        items.push(format!("Expect = {}", style.evalue(row.hsp.expect_value)));
        items.push(format!("Identities = {}", style.percent(row.identity_percent)));
        if self.show_strand {
            items.push(format!("Strand = {}", strand_flag(row.hsp.is_plus_plus())));
        }
        items
    }

    pub fn write_block(&mut self, row: &RankedHsp) -> io::Result<()> {
        if self.blocks > 0 {
            writeln!(self.writer)?;
        }
        writeln!(self.writer, "> {}", row.alignment.hit_definition)?;
        writeln!(self.writer, "{}", self.metadata(row).join("\t"))?;
        writeln!(self.writer, "{}{}", QUERY_LABEL, row.hsp.query_line)?;
        writeln!(self.writer, "{}{}", MATCH_LABEL, row.hsp.match_line)?;
        writeln!(self.writer, "{}{}", SUBJECT_LABEL, row.hsp.subject_line)?;
        self.blocks += 1;
        Ok(())
    }

    pub fn blocks_written(&self) -> usize {
        self.blocks
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
