//! Delimited table output (CSV by default)
//!
//! The header and every row are produced by walking the same column list, so
//! a row can never disagree with the header about field count or order.

use std::borrow::Cow;
use std::io::{self, Write};

use super::OutputConfig;
use crate::config::ColumnSelection;
use crate::post::RankedHsp;

// =============================================================================
// Columns
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    QueryId,
    QueryLength,
    Rank,
    TargetDefinition,
    TargetLength,
    HspNum,
    Score,
    EValue,
    QueryStart,
    QueryEnd,
    QueryCoverage,
    TargetStart,
    TargetEnd,
    Strand,
    Identity,
    MatchLength,
    Accession,
}

/// Every column in output order.
pub const COLUMN_ORDER: [Column; 17] = [
    Column::QueryId,
    Column::QueryLength,
    Column::Rank,
    Column::TargetDefinition,
    Column::TargetLength,
    Column::HspNum,
    Column::Score,
    Column::EValue,
    Column::QueryStart,
    Column::QueryEnd,
    Column::QueryCoverage,
    Column::TargetStart,
    Column::TargetEnd,
    Column::Strand,
    Column::Identity,
    Column::MatchLength,
    Column::Accession,
];

impl Column {
    pub fn header(self) -> &'static str {
        match self {
            Column::QueryId => "Input_query-ID",
            Column::QueryLength => "Query_Length",
            Column::Rank => "Rank",
            Column::TargetDefinition => "Target_Definition",
            Column::TargetLength => "Target_Length",
            Column::HspNum => "Hsp_num",
            Column::Score => "Score",
            Column::EValue => "E-Value",
            Column::QueryStart => "Query_Start",
            Column::QueryEnd => "Query_End",
            Column::QueryCoverage => "Query_Coverage(%)",
            Column::TargetStart => "Target_Start",
            Column::TargetEnd => "Target_End",
            Column::Strand => "Strand",
            Column::Identity => "Identity(%)",
            Column::MatchLength => "Match_Length",
            Column::Accession => "Accession",
        }
    }

    /// Whether the column is part of the output under `selection`.
    pub fn is_selected(self, selection: &ColumnSelection) -> bool {
        match self {
            Column::QueryId => selection.query_id,
            Column::QueryLength => selection.query_length,
            Column::TargetLength => selection.target_length,
            Column::Score => selection.score,
            Column::QueryStart => selection.query_start,
            Column::QueryEnd => selection.query_end,
            Column::TargetStart => selection.target_start,
            Column::TargetEnd => selection.target_end,
            Column::Strand => selection.strand,
            Column::MatchLength => selection.match_length,
            Column::Rank
            | Column::TargetDefinition
            | Column::HspNum
            | Column::EValue
            | Column::QueryCoverage
            | Column::Identity
            | Column::Accession => true,
        }
    }

    fn value(self, row: &RankedHsp, config: &OutputConfig) -> String {
        let style = config.number_style;
        let hsp = row.hsp;
        match self {
            Column::QueryId => row.record.query_label().to_string(),
            Column::QueryLength => row.record.query_length.to_string(),
            Column::Rank => row.rank.to_string(),
            Column::TargetDefinition => row.alignment.hit_definition.clone(),
            Column::TargetLength => row.alignment.length.to_string(),
            Column::HspNum => row.alignment.hsps.len().to_string(),
            Column::Score => style.bit_score(hsp.bit_score),
            Column::EValue => style.evalue(hsp.expect_value),
            Column::QueryStart => hsp.query_start.to_string(),
            Column::QueryEnd => hsp.query_end.to_string(),
            Column::QueryCoverage => style.percent(row.query_coverage_percent),
            Column::TargetStart => hsp.subject_start.to_string(),
            Column::TargetEnd => hsp.subject_end.to_string(),
            Column::Strand => strand_flag(hsp.is_plus_plus()).to_string(),
            Column::Identity => style.percent(row.identity_percent),
            Column::MatchLength => hsp.align_length.to_string(),
            Column::Accession => row.alignment.accession.clone(),
        }
    }
}

/// `1` for plus/plus, `0` for anything else.
pub fn strand_flag(plus_plus: bool) -> &'static str {
    if plus_plus {
        "1"
    } else {
        "0"
    }
}

/// The columns written for `selection`, in output order.
pub fn columns_for(selection: &ColumnSelection) -> Vec<Column> {
    COLUMN_ORDER
        .iter()
        .copied()
        .filter(|column| column.is_selected(selection))
        .collect()
}

/// Quote a field that contains the delimiter, a quote or a line break.
pub fn escape_field(value: &str, delimiter: char) -> Cow<'_, str> {
    if value.contains(|c: char| c == delimiter || c == '"' || c == '\n' || c == '\r') {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

// =============================================================================
// Writer
// =============================================================================

pub struct TableWriter<W: Write> {
    writer: W,
    columns: Vec<Column>,
    config: OutputConfig,
    rows: usize,
}

impl<W: Write> TableWriter<W> {
    pub fn new(writer: W, selection: &ColumnSelection, config: OutputConfig) -> Self {
        Self {
            writer,
            columns: columns_for(selection),
            config,
            rows: 0,
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn write_header(&mut self) -> io::Result<()> {
        let delim = self.config.delimiter;
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(self.writer, "{}", delim)?;
            }
            write!(self.writer, "{}", column.header())?;
        }
        writeln!(self.writer)
    }

    pub fn write_row(&mut self, row: &RankedHsp) -> io::Result<()> {
        let delim = self.config.delimiter;
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(self.writer, "{}", delim)?;
            }
            let value = column.value(row, &self.config);
            write!(self.writer, "{}", escape_field(&value, delim))?;
        }
        writeln!(self.writer)?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
