//! Filter/export pipeline
//!
//! Records are pulled one at a time, ranked and filtered into a single
//! [`Selection`](crate::post::Selection), and every selected HSP is written to
//! the table and then to the alignment report before the next record is read.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{debug, info, warn};

use super::control::ExportControl;
use crate::common::SearchRecord;
use crate::config::{ExportRequest, FilterConfig};
use crate::error::{FilterError, Result};
use crate::format::read_blast_xml;
use crate::post::{select_hsps, SelectionStats};
use crate::report::{PairwiseWriter, TableWriter};

/// Running totals of one export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub records_read: usize,
    /// Records skipped because BLAST found no hits for the query
    pub records_without_hits: usize,
    /// Table rows written; always equal to the alignment blocks written
    pub rows_written: usize,
    pub selection: SelectionStats,
    /// Set when the run stopped early on request
    pub cancelled: bool,
}

/// Run the filter over `records`, writing the header and then one row and
/// one alignment block per selected HSP.
///
/// `progress` is called after every record. The writers are not flushed
/// here; that is left to the owner of the underlying sinks.
pub fn export_records<I, T, A, P>(
    records: I,
    config: &FilterConfig,
    table: &mut TableWriter<T>,
    pairwise: &mut PairwiseWriter<A>,
    control: &ExportControl,
    mut progress: P,
) -> Result<ExportSummary>
where
    I: IntoIterator<Item = Result<SearchRecord>>,
    T: Write,
    A: Write,
    P: FnMut(&ExportSummary),
{
    let mut summary = ExportSummary::default();
    table.write_header()?;

    let mut records = records.into_iter();
    loop {
        if control.is_stop_requested() {
            warn!(
                "Stop requested after {} records; outputs are incomplete",
                summary.records_read
            );
            summary.cancelled = true;
            break;
        }

        let record = match records.next() {
            Some(record) => record?,
            None => break,
        };
        summary.records_read += 1;

        if record.alignments.is_empty() {
            summary.records_without_hits += 1;
            progress(&summary);
            continue;
        }

        let selection = select_hsps(&record, config.thresholds());
        for row in &selection.hsps {
            table.write_row(row)?;
            pairwise.write_block(row)?;
        }
        summary.rows_written += selection.hsps.len();
        summary.selection.merge(&selection.stats);

        debug!(
            "record {} ({}): {} hits ranked, {} HSPs written",
            record.index,
            record.query_label(),
            selection.stats.alignments_ranked,
            selection.hsps.len()
        );
        progress(&summary);
    }

    Ok(summary)
}

fn program_label(program: &str) -> &str {
    if program.is_empty() {
        "BLAST"
    } else {
        program
    }
}

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).map_err(|source| FilterError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufWriter::new(file))
}

/// Run one export from the files named in `request`.
///
/// Both outputs are flushed on every exit path. When the run fails the
/// outputs keep whatever was written before the failure, and the run error is
/// returned even if flushing also failed.
pub fn export_files<P>(
    request: &ExportRequest,
    control: &ExportControl,
    progress: P,
) -> Result<ExportSummary>
where
    P: FnMut(&ExportSummary),
{
    let mut records = read_blast_xml(&request.input)?;
    let columns = request.filter.columns();
    let mut table = TableWriter::new(create_output(&request.table_out)?, columns, request.output);
    let mut pairwise =
        PairwiseWriter::new(create_output(&request.alignment_out)?, columns, request.output);

    let result = export_records(
        &mut records,
        &request.filter,
        &mut table,
        &mut pairwise,
        control,
        progress,
    );
    let flushed = table.flush().and_then(|_| pairwise.flush());

    let summary = result?;
    flushed?;

    info!(
        "{} results: {} records read ({} without hits), {} hits ranked, {} HSPs written, {} rejected",
        program_label(records.program()),
        records.records_read(),
        summary.records_without_hits,
        summary.selection.alignments_ranked,
        summary.rows_written,
        summary.selection.hsps_rejected()
    );
    info!(
        "Table: {}  Alignments: {}",
        request.table_out.display(),
        request.alignment_out.display()
    );
    Ok(summary)
}
