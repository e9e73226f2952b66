use clap::Args;
use std::path::PathBuf;

use crate::config::{ColumnSelection, ExportRequest, FilterConfig, Thresholds};
use crate::error::Result;
use crate::report::{NumberStyle, OutputConfig};

// Conservative defaults: best hit only, single-HSP hits, no identity or coverage floor.
pub const DEFAULT_MAX_RANK: usize = 1;
pub const DEFAULT_MAX_HSPS: usize = 1;
pub const DEFAULT_EVALUE: f64 = 0.1;
pub const DEFAULT_MIN_IDENTITY: f64 = 0.0;
pub const DEFAULT_MIN_QUERY_COVERAGE: f64 = 0.0;

#[derive(Args, Debug)]
pub struct FilterArgs {
    /// BLAST XML result file (`-outfmt 5`), optionally gzip-compressed
    #[arg(short, long)]
    pub input: PathBuf,
    /// Table output
    #[arg(short, long)]
    pub out: PathBuf,
    /// Alignment report output (default: <out stem>.ali.txt next to the table)
    #[arg(long)]
    pub alignment_out: Option<PathBuf>,

    // Optional columns
    #[arg(long, default_value_t = false)]
    pub query_id: bool,
    #[arg(long, default_value_t = false)]
    pub query_length: bool,
    #[arg(long, default_value_t = false)]
    pub target_length: bool,
    /// Bit score column, also added to the alignment metadata
    #[arg(long, default_value_t = false)]
    pub score: bool,
    #[arg(long, default_value_t = false)]
    pub query_start: bool,
    #[arg(long, default_value_t = false)]
    pub query_end: bool,
    #[arg(long, default_value_t = false)]
    pub target_start: bool,
    #[arg(long, default_value_t = false)]
    pub target_end: bool,
    /// Strand column (1 = plus/plus), also added to the alignment metadata
    #[arg(long, default_value_t = false)]
    pub strand: bool,
    #[arg(long, default_value_t = false)]
    pub match_length: bool,
    /// Enable every optional column
    #[arg(
        long,
        default_value_t = false,
        conflicts_with_all = [
            "query_id", "query_length", "target_length", "score", "query_start",
            "query_end", "target_start", "target_end", "strand", "match_length",
        ]
    )]
    pub all_columns: bool,

    /// Maximum number of hits reported per query, by best HSP score
    #[arg(long, default_value_t = DEFAULT_MAX_RANK)]
    pub max_rank: usize,
    /// Skip hits with more HSPs than this
    #[arg(long, default_value_t = DEFAULT_MAX_HSPS)]
    pub max_hsps: usize,
    /// Maximum E-value (inclusive)
    #[arg(long, default_value_t = DEFAULT_EVALUE)]
    pub evalue: f64,
    /// Minimum identity in percent (inclusive)
    #[arg(long, default_value_t = DEFAULT_MIN_IDENTITY)]
    pub min_identity: f64,
    /// Minimum query coverage in percent (inclusive)
    #[arg(long, default_value_t = DEFAULT_MIN_QUERY_COVERAGE)]
    pub min_query_coverage: f64,

    /// Table field delimiter
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,
    /// Print E-values and bit scores the way NCBI BLAST tabular output does
    #[arg(long, default_value_t = false)]
    pub ncbi_format: bool,
    #[arg(long, short = 'v', default_value_t = false)]
    pub verbose: bool,
}

impl FilterArgs {
    pub fn columns(&self) -> ColumnSelection {
        if self.all_columns {
            return ColumnSelection::all();
        }
        ColumnSelection {
            query_id: self.query_id,
            query_length: self.query_length,
            target_length: self.target_length,
            score: self.score,
            query_start: self.query_start,
            query_end: self.query_end,
            target_start: self.target_start,
            target_end: self.target_end,
            strand: self.strand,
            match_length: self.match_length,
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            max_rank: self.max_rank,
            max_hsp_per_hit: self.max_hsps,
            max_evalue: self.evalue,
            min_identity_percent: self.min_identity,
            min_query_coverage_percent: self.min_query_coverage,
        }
    }

    pub fn output_config(&self) -> OutputConfig {
        OutputConfig {
            delimiter: self.delimiter,
            number_style: if self.ncbi_format {
                NumberStyle::Ncbi
            } else {
                NumberStyle::Plain
            },
        }
    }

    pub fn to_config(&self) -> Result<FilterConfig> {
        FilterConfig::new(self.columns(), self.thresholds())
    }

    /// Validate everything and bundle it into a request. Nothing is opened.
    pub fn to_request(&self) -> Result<ExportRequest> {
        ExportRequest::new(
            self.input.clone(),
            self.out.clone(),
            self.alignment_out.clone(),
            self.to_config()?,
            self.output_config(),
        )
    }
}
