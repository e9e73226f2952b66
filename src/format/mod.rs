//! BLAST result input
//!
//! - `blast_xml` - streaming reader for BLAST XML (`-outfmt 5`)
//!
//! [`open_input`] opens a result file and transparently decompresses gzip.

pub mod blast_xml;

pub use blast_xml::BlastXmlReader;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::{FilterError, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Open `path` for buffered reading, detecting gzip by its magic bytes.
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    let file = File::open(path).map_err(|source| FilterError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let gzipped = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
    if gzipped {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}

/// Stream the search records of a BLAST XML file.
pub fn read_blast_xml(path: &Path) -> Result<BlastXmlReader<Box<dyn BufRead + Send>>> {
    Ok(BlastXmlReader::new(open_input(path)?))
}
