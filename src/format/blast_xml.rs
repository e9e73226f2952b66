//! Streaming BLAST XML (`-outfmt 5`) reader
//!
//! [`BlastXmlReader`] pulls events from the document and yields one
//! [`SearchRecord`] per `<Iteration>`. Only the record under construction is
//! held in memory, so input size is bounded by the largest single query, not
//! by the file.
//!
//! Text is accumulated verbatim (no trimming) because `Hsp_midline` starts
//! with spaces whenever the first aligned column is a mismatch. Numeric fields
//! are trimmed before parsing.

use std::io::BufRead;
use std::mem;
use std::str::FromStr;

use log::debug;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::common::{Alignment, Hsp, SearchRecord, Strand};
use crate::error::{FilterError, Result};

/// Owned view of the events the reader cares about.
enum XmlEvent {
    Open(Vec<u8>),
    Close(Vec<u8>),
    Empty(Vec<u8>),
    Text(String),
    Skip,
    Eof,
}

#[derive(Default)]
struct RecordBuilder {
    query_id: Option<String>,
    query_def: Option<String>,
    query_length: Option<u64>,
    alignments: Vec<Alignment>,
}

#[derive(Default)]
struct HitBuilder {
    hit_id: Option<String>,
    hit_definition: Option<String>,
    accession: Option<String>,
    length: Option<u64>,
    hsps: Vec<Hsp>,
}

#[derive(Default)]
struct HspBuilder {
    num: Option<usize>,
    bit_score: Option<f64>,
    score: Option<f64>,
    expect_value: Option<f64>,
    identities: Option<u64>,
    align_length: Option<u64>,
    gaps: Option<u64>,
    query_start: Option<u64>,
    query_end: Option<u64>,
    subject_start: Option<u64>,
    subject_end: Option<u64>,
    query_frame: Option<i32>,
    subject_frame: Option<i32>,
    query_line: Option<String>,
    match_line: Option<String>,
    subject_line: Option<String>,
}

fn required<T>(value: Option<T>, tag: &str, record: usize) -> Result<T> {
    value.ok_or_else(|| FilterError::parse(record, format!("missing <{}>", tag)))
}

impl HspBuilder {
    fn finish(self, next_num: usize, nucleotide: bool, record: usize) -> Result<Hsp> {
        let strand = if nucleotide {
            Some((
                Strand::from_frame(self.query_frame.unwrap_or(1)),
                Strand::from_frame(self.subject_frame.unwrap_or(1)),
            ))
        } else {
            None
        };

        Ok(Hsp {
            num: self.num.unwrap_or(next_num),
            bit_score: required(self.bit_score, "Hsp_bit-score", record)?,
            score: required(self.score, "Hsp_score", record)?,
            expect_value: required(self.expect_value, "Hsp_evalue", record)?,
            identities: required(self.identities, "Hsp_identity", record)?,
            align_length: required(self.align_length, "Hsp_align-len", record)?,
            gaps: self.gaps.unwrap_or(0),
            query_start: required(self.query_start, "Hsp_query-from", record)?,
            query_end: required(self.query_end, "Hsp_query-to", record)?,
            subject_start: required(self.subject_start, "Hsp_hit-from", record)?,
            subject_end: required(self.subject_end, "Hsp_hit-to", record)?,
            strand,
            query_line: self.query_line.unwrap_or_default(),
            match_line: self.match_line.unwrap_or_default(),
            subject_line: self.subject_line.unwrap_or_default(),
        })
    }
}

impl HitBuilder {
    fn finish(self, record: usize) -> Result<Alignment> {
        Ok(Alignment {
            hit_id: self.hit_id.unwrap_or_default(),
            hit_definition: self.hit_definition.unwrap_or_default(),
            accession: self.accession.unwrap_or_default(),
            length: required(self.length, "Hit_len", record)?,
            hsps: self.hsps,
        })
    }
}

/// Forward-only iterator over the search records of a BLAST XML document.
///
/// The first error ends the iteration.
pub struct BlastXmlReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    text: String,
    program: String,
    header_query_def: Option<String>,
    header_query_length: Option<u64>,
    record: Option<RecordBuilder>,
    hit: Option<HitBuilder>,
    hsp: Option<HspBuilder>,
    records_read: usize,
    finished: bool,
}

impl<R: BufRead> BlastXmlReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            reader: Reader::from_reader(input),
            buf: Vec::new(),
            text: String::new(),
            program: String::new(),
            header_query_def: None,
            header_query_length: None,
            record: None,
            hit: None,
            hsp: None,
            records_read: 0,
            finished: false,
        }
    }

    /// `BlastOutput_program`, once the document header has been read.
    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// 1-based index of the record currently being read.
    fn current_record(&self) -> usize {
        self.records_read + 1
    }

    fn next_event(&mut self) -> Result<XmlEvent> {
        let record = self.current_record();
        self.buf.clear();
        let event = match self.reader.read_event_into(&mut self.buf) {
            Ok(Event::Start(e)) => XmlEvent::Open(e.name().as_ref().to_vec()),
            Ok(Event::End(e)) => XmlEvent::Close(e.name().as_ref().to_vec()),
            Ok(Event::Empty(e)) => XmlEvent::Empty(e.name().as_ref().to_vec()),
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| FilterError::parse(record, err.to_string()))?;
                XmlEvent::Text(text.into_owned())
            }
            Ok(Event::CData(e)) => {
                XmlEvent::Text(String::from_utf8_lossy(&e.into_inner()).into_owned())
            }
            Ok(Event::Eof) => XmlEvent::Eof,
            Ok(_) => XmlEvent::Skip,
            Err(err) => {
                return Err(FilterError::parse(
                    record,
                    format!("{} (byte {})", err, self.reader.buffer_position()),
                ))
            }
        };
        Ok(event)
    }

    fn read_record(&mut self) -> Result<Option<SearchRecord>> {
        loop {
            match self.next_event()? {
                XmlEvent::Open(name) => self.open(&name),
                XmlEvent::Close(name) => {
                    if let Some(record) = self.close(&name)? {
                        return Ok(Some(record));
                    }
                }
                XmlEvent::Empty(name) => {
                    self.open(&name);
                    if let Some(record) = self.close(&name)? {
                        return Ok(Some(record));
                    }
                }
                XmlEvent::Text(text) => self.text.push_str(&text),
                XmlEvent::Skip => {}
                XmlEvent::Eof => {
                    if self.record.is_some() {
                        return Err(FilterError::parse(
                            self.current_record(),
                            "document ends inside <Iteration>",
                        ));
                    }
                    return Ok(None);
                }
            }
        }
    }

    fn open(&mut self, name: &[u8]) {
        self.text.clear();
        match name {
            b"Iteration" => self.record = Some(RecordBuilder::default()),
            b"Hit" => self.hit = Some(HitBuilder::default()),
            b"Hsp" => self.hsp = Some(HspBuilder::default()),
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) -> Result<Option<SearchRecord>> {
        let value = mem::take(&mut self.text);
        let index = self.current_record();

        match name {
            b"BlastOutput_program" => self.program = value.trim().to_string(),
            b"BlastOutput_query-def" => self.header_query_def = Some(value),
            b"BlastOutput_query-len" => {
                self.header_query_length = Some(parse_number(&value, name, index)?)
            }

            b"Iteration_query-ID" => self.record_mut(name)?.query_id = Some(value),
            b"Iteration_query-def" => self.record_mut(name)?.query_def = Some(value),
            b"Iteration_query-len" => {
                let length = parse_number(&value, name, index)?;
                self.record_mut(name)?.query_length = Some(length);
            }

            b"Hit_id" => self.hit_mut(name)?.hit_id = Some(value),
            b"Hit_def" => self.hit_mut(name)?.hit_definition = Some(value),
            b"Hit_accession" => self.hit_mut(name)?.accession = Some(value),
            b"Hit_len" => {
                let length = parse_number(&value, name, index)?;
                self.hit_mut(name)?.length = Some(length);
            }

            b"Hsp_num" => {
                let num = parse_number(&value, name, index)?;
                self.hsp_mut(name)?.num = Some(num);
            }
            b"Hsp_bit-score" => {
                let v = parse_number(&value, name, index)?;
                self.hsp_mut(name)?.bit_score = Some(v);
            }
            b"Hsp_score" => {
                let v = parse_number(&value, name, index)?;
                self.hsp_mut(name)?.score = Some(v);
            }
            b"Hsp_evalue" => {
                let v = parse_number(&value, name, index)?;
                self.hsp_mut(name)?.expect_value = Some(v);
            }
            b"Hsp_query-from" => {
                let v = parse_number(&value, name, index)?;
                self.hsp_mut(name)?.query_start = Some(v);
            }
            b"Hsp_query-to" => {
                let v = parse_number(&value, name, index)?;
                self.hsp_mut(name)?.query_end = Some(v);
            }
            b"Hsp_hit-from" => {
                let v = parse_number(&value, name, index)?;
                self.hsp_mut(name)?.subject_start = Some(v);
            }
            b"Hsp_hit-to" => {
                let v = parse_number(&value, name, index)?;
                self.hsp_mut(name)?.subject_end = Some(v);
            }
            b"Hsp_query-frame" => {
                let v = parse_number(&value, name, index)?;
                self.hsp_mut(name)?.query_frame = Some(v);
            }
            b"Hsp_hit-frame" => {
                let v = parse_number(&value, name, index)?;
                self.hsp_mut(name)?.subject_frame = Some(v);
            }
            b"Hsp_identity" => {
                let v = parse_number(&value, name, index)?;
                self.hsp_mut(name)?.identities = Some(v);
            }
            b"Hsp_gaps" => {
                let v = parse_number(&value, name, index)?;
                self.hsp_mut(name)?.gaps = Some(v);
            }
            b"Hsp_align-len" => {
                let v = parse_number(&value, name, index)?;
                self.hsp_mut(name)?.align_length = Some(v);
            }
            b"Hsp_qseq" => self.hsp_mut(name)?.query_line = Some(value),
            b"Hsp_midline" => self.hsp_mut(name)?.match_line = Some(value),
            b"Hsp_hseq" => self.hsp_mut(name)?.subject_line = Some(value),

            b"Hsp" => {
                let builder = self.hsp.take().ok_or_else(|| unmatched(name, index))?;
                let nucleotide = self.program.eq_ignore_ascii_case("blastn");
                let hit = self.hit_mut(name)?;
                let hsp = builder.finish(hit.hsps.len() + 1, nucleotide, index)?;
                hit.hsps.push(hsp);
            }
            b"Hit" => {
                let builder = self.hit.take().ok_or_else(|| unmatched(name, index))?;
                let alignment = builder.finish(index)?;
                self.record_mut(name)?.alignments.push(alignment);
            }
            b"Iteration" => {
                let builder = self.record.take().ok_or_else(|| unmatched(name, index))?;
                let record = self.finish_record(builder)?;
                self.records_read += 1;
                debug!(
                    "record {}: {} ({} hits)",
                    record.index,
                    record.query_label(),
                    record.alignments.len()
                );
                return Ok(Some(record));
            }
            _ => {}
        }
        Ok(None)
    }

    fn finish_record(&self, builder: RecordBuilder) -> Result<SearchRecord> {
        let index = self.current_record();
        let query_length = builder
            .query_length
            .or(self.header_query_length)
            .ok_or_else(|| FilterError::parse(index, "missing <Iteration_query-len>"))?;
        let query_def = builder
            .query_def
            .or_else(|| self.header_query_def.clone())
            .unwrap_or_default();

        Ok(SearchRecord {
            index,
            query_id: builder.query_id.unwrap_or_default(),
            query_def,
            query_length,
            alignments: builder.alignments,
        })
    }

    fn record_mut(&mut self, tag: &[u8]) -> Result<&mut RecordBuilder> {
        let index = self.current_record();
        self.record
            .as_mut()
            .ok_or_else(|| outside(tag, "Iteration", index))
    }

    fn hit_mut(&mut self, tag: &[u8]) -> Result<&mut HitBuilder> {
        let index = self.current_record();
        self.hit.as_mut().ok_or_else(|| outside(tag, "Hit", index))
    }

    fn hsp_mut(&mut self, tag: &[u8]) -> Result<&mut HspBuilder> {
        let index = self.current_record();
        self.hsp.as_mut().ok_or_else(|| outside(tag, "Hsp", index))
    }
}

impl<R: BufRead> Iterator for BlastXmlReader<R> {
    type Item = Result<SearchRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

fn tag_name(tag: &[u8]) -> String {
    String::from_utf8_lossy(tag).into_owned()
}

fn outside(tag: &[u8], container: &str, record: usize) -> FilterError {
    FilterError::parse(
        record,
        format!("<{}> outside of <{}>", tag_name(tag), container),
    )
}

fn unmatched(tag: &[u8], record: usize) -> FilterError {
    FilterError::parse(record, format!("unmatched </{}>", tag_name(tag)))
}

fn parse_number<T: FromStr>(value: &str, tag: &[u8], record: usize) -> Result<T> {
    value.trim().parse().map_err(|_| {
        FilterError::parse(
            record,
            format!("invalid value in <{}>: '{}'", tag_name(tag), value.trim()),
        )
    })
}
