//! BED format reader
//!
//! Reads BED3 through BED12 into intervals with zero-copy field splitting.
//!
//! - BED3: every line is its own group
//! - BED4+: `name` is the group id
//! - BED6+: strand
//! - BED8+: thick part becomes `CodingRegion`, the rest `Exon`
//! - BED12: each block is expanded separately

use crate::core::{ByteLineIterator, FeatureKind, Interval, ParseError, ParseResult, Strand};
use log::debug;
use memchr::memchr;
use std::io::BufRead;

/// Zero-copy BED record view for parsing
/// Only parses coordinate fields immediately, other fields are kept as byte slices
pub struct BedRecordView<'a> {
    line: &'a [u8],
    pub chrom: &'a str,
    /// Start position (0-based)
    pub start: u64,
    pub end: u64,
    field_bounds: Vec<(usize, usize)>,
}

impl<'a> BedRecordView<'a> {
    /// Parse a BED line, splitting fields on tabs
    pub fn parse(line: &'a [u8]) -> Result<Self, BedParseError> {
        if line.is_empty() {
            return Err(BedParseError::EmptyLine);
        }

        let mut field_bounds = Vec::with_capacity(12);
        let mut start_pos = 0;
        loop {
            match memchr(b'\t', &line[start_pos..]) {
                Some(tab) => {
                    field_bounds.push((start_pos, start_pos + tab));
                    start_pos += tab + 1;
                }
                None => {
                    field_bounds.push((start_pos, line.len()));
                    break;
                }
            }
        }

        if field_bounds.len() < 3 {
            return Err(BedParseError::TooFewFields {
                expected: 3,
                found: field_bounds.len(),
            });
        }

        let field = |idx: usize, name: &'static str| -> Result<&'a str, BedParseError> {
            let (s, e) = field_bounds[idx];
            std::str::from_utf8(&line[s..e]).map_err(|_| BedParseError::InvalidUtf8(name))
        };

        let chrom = field(0, "chrom")?;
        let start_str = field(1, "start")?;
        let start: u64 = start_str
            .parse()
            .map_err(|_| BedParseError::InvalidNumber("start", start_str.to_string()))?;
        let end_str = field(2, "end")?;
        let end: u64 = end_str
            .parse()
            .map_err(|_| BedParseError::InvalidNumber("end", end_str.to_string()))?;
        if start > end {
            return Err(BedParseError::InvertedCoordinates { start, end });
        }

        Ok(Self {
            line,
            chrom,
            start,
            end,
            field_bounds,
        })
    }

    pub fn field_count(&self) -> usize {
        self.field_bounds.len()
    }

    /// Get field as string slice (lazy access)
    pub fn field(&self, index: usize) -> Option<&'a str> {
        self.field_bounds
            .get(index)
            .and_then(|&(s, e)| std::str::from_utf8(&self.line[s..e]).ok())
    }

    pub fn name(&self) -> Option<&'a str> {
        self.field(3)
    }

    pub fn strand(&self) -> Option<Strand> {
        self.field(5).and_then(Strand::from_field)
    }

    /// `(thickStart, thickEnd)` when both parse
    pub fn thick(&self) -> Option<(u64, u64)> {
        let ts = self.field(6)?.parse().ok()?;
        let te = self.field(7)?.parse().ok()?;
        Some((ts, te))
    }

    pub fn is_bed12(&self) -> bool {
        self.field_count() >= 12
    }

    /// Absolute `[start, end)` of each BED12 block
    pub fn blocks(&self) -> Result<Vec<(u64, u64)>, BedParseError> {
        let count: usize = self
            .field(9)
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| BedParseError::InvalidBlocks("blockCount".to_string()))?;
        let sizes = parse_list(self.field(10).unwrap_or(""), "blockSizes")?;
        let starts = parse_list(self.field(11).unwrap_or(""), "blockStarts")?;
        if sizes.len() != count || starts.len() != count {
            return Err(BedParseError::InvalidBlocks(format!(
                "blockCount {} but {} sizes and {} starts",
                count,
                sizes.len(),
                starts.len()
            )));
        }

        let blocks: Vec<(u64, u64)> = starts
            .iter()
            .zip(&sizes)
            .map(|(&rel, &size)| {
                let start = self.start.checked_add(rel);
                let end = start.and_then(|s| s.checked_add(size));
                start.zip(end).ok_or_else(|| {
                    BedParseError::InvalidBlocks("block coordinate overflow".to_string())
                })
            })
            .collect::<Result<_, _>>()?;
        if blocks.iter().any(|&(_, e)| e > self.end) {
            return Err(BedParseError::InvalidBlocks(
                "block extends past chromEnd".to_string(),
            ));
        }
        Ok(blocks)
    }
}

fn parse_list(field: &str, name: &str) -> Result<Vec<u64>, BedParseError> {
    field
        .split(',')
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse()
                .map_err(|_| BedParseError::InvalidBlocks(format!("{}: '{}'", name, s)))
        })
        .collect()
}

/// BED parsing error
#[derive(Debug, thiserror::Error)]
pub enum BedParseError {
    #[error("Empty line")]
    EmptyLine,

    #[error("Too few fields: expected at least {expected}, found {found}")]
    TooFewFields { expected: usize, found: usize },

    #[error("Invalid UTF-8 in field: {0}")]
    InvalidUtf8(&'static str),

    #[error("Invalid number in field {0}: {1}")]
    InvalidNumber(&'static str, String),

    #[error("start ({start}) > end ({end})")]
    InvertedCoordinates { start: u64, end: u64 },

    #[error("Invalid block fields: {0}")]
    InvalidBlocks(String),
}

/// Header, comment and blank lines carry no records
fn is_header(line: &[u8]) -> bool {
    line.is_empty()
        || line.starts_with(b"#")
        || line.starts_with(b"track")
        || line.starts_with(b"browser")
}

/// Intervals described by one BED record
fn record_intervals(view: &BedRecordView, source_index: usize) -> Result<Vec<Interval>, BedParseError> {
    let group = view.name().filter(|n| !n.is_empty());
    let strand = view.strand();
    let make = |start: u64, end: u64, kind: Option<FeatureKind>| {
        let mut iv = Interval::new(view.chrom, start, end).with_source(source_index);
        iv.group_id = group.map(str::to_string);
        iv.strand = strand;
        iv.feature_kind = kind;
        iv
    };

    let Some((thick_start, thick_end)) = view.thick() else {
        return Ok(vec![make(view.start, view.end, None)]);
    };

    let blocks = if view.is_bed12() {
        view.blocks()?
    } else {
        vec![(view.start, view.end)]
    };

    let mut out = Vec::with_capacity(blocks.len() * 2);
    for &(bs, be) in &blocks {
        out.push(make(bs, be, Some(FeatureKind::Exon)));
    }
    for &(bs, be) in &blocks {
        let cs = bs.max(thick_start);
        let ce = be.min(thick_end);
        if cs < ce {
            out.push(make(cs, ce, Some(FeatureKind::CodingRegion)));
        }
    }
    Ok(out)
}

/// Read every record of a BED stream, tagging intervals with `source_index`
pub fn read_bed<R: BufRead>(reader: R, source_index: usize) -> ParseResult<Vec<Interval>> {
    let mut lines = ByteLineIterator::new(reader);
    let mut intervals = Vec::new();
    let mut records = 0usize;

    while let Some(line) = lines.next_line() {
        let line = line?;
        if is_header(line) {
            continue;
        }
        let parsed = BedRecordView::parse(line)
            .and_then(|view| record_intervals(&view, source_index));
        match parsed {
            Ok(ivs) => {
                records += 1;
                intervals.extend(ivs);
            }
            Err(e) => {
                return Err(ParseError::InvalidBed {
                    line: lines.line_number(),
                    message: e.to_string(),
                })
            }
        }
    }

    debug!(
        "BED source {}: {} records, {} intervals",
        source_index,
        records,
        intervals.len()
    );
    Ok(intervals)
}
