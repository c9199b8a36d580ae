//! GFF3/GTF format reader
//!
//! GFF uses 1-based closed coordinates; intervals are converted to 0-based
//! half-open on the way in. The group id is read from an attribute:
//! `transcript_id` for GTF and `Parent` for GFF3 unless overridden.

use crate::core::{
    ByteLineIterator, FeatureKind, Interval, LayoutError, ParseError, ParseResult, Strand,
};
use log::debug;
use memchr::memchr;
use std::io::BufRead;

/// GFF/GTF parse error
#[derive(Debug, Clone)]
pub enum GffParseError {
    EmptyLine,
    TooFewFields { expected: usize, found: usize },
    InvalidUtf8(&'static str),
    InvalidNumber(&'static str, String),
    InvalidStrand(String),
    InvalidRange { start: u64, end: u64 },
}

impl std::fmt::Display for GffParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GffParseError::EmptyLine => write!(f, "Empty line"),
            GffParseError::TooFewFields { expected, found } => {
                write!(f, "Too few fields: expected {}, found {}", expected, found)
            }
            GffParseError::InvalidUtf8(field) => write!(f, "Invalid UTF-8 in field: {}", field),
            GffParseError::InvalidNumber(field, value) => {
                write!(f, "Invalid number in field {}: {}", field, value)
            }
            GffParseError::InvalidStrand(s) => write!(f, "Invalid strand: {}", s),
            GffParseError::InvalidRange { start, end } => {
                write!(f, "Invalid range: start {} must be >= 1 and <= end {}", start, end)
            }
        }
    }
}

impl std::error::Error for GffParseError {}

/// Attribute syntax of a GFF-family line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GffDialect {
    /// `key "value"; key2 "value2";`
    Gtf,
    /// `key=value;key2=v1,v2`
    Gff3,
}

impl GffDialect {
    /// Guess from an attributes column
    pub fn sniff(attributes: &str) -> Self {
        let first = attributes.split(';').map(str::trim).find(|a| !a.is_empty());
        match first {
            Some(a) if a.contains('=') && !a.contains('"') => GffDialect::Gff3,
            _ => GffDialect::Gtf,
        }
    }

    pub fn default_id_attribute(&self) -> &'static str {
        match self {
            GffDialect::Gtf => "transcript_id",
            GffDialect::Gff3 => "Parent",
        }
    }
}

/// Zero-copy GFF/GTF record view
/// All coordinates are 1-based, closed interval [start, end]
pub struct GffRecordView<'a> {
    pub seqname: &'a str,
    pub feature: &'a str,
    /// Start position (1-based)
    pub start: u64,
    /// End position (1-based, inclusive)
    pub end: u64,
    pub strand: Option<Strand>,
    pub attributes: &'a str,
}

impl<'a> GffRecordView<'a> {
    /// Parse a GFF/GTF line; the nine columns are tab separated
    pub fn parse(line: &'a [u8]) -> Result<Self, GffParseError> {
        if line.is_empty() {
            return Err(GffParseError::EmptyLine);
        }

        let mut field_bounds = Vec::with_capacity(9);
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

        if field_bounds.len() < 9 {
            return Err(GffParseError::TooFewFields {
                expected: 9,
                found: field_bounds.len(),
            });
        }

        let get_field = |idx: usize, name: &'static str| -> Result<&'a str, GffParseError> {
            let (start, end) = field_bounds[idx];
            std::str::from_utf8(&line[start..end]).map_err(|_| GffParseError::InvalidUtf8(name))
        };

        let seqname = get_field(0, "seqname")?;
        let feature = get_field(2, "feature")?;

        let start_str = get_field(3, "start")?;
        let start: u64 = start_str
            .parse()
            .map_err(|_| GffParseError::InvalidNumber("start", start_str.to_string()))?;
        let end_str = get_field(4, "end")?;
        let end: u64 = end_str
            .parse()
            .map_err(|_| GffParseError::InvalidNumber("end", end_str.to_string()))?;
        if start == 0 || start > end {
            return Err(GffParseError::InvalidRange { start, end });
        }

        let strand_char = get_field(6, "strand")?;
        let strand = match strand_char {
            "+" => Some(Strand::Plus),
            "-" => Some(Strand::Minus),
            "." | "?" => None,
            _ => return Err(GffParseError::InvalidStrand(strand_char.to_string())),
        };
        let attributes = get_field(8, "attributes")?;

        Ok(Self {
            seqname,
            feature,
            start,
            end,
            strand,
            attributes,
        })
    }

    /// 0-based half-open start
    pub fn start_0based(&self) -> u64 {
        self.start - 1
    }

    /// Values of attribute `key`; GFF3 value lists yield one entry per item
    pub fn attribute_values(&self, key: &str, dialect: GffDialect) -> Vec<&'a str> {
        let attributes: &'a str = self.attributes;
        for item in attributes.split(';').map(str::trim).filter(|a| !a.is_empty()) {
            let pair = match dialect {
                GffDialect::Gtf => item.split_once(' '),
                GffDialect::Gff3 => item.split_once('='),
            };
            let Some((k, v)) = pair else { continue };
            if k.trim() != key {
                continue;
            }
            let v = v.trim();
            return match dialect {
                GffDialect::Gtf => vec![v.trim_matches('"')],
                GffDialect::Gff3 => v.split(',').filter(|s| !s.is_empty()).collect(),
            };
        }
        Vec::new()
    }
}

/// Options for `read_gff`
#[derive(Debug, Clone, Default)]
pub struct GffOptions {
    /// Attribute holding the group id; dialect default when `None`
    pub id_attribute: Option<String>,
    /// Keep every feature type, not only exon and CDS rows
    pub all_features: bool,
}

/// Read a GFF3/GTF stream, tagging intervals with `source_index`
pub fn read_gff<R: BufRead>(
    reader: R,
    source_index: usize,
    options: &GffOptions,
) -> ParseResult<Vec<Interval>> {
    let mut lines = ByteLineIterator::new(reader);
    let mut dialect: Option<GffDialect> = None;
    let mut intervals = Vec::new();
    let mut kept = 0usize;
    let mut with_id = 0usize;

    while let Some(line) = lines.next_line() {
        let line = line?;
        if line.is_empty() || line.starts_with(b"#") {
            continue;
        }
        let view = match GffRecordView::parse(line) {
            Ok(view) => view,
            Err(e) => {
                let message = e.to_string();
                return Err(ParseError::InvalidGff {
                    line: lines.line_number(),
                    message,
                });
            }
        };

        let kind = FeatureKind::from_label(view.feature);
        if kind == FeatureKind::Other && !options.all_features {
            continue;
        }
        kept += 1;

        let dialect = *dialect.get_or_insert_with(|| GffDialect::sniff(view.attributes));
        let key = options
            .id_attribute
            .as_deref()
            .unwrap_or_else(|| dialect.default_id_attribute());
        let ids = view.attribute_values(key, dialect);

        let base = Interval::new(view.seqname, view.start_0based(), view.end)
            .with_feature(kind)
            .with_source(source_index);
        let base = match view.strand {
            Some(strand) => base.with_strand(strand),
            None => base,
        };

        if ids.is_empty() {
            intervals.push(base);
        } else {
            with_id += 1;
            for id in ids {
                intervals.push(base.clone().with_group(id));
            }
        }
    }

    if kept > 0 && with_id == 0 {
        let column = options
            .id_attribute
            .clone()
            .unwrap_or_else(|| dialect.unwrap_or(GffDialect::Gtf).default_id_attribute().to_string());
        return Err(LayoutError::MissingGroupColumn {
            column,
            source_index,
        }
        .into());
    }

    debug!(
        "GFF source {}: {} rows kept, {} intervals",
        source_index,
        kept,
        intervals.len()
    );
    Ok(intervals)
}
