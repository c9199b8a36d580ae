//! File format adapters
//!
//! Readers for interval tracks (BED, GFF3/GTF) and TSV writers for layouts.

pub mod bed;
pub mod gff;
pub mod table;

pub use bed::{read_bed, BedParseError, BedRecordView};
pub use gff::{read_gff, GffDialect, GffOptions, GffParseError, GffRecordView};
pub use table::{write_layout, write_regions};

use crate::core::{open_input, Interval, ParseError, ParseResult};
use std::path::Path;

/// Input track format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackFormat {
    /// Decide from the file extension
    #[default]
    Auto,
    Bed,
    Gff,
}

impl TrackFormat {
    /// Format implied by a file name, ignoring a compression suffix
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        let name = name
            .strip_suffix(".gz")
            .or_else(|| name.strip_suffix(".bgz"))
            .or_else(|| name.strip_suffix(".bz2"))
            .unwrap_or(&name);
        let ext = name.rsplit_once('.')?.1;
        match ext {
            "bed" | "bed3" | "bed4" | "bed6" | "bed12" => Some(TrackFormat::Bed),
            "gff" | "gff3" | "gtf" => Some(TrackFormat::Gff),
            _ => None,
        }
    }
}

/// Read one track file (plain or compressed) as collection `source_index`
pub fn read_track<P: AsRef<Path>>(
    path: P,
    format: TrackFormat,
    gff_options: &GffOptions,
    source_index: usize,
) -> ParseResult<Vec<Interval>> {
    let path = path.as_ref();
    let format = match format {
        TrackFormat::Auto => TrackFormat::from_path(path)
            .ok_or_else(|| ParseError::UnknownFormat(path.display().to_string()))?,
        other => other,
    };
    let reader = open_input(path)?;
    match format {
        TrackFormat::Gff => read_gff(reader, source_index, gff_options),
        _ => read_bed(reader, source_index),
    }
}
