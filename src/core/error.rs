//! Error types for TrackLayout
//!
//! Defines all error types used throughout the library.

use thiserror::Error;

/// Main error type for TrackLayout operations
#[derive(Debug, Error)]
pub enum TrackLayoutError {
    /// Layout configuration errors
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    /// Input file parsing errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors raised by the layout engine
///
/// These are fatal for a layout call and carry enough context to find
/// the offending source, chromosome or group.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The requested group id column/attribute does not exist in a source
    #[error("Group id column '{column}' not found in source {source_index}")]
    MissingGroupColumn { column: String, source_index: usize },

    /// Transcript structure requested but a source has no feature information
    #[error("Source {source_index} carries no feature kind information (needed for thick CDS)")]
    MissingFeatureColumn { source_index: usize },

    /// Nothing left to lay out once every collection is merged
    #[error("The provided interval collections are empty")]
    EmptyInput,

    /// Zero, negative or non-finite shrink threshold
    #[error("Invalid shrink threshold: {0}")]
    InvalidShrinkThreshold(String),

    /// `max_shown` of zero would hide everything
    #[error("max_shown must be at least 1")]
    InvalidMaxShown,

    /// An input interval with start > end
    #[error("Invalid interval {chromosome}:{start}-{end} in group '{group_id}': start > end")]
    InvalidInterval {
        chromosome: String,
        group_id: String,
        start: u64,
        end: u64,
    },

    /// A span handed to the interval index with start > end
    #[error("Invalid span: start ({start}) > end ({end})")]
    InvalidSpan { start: u64, end: u64 },

    /// Axis limits that resolve to an inverted range
    #[error("Invalid axis limits for {chromosome}: min ({min}) > max ({max})")]
    InvalidAxisLimits { chromosome: String, min: u64, max: u64 },
}

/// Errors that can occur while reading interval files
#[derive(Debug, Error)]
pub enum ParseError {
    /// Invalid BED format
    #[error("Invalid BED format at line {line}: {message}")]
    InvalidBed { line: usize, message: String },

    /// Invalid GFF/GTF format
    #[error("Invalid GFF format at line {line}: {message}")]
    InvalidGff { line: usize, message: String },

    /// Could not decide which reader to use for a file
    #[error("Cannot detect interval format of {0}")]
    UnknownFormat(String),

    /// Layout configuration error detected while reading (e.g. missing id attribute)
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// I/O error during parsing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for TrackLayout operations
pub type Result<T> = std::result::Result<T, TrackLayoutError>;

/// Result type alias for layout operations
pub type LayoutResult<T> = std::result::Result<T, LayoutError>;

/// Result type alias for parsing operations
pub type ParseResult<T> = std::result::Result<T, ParseError>;
