//! TrackLayout - Layout engine for genomic interval tracks
//!
//! Computes everything a plotting backend needs to draw gene/transcript
//! tracks: row assignment, per-chromosome extents, intron shrinking and
//! axis ticks. Drawing itself is left to the caller.
//!
//! # Features
//!
//! - Greedy first-fit row packing backed by per-row interval trees
//! - Stacking of several interval collections on one axis
//! - "Introns off" mode that compresses long flexible introns
//! - Parallel per-chromosome processing with rayon
//! - BED and GFF3/GTF readers with gzip/bzip2 support
//!
//! # Example
//!
//! ```
//! use track_layout::{Interval, LayoutConfig, LayoutEngine, ShrinkThreshold};
//!
//! let intervals = vec![
//!     Interval::new("chr1", 0, 10).with_group("tx1"),
//!     Interval::new("chr1", 20, 35).with_group("tx1"),
//!     Interval::new("chr1", 5, 15).with_group("tx2"),
//! ];
//! let config = LayoutConfig {
//!     shrink: true,
//!     shrink_threshold: ShrinkThreshold::Absolute(5),
//!     ..Default::default()
//! };
//! let layout = LayoutEngine::new(config).run(&intervals).unwrap();
//! assert_eq!(layout.chromosomes[0].layout.row_count, 2);
//! ```

pub mod core;
pub mod formats;

// Re-export commonly used types
pub use core::{
    AxisLimits, ChromosomeTrack, ColorBy, CoordinateRemapper, FeatureKind, Interval,
    IntervalPacker, LayoutConfig, LayoutEngine, LayoutError, ParseError, ShrinkRegion,
    ShrinkRegionCalculator, ShrinkThreshold, Span, Strand, TickRecalculator, TrackLayout,
    TrackLayoutError,
};
pub use formats::{bed, gff, table};
