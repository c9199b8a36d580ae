//! Core layout functionality
//!
//! This module contains the interval model, the row index and packer,
//! intron shrinking, coordinate remapping and the layout engine.

mod engine;
mod error;
mod group;
mod index;
mod interval;
pub mod io;
mod layout;
mod packer;
mod remap;
mod shape;
mod shrink;
mod ticks;

pub use engine::{
    ChromosomeTrack, LayoutConfig, LayoutEngine, PlacedGroup, PlacedInterval, TrackLayout,
    DEFAULT_MAX_SHOWN,
};
pub use error::{
    LayoutError, LayoutResult, ParseError, ParseResult, Result, TrackLayoutError,
};
pub use group::{effective_group_id, ColorBy, Group, GroupArena, SubsetReport};
pub use index::{IntervalIndex, RowInterval};
pub use interval::{is_exon_like, tag_sources, FeatureKind, Interval, Span, Strand};
pub use io::{detect_compression, open_input, ByteLineIterator, CompressionFormat, SmartReader};
pub use layout::{AxisLimits, ChromosomeLayout, ChromosomeLayoutAggregator, LimitPair, ResolvedLimits};
pub use packer::{IntervalPacker, PackedRows, PackingMode, SourceBoundary, StackedRows};
pub use remap::CoordinateRemapper;
pub use shape::{render_shape, BlockWidth, RenderShape, ShapeBlock};
pub use shrink::{
    introns, merge_spans, GroupBlocks, ShrinkRegion, ShrinkRegionCalculator, ShrinkThreshold,
};
pub use ticks::{Tick, TickMapping, TickRecalculator, DEFAULT_NUM_TICKS};
