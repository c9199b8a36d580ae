//! Layout engine entry point
//!
//! The pipeline, run once per call with no state kept in between:
//! 1. Validate configuration and input
//! 2. Group intervals (with the `max_shown` cutoff)
//! 3. Per chromosome: pack and stack sources, aggregate extents,
//!    optionally shrink, remap, recompute ticks
//! 4. Derive render shapes per group
//!
//! Chromosomes are processed in parallel with rayon; results are collected
//! in chromosome order so the output does not depend on scheduling.

use crate::core::error::{LayoutError, LayoutResult};
use crate::core::group::{effective_group_id, ColorBy, GroupArena, SubsetReport};
use crate::core::interval::{is_exon_like, FeatureKind, Interval, Span, Strand};
use crate::core::layout::{AxisLimits, ChromosomeLayout, ChromosomeLayoutAggregator};
use crate::core::packer::{IntervalPacker, PackingMode};
use crate::core::remap::CoordinateRemapper;
use crate::core::shape::{render_shape, RenderShape};
use crate::core::shrink::{GroupBlocks, ShrinkRegion, ShrinkRegionCalculator, ShrinkThreshold};
use crate::core::ticks::{TickMapping, TickRecalculator, DEFAULT_NUM_TICKS};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};

/// Default cap on groups shown per source
pub const DEFAULT_MAX_SHOWN: usize = 25;

/// Everything the engine needs to know besides the intervals
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Share rows between non-overlapping groups
    pub packed: bool,
    /// Compress flexible introns
    pub shrink: bool,
    pub shrink_threshold: ShrinkThreshold,
    pub axis_limits: AxisLimits,
    /// Groups kept per source; `None` keeps all
    pub max_shown: Option<usize>,
    /// Draw UTR/CDS transcript structure
    pub thick_cds: bool,
    pub color_by: ColorBy,
    /// Vertical space per row
    pub v_space: f64,
    pub num_ticks: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            packed: true,
            shrink: false,
            shrink_threshold: ShrinkThreshold::default(),
            axis_limits: AxisLimits::Auto,
            max_shown: Some(DEFAULT_MAX_SHOWN),
            thick_cds: false,
            color_by: ColorBy::GroupId,
            v_space: 1.0,
            num_ticks: DEFAULT_NUM_TICKS,
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> LayoutResult<()> {
        self.shrink_threshold.validate()?;
        if self.max_shown == Some(0) {
            return Err(LayoutError::InvalidMaxShown);
        }
        Ok(())
    }
}

/// An input interval with its row and display coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedInterval {
    /// Position in the slice given to `LayoutEngine::run`
    pub input_index: usize,
    pub chromosome: String,
    pub source_index: usize,
    /// Slot in `TrackLayout::groups`
    pub group_index: usize,
    pub row: usize,
    /// Display start (equals `original_start` unless shrunk)
    pub start: u64,
    /// Display end (equals `original_end` unless shrunk)
    pub end: u64,
    pub original_start: u64,
    pub original_end: u64,
    pub strand: Option<Strand>,
    pub feature_kind: Option<FeatureKind>,
}

/// A group with its row and shape
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedGroup {
    pub group_id: String,
    pub chromosome: String,
    pub source_index: usize,
    /// Original `(min start, max end)`
    pub span: Span,
    pub display_span: Span,
    pub row: usize,
    /// `row * v_space`
    pub y: f64,
    pub color_tag: String,
    pub shape: RenderShape,
}

/// Everything laid out for one chromosome
#[derive(Debug, Clone, PartialEq)]
pub struct ChromosomeTrack {
    pub layout: ChromosomeLayout,
    pub shrink_regions: Vec<ShrinkRegion>,
    pub ticks: TickMapping,
    /// Resolved shrink threshold in bp, when shrinking
    pub threshold: Option<u64>,
}

/// Output handed to a rendering backend
#[derive(Debug, Clone, PartialEq)]
pub struct TrackLayout {
    /// Kept intervals in input order
    pub intervals: Vec<PlacedInterval>,
    pub groups: Vec<PlacedGroup>,
    /// Sorted by chromosome name
    pub chromosomes: Vec<ChromosomeTrack>,
    pub subsets: Vec<SubsetReport>,
    /// Distinct colour tags in group order
    pub color_tags: Vec<String>,
}

impl TrackLayout {
    pub fn chromosome(&self, name: &str) -> Option<&ChromosomeTrack> {
        self.chromosomes
            .binary_search_by(|t| t.layout.chromosome.as_str().cmp(name))
            .ok()
            .map(|i| &self.chromosomes[i])
    }

    /// Sum of chromosome heights
    pub fn total_height(&self) -> f64 {
        self.chromosomes.iter().map(|t| t.layout.height).sum()
    }

    /// Number of groups hidden by `max_shown` across all sources
    pub fn hidden_groups(&self) -> usize {
        self.subsets.iter().map(|s| s.hidden_groups()).sum()
    }

    pub fn placed_for_group(&self, group_index: usize) -> impl Iterator<Item = &PlacedInterval> {
        self.intervals
            .iter()
            .filter(move |p| p.group_index == group_index)
    }
}

/// Result of one chromosome, merged into `TrackLayout` afterwards
struct ChromosomeOutcome {
    track: ChromosomeTrack,
    /// `(group slot, row)`
    rows: Vec<(usize, usize)>,
    /// `(interval index, display start, display end)`
    remapped: Vec<(usize, u64, u64)>,
}

/// Runs the layout pipeline
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out `intervals` (already tagged with their `source_index`)
    pub fn run(&self, intervals: &[Interval]) -> LayoutResult<TrackLayout> {
        self.config.validate()?;
        if intervals.is_empty() {
            return Err(LayoutError::EmptyInput);
        }
        validate_intervals(intervals)?;
        if self.config.thick_cds {
            check_feature_kinds(intervals)?;
        }

        let arena = GroupArena::build(intervals, self.config.max_shown, self.config.color_by);
        for report in &arena.subsets {
            if report.hidden_groups() > 0 {
                warn!(
                    "Source {}: showing {} of {} groups (max_shown cutoff)",
                    report.source_index, report.shown_groups, report.total_groups
                );
            }
        }

        let mut by_chrom: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (slot, group) in arena.groups.iter().enumerate() {
            by_chrom.entry(group.chromosome.as_str()).or_default().push(slot);
        }
        let chroms: Vec<(&str, Vec<usize>)> = by_chrom.into_iter().collect();

        let outcomes: Vec<ChromosomeOutcome> = chroms
            .par_iter()
            .map(|(chrom, slots)| self.layout_chromosome(chrom, slots, &arena, intervals))
            .collect::<LayoutResult<Vec<_>>>()?
            .into_iter()
            .flatten()
            .collect();

        let mut rows = vec![0usize; arena.len()];
        let mut display: HashMap<usize, (u64, u64)> = HashMap::with_capacity(intervals.len());
        let mut chromosomes = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            for (slot, row) in outcome.rows {
                rows[slot] = row;
            }
            for (i, s, e) in outcome.remapped {
                display.insert(i, (s, e));
            }
            chromosomes.push(outcome.track);
        }

        let placed: Vec<PlacedInterval> = intervals
            .iter()
            .enumerate()
            .filter_map(|(i, iv)| {
                let slot = arena.slot_of[i]?;
                let (start, end) = display.get(&i).copied().unwrap_or((iv.start, iv.end));
                Some(PlacedInterval {
                    input_index: i,
                    chromosome: iv.chromosome.clone(),
                    source_index: iv.source_index,
                    group_index: slot,
                    row: rows[slot],
                    start,
                    end,
                    original_start: iv.start,
                    original_end: iv.end,
                    strand: iv.strand,
                    feature_kind: iv.feature_kind,
                })
            })
            .collect();

        let groups: Vec<PlacedGroup> = arena
            .groups
            .iter()
            .enumerate()
            .map(|(slot, group)| {
                let members: Vec<(u64, u64, Option<FeatureKind>)> = group
                    .members
                    .iter()
                    .map(|&i| {
                        let (s, e) = display
                            .get(&i)
                            .copied()
                            .unwrap_or((intervals[i].start, intervals[i].end));
                        (s, e, intervals[i].feature_kind)
                    })
                    .collect();
                let display_span = Span::new(
                    members.iter().map(|m| m.0).min().unwrap_or(group.span.start),
                    members.iter().map(|m| m.1).max().unwrap_or(group.span.end),
                );
                PlacedGroup {
                    group_id: group.group_id.clone(),
                    chromosome: group.chromosome.clone(),
                    source_index: group.source_index,
                    span: group.span,
                    display_span,
                    row: rows[slot],
                    y: rows[slot] as f64 * self.config.v_space,
                    color_tag: group.color_tag.clone(),
                    shape: render_shape(&members, self.config.thick_cds),
                }
            })
            .collect();

        info!(
            "Laid out {} intervals in {} groups on {} chromosomes",
            placed.len(),
            groups.len(),
            chromosomes.len()
        );

        Ok(TrackLayout {
            intervals: placed,
            groups,
            chromosomes,
            subsets: arena.subsets.clone(),
            color_tags: arena.color_tags(),
        })
    }

    fn layout_chromosome(
        &self,
        chrom: &str,
        slots: &[usize],
        arena: &GroupArena,
        intervals: &[Interval],
    ) -> LayoutResult<Option<ChromosomeOutcome>> {
        // source partitions, groups in arrival order
        let mut partitions: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for &slot in slots {
            partitions
                .entry(arena.groups[slot].source_index)
                .or_default()
                .push(slot);
        }
        let packer_input: Vec<(usize, Vec<Span>)> = partitions
            .iter()
            .map(|(&source, members)| {
                (source, members.iter().map(|&s| arena.groups[s].span).collect())
            })
            .collect();

        let packer = IntervalPacker::new(PackingMode::from_packed(self.config.packed));
        let stacked = packer.stack(&packer_input)?;

        let rows: Vec<(usize, usize)> = partitions
            .values()
            .zip(&stacked.rows)
            .flat_map(|(members, rows)| members.iter().copied().zip(rows.iter().copied()))
            .collect();

        let member_ids: Vec<usize> = slots
            .iter()
            .flat_map(|&slot| arena.groups[slot].members.iter().copied())
            .collect();

        let aggregator = ChromosomeLayoutAggregator::new(&self.config.axis_limits, self.config.v_space);
        let Some(mut layout) =
            aggregator.aggregate(chrom, member_ids.iter().map(|&i| &intervals[i]), &stacked)?
        else {
            return Ok(None);
        };

        let (threshold, shrink_regions) = if self.config.shrink {
            let threshold = self.config.shrink_threshold.resolve(layout.span());
            let blocks: Vec<GroupBlocks> = slots
                .iter()
                .map(|&slot| {
                    arena.groups[slot]
                        .members
                        .iter()
                        .map(|&i| &intervals[i])
                        .filter(|iv| is_exon_like(iv.feature_kind))
                        .map(|iv| iv.span())
                        .collect()
                })
                .collect();
            let regions = ShrinkRegionCalculator::new(threshold).compute(chrom, &blocks);
            (Some(threshold), regions)
        } else {
            (None, Vec::new())
        };

        let ticks = TickRecalculator::new(self.config.num_ticks).compute(
            layout.min,
            layout.max,
            &shrink_regions,
        );

        let remapper = CoordinateRemapper::new(&shrink_regions);
        let remapped: Vec<(usize, u64, u64)> = member_ids
            .iter()
            .map(|&i| {
                let (s, e) = remapper.remap_span(intervals[i].start, intervals[i].end);
                (i, s, e)
            })
            .collect();
        layout.min = remapper.remap(layout.min);
        layout.max = remapper.remap(layout.max);

        debug!(
            "{}: {} groups, {} rows, {} shrink regions (threshold {:?})",
            chrom,
            slots.len(),
            layout.row_count,
            shrink_regions.len(),
            threshold
        );

        Ok(Some(ChromosomeOutcome {
            track: ChromosomeTrack {
                layout,
                shrink_regions,
                ticks,
                threshold,
            },
            rows,
            remapped,
        }))
    }
}

fn validate_intervals(intervals: &[Interval]) -> LayoutResult<()> {
    let mut position: HashMap<usize, usize> = HashMap::new();
    for iv in intervals {
        let pos = position.entry(iv.source_index).or_insert(0);
        if iv.start > iv.end {
            return Err(LayoutError::InvalidInterval {
                chromosome: iv.chromosome.clone(),
                group_id: effective_group_id(iv, *pos),
                start: iv.start,
                end: iv.end,
            });
        }
        *pos += 1;
    }
    Ok(())
}

fn check_feature_kinds(intervals: &[Interval]) -> LayoutResult<()> {
    let mut typed: BTreeMap<usize, bool> = BTreeMap::new();
    for iv in intervals {
        *typed.entry(iv.source_index).or_insert(false) |= iv.feature_kind.is_some();
    }
    match typed.into_iter().find(|&(_, has)| !has) {
        Some((source_index, _)) => Err(LayoutError::MissingFeatureColumn { source_index }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::interval::tag_sources;

    fn exon(chrom: &str, start: u64, end: u64, id: &str) -> Interval {
        Interval::new(chrom, start, end).with_group(id)
    }

    #[test]
    fn test_packing_scenario() {
        let intervals = vec![
            exon("chr1", 0, 10, "A"),
            exon("chr1", 5, 15, "B"),
            exon("chr1", 20, 30, "C"),
        ];
        let layout = LayoutEngine::default().run(&intervals).unwrap();
        let rows: Vec<usize> = layout.groups.iter().map(|g| g.row).collect();
        assert_eq!(rows, vec![0, 1, 0]);
        assert_eq!(layout.chromosomes[0].layout.row_count, 2);
    }

    #[test]
    fn test_shrink_scenario() {
        let intervals = vec![
            exon("1", 0, 10, "t1"),
            exon("1", 20, 35, "t1"),
            exon("1", 40, 50, "t1"),
        ];
        let config = LayoutConfig {
            shrink: true,
            shrink_threshold: ShrinkThreshold::Absolute(5),
            ..Default::default()
        };
        let layout = LayoutEngine::new(config).run(&intervals).unwrap();
        let coords: Vec<(u64, u64)> = layout.intervals.iter().map(|p| (p.start, p.end)).collect();
        assert_eq!(coords, vec![(0, 10), (15, 30), (35, 45)]);
        let originals: Vec<(u64, u64)> = layout
            .intervals
            .iter()
            .map(|p| (p.original_start, p.original_end))
            .collect();
        assert_eq!(originals, vec![(0, 10), (20, 35), (40, 50)]);
        let track = layout.chromosome("1").unwrap();
        assert_eq!(track.shrink_regions.len(), 1);
        assert_eq!(track.threshold, Some(5));
        assert_eq!((track.layout.min, track.layout.max), (0, 45));
    }

    #[test]
    fn test_multi_source_stacking() {
        let intervals = tag_sources(vec![
            vec![exon("chr1", 0, 10, "a"), exon("chr1", 5, 15, "b")],
            vec![exon("chr1", 0, 10, "c")],
        ]);
        let layout = LayoutEngine::default().run(&intervals).unwrap();
        let rows: Vec<usize> = layout.groups.iter().map(|g| g.row).collect();
        assert_eq!(rows, vec![0, 1, 2]);
        let track = &layout.chromosomes[0];
        assert_eq!(track.layout.row_count, 3);
        assert_eq!(track.layout.separator_rows(), vec![2]);
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            LayoutEngine::default().run(&[]),
            Err(LayoutError::EmptyInput)
        ));
    }

    #[test]
    fn test_invalid_interval_names_group() {
        let err = LayoutEngine::default()
            .run(&[exon("chr7", 50, 10, "tx9")])
            .unwrap_err();
        match err {
            LayoutError::InvalidInterval { chromosome, group_id, .. } => {
                assert_eq!(chromosome, "chr7");
                assert_eq!(group_id, "tx9");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_config() {
        let config = LayoutConfig {
            shrink_threshold: ShrinkThreshold::Fraction(-0.5),
            ..Default::default()
        };
        assert!(matches!(
            LayoutEngine::new(config).run(&[exon("1", 0, 1, "a")]),
            Err(LayoutError::InvalidShrinkThreshold(_))
        ));
        let config = LayoutConfig {
            max_shown: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            LayoutEngine::new(config).run(&[exon("1", 0, 1, "a")]),
            Err(LayoutError::InvalidMaxShown)
        ));
    }

    #[test]
    fn test_thick_cds_needs_feature_kinds() {
        let config = LayoutConfig {
            thick_cds: true,
            ..Default::default()
        };
        let intervals = tag_sources(vec![
            vec![exon("1", 0, 10, "a").with_feature(FeatureKind::Exon)],
            vec![exon("1", 0, 10, "b")],
        ]);
        assert!(matches!(
            LayoutEngine::new(config).run(&intervals),
            Err(LayoutError::MissingFeatureColumn { source_index: 1 })
        ));
    }

    #[test]
    fn test_max_shown_drops_intervals() {
        let config = LayoutConfig {
            max_shown: Some(1),
            ..Default::default()
        };
        let intervals = vec![exon("1", 0, 10, "a"), exon("1", 20, 30, "b")];
        let layout = LayoutEngine::new(config).run(&intervals).unwrap();
        assert_eq!(layout.intervals.len(), 1);
        assert_eq!(layout.hidden_groups(), 1);
        assert_eq!(layout.chromosomes[0].layout.data_max, 10);
    }

    #[test]
    fn test_other_features_do_not_block_shrink() {
        let intervals = vec![
            exon("1", 0, 100, "t1").with_feature(FeatureKind::Other),
            exon("1", 0, 10, "t1").with_feature(FeatureKind::Exon),
            exon("1", 90, 100, "t1").with_feature(FeatureKind::Exon),
        ];
        let config = LayoutConfig {
            shrink: true,
            shrink_threshold: ShrinkThreshold::Absolute(10),
            ..Default::default()
        };
        let layout = LayoutEngine::new(config).run(&intervals).unwrap();
        let track = layout.chromosome("1").unwrap();
        assert_eq!(track.shrink_regions.len(), 1);
        assert_eq!(track.shrink_regions[0].delta, 70);
        assert_eq!((layout.intervals[0].start, layout.intervals[0].end), (0, 30));
    }
}
