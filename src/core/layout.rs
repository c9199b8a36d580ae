//! Per-chromosome plotting extents
//!
//! Turns packed rows into one `ChromosomeLayout` per chromosome: the data
//! extent, the displayed extent (after axis-limit overrides), the number of
//! stacked rows and where each source starts.

use crate::core::error::{LayoutError, LayoutResult};
use crate::core::interval::Interval;
use crate::core::packer::{SourceBoundary, StackedRows};
use std::collections::HashMap;

/// Optional `(min, max)` pair; a missing side falls back to the data extent
pub type LimitPair = (Option<u64>, Option<u64>);

/// Caller-supplied axis limits
#[derive(Debug, Clone, Default)]
pub enum AxisLimits {
    /// Data-derived extents only
    #[default]
    Auto,
    /// Same limits for every chromosome
    Fixed(LimitPair),
    /// Limits for some chromosomes; unlisted ones are data-derived
    PerChromosome(HashMap<String, LimitPair>),
    /// Extents of a second reference collection (min start / max end per chromosome)
    Reference(Vec<Interval>),
}

/// Axis limits resolved to a per-chromosome lookup
#[derive(Debug, Clone)]
pub struct ResolvedLimits {
    fixed: Option<LimitPair>,
    per_chrom: HashMap<String, LimitPair>,
}

impl AxisLimits {
    pub fn resolve(&self) -> ResolvedLimits {
        match self {
            AxisLimits::Auto => ResolvedLimits {
                fixed: None,
                per_chrom: HashMap::new(),
            },
            AxisLimits::Fixed(pair) => ResolvedLimits {
                fixed: Some(*pair),
                per_chrom: HashMap::new(),
            },
            AxisLimits::PerChromosome(map) => ResolvedLimits {
                fixed: None,
                per_chrom: map.clone(),
            },
            AxisLimits::Reference(intervals) => {
                let mut per_chrom: HashMap<String, LimitPair> = HashMap::new();
                for iv in intervals {
                    let entry = per_chrom
                        .entry(iv.chromosome.clone())
                        .or_insert((Some(iv.start), Some(iv.end)));
                    entry.0 = entry.0.map(|m| m.min(iv.start));
                    entry.1 = entry.1.map(|m| m.max(iv.end));
                }
                ResolvedLimits {
                    fixed: None,
                    per_chrom,
                }
            }
        }
    }
}

impl ResolvedLimits {
    /// Limits requested for a chromosome, if any side was given
    pub fn get(&self, chromosome: &str) -> LimitPair {
        self.per_chrom
            .get(chromosome)
            .copied()
            .or(self.fixed)
            .unwrap_or((None, None))
    }
}

/// Layout extents of one chromosome
#[derive(Debug, Clone, PartialEq)]
pub struct ChromosomeLayout {
    pub chromosome: String,
    /// Smallest interval start on the chromosome (original coordinates)
    pub data_min: u64,
    /// Largest interval end on the chromosome (original coordinates)
    pub data_max: u64,
    /// Displayed lower extent
    pub min: u64,
    /// Displayed upper extent
    pub max: u64,
    /// Rows across all stacked sources
    pub row_count: usize,
    pub source_boundaries: Vec<SourceBoundary>,
    /// `row_count * v_space`
    pub height: f64,
}

impl ChromosomeLayout {
    /// Rows at which a separator line is drawn (every source start but the first)
    pub fn separator_rows(&self) -> Vec<usize> {
        self.source_boundaries
            .iter()
            .skip(1)
            .map(|b| b.first_row)
            .collect()
    }

    /// Span of the data in original coordinates
    pub fn data_span(&self) -> u64 {
        self.data_max - self.data_min
    }

    /// Width of the axis, `max - min`, after limits are applied
    pub fn span(&self) -> u64 {
        self.max.saturating_sub(self.min)
    }
}

/// Derives `ChromosomeLayout`s
#[derive(Debug, Clone)]
pub struct ChromosomeLayoutAggregator {
    limits: ResolvedLimits,
    v_space: f64,
}

impl ChromosomeLayoutAggregator {
    pub fn new(limits: &AxisLimits, v_space: f64) -> Self {
        Self {
            limits: limits.resolve(),
            v_space,
        }
    }

    /// Build the layout of one chromosome.
    ///
    /// Returns `Ok(None)` when the chromosome has no intervals.
    pub fn aggregate<'a, I>(
        &self,
        chromosome: &str,
        intervals: I,
        stacked: &StackedRows,
    ) -> LayoutResult<Option<ChromosomeLayout>>
    where
        I: IntoIterator<Item = &'a Interval>,
    {
        let mut extent: Option<(u64, u64)> = None;
        for iv in intervals {
            extent = Some(match extent {
                None => (iv.start, iv.end),
                Some((lo, hi)) => (lo.min(iv.start), hi.max(iv.end)),
            });
        }
        let Some((data_min, data_max)) = extent else {
            return Ok(None);
        };

        let (lim_min, lim_max) = self.limits.get(chromosome);
        let min = lim_min.unwrap_or(data_min);
        let max = lim_max.unwrap_or(data_max);
        if min > max {
            return Err(LayoutError::InvalidAxisLimits {
                chromosome: chromosome.to_string(),
                min,
                max,
            });
        }

        Ok(Some(ChromosomeLayout {
            chromosome: chromosome.to_string(),
            data_min,
            data_max,
            min,
            max,
            row_count: stacked.row_count,
            source_boundaries: stacked.source_boundaries.clone(),
            height: stacked.row_count as f64 * self.v_space,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stacked(row_count: usize) -> StackedRows {
        StackedRows {
            rows: vec![],
            row_count,
            source_boundaries: vec![SourceBoundary {
                source_index: 0,
                first_row: 0,
                row_count,
            }],
        }
    }

    fn data() -> Vec<Interval> {
        vec![
            Interval::new("chr1", 100, 200),
            Interval::new("chr1", 50, 120),
            Interval::new("chr1", 300, 450),
        ]
    }

    #[test]
    fn test_data_derived_extent() {
        let agg = ChromosomeLayoutAggregator::new(&AxisLimits::Auto, 2.0);
        let layout = agg.aggregate("chr1", &data(), &stacked(3)).unwrap().unwrap();
        assert_eq!((layout.data_min, layout.data_max), (50, 450));
        assert_eq!((layout.min, layout.max), (50, 450));
        assert_eq!(layout.row_count, 3);
        assert_eq!(layout.height, 6.0);
    }

    #[test]
    fn test_fixed_limits_with_missing_side() {
        let agg = ChromosomeLayoutAggregator::new(&AxisLimits::Fixed((Some(0), None)), 1.0);
        let layout = agg.aggregate("chr1", &data(), &stacked(1)).unwrap().unwrap();
        assert_eq!((layout.min, layout.max), (0, 450));
        assert_eq!(layout.span(), 450);
        assert_eq!(layout.data_span(), 400);
    }

    #[test]
    fn test_per_chromosome_limits_fall_back() {
        let mut map = HashMap::new();
        map.insert("chr2".to_string(), (Some(1), Some(2)));
        let agg = ChromosomeLayoutAggregator::new(&AxisLimits::PerChromosome(map), 1.0);
        let layout = agg.aggregate("chr1", &data(), &stacked(1)).unwrap().unwrap();
        assert_eq!((layout.min, layout.max), (50, 450));
    }

    #[test]
    fn test_reference_limits() {
        let reference = vec![
            Interval::new("chr1", 10, 20),
            Interval::new("chr1", 900, 1000),
            Interval::new("chr3", 0, 5),
        ];
        let agg = ChromosomeLayoutAggregator::new(&AxisLimits::Reference(reference), 1.0);
        let layout = agg.aggregate("chr1", &data(), &stacked(1)).unwrap().unwrap();
        assert_eq!((layout.min, layout.max), (10, 1000));
    }

    #[test]
    fn test_inverted_limits_rejected() {
        let agg = ChromosomeLayoutAggregator::new(&AxisLimits::Fixed((Some(500), Some(10))), 1.0);
        let err = agg.aggregate("chr1", &data(), &stacked(1)).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidAxisLimits { ref chromosome, .. } if chromosome == "chr1"));
    }

    #[test]
    fn test_no_intervals_no_layout() {
        let agg = ChromosomeLayoutAggregator::new(&AxisLimits::Auto, 1.0);
        let empty: Vec<Interval> = vec![];
        assert!(agg.aggregate("chr1", &empty, &stacked(0)).unwrap().is_none());
    }

    #[test]
    fn test_separator_rows() {
        let layout = ChromosomeLayout {
            chromosome: "chr1".into(),
            data_min: 0,
            data_max: 1,
            min: 0,
            max: 1,
            row_count: 5,
            source_boundaries: vec![
                SourceBoundary { source_index: 0, first_row: 0, row_count: 2 },
                SourceBoundary { source_index: 2, first_row: 2, row_count: 3 },
            ],
            height: 5.0,
        };
        assert_eq!(layout.separator_rows(), vec![2]);
    }
}
