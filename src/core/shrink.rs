//! Shrinkable region detection ("introns off")
//!
//! Per chromosome:
//! 1. Introns are gaps between consecutive exon-like blocks of the same group
//! 2. Flexible introns are introns minus exon coverage from any group
//! 3. Flexible introns are merged into disjoint regions
//! 4. Regions longer than the threshold are kept; the threshold stays visible
//! 5. `cumulative_delta` is the running sum of `length - threshold`

use crate::core::error::{LayoutError, LayoutResult};
use crate::core::interval::Span;
use rust_lapper::{Interval, Lapper};
use std::fmt;
use std::str::FromStr;

/// Visible margin kept for each shrunk region
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShrinkThreshold {
    /// Base pairs
    Absolute(u64),
    /// Fraction of the chromosome's data span
    Fraction(f64),
}

impl Default for ShrinkThreshold {
    fn default() -> Self {
        ShrinkThreshold::Fraction(0.01)
    }
}

impl ShrinkThreshold {
    /// Reject zero, negative and non-finite thresholds
    pub fn validate(&self) -> LayoutResult<()> {
        match *self {
            ShrinkThreshold::Absolute(0) => Err(LayoutError::InvalidShrinkThreshold(
                "absolute threshold must be positive".to_string(),
            )),
            ShrinkThreshold::Fraction(f) if !f.is_finite() || f <= 0.0 => Err(
                LayoutError::InvalidShrinkThreshold(format!("fraction must be positive, got {}", f)),
            ),
            _ => Ok(()),
        }
    }

    /// Threshold in base pairs for a chromosome spanning `span` bp
    ///
    /// # Examples
    /// ```
    /// use track_layout::core::ShrinkThreshold;
    /// assert_eq!(ShrinkThreshold::Absolute(50).resolve(1_000), 50);
    /// assert_eq!(ShrinkThreshold::Fraction(0.04).resolve(1_000), 40);
    /// ```
    pub fn resolve(&self, span: u64) -> u64 {
        match *self {
            ShrinkThreshold::Absolute(bp) => bp,
            ShrinkThreshold::Fraction(f) => (f * span as f64).floor() as u64,
        }
    }
}

impl FromStr for ShrinkThreshold {
    type Err = LayoutError;

    /// Integer text is absolute, decimal text is a fraction
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let threshold = if s.contains(|c: char| matches!(c, '.' | 'e' | 'E')) {
            s.parse::<f64>()
                .map(ShrinkThreshold::Fraction)
                .map_err(|_| LayoutError::InvalidShrinkThreshold(s.to_string()))?
        } else {
            s.parse::<u64>()
                .map(ShrinkThreshold::Absolute)
                .map_err(|_| LayoutError::InvalidShrinkThreshold(s.to_string()))?
        };
        threshold.validate()?;
        Ok(threshold)
    }
}

impl fmt::Display for ShrinkThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShrinkThreshold::Absolute(bp) => write!(f, "{}bp", bp),
            ShrinkThreshold::Fraction(frac) => write!(f, "{}", frac),
        }
    }
}

/// A compressed span on a chromosome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShrinkRegion {
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
    /// `length - threshold`
    pub delta: u64,
    /// Sum of `delta` over this and all earlier regions
    pub cumulative_delta: u64,
    /// Where the band starts once shrunk
    pub display_start: u64,
    /// Where the band ends once shrunk
    pub display_end: u64,
}

impl ShrinkRegion {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// Rendered width after shrinking
    pub fn clamped_width(&self) -> u64 {
        self.len() - self.delta
    }
}

/// Exon-like blocks of one group
pub type GroupBlocks = Vec<Span>;

/// Computes shrink regions for one chromosome
#[derive(Debug, Clone, Copy)]
pub struct ShrinkRegionCalculator {
    threshold: u64,
}

impl ShrinkRegionCalculator {
    /// `threshold` is already resolved to base pairs for the chromosome
    pub fn new(threshold: u64) -> Self {
        Self { threshold }
    }

    /// Compute the regions of `chromosome`.
    ///
    /// `groups` holds the exon-like blocks of every group (any source) on the
    /// chromosome; they double as the coverage that flexible introns are
    /// trimmed against.
    pub fn compute(&self, chromosome: &str, groups: &[GroupBlocks]) -> Vec<ShrinkRegion> {
        let introns: Vec<Span> = groups.iter().flat_map(|g| introns(g)).collect();
        if introns.is_empty() {
            return Vec::new();
        }

        let coverage: Vec<Interval<u64, ()>> = groups
            .iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .map(|s| Interval {
                start: s.start,
                stop: s.end,
                val: (),
            })
            .collect();
        let mut coverage = Lapper::new(coverage);
        coverage.merge_overlaps();

        let flexible: Vec<Span> = introns
            .iter()
            .flat_map(|intron| subtract(intron, &coverage))
            .collect();

        let candidates: Vec<Span> = merge_spans(flexible)
            .into_iter()
            .filter(|s| s.len() > self.threshold)
            .collect();

        self.accumulate(chromosome, candidates)
    }

    fn accumulate(&self, chromosome: &str, candidates: Vec<Span>) -> Vec<ShrinkRegion> {
        assert!(
            candidates.windows(2).all(|w| w[0].end <= w[1].start),
            "shrink regions on {} are unsorted or overlapping",
            chromosome
        );

        let mut cumulative = 0u64;
        candidates
            .into_iter()
            .map(|span| {
                let delta = span.len() - self.threshold;
                let before = cumulative;
                cumulative += delta;
                ShrinkRegion {
                    chromosome: chromosome.to_string(),
                    start: span.start,
                    end: span.end,
                    delta,
                    cumulative_delta: cumulative,
                    display_start: span.start - before,
                    display_end: span.end - cumulative,
                }
            })
            .collect()
    }
}

/// Gaps between consecutive blocks of one group, after merging overlaps
pub fn introns(blocks: &[Span]) -> Vec<Span> {
    let mut sorted: Vec<Span> = blocks.to_vec();
    sorted.sort();

    let mut out = Vec::new();
    let mut reach: Option<u64> = None;
    for block in sorted {
        if let Some(end) = reach {
            if block.start > end {
                out.push(Span::new(end, block.start));
            }
        }
        reach = Some(reach.map_or(block.end, |end| end.max(block.end)));
    }
    out
}

/// Parts of `span` not covered by the (merged) coverage tree
fn subtract(span: &Span, coverage: &Lapper<u64, ()>) -> Vec<Span> {
    let mut hits: Vec<(u64, u64)> = coverage
        .find(span.start, span.end)
        .map(|iv| (iv.start, iv.stop))
        .collect();
    hits.sort();

    let mut out = Vec::new();
    let mut cursor = span.start;
    for (start, stop) in hits {
        if start > cursor {
            out.push(Span::new(cursor, start.min(span.end)));
        }
        cursor = cursor.max(stop);
        if cursor >= span.end {
            break;
        }
    }
    if cursor < span.end {
        out.push(Span::new(cursor, span.end));
    }
    out
}

/// Merge overlapping or touching spans into a sorted disjoint list
pub fn merge_spans(mut spans: Vec<Span>) -> Vec<Span> {
    spans.retain(|s| !s.is_empty());
    spans.sort();
    let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }
    merged
}
