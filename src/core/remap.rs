//! Piecewise-linear coordinate remapping for shrunk chromosomes
//!
//! Outside regions coordinates shift left by the cumulative delta of every
//! region already passed. Inside a region the original length is squeezed
//! linearly into its clamped width.

use crate::core::shrink::ShrinkRegion;

/// Maps original coordinates to display coordinates on one chromosome
#[derive(Debug, Clone, Copy)]
pub struct CoordinateRemapper<'a> {
    regions: &'a [ShrinkRegion],
}

impl<'a> CoordinateRemapper<'a> {
    /// `regions` must be sorted and disjoint, as produced by
    /// `ShrinkRegionCalculator`. An empty slice gives the identity map.
    pub fn new(regions: &'a [ShrinkRegion]) -> Self {
        Self { regions }
    }

    pub fn is_identity(&self) -> bool {
        self.regions.is_empty()
    }

    /// Total delta of all regions ending at or before `x`
    pub fn cumulative_delta_before(&self, x: u64) -> u64 {
        let idx = self.regions.partition_point(|r| r.end <= x);
        if idx == 0 {
            0
        } else {
            self.regions[idx - 1].cumulative_delta
        }
    }

    /// Display coordinate of `x`
    ///
    /// # Examples
    /// ```
    /// use track_layout::core::{CoordinateRemapper, ShrinkRegionCalculator, Span};
    ///
    /// let exons = vec![Span::new(0, 10), Span::new(20, 35), Span::new(40, 50)];
    /// let regions = ShrinkRegionCalculator::new(5).compute("1", &[exons]);
    /// let remapper = CoordinateRemapper::new(&regions);
    /// assert_eq!(remapper.remap(20), 15);
    /// assert_eq!(remapper.remap(50), 45);
    /// ```
    pub fn remap(&self, x: u64) -> u64 {
        let idx = self.regions.partition_point(|r| r.end <= x);
        let before = if idx == 0 {
            0
        } else {
            self.regions[idx - 1].cumulative_delta
        };
        match self.regions.get(idx) {
            Some(region) if x > region.start => {
                let offset = x - region.start;
                let scaled = (offset as u128 * region.clamped_width() as u128
                    / region.len() as u128) as u64;
                region.start - before + scaled
            }
            _ => x - before,
        }
    }

    /// Remap a `[start, end)` pair
    pub fn remap_span(&self, start: u64, end: u64) -> (u64, u64) {
        (self.remap(start), self.remap(end))
    }
}
