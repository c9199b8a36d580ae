//! Axis ticks for (possibly shrunk) chromosome axes

use crate::core::remap::CoordinateRemapper;
use crate::core::shrink::ShrinkRegion;
use std::collections::BTreeSet;

/// Default number of ticks aimed for on an axis
pub const DEFAULT_NUM_TICKS: usize = 10;

/// One axis tick: where it is drawn and which original coordinate it names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub display: u64,
    pub label: u64,
}

/// Ticks of one chromosome, increasing in both fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickMapping {
    pub ticks: Vec<Tick>,
}

impl TickMapping {
    pub fn positions(&self) -> Vec<u64> {
        self.ticks.iter().map(|t| t.display).collect()
    }

    pub fn labels(&self) -> Vec<u64> {
        self.ticks.iter().map(|t| t.label).collect()
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}

/// Recomputes ticks consistent with a remapped axis
#[derive(Debug, Clone, Copy)]
pub struct TickRecalculator {
    num_ticks: usize,
}

impl Default for TickRecalculator {
    fn default() -> Self {
        Self::new(DEFAULT_NUM_TICKS)
    }
}

impl TickRecalculator {
    pub fn new(num_ticks: usize) -> Self {
        Self {
            num_ticks: num_ticks.max(2),
        }
    }

    /// Evenly spaced "nice" ticks over `[min, max]` in original coordinates
    ///
    /// # Examples
    /// ```
    /// use track_layout::core::TickRecalculator;
    /// let ticks = TickRecalculator::new(10).default_ticks(1_234, 9_800);
    /// assert_eq!(ticks.first(), Some(&1_000));
    /// assert_eq!(ticks.last(), Some(&10_000));
    /// ```
    pub fn default_ticks(&self, min: u64, max: u64) -> Vec<u64> {
        let step = nice_step(max.saturating_sub(min), self.num_ticks);
        let mut ticks = Vec::new();
        let mut tick = min - min % step;
        loop {
            ticks.push(tick);
            if tick >= max {
                break;
            }
            tick += step;
        }
        ticks
    }

    /// Ticks for an axis spanning `[min, max]` with `regions` shrunk.
    ///
    /// Default ticks falling strictly inside a region are replaced by that
    /// region's boundaries; survivors are remapped and keep their original
    /// value as label.
    pub fn compute(&self, min: u64, max: u64, regions: &[ShrinkRegion]) -> TickMapping {
        let remapper = CoordinateRemapper::new(regions);
        let mut labels = BTreeSet::new();

        for tick in self.default_ticks(min, max) {
            let idx = regions.partition_point(|r| r.end <= tick);
            match regions.get(idx) {
                Some(region) if tick > region.start => {
                    labels.insert(region.start);
                    labels.insert(region.end);
                }
                _ => {
                    labels.insert(tick);
                }
            }
        }

        let mut ticks: Vec<Tick> = Vec::with_capacity(labels.len());
        for label in labels {
            let display = remapper.remap(label);
            if ticks.last().is_some_and(|t| t.display == display) {
                continue;
            }
            ticks.push(Tick { display, label });
        }
        TickMapping { ticks }
    }
}

/// Interval between ticks with a 1/2/5/10 mantissa, at least 1
fn nice_step(range: u64, num_ticks: usize) -> u64 {
    if range == 0 {
        return 1;
    }
    let raw = range as f64 / (num_ticks - 1) as f64;
    let exponent = raw.log10().floor();
    let fraction = raw / 10f64.powf(exponent);
    let nice = if fraction < 1.5 {
        1.0
    } else if fraction < 3.0 {
        2.0
    } else if fraction < 7.0 {
        5.0
    } else {
        10.0
    };
    ((nice * 10f64.powf(exponent)).round() as u64).max(1)
}
