//! Per-row interval index used while packing
//!
//! Uses rust-lapper for O(log n + k) overlap queries, one tree per row.

use crate::core::error::{LayoutError, LayoutResult};
use rust_lapper::{Interval, Lapper};

/// Value stored in each interval: its insertion sequence number
pub type RowInterval = Interval<u64, usize>;

/// Interval index organized by row
///
/// Answers "does `[start, end)` intersect anything already placed on row `r`?"
/// for a single chromosome/source partition. The index is append-only.
pub struct IntervalIndex {
    /// Row -> interval tree
    rows: Vec<Lapper<u64, usize>>,
    /// Number of spans recorded so far (used as the stored value)
    inserted: usize,
}

impl Default for IntervalIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl IntervalIndex {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            inserted: 0,
        }
    }

    /// Number of rows opened so far
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Total number of spans recorded across all rows
    pub fn len(&self) -> usize {
        self.inserted
    }

    pub fn is_empty(&self) -> bool {
        self.inserted == 0
    }

    /// Open a new empty row and return its index
    pub fn open_row(&mut self) -> usize {
        self.rows.push(Lapper::new(Vec::new()));
        self.rows.len() - 1
    }

    /// Check whether `[start, end)` overlaps any span on `row`
    ///
    /// Rows that were never opened hold nothing. Empty spans overlap nothing.
    pub fn overlaps(&self, row: usize, start: u64, end: u64) -> LayoutResult<bool> {
        check_span(start, end)?;
        if start == end {
            return Ok(false);
        }
        Ok(self
            .rows
            .get(row)
            .map(|lapper| lapper.find(start, end).next().is_some())
            .unwrap_or(false))
    }

    /// Record `[start, end)` on `row`, opening rows up to it if needed
    pub fn insert(&mut self, row: usize, start: u64, end: u64) -> LayoutResult<()> {
        check_span(start, end)?;
        while self.rows.len() <= row {
            self.open_row();
        }
        self.inserted += 1;
        // Empty spans occupy no coordinate, keep them out of the tree
        if start < end {
            self.rows[row].insert(RowInterval {
                start,
                stop: end,
                val: self.inserted,
            });
        }
        Ok(())
    }

    /// Spans currently recorded on a row, in start order
    pub fn row_spans(&self, row: usize) -> Vec<(u64, u64)> {
        self.rows
            .get(row)
            .map(|lapper| lapper.iter().map(|iv| (iv.start, iv.stop)).collect())
            .unwrap_or_default()
    }
}

fn check_span(start: u64, end: u64) -> LayoutResult<()> {
    if start > end {
        return Err(LayoutError::InvalidSpan { start, end });
    }
    Ok(())
}
