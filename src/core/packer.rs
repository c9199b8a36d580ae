//! Row assignment for groups
//!
//! Greedy first-fit interval colouring:
//! 1. Sort spans by start; ties keep arrival order
//! 2. Scan existing rows in order, take the first one without overlap
//! 3. Open a new row when every row conflicts
//!
//! For interval graphs this uses exactly as many rows as the largest set of
//! mutually overlapping spans, which is the minimum possible.
//!
//! When several layouts are equally valid, the arrival-order tie-break decides
//! which rows groups land in. That order is part of the contract: callers that
//! want a different stacking must reorder their input.

use crate::core::error::LayoutResult;
use crate::core::index::IntervalIndex;
use crate::core::interval::Span;

/// Packing strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackingMode {
    /// Non-overlapping groups share rows
    #[default]
    Packed,
    /// One row per group, in arrival order
    Unpacked,
}

impl PackingMode {
    pub fn from_packed(packed: bool) -> Self {
        if packed {
            PackingMode::Packed
        } else {
            PackingMode::Unpacked
        }
    }
}

/// Rows assigned to one partition, indexed like the input spans
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedRows {
    pub rows: Vec<usize>,
    pub row_count: usize,
}

/// Where one stacked source begins on a chromosome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceBoundary {
    pub source_index: usize,
    pub first_row: usize,
    pub row_count: usize,
}

/// Rows for every source partition of one chromosome, already offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackedRows {
    /// One entry per input partition, rows indexed like its spans
    pub rows: Vec<Vec<usize>>,
    pub row_count: usize,
    pub source_boundaries: Vec<SourceBoundary>,
}

/// Assigns rows to group spans
#[derive(Debug, Clone, Copy, Default)]
pub struct IntervalPacker {
    mode: PackingMode,
}

impl IntervalPacker {
    pub fn new(mode: PackingMode) -> Self {
        Self { mode }
    }

    /// Assign rows to spans of a single chromosome/source partition.
    ///
    /// `spans` must be given in arrival order.
    pub fn pack(&self, spans: &[Span]) -> LayoutResult<PackedRows> {
        match self.mode {
            PackingMode::Packed => pack_first_fit(spans),
            PackingMode::Unpacked => pack_one_per_row(spans),
        }
    }

    /// Pack each source partition independently and stack them.
    ///
    /// `partitions` holds `(source_index, spans)` pairs; they are stacked in
    /// ascending `source_index` order regardless of the order given.
    pub fn stack(&self, partitions: &[(usize, Vec<Span>)]) -> LayoutResult<StackedRows> {
        let mut order: Vec<usize> = (0..partitions.len()).collect();
        order.sort_by_key(|&i| partitions[i].0);

        let mut rows = vec![Vec::new(); partitions.len()];
        let mut source_boundaries = Vec::with_capacity(partitions.len());
        let mut offset = 0;

        for i in order {
            let (source_index, spans) = &partitions[i];
            let packed = self.pack(spans)?;
            rows[i] = packed.rows.iter().map(|r| r + offset).collect();
            source_boundaries.push(SourceBoundary {
                source_index: *source_index,
                first_row: offset,
                row_count: packed.row_count,
            });
            offset += packed.row_count;
        }

        Ok(StackedRows {
            rows,
            row_count: offset,
            source_boundaries,
        })
    }
}

fn pack_first_fit(spans: &[Span]) -> LayoutResult<PackedRows> {
    let mut order: Vec<usize> = (0..spans.len()).collect();
    // stable: equal starts keep arrival order
    order.sort_by_key(|&i| spans[i].start);

    let mut index = IntervalIndex::new();
    let mut rows = vec![0; spans.len()];

    for i in order {
        let span = spans[i];
        let mut chosen = None;
        for row in 0..index.row_count() {
            if !index.overlaps(row, span.start, span.end)? {
                chosen = Some(row);
                break;
            }
        }
        let row = match chosen {
            Some(row) => row,
            None => index.open_row(),
        };
        index.insert(row, span.start, span.end)?;
        rows[i] = row;
    }

    Ok(PackedRows {
        rows,
        row_count: index.row_count(),
    })
}

fn pack_one_per_row(spans: &[Span]) -> LayoutResult<PackedRows> {
    let mut index = IntervalIndex::new();
    let mut rows = Vec::with_capacity(spans.len());
    for span in spans {
        let row = index.open_row();
        index.insert(row, span.start, span.end)?;
        rows.push(row);
    }
    Ok(PackedRows {
        rows,
        row_count: index.row_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::LayoutError;

    fn spans(pairs: &[(u64, u64)]) -> Vec<Span> {
        pairs.iter().map(|&(s, e)| Span::new(s, e)).collect()
    }

    #[test]
    fn test_first_fit_reuses_rows() {
        let packer = IntervalPacker::new(PackingMode::Packed);
        let packed = packer.pack(&spans(&[(0, 10), (5, 15), (20, 30)])).unwrap();
        assert_eq!(packed.rows, vec![0, 1, 0]);
        assert_eq!(packed.row_count, 2);
    }

    #[test]
    fn test_sorted_by_start_not_arrival() {
        let packer = IntervalPacker::new(PackingMode::Packed);
        // C arrives first but starts last
        let packed = packer.pack(&spans(&[(20, 30), (0, 10), (5, 25)])).unwrap();
        assert_eq!(packed.rows, vec![0, 0, 1]);
    }

    #[test]
    fn test_tie_break_by_arrival() {
        let packer = IntervalPacker::new(PackingMode::Packed);
        let packed = packer.pack(&spans(&[(0, 50), (0, 10), (10, 20)])).unwrap();
        assert_eq!(packed.rows, vec![0, 1, 1]);
    }

    #[test]
    fn test_unpacked_one_row_each() {
        let packer = IntervalPacker::new(PackingMode::Unpacked);
        let packed = packer.pack(&spans(&[(20, 30), (0, 10), (40, 50)])).unwrap();
        assert_eq!(packed.rows, vec![0, 1, 2]);
        assert_eq!(packed.row_count, 3);
    }

    #[test]
    fn test_empty_partition() {
        let packer = IntervalPacker::default();
        let packed = packer.pack(&[]).unwrap();
        assert!(packed.rows.is_empty());
        assert_eq!(packed.row_count, 0);
    }

    #[test]
    fn test_malformed_span_rejected() {
        let packer = IntervalPacker::default();
        let result = packer.pack(&[Span { start: 10, end: 2 }]);
        assert!(matches!(result, Err(LayoutError::InvalidSpan { .. })));
    }

    #[test]
    fn test_stack_offsets_sources() {
        let packer = IntervalPacker::new(PackingMode::Packed);
        let partitions = vec![
            (1, spans(&[(0, 10)])),
            (0, spans(&[(0, 10), (5, 15)])),
        ];
        let stacked = packer.stack(&partitions).unwrap();
        assert_eq!(stacked.rows[1], vec![0, 1]);
        assert_eq!(stacked.rows[0], vec![2]);
        assert_eq!(stacked.row_count, 3);
        assert_eq!(
            stacked.source_boundaries,
            vec![
                SourceBoundary { source_index: 0, first_row: 0, row_count: 2 },
                SourceBoundary { source_index: 1, first_row: 2, row_count: 1 },
            ]
        );
    }
}
