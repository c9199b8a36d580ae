//! Grouping of interval rows
//!
//! Intervals sharing `(chromosome, source_index, group_id)` form one group.
//! Groups live in an arena in arrival order; intervals refer to them by slot.

use crate::core::interval::{Interval, Span};
use std::collections::{HashMap, HashSet};

/// What the per-group colour tag is derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorBy {
    #[default]
    GroupId,
    Chromosome,
    Strand,
    Source,
}

impl ColorBy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "group" | "id" | "group_id" => Some(ColorBy::GroupId),
            "chromosome" | "chrom" => Some(ColorBy::Chromosome),
            "strand" => Some(ColorBy::Strand),
            "source" => Some(ColorBy::Source),
            _ => None,
        }
    }

    fn tag_for(&self, group_id: &str, first: &Interval) -> String {
        match self {
            ColorBy::GroupId => group_id.to_string(),
            ColorBy::Chromosome => first.chromosome.clone(),
            ColorBy::Strand => first
                .strand
                .map(|s| s.to_string())
                .unwrap_or_else(|| ".".to_string()),
            ColorBy::Source => first.source_index.to_string(),
        }
    }
}

/// One group of intervals
#[derive(Debug, Clone)]
pub struct Group {
    pub group_id: String,
    pub chromosome: String,
    pub source_index: usize,
    /// `(min start, max end)` over the member intervals
    pub span: Span,
    pub color_tag: String,
    /// Indices into the interval slice the arena was built from
    pub members: Vec<usize>,
}

/// How many groups of a source survived the `max_shown` cutoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubsetReport {
    pub source_index: usize,
    pub total_groups: usize,
    pub shown_groups: usize,
}

impl SubsetReport {
    pub fn hidden_groups(&self) -> usize {
        self.total_groups - self.shown_groups
    }
}

/// Effective id of an interval: its group id, or its position within its source
pub fn effective_group_id(interval: &Interval, position_in_source: usize) -> String {
    match &interval.group_id {
        Some(id) => id.clone(),
        None => format!("#{}", position_in_source),
    }
}

/// Arena of groups built from a flat interval slice
#[derive(Debug, Clone, Default)]
pub struct GroupArena {
    pub groups: Vec<Group>,
    /// Group slot for each kept interval; `None` for intervals cut by `max_shown`
    pub slot_of: Vec<Option<usize>>,
    pub subsets: Vec<SubsetReport>,
}

impl GroupArena {
    /// Group `intervals`, keeping per source only the first `max_shown`
    /// distinct ids (first appearance across all chromosomes of that source).
    pub fn build(intervals: &[Interval], max_shown: Option<usize>, color_by: ColorBy) -> Self {
        let ids = synthesize_ids(intervals);

        // rank ids per source by first appearance
        let mut rank: HashMap<(usize, &str), usize> = HashMap::new();
        let mut per_source: HashMap<usize, usize> = HashMap::new();
        let mut source_order: Vec<usize> = Vec::new();
        for (iv, id) in intervals.iter().zip(&ids) {
            let key = (iv.source_index, id.as_str());
            if !rank.contains_key(&key) {
                let counter = per_source.entry(iv.source_index).or_insert_with(|| {
                    source_order.push(iv.source_index);
                    0
                });
                rank.insert(key, *counter);
                *counter += 1;
            }
        }

        let mut groups: Vec<Group> = Vec::new();
        let mut lookup: HashMap<(&str, usize, &str), usize> = HashMap::new();
        let mut slot_of = Vec::with_capacity(intervals.len());
        let mut shown: HashMap<usize, HashSet<&str>> = HashMap::new();

        for (i, (iv, id)) in intervals.iter().zip(&ids).enumerate() {
            let r = rank[&(iv.source_index, id.as_str())];
            if max_shown.is_some_and(|limit| r >= limit) {
                slot_of.push(None);
                continue;
            }
            shown.entry(iv.source_index).or_default().insert(id.as_str());

            let key = (iv.chromosome.as_str(), iv.source_index, id.as_str());
            let slot = *lookup.entry(key).or_insert_with(|| {
                groups.push(Group {
                    group_id: id.clone(),
                    chromosome: iv.chromosome.clone(),
                    source_index: iv.source_index,
                    span: iv.span(),
                    color_tag: color_by.tag_for(id, iv),
                    members: Vec::new(),
                });
                groups.len() - 1
            });
            let group = &mut groups[slot];
            group.span.start = group.span.start.min(iv.start);
            group.span.end = group.span.end.max(iv.end);
            group.members.push(i);
            slot_of.push(Some(slot));
        }

        let subsets = source_order
            .iter()
            .map(|&source_index| SubsetReport {
                source_index,
                total_groups: per_source[&source_index],
                shown_groups: shown.get(&source_index).map(|s| s.len()).unwrap_or(0),
            })
            .collect();

        Self {
            groups,
            slot_of,
            subsets,
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Distinct colour tags in group order
    pub fn color_tags(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.groups
            .iter()
            .filter(|g| seen.insert(g.color_tag.as_str()))
            .map(|g| g.color_tag.clone())
            .collect()
    }
}

fn synthesize_ids(intervals: &[Interval]) -> Vec<String> {
    let mut position: HashMap<usize, usize> = HashMap::new();
    intervals
        .iter()
        .map(|iv| {
            let pos = position.entry(iv.source_index).or_insert(0);
            let id = effective_group_id(iv, *pos);
            *pos += 1;
            id
        })
        .collect()
}
