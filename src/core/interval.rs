//! Interval records and the small value types around them
//!
//! Coordinates are 0-based, half-open `[start, end)`.

use std::fmt;

/// Strand orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Plus,
    Minus,
}

impl Strand {
    /// Parse strand from a field value
    ///
    /// # Examples
    /// ```
    /// use track_layout::core::Strand;
    /// assert_eq!(Strand::from_field("+"), Some(Strand::Plus));
    /// assert_eq!(Strand::from_field("-"), Some(Strand::Minus));
    /// assert_eq!(Strand::from_field("."), None);
    /// ```
    pub fn from_field(s: &str) -> Option<Self> {
        match s {
            "+" => Some(Strand::Plus),
            "-" => Some(Strand::Minus),
            _ => None,
        }
    }

    /// Convert to char
    pub fn to_char(&self) -> char {
        match self {
            Strand::Plus => '+',
            Strand::Minus => '-',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Kind of feature an interval represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    /// Exon (transcribed, drawn as UTR when a CDS is also present)
    Exon,
    /// Coding sequence
    CodingRegion,
    /// Anything else (gene, transcript, UTR rows, ...)
    Other,
}

impl FeatureKind {
    /// Classify a feature label
    ///
    /// # Examples
    /// ```
    /// use track_layout::core::FeatureKind;
    /// assert_eq!(FeatureKind::from_label("CDS"), FeatureKind::CodingRegion);
    /// assert_eq!(FeatureKind::from_label("exon"), FeatureKind::Exon);
    /// assert_eq!(FeatureKind::from_label("gene"), FeatureKind::Other);
    /// ```
    pub fn from_label(label: &str) -> Self {
        let lower = label.to_ascii_lowercase();
        if lower.contains("cds") {
            FeatureKind::CodingRegion
        } else if lower.contains("exon") {
            FeatureKind::Exon
        } else {
            FeatureKind::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::Exon => "exon",
            FeatureKind::CodingRegion => "CDS",
            FeatureKind::Other => "other",
        }
    }
}

/// Whether an optional feature kind counts as exonic coverage.
///
/// Untyped intervals are treated as exons.
pub fn is_exon_like(kind: Option<FeatureKind>) -> bool {
    !matches!(kind, Some(FeatureKind::Other))
}

/// A half-open coordinate span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub start: u64,
    pub end: u64,
}

impl Span {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Half-open overlap test; empty spans overlap nothing.
    pub fn overlaps(&self, other: &Span) -> bool {
        !self.is_empty() && !other.is_empty() && self.start < other.end && other.start < self.end
    }
}

/// One input row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
    pub strand: Option<Strand>,
    pub feature_kind: Option<FeatureKind>,
    /// `None` makes the interval a group of its own
    pub group_id: Option<String>,
    /// Which stacked input collection this row came from
    pub source_index: usize,
}

impl Interval {
    pub fn new(chromosome: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            chromosome: chromosome.into(),
            start,
            end,
            strand: None,
            feature_kind: None,
            group_id: None,
            source_index: 0,
        }
    }

    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn with_strand(mut self, strand: Strand) -> Self {
        self.strand = Some(strand);
        self
    }

    pub fn with_feature(mut self, kind: FeatureKind) -> Self {
        self.feature_kind = Some(kind);
        self
    }

    pub fn with_source(mut self, source_index: usize) -> Self {
        self.source_index = source_index;
        self
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

/// Tag each collection's intervals with its position as `source_index`
/// and concatenate them in order.
pub fn tag_sources(collections: Vec<Vec<Interval>>) -> Vec<Interval> {
    collections
        .into_iter()
        .enumerate()
        .flat_map(|(source_index, intervals)| {
            intervals
                .into_iter()
                .map(move |iv| iv.with_source(source_index))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_overlap_half_open() {
        let a = Span::new(0, 10);
        assert!(a.overlaps(&Span::new(5, 15)));
        assert!(!a.overlaps(&Span::new(10, 20)));
        assert!(!a.overlaps(&Span::new(5, 5)));
    }

    #[test]
    fn test_feature_kind_case_insensitive() {
        assert_eq!(FeatureKind::from_label("Exon"), FeatureKind::Exon);
        assert_eq!(FeatureKind::from_label("cds"), FeatureKind::CodingRegion);
        assert_eq!(FeatureKind::from_label("five_prime_UTR"), FeatureKind::Other);
    }

    #[test]
    fn test_exon_like() {
        assert!(is_exon_like(None));
        assert!(is_exon_like(Some(FeatureKind::Exon)));
        assert!(is_exon_like(Some(FeatureKind::CodingRegion)));
        assert!(!is_exon_like(Some(FeatureKind::Other)));
    }

    #[test]
    fn test_tag_sources() {
        let tagged = tag_sources(vec![
            vec![Interval::new("chr1", 0, 10)],
            vec![],
            vec![Interval::new("chr1", 5, 8), Interval::new("chr2", 1, 2)],
        ]);
        let sources: Vec<usize> = tagged.iter().map(|iv| iv.source_index).collect();
        assert_eq!(sources, vec![0, 2, 2]);
    }
}
