//! Property-based tests for the BED reader
//!
//! **Property 9: BED12 blocks expand to one exon each, with CDS clipped to the thick range**

use proptest::prelude::*;
use track_layout::core::{FeatureKind, Strand};
use track_layout::formats::{read_bed, BedRecordView};

/// A BED12 line built from relative, non-overlapping blocks
fn arb_bed12() -> impl Strategy<Value = (String, Vec<(u64, u64)>, (u64, u64))> {
    (
        0u64..1_000_000,
        prop::collection::vec((1u64..200, 1u64..300), 1..10),
        any::<bool>(),
    )
        .prop_flat_map(|(chrom_start, parts, strand_plus)| {
            let mut rel = Vec::new();
            let mut cursor = 0u64;
            for (gap, size) in parts {
                let start = if rel.is_empty() { 0 } else { cursor + gap };
                rel.push((start, size));
                cursor = start + size;
            }
            let chrom_end = chrom_start + cursor;
            (Just((chrom_start, chrom_end, rel, strand_plus)), chrom_start..=chrom_end)
                .prop_flat_map(move |(meta, thick_start)| {
                    let chrom_end = meta.1;
                    (Just(meta), Just(thick_start), thick_start..=chrom_end)
                })
        })
        .prop_map(|((chrom_start, chrom_end, rel, strand_plus), thick_start, thick_end)| {
            let sizes: Vec<String> = rel.iter().map(|(_, s)| s.to_string()).collect();
            let starts: Vec<String> = rel.iter().map(|(s, _)| s.to_string()).collect();
            let line = format!(
                "chr1\t{}\t{}\ttx\t0\t{}\t{}\t{}\t0\t{}\t{},\t{},",
                chrom_start,
                chrom_end,
                if strand_plus { '+' } else { '-' },
                thick_start,
                thick_end,
                rel.len(),
                sizes.join(","),
                starts.join(",")
            );
            let blocks = rel
                .iter()
                .map(|&(s, size)| (chrom_start + s, chrom_start + s + size))
                .collect();
            (line, blocks, (thick_start, thick_end))
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_bed12_expansion((line, blocks, (thick_start, thick_end)) in arb_bed12()) {
        let view = BedRecordView::parse(line.as_bytes()).unwrap();
        prop_assert!(view.is_bed12());
        prop_assert_eq!(view.blocks().unwrap(), blocks.clone());

        let ivs = read_bed(line.as_bytes(), 0).unwrap();
        let exons: Vec<(u64, u64)> = ivs
            .iter()
            .filter(|iv| iv.feature_kind == Some(FeatureKind::Exon))
            .map(|iv| (iv.start, iv.end))
            .collect();
        prop_assert_eq!(exons, blocks.clone());

        let expected_cds: u64 = blocks
            .iter()
            .map(|&(s, e)| e.min(thick_end).saturating_sub(s.max(thick_start)))
            .sum();
        let cds: Vec<_> = ivs
            .iter()
            .filter(|iv| iv.feature_kind == Some(FeatureKind::CodingRegion))
            .collect();
        prop_assert_eq!(cds.iter().map(|iv| iv.end - iv.start).sum::<u64>(), expected_cds);
        for iv in &cds {
            prop_assert!(iv.start >= thick_start && iv.end <= thick_end);
            prop_assert!(iv.start < iv.end);
        }
        prop_assert!(ivs.iter().all(|iv| iv.group_id.as_deref() == Some("tx")));
    }

    #[test]
    fn prop_bed6_fields(start in 0u64..1_000_000, len in 0u64..10_000, plus in any::<bool>()) {
        let strand = if plus { "+" } else { "-" };
        let line = format!("chrX\t{}\t{}\tg1\t0\t{}\n", start, start + len, strand);
        let ivs = read_bed(line.as_bytes(), 0).unwrap();
        prop_assert_eq!(ivs.len(), 1);
        prop_assert_eq!((ivs[0].start, ivs[0].end), (start, start + len));
        prop_assert_eq!(ivs[0].strand, Some(if plus { Strand::Plus } else { Strand::Minus }));
        prop_assert_eq!(ivs[0].feature_kind, None);
    }
}
