//! Render-shape descriptors for groups
//!
//! With transcript structure enabled a group is drawn as thin UTR blocks
//! around thick coding blocks, depending on which feature kinds it carries:
//!
//! | exon | CDS | shape                                   |
//! |------|-----|-----------------------------------------|
//! | yes  | yes | thin UTRs outside the CDS, thick CDS    |
//! | yes  | no  | every exon thin                         |
//! | no   | yes | every CDS thick                         |
//! | no   | no  | hidden                                  |

use crate::core::interval::FeatureKind;

/// Drawn height class of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockWidth {
    Thick,
    Thin,
}

/// One drawable block in display coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeBlock {
    pub start: u64,
    pub end: u64,
    pub width: BlockWidth,
}

impl ShapeBlock {
    fn new(start: u64, end: u64, width: BlockWidth) -> Self {
        Self { start, end, width }
    }
}

/// How a group should be drawn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderShape {
    Blocks(Vec<ShapeBlock>),
    /// Nothing drawable (no exon or CDS rows with transcript structure on)
    Hidden,
}

impl RenderShape {
    pub fn blocks(&self) -> &[ShapeBlock] {
        match self {
            RenderShape::Blocks(blocks) => blocks,
            RenderShape::Hidden => &[],
        }
    }
}

/// Build the shape of a group from `(start, end, kind)` members in display
/// coordinates. Untyped members count as exons.
pub fn render_shape(members: &[(u64, u64, Option<FeatureKind>)], thick_cds: bool) -> RenderShape {
    if !thick_cds {
        return RenderShape::Blocks(
            members
                .iter()
                .map(|&(s, e, _)| ShapeBlock::new(s, e, BlockWidth::Thick))
                .collect(),
        );
    }

    let exons: Vec<(u64, u64)> = members
        .iter()
        .filter(|(_, _, k)| matches!(k, None | Some(FeatureKind::Exon)))
        .map(|&(s, e, _)| (s, e))
        .collect();
    let cds: Vec<(u64, u64)> = members
        .iter()
        .filter(|(_, _, k)| matches!(k, Some(FeatureKind::CodingRegion)))
        .map(|&(s, e, _)| (s, e))
        .collect();

    match (exons.is_empty(), cds.is_empty()) {
        (false, false) => {
            let tr_start = exons.iter().map(|b| b.0).min().unwrap_or(0);
            let tr_end = exons.iter().map(|b| b.1).max().unwrap_or(0);
            let cds_start = cds.iter().map(|b| b.0).min().unwrap_or(0);
            let cds_end = cds.iter().map(|b| b.1).max().unwrap_or(0);

            let mut blocks = Vec::with_capacity(cds.len() + 2);
            if tr_start < cds_start {
                blocks.push(ShapeBlock::new(tr_start, cds_start, BlockWidth::Thin));
            }
            blocks.extend(cds.iter().map(|&(s, e)| ShapeBlock::new(s, e, BlockWidth::Thick)));
            if cds_end < tr_end {
                blocks.push(ShapeBlock::new(cds_end, tr_end, BlockWidth::Thin));
            }
            RenderShape::Blocks(blocks)
        }
        (false, true) => RenderShape::Blocks(
            exons
                .iter()
                .map(|&(s, e)| ShapeBlock::new(s, e, BlockWidth::Thin))
                .collect(),
        ),
        (true, false) => RenderShape::Blocks(
            cds.iter()
                .map(|&(s, e)| ShapeBlock::new(s, e, BlockWidth::Thick))
                .collect(),
        ),
        (true, true) => RenderShape::Hidden,
    }
}
