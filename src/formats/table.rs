//! TSV output of a finished layout
//!
//! One file per table, all sharing an output prefix:
//!
//! | file                    | one row per                   |
//! |-------------------------|-------------------------------|
//! | `<prefix>.intervals.tsv`| placed interval               |
//! | `<prefix>.groups.tsv`   | group, with its render shape  |
//! | `<prefix>.chroms.tsv`   | chromosome layout             |
//! | `<prefix>.regions.tsv`  | shrink region                 |
//! | `<prefix>.ticks.tsv`    | axis tick                     |

use crate::core::{BlockWidth, RenderShape, ShrinkRegion, TrackLayout};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

const BUFFER_SIZE: usize = 128 * 1024;

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| ".".to_string())
}

pub fn write_intervals<W: Write>(out: &mut W, layout: &TrackLayout) -> io::Result<()> {
    writeln!(
        out,
        "#chrom\tstart\tend\toriginal_start\toriginal_end\tgroup_id\tsource\trow\ty\tstrand\tfeature"
    )?;
    for p in &layout.intervals {
        let group = &layout.groups[p.group_index];
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            p.chromosome,
            p.start,
            p.end,
            p.original_start,
            p.original_end,
            group.group_id,
            p.source_index,
            p.row,
            group.y,
            opt(p.strand),
            opt(p.feature_kind.map(|k| k.as_str())),
        )?;
    }
    Ok(())
}

/// Shape as `start-end:T|t,...`; `hidden` when nothing is drawn
fn shape_field(shape: &RenderShape) -> String {
    match shape {
        RenderShape::Hidden => "hidden".to_string(),
        RenderShape::Blocks(blocks) => blocks
            .iter()
            .map(|b| {
                let w = match b.width {
                    BlockWidth::Thick => 'T',
                    BlockWidth::Thin => 't',
                };
                format!("{}-{}:{}", b.start, b.end, w)
            })
            .collect::<Vec<_>>()
            .join(","),
    }
}

pub fn write_groups<W: Write>(out: &mut W, layout: &TrackLayout) -> io::Result<()> {
    writeln!(
        out,
        "#chrom\tstart\tend\tdisplay_start\tdisplay_end\tgroup_id\tsource\trow\ty\tcolor\tshape"
    )?;
    for g in &layout.groups {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            g.chromosome,
            g.span.start,
            g.span.end,
            g.display_span.start,
            g.display_span.end,
            g.group_id,
            g.source_index,
            g.row,
            g.y,
            g.color_tag,
            shape_field(&g.shape),
        )?;
    }
    Ok(())
}

pub fn write_chromosomes<W: Write>(out: &mut W, layout: &TrackLayout) -> io::Result<()> {
    writeln!(
        out,
        "#chrom\tmin\tmax\tdata_min\tdata_max\trows\theight\tthreshold\tseparators"
    )?;
    for track in &layout.chromosomes {
        let l = &track.layout;
        let separators = l
            .separator_rows()
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(",");
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            l.chromosome,
            l.min,
            l.max,
            l.data_min,
            l.data_max,
            l.row_count,
            l.height,
            opt(track.threshold),
            if separators.is_empty() { "." } else { separators.as_str() },
        )?;
    }
    Ok(())
}

/// Shrink regions of any chromosomes, one per line
pub fn write_regions<'a, W, I>(out: &mut W, regions: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a ShrinkRegion>,
{
    writeln!(
        out,
        "#chrom\tstart\tend\tdelta\tcumulative_delta\tdisplay_start\tdisplay_end"
    )?;
    for r in regions {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            r.chromosome, r.start, r.end, r.delta, r.cumulative_delta, r.display_start, r.display_end
        )?;
    }
    Ok(())
}

pub fn write_ticks<W: Write>(out: &mut W, layout: &TrackLayout) -> io::Result<()> {
    writeln!(out, "#chrom\tposition\tlabel")?;
    for track in &layout.chromosomes {
        for tick in &track.ticks.ticks {
            writeln!(
                out,
                "{}\t{}\t{}",
                track.layout.chromosome, tick.display, tick.label
            )?;
        }
    }
    Ok(())
}

fn create(path: &Path) -> io::Result<BufWriter<File>> {
    Ok(BufWriter::with_capacity(BUFFER_SIZE, File::create(path)?))
}

fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = prefix.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Write every table next to `prefix`, returning the paths written
pub fn write_layout<P: AsRef<Path>>(prefix: P, layout: &TrackLayout) -> io::Result<Vec<PathBuf>> {
    let prefix = prefix.as_ref();
    let paths: Vec<PathBuf> = ["intervals", "groups", "chroms", "regions", "ticks"]
        .iter()
        .map(|table| with_suffix(prefix, &format!(".{}.tsv", table)))
        .collect();

    let mut out = create(&paths[0])?;
    write_intervals(&mut out, layout)?;
    out.flush()?;

    let mut out = create(&paths[1])?;
    write_groups(&mut out, layout)?;
    out.flush()?;

    let mut out = create(&paths[2])?;
    write_chromosomes(&mut out, layout)?;
    out.flush()?;

    let mut out = create(&paths[3])?;
    write_regions(
        &mut out,
        layout.chromosomes.iter().flat_map(|t| &t.shrink_regions),
    )?;
    out.flush()?;

    let mut out = create(&paths[4])?;
    write_ticks(&mut out, layout)?;
    out.flush()?;

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Interval, LayoutConfig, LayoutEngine, ShrinkThreshold};
    use tempfile::TempDir;

    fn layout() -> TrackLayout {
        let intervals = vec![
            Interval::new("1", 0, 10).with_group("t1"),
            Interval::new("1", 20, 35).with_group("t1"),
            Interval::new("1", 40, 50).with_group("t1"),
        ];
        let config = LayoutConfig {
            shrink: true,
            shrink_threshold: ShrinkThreshold::Absolute(5),
            ..Default::default()
        };
        LayoutEngine::new(config).run(&intervals).unwrap()
    }

    #[test]
    fn test_interval_rows() {
        let mut out = Vec::new();
        write_intervals(&mut out, &layout()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2], "1\t15\t30\t20\t35\tt1\t0\t0\t0\t.\t.");
    }

    #[test]
    fn test_regions_table() {
        let layout = layout();
        let mut out = Vec::new();
        write_regions(&mut out, &layout.chromosomes[0].shrink_regions).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().nth(1), Some("1\t10\t20\t5\t5\t10\t15"));
    }

    #[test]
    fn test_shape_field() {
        let text = {
            let mut out = Vec::new();
            write_groups(&mut out, &layout()).unwrap();
            String::from_utf8(out).unwrap()
        };
        assert!(text.lines().nth(1).unwrap().ends_with("0-10:T,15-30:T,35-45:T"));
        assert_eq!(shape_field(&RenderShape::Hidden), "hidden");
    }

    #[test]
    fn test_write_layout_creates_files() -> io::Result<()> {
        let dir = TempDir::new()?;
        let prefix = dir.path().join("out");
        let paths = write_layout(&prefix, &layout())?;
        assert_eq!(paths.len(), 5);
        assert!(paths.iter().all(|p| p.exists()));
        assert!(paths[2].to_string_lossy().ends_with("out.chroms.tsv"));
        Ok(())
    }
}
