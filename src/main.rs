//! TrackLayout CLI entry point
//!
//! Lays out BED/GFF tracks and writes the result as TSV tables.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use track_layout::core::{
    tag_sources, AxisLimits, ColorBy, Interval, LayoutConfig, LayoutEngine, LimitPair,
    ShrinkThreshold, TrackLayout,
};
use track_layout::formats::{self, GffOptions, TrackFormat};

#[derive(Parser)]
#[command(name = "track-layout")]
#[command(about = "Layout engine for genomic interval tracks")]
#[command(version)]
#[command(author = "TrackLayout Contributors")]
struct Cli {
    /// Number of threads (0 = number of CPUs)
    #[arg(short = 't', long, global = true, default_value = "0")]
    threads: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Default, ValueEnum)]
enum FormatArg {
    /// Detect from file extension
    #[default]
    Auto,
    Bed,
    /// GFF3 or GTF
    Gff,
}

impl From<FormatArg> for TrackFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Auto => TrackFormat::Auto,
            FormatArg::Bed => TrackFormat::Bed,
            FormatArg::Gff => TrackFormat::Gff,
        }
    }
}

/// Options shared by every command that reads tracks
#[derive(clap::Args)]
struct InputArgs {
    /// Input tracks, stacked top to bottom in the given order
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Input format
    #[arg(short = 'f', long, value_enum, default_value = "auto")]
    format: FormatArg,
    /// GFF/GTF attribute holding the group id (transcript_id for GTF, Parent for GFF3)
    #[arg(long = "id-attr")]
    id_attr: Option<String>,
    /// Keep every GFF feature type, not only exon and CDS rows
    #[arg(long)]
    all_features: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Lay out tracks and write <prefix>.{intervals,groups,chroms,regions,ticks}.tsv
    Layout {
        #[command(flatten)]
        input: InputArgs,
        /// Output prefix
        #[arg(short = 'o', long, default_value = "layout")]
        output: PathBuf,
        /// One row per group
        #[arg(long)]
        unpacked: bool,
        /// Compress long flexible introns
        #[arg(long)]
        shrink: bool,
        /// Visible intron margin: integer bp or fraction of the chromosome span
        #[arg(long, default_value = "0.01")]
        shrink_threshold: ShrinkThreshold,
        /// Groups shown per input
        #[arg(long, default_value = "25", conflicts_with = "show_all")]
        max_shown: usize,
        /// Show every group
        #[arg(long)]
        show_all: bool,
        /// Axis limits for one chromosome, CHR:MIN-MAX (either side may be empty)
        #[arg(long = "limits", value_parser = parse_chrom_limits)]
        limits: Vec<(String, LimitPair)>,
        /// Axis limits for every chromosome, MIN-MAX
        #[arg(long = "limits-all", value_parser = parse_limit_pair, conflicts_with_all = ["limits", "limits_from"])]
        limits_all: Option<LimitPair>,
        /// Use the extents of another track as axis limits
        #[arg(long = "limits-from", conflicts_with = "limits")]
        limits_from: Option<PathBuf>,
        /// Draw UTRs thin and CDS thick
        #[arg(long)]
        thick_cds: bool,
        /// What group colours are keyed on: group, chromosome, strand, source
        #[arg(long, default_value = "group", value_parser = parse_color_by)]
        color_by: ColorBy,
        /// Ticks aimed for per axis
        #[arg(long, default_value = "10")]
        num_ticks: usize,
        /// Vertical space per row
        #[arg(long, default_value = "1.0")]
        v_space: f64,
    },
    /// Print shrinkable regions as TSV to stdout
    Regions {
        #[command(flatten)]
        input: InputArgs,
        /// Visible intron margin: integer bp or fraction of the chromosome span
        #[arg(long, default_value = "0.01")]
        shrink_threshold: ShrinkThreshold,
    },
}

fn parse_color_by(s: &str) -> Result<ColorBy, String> {
    ColorBy::from_str(s).ok_or_else(|| format!("unknown colour key '{}'", s))
}

fn parse_bound(s: &str) -> Result<Option<u64>, String> {
    let s = s.trim().replace(',', "");
    if s.is_empty() {
        return Ok(None);
    }
    s.parse()
        .map(Some)
        .map_err(|_| format!("invalid coordinate '{}'", s))
}

fn parse_limit_pair(s: &str) -> Result<LimitPair, String> {
    let (min, max) = s
        .split_once('-')
        .ok_or_else(|| format!("expected MIN-MAX, got '{}'", s))?;
    Ok((parse_bound(min)?, parse_bound(max)?))
}

fn parse_chrom_limits(s: &str) -> Result<(String, LimitPair), String> {
    let (chrom, range) = s
        .rsplit_once(':')
        .ok_or_else(|| format!("expected CHR:MIN-MAX, got '{}'", s))?;
    Ok((chrom.to_string(), parse_limit_pair(range)?))
}

fn read_inputs(input: &InputArgs) -> anyhow::Result<Vec<Interval>> {
    let options = GffOptions {
        id_attribute: input.id_attr.clone(),
        all_features: input.all_features,
    };
    let format: TrackFormat = input.format.into();
    let collections = input
        .inputs
        .par_iter()
        .enumerate()
        .map(|(i, path)| {
            formats::read_track(path, format, &options, i)
                .with_context(|| format!("Failed to read {}", path.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    for (path, collection) in input.inputs.iter().zip(&collections) {
        log::info!("{}: {} intervals", path.display(), collection.len());
    }
    Ok(tag_sources(collections))
}

fn read_reference(path: &Path, input: &InputArgs) -> anyhow::Result<Vec<Interval>> {
    let options = GffOptions {
        id_attribute: input.id_attr.clone(),
        all_features: true,
    };
    formats::read_track(path, input.format.into(), &options, 0)
        .with_context(|| format!("Failed to read limits from {}", path.display()))
}

fn print_stats(layout: &TrackLayout, start: Instant) {
    let regions: usize = layout.chromosomes.iter().map(|t| t.shrink_regions.len()).sum();
    eprintln!("\n=== Layout Statistics ===");
    eprintln!("Intervals:       {}", layout.intervals.len());
    eprintln!("Groups:          {}", layout.groups.len());
    eprintln!("Hidden groups:   {}", layout.hidden_groups());
    eprintln!("Chromosomes:     {}", layout.chromosomes.len());
    eprintln!("Shrink regions:  {}", regions);
    eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());
}

fn run(command: Commands) -> anyhow::Result<()> {
    let start = Instant::now();
    match command {
        Commands::Layout {
            input,
            output,
            unpacked,
            shrink,
            shrink_threshold,
            max_shown,
            show_all,
            limits,
            limits_all,
            limits_from,
            thick_cds,
            color_by,
            num_ticks,
            v_space,
        } => {
            let axis_limits = if let Some(pair) = limits_all {
                AxisLimits::Fixed(pair)
            } else if let Some(path) = limits_from {
                AxisLimits::Reference(read_reference(&path, &input)?)
            } else if !limits.is_empty() {
                AxisLimits::PerChromosome(limits.into_iter().collect::<HashMap<_, _>>())
            } else {
                AxisLimits::Auto
            };

            let config = LayoutConfig {
                packed: !unpacked,
                shrink,
                shrink_threshold,
                axis_limits,
                max_shown: if show_all { None } else { Some(max_shown) },
                thick_cds,
                color_by,
                v_space,
                num_ticks,
            };

            let intervals = read_inputs(&input)?;
            eprintln!(
                "Laying out {} intervals from {} input(s) -> {}.*.tsv",
                intervals.len(),
                input.inputs.len(),
                output.display()
            );
            let layout = LayoutEngine::new(config).run(&intervals)?;
            let written = formats::write_layout(&output, &layout)
                .with_context(|| format!("Failed to write tables to {}", output.display()))?;
            for path in &written {
                log::debug!("Wrote {}", path.display());
            }
            print_stats(&layout, start);
        }

        Commands::Regions {
            input,
            shrink_threshold,
        } => {
            let config = LayoutConfig {
                shrink: true,
                shrink_threshold,
                max_shown: None,
                ..Default::default()
            };
            let intervals = read_inputs(&input)?;
            let layout = LayoutEngine::new(config).run(&intervals)?;

            let stdout = std::io::stdout();
            let mut out = std::io::BufWriter::new(stdout.lock());
            formats::write_regions(
                &mut out,
                layout.chromosomes.iter().flat_map(|t| &t.shrink_regions),
            )?;
            out.flush()?;
            print_stats(&layout, start);
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(cli.threads)
        .build()
        .context("Failed to create thread pool")?;
    pool.install(|| run(cli.command))
}
