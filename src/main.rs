use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Builder;
use log::{LevelFilter, error, info, warn};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use hard_discs_analyzer::analyzer::{AcceptanceFilter, AnalysisReport, MetricKind, analyze_file};
use hard_discs_analyzer::common::{AnalyzerConfig, ExportFormat, LayoutChoice, SeriesExport, write_export, write_exports};
use hard_discs_analyzer::snapshot::{self, PairDistanceReader};

#[derive(Parser, Debug)]
#[command(name = "hard-discs-analyzer", version, about = "Hard-disc Monte Carlo log analysis")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Debug logging for this crate
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Per-object metric series from a movement log
    Metrics {
        log: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "all")]
        metric: MetricChoice,
        #[arg(long)]
        step_start: Option<u64>,
        #[arg(long)]
        step_end: Option<u64>,
        #[arg(long, value_enum)]
        acceptance: Option<AcceptanceChoice>,
        #[arg(long)]
        min_moves: Option<u64>,
        #[arg(long)]
        max_objects: Option<usize>,
        #[arg(long, value_enum)]
        layout: Option<LayoutVersion>,
        #[arg(long, value_enum)]
        format: Option<FormatChoice>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Distance between the two objects of every trajectory frame
    Distance {
        snapshot: PathBuf,
        #[arg(long, default_value_t = 1.0)]
        radius: f64,
        #[arg(long, default_value_t = 5)]
        lines_per_frame: usize,
        #[arg(long, default_value_t = 3)]
        header_lines: usize,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Split a trajectory into per-frame configuration files
    Frames {
        trajectory: PathBuf,
        #[arg(long)]
        objects: usize,
        /// Defaults to `gif_folder` next to the trajectory
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MetricChoice {
    StepSize,
    Rotation,
    Translation,
    Acceptance,
    All,
}

impl MetricChoice {
    fn kinds(self) -> Vec<MetricKind> {
        match self {
            MetricChoice::StepSize => vec![MetricKind::StepSizeBound],
            MetricChoice::Rotation => vec![MetricKind::RotationDegrees],
            MetricChoice::Translation => vec![MetricKind::TranslationMagnitude],
            MetricChoice::Acceptance => vec![MetricKind::AcceptanceRatio],
            MetricChoice::All => MetricKind::ALL.to_vec(),
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AcceptanceChoice {
    Any,
    Accepted,
    Refused,
}

impl From<AcceptanceChoice> for AcceptanceFilter {
    fn from(choice: AcceptanceChoice) -> Self {
        match choice {
            AcceptanceChoice::Any => AcceptanceFilter::Any,
            AcceptanceChoice::Accepted => AcceptanceFilter::Accepted,
            AcceptanceChoice::Refused => AcceptanceFilter::Refused,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LayoutVersion {
    V1,
    V2,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Json,
    Tsv,
}

impl From<FormatChoice> for ExportFormat {
    fn from(choice: FormatChoice) -> Self {
        match choice {
            FormatChoice::Json => ExportFormat::Json,
            FormatChoice::Tsv => ExportFormat::Tsv,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Logging setup
    let crate_level = if cli.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter(Some("hard_discs_analyzer"), crate_level)
        .init();

    if let Err(e) = run(cli.command) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Metrics {
            log,
            config,
            metric,
            step_start,
            step_end,
            acceptance,
            min_moves,
            max_objects,
            layout,
            format,
            out,
        } => {
            let mut config = match config {
                Some(path) => AnalyzerConfig::load(&path)?,
                None => AnalyzerConfig::default(),
            };
            if let Some(step_start) = step_start {
                config.filter.step_start = step_start;
            }
            if let Some(step_end) = step_end {
                config.filter.step_end = step_end;
            }
            if let Some(acceptance) = acceptance {
                config.filter.acceptance_filter = acceptance.into();
            }
            if let Some(min_moves) = min_moves {
                config.filter.min_move_count = min_moves;
            }
            if let Some(max_objects) = max_objects {
                config.max_objects = max_objects;
            }
            if let Some(layout) = layout {
                let name = match layout {
                    LayoutVersion::V1 => "v1",
                    LayoutVersion::V2 => "v2",
                };
                config.layout = LayoutChoice::Named(name.to_string());
            }
            if let Some(format) = format {
                config.export.format = format.into();
            }

            let request = config.analysis_request(metric.kinds())?;
            let report = analyze_file(&log, &request)?;
            write_metrics(&log, &report, &config, out.as_deref())
        }
        Commands::Distance {
            snapshot: path,
            radius,
            lines_per_frame,
            header_lines,
            out,
        } => {
            let reader = PairDistanceReader {
                lines_per_frame,
                header_lines,
                radius,
            };
            let lines = snapshot::read_lines(&path)?;
            let distances = reader.read_pair_distances(&lines)?;
            info!("{} frames read from {}", distances.len(), path.display());

            let mut writer = open_output(out.as_deref())?;
            for distance in distances {
                writeln!(writer, "{}", distance)?;
            }
            writer.flush()?;
            Ok(())
        }
        Commands::Frames {
            trajectory,
            objects,
            out_dir,
        } => {
            let lines = snapshot::read_lines(&trajectory)?;
            let frames = snapshot::split_frames(&lines, objects)?;
            if frames.is_empty() {
                warn!("No complete frame of {} lines in {}", snapshot::frame_len(objects)?, trajectory.display());
            }
            let dir = out_dir.unwrap_or_else(|| trajectory.parent().unwrap_or(Path::new(".")).join("gif_folder"));
            snapshot::write_frames(&dir, &frames)?;
            Ok(())
        }
    }
}

/// Write one export per extracted kind, to stdout or `<out>.<kind>.<ext>` when several kinds go to files.
fn write_metrics(log_path: &Path, report: &AnalysisReport, config: &AnalyzerConfig, out: Option<&Path>) -> anyhow::Result<()> {
    let format = config.export.format;
    let source = log_path.display().to_string();
    let exports: Vec<SeriesExport> = report
        .extractions
        .iter()
        .map(|extraction| SeriesExport::new(&source, &config.filter, report.parse.skipped, extraction))
        .collect();

    let Some(path) = out else {
        // All kinds share stdout, so they go out as one stream.
        let mut writer = open_output(None)?;
        write_exports(&mut writer, &exports, format)?;
        writer.flush()?;
        return Ok(());
    };

    let several = exports.len() > 1;
    for export in &exports {
        let target = if several {
            path.with_extension(format!("{}.{}", export.metric, format.extension()))
        } else {
            path.to_path_buf()
        };

        let mut writer = open_output(Some(&target))?;
        write_export(&mut writer, export, format)?;
        writer.flush()?;
        info!("{} series written to {}", export.metric, target.display());
    }
    Ok(())
}

fn open_output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}
