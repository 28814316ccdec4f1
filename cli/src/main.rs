//! `rdi` CLI: scenario simulation, single-log and directory analysis.

mod output;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use flow_sim::log::{load_log, save_log, DetectionLog};
use flow_sim::scenarios::{Scenario, ScenarioKind};
use output::JsonDirSink;
use rdi_core::config::{AnalysisConfig, AssignmentStrategy};
use rdi_core::pipeline::{analyze, AnalysisOutput};
use rdi_core::sink::ResultSink;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "rdi", about = "Cell transit (RDI) analysis of channel-flow detection logs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a named scenario and save its detection log.
    Simulate {
        #[arg(value_enum)]
        scenario: ScenarioKind,
        /// Random seed for reproducibility
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Detection log path (default: `<scenario>.json`)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Analyse one detection log.
    Analyze {
        /// Path to a detection log JSON file
        input: PathBuf,
        #[command(flatten)]
        analysis: AnalysisArgs,
    },
    /// Analyse every `*.json` detection log in a directory.
    Batch {
        dir: PathBuf,
        #[command(flatten)]
        analysis: AnalysisArgs,
    },
}

#[derive(Args, Clone, Debug)]
struct AnalysisArgs {
    /// JSON analysis configuration; missing fields take defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Frame width along the flow axis (pixels)
    #[arg(long)]
    channel_width_px: Option<f64>,
    #[arg(long)]
    pixels_per_micron: Option<f64>,
    #[arg(long)]
    fps: Option<f64>,
    /// Frames a cell may go undetected and still be linked
    #[arg(long)]
    memory: Option<u64>,
    #[arg(long, value_enum)]
    assignment: Option<StrategyArg>,
    /// Directory for result files
    #[arg(long, default_value = "results")]
    output_dir: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    Optimal,
    Greedy,
}

impl From<StrategyArg> for AssignmentStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Optimal => AssignmentStrategy::Optimal,
            StrategyArg::Greedy => AssignmentStrategy::Greedy,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            scenario,
            seed,
            output,
        } => {
            run_simulate(scenario, seed, output)?;
        }
        Commands::Analyze { input, analysis } => {
            run_analyze(&input, &analysis)?;
        }
        Commands::Batch { dir, analysis } => {
            run_batch(&dir, &analysis)?;
        }
    }

    Ok(())
}

fn run_simulate(kind: ScenarioKind, seed: u64, output: Option<PathBuf>) -> Result<()> {
    let scenario = Scenario::build(kind, seed);
    println!(
        "Simulating scenario '{}' (seed={}, {} frames, {} cells)...",
        scenario.name,
        seed,
        scenario.frames,
        scenario.cells.len()
    );
    let run = scenario.run()?;
    let log = DetectionLog::from_run(&scenario, run);
    let path = output.unwrap_or_else(|| PathBuf::from(format!("{}.json", scenario.name)));
    save_log(&log, &path)?;
    println!(
        "Saved {} detections in {} frames to {}",
        log.detections.detection_count(),
        log.detections.frame_count(),
        path.display()
    );
    Ok(())
}

fn run_analyze(input: &Path, args: &AnalysisArgs) -> Result<()> {
    let mut sink = JsonDirSink::create(&args.output_dir, false)?;
    let output = analyze_file(input, args)?;
    sink.write(&input.to_string_lossy(), &output)?;
    sink.finish()?;
    print_summary(input, &output);
    println!("Results written to {}", args.output_dir.display());
    Ok(())
}

fn run_batch(dir: &Path, args: &AnalysisArgs) -> Result<()> {
    let mut inputs: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("reading {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    inputs.sort();
    if inputs.is_empty() {
        bail!("no detection logs (*.json) in {}", dir.display());
    }

    let mut sink = JsonDirSink::create(&args.output_dir, true)?;
    let start = std::time::Instant::now();
    let mut analysed = 0usize;

    for input in &inputs {
        match analyze_file(input, args) {
            Ok(output) => {
                sink.write(&input.to_string_lossy(), &output)?;
                print_summary(input, &output);
                analysed += 1;
            }
            Err(err) => warn!(file = %input.display(), "skipped: {err:#}"),
        }
    }
    if analysed == 0 {
        bail!("none of the {} logs in {} could be analysed", inputs.len(), dir.display());
    }
    sink.finish()?;

    info!(analysed, skipped = inputs.len() - analysed, "batch complete");
    println!(
        "Batch done: {}/{} logs, elapsed={:.2}s, results in {}",
        analysed,
        inputs.len(),
        start.elapsed().as_secs_f64(),
        args.output_dir.display()
    );
    Ok(())
}

fn analyze_file(path: &Path, args: &AnalysisArgs) -> Result<AnalysisOutput> {
    let log = load_log(path)?;
    let config = resolve_config(args, &log)?;
    analyze(&log.detections, &config).with_context(|| format!("analysing {}", path.display()))
}

/// Config file (or defaults), then log metadata, then command-line flags.
fn resolve_config(args: &AnalysisArgs, log: &DetectionLog) -> Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => AnalysisConfig::default(),
    };

    let width_px = args.channel_width_px.or(log.channel_width_px);
    let pixels_per_micron = args.pixels_per_micron.or(log.pixels_per_micron);
    if width_px.is_some() || pixels_per_micron.is_some() {
        let width_px =
            width_px.unwrap_or(config.channel_width_microns * config.pixels_per_micron);
        if let Some(ppm) = pixels_per_micron {
            config.pixels_per_micron = ppm;
        }
        config = config.with_channel_width_px(width_px);
    }
    if let Some(fps) = args.fps.or(log.frames_per_second) {
        config.frames_per_second = fps;
    }
    if let Some(memory) = args.memory {
        config.linker.memory = memory;
    }
    if let Some(strategy) = args.assignment {
        config.linker.assignment = strategy.into();
    }

    config.validate()?;
    Ok(config)
}

fn print_summary(input: &Path, output: &AnalysisOutput) {
    let s = &output.summary;
    println!(
        "{}: {} frames, {} detections, {} trajectories, {} after stub filter, {} accepted",
        input.display(),
        s.frames,
        s.detections,
        s.linked_trajectories,
        s.after_stub_filter,
        s.accepted
    );
    if let (Some(mean), Some(median)) = (s.mean_rdi, s.median_rdi) {
        println!("  RDI mean={mean:.1} µm/s median={median:.1} µm/s");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdi_core::types::DetectionSet;

    fn args() -> AnalysisArgs {
        AnalysisArgs {
            config: None,
            channel_width_px: None,
            pixels_per_micron: None,
            fps: None,
            memory: None,
            assignment: None,
            output_dir: PathBuf::from("results"),
        }
    }

    fn log() -> DetectionLog {
        DetectionLog {
            source: String::new(),
            seed: None,
            channel_width_px: None,
            pixels_per_micron: None,
            frames_per_second: None,
            detections: DetectionSet::default(),
            ground_truth: Vec::new(),
        }
    }

    #[test]
    fn defaults_without_overrides() {
        let config = resolve_config(&args(), &log()).unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn log_metadata_then_flags() {
        let log = DetectionLog {
            channel_width_px: Some(300.0),
            frames_per_second: Some(50.0),
            ..log()
        };
        let args = AnalysisArgs {
            fps: Some(100.0),
            memory: Some(3),
            assignment: Some(StrategyArg::Greedy),
            ..args()
        };
        let config = resolve_config(&args, &log).unwrap();
        assert_eq!(config.channel_width_microns, 240.0);
        assert_eq!(config.linker.max_link_distance, 100.0);
        assert_eq!(config.frames_per_second, 100.0);
        assert_eq!(config.linker.memory, 3);
        assert_eq!(config.linker.assignment, AssignmentStrategy::Greedy);
    }

    #[test]
    fn pixel_scale_keeps_frame_width() {
        let args = AnalysisArgs {
            pixels_per_micron: Some(2.5),
            ..args()
        };
        let config = resolve_config(&args, &log()).unwrap();
        assert_eq!(config.channel_width_microns, 100.0);
    }

    #[test]
    fn bad_override_is_rejected() {
        let args = AnalysisArgs {
            fps: Some(0.0),
            ..args()
        };
        assert!(resolve_config(&args, &log()).is_err());
    }
}
