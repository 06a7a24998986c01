mod error;
mod input;
mod logging;
mod model;
mod pipeline;
mod report;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::error::Result;
use crate::input::ScoreFormat;
use crate::input::config::load_config;
use crate::model::config::EvalConfig;
use crate::model::scores::AlignMode;
use crate::pipeline::stage1_load::{Stage1Params, run_stage1};
use crate::pipeline::stage2_calibrate::run_stage2;
use crate::pipeline::stage3_evaluate::run_stage3;
use crate::pipeline::stage4_report::{Stage4Input, write_outputs};

#[derive(Debug, Parser)]
#[command(
    name = "score-calibrate",
    version,
    about = "Apply an affine score calibration and compare detection costs before and after"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Calibrate a score file and report performance when labels are available.
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Score file: JSON arrays (optionally .gz) or a binary score matrix.
    scores: PathBuf,
    /// Calibration model JSON holding `a` (scale) and `b` (shift).
    model: PathBuf,
    /// Output file name without extension; the input format's extension is appended.
    outscores: PathBuf,
    /// Format of the input scores.
    #[arg(long, value_enum, default_value_t = ScoreFormat::Arrays)]
    fmt: ScoreFormat,
    /// Trial key (TSV) used to split a score matrix into positives and negatives.
    #[arg(long)]
    key: Option<PathBuf>,
    /// Effective target prior, reported together with 0.5.
    #[arg(long)]
    ptar: Option<f64>,
    /// Explicit prior to report; repeat for several. Replaces --ptar.
    #[arg(long = "prior")]
    priors: Vec<f64>,
    /// Use the overlap of key and scores instead of failing on missing trials.
    #[arg(long)]
    lenient: bool,
    /// JSON evaluation config with `priors` and `alignment`.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Also write a JSON summary to this path.
    #[arg(long)]
    report_json: Option<PathBuf>,
}

#[derive(Debug, Clone)]
struct RunConfig {
    scores_path: PathBuf,
    model_path: PathBuf,
    out_stem: PathBuf,
    key_path: Option<PathBuf>,
    format: ScoreFormat,
    eval: EvalConfig,
    report_json: Option<PathBuf>,
}

fn main() {
    logging::init_logging();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let Command::Run(args) = cli.command;
    let config = resolve_config(args)?;
    if let Some(table) = execute(&config)? {
        print!("{table}");
    }
    Ok(())
}

fn resolve_config(args: RunArgs) -> Result<RunConfig> {
    let mut eval = match &args.config {
        Some(path) => load_config(path)?,
        None => EvalConfig::default_v1(),
    };
    if !args.priors.is_empty() {
        eval.priors = args.priors;
    } else if let Some(ptar) = args.ptar {
        eval.priors = EvalConfig::with_ptar(ptar).priors;
    }
    if args.lenient {
        eval.alignment = AlignMode::Lenient;
    }
    eval.dedup_priors();
    eval.validate()?;

    Ok(RunConfig {
        scores_path: args.scores,
        model_path: args.model,
        out_stem: args.outscores,
        key_path: args.key,
        format: args.fmt,
        eval,
        report_json: args.report_json,
    })
}

/// Runs every stage; returns the comparison table when performance was computed.
fn execute(config: &RunConfig) -> Result<Option<String>> {
    let stage1 = run_stage1(&Stage1Params {
        scores_path: &config.scores_path,
        model_path: &config.model_path,
        key_path: config.key_path.as_deref(),
        format: config.format,
    })?;

    let stage2 = run_stage2(&stage1.input, &stage1.calibrator, config.eval.alignment)?;

    let runs = match &stage2.trials {
        Some(trials) => Some(run_stage3(trials, &config.eval.priors)?),
        None => None,
    };

    let out = write_outputs(&Stage4Input {
        calibrated: &stage2.calibrated,
        runs: runs.as_deref(),
        calibrator: &stage1.calibrator,
        priors: &config.eval.priors,
        alignment: config.eval.alignment,
        out_stem: &config.out_stem,
        report_json: config.report_json.as_deref(),
        tool_name: env!("CARGO_PKG_NAME").to_string(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
    })?;

    Ok(out.table)
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
