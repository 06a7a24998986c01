use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::input::{ScoreInput, save_scores};
use crate::model::calibrator::AffineCalibrator;
use crate::model::dcf::RunPerformance;
use crate::model::scores::AlignMode;
use crate::report::json::render_summary_json;
use crate::report::text::render_comparison_table;
use crate::report::{RunSummary, SummaryData};

#[derive(Debug, Clone)]
pub struct Stage4Input<'a> {
    pub calibrated: &'a ScoreInput,
    pub runs: Option<&'a [RunPerformance]>,
    pub calibrator: &'a AffineCalibrator,
    pub priors: &'a [f64],
    pub alignment: AlignMode,
    pub out_stem: &'a Path,
    pub report_json: Option<&'a Path>,
    pub tool_name: String,
    pub tool_version: String,
}

#[derive(Debug)]
pub struct Stage4Output {
    pub scores_path: PathBuf,
    pub table: Option<String>,
}

pub fn write_outputs(input: &Stage4Input<'_>) -> Result<Stage4Output> {
    let scores_path = save_scores(input.calibrated, input.out_stem)?;
    tracing::info!(path = %scores_path.display(), "saved calibrated scores");

    let table = input
        .runs
        .map(|runs| render_comparison_table(runs, input.priors));

    if let Some(path) = input.report_json {
        let summary = build_summary(input, &scores_path);
        let json = render_summary_json(&summary)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, json)?;
        tracing::info!(path = %path.display(), "wrote JSON summary");
    }

    Ok(Stage4Output { scores_path, table })
}

fn build_summary(input: &Stage4Input<'_>, scores_path: &Path) -> SummaryData {
    SummaryData {
        tool_name: input.tool_name.clone(),
        tool_version: input.tool_version.clone(),
        input_kind: input.calibrated.kind().to_string(),
        output_scores: scores_path.display().to_string(),
        alignment: input.alignment.as_str().to_string(),
        model: *input.calibrator,
        priors: input.priors.to_vec(),
        runs: input
            .runs
            .unwrap_or_default()
            .iter()
            .map(RunSummary::from)
            .collect(),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_report.rs"]
mod tests;
