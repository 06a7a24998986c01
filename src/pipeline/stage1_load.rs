use std::path::Path;

use crate::error::Result;
use crate::input::model::load_model;
use crate::input::{ScoreFormat, ScoreInput, load_scores};
use crate::model::calibrator::AffineCalibrator;

#[derive(Debug, Clone)]
pub struct Stage1Params<'a> {
    pub scores_path: &'a Path,
    pub model_path: &'a Path,
    pub key_path: Option<&'a Path>,
    pub format: ScoreFormat,
}

#[derive(Debug)]
pub struct Stage1Output {
    pub input: ScoreInput,
    pub calibrator: AffineCalibrator,
}

pub fn run_stage1(params: &Stage1Params<'_>) -> Result<Stage1Output> {
    let calibrator = load_model(params.model_path)?;
    let input = load_scores(params.scores_path, params.format, params.key_path)?;
    tracing::info!(
        kind = input.kind(),
        n_scores = input.n_scores(),
        "resolved score input"
    );
    Ok(Stage1Output { input, calibrator })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_load.rs"]
mod tests;
