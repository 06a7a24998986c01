use std::path::Path;

use serde::Deserialize;

use crate::error::{CalError, Result};
use crate::input::open_maybe_gz;
use crate::model::calibrator::AffineCalibrator;

#[derive(Debug, Deserialize)]
struct ModelFile {
    #[serde(default, alias = "alpha", alias = "scale")]
    a: Option<f64>,
    #[serde(default, alias = "beta", alias = "shift")]
    b: Option<f64>,
}

pub fn load_model(path: &Path) -> Result<AffineCalibrator> {
    let reader = open_maybe_gz(path)?;
    let file: ModelFile = serde_json::from_reader(reader)?;
    parse_model(file, path)
}

fn parse_model(file: ModelFile, path: &Path) -> Result<AffineCalibrator> {
    let a = file.a.ok_or_else(|| {
        CalError::MalformedModel(format!("{}: missing scale parameter `a`", path.display()))
    })?;
    let b = file.b.ok_or_else(|| {
        CalError::MalformedModel(format!("{}: missing shift parameter `b`", path.display()))
    })?;
    let calibrator = AffineCalibrator::new(a, b)?;
    tracing::info!(a, b, "loaded calibration model");
    Ok(calibrator)
}
