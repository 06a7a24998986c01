use std::path::Path;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{CalError, Result};
use crate::input::{ScoreInput, open_maybe_gz, write_maybe_gz};

#[derive(Debug, Default, Serialize, Deserialize)]
struct ScoreArraysFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    all: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pos: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    neg: Option<Vec<f64>>,
}

/// An `all` array wins over `pos`/`neg` when both are present.
pub fn load_score_arrays(path: &Path) -> Result<ScoreInput> {
    let reader = open_maybe_gz(path)?;
    let file: ScoreArraysFile = serde_json::from_reader(reader)?;
    match file {
        ScoreArraysFile { all: Some(all), .. } => {
            tracing::info!(n = all.len(), "loaded unsplit score array");
            Ok(ScoreInput::Unsplit(Array1::from(all)))
        }
        ScoreArraysFile {
            pos: Some(pos),
            neg: Some(neg),
            ..
        } => {
            tracing::info!(
                n_pos = pos.len(),
                n_neg = neg.len(),
                "loaded pre-split score arrays"
            );
            Ok(ScoreInput::PreSplit {
                pos: Array1::from(pos),
                neg: Array1::from(neg),
            })
        }
        _ => Err(CalError::MalformedInput(format!(
            "{}: expected an `all` array or both `pos` and `neg` arrays",
            path.display()
        ))),
    }
}

pub fn save_unsplit(path: &Path, all: &Array1<f64>) -> Result<()> {
    let file = ScoreArraysFile {
        all: Some(to_finite_vec(all, "all")?),
        ..ScoreArraysFile::default()
    };
    write_maybe_gz(path, &serde_json::to_vec(&file)?)
}

pub fn save_presplit(path: &Path, pos: &Array1<f64>, neg: &Array1<f64>) -> Result<()> {
    let file = ScoreArraysFile {
        all: None,
        pos: Some(to_finite_vec(pos, "pos")?),
        neg: Some(to_finite_vec(neg, "neg")?),
    };
    write_maybe_gz(path, &serde_json::to_vec(&file)?)
}

// JSON has no encoding for NaN or infinities.
fn to_finite_vec(values: &Array1<f64>, name: &str) -> Result<Vec<f64>> {
    if let Some(v) = values.iter().find(|v| !v.is_finite()) {
        return Err(CalError::MalformedInput(format!(
            "cannot store non-finite score {v} in `{name}` array"
        )));
    }
    Ok(values.to_vec())
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/arrays.rs"]
mod tests;
