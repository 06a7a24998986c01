use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use ndarray::Array1;

use crate::error::Result;
use crate::model::key::TrialKey;
use crate::model::scores::ScoreMatrix;

pub mod arrays;
pub mod config;
pub mod key;
pub mod matrix;
pub mod model;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScoreFormat {
    /// JSON with either `all` or `pos`/`neg` score arrays.
    Arrays,
    /// Binary labelled score matrix.
    Matrix,
}

impl ScoreFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ScoreFormat::Arrays => "json",
            ScoreFormat::Matrix => "scm",
        }
    }
}

/// Scores as they come off disk, resolved once per run.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreInput {
    Unsplit(Array1<f64>),
    PreSplit { pos: Array1<f64>, neg: Array1<f64> },
    Matrix(ScoreMatrix),
    MatrixWithKey { scores: ScoreMatrix, key: TrialKey },
}

impl ScoreInput {
    pub fn kind(&self) -> &'static str {
        match self {
            ScoreInput::Unsplit(_) => "unsplit",
            ScoreInput::PreSplit { .. } => "pre-split",
            ScoreInput::Matrix(_) => "matrix",
            ScoreInput::MatrixWithKey { .. } => "matrix+key",
        }
    }

    pub fn format(&self) -> ScoreFormat {
        match self {
            ScoreInput::Unsplit(_) | ScoreInput::PreSplit { .. } => ScoreFormat::Arrays,
            ScoreInput::Matrix(_) | ScoreInput::MatrixWithKey { .. } => ScoreFormat::Matrix,
        }
    }

    pub fn n_scores(&self) -> usize {
        match self {
            ScoreInput::Unsplit(all) => all.len(),
            ScoreInput::PreSplit { pos, neg } => pos.len() + neg.len(),
            ScoreInput::Matrix(scores) | ScoreInput::MatrixWithKey { scores, .. } => {
                scores.values().len()
            }
        }
    }
}

pub fn load_scores(
    path: &Path,
    format: ScoreFormat,
    key_path: Option<&Path>,
) -> Result<ScoreInput> {
    match format {
        ScoreFormat::Arrays => {
            if let Some(key_path) = key_path {
                tracing::warn!(
                    key = %key_path.display(),
                    "key is only used with the matrix format; ignoring it"
                );
            }
            arrays::load_score_arrays(path)
        }
        ScoreFormat::Matrix => {
            let scores = matrix::read_score_matrix(path)?;
            match key_path {
                Some(key_path) => Ok(ScoreInput::MatrixWithKey {
                    scores,
                    key: key::load_key(key_path)?,
                }),
                None => Ok(ScoreInput::Matrix(scores)),
            }
        }
    }
}

/// Writes `input` next to `out_stem` with the format's extension appended.
pub fn save_scores(input: &ScoreInput, out_stem: &Path) -> Result<PathBuf> {
    let path = output_path(out_stem, input.format());
    match input {
        ScoreInput::Unsplit(all) => arrays::save_unsplit(&path, all)?,
        ScoreInput::PreSplit { pos, neg } => arrays::save_presplit(&path, pos, neg)?,
        ScoreInput::Matrix(scores) | ScoreInput::MatrixWithKey { scores, .. } => {
            matrix::write_score_matrix(&path, scores)?
        }
    }
    Ok(path)
}

pub fn output_path(out_stem: &Path, format: ScoreFormat) -> PathBuf {
    let mut name = OsString::from(out_stem.as_os_str());
    name.push(".");
    name.push(format.extension());
    PathBuf::from(name)
}

fn is_gz(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

pub(crate) fn open_maybe_gz(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if is_gz(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

pub(crate) fn write_maybe_gz(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = BufWriter::new(File::create(path)?);
    if is_gz(path) {
        let mut enc = GzEncoder::new(file, Compression::default());
        enc.write_all(contents)?;
        enc.finish()?.flush()?;
    } else {
        let mut file = file;
        file.write_all(contents)?;
        file.flush()?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
