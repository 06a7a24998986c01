use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{CalError, Result};
use crate::model::calibrator::AffineCalibrator;
use crate::model::index_ids;
use crate::model::key::{TrialKey, TrialLabel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignMode {
    /// Every evaluated key trial must have a score.
    #[default]
    Strict,
    /// Use whatever the key and the matrix have in common.
    Lenient,
}

impl AlignMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AlignMode::Strict => "strict",
            AlignMode::Lenient => "lenient",
        }
    }
}

/// Raw or calibrated scores over an enrollment x test grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMatrix {
    enroll_ids: Vec<String>,
    test_ids: Vec<String>,
    values: Array2<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlignedScores {
    pub scores: ScoreMatrix,
    pub key: TrialKey,
}

impl ScoreMatrix {
    pub fn new(enroll_ids: Vec<String>, test_ids: Vec<String>, values: Array2<f64>) -> Result<Self> {
        let expected = [enroll_ids.len(), test_ids.len()];
        if values.shape() != expected.as_slice() {
            return Err(CalError::shape(&expected, values.shape()));
        }
        index_ids(&enroll_ids, "score enrollment")?;
        index_ids(&test_ids, "score test")?;
        Ok(Self {
            enroll_ids,
            test_ids,
            values,
        })
    }

    pub fn enroll_ids(&self) -> &[String] {
        &self.enroll_ids
    }

    pub fn test_ids(&self) -> &[String] {
        &self.test_ids
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    /// Same ids and shape, transformed values.
    pub fn calibrated(&self, calibrator: &AffineCalibrator) -> Result<ScoreMatrix> {
        let mut values = Array2::zeros(self.values.raw_dim());
        calibrator.apply_into(&self.values, &mut values)?;
        Ok(ScoreMatrix {
            enroll_ids: self.enroll_ids.clone(),
            test_ids: self.test_ids.clone(),
            values,
        })
    }

    /// Reindexes onto the key's ordering, keeping only ids present on both
    /// sides.
    pub fn align(&self, key: &TrialKey, mode: AlignMode) -> Result<AlignedScores> {
        let score_rows = index_ids(&self.enroll_ids, "score enrollment")?;
        let score_cols = index_ids(&self.test_ids, "score test")?;

        let rows: Vec<Option<usize>> = key
            .enroll_ids()
            .iter()
            .map(|id| score_rows.get(id.as_str()).copied())
            .collect();
        let cols: Vec<Option<usize>> = key
            .test_ids()
            .iter()
            .map(|id| score_cols.get(id.as_str()).copied())
            .collect();

        let mut dropped = 0usize;
        for (kr, sr) in rows.iter().enumerate() {
            for (kc, sc) in cols.iter().enumerate() {
                if sr.is_some() && sc.is_some() {
                    continue;
                }
                if !key.label(kr, kc).is_evaluated() {
                    continue;
                }
                if mode == AlignMode::Strict {
                    return Err(CalError::MissingEntry {
                        enroll: key.enroll_ids()[kr].clone(),
                        test: key.test_ids()[kc].clone(),
                    });
                }
                dropped += 1;
            }
        }
        if dropped > 0 {
            tracing::debug!(
                dropped,
                "lenient alignment dropped key trials without scores"
            );
        }

        let kept_rows: Vec<(usize, usize)> = rows
            .iter()
            .enumerate()
            .filter_map(|(k, s)| s.map(|s| (k, s)))
            .collect();
        let kept_cols: Vec<(usize, usize)> = cols
            .iter()
            .enumerate()
            .filter_map(|(k, s)| s.map(|s| (k, s)))
            .collect();

        let dim = (kept_rows.len(), kept_cols.len());
        let values = Array2::from_shape_fn(dim, |(i, j)| {
            self.values[[kept_rows[i].1, kept_cols[j].1]]
        });
        let labels = Array2::from_shape_fn(dim, |(i, j)| key.label(kept_rows[i].0, kept_cols[j].0));
        let enroll_ids: Vec<String> = kept_rows
            .iter()
            .map(|&(k, _)| key.enroll_ids()[k].clone())
            .collect();
        let test_ids: Vec<String> = kept_cols
            .iter()
            .map(|&(k, _)| key.test_ids()[k].clone())
            .collect();

        Ok(AlignedScores {
            scores: ScoreMatrix {
                enroll_ids: enroll_ids.clone(),
                test_ids: test_ids.clone(),
                values,
            },
            key: TrialKey::from_parts(enroll_ids, test_ids, labels),
        })
    }
}

impl AlignedScores {
    /// Scores at cells carrying `label`, in row-major key order.
    pub fn extract_by_label(&self, label: TrialLabel) -> Vec<f64> {
        self.key
            .labels()
            .iter()
            .zip(self.scores.values.iter())
            .filter(|&(&l, _)| l == label)
            .map(|(_, &v)| v)
            .collect()
    }

    /// (positive, negative) trial scores.
    pub fn split(&self) -> (Vec<f64>, Vec<f64>) {
        (
            self.extract_by_label(TrialLabel::Target),
            self.extract_by_label(TrialLabel::NonTarget),
        )
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/scores.rs"]
mod tests;
