use ndarray::Array2;

use crate::error::{CalError, Result};
use crate::model::index_ids;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrialLabel {
    Target,
    NonTarget,
    Unused,
}

impl TrialLabel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "target" | "tgt" | "1" => Some(TrialLabel::Target),
            "nontarget" | "non-target" | "imp" | "impostor" | "-1" => Some(TrialLabel::NonTarget),
            "unused" | "0" => Some(TrialLabel::Unused),
            _ => None,
        }
    }

    pub fn is_evaluated(self) -> bool {
        !matches!(self, TrialLabel::Unused)
    }
}

/// Ground truth over an enrollment x test grid.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialKey {
    enroll_ids: Vec<String>,
    test_ids: Vec<String>,
    labels: Array2<TrialLabel>,
}

impl TrialKey {
    pub fn new(
        enroll_ids: Vec<String>,
        test_ids: Vec<String>,
        labels: Array2<TrialLabel>,
    ) -> Result<Self> {
        let expected = [enroll_ids.len(), test_ids.len()];
        if labels.shape() != expected.as_slice() {
            return Err(CalError::shape(&expected, labels.shape()));
        }
        index_ids(&enroll_ids, "key enrollment")?;
        index_ids(&test_ids, "key test")?;
        Ok(Self {
            enroll_ids,
            test_ids,
            labels,
        })
    }

    pub(crate) fn from_parts(
        enroll_ids: Vec<String>,
        test_ids: Vec<String>,
        labels: Array2<TrialLabel>,
    ) -> Self {
        Self {
            enroll_ids,
            test_ids,
            labels,
        }
    }

    pub fn enroll_ids(&self) -> &[String] {
        &self.enroll_ids
    }

    pub fn test_ids(&self) -> &[String] {
        &self.test_ids
    }

    pub fn labels(&self) -> &Array2<TrialLabel> {
        &self.labels
    }

    pub fn shape(&self) -> (usize, usize) {
        self.labels.dim()
    }

    pub fn label(&self, row: usize, col: usize) -> TrialLabel {
        self.labels[[row, col]]
    }

    pub fn count(&self, label: TrialLabel) -> usize {
        self.labels.iter().filter(|&&l| l == label).count()
    }

    pub fn n_evaluated(&self) -> usize {
        self.labels.iter().filter(|l| l.is_evaluated()).count()
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/key.rs"]
mod tests;
