use serde::Deserialize;

use crate::error::Result;
use crate::model::dcf::validate_prior;
use crate::model::scores::AlignMode;

pub const DEFAULT_PTAR: f64 = 0.01;

/// Evaluation settings: the operating points to report and how strictly
/// scores must cover the key.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvalConfig {
    pub priors: Vec<f64>,
    pub alignment: AlignMode,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self::default_v1()
    }
}

impl EvalConfig {
    pub fn default_v1() -> Self {
        Self::with_ptar(DEFAULT_PTAR)
    }

    pub fn with_ptar(ptar: f64) -> Self {
        let mut cfg = Self {
            priors: vec![ptar, 0.5],
            alignment: AlignMode::Strict,
        };
        cfg.dedup_priors();
        cfg
    }

    /// Drops repeated priors, keeping the first occurrence.
    pub fn dedup_priors(&mut self) {
        let mut seen: Vec<f64> = Vec::with_capacity(self.priors.len());
        self.priors.retain(|p| {
            if seen.contains(p) {
                false
            } else {
                seen.push(*p);
                true
            }
        });
    }

    pub fn validate(&self) -> Result<()> {
        for &p in &self.priors {
            validate_prior(p)?;
        }
        Ok(())
    }
}
