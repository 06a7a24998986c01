use serde::Serialize;

use crate::error::{CalError, Result};
use crate::model::cllr::cllr;

/// Detection costs at one prior. Both costs are normalized by `min(p, 1 - p)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceReport {
    pub prior: f64,
    pub min_dcf: f64,
    pub act_dcf: f64,
    pub bayes_threshold: f64,
}

impl PerformanceReport {
    pub fn normalizer(&self) -> f64 {
        self.prior.min(1.0 - self.prior)
    }

    pub fn min_dcf_unnormalized(&self) -> f64 {
        self.min_dcf * self.normalizer()
    }

    pub fn act_dcf_unnormalized(&self) -> f64 {
        self.act_dcf * self.normalizer()
    }
}

/// One labelled evaluation of a (positive, negative) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunPerformance {
    pub label: String,
    pub n_pos: usize,
    pub n_neg: usize,
    pub eer: f64,
    pub cllr: f64,
    pub reports: Vec<PerformanceReport>,
}

pub fn validate_prior(prior: f64) -> Result<()> {
    if prior > 0.0 && prior < 1.0 {
        Ok(())
    } else {
        Err(CalError::InvalidPrior(prior))
    }
}

/// NaN has no place in a threshold sweep; infinities sort normally.
pub(crate) fn reject_nan(scores: &[f64], class: &str) -> Result<()> {
    match scores.iter().position(|s| s.is_nan()) {
        Some(i) => Err(CalError::MalformedInput(format!(
            "NaN score at index {i} of the {class} trials"
        ))),
        None => Ok(()),
    }
}

/// Threshold that minimizes expected cost when scores are calibrated LLRs.
pub fn bayes_threshold(prior: f64) -> f64 {
    -(prior / (1.0 - prior)).ln()
}

#[derive(Debug, Clone)]
pub struct PerformanceEvaluator {
    pos: Vec<f64>,
    neg: Vec<f64>,
}

impl PerformanceEvaluator {
    pub fn new(pos: &[f64], neg: &[f64]) -> Result<Self> {
        if pos.is_empty() {
            return Err(CalError::InsufficientData(
                "no positive trials to evaluate".to_string(),
            ));
        }
        if neg.is_empty() {
            return Err(CalError::InsufficientData(
                "no negative trials to evaluate".to_string(),
            ));
        }
        reject_nan(pos, "positive")?;
        reject_nan(neg, "negative")?;
        let mut pos = pos.to_vec();
        let mut neg = neg.to_vec();
        pos.sort_by(|a, b| a.total_cmp(b));
        neg.sort_by(|a, b| a.total_cmp(b));
        Ok(Self { pos, neg })
    }

    pub fn n_pos(&self) -> usize {
        self.pos.len()
    }

    pub fn n_neg(&self) -> usize {
        self.neg.len()
    }

    /// Fraction of positives at or below `threshold`.
    pub fn miss_rate(&self, threshold: f64) -> f64 {
        self.pos.partition_point(|&s| s <= threshold) as f64 / self.pos.len() as f64
    }

    /// Fraction of negatives above `threshold`.
    pub fn false_alarm_rate(&self, threshold: f64) -> f64 {
        let below = self.neg.partition_point(|&s| s <= threshold);
        (self.neg.len() - below) as f64 / self.neg.len() as f64
    }

    pub fn cost(&self, prior: f64, threshold: f64) -> f64 {
        prior * self.miss_rate(threshold) + (1.0 - prior) * self.false_alarm_rate(threshold)
    }

    fn thresholds(&self) -> impl Iterator<Item = f64> + '_ {
        std::iter::once(f64::NEG_INFINITY)
            .chain(self.pos.iter().copied())
            .chain(self.neg.iter().copied())
            .chain(std::iter::once(f64::INFINITY))
    }

    /// Unnormalized cost at the best threshold.
    pub fn min_cost(&self, prior: f64) -> f64 {
        self.thresholds()
            .map(|t| self.cost(prior, t))
            .fold(f64::INFINITY, f64::min)
    }

    /// Unnormalized cost at the Bayes threshold for `prior`.
    pub fn actual_cost(&self, prior: f64) -> f64 {
        self.cost(prior, bayes_threshold(prior))
    }

    pub fn report(&self, prior: f64) -> Result<PerformanceReport> {
        validate_prior(prior)?;
        let norm = prior.min(1.0 - prior);
        Ok(PerformanceReport {
            prior,
            min_dcf: self.min_cost(prior) / norm,
            act_dcf: self.actual_cost(prior) / norm,
            bayes_threshold: bayes_threshold(prior),
        })
    }

    pub fn evaluate(&self, priors: &[f64]) -> Result<Vec<PerformanceReport>> {
        priors.iter().map(|&p| self.report(p)).collect()
    }

    /// Rate where miss and false-alarm curves cross, interpolated between the
    /// two sweep points that bracket the crossing.
    pub fn eer(&self) -> f64 {
        let mut candidates: Vec<f64> = self.thresholds().collect();
        candidates.sort_by(|a, b| a.total_cmp(b));
        candidates.dedup();

        let mut prev = (0.0f64, 1.0f64);
        for (i, &t) in candidates.iter().enumerate() {
            let cur = (self.miss_rate(t), self.false_alarm_rate(t));
            if cur.0 >= cur.1 {
                if i == 0 {
                    return (cur.0 + cur.1) / 2.0;
                }
                let (m0, f0) = prev;
                let (m1, f1) = cur;
                let denom = (m1 - m0) + (f0 - f1);
                if denom <= 0.0 {
                    return (m1 + f1) / 2.0;
                }
                let frac = (f0 - m0) / denom;
                return m0 + frac * (m1 - m0);
            }
            prev = cur;
        }
        // +inf is always a candidate and gives miss = 1, fa = 0.
        (prev.0 + prev.1) / 2.0
    }
}

pub fn evaluate_run(label: &str, pos: &[f64], neg: &[f64], priors: &[f64]) -> Result<RunPerformance> {
    let evaluator = PerformanceEvaluator::new(pos, neg)?;
    let reports = evaluator.evaluate(priors)?;
    Ok(RunPerformance {
        label: label.to_string(),
        n_pos: evaluator.n_pos(),
        n_neg: evaluator.n_neg(),
        eer: evaluator.eer(),
        cllr: cllr(pos, neg)?,
        reports,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/dcf.rs"]
mod tests;
