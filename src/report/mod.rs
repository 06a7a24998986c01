use serde::Serialize;

use crate::model::calibrator::AffineCalibrator;
use crate::model::dcf::{PerformanceReport, RunPerformance};

pub mod json;
pub mod text;

#[derive(Debug, Clone, Serialize)]
pub struct PriorSummary {
    pub prior: f64,
    pub bayes_threshold: f64,
    pub min_dcf: f64,
    pub act_dcf: f64,
    pub min_dcf_unnormalized: f64,
    pub act_dcf_unnormalized: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub label: String,
    pub n_pos: usize,
    pub n_neg: usize,
    pub eer: f64,
    pub cllr: f64,
    pub costs: Vec<PriorSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryData {
    pub tool_name: String,
    pub tool_version: String,
    pub input_kind: String,
    pub output_scores: String,
    pub alignment: String,
    pub model: AffineCalibrator,
    pub priors: Vec<f64>,
    pub runs: Vec<RunSummary>,
}

impl From<&PerformanceReport> for PriorSummary {
    fn from(r: &PerformanceReport) -> Self {
        Self {
            prior: r.prior,
            bayes_threshold: r.bayes_threshold,
            min_dcf: r.min_dcf,
            act_dcf: r.act_dcf,
            min_dcf_unnormalized: r.min_dcf_unnormalized(),
            act_dcf_unnormalized: r.act_dcf_unnormalized(),
        }
    }
}

impl From<&RunPerformance> for RunSummary {
    fn from(run: &RunPerformance) -> Self {
        Self {
            label: run.label.clone(),
            n_pos: run.n_pos,
            n_neg: run.n_neg,
            eer: run.eer,
            cllr: run.cllr,
            costs: run.reports.iter().map(PriorSummary::from).collect(),
        }
    }
}

pub fn format_f64_4(v: f64) -> String {
    format!("{:.4}", v)
}
