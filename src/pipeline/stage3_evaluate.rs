use crate::error::Result;
use crate::model::dcf::{RunPerformance, evaluate_run};
use crate::pipeline::stage2_calibrate::TrialPair;

pub const BEFORE_LABEL: &str = "before calibration";
pub const AFTER_LABEL: &str = "after calibration";

pub fn run_stage3(trials: &TrialPair, priors: &[f64]) -> Result<Vec<RunPerformance>> {
    let before = evaluate_run(BEFORE_LABEL, &trials.raw.pos, &trials.raw.neg, priors)?;
    let after = evaluate_run(
        AFTER_LABEL,
        &trials.calibrated.pos,
        &trials.calibrated.neg,
        priors,
    )?;
    for run in [&before, &after] {
        for r in &run.reports {
            tracing::debug!(
                run = %run.label,
                prior = r.prior,
                min_dcf = r.min_dcf,
                act_dcf = r.act_dcf,
                "detection cost"
            );
        }
    }
    Ok(vec![before, after])
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_evaluate.rs"]
mod tests;
