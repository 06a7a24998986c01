use crate::model::dcf::RunPerformance;
use crate::report::format_f64_4;

const MIN_LABEL_WIDTH: usize = 20;
const MIN_VALUE_WIDTH: usize = 8;

/// Comparison table: one header row, one row per run.
pub fn render_comparison_table(runs: &[RunPerformance], priors: &[f64]) -> String {
    let mut out = String::new();
    if let Some(first) = runs.first() {
        out.push_str(&format!(
            "Results before and after calibration on test {} positive and {} negative samples\n",
            first.n_pos, first.n_neg
        ));
    }

    let mut columns = vec!["EER".to_string()];
    for p in priors {
        columns.push(format!("minDCF@{p}"));
        columns.push(format!("actDCF@{p}"));
    }
    columns.push("Cllr".to_string());

    let label_width = runs
        .iter()
        .map(|r| r.label.len())
        .max()
        .unwrap_or(0)
        .max(MIN_LABEL_WIDTH);
    let widths: Vec<usize> = columns
        .iter()
        .map(|c| c.len().max(MIN_VALUE_WIDTH))
        .collect();

    out.push_str(&format!("{:<label_width$}", ""));
    for (col, &w) in columns.iter().zip(&widths) {
        out.push_str(&format!("  {col:>w$}"));
    }
    out.push('\n');

    for run in runs {
        let mut values = vec![run.eer];
        for r in &run.reports {
            values.push(r.min_dcf);
            values.push(r.act_dcf);
        }
        values.push(run.cllr);

        out.push_str(&format!("{:<label_width$}", run.label));
        for (v, &w) in values.iter().zip(&widths) {
            out.push_str(&format!("  {:>w$}", format_f64_4(*v)));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/text.rs"]
mod tests;
