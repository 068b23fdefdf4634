//! Sobol' index estimation from hybrid-point evaluations.

use rustc_hash::FxHashMap;

use crate::design::{BASE_LABEL, HybridPlan};
use crate::error::{DesignError, Result};
use crate::frame::{Column, DataFrame};
use crate::meta::Tagged;

/// Options for [`tran_sobol`]
#[derive(Debug, Clone, PartialEq)]
pub struct SobolOptions {
    /// Name of the estimator-tag column in the summary
    pub typename: String,
    /// Decimal digits kept when rounding estimates
    pub digits: i32,
    /// Keep the variance and un-normalized rows as well
    pub full: bool,
}

impl Default for SobolOptions {
    fn default() -> Self {
        Self {
            typename: "ind".into(),
            digits: 2,
            full: false,
        }
    }
}

/// One summary row: estimator tag plus one value per output
struct Estimate {
    tag: String,
    values: Vec<f64>,
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let n = values.len() as f64;
    values.sum::<f64>() / n
}

/// Unbiased sample variance; NaN for fewer than two values
fn sample_variance(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mu = mean(values.iter().copied());
    values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / (n - 1.0)
}

fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round_ties_even() / scale
}

/// Estimate Sobol' indices from a hybrid-point result.
///
/// The plan, label column, variables and outputs come from the frame's
/// [`HybridMeta`](crate::meta::HybridMeta). Base rows and each variable block
/// are paired by position, so neither may be reordered after evaluation.
///
/// Rows of the summary are tagged `var`, `T_<var>` and `S_<var>` (plan
/// `first`), or `var` and two `T_<var>` rows, raw then normalized (plan
/// `total`). Unless `full` is set only `S_*` rows are kept, which leaves a
/// `total` summary empty. Undefined ratios (zero or missing variance) are
/// reported as 0.
///
/// References: I.M. Sobol', "Sensitivity Estimates for Nonlinear Mathematical
/// Models" (1999) MMCE, Vol 1.
pub fn tran_sobol(tagged: &Tagged, opts: &SobolOptions) -> Result<DataFrame> {
    let meta = tagged.hybrid()?;
    let df = &tagged.frame;
    if !df.has_column(&meta.varname) {
        return Err(DesignError::invalid(format!(
            "label column `{}` not in frame",
            meta.varname
        )));
    }

    let labels = df.text(&meta.varname)?;
    let mut blocks: FxHashMap<&str, Vec<usize>> = FxHashMap::default();
    for (row, label) in labels.iter().enumerate() {
        blocks.entry(label.as_str()).or_default().push(row);
    }
    let empty = Vec::new();
    let base = blocks.get(BASE_LABEL).unwrap_or(&empty);

    let outputs = meta
        .outputs
        .iter()
        .map(|o| df.numeric(o))
        .collect::<Result<Vec<_>>>()?;

    let variance: Vec<f64> = outputs.iter().map(|y| sample_variance(y)).collect();
    let mut estimates = vec![Estimate {
        tag: "var".into(),
        values: variance.clone(),
    }];

    for var in &meta.var_rand {
        let block = blocks.get(var.as_str()).unwrap_or(&empty);
        if block.len() != base.len() {
            return Err(DesignError::invalid(format!(
                "block `{var}` has {} rows, base block has {}",
                block.len(),
                base.len()
            )));
        }
        let pairs = |y: &Vec<f64>| -> Vec<(f64, f64)> {
            base.iter().zip(block).map(|(&b, &v)| (y[b], y[v])).collect()
        };

        let tau: Vec<f64> = outputs
            .iter()
            .map(|y| {
                let pairs = pairs(y);
                match meta.plan {
                    HybridPlan::First => {
                        let mu_base = mean(pairs.iter().map(|p| p.0));
                        let mu_var = mean(pairs.iter().map(|p| p.1));
                        let mu_tot = 0.5 * (mu_base + mu_var);
                        let cross = mean(pairs.iter().map(|(b, v)| b * v));
                        cross - mu_tot.powi(2)
                    }
                    HybridPlan::Total => 0.5 * mean(pairs.iter().map(|(b, v)| (b - v).powi(2))),
                }
            })
            .collect();

        let normalized: Vec<f64> = tau
            .iter()
            .zip(&variance)
            .map(|(&t, &v)| if v == 0.0 { 0.0 } else { t / v })
            .collect();

        let normalized_tag = match meta.plan {
            HybridPlan::First => format!("S_{var}"),
            HybridPlan::Total => format!("T_{var}"),
        };
        estimates.push(Estimate {
            tag: format!("T_{var}"),
            values: tau,
        });
        estimates.push(Estimate {
            tag: normalized_tag,
            values: normalized,
        });
    }

    for estimate in &mut estimates {
        for value in &mut estimate.values {
            *value = round_to(*value, opts.digits);
        }
    }
    estimates.sort_by(|a, b| a.tag.cmp(&b.tag));
    if !opts.full {
        estimates.retain(|e| e.tag.starts_with('S'));
    }

    let mut summary = DataFrame::new();
    for (j, output) in meta.outputs.iter().enumerate() {
        let values = estimates
            .iter()
            .map(|e| {
                let v = e.values[j];
                if v.is_nan() { 0.0 } else { v }
            })
            .collect();
        summary.insert(output.clone(), Column::Float(values))?;
    }
    summary.insert(
        opts.typename.clone(),
        Column::Text(estimates.into_iter().map(|e| e.tag).collect()),
    )?;

    tracing::debug!(plan = %meta.plan, rows = summary.n_rows(), "estimated Sobol' indices");
    Ok(summary)
}
