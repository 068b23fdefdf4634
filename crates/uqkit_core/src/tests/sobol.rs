//! Tests for Sobol' index recovery
//!
//! These tests verify that:
//! - First-order indices of a linear model match a² / (a² + b²)
//! - Total indices of an additive model match the first-order ones
//! - Post-processing rejects frames without hybrid metadata

use crate::analysis::{SobolOptions, tran_sobol};
use crate::design::HybridPlan;
use crate::error::DesignError;
use crate::experiment::{HybridOptions, MonteCarloOptions, eval_hybrid, eval_monte_carlo};

use super::linear_model;

#[test]
fn test_first_order_indices_linear_model() {
    let md = linear_model(1.0, 2.0);
    let df = eval_hybrid(
        &md,
        &HybridOptions {
            n: 20_000usize.into(),
            seed: Some(101),
            ..Default::default()
        },
    )
    .unwrap();

    let res = tran_sobol(&df, &SobolOptions::default()).unwrap();
    assert_eq!(res.text("ind").unwrap(), &["S_x1", "S_x2"]);

    let s = res.float("y").unwrap();
    assert!((s[0] - 0.2).abs() < 0.08, "S_x1 = {}", s[0]);
    assert!((s[1] - 0.8).abs() < 0.08, "S_x2 = {}", s[1]);
    assert!((s[0] + s[1] - 1.0).abs() < 0.15, "sum = {}", s[0] + s[1]);
}

#[test]
fn test_total_indices_additive_model() {
    let md = linear_model(1.0, 2.0);
    let df = eval_hybrid(
        &md,
        &HybridOptions {
            n: 20_000usize.into(),
            plan: HybridPlan::Total,
            seed: Some(202),
            ..Default::default()
        },
    )
    .unwrap();

    let full = tran_sobol(
        &df,
        &SobolOptions {
            full: true,
            digits: 3,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(
        full.text("ind").unwrap(),
        &["T_x1", "T_x1", "T_x2", "T_x2", "var"]
    );
    let t = full.float("y").unwrap();
    // Raw rows come first; the normalized rows follow
    assert!((t[1] - 0.2).abs() < 0.08, "T_x1 = {}", t[1]);
    assert!((t[3] - 0.8).abs() < 0.08, "T_x2 = {}", t[3]);
    // var(y) = 5 / 12
    assert!((t[4] - 5.0 / 12.0).abs() < 0.03, "var = {}", t[4]);

    let filtered = tran_sobol(&df, &SobolOptions::default()).unwrap();
    assert_eq!(filtered.n_rows(), 0);
}

#[test]
fn test_rejects_non_hybrid_frame() {
    let md = linear_model(1.0, 1.0);
    let df = eval_monte_carlo(
        &md,
        &MonteCarloOptions {
            n: 10usize.into(),
            seed: Some(1),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(matches!(
        tran_sobol(&df, &SobolOptions::default()),
        Err(DesignError::MetadataMismatch { .. })
    ));
}

#[test]
fn test_unknown_plan_rejected_before_sampling() {
    let err = "second".parse::<HybridPlan>().unwrap_err();
    assert!(matches!(err, DesignError::InvalidArgument(_)));
}
