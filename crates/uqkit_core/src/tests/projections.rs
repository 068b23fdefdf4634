//! Tests for active subspace and inner-product pipelines
//!
//! These tests verify that:
//! - A constant gradient yields a rank-one active subspace along that gradient
//! - Projecting samples on the leading direction recovers a linear output up to scale

use crate::analysis::{AsubOptions, InnerOptions, tran_asub, tran_inner};
use crate::experiment::{MonteCarloOptions, eval_monte_carlo};
use crate::frame::{Column, DataFrame};

use super::linear_model;

#[test]
fn test_constant_gradient_projection() {
    let md = linear_model(1.0, 2.0);
    let df_base = eval_monte_carlo(
        &md,
        &MonteCarloOptions {
            n: 50usize.into(),
            seed: Some(5),
            ..Default::default()
        },
    )
    .unwrap()
    .into_frame();

    // Gradient of y = x1 + 2 x2 is (1, 2) everywhere
    let n = df_base.n_rows();
    let df_grad = DataFrame::from_columns([
        ("Dy_Dx1", Column::Float(vec![1.0; n])),
        ("Dy_Dx2", Column::Float(vec![2.0; n])),
    ])
    .unwrap();

    let df_as = tran_asub(&df_grad, &AsubOptions::default()).unwrap();
    assert_eq!(df_as.n_rows(), 2);
    let lam = df_as.float("lam").unwrap();
    assert!((lam[0] - (5.0 * n as f64).sqrt()).abs() < 1e-9);
    assert!(lam[1].abs() < 1e-9);

    // Keep only the leading direction
    let df_lead = df_as.take(&[0]);
    let df_dot = tran_inner(
        &df_base,
        &df_lead,
        &InnerOptions {
            name: Some("out".into()),
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(df_dot.n_rows(), n);
    let dot = df_dot.float("dot").unwrap();
    let y = df_dot.float("y").unwrap();
    for (d, y) in dot.iter().zip(y) {
        assert!((d.abs() * 5f64.sqrt() - y.abs()).abs() < 1e-9);
    }
}
