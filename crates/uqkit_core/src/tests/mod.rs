//! End-to-end tests for the design and post-processing pipeline
//!
//! Tests are organized by topic:
//! - `designs` - Row-count and layout properties of every orchestration wrapper
//! - `sobol` - Index recovery on models with known variance decompositions
//! - `projections` - Active subspace and inner-product pipelines

mod projections;
mod sobol;

use crate::model::{FunctionModel, Marginal};

/// y = a·x1 + b·x2 with x1, x2 ~ U(0, 1) independent.
///
/// First-order indices are a² / (a² + b²) and b² / (a² + b²).
pub(crate) fn linear_model(a: f64, b: f64) -> FunctionModel {
    FunctionModel::builder("linear")
        .marginal("x1", Marginal::Uniform { lower: 0.0, upper: 1.0 })
        .marginal("x2", Marginal::Uniform { lower: 0.0, upper: 1.0 })
        .outputs(["y"])
        .function(move |x| vec![a * x[0] + b * x[1]])
        .build()
        .unwrap()
}
