//! Design-of-experiments and sensitivity analysis library
//!
//! This crate builds sampling plans for a computational model and
//! post-processes the evaluated samples. It supports:
//! - Monte Carlo and Latin Hypercube designs (with space-filling criteria)
//! - Coordinate "sinew" sweeps through random base points
//! - Sobol' hybrid-point designs and first-order / total index estimation
//! - Active-subspace directions from gradient samples
//! - Inner-product projections onto weight vectors
//!
//! # Pipeline
//!
//! ```ignore
//! use uqkit_core::analysis::{SobolOptions, tran_sobol};
//! use uqkit_core::experiment::{HybridOptions, eval_hybrid};
//! use uqkit_core::model::{FunctionModel, Marginal};
//!
//! let model = FunctionModel::builder("linear")
//!     .marginal("x1", Marginal::Uniform { lower: 0.0, upper: 1.0 })
//!     .marginal("x2", Marginal::Uniform { lower: 0.0, upper: 1.0 })
//!     .outputs(["y"])
//!     .function(|x| vec![x[0] + 2.0 * x[1]])
//!     .build()?;
//!
//! let df = eval_hybrid(&model, &HybridOptions { n: 1000usize.into(), seed: Some(101), ..Default::default() })?;
//! let indices = tran_sobol(&df, &SobolOptions::default())?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod analysis;
pub mod design;
pub mod error;
pub mod evaluate;
pub mod experiment;
pub mod sampling;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod frame;
pub mod meta;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use error::{DesignError, Result};
pub use frame::{Column, DataFrame};
pub use meta::{DesignMeta, HybridMeta, Tagged};
pub use model::{DeterministicLevels, FunctionModel, Marginal, Model};
