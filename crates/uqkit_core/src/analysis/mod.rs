//! Post-processors for evaluated designs.
//!
//! - [`tran_sobol`] turns hybrid-point results into first-order or total
//!   Sobol' indices.
//! - [`tran_asub`] / [`active_subspace`] estimate active-subspace directions
//!   from gradient samples.
//! - [`tran_inner`] projects data rows onto weight vectors, e.g. the leading
//!   active-subspace direction of each output.
//!
//! ```ignore
//! use uqkit_core::analysis::{SobolOptions, tran_sobol};
//! use uqkit_core::experiment::{HybridOptions, eval_hybrid};
//!
//! let df_first = eval_hybrid(&model, &HybridOptions { n: 1000usize.into(), ..Default::default() })?;
//! let indices = tran_sobol(&df_first, &SobolOptions::default())?;
//! ```

mod asub;
mod inner;
mod sobol;

pub use asub::*;
pub use inner::*;
pub use sobol::*;
