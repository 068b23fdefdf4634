//! Top-level evaluation entry points.
//!
//! Each wrapper draws quantiles, assembles its design, maps the design through
//! the model's marginals and deterministic levels, and then either returns the
//! unevaluated design (`skip`) or evaluates it. All four share one contract:
//!
//! - `seed: Some(s)` builds a fresh `StdRng` from `s` for this call only;
//!   `None` seeds from OS entropy. The `*_with_rng` variants take a
//!   caller-owned generator instead and ignore `seed`.
//! - Sample counts given as floats are truncated with a warning.
//! - The returned frame is [`Tagged`] with metadata for post-processing.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::design::{self, Design, HybridPlan};
use crate::error::Result;
use crate::evaluate::eval_df;
use crate::frame::DataFrame;
use crate::meta::{DesignMeta, HybridMeta, Tagged};
use crate::model::{DeterministicLevels, Model};
use crate::sampling::{self, LhsCriterion, SampleCount};

/// Options for [`eval_monte_carlo`]
#[derive(Debug, Clone, PartialEq)]
pub struct MonteCarloOptions {
    pub n: SampleCount,
    pub det: DeterministicLevels,
    pub seed: Option<u64>,
    /// Append outputs to the design columns
    pub append: bool,
    /// Return the design without evaluating the model
    pub skip: bool,
}

impl Default for MonteCarloOptions {
    fn default() -> Self {
        Self {
            n: SampleCount::default(),
            det: DeterministicLevels::None,
            seed: None,
            append: true,
            skip: false,
        }
    }
}

/// Options for [`eval_lhs`]
#[derive(Debug, Clone, PartialEq)]
pub struct LhsOptions {
    pub n: SampleCount,
    pub det: DeterministicLevels,
    pub seed: Option<u64>,
    pub append: bool,
    pub skip: bool,
    pub criterion: LhsCriterion,
}

impl Default for LhsOptions {
    fn default() -> Self {
        Self {
            n: SampleCount::default(),
            det: DeterministicLevels::None,
            seed: None,
            append: true,
            skip: false,
            criterion: LhsCriterion::None,
        }
    }
}

/// Options for [`eval_sinews`]
#[derive(Debug, Clone, PartialEq)]
pub struct SinewOptions {
    /// Points along each sweep
    pub n_density: SampleCount,
    /// Sweeps per random variable
    pub n_sweeps: SampleCount,
    pub det: DeterministicLevels,
    pub seed: Option<u64>,
    /// Label column naming the swept variable
    pub varname: String,
    /// Label column holding the sweep index
    pub indname: String,
    pub append: bool,
    pub skip: bool,
}

impl Default for SinewOptions {
    fn default() -> Self {
        Self {
            n_density: SampleCount::Exact(10),
            n_sweeps: SampleCount::Exact(3),
            det: DeterministicLevels::None,
            seed: None,
            varname: "sweep_var".into(),
            indname: "sweep_ind".into(),
            append: true,
            skip: false,
        }
    }
}

/// Options for [`eval_hybrid`]
#[derive(Debug, Clone, PartialEq)]
pub struct HybridOptions {
    pub n: SampleCount,
    pub plan: HybridPlan,
    pub det: DeterministicLevels,
    /// Label column separating base and per-variable blocks
    pub varname: String,
    pub seed: Option<u64>,
    pub append: bool,
    pub skip: bool,
}

impl Default for HybridOptions {
    fn default() -> Self {
        Self {
            n: SampleCount::default(),
            plan: HybridPlan::First,
            det: DeterministicLevels::None,
            varname: "hybrid_var".into(),
            seed: None,
            append: true,
            skip: false,
        }
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Quantiles → marginals → label columns → deterministic outer product
fn design_frame<M: Model + ?Sized>(
    model: &M,
    design: &Design,
    det: &DeterministicLevels,
) -> Result<DataFrame> {
    let df_rand = model
        .var_rand_quantile(&design.quantiles)?
        .hconcat(&design.labels)?;
    model.var_outer(&df_rand, det)
}

fn runtime_advisory<M: Model + ?Sized>(model: &M, rows: usize) {
    match model.runtime(rows) {
        Some(seconds) if seconds > 0.0 => tracing::info!(
            model = model.name(),
            rows,
            "estimated runtime for design: {seconds:.3} sec"
        ),
        _ => tracing::info!(
            model = model.name(),
            "design runtime estimates unavailable; model has no timing data"
        ),
    }
}

/// Simple Monte Carlo design, optionally evaluated
pub fn eval_monte_carlo<M: Model + ?Sized>(model: &M, opts: &MonteCarloOptions) -> Result<Tagged> {
    eval_monte_carlo_with_rng(model, opts, &mut seeded_rng(opts.seed))
}

pub fn eval_monte_carlo_with_rng<M, R>(
    model: &M,
    opts: &MonteCarloOptions,
    rng: &mut R,
) -> Result<Tagged>
where
    M: Model + ?Sized,
    R: Rng + ?Sized,
{
    let n = opts.n.resolve("n");
    let design = Design::plain(sampling::uniform(rng, n, model.n_var_rand()));
    let df_samp = design_frame(model, &design, &opts.det)?;

    if opts.skip {
        runtime_advisory(model, df_samp.n_rows());
        return Ok(Tagged::new(
            df_samp,
            DesignMeta::MonteCarloInputs {
                var_rand: model.var_rand().to_vec(),
            },
        ));
    }

    let df_res = eval_df(model, &df_samp, opts.append)?;
    Ok(Tagged::new(
        df_res,
        DesignMeta::MonteCarloOutputs {
            outputs: model.outputs().to_vec(),
        },
    ))
}

/// Latin Hypercube design, optionally evaluated
pub fn eval_lhs<M: Model + ?Sized>(model: &M, opts: &LhsOptions) -> Result<Tagged> {
    eval_lhs_with_rng(model, opts, &mut seeded_rng(opts.seed))
}

pub fn eval_lhs_with_rng<M, R>(model: &M, opts: &LhsOptions, rng: &mut R) -> Result<Tagged>
where
    M: Model + ?Sized,
    R: Rng + ?Sized,
{
    let n = opts.n.resolve("n");
    let quantiles = sampling::latin_hypercube(rng, n, model.n_var_rand(), opts.criterion);
    let df_samp = design_frame(model, &Design::plain(quantiles), &opts.det)?;

    if opts.skip {
        return Ok(Tagged::new(
            df_samp,
            DesignMeta::LhsInputs {
                var_rand: model.var_rand().to_vec(),
            },
        ));
    }

    let df_res = eval_df(model, &df_samp, opts.append)?;
    Ok(Tagged::new(
        df_res,
        DesignMeta::LhsOutputs {
            outputs: model.outputs().to_vec(),
        },
    ))
}

/// Coordinate sweeps through random base points ("sinew" design)
pub fn eval_sinews<M: Model + ?Sized>(model: &M, opts: &SinewOptions) -> Result<Tagged> {
    eval_sinews_with_rng(model, opts, &mut seeded_rng(opts.seed))
}

pub fn eval_sinews_with_rng<M, R>(model: &M, opts: &SinewOptions, rng: &mut R) -> Result<Tagged>
where
    M: Model + ?Sized,
    R: Rng + ?Sized,
{
    let n_density = opts.n_density.resolve("n_density");
    let n_sweeps = opts.n_sweeps.resolve("n_sweeps");
    let supports: Vec<_> = (0..model.n_var_rand()).map(|i| model.support(i)).collect();

    let design = design::sinews(
        rng,
        model.var_rand(),
        &supports,
        n_density,
        n_sweeps,
        &opts.varname,
        &opts.indname,
    )?;
    let df_samp = design_frame(model, &design, &opts.det)?;

    if opts.skip {
        runtime_advisory(model, df_samp.n_rows());
        return Ok(Tagged::new(
            df_samp,
            DesignMeta::SinewInputs {
                var_rand: model.var_rand().to_vec(),
            },
        ));
    }

    let df_res = eval_df(model, &df_samp, opts.append)?;
    Ok(Tagged::new(
        df_res,
        DesignMeta::SinewOutputs {
            var_rand: model.var_rand().to_vec(),
            outputs: model.outputs().to_vec(),
        },
    ))
}

/// Hybrid points for Sobol' indices; post-process with
/// [`tran_sobol`](crate::analysis::tran_sobol).
///
/// References: I.M. Sobol', "Sensitivity Estimates for Nonlinear Mathematical
/// Models" (1999) MMCE, Vol 1.
pub fn eval_hybrid<M: Model + ?Sized>(model: &M, opts: &HybridOptions) -> Result<Tagged> {
    eval_hybrid_with_rng(model, opts, &mut seeded_rng(opts.seed))
}

pub fn eval_hybrid_with_rng<M, R>(model: &M, opts: &HybridOptions, rng: &mut R) -> Result<Tagged>
where
    M: Model + ?Sized,
    R: Rng + ?Sized,
{
    let n = opts.n.resolve("n");
    let design = design::hybrid(rng, model.var_rand(), n, opts.plan, &opts.varname)?;
    let df_samp = design_frame(model, &design, &opts.det)?;

    let meta = DesignMeta::Hybrid(HybridMeta {
        varname: opts.varname.clone(),
        plan: opts.plan,
        var_rand: model.var_rand().to_vec(),
        outputs: model.outputs().to_vec(),
    });

    if opts.skip {
        return Ok(Tagged::new(df_samp, meta));
    }
    Ok(Tagged::new(eval_df(model, &df_samp, opts.append)?, meta))
}
