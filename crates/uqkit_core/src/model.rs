//! The model seam.
//!
//! Designs are built against the [`Model`] trait: it names the random and
//! deterministic inputs, maps quantiles onto each random variable's marginal,
//! expands random draws against deterministic levels and evaluates single rows.
//! [`FunctionModel`] is a closure-backed implementation with independent
//! marginals, enough for demos, tests and benchmarks.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::design::Support;
use crate::error::{DesignError, Result};
use crate::frame::{Column, DataFrame};
use crate::sampling::QuantileMatrix;

/// Deterministic-variable levels to cross with random draws
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DeterministicLevels {
    /// No deterministic expansion; only valid for models without deterministic inputs
    #[default]
    None,
    /// The model's nominal levels
    Nominal,
    /// Explicit levels, one row per level combination
    Levels(DataFrame),
}

pub trait Model: Sync {
    fn name(&self) -> &str;

    /// Random-variable names; this order is the column order of every design
    fn var_rand(&self) -> &[String];

    fn var_det(&self) -> &[String] {
        &[]
    }

    fn outputs(&self) -> &[String];

    fn n_var_rand(&self) -> usize {
        self.var_rand().len()
    }

    /// Finiteness of the marginal quantile at 0 and 1 for random variable `i`
    fn support(&self, _i: usize) -> Support {
        Support::BOUNDED
    }

    /// Map a quantile matrix onto random-variable values, one column per variable
    fn var_rand_quantile(&self, quantiles: &QuantileMatrix) -> Result<DataFrame>;

    /// Cross random-variable rows with deterministic levels
    fn var_outer(&self, df_rand: &DataFrame, det: &DeterministicLevels) -> Result<DataFrame>;

    /// Estimated seconds to evaluate `rows` design rows, if timing data exists
    fn runtime(&self, _rows: usize) -> Option<f64> {
        None
    }

    /// Evaluate one row; `inputs` follows `var_rand` then `var_det` order
    fn evaluate_row(&self, inputs: &[f64]) -> Result<Vec<f64>>;
}

/// Outer product of two frames.
///
/// Every row of `left` is repeated once per row of `right`, left-row-major;
/// `left`'s columns come first.
pub fn outer_product(left: &DataFrame, right: &DataFrame) -> Result<DataFrame> {
    if right.n_cols() == 0 {
        return Ok(left.clone());
    }
    let m = right.n_rows();
    let n = left.n_rows();
    let left_rows: Vec<usize> = (0..n).flat_map(|i| std::iter::repeat_n(i, m)).collect();
    let right_rows: Vec<usize> = (0..n).flat_map(|_| 0..m).collect();
    left.take(&left_rows).hconcat(&right.take(&right_rows))
}

/// Marginal distribution of one random variable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dist", rename_all = "lowercase")]
pub enum Marginal {
    Uniform { lower: f64, upper: f64 },
    Normal { mean: f64, sd: f64 },
    /// `exp(N(mu, sigma))`
    LogNormal { mu: f64, sigma: f64 },
}

impl Marginal {
    fn validate(&self, name: &str) -> Result<()> {
        let ok = match *self {
            Marginal::Uniform { lower, upper } => {
                lower.is_finite() && upper.is_finite() && lower < upper
            }
            Marginal::Normal { mean, sd } => mean.is_finite() && sd.is_finite() && sd > 0.0,
            Marginal::LogNormal { mu, sigma } => {
                mu.is_finite() && sigma.is_finite() && sigma > 0.0
            }
        };
        if ok {
            Ok(())
        } else {
            Err(DesignError::Model(format!(
                "invalid marginal parameters for `{name}`: {self:?}"
            )))
        }
    }

    /// Value at quantile `q` in [0, 1]
    pub fn quantile(&self, q: f64) -> f64 {
        match *self {
            Marginal::Uniform { lower, upper } => lower + q * (upper - lower),
            Marginal::Normal { mean, sd } => mean + sd * Normal::standard().inverse_cdf(q),
            Marginal::LogNormal { mu, sigma } => {
                (mu + sigma * Normal::standard().inverse_cdf(q)).exp()
            }
        }
    }

    pub fn support(&self) -> Support {
        Support {
            lower_finite: self.quantile(0.0).is_finite(),
            upper_finite: self.quantile(1.0).is_finite(),
        }
    }
}

type RowFn = dyn Fn(&[f64]) -> Vec<f64> + Send + Sync;

/// Closure-backed model with independent marginals
pub struct FunctionModel {
    name: String,
    var_rand: Vec<String>,
    marginals: Vec<Marginal>,
    var_det: Vec<String>,
    nominal: Vec<f64>,
    outputs: Vec<String>,
    function: Box<RowFn>,
    seconds_per_row: Option<f64>,
}

impl std::fmt::Debug for FunctionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionModel")
            .field("name", &self.name)
            .field("var_rand", &self.var_rand)
            .field("var_det", &self.var_det)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}

impl FunctionModel {
    pub fn builder(name: impl Into<String>) -> FunctionModelBuilder {
        FunctionModelBuilder {
            name: name.into(),
            var_rand: Vec::new(),
            marginals: Vec::new(),
            var_det: Vec::new(),
            nominal: Vec::new(),
            outputs: Vec::new(),
            function: None,
            seconds_per_row: None,
        }
    }

    pub fn marginals(&self) -> &[Marginal] {
        &self.marginals
    }

    fn nominal_levels(&self) -> Result<DataFrame> {
        DataFrame::from_columns(
            self.var_det
                .iter()
                .zip(&self.nominal)
                .map(|(name, &v)| (name.clone(), Column::Float(vec![v]))),
        )
    }
}

impl Model for FunctionModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn var_rand(&self) -> &[String] {
        &self.var_rand
    }

    fn var_det(&self) -> &[String] {
        &self.var_det
    }

    fn outputs(&self) -> &[String] {
        &self.outputs
    }

    fn support(&self, i: usize) -> Support {
        self.marginals[i].support()
    }

    fn var_rand_quantile(&self, quantiles: &QuantileMatrix) -> Result<DataFrame> {
        if quantiles.cols() != self.var_rand.len() {
            return Err(DesignError::Model(format!(
                "quantile matrix has {} columns, model `{}` has {} random variables",
                quantiles.cols(),
                self.name,
                self.var_rand.len()
            )));
        }
        DataFrame::from_columns(self.var_rand.iter().enumerate().map(|(j, name)| {
            let marginal = self.marginals[j];
            let values = quantiles
                .column(j)
                .into_iter()
                .map(|q| marginal.quantile(q))
                .collect();
            (name.clone(), Column::Float(values))
        }))
    }

    fn var_outer(&self, df_rand: &DataFrame, det: &DeterministicLevels) -> Result<DataFrame> {
        match det {
            DeterministicLevels::None if self.var_det.is_empty() => Ok(df_rand.clone()),
            DeterministicLevels::None => Err(DesignError::invalid(format!(
                "model `{}` has deterministic variables {:?}; provide levels or use nominal",
                self.name, self.var_det
            ))),
            DeterministicLevels::Nominal => outer_product(df_rand, &self.nominal_levels()?),
            DeterministicLevels::Levels(levels) => {
                if let Some(missing) = self.var_det.iter().find(|v| !levels.has_column(v)) {
                    return Err(DesignError::invalid(format!(
                        "deterministic levels missing column `{missing}`"
                    )));
                }
                outer_product(df_rand, &levels.select(&self.var_det)?)
            }
        }
    }

    fn runtime(&self, rows: usize) -> Option<f64> {
        self.seconds_per_row.map(|s| s * rows as f64)
    }

    fn evaluate_row(&self, inputs: &[f64]) -> Result<Vec<f64>> {
        let out = (self.function)(inputs);
        if out.len() != self.outputs.len() {
            return Err(DesignError::Model(format!(
                "model `{}` returned {} outputs, expected {}",
                self.name,
                out.len(),
                self.outputs.len()
            )));
        }
        Ok(out)
    }
}

/// Fluent builder for [`FunctionModel`]
pub struct FunctionModelBuilder {
    name: String,
    var_rand: Vec<String>,
    marginals: Vec<Marginal>,
    var_det: Vec<String>,
    nominal: Vec<f64>,
    outputs: Vec<String>,
    function: Option<Box<RowFn>>,
    seconds_per_row: Option<f64>,
}

impl FunctionModelBuilder {
    /// Add a random variable
    pub fn marginal(mut self, name: impl Into<String>, marginal: Marginal) -> Self {
        self.var_rand.push(name.into());
        self.marginals.push(marginal);
        self
    }

    /// Add a deterministic variable with its nominal level
    pub fn deterministic(mut self, name: impl Into<String>, nominal: f64) -> Self {
        self.var_det.push(name.into());
        self.nominal.push(nominal);
        self
    }

    pub fn outputs<I, S>(mut self, outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs = outputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn function<F>(mut self, f: F) -> Self
    where
        F: Fn(&[f64]) -> Vec<f64> + Send + Sync + 'static,
    {
        self.function = Some(Box::new(f));
        self
    }

    /// Per-row timing used for runtime advisories
    pub fn runtime(mut self, seconds_per_row: f64) -> Self {
        self.seconds_per_row = Some(seconds_per_row);
        self
    }

    pub fn build(self) -> Result<FunctionModel> {
        let function = self
            .function
            .ok_or_else(|| DesignError::Model(format!("model `{}` has no function", self.name)))?;
        for (name, marginal) in self.var_rand.iter().zip(&self.marginals) {
            marginal.validate(name)?;
        }
        let mut seen: Vec<&String> = Vec::new();
        for name in self.var_rand.iter().chain(&self.var_det) {
            if seen.contains(&name) {
                return Err(DesignError::Model(format!("duplicate input name `{name}`")));
            }
            seen.push(name);
        }
        Ok(FunctionModel {
            name: self.name,
            var_rand: self.var_rand,
            marginals: self.marginals,
            var_det: self.var_det,
            nominal: self.nominal,
            outputs: self.outputs,
            function,
            seconds_per_row: self.seconds_per_row,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> FunctionModel {
        FunctionModel::builder("affine")
            .marginal("x", Marginal::Uniform { lower: -1.0, upper: 1.0 })
            .marginal("z", Marginal::Normal { mean: 0.0, sd: 2.0 })
            .deterministic("c", 3.0)
            .outputs(["y"])
            .function(|v| vec![v[0] + v[1] + v[2]])
            .build()
            .unwrap()
    }

    #[test]
    fn test_marginal_quantiles() {
        let u = Marginal::Uniform { lower: 2.0, upper: 4.0 };
        assert_eq!(u.quantile(0.25), 2.5);
        assert_eq!(u.support(), Support::BOUNDED);

        let n = Marginal::Normal { mean: 1.0, sd: 2.0 };
        assert!((n.quantile(0.5) - 1.0).abs() < 1e-9);
        assert!((n.quantile(0.975) - (1.0 + 2.0 * 1.959964)).abs() < 1e-4);
        assert_eq!(n.support(), Support::UNBOUNDED);

        let ln = Marginal::LogNormal { mu: 0.0, sigma: 1.0 };
        assert!((ln.quantile(0.5) - 1.0).abs() < 1e-9);
        assert_eq!(
            ln.support(),
            Support {
                lower_finite: true,
                upper_finite: false
            }
        );
    }

    #[test]
    fn test_builder_rejects_bad_marginal() {
        let res = FunctionModel::builder("bad")
            .marginal("x", Marginal::Normal { mean: 0.0, sd: -1.0 })
            .outputs(["y"])
            .function(|v| vec![v[0]])
            .build();
        assert!(matches!(res, Err(DesignError::Model(_))));
    }

    #[test]
    fn test_var_outer_nominal_and_levels() {
        let md = model();
        let q = QuantileMatrix::from_data(2, 2, vec![0.5, 0.5, 1.0, 0.5]).unwrap();
        let df_rand = md.var_rand_quantile(&q).unwrap();
        assert_eq!(df_rand.float("x").unwrap(), &[0.0, 1.0]);

        let nominal = md.var_outer(&df_rand, &DeterministicLevels::Nominal).unwrap();
        assert_eq!(nominal.names(), &["x", "z", "c"]);
        assert_eq!(nominal.float("c").unwrap(), &[3.0, 3.0]);

        let levels = DataFrame::from_columns([("c", Column::Float(vec![0.0, 10.0, 20.0]))]).unwrap();
        let crossed = md
            .var_outer(&df_rand, &DeterministicLevels::Levels(levels))
            .unwrap();
        assert_eq!(crossed.n_rows(), 6);
        assert_eq!(crossed.float("x").unwrap(), &[0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        assert_eq!(crossed.float("c").unwrap(), &[0.0, 10.0, 20.0, 0.0, 10.0, 20.0]);

        assert!(md.var_outer(&df_rand, &DeterministicLevels::None).is_err());
    }

    #[test]
    fn test_evaluate_row_checks_output_count() {
        let md = FunctionModel::builder("short")
            .marginal("x", Marginal::Uniform { lower: 0.0, upper: 1.0 })
            .outputs(["a", "b"])
            .function(|v| vec![v[0]])
            .build()
            .unwrap();
        assert!(md.evaluate_row(&[0.5]).is_err());
    }
}
