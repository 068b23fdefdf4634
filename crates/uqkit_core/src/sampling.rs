//! Raw quantile samplers.
//!
//! Every sampler returns an n×d [`QuantileMatrix`] with entries in [0, 1], one
//! column per random variable. Randomness comes from the generator handed in by
//! the caller; nothing here touches process-wide state.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use crate::error::{DesignError, Result};
use crate::frame::{Column, DataFrame};

/// Number of candidate hypercubes scored by the maxmin and correlation criteria
const LHS_ITERATIONS: usize = 5;

/// Dense row-major matrix of quantiles.
///
/// Row `i` is one design point; column `j` follows the model's random-variable order.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl QuantileMatrix {
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Create a matrix from row-major data. Returns `None` on a shape mismatch.
    pub fn from_data(rows: usize, cols: usize, data: Vec<f64>) -> Option<Self> {
        (data.len() == rows * cols).then_some(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn set_row(&mut self, row: usize, values: &[f64]) {
        self.data[row * self.cols..(row + 1) * self.cols].copy_from_slice(values);
    }

    pub fn column(&self, col: usize) -> Vec<f64> {
        (0..self.rows).map(|i| self.get(i, col)).collect()
    }

    /// Label the columns with variable names
    pub fn to_frame<S: AsRef<str>>(&self, names: &[S]) -> Result<DataFrame> {
        if names.len() != self.cols {
            return Err(DesignError::invalid(format!(
                "{} column names for {} quantile columns",
                names.len(),
                self.cols
            )));
        }
        DataFrame::from_columns(
            names
                .iter()
                .enumerate()
                .map(|(j, name)| (name.as_ref().to_string(), Column::Float(self.column(j)))),
        )
    }
}

/// Sample-count parameter.
///
/// Counts supplied as floats (`1e3`) are accepted and truncated to a
/// non-negative integer with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SampleCount {
    Exact(usize),
    Approx(f64),
}

/// Reads a bare number; negative integers are kept as `Approx` so that
/// [`SampleCount::resolve`] clamps them with a warning.
impl<'de> Deserialize<'de> for SampleCount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct CountVisitor;

        impl Visitor<'_> for CountVisitor {
            type Value = SampleCount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a sample count")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<SampleCount, E> {
                usize::try_from(v)
                    .map(SampleCount::Exact)
                    .map_err(|_| E::custom(format!("sample count {v} is too large")))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<SampleCount, E> {
                match u64::try_from(v) {
                    Ok(v) => self.visit_u64(v),
                    Err(_) => Ok(SampleCount::Approx(v as f64)),
                }
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<SampleCount, E> {
                Ok(SampleCount::Approx(v))
            }
        }

        deserializer.deserialize_any(CountVisitor)
    }
}

impl SampleCount {
    /// Resolve to an integer count, warning when coercion was needed.
    pub fn resolve(self, param: &str) -> usize {
        match self {
            SampleCount::Exact(n) => n,
            SampleCount::Approx(x) => {
                let n = if x.is_finite() && x > 0.0 { x.trunc() as usize } else { 0 };
                tracing::warn!(param, value = x, rounded = n, "rounding non-integer sample count");
                n
            }
        }
    }
}

impl Default for SampleCount {
    fn default() -> Self {
        SampleCount::Exact(1)
    }
}

impl From<usize> for SampleCount {
    fn from(n: usize) -> Self {
        SampleCount::Exact(n)
    }
}

impl From<u32> for SampleCount {
    fn from(n: u32) -> Self {
        SampleCount::Exact(n as usize)
    }
}

impl From<f64> for SampleCount {
    fn from(x: f64) -> Self {
        SampleCount::Approx(x)
    }
}

/// Space-filling criterion for Latin Hypercube designs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LhsCriterion {
    /// Random position within each stratum
    #[default]
    None,
    /// Stratum midpoints
    #[serde(alias = "c")]
    Center,
    /// Best of several random hypercubes by minimum pairwise distance
    #[serde(alias = "m")]
    Maxmin,
    /// Maxmin over centered hypercubes
    #[serde(alias = "cm")]
    CenterMaxmin,
    /// Best of several random hypercubes by maximum absolute column correlation
    #[serde(alias = "corr")]
    Correlation,
}

impl FromStr for LhsCriterion {
    type Err = DesignError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(LhsCriterion::None),
            "center" | "c" => Ok(LhsCriterion::Center),
            "maxmin" | "m" => Ok(LhsCriterion::Maxmin),
            "centermaxmin" | "cm" => Ok(LhsCriterion::CenterMaxmin),
            "correlation" | "corr" => Ok(LhsCriterion::Correlation),
            other => Err(DesignError::invalid(format!(
                "unsupported LHS criterion `{other}`; expected one of none, center, maxmin, centermaxmin, correlation"
            ))),
        }
    }
}

impl fmt::Display for LhsCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LhsCriterion::None => "none",
            LhsCriterion::Center => "center",
            LhsCriterion::Maxmin => "maxmin",
            LhsCriterion::CenterMaxmin => "centermaxmin",
            LhsCriterion::Correlation => "correlation",
        };
        f.write_str(name)
    }
}

/// Independent U[0, 1) draws, filled row by row
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, n: usize, d: usize) -> QuantileMatrix {
    let data = (0..n * d).map(|_| rng.random::<f64>()).collect();
    QuantileMatrix { rows: n, cols: d, data }
}

/// Latin Hypercube sample of `n` points in `d` dimensions
pub fn latin_hypercube<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    d: usize,
    criterion: LhsCriterion,
) -> QuantileMatrix {
    match criterion {
        LhsCriterion::None => lhs_classic(rng, n, d),
        LhsCriterion::Center => lhs_centered(rng, n, d),
        LhsCriterion::Maxmin => best_of(rng, |r| lhs_classic(r, n, d), min_pairwise_distance),
        LhsCriterion::CenterMaxmin => {
            best_of(rng, |r| lhs_centered(r, n, d), min_pairwise_distance)
        }
        LhsCriterion::Correlation => {
            best_of(rng, |r| lhs_classic(r, n, d), |m| -max_abs_correlation(m))
        }
    }
}

/// Stratum edges `k / n` for `k` in `0..=n`
fn cuts(n: usize) -> Vec<f64> {
    (0..=n).map(|k| k as f64 / n as f64).collect()
}

fn lhs_classic<R: Rng + ?Sized>(rng: &mut R, n: usize, d: usize) -> QuantileMatrix {
    let cut = cuts(n);
    // One random point inside each stratum, per column
    let points: Vec<f64> = (0..n * d)
        .map(|k| {
            let stratum = k / d;
            let u: f64 = rng.random();
            cut[stratum] + u * (cut[stratum + 1] - cut[stratum])
        })
        .collect();

    let mut out = QuantileMatrix::zeros(n, d);
    let mut order: Vec<usize> = (0..n).collect();
    for j in 0..d {
        order.shuffle(rng);
        for (i, &src) in order.iter().enumerate() {
            out.set(i, j, points[src * d + j]);
        }
    }
    out
}

fn lhs_centered<R: Rng + ?Sized>(rng: &mut R, n: usize, d: usize) -> QuantileMatrix {
    let cut = cuts(n);
    let centers: Vec<f64> = cut.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect();

    let mut out = QuantileMatrix::zeros(n, d);
    let mut column = centers;
    for j in 0..d {
        column.shuffle(rng);
        for (i, &value) in column.iter().enumerate() {
            out.set(i, j, value);
        }
    }
    out
}

/// Draw `LHS_ITERATIONS` candidates and keep the highest-scoring one.
/// Ties keep the earlier candidate.
fn best_of<R, G, S>(rng: &mut R, mut generate: G, score: S) -> QuantileMatrix
where
    R: Rng + ?Sized,
    G: FnMut(&mut R) -> QuantileMatrix,
    S: Fn(&QuantileMatrix) -> f64,
{
    let mut best = generate(rng);
    let mut best_score = score(&best);
    for _ in 1..LHS_ITERATIONS {
        let candidate = generate(rng);
        let s = score(&candidate);
        if s > best_score {
            best = candidate;
            best_score = s;
        }
    }
    best
}

fn min_pairwise_distance(m: &QuantileMatrix) -> f64 {
    let mut min = f64::INFINITY;
    for i in 0..m.rows() {
        for k in (i + 1)..m.rows() {
            let dist = m
                .row(i)
                .iter()
                .zip(m.row(k))
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
                .sqrt();
            min = min.min(dist);
        }
    }
    if min.is_finite() { min } else { 0.0 }
}

fn max_abs_correlation(m: &QuantileMatrix) -> f64 {
    let columns: Vec<Vec<f64>> = (0..m.cols()).map(|j| m.column(j)).collect();
    let mut max = 0.0_f64;
    for a in 0..columns.len() {
        for b in (a + 1)..columns.len() {
            let r = pearson(&columns[a], &columns[b]);
            if r.is_finite() {
                max = max.max(r.abs());
            }
        }
    }
    max
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mx = x.iter().sum::<f64>() / n;
    let my = y.iter().sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        sxy += (a - mx) * (b - my);
        sxx += (a - mx).powi(2);
        syy += (b - my).powi(2);
    }
    sxy / (sxx * syy).sqrt()
}
