//! Design assemblers.
//!
//! Turn raw quantile draws into structured sampling plans: coordinate sweeps
//! ("sinews") and Sobol' hybrid-point blocks. Each assembler returns the
//! quantile matrix together with its per-row label columns.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{DesignError, Result};
use crate::frame::{Column, DataFrame};
use crate::sampling::{self, QuantileMatrix};

/// Label given to rows of the hybrid base block
pub const BASE_LABEL: &str = "_";

/// Whether a random variable's quantile bounds map to finite values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Support {
    pub lower_finite: bool,
    pub upper_finite: bool,
}

impl Support {
    pub const BOUNDED: Support = Support {
        lower_finite: true,
        upper_finite: true,
    };
    pub const UNBOUNDED: Support = Support {
        lower_finite: false,
        upper_finite: false,
    };
}

/// Quantile matrix plus per-row label columns (possibly none)
#[derive(Debug, Clone, PartialEq)]
pub struct Design {
    pub quantiles: QuantileMatrix,
    pub labels: DataFrame,
}

impl Design {
    /// An unlabeled design, as used by Monte Carlo and LHS plans
    #[must_use]
    pub fn plain(quantiles: QuantileMatrix) -> Self {
        Self {
            quantiles,
            labels: DataFrame::new(),
        }
    }

    pub fn n_rows(&self) -> usize {
        self.quantiles.rows()
    }
}

/// Which Sobol' index family a hybrid design targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HybridPlan {
    #[default]
    First,
    Total,
}

impl FromStr for HybridPlan {
    type Err = DesignError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "first" => Ok(HybridPlan::First),
            "total" => Ok(HybridPlan::Total),
            other => Err(DesignError::invalid(format!(
                "plan must be `first` or `total`, got `{other}`"
            ))),
        }
    }
}

impl fmt::Display for HybridPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HybridPlan::First => f.write_str("first"),
            HybridPlan::Total => f.write_str("total"),
        }
    }
}

/// `n` evenly spaced points over [0, 1], endpoints included
fn linspace(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => (0..n).map(|k| k as f64 / (n - 1) as f64).collect(),
    }
}

/// Coordinate-sweep design.
///
/// For every variable and sweep replicate, one block of `n_density` rows holds
/// the sweep's random base point with the variable's column replaced by a grid
/// over [0, 1]. Blocks are ordered variable-major, then sweep. Grid endpoints
/// of variables with unbounded support are pulled inward by `1 / (10 n_density)`.
pub fn sinews<R: Rng + ?Sized>(
    rng: &mut R,
    var_rand: &[String],
    supports: &[Support],
    n_density: usize,
    n_sweeps: usize,
    varname: &str,
    indname: &str,
) -> Result<Design> {
    let d = var_rand.len();
    if supports.len() != d {
        return Err(DesignError::invalid(format!(
            "{} support entries for {d} random variables",
            supports.len()
        )));
    }

    // Base points are drawn variable-major: base[i_var * n_sweeps + i_sweep]
    let base: Vec<f64> = (0..d * n_sweeps).map(|_| rng.random::<f64>()).collect();
    let grid = linspace(n_density);
    let offset = 1.0 / n_density as f64 / 10.0;

    let total = d * n_sweeps * n_density;
    let mut quantiles = QuantileMatrix::zeros(total, d);
    let mut sweep_var = Vec::with_capacity(total);
    let mut sweep_ind = Vec::with_capacity(total);

    let mut start = 0;
    for (i_var, name) in var_rand.iter().enumerate() {
        for i_sweep in 0..n_sweeps {
            let origin: Vec<f64> = (0..d).map(|j| base[j * n_sweeps + i_sweep]).collect();
            for (k, &q) in grid.iter().enumerate() {
                quantiles.set_row(start + k, &origin);
                quantiles.set(start + k, i_var, q);
                sweep_var.push(name.clone());
                sweep_ind.push(i_sweep as i64);
            }

            if n_density > 0 {
                if !supports[i_var].lower_finite {
                    quantiles.set(start, i_var, offset);
                }
                if !supports[i_var].upper_finite {
                    quantiles.set(start + n_density - 1, i_var, 1.0 - offset);
                }
            }
            start += n_density;
        }
    }

    let labels = DataFrame::from_columns([
        (varname, Column::Text(sweep_var)),
        (indname, Column::Int(sweep_ind)),
    ])?;
    tracing::debug!(rows = total, vars = d, n_density, n_sweeps, "assembled sinew design");

    Ok(Design { quantiles, labels })
}

/// Hybrid-point design (Sobol', 1999).
///
/// Rows `0..n` are the base sample X labeled [`BASE_LABEL`]. Block `i + 1`
/// is labeled with variable `i` and holds, under [`HybridPlan::First`], Z with
/// column `i` taken from X; under [`HybridPlan::Total`], X with column `i`
/// taken from Z. Row order inside every block follows the draw order of X and Z.
pub fn hybrid<R: Rng + ?Sized>(
    rng: &mut R,
    var_rand: &[String],
    n: usize,
    plan: HybridPlan,
    varname: &str,
) -> Result<Design> {
    let d = var_rand.len();
    let x = sampling::uniform(rng, n, d);
    let z = sampling::uniform(rng, n, d);

    let mut quantiles = QuantileMatrix::zeros(n * (d + 1), d);
    let mut hybrid_var = vec![BASE_LABEL.to_string(); n * (d + 1)];
    for i in 0..n {
        quantiles.set_row(i, x.row(i));
    }

    for (i_in, name) in var_rand.iter().enumerate() {
        let block = (i_in + 1) * n;
        let (fill, swap) = match plan {
            HybridPlan::First => (&z, &x),
            HybridPlan::Total => (&x, &z),
        };
        for i in 0..n {
            quantiles.set_row(block + i, fill.row(i));
            quantiles.set(block + i, i_in, swap.get(i, i_in));
            hybrid_var[block + i] = name.clone();
        }
    }

    let labels = DataFrame::from_columns([(varname, Column::Text(hybrid_var))])?;
    tracing::debug!(rows = quantiles.rows(), vars = d, %plan, "assembled hybrid design");

    Ok(Design { quantiles, labels })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn names(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("x{i}")).collect()
    }

    #[test]
    fn test_sinew_shape_and_blocks() {
        let mut rng = StdRng::seed_from_u64(3);
        let vars = names(3);
        let design = sinews(
            &mut rng,
            &vars,
            &[Support::BOUNDED; 3],
            5,
            2,
            "sweep_var",
            "sweep_ind",
        )
        .unwrap();

        assert_eq!(design.n_rows(), 3 * 2 * 5);
        let labels = design.labels.text("sweep_var").unwrap();
        let index = design.labels.int("sweep_ind").unwrap();

        for block in 0..6 {
            let i_var = block / 2;
            let i_sweep = block % 2;
            let rows: Vec<usize> = (block * 5..(block + 1) * 5).collect();
            let first = design.quantiles.row(rows[0]).to_vec();
            for (k, &r) in rows.iter().enumerate() {
                assert_eq!(labels[r], vars[i_var]);
                assert_eq!(index[r], i_sweep as i64);
                for j in 0..3 {
                    if j == i_var {
                        assert_eq!(design.quantiles.get(r, j), k as f64 / 4.0);
                    } else {
                        assert_eq!(design.quantiles.get(r, j), first[j]);
                    }
                }
            }
        }
    }

    #[test]
    fn test_sinew_base_point_shared_across_variables() {
        let mut rng = StdRng::seed_from_u64(11);
        let vars = names(3);
        let design = sinews(&mut rng, &vars, &[Support::BOUNDED; 3], 3, 1, "v", "i").unwrap();
        // x3 is held at the same base value in the x1 block and the x2 block
        let held_in_x1_block = design.quantiles.get(0, 2);
        let held_in_x2_block = design.quantiles.get(3, 2);
        assert_eq!(held_in_x1_block, held_in_x2_block);
        assert_eq!(design.quantiles.get(0, 1), design.quantiles.get(6, 1));
    }

    #[test]
    fn test_sinew_unbounded_endpoints_pulled_inward() {
        let mut rng = StdRng::seed_from_u64(5);
        let vars = names(2);
        let supports = [
            Support::UNBOUNDED,
            Support {
                lower_finite: true,
                upper_finite: false,
            },
        ];
        let design = sinews(&mut rng, &vars, &supports, 10, 1, "v", "i").unwrap();

        let close = |a: f64, b: f64| (a - b).abs() < 1e-12;
        assert!(close(design.quantiles.get(0, 0), 0.01));
        assert!(close(design.quantiles.get(9, 0), 0.99));
        assert_eq!(design.quantiles.get(10, 1), 0.0);
        assert!(close(design.quantiles.get(19, 1), 0.99));
    }

    #[test]
    fn test_hybrid_first_plan_layout() {
        let vars = names(3);
        let n = 4;
        let design = hybrid(&mut StdRng::seed_from_u64(8), &vars, n, HybridPlan::First, "hv")
            .unwrap();

        // Replay the draws to recover X and Z
        let mut rng = StdRng::seed_from_u64(8);
        let x = sampling::uniform(&mut rng, n, 3);
        let z = sampling::uniform(&mut rng, n, 3);

        assert_eq!(design.n_rows(), n * 4);
        let labels = design.labels.text("hv").unwrap();
        for i in 0..n {
            assert_eq!(design.quantiles.row(i), x.row(i));
            assert_eq!(labels[i], BASE_LABEL);
        }
        for i_in in 0..3 {
            for i in 0..n {
                let r = (i_in + 1) * n + i;
                assert_eq!(labels[r], vars[i_in]);
                for j in 0..3 {
                    let expected = if j == i_in { x.get(i, j) } else { z.get(i, j) };
                    assert_eq!(design.quantiles.get(r, j), expected);
                }
            }
        }
    }

    #[test]
    fn test_hybrid_total_plan_layout() {
        let vars = names(2);
        let design = hybrid(&mut StdRng::seed_from_u64(2), &vars, 3, HybridPlan::Total, "hv")
            .unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        let x = sampling::uniform(&mut rng, 3, 2);
        let z = sampling::uniform(&mut rng, 3, 2);

        for i in 0..3 {
            // block for x2: X everywhere except column 1 from Z
            let r = 2 * 3 + i;
            assert_eq!(design.quantiles.get(r, 0), x.get(i, 0));
            assert_eq!(design.quantiles.get(r, 1), z.get(i, 1));
        }
    }

    #[test]
    fn test_plan_parsing() {
        assert_eq!("total".parse::<HybridPlan>().unwrap(), HybridPlan::Total);
        assert!(matches!(
            "second".parse::<HybridPlan>(),
            Err(DesignError::InvalidArgument(_))
        ));
    }
}
