//! Active subspace directions from gradient samples.

use nalgebra::DMatrix;

use crate::error::{DesignError, Result};
use crate::frame::{Column, DataFrame};

/// Options for [`tran_asub`]
#[derive(Debug, Clone, PartialEq)]
pub struct AsubOptions {
    /// Marker between output and input in gradient column names
    pub prefix: String,
    /// Name of the output identity column
    pub outvar: String,
    /// Name of the singular value column
    pub lamvar: String,
}

impl Default for AsubOptions {
    fn default() -> Self {
        Self {
            prefix: "D".into(),
            outvar: "out".into(),
            lamvar: "lam".into(),
        }
    }
}

/// Which output's derivative with respect to which input a column holds
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GradientKey {
    pub output: String,
    pub input: String,
}

impl GradientKey {
    pub fn new(output: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            input: input.into(),
        }
    }

    /// Parse a `<prefix?><output>_<prefix><input>` column name, e.g. `Dy_Dx`
    /// or `y_Dx` with prefix `D`.
    pub fn parse(column: &str, prefix: &str) -> Option<Self> {
        let separator = format!("_{prefix}");
        let (output, input) = column.split_once(&separator)?;
        let output = output.strip_prefix(prefix).unwrap_or(output);
        Some(Self::new(output, input))
    }
}

/// Principal gradient directions per output.
///
/// For each output (in order of first appearance) the sample×input matrix of
/// its gradient columns is decomposed; each right-singular vector becomes one
/// row with its coefficients under the input names, the singular value under
/// `lamvar` and the output name under `outvar`. Rows for one output are ordered
/// by descending singular value. Inputs absent for an output are NaN.
///
/// References: Constantine, "Active Subspaces" (2015) SIAM.
pub fn active_subspace(gradients: &[(GradientKey, &[f64])], opts: &AsubOptions) -> Result<DataFrame> {
    let mut outputs: Vec<&str> = Vec::new();
    let mut inputs: Vec<&str> = Vec::new();
    for (key, _) in gradients {
        if !outputs.contains(&key.output.as_str()) {
            outputs.push(&key.output);
        }
        if !inputs.contains(&key.input.as_str()) {
            inputs.push(&key.input);
        }
    }

    let mut coefficients: Vec<Vec<f64>> = vec![Vec::new(); inputs.len()];
    let mut lam = Vec::new();
    let mut out = Vec::new();

    for output in outputs {
        let columns: Vec<(&str, &[f64])> = gradients
            .iter()
            .filter(|(key, _)| key.output == output)
            .map(|(key, values)| (key.input.as_str(), *values))
            .collect();
        let n = columns[0].1.len();
        if columns.iter().any(|(_, c)| c.len() != n) {
            return Err(DesignError::invalid(format!(
                "gradient columns for `{output}` have unequal lengths"
            )));
        }
        if n == 0 {
            continue;
        }

        let matrix = DMatrix::from_fn(n, columns.len(), |i, j| columns[j].1[i]);
        let svd = matrix.svd(false, true);
        let v_t = svd
            .v_t
            .ok_or_else(|| DesignError::Model(format!("SVD failed for `{output}`")))?;

        let mut order: Vec<usize> = (0..svd.singular_values.len()).collect();
        order.sort_by(|&a, &b| svd.singular_values[b].total_cmp(&svd.singular_values[a]));

        for r in order {
            for (slot, input) in coefficients.iter_mut().zip(&inputs) {
                let value = columns
                    .iter()
                    .position(|(name, _)| name == input)
                    .map_or(f64::NAN, |j| v_t[(r, j)]);
                slot.push(value);
            }
            lam.push(svd.singular_values[r]);
            out.push(output.to_string());
        }
    }

    let mut df = DataFrame::new();
    for (input, values) in inputs.into_iter().zip(coefficients) {
        df.insert(input, Column::Float(values))?;
    }
    df.insert(opts.lamvar.clone(), Column::Float(lam))?;
    df.insert(opts.outvar.clone(), Column::Text(out))?;
    Ok(df)
}

/// Active subspace estimate from a frame of gradient columns named by the
/// `<output>_<prefix><input>` convention.
pub fn tran_asub(df: &DataFrame, opts: &AsubOptions) -> Result<DataFrame> {
    let mut gradients = Vec::with_capacity(df.n_cols());
    for name in df.names() {
        let key = GradientKey::parse(name, &opts.prefix).ok_or_else(|| {
            DesignError::invalid(format!(
                "column `{name}` is not a gradient column for prefix `{}`",
                opts.prefix
            ))
        })?;
        gradients.push((key, df.float(name)?));
    }
    active_subspace(&gradients, opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gradient_keys() {
        assert_eq!(GradientKey::parse("y_Dx1", "D"), Some(GradientKey::new("y", "x1")));
        assert_eq!(
            GradientKey::parse("Dg_stress_DH", "D"),
            Some(GradientKey::new("g_stress", "H"))
        );
        assert_eq!(GradientKey::parse("y", "D"), None);
    }

    #[test]
    fn test_two_inputs_two_rows() {
        let df = DataFrame::from_columns([
            ("y_Dx1", Column::Float(vec![1.0, 0.0])),
            ("y_Dx2", Column::Float(vec![0.0, 2.0])),
        ])
        .unwrap();
        let res = tran_asub(&df, &AsubOptions::default()).unwrap();

        assert_eq!(res.n_rows(), 2);
        assert_eq!(res.names(), &["x1", "x2", "lam", "out"]);
        assert_eq!(res.text("out").unwrap(), &["y", "y"]);
        let lam = res.float("lam").unwrap();
        assert!((lam[0] - 2.0).abs() < 1e-12 && (lam[1] - 1.0).abs() < 1e-12);
        // Leading direction is +/- e2
        assert!(res.float("x1").unwrap()[0].abs() < 1e-12);
        assert!((res.float("x2").unwrap()[0].abs() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_outputs_grouped_in_order() {
        let df = DataFrame::from_columns([
            ("f_Da", Column::Float(vec![1.0, 2.0, 3.0])),
            ("g_Da", Column::Float(vec![3.0, 1.0, 0.0])),
            ("f_Db", Column::Float(vec![0.5, 0.1, 0.2])),
            ("g_Db", Column::Float(vec![1.0, 1.0, 1.0])),
        ])
        .unwrap();
        let res = tran_asub(&df, &AsubOptions::default()).unwrap();
        assert_eq!(res.text("out").unwrap(), &["f", "f", "g", "g"]);
        let lam = res.float("lam").unwrap();
        assert!(lam[0] >= lam[1] && lam[2] >= lam[3]);
    }

    #[test]
    fn test_rejects_unparsable_column() {
        let df = DataFrame::from_columns([("y", Column::Float(vec![1.0]))]).unwrap();
        assert!(matches!(
            tran_asub(&df, &AsubOptions::default()),
            Err(DesignError::InvalidArgument(_))
        ));
    }
}
