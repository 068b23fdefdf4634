//! Inner products of data rows with weight vectors.

use crate::error::{DesignError, Result};
use crate::frame::{Column, DataFrame};

/// Options for [`tran_inner`]
#[derive(Debug, Clone, PartialEq)]
pub struct InnerOptions {
    /// Name (or name prefix) of the result columns
    pub prefix: String,
    /// Identity column in the weights used to name result columns
    pub name: Option<String>,
    /// Return the data columns followed by the results
    pub append: bool,
}

impl Default for InnerOptions {
    fn default() -> Self {
        Self {
            prefix: "dot".into(),
            name: None,
            append: true,
        }
    }
}

/// Inner product of every row of `df` with every row of `df_weights`.
///
/// Only columns shared by both frames take part; weight columns missing from
/// `df` are ignored with a warning. A single weight row yields one column named
/// `prefix`; several yield `prefix<i>`, or `prefix_<id>` when `name` selects an
/// identity column of the weights.
pub fn tran_inner(df: &DataFrame, df_weights: &DataFrame, opts: &InnerOptions) -> Result<DataFrame> {
    if df_weights.n_rows() == 0 {
        return Err(DesignError::invalid("df_weights cannot be empty"));
    }
    if let Some(name) = &opts.name
        && !df_weights.has_column(name)
    {
        return Err(DesignError::invalid(
            "name must be column of df_weights or None",
        ));
    }

    let (common, ignored): (Vec<&String>, Vec<&String>) = df_weights
        .names()
        .iter()
        .filter(|c| opts.name.as_ref() != Some(*c))
        .partition(|c| df.has_column(c));
    if !ignored.is_empty() {
        tracing::warn!(columns = ?ignored, "ignoring df_weights columns");
    }

    let data = df.to_rows(&common)?;
    let weights = df_weights.to_rows(&common)?;
    let mut results: Vec<Vec<f64>> = vec![Vec::with_capacity(data.len()); weights.len()];
    for row in &data {
        for (result, w) in results.iter_mut().zip(&weights) {
            result.push(row.iter().zip(w).map(|(a, b)| a * b).sum());
        }
    }

    let names: Vec<String> = match (weights.len(), &opts.name) {
        (1, _) => vec![opts.prefix.clone()],
        (_, None) => (0..weights.len())
            .map(|i| format!("{}{i}", opts.prefix))
            .collect(),
        (_, Some(name)) => {
            let ids = df_weights
                .column(name)
                .ok_or_else(|| DesignError::invalid(format!("`{name}` not in df_weights")))?;
            (0..weights.len())
                .map(|i| format!("{}_{}", opts.prefix, ids.cell_string(i)))
                .collect()
        }
    };

    let df_res = DataFrame::from_columns(names.into_iter().zip(results.into_iter().map(Column::Float)))?;
    if opts.append { df.hconcat(&df_res) } else { Ok(df_res) }
}
