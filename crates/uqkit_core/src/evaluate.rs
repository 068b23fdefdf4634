//! Evaluation gateway: apply a model to every row of a design frame.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{DesignError, Result};
use crate::frame::{Column, DataFrame};
use crate::model::Model;

/// Evaluate `model` on each row of `df`.
///
/// Inputs are read by name (random then deterministic variables); other
/// columns such as design labels are ignored by the model and carried through
/// when `append` is set. Output rows keep the design's row order.
pub fn eval_df<M: Model + ?Sized>(model: &M, df: &DataFrame, append: bool) -> Result<DataFrame> {
    let inputs: Vec<&String> = model.var_rand().iter().chain(model.var_det()).collect();
    let rows = df.to_rows(&inputs)?;

    #[cfg(feature = "parallel")]
    let evaluated: Vec<Result<Vec<f64>>> = rows.par_iter().map(|r| model.evaluate_row(r)).collect();
    #[cfg(not(feature = "parallel"))]
    let evaluated: Vec<Result<Vec<f64>>> = rows.iter().map(|r| model.evaluate_row(r)).collect();

    let evaluated = evaluated.into_iter().collect::<Result<Vec<_>>>()?;

    let outputs = model.outputs();
    let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(evaluated.len()); outputs.len()];
    for row in &evaluated {
        if row.len() != outputs.len() {
            return Err(DesignError::Model(format!(
                "model `{}` returned {} outputs, expected {}",
                model.name(),
                row.len(),
                outputs.len()
            )));
        }
        for (col, &value) in columns.iter_mut().zip(row) {
            col.push(value);
        }
    }

    let df_out = DataFrame::from_columns(
        outputs
            .iter()
            .cloned()
            .zip(columns.into_iter().map(Column::Float)),
    )?;
    tracing::debug!(model = model.name(), rows = df.n_rows(), "evaluated design");

    if append { df.hconcat(&df_out) } else { Ok(df_out) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FunctionModel, Marginal};

    #[test]
    fn test_eval_df_append_and_bare() {
        let md = FunctionModel::builder("sum")
            .marginal("a", Marginal::Uniform { lower: 0.0, upper: 1.0 })
            .marginal("b", Marginal::Uniform { lower: 0.0, upper: 1.0 })
            .outputs(["s", "p"])
            .function(|v| vec![v[0] + v[1], v[0] * v[1]])
            .build()
            .unwrap();

        // Column order in the frame need not match the model's input order
        let df = DataFrame::from_columns([
            ("b", Column::Float(vec![2.0, 3.0])),
            ("a", Column::Float(vec![1.0, 4.0])),
            ("tag", Column::from(vec!["_", "a"])),
        ])
        .unwrap();

        let bare = eval_df(&md, &df, false).unwrap();
        assert_eq!(bare.names(), &["s", "p"]);
        assert_eq!(bare.float("s").unwrap(), &[3.0, 7.0]);
        assert_eq!(bare.float("p").unwrap(), &[2.0, 12.0]);

        let full = eval_df(&md, &df, true).unwrap();
        assert_eq!(full.names(), &["b", "a", "tag", "s", "p"]);
    }

    #[test]
    fn test_eval_df_missing_input() {
        let md = FunctionModel::builder("id")
            .marginal("a", Marginal::Uniform { lower: 0.0, upper: 1.0 })
            .outputs(["y"])
            .function(|v| vec![v[0]])
            .build()
            .unwrap();
        let df = DataFrame::from_columns([("z", Column::Float(vec![1.0]))]).unwrap();
        assert!(matches!(
            eval_df(&md, &df, true),
            Err(DesignError::InvalidArgument(_))
        ));
    }
}
