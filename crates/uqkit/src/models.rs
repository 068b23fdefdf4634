//! Built-in demo models for studies run from the command line.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use uqkit_core::model::FunctionModelBuilder;
use uqkit_core::{FunctionModel, Marginal, Result};

fn default_slope_a() -> f64 {
    1.0
}

fn default_slope_b() -> f64 {
    2.0
}

fn default_ishigami_a() -> f64 {
    7.0
}

fn default_ishigami_b() -> f64 {
    0.1
}

/// YAML-friendly selection of a demo model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ModelData {
    /// y = a·x1 + b·x2 with x1, x2 ~ U(0, 1)
    Linear {
        #[serde(default = "default_slope_a")]
        a: f64,
        #[serde(default = "default_slope_b")]
        b: f64,
    },
    /// f = sin x1 + a sin² x2 + b x3⁴ sin x1 with x ~ U(-π, π)³
    Ishigami {
        #[serde(default = "default_ishigami_a")]
        a: f64,
        #[serde(default = "default_ishigami_b")]
        b: f64,
    },
}

impl ModelData {
    pub fn linear() -> Self {
        ModelData::Linear {
            a: default_slope_a(),
            b: default_slope_b(),
        }
    }

    pub fn ishigami() -> Self {
        ModelData::Ishigami {
            a: default_ishigami_a(),
            b: default_ishigami_b(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModelData::Linear { .. } => "linear",
            ModelData::Ishigami { .. } => "ishigami",
        }
    }

    pub fn to_model(&self) -> Result<FunctionModel> {
        match *self {
            ModelData::Linear { a, b } => linear_inputs(FunctionModel::builder("linear"))
                .outputs(["y"])
                .function(move |x| vec![a * x[0] + b * x[1]])
                .build(),
            ModelData::Ishigami { a, b } => ishigami_inputs(FunctionModel::builder("ishigami"))
                .outputs(["f"])
                .function(move |x| {
                    vec![x[0].sin() + a * x[1].sin().powi(2) + b * x[2].powi(4) * x[0].sin()]
                })
                .build(),
        }
    }

    /// Analytic gradient of the model, one `D<output>_D<input>` output per input
    pub fn to_gradient_model(&self) -> Result<FunctionModel> {
        match *self {
            ModelData::Linear { a, b } => linear_inputs(FunctionModel::builder("linear_gradient"))
                .outputs(["Dy_Dx1", "Dy_Dx2"])
                .function(move |_| vec![a, b])
                .build(),
            ModelData::Ishigami { a, b } => {
                ishigami_inputs(FunctionModel::builder("ishigami_gradient"))
                    .outputs(["Df_Dx1", "Df_Dx2", "Df_Dx3"])
                    .function(move |x| {
                        vec![
                            x[0].cos() * (1.0 + b * x[2].powi(4)),
                            2.0 * a * x[1].sin() * x[1].cos(),
                            4.0 * b * x[2].powi(3) * x[0].sin(),
                        ]
                    })
                    .build()
            }
        }
    }
}

fn linear_inputs(builder: FunctionModelBuilder) -> FunctionModelBuilder {
    let unit = Marginal::Uniform {
        lower: 0.0,
        upper: 1.0,
    };
    builder.marginal("x1", unit).marginal("x2", unit)
}

fn ishigami_inputs(builder: FunctionModelBuilder) -> FunctionModelBuilder {
    let u = Marginal::Uniform {
        lower: -PI,
        upper: PI,
    };
    builder.marginal("x1", u).marginal("x2", u).marginal("x3", u)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uqkit_core::Model;

    #[test]
    fn test_models_evaluate() {
        let linear = ModelData::linear().to_model().unwrap();
        assert_eq!(linear.evaluate_row(&[0.5, 0.25]).unwrap(), vec![1.0]);

        let ishigami = ModelData::ishigami().to_model().unwrap();
        let f = ishigami.evaluate_row(&[PI / 2.0, PI / 2.0, 1.0]).unwrap();
        assert!((f[0] - (1.0 + 7.0 + 0.1)).abs() < 1e-12);
    }

    #[test]
    fn test_gradient_matches_finite_difference() {
        let md = ModelData::ishigami();
        let f = md.to_model().unwrap();
        let g = md.to_gradient_model().unwrap();
        let x = [0.3, -1.1, 2.0];
        let grad = g.evaluate_row(&x).unwrap();
        let h = 1e-6;
        for (i, dfdx) in grad.iter().enumerate() {
            let mut up = x;
            let mut down = x;
            up[i] += h;
            down[i] -= h;
            let fd = (f.evaluate_row(&up).unwrap()[0] - f.evaluate_row(&down).unwrap()[0]) / (2.0 * h);
            assert!((fd - dfdx).abs() < 1e-5, "component {i}: {fd} vs {dfdx}");
        }
    }

    #[test]
    fn test_yaml_defaults() {
        let md: ModelData = serde_saphyr::from_str("name: ishigami\n").unwrap();
        assert_eq!(md, ModelData::ishigami());
        let md: ModelData = serde_saphyr::from_str("name: linear\nb: 3.0\n").unwrap();
        assert_eq!(md, ModelData::Linear { a: 1.0, b: 3.0 });
    }
}
