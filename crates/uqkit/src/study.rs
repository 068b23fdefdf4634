//! YAML study files: a demo model, a design method and an optional
//! post-processor, run end to end into a JSON report.
//!
//! ```yaml
//! model:
//!   name: ishigami
//! seed: 42
//! method:
//!   type: hybrid
//!   n: 2000
//!   plan: first
//! analysis:
//!   type: sobol
//!   digits: 3
//! ```

use std::fs;
use std::path::Path;

use color_eyre::eyre::WrapErr;
use serde::{Deserialize, Serialize};
use uqkit_core::analysis::{
    AsubOptions, GradientKey, InnerOptions, SobolOptions, active_subspace, tran_inner, tran_sobol,
};
use uqkit_core::design::HybridPlan;
use uqkit_core::evaluate::eval_df;
use uqkit_core::experiment::{
    HybridOptions, LhsOptions, MonteCarloOptions, SinewOptions, eval_hybrid, eval_lhs,
    eval_monte_carlo, eval_sinews,
};
use uqkit_core::sampling::{LhsCriterion, SampleCount};
use uqkit_core::{DataFrame, DesignMeta, FunctionModel, Model, Tagged};

use crate::models::ModelData;

fn default_digits() -> i32 {
    2
}

/// Design method and its options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MethodRecord", into = "MethodRecord")]
pub enum MethodData {
    MonteCarlo {
        n: SampleCount,
        skip: bool,
    },
    Lhs {
        n: SampleCount,
        criterion: LhsCriterion,
        skip: bool,
    },
    Sinews {
        n_density: SampleCount,
        n_sweeps: SampleCount,
        skip: bool,
    },
    Hybrid {
        n: SampleCount,
        plan: HybridPlan,
        skip: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum MethodKind {
    MonteCarlo,
    Lhs,
    Sinews,
    Hybrid,
}

/// YAML-friendly flat representation of a method.
/// Uses plain optional fields to avoid serde_saphyr issues with internally
/// tagged enums holding untyped numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MethodRecord {
    #[serde(rename = "type")]
    kind: MethodKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    n: Option<SampleCount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    n_density: Option<SampleCount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    n_sweeps: Option<SampleCount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    criterion: Option<LhsCriterion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    plan: Option<HybridPlan>,
    #[serde(default)]
    skip: bool,
}

impl MethodRecord {
    fn reject(&self, method: &str, fields: &[(&str, bool)]) -> Result<(), String> {
        match fields.iter().find(|(_, present)| *present) {
            Some((field, _)) => Err(format!("`{field}` does not apply to {method} designs")),
            None => Ok(()),
        }
    }
}

impl TryFrom<MethodRecord> for MethodData {
    type Error = String;

    fn try_from(r: MethodRecord) -> Result<Self, String> {
        let skip = r.skip;
        match r.kind {
            MethodKind::MonteCarlo => {
                r.reject(
                    "monte_carlo",
                    &[
                        ("n_density", r.n_density.is_some()),
                        ("n_sweeps", r.n_sweeps.is_some()),
                        ("criterion", r.criterion.is_some()),
                        ("plan", r.plan.is_some()),
                    ],
                )?;
                Ok(MethodData::MonteCarlo {
                    n: r.n.unwrap_or_default(),
                    skip,
                })
            }
            MethodKind::Lhs => {
                r.reject(
                    "lhs",
                    &[
                        ("n_density", r.n_density.is_some()),
                        ("n_sweeps", r.n_sweeps.is_some()),
                        ("plan", r.plan.is_some()),
                    ],
                )?;
                Ok(MethodData::Lhs {
                    n: r.n.unwrap_or_default(),
                    criterion: r.criterion.unwrap_or_default(),
                    skip,
                })
            }
            MethodKind::Sinews => {
                r.reject(
                    "sinews",
                    &[
                        ("n", r.n.is_some()),
                        ("criterion", r.criterion.is_some()),
                        ("plan", r.plan.is_some()),
                    ],
                )?;
                Ok(MethodData::Sinews {
                    n_density: r.n_density.unwrap_or(SampleCount::Exact(10)),
                    n_sweeps: r.n_sweeps.unwrap_or(SampleCount::Exact(3)),
                    skip,
                })
            }
            MethodKind::Hybrid => {
                r.reject(
                    "hybrid",
                    &[
                        ("n_density", r.n_density.is_some()),
                        ("n_sweeps", r.n_sweeps.is_some()),
                        ("criterion", r.criterion.is_some()),
                    ],
                )?;
                Ok(MethodData::Hybrid {
                    n: r.n.unwrap_or_default(),
                    plan: r.plan.unwrap_or_default(),
                    skip,
                })
            }
        }
    }
}

impl From<MethodData> for MethodRecord {
    fn from(method: MethodData) -> Self {
        let mut record = MethodRecord {
            kind: MethodKind::MonteCarlo,
            n: None,
            n_density: None,
            n_sweeps: None,
            criterion: None,
            plan: None,
            skip: false,
        };
        match method {
            MethodData::MonteCarlo { n, skip } => {
                record.n = Some(n);
                record.skip = skip;
            }
            MethodData::Lhs { n, criterion, skip } => {
                record.kind = MethodKind::Lhs;
                record.n = Some(n);
                record.criterion = Some(criterion);
                record.skip = skip;
            }
            MethodData::Sinews {
                n_density,
                n_sweeps,
                skip,
            } => {
                record.kind = MethodKind::Sinews;
                record.n_density = Some(n_density);
                record.n_sweeps = Some(n_sweeps);
                record.skip = skip;
            }
            MethodData::Hybrid { n, plan, skip } => {
                record.kind = MethodKind::Hybrid;
                record.n = Some(n);
                record.plan = Some(plan);
                record.skip = skip;
            }
        }
        record
    }
}

impl MethodData {
    pub fn name(&self) -> &'static str {
        match self {
            MethodData::MonteCarlo { .. } => "monte_carlo",
            MethodData::Lhs { .. } => "lhs",
            MethodData::Sinews { .. } => "sinews",
            MethodData::Hybrid { .. } => "hybrid",
        }
    }
}

/// Post-processing step applied to the design result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisData {
    /// Sobol' indices; requires a hybrid method
    Sobol {
        #[serde(default = "default_digits")]
        digits: i32,
        #[serde(default)]
        full: bool,
    },
    /// Active subspace of the model's analytic gradient over the design rows,
    /// optionally projecting the design onto each output's leading direction
    Asub {
        #[serde(default)]
        project: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Study {
    pub model: ModelData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub method: MethodData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisData>,
}

impl Study {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_saphyr::Error> {
        serde_saphyr::from_str(yaml)
    }
}

/// Read and parse a study file
pub fn load_study(path: &Path) -> color_eyre::Result<Study> {
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read study file {}", path.display()))?;
    Study::from_yaml(&content)
        .wrap_err_with(|| format!("failed to parse study file {}", path.display()))
}

/// Everything a study run produces
#[derive(Debug, Clone, Serialize)]
pub struct StudyReport {
    pub model: String,
    pub method: String,
    pub meta: DesignMeta,
    pub results: DataFrame,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<DataFrame>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<DataFrame>,
}

impl StudyReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn run_design(study: &Study, model: &FunctionModel) -> uqkit_core::Result<Tagged> {
    let seed = study.seed;
    match study.method.clone() {
        MethodData::MonteCarlo { n, skip } => eval_monte_carlo(
            model,
            &MonteCarloOptions {
                n,
                seed,
                skip,
                ..Default::default()
            },
        ),
        MethodData::Lhs { n, criterion, skip } => eval_lhs(
            model,
            &LhsOptions {
                n,
                seed,
                skip,
                criterion,
                ..Default::default()
            },
        ),
        MethodData::Sinews {
            n_density,
            n_sweeps,
            skip,
        } => eval_sinews(
            model,
            &SinewOptions {
                n_density,
                n_sweeps,
                seed,
                skip,
                ..Default::default()
            },
        ),
        MethodData::Hybrid { n, plan, skip } => eval_hybrid(
            model,
            &HybridOptions {
                n,
                plan,
                seed,
                skip,
                ..Default::default()
            },
        ),
    }
}

/// First (largest singular value) direction of every output, restricted to
/// the input and identity columns
fn leading_directions(
    df_as: &DataFrame,
    var_rand: &[String],
    outvar: &str,
) -> uqkit_core::Result<DataFrame> {
    let outputs = df_as.text(outvar)?;
    let rows: Vec<usize> = (0..outputs.len())
        .filter(|&i| i == 0 || outputs[i] != outputs[i - 1])
        .collect();
    let mut columns: Vec<&str> = var_rand.iter().map(String::as_str).collect();
    columns.push(outvar);
    Ok(df_as.select(&columns)?.take(&rows))
}

/// Run a study: build the model, assemble and evaluate the design, then
/// apply the post-processor if one is configured.
pub fn run_study(study: &Study) -> color_eyre::Result<StudyReport> {
    let model = study.model.to_model()?;
    tracing::info!(
        model = study.model.name(),
        method = study.method.name(),
        seed = ?study.seed,
        "running study"
    );

    let tagged = run_design(study, &model)
        .wrap_err_with(|| format!("{} design failed", study.method.name()))?;
    tracing::info!(rows = tagged.n_rows(), kind = tagged.meta.kind(), "design complete");

    let mut summary = None;
    let mut projection = None;
    match &study.analysis {
        None => {}
        Some(AnalysisData::Sobol { digits, full }) => {
            let opts = SobolOptions {
                digits: *digits,
                full: *full,
                ..Default::default()
            };
            summary = Some(tran_sobol(&tagged, &opts).wrap_err("Sobol' analysis failed")?);
        }
        Some(AnalysisData::Asub { project }) => {
            let gradient = study.model.to_gradient_model()?;
            let df_grad = eval_df(&gradient, &tagged.frame, false)?;
            // Gradient outputs are output-major over the model's inputs
            let keys = model.outputs().iter().flat_map(|output| {
                model
                    .var_rand()
                    .iter()
                    .map(move |input| GradientKey::new(output.as_str(), input.as_str()))
            });
            let columns = keys
                .zip(gradient.outputs())
                .map(|(key, column)| Ok((key, df_grad.float(column)?)))
                .collect::<uqkit_core::Result<Vec<_>>>()?;
            let opts = AsubOptions::default();
            let df_as =
                active_subspace(&columns, &opts).wrap_err("active subspace analysis failed")?;
            if *project {
                let df_lead = leading_directions(&df_as, model.var_rand(), &opts.outvar)?;
                let inner = InnerOptions {
                    name: Some(opts.outvar.clone()),
                    append: false,
                    ..Default::default()
                };
                projection = Some(tran_inner(&tagged.frame, &df_lead, &inner)?);
            }
            summary = Some(df_as);
        }
    }

    Ok(StudyReport {
        model: study.model.name().to_string(),
        method: study.method.name().to_string(),
        meta: tagged.meta,
        results: tagged.frame,
        summary,
        projection,
    })
}
