use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::WrapErr;
use uqkit::{AnalysisData, MethodData, ModelData, Study, init_logging, load_study, run_study};
use uqkit_core::design::HybridPlan;
use uqkit_core::sampling::{LhsCriterion, SampleCount};

#[derive(Parser, Debug)]
#[command(name = "uqkit")]
#[command(about = "Design-of-experiments and sensitivity analysis for demo models")]
struct Args {
    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Also append log lines to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a YAML study file
    Study {
        path: PathBuf,

        /// Override the study's seed
        #[arg(long)]
        seed: Option<u64>,

        /// Write the JSON report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Estimate Sobol' indices of a demo model
    Sobol {
        #[arg(value_enum, default_value_t = DemoModel::Ishigami)]
        model: DemoModel,

        /// Base sample size
        #[arg(short, default_value_t = 1000)]
        n: usize,

        /// Index family: first or total
        #[arg(long, default_value = "first")]
        plan: HybridPlan,

        #[arg(long)]
        seed: Option<u64>,

        /// Decimal digits kept in the summary
        #[arg(long, default_value_t = 2)]
        digits: i32,

        /// Keep variance and un-normalized rows
        #[arg(long)]
        full: bool,
    },
    /// Draw a Latin Hypercube design for a demo model without evaluating it
    Lhs {
        #[arg(value_enum, default_value_t = DemoModel::Ishigami)]
        model: DemoModel,

        #[arg(short, default_value_t = 10)]
        n: usize,

        /// none, center, maxmin, centermaxmin or correlation
        #[arg(long, default_value = "none")]
        criterion: LhsCriterion,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DemoModel {
    Linear,
    Ishigami,
}

impl From<DemoModel> for ModelData {
    fn from(model: DemoModel) -> Self {
        match model {
            DemoModel::Linear => ModelData::linear(),
            DemoModel::Ishigami => ModelData::ishigami(),
        }
    }
}

fn write_report(json: &str, output: Option<&PathBuf>) -> color_eyre::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, json).wrap_err_with(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "report written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(&args.log_level, args.log_file.as_deref())?;

    match args.command {
        Command::Study { path, seed, output } => {
            let mut study = load_study(&path)?;
            if seed.is_some() {
                study.seed = seed;
            }
            let report = run_study(&study)?;
            write_report(&report.to_json()?, output.as_ref())?;
        }
        Command::Sobol {
            model,
            n,
            plan,
            seed,
            digits,
            full,
        } => {
            let study = Study {
                model: model.into(),
                seed,
                method: MethodData::Hybrid {
                    n: SampleCount::Exact(n),
                    plan,
                    skip: false,
                },
                analysis: Some(AnalysisData::Sobol { digits, full }),
            };
            let report = run_study(&study)?;
            if let Some(summary) = &report.summary {
                println!("{}", serde_json::to_string_pretty(summary)?);
            }
        }
        Command::Lhs {
            model,
            n,
            criterion,
            seed,
            output,
        } => {
            let study = Study {
                model: model.into(),
                seed,
                method: MethodData::Lhs {
                    n: SampleCount::Exact(n),
                    criterion,
                    skip: true,
                },
                analysis: None,
            };
            let report = run_study(&study)?;
            write_report(&report.to_json()?, output.as_ref())?;
        }
    }

    Ok(())
}
