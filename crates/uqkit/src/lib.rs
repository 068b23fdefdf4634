//! Command-line front end for uqkit: demo models, YAML study files and
//! logging setup.

pub mod logging;
pub mod models;
pub mod study;

pub use logging::init_logging;
pub use models::ModelData;
pub use study::{AnalysisData, MethodData, Study, StudyReport, load_study, run_study};
