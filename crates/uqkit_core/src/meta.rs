//! Design metadata carried alongside produced frames.
//!
//! Every orchestration wrapper returns a [`Tagged`] frame recording how it was
//! built. Post-processors read the tag to recover the design's semantics
//! (which label column marks blocks, which plan was used, which columns are
//! outputs) instead of guessing from column names.

use serde::{Deserialize, Serialize};

use crate::design::HybridPlan;
use crate::error::{DesignError, Result};
use crate::frame::DataFrame;

/// Semantics of a hybrid-point result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridMeta {
    /// Label column separating the base block from per-variable blocks
    pub varname: String,
    pub plan: HybridPlan,
    pub var_rand: Vec<String>,
    pub outputs: Vec<String>,
}

/// How a frame was produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DesignMeta {
    MonteCarloInputs { var_rand: Vec<String> },
    MonteCarloOutputs { outputs: Vec<String> },
    LhsInputs { var_rand: Vec<String> },
    LhsOutputs { outputs: Vec<String> },
    SinewInputs { var_rand: Vec<String> },
    SinewOutputs {
        var_rand: Vec<String>,
        outputs: Vec<String>,
    },
    Hybrid(HybridMeta),
}

impl DesignMeta {
    pub fn kind(&self) -> &'static str {
        match self {
            DesignMeta::MonteCarloInputs { .. } => "monte carlo inputs",
            DesignMeta::MonteCarloOutputs { .. } => "monte carlo outputs",
            DesignMeta::LhsInputs { .. } => "lhs inputs",
            DesignMeta::LhsOutputs { .. } => "lhs outputs",
            DesignMeta::SinewInputs { .. } => "sinew inputs",
            DesignMeta::SinewOutputs { .. } => "sinew outputs",
            DesignMeta::Hybrid(_) => "hybrid point",
        }
    }
}

/// A frame together with the metadata describing its design
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tagged {
    pub frame: DataFrame,
    pub meta: DesignMeta,
}

impl Tagged {
    pub fn new(frame: DataFrame, meta: DesignMeta) -> Self {
        Self { frame, meta }
    }

    /// Hybrid metadata, or a mismatch error naming what was found instead
    pub fn hybrid(&self) -> Result<&HybridMeta> {
        match &self.meta {
            DesignMeta::Hybrid(meta) => Ok(meta),
            other => Err(DesignError::MetadataMismatch {
                expected: "hybrid point",
                found: other.kind(),
            }),
        }
    }

    pub fn n_rows(&self) -> usize {
        self.frame.n_rows()
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hybrid_accessor() {
        let tagged = Tagged::new(
            DataFrame::new(),
            DesignMeta::MonteCarloOutputs {
                outputs: vec!["y".into()],
            },
        );
        assert_eq!(
            tagged.hybrid(),
            Err(DesignError::MetadataMismatch {
                expected: "hybrid point",
                found: "monte carlo outputs"
            })
        );
    }

    #[test]
    fn test_meta_serializes_with_type_tag() {
        let meta = DesignMeta::SinewInputs {
            var_rand: vec!["x1".into()],
        };
        let json = serde_json::to_string(&meta).unwrap();
        assert_eq!(json, r#"{"type":"sinew_inputs","var_rand":["x1"]}"#);
    }
}
