use std::fmt;

/// Errors raised while building designs or post-processing their results
#[derive(Debug, Clone, PartialEq)]
pub enum DesignError {
    /// Unsupported option value, missing column, empty table, etc.
    InvalidArgument(String),
    /// A post-processor received a frame that was not produced by the matching design
    MetadataMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// The model rejected a transform or evaluation
    Model(String),
}

impl DesignError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        DesignError::InvalidArgument(msg.into())
    }
}

impl fmt::Display for DesignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesignError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            DesignError::MetadataMismatch { expected, found } => {
                write!(f, "expected {expected} results, found {found}")
            }
            DesignError::Model(msg) => write!(f, "model error: {msg}"),
        }
    }
}

impl std::error::Error for DesignError {}

pub type Result<T> = std::result::Result<T, DesignError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = DesignError::invalid("plan must be `first` or `total`");
        assert_eq!(
            err.to_string(),
            "invalid argument: plan must be `first` or `total`"
        );

        let err = DesignError::MetadataMismatch {
            expected: "hybrid point",
            found: "monte carlo outputs",
        };
        assert_eq!(
            err.to_string(),
            "expected hybrid point results, found monte carlo outputs"
        );
    }
}
