use thiserror::Error;

use crate::ids::NodeId;

pub type YrResult<T> = Result<T, YrError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum YrError {
    #[error("No active analysis: components must be created within the context of an analysis")]
    NoActiveContext,

    #[error("Component {id} is already part of another analysis")]
    AlreadyOwned { id: NodeId },

    #[error("Argument '{argument}' references a component outside this analysis")]
    ForeignArgument { argument: String },

    #[error("Configuration error: {what}")]
    Configuration { what: String },

    #[error("Invalid options for {operation}: {what}")]
    InvalidOptions {
        operation: &'static str,
        what: String,
    },

    #[error("Unsupported dtype: {what}")]
    UnsupportedDtype { what: String },
}

impl YrError {
    pub fn configuration(what: impl Into<String>) -> Self {
        YrError::Configuration { what: what.into() }
    }

    /// True for errors caused by inconsistent construction inputs.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            YrError::Configuration { .. } | YrError::InvalidOptions { .. }
        )
    }
}
