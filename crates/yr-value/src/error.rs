//! Codec error types.

use thiserror::Error;
use yr_core::YrError;

pub type ValueResult<T> = Result<T, ValueError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValueError {
    /// Element kind outside bool / i64 / f64 / string.
    #[error("Unsupported dtype: {what}")]
    UnsupportedDtype { what: String },

    /// Buffer length, shape or axis order are inconsistent.
    #[error("Shape mismatch: {what}")]
    Shape { what: String },

    /// Value does not fit the requested format tag.
    #[error("Format error: {what}")]
    Format { what: String },
}

impl ValueError {
    pub(crate) fn dtype(what: impl Into<String>) -> Self {
        ValueError::UnsupportedDtype { what: what.into() }
    }

    pub(crate) fn shape(what: impl Into<String>) -> Self {
        ValueError::Shape { what: what.into() }
    }

    pub(crate) fn format(what: impl Into<String>) -> Self {
        ValueError::Format { what: what.into() }
    }
}

impl From<ValueError> for YrError {
    fn from(err: ValueError) -> Self {
        match err {
            ValueError::UnsupportedDtype { what } => YrError::UnsupportedDtype { what },
            ValueError::Shape { what } | ValueError::Format { what } => {
                YrError::Configuration { what }
            }
        }
    }
}
