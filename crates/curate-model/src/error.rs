use thiserror::Error;

/// Errors raised by the curation core.
///
/// Empty selections are not errors: an instrument with no matching columns is
/// omitted and a filter with no matching variables still yields the structural
/// columns.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CurateError {
    /// A structurally required column is absent from the input table.
    #[error("required column '{column}' not found ({context})")]
    MissingColumn {
        column: String,
        context: &'static str,
    },

    /// A reference document (scope of release, data dictionary, variable list)
    /// does not have the shape the task expects.
    #[error("invalid reference table: {reason}")]
    InvalidReference { reason: String },
}

impl CurateError {
    pub fn missing_column(column: impl Into<String>, context: &'static str) -> Self {
        Self::MissingColumn {
            column: column.into(),
            context,
        }
    }
}

pub type Result<T> = std::result::Result<T, CurateError>;
