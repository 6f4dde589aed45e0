use thiserror::Error;

/// Rejection reasons produced by [`crate::guard::validate_sql`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    #[error("SQL contains forbidden keyword: {0}")]
    ForbiddenKeyword(&'static str),

    #[error("Only SELECT queries are allowed")]
    NotSelect,
}

impl PolicyViolation {
    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::ForbiddenKeyword(_) => "forbidden_keyword",
            Self::NotSelect => "not_select",
        }
    }
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("Query execution failed: {0}")]
    Execution(String),

    #[error("SQL rejected: {0}")]
    Policy(#[from] PolicyViolation),

    #[error("Failed to generate SQL: {0}")]
    Translation(String),
}

impl QueryError {
    #[must_use]
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Execution(_) => "execution",
            Self::Policy(_) => "validation",
            Self::Translation(_) => "translation",
        }
    }

    pub(crate) fn execution(error: impl std::fmt::Display) -> Self {
        Self::Execution(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QueryError>;
