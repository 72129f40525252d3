use thiserror::Error;

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Why an account or timeline could not be fetched from a provider.
///
/// Callers absorb every variant into "absent" data for feature computation;
/// the variant only decides whether a later retry is worth attempting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("account not found")]
    NotFound,

    #[error("account suspended")]
    Suspended,

    #[error("not authorized to read account data")]
    Unauthorized,

    #[error("rate limited (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("transient fetch failure: {0}")]
    Transient(String),

    #[error("malformed provider response: {0}")]
    Malformed(String),

    #[error("timeline pagination exceeded {max_pages} pages")]
    PaginationLimit { max_pages: usize },
}

impl FetchError {
    /// Returns `true` when retrying the same account cannot succeed.
    ///
    /// Deleted, suspended and unauthorized accounts stay that way for the
    /// lifetime of a run; everything else may clear up on a later round.
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            FetchError::NotFound | FetchError::Suspended | FetchError::Unauthorized
        )
    }
}
