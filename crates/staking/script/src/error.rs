use thiserror::Error;

/// Errors for validating staking script parameters.
///
/// Construction reports one error per call, with the missing-input category
/// checked before the shape and collision rules for every field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StakingScriptError {
    /// A required field was absent, zero or empty.
    #[error("missing required input values: {0}")]
    MissingInput(&'static str),

    /// A present field has the wrong shape or violates a structural rule.
    #[error("invalid script data provided: {0}")]
    InvalidScriptData(&'static str),
}

/// Result type alias for script parameter validation.
pub type StakingScriptResult<T> = Result<T, StakingScriptError>;
