use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExplainError {
    /// Required issue fields were missing from the request
    #[error("{0}")]
    Validation(String),

    /// The completion service failed; only surfaced when fallback is off
    #[error("Failed to generate explanation: {0}")]
    Completion(String),

    #[error("Invalid explanation configuration: {0}")]
    Config(String),
}
