use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    /// Bad or missing request input; nothing was sent to the scanner
    #[error("{0}")]
    Validation(String),

    /// The external scanner could not be run or returned garbage
    #[error("Failed to analyze website: {0}")]
    Scanner(String),
}

impl ScanError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ScanError::Validation(_))
    }
}
