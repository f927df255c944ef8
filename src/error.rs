use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("unknown invoice reference: {0}")]
    InvalidReference(String),
    #[error("invalid transition: {0}")]
    InvalidTransition(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PaymentError>;
