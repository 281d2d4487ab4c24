use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read budget file: {0}")]
    Decode(#[from] toml::de::Error),

    #[error("Failed to write budget file: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("Invalid amount for {field}: {input:?}")]
    InvalidAmount { field: &'static str, input: String },

    #[error("Category name cannot be empty")]
    EmptyName,

    #[error("No category at index {0}")]
    UnknownCategory(usize),

    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
