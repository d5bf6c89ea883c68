#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid option '{key}': {reason}")]
    InvalidOption { key: String, reason: String },
    #[error("Invalid declaration: {0}")]
    InvalidDeclaration(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
