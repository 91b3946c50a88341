use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum RollmacroError {
    #[error("Tree node not found: {0}")]
    NodeNotFound(Uuid),

    #[error("Original table not found: {0}")]
    TableNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Api Error: {0}")]
    Api(String),

    #[error("Roller error: {0}")]
    Roller(String),

    #[error("Invalid input: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, RollmacroError>;
