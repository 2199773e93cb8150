use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("expression error at offset {offset}: {message}")]
    Expression { message: String, offset: usize },

    #[error("grid error: {0}")]
    Grid(String),

    #[error("geometry error: {0}")]
    Geometry(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, Error>;
