use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScalarizeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Compile(#[from] scalarize_api::CompileError),
    #[error(transparent)]
    Build(#[from] scalarize_api::BuildError),
}

pub type Result<T> = std::result::Result<T, ScalarizeError>;
