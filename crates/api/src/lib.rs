pub mod error;
pub mod models;

// Re-export commonly used types
pub use error::{BuildError, BuildResult, CompileError, CompileResult};
pub use models::*;
