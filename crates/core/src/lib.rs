pub mod config;
pub mod error;
pub mod layout;
pub mod logging;
pub mod program;
pub mod symbols;
pub mod translate;
pub mod types;

pub use config::{ProgramOptions, RegionLayout};
pub use error::{Result, ScalarizeError};
pub use layout::{VarLocation, VariableLayout};
pub use program::Program;
pub use symbols::SymbolTable;
pub use translate::Translator;
pub use types::{BuiltinTypes, TypeSizeTable};
