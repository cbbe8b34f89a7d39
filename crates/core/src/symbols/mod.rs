//! Lexically scoped symbol table used during semantic analysis.

mod entry;
mod table;

pub use entry::{Definition, EntryKind, SymbolEntry, TypeDefinition};
pub use table::SymbolTable;
