pub mod ir;
pub mod storage;

pub use ir::*;
pub use storage::*;
