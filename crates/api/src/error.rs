use crate::models::Region;

/// Failures raised while translating one IR object.
///
/// Any of these aborts the object that produced it; objects accepted
/// earlier keep their generated code.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error("Could not translate opcode: {opcode}")]
    UnknownOpcode { opcode: String },
    #[error("Opcode {opcode} requires an addressed destination operand")]
    InvalidDestination { opcode: String },
    #[error("Operand {name}[{address}] lies outside the addressable range")]
    AddressOverflow { name: String, address: usize },
    #[error("Invalid swizzle: {swizzle:?}")]
    MalformedSwizzle { swizzle: String },
    #[error("Symbol {name} has malformed location label {label:?}")]
    MalformedLocation { name: String, label: String },
    #[error("Symbol {name} has type {ty} with no known size")]
    UnknownType { name: String, ty: String },
}

pub type CompileResult<T> = std::result::Result<T, CompileError>;

/// Failures raised while lowering generated code onto the shared buffer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error("No buffer region backs storage {name}")]
    UnknownRegion { name: String },
    #[error("Index {index} is outside region {region} (capacity {capacity})")]
    OutOfBounds {
        region: Region,
        index: usize,
        capacity: usize,
    },
    #[error("Literal operand {name} is not a numeric constant")]
    UnresolvedLiteral { name: String },
    #[error("Unbalanced control flow: {0}")]
    UnbalancedControlFlow(&'static str),
    #[error("Program has not been built")]
    NotBuilt,
}

pub type BuildResult<T> = std::result::Result<T, BuildError>;

