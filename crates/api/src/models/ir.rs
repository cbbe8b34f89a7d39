//! Vector IR handed over by the front end.
//!
//! The wire format is plain JSON:
//!
//! ```json
//! {
//!   "symbols": { "uniform": [{ "name": "color", "type": "vec4", "out": "uniform@8" }] },
//!   "code": [
//!     { "comment": "gl_FragColor = color;" },
//!     { "op": "MOV", "d": { "name": "result", "address": 0 }, "s1": { "name": "uniform", "address": 2 } }
//!   ]
//! }
//! ```

use super::storage::StorageClass;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A complete compilation object: declared interface symbols plus code.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, JsonSchema)]
pub struct IrObject {
    #[serde(default)]
    pub symbols: DeclaredSymbols,
    #[serde(default)]
    pub code: Vec<IrEntry>,
}

impl IrObject {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Instructions only, comments skipped.
    pub fn instructions(&self) -> impl Iterator<Item = &IrInstruction> {
        self.code.iter().filter_map(|entry| match entry {
            IrEntry::Instruction(ins) => Some(ins),
            IrEntry::Comment(_) => None,
        })
    }
}

/// Declared symbols partitioned by storage class, in declaration order.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, JsonSchema)]
pub struct DeclaredSymbols {
    #[serde(default)]
    pub uniform: Vec<DeclaredSymbol>,
    #[serde(default)]
    pub attribute: Vec<DeclaredSymbol>,
    #[serde(default)]
    pub varying: Vec<DeclaredSymbol>,
}

impl DeclaredSymbols {
    pub fn class(&self, class: StorageClass) -> &[DeclaredSymbol] {
        match class {
            StorageClass::Uniform => &self.uniform,
            StorageClass::Attribute => &self.attribute,
            StorageClass::Varying => &self.varying,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (StorageClass, &DeclaredSymbol)> {
        StorageClass::ALL
            .into_iter()
            .flat_map(move |class| self.class(class).iter().map(move |sym| (class, sym)))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct DeclaredSymbol {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    /// Output label of the form `<base>@<offset>`.
    pub out: String,
}

impl DeclaredSymbol {
    pub fn new(name: impl Into<String>, ty: impl Into<String>, out: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            out: out.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum IrEntry {
    Comment(IrComment),
    Instruction(IrInstruction),
}

/// Display-only pseudo instruction.
///
/// Carries nothing but the text, so an instruction with a stray `comment`
/// key is still read as an instruction.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct IrComment {
    pub comment: String,
}

impl fmt::Display for IrComment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.comment)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct IrInstruction {
    pub op: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<IrOperand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s1: Option<IrOperand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s2: Option<IrOperand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3: Option<IrOperand>,
}

impl IrInstruction {
    pub fn new(op: impl Into<String>) -> Self {
        Self {
            op: op.into(),
            d: None,
            s1: None,
            s2: None,
            s3: None,
        }
    }

    pub fn dest(mut self, operand: IrOperand) -> Self {
        self.d = Some(operand);
        self
    }

    /// Fill the next free source slot.
    pub fn src(mut self, operand: IrOperand) -> Self {
        if self.s1.is_none() {
            self.s1 = Some(operand);
        } else if self.s2.is_none() {
            self.s2 = Some(operand);
        } else {
            self.s3 = Some(operand);
        }
        self
    }

    pub fn sources(&self) -> [Option<&IrOperand>; 3] {
        [self.s1.as_ref(), self.s2.as_ref(), self.s3.as_ref()]
    }
}

impl fmt::Display for IrInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.op)?;
        let operands = [&self.d, &self.s1, &self.s2, &self.s3];
        let mut first = true;
        for operand in operands.into_iter().flatten() {
            f.write_str(if first { " " } else { ", " })?;
            write!(f, "{}", operand)?;
            first = false;
        }
        Ok(())
    }
}

/// Operand as emitted by the front end.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
#[serde(untagged)]
pub enum IrOperand {
    /// Passed through verbatim (external function or constant).
    Literal { raw: String },
    Addressed {
        name: String,
        address: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        swizzle: Option<String>,
    },
}

impl IrOperand {
    pub fn literal(raw: impl Into<String>) -> Self {
        IrOperand::Literal { raw: raw.into() }
    }

    pub fn addressed(name: impl Into<String>, address: usize, swizzle: Option<&str>) -> Self {
        IrOperand::Addressed {
            name: name.into(),
            address,
            swizzle: swizzle.map(str::to_string),
        }
    }
}

impl fmt::Display for IrOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrOperand::Literal { raw } => f.write_str(raw),
            IrOperand::Addressed {
                name,
                address,
                swizzle,
            } => {
                write!(f, "{}[{}]", name, address)?;
                if let Some(swz) = swizzle {
                    write!(f, ".{}", swz)?;
                }
                Ok(())
            }
        }
    }
}
