//! Operand and swizzle resolution.

use super::code::{Slot, Value};
use scalarize_api::{CompileError, CompileResult, IrOperand, Region};

/// Elements reserved per IR address; matches the 4-wide register file.
pub const SLOT_WIDTH: usize = 4;

const CHANNELS: [char; SLOT_WIDTH] = ['x', 'y', 'z', 'w'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Destination,
    Source,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedOperand {
    /// Substituted by bare name regardless of component position.
    Literal(String),
    Addressed {
        /// Buffer name, e.g. `temp_f32`.
        name: String,
        start: usize,
        /// Channel index per logical position.
        components: Vec<usize>,
    },
}

impl ResolvedOperand {
    pub fn components(&self) -> Option<&[usize]> {
        match self {
            ResolvedOperand::Literal(_) => None,
            ResolvedOperand::Addressed { components, .. } => Some(components),
        }
    }

    /// Element read or written at logical `position`.
    ///
    /// Positions past the end of the component list reuse the last component.
    pub fn value_at(&self, position: usize) -> Value {
        match self {
            ResolvedOperand::Literal(name) => Value::Literal(name.clone()),
            ResolvedOperand::Addressed {
                name,
                start,
                components,
            } => {
                let component = components
                    .get(position)
                    .or(components.last())
                    .copied()
                    .unwrap_or(0);
                Value::Slot(Slot::new(name.clone(), start.saturating_add(component)))
            }
        }
    }

    pub fn slot_at(&self, position: usize) -> Option<Slot> {
        match self.value_at(position) {
            Value::Slot(slot) => Some(slot),
            _ => None,
        }
    }
}

/// Buffer name for a storage base: `temp` becomes `temp_f32`.
pub fn buffer_name(base: &str) -> String {
    if base.ends_with(Region::BUFFER_SUFFIX) {
        base.to_string()
    } else {
        format!("{}{}", base, Region::BUFFER_SUFFIX)
    }
}

/// Channel indices for a swizzle.
///
/// A missing or empty swizzle means `xyzw`. Destinations get exactly one
/// index per swizzle letter; sources shorter than four letters repeat their
/// last channel so any destination position has an index to read.
pub fn swizzle_components(swizzle: Option<&str>, role: Role) -> CompileResult<Vec<usize>> {
    let swizzle = swizzle.filter(|s| !s.is_empty()).unwrap_or("xyzw");
    let malformed = || CompileError::MalformedSwizzle {
        swizzle: swizzle.to_string(),
    };

    let letters: Vec<char> = swizzle.chars().collect();
    if letters.len() > SLOT_WIDTH {
        return Err(malformed());
    }

    let mut components = Vec::with_capacity(SLOT_WIDTH);
    for position in 0..SLOT_WIDTH {
        match letters.get(position) {
            Some(letter) => {
                let index = CHANNELS
                    .iter()
                    .position(|c| c == letter)
                    .ok_or_else(malformed)?;
                components.push(index);
            }
            None if role == Role::Destination => break,
            None => {
                let last = components[position - 1];
                components.push(last);
            }
        }
    }
    Ok(components)
}

/// First element of `address`; the whole slot must be indexable.
fn slot_start(name: &str, address: usize) -> CompileResult<usize> {
    address
        .checked_mul(SLOT_WIDTH)
        .filter(|start| start.checked_add(SLOT_WIDTH - 1).is_some())
        .ok_or_else(|| CompileError::AddressOverflow {
            name: name.to_string(),
            address,
        })
}

/// Resolve one instruction operand; an unused slot resolves to `None`.
pub fn resolve_operand(
    operand: Option<&IrOperand>,
    role: Role,
) -> CompileResult<Option<ResolvedOperand>> {
    let Some(operand) = operand else {
        return Ok(None);
    };

    let resolved = match operand {
        IrOperand::Literal { raw } => ResolvedOperand::Literal(raw.clone()),
        IrOperand::Addressed {
            name,
            address,
            swizzle,
        } => ResolvedOperand::Addressed {
            name: buffer_name(name),
            start: slot_start(name, *address)?,
            components: swizzle_components(swizzle.as_deref(), role)?,
        },
    };
    Ok(Some(resolved))
}
