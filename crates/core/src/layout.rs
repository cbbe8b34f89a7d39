//! Uniform / attribute / varying location bookkeeping.

use crate::types::TypeSizeTable;
use indexmap::IndexMap;
use scalarize_api::{CompileError, CompileResult, DeclaredSymbol, DeclaredSymbols, StorageClass};
use serde::Serialize;

/// Start offset and element count of one interface variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VarLocation {
    pub start: usize,
    pub size: usize,
}

/// A symbol ready to be registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutEntry {
    pub class: StorageClass,
    pub name: String,
    pub location: VarLocation,
}

/// Stage-independent address space, one bucket per storage class, kept in
/// declaration order.
///
/// Offsets are recorded as the front end assigned them; they are not checked
/// against region capacity here.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VariableLayout {
    uniform: IndexMap<String, VarLocation>,
    attribute: IndexMap<String, VarLocation>,
    varying: IndexMap<String, VarLocation>,
}

impl VariableLayout {
    pub fn new() -> Self {
        Self::default()
    }

    fn bucket(&self, class: StorageClass) -> &IndexMap<String, VarLocation> {
        match class {
            StorageClass::Uniform => &self.uniform,
            StorageClass::Attribute => &self.attribute,
            StorageClass::Varying => &self.varying,
        }
    }

    fn bucket_mut(&mut self, class: StorageClass) -> &mut IndexMap<String, VarLocation> {
        match class {
            StorageClass::Uniform => &mut self.uniform,
            StorageClass::Attribute => &mut self.attribute,
            StorageClass::Varying => &mut self.varying,
        }
    }

    pub fn insert(&mut self, class: StorageClass, name: impl Into<String>, location: VarLocation) {
        self.bucket_mut(class).insert(name.into(), location);
    }

    pub fn get(&self, class: StorageClass, name: &str) -> Option<VarLocation> {
        self.bucket(class).get(name).copied()
    }

    pub fn location(&self, class: StorageClass, name: &str) -> Option<usize> {
        self.get(class, name).map(|loc| loc.start)
    }

    pub fn size(&self, class: StorageClass, name: &str) -> Option<usize> {
        self.get(class, name).map(|loc| loc.size)
    }

    pub fn entries(&self, class: StorageClass) -> impl Iterator<Item = (&str, VarLocation)> {
        self.bucket(class)
            .iter()
            .map(|(name, loc)| (name.as_str(), *loc))
    }

    pub fn is_empty(&self) -> bool {
        StorageClass::ALL
            .into_iter()
            .all(|class| self.bucket(class).is_empty())
    }

    /// Parse and size every declared symbol without touching the registry.
    pub fn collect(
        symbols: &DeclaredSymbols,
        types: &dyn TypeSizeTable,
    ) -> CompileResult<Vec<LayoutEntry>> {
        symbols
            .iter()
            .map(|(class, symbol)| -> CompileResult<LayoutEntry> {
                Ok(LayoutEntry {
                    class,
                    name: symbol.name.clone(),
                    location: VarLocation {
                        start: parse_offset(symbol)?,
                        size: types.size_of(&symbol.ty).ok_or_else(|| {
                            CompileError::UnknownType {
                                name: symbol.name.clone(),
                                ty: symbol.ty.clone(),
                            }
                        })?,
                    },
                })
            })
            .collect()
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = LayoutEntry>) {
        for entry in entries {
            tracing::debug!(
                "Register {} {} at {} (size {})",
                entry.class,
                entry.name,
                entry.location.start,
                entry.location.size
            );
            self.insert(entry.class, entry.name, entry.location);
        }
    }

    /// Register every declared symbol of an object; nothing is registered
    /// if any symbol is malformed.
    pub fn merge(
        &mut self,
        symbols: &DeclaredSymbols,
        types: &dyn TypeSizeTable,
    ) -> CompileResult<()> {
        let entries = Self::collect(symbols, types)?;
        self.extend(entries);
        Ok(())
    }
}

/// Offset encoded in an output label such as `uniform@8`.
pub fn parse_offset(symbol: &DeclaredSymbol) -> CompileResult<usize> {
    symbol
        .out
        .rsplit_once('@')
        .and_then(|(_, offset)| offset.trim().parse::<usize>().ok())
        .ok_or_else(|| CompileError::MalformedLocation {
            name: symbol.name.clone(),
            label: symbol.out.clone(),
        })
}
