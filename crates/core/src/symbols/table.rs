use super::entry::{EntryKind, SymbolEntry, TypeDefinition, normalize_params};
use std::collections::HashMap;
use std::rc::Rc;

/// Per-compilation-unit table of declarations.
///
/// Each name maps to a stack of entries. The stack is stored outermost-first,
/// so the innermost (most recent) declaration is the last element and lookups
/// walk it back to front. Depths along a stack never increase towards the
/// outermost end.
#[derive(Debug, Default)]
pub struct SymbolTable {
    table: HashMap<String, Vec<Rc<SymbolEntry>>>,
    depth: usize,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of distinct names with at least one visible entry.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn push_scope(&mut self) {
        self.depth += 1;
    }

    /// Drop every entry declared in the current scope.
    ///
    /// Popping the global scope clears its entries and leaves the depth at 0.
    pub fn pop_scope(&mut self) {
        let depth = self.depth;
        self.table.retain(|_, entries| {
            while entries.last().is_some_and(|e| e.depth == depth) {
                entries.pop();
            }
            !entries.is_empty()
        });

        if self.depth == 0 {
            tracing::warn!("pop_scope called on the global scope");
        }
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn name_declared_this_scope(&self, name: &str) -> bool {
        self.get_entry(name)
            .is_some_and(|entry| entry.depth == self.depth)
    }

    /// Stamp `entry` with the current depth and make it the innermost
    /// declaration of its name.
    ///
    /// Redeclaration in the same scope is not rejected here; callers check
    /// [`Self::name_declared_this_scope`] first.
    pub fn add_entry(&mut self, mut entry: SymbolEntry) -> Rc<SymbolEntry> {
        entry.depth = self.depth;
        let entry = Rc::new(entry);
        self.table
            .entry(entry.name.clone())
            .or_default()
            .push(Rc::clone(&entry));
        entry
    }

    pub fn add_variable(&mut self, name: &str, ty: Option<&str>) -> Rc<SymbolEntry> {
        self.add_entry(SymbolEntry::variable(name, ty))
    }

    pub fn add_type(&mut self, name: &str, definition: TypeDefinition) -> Rc<SymbolEntry> {
        self.add_entry(SymbolEntry::type_entry(name, definition))
    }

    pub fn add_function(
        &mut self,
        name: &str,
        ty: Option<&str>,
        params: Vec<String>,
    ) -> Rc<SymbolEntry> {
        self.add_entry(SymbolEntry::function(name, ty, params))
    }

    /// Innermost entry for `name`, of any kind.
    pub fn get_entry(&self, name: &str) -> Option<&Rc<SymbolEntry>> {
        self.table.get(name).and_then(|entries| entries.last())
    }

    pub fn get_variable(&self, name: &str) -> Option<Rc<SymbolEntry>> {
        self.find(name, EntryKind::Variable, |_| true)
    }

    pub fn get_type(&self, name: &str) -> Option<Rc<SymbolEntry>> {
        self.find(name, EntryKind::Type, |_| true)
    }

    /// Resolve a function by name, and by exact signature when `args` is given.
    ///
    /// No coercion is attempted: the stored parameter list must equal `args`
    /// element for element. An empty `args` is looked up as `["void"]`.
    pub fn get_function(&self, name: &str, args: Option<&[&str]>) -> Option<Rc<SymbolEntry>> {
        let Some(args) = args else {
            return self.find(name, EntryKind::Function, |_| true);
        };

        let wanted = normalize_params(args.iter().map(|a| a.to_string()).collect());
        let found = self.find(name, EntryKind::Function, |entry| {
            entry.params().is_some_and(|params| params == wanted.as_slice())
        });

        if found.is_none() {
            tracing::debug!("No overload of {} matches ({})", name, wanted.join(", "));
        }
        found
    }

    fn find(
        &self,
        name: &str,
        kind: EntryKind,
        accept: impl Fn(&SymbolEntry) -> bool,
    ) -> Option<Rc<SymbolEntry>> {
        self.table
            .get(name)?
            .iter()
            .rev()
            .find(|entry| entry.kind == kind && accept(entry))
            .cloned()
    }
}
