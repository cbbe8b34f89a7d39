use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Variable,
    Function,
    Type,
}

/// Signature of a constructor-like type: argument types plus result type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinition {
    pub return_type: String,
    pub arg_types: Vec<String>,
}

impl TypeDefinition {
    pub fn new(return_type: impl Into<String>, arg_types: Vec<String>) -> Self {
        Self {
            return_type: return_type.into(),
            arg_types,
        }
    }

    /// Every supplied argument must equal the parameter at its position.
    /// Supplying fewer arguments than parameters is accepted.
    pub fn match_arguments(&self, args: &[&str]) -> bool {
        args.iter()
            .enumerate()
            .all(|(i, arg)| self.arg_types.get(i).is_some_and(|p| p == arg))
    }
}

impl fmt::Display for TypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.arg_types.join(","), self.return_type)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Definition {
    #[default]
    None,
    /// Ordered parameter types of a function.
    Params(Vec<String>),
    /// Descriptor of a type entry.
    Type(TypeDefinition),
}

/// A declaration record.
///
/// Entries are immutable once inserted; the `with_*` builders are meant to be
/// used before handing the entry to [`super::SymbolTable::add_entry`].
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolEntry {
    pub name: String,
    pub kind: EntryKind,
    pub ty: Option<String>,
    /// Element type when the entry is an array.
    pub base_type: Option<String>,
    pub definition: Definition,
    pub qualifier: Option<String>,
    pub array_size: Option<usize>,
    /// Scope depth stamped at insertion.
    pub depth: usize,
    /// Name used in generated code.
    pub alias: String,
    pub constant_value: Option<Vec<f32>>,
}

impl SymbolEntry {
    fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        let name = name.into();
        Self {
            alias: name.clone(),
            name,
            kind,
            ty: None,
            base_type: None,
            definition: Definition::None,
            qualifier: None,
            array_size: None,
            depth: 0,
            constant_value: None,
        }
    }

    pub fn variable(name: impl Into<String>, ty: Option<&str>) -> Self {
        let mut entry = Self::new(name, EntryKind::Variable);
        entry.ty = ty.map(str::to_string);
        entry
    }

    pub fn type_entry(name: impl Into<String>, definition: TypeDefinition) -> Self {
        let mut entry = Self::new(name, EntryKind::Type);
        entry.definition = Definition::Type(definition);
        entry
    }

    pub fn function(name: impl Into<String>, ty: Option<&str>, params: Vec<String>) -> Self {
        let mut entry = Self::new(name, EntryKind::Function);
        entry.ty = ty.map(str::to_string);
        entry.definition = Definition::Params(normalize_params(params));
        entry
    }

    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    pub fn with_array_size(mut self, size: usize) -> Self {
        self.array_size = Some(size);
        self
    }

    pub fn with_base_type(mut self, base_type: impl Into<String>) -> Self {
        self.base_type = Some(base_type.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    pub fn with_constant(mut self, value: Vec<f32>) -> Self {
        self.constant_value = Some(value);
        self
    }

    pub fn params(&self) -> Option<&[String]> {
        match &self.definition {
            Definition::Params(params) => Some(params),
            _ => None,
        }
    }

    pub fn type_definition(&self) -> Option<&TypeDefinition> {
        match &self.definition {
            Definition::Type(def) => Some(def),
            _ => None,
        }
    }
}

/// A zero-length parameter list is spelled `["void"]`.
pub(crate) fn normalize_params(params: Vec<String>) -> Vec<String> {
    if params.is_empty() {
        vec!["void".to_string()]
    } else {
        params
    }
}
