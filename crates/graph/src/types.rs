use ckg_scanner::{ClassRecord, MethodRecord, VariableRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// An indexed symbol. Serialized as the record's fields plus a `label`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "label")]
pub enum Symbol {
    Class(Arc<ClassRecord>),
    Method(Arc<MethodRecord>),
    Variable(Arc<VariableRecord>),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Class(c) => &c.name,
            Symbol::Method(m) => &m.name,
            Symbol::Variable(v) => &v.name,
        }
    }

    pub fn full_qualified_name(&self) -> &str {
        match self {
            Symbol::Class(c) => &c.full_qualified_name,
            Symbol::Method(m) => &m.full_qualified_name,
            Symbol::Variable(v) => &v.full_qualified_name,
        }
    }

    pub fn absolute_path(&self) -> &str {
        match self {
            Symbol::Class(c) => &c.absolute_path,
            Symbol::Method(m) => &m.absolute_path,
            Symbol::Variable(v) => &v.absolute_path,
        }
    }

    pub fn start_line(&self) -> usize {
        match self {
            Symbol::Class(c) => c.start_line,
            Symbol::Method(m) => m.start_line,
            Symbol::Variable(v) => v.start_line,
        }
    }

    pub fn end_line(&self) -> usize {
        match self {
            Symbol::Class(c) => c.end_line,
            Symbol::Method(m) => m.end_line,
            Symbol::Variable(v) => v.end_line,
        }
    }

    /// Owning class FQN for methods and variables
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Symbol::Class(_) => None,
            Symbol::Method(m) => m.class_name.as_deref(),
            Symbol::Variable(v) => v.class_name.as_deref(),
        }
    }

    pub fn label(&self) -> SymbolLabel {
        match self {
            Symbol::Class(_) => SymbolLabel::Class,
            Symbol::Method(_) => SymbolLabel::Method,
            Symbol::Variable(_) => SymbolLabel::Variable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolLabel {
    Class,
    Method,
    Variable,
}

/// Relationship kinds reported by `relationships_of`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipKind {
    /// Method or variable -> owning class
    BelongsTo,

    /// Container -> uniquely named callee
    Calls,

    /// Class <-> its methods
    HasMethod,

    /// Class <-> its class-level variables
    HasVariable,

    /// Class -> indexed parent class
    Inherits,

    /// Container -> uniquely named class
    References,
}

impl RelationshipKind {
    pub const ALL: [RelationshipKind; 6] = [
        RelationshipKind::BelongsTo,
        RelationshipKind::Calls,
        RelationshipKind::HasMethod,
        RelationshipKind::HasVariable,
        RelationshipKind::Inherits,
        RelationshipKind::References,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RelationshipKind::BelongsTo => "BELONGS_TO",
            RelationshipKind::Calls => "CALLS",
            RelationshipKind::HasMethod => "HAS_METHOD",
            RelationshipKind::HasVariable => "HAS_VARIABLE",
            RelationshipKind::Inherits => "INHERITS",
            RelationshipKind::References => "REFERENCES",
        }
    }
}

/// Related symbols grouped by kind; every kind is always present
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Relationships {
    groups: BTreeMap<RelationshipKind, Vec<Symbol>>,
}

impl Default for Relationships {
    fn default() -> Self {
        Self {
            groups: RelationshipKind::ALL
                .into_iter()
                .map(|kind| (kind, Vec::new()))
                .collect(),
        }
    }
}

impl Relationships {
    pub fn get(&self, kind: RelationshipKind) -> &[Symbol] {
        self.groups.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn push(&mut self, kind: RelationshipKind, symbol: Symbol) {
        self.groups.entry(kind).or_default().push(symbol);
    }

    pub fn extend(&mut self, kind: RelationshipKind, symbols: impl IntoIterator<Item = Symbol>) {
        self.groups.entry(kind).or_default().extend(symbols);
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(Vec::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RelationshipKind, &[Symbol])> {
        self.groups.iter().map(|(kind, symbols)| (*kind, symbols.as_slice()))
    }
}

/// Span of a class or method used for containment lookups
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerInterval {
    pub start_line: usize,
    pub end_line: usize,
    pub fqn: String,
    pub label: ContainerLabel,
    pub name: String,
}

impl ContainerInterval {
    pub fn contains(&self, line: usize) -> bool {
        self.start_line <= line && line <= self.end_line
    }

    pub fn span(&self) -> usize {
        self.end_line.saturating_sub(self.start_line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerLabel {
    Class,
    Method,
}

/// Classes and methods recorded for one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileSymbols {
    pub classes: Vec<Arc<ClassRecord>>,
    pub methods: Vec<Arc<MethodRecord>>,
}

/// Numbered slice of an indexed file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileExcerpt {
    pub path: String,
    pub total_lines: usize,
    pub start_line: usize,
    pub end_line: usize,
    pub lines: Vec<String>,
}

impl FileExcerpt {
    /// Lines prefixed with their 1-indexed line numbers
    pub fn numbered(&self) -> String {
        self.lines
            .iter()
            .enumerate()
            .map(|(offset, line)| format!("{:4}: {line}\n", self.start_line + offset))
            .collect()
    }
}

/// Size of a built graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub files: usize,
    pub classes: usize,
    pub methods: usize,
    pub variables: usize,
    pub tags: usize,
    pub calls_edges: usize,
    pub references_edges: usize,
}
