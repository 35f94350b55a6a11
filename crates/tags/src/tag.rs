use serde::{Deserialize, Serialize};

/// One definition or reference occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Path relative to the project root
    pub rel_fname: String,

    /// Absolute path
    pub fname: String,

    pub line: TagLine,
    pub name: String,
    pub kind: TagKind,
    pub category: TagCategory,
    pub info: String,
}

impl Tag {
    pub fn is_reference(&self) -> bool {
        self.kind == TagKind::Ref
    }

    pub fn is_definition(&self) -> bool {
        self.kind == TagKind::Def
    }
}

/// Where a tag occurs (1-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagLine {
    /// `[start, end]` of a definition name
    Span { start: usize, end: usize },

    /// Line of a reference
    Line(usize),

    /// Lexical fallback tags carry no position
    Unknown,
}

impl TagLine {
    /// First line of the occurrence, if known
    pub fn first(self) -> Option<usize> {
        match self {
            TagLine::Span { start, .. } => Some(start),
            TagLine::Line(line) => Some(line),
            TagLine::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    Def,
    Ref,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagCategory {
    Class,
    Function,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    Class,
    Function,
}

/// Meaning of a query capture, resolved once per grammar from its name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capture {
    Definition(DefinitionKind),
    Reference(TagCategory),
}

impl Capture {
    /// Map a capture name such as `name.definition.class`
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "name.definition.class" => Some(Capture::Definition(DefinitionKind::Class)),
            "name.definition.function" => Some(Capture::Definition(DefinitionKind::Function)),
            "name.reference.call" => Some(Capture::Reference(TagCategory::Function)),
            "name.reference.class" => Some(Capture::Reference(TagCategory::Class)),
            _ => None,
        }
    }

    pub fn kind(self) -> TagKind {
        match self {
            Capture::Definition(_) => TagKind::Def,
            Capture::Reference(_) => TagKind::Ref,
        }
    }

    pub fn category(self) -> TagCategory {
        match self {
            Capture::Definition(DefinitionKind::Class) => TagCategory::Class,
            Capture::Definition(DefinitionKind::Function) => TagCategory::Function,
            Capture::Reference(category) => category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_names_map_to_variants() {
        assert_eq!(
            Capture::from_name("name.definition.class"),
            Some(Capture::Definition(DefinitionKind::Class))
        );
        assert_eq!(
            Capture::from_name("name.reference.call").map(Capture::category),
            Some(TagCategory::Function)
        );
        assert_eq!(Capture::from_name("doc"), None);
    }

    #[test]
    fn tag_line_serializes_like_pairs_and_numbers() {
        let span = serde_json::to_string(&TagLine::Span { start: 3, end: 3 }).unwrap();
        assert_eq!(span, r#"{"start":3,"end":3}"#);
        assert_eq!(serde_json::to_string(&TagLine::Line(7)).unwrap(), "7");
        assert_eq!(serde_json::to_string(&TagLine::Unknown).unwrap(), "null");
        assert_eq!(TagLine::Unknown.first(), None);
        assert_eq!(TagLine::Span { start: 2, end: 4 }.first(), Some(2));
    }
}
