use crate::tag::Capture;
use ckg_scanner::Language;
use std::sync::OnceLock;
use tree_sitter::Query;

const PYTHON_QUERY: &str = r#"
(class_definition name: (identifier) @name.definition.class)
(function_definition name: (identifier) @name.definition.function)
(call function: [(identifier) @name.reference.call
                 (attribute attribute: (identifier) @name.reference.call)])
(class_definition superclasses: (argument_list (identifier) @name.reference.class))
(type (identifier) @name.reference.class)
"#;

const RUST_QUERY: &str = r#"
(struct_item name: (type_identifier) @name.definition.class)
(enum_item name: (type_identifier) @name.definition.class)
(trait_item name: (type_identifier) @name.definition.class)
(function_item name: (identifier) @name.definition.function)
(call_expression function: [(identifier) @name.reference.call
                            (field_expression field: (field_identifier) @name.reference.call)
                            (scoped_identifier name: (identifier) @name.reference.call)])
(impl_item type: (type_identifier) @name.reference.class)
"#;

const JAVASCRIPT_QUERY: &str = r#"
(class_declaration name: (identifier) @name.definition.class)
(function_declaration name: (identifier) @name.definition.function)
(method_definition name: (property_identifier) @name.definition.function)
(call_expression function: [(identifier) @name.reference.call
                            (member_expression property: (property_identifier) @name.reference.call)])
(new_expression constructor: (identifier) @name.reference.class)
"#;

const TYPESCRIPT_QUERY: &str = r#"
(class_declaration name: (type_identifier) @name.definition.class)
(interface_declaration name: (type_identifier) @name.definition.class)
(function_declaration name: (identifier) @name.definition.function)
(method_definition name: (property_identifier) @name.definition.function)
(call_expression function: [(identifier) @name.reference.call
                            (member_expression property: (property_identifier) @name.reference.call)])
(new_expression constructor: (identifier) @name.reference.class)
"#;

/// A compiled occurrence query with its capture table
pub struct Grammar {
    pub language: Language,
    pub ts_language: tree_sitter::Language,
    pub query: Query,

    /// Indexed by capture index
    captures: Vec<Option<Capture>>,
}

impl Grammar {
    fn compile(language: Language) -> Option<Self> {
        let source = match language {
            Language::Python => PYTHON_QUERY,
            Language::Rust => RUST_QUERY,
            Language::JavaScript => JAVASCRIPT_QUERY,
            Language::TypeScript | Language::Tsx => TYPESCRIPT_QUERY,
            Language::Unknown => return None,
        };

        let ts_language = match language.tree_sitter_language() {
            Ok(lang) => lang,
            Err(e) => {
                log::warn!("No grammar for {}: {e}", language.as_str());
                return None;
            }
        };

        match Query::new(&ts_language, source) {
            Ok(query) => {
                let captures = query
                    .capture_names()
                    .iter()
                    .map(|name| Capture::from_name(name))
                    .collect();
                Some(Self {
                    language,
                    ts_language,
                    query,
                    captures,
                })
            }
            Err(e) => {
                log::warn!(
                    "Failed to compile tag query for {}, tagging disabled: {e}",
                    language.as_str()
                );
                None
            }
        }
    }

    /// Meaning of a capture index, `None` for helper captures
    pub fn capture(&self, index: u32) -> Option<Capture> {
        self.captures.get(index as usize).copied().flatten()
    }
}

/// Compiled grammar for a language, built once per process
pub fn grammar_for(language: Language) -> Option<&'static Grammar> {
    static PYTHON: OnceLock<Option<Grammar>> = OnceLock::new();
    static RUST: OnceLock<Option<Grammar>> = OnceLock::new();
    static JAVASCRIPT: OnceLock<Option<Grammar>> = OnceLock::new();
    static TYPESCRIPT: OnceLock<Option<Grammar>> = OnceLock::new();
    static TSX: OnceLock<Option<Grammar>> = OnceLock::new();

    let cell = match language {
        Language::Python => &PYTHON,
        Language::Rust => &RUST,
        Language::JavaScript => &JAVASCRIPT,
        Language::TypeScript => &TYPESCRIPT,
        Language::Tsx => &TSX,
        Language::Unknown => return None,
    };
    cell.get_or_init(|| Grammar::compile(language)).as_ref()
}
