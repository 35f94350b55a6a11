use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A class definition found by the structural scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub name: String,

    /// Module path + enclosing scopes + name, dot-joined
    pub full_qualified_name: String,

    pub absolute_path: String,

    /// 1-indexed, inclusive
    pub start_line: usize,
    pub end_line: usize,

    /// Verbatim source lines of the definition
    pub content: String,

    pub class_type: ClassType,

    /// Resolved (or best-effort) qualified name of the first base class
    pub parent_class: Option<String>,

    /// Functions defined directly in the class body
    pub methods: Vec<MethodRecord>,

    /// Assignments made directly in the class body
    pub constants: Vec<VariableRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassType {
    Normal,
    Inner,
}

/// A function or method definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodRecord {
    pub name: String,
    pub full_qualified_name: String,
    pub absolute_path: String,
    pub start_line: usize,
    pub end_line: usize,
    pub content: String,
    pub params: Vec<Param>,

    /// Decorators (without `@`) followed by the access level
    pub modifiers: Vec<String>,

    /// `def name(params)` on a single line
    pub signature: String,

    /// Qualified name of the owning class, when this is a method
    pub class_name: Option<String>,

    #[serde(rename = "type")]
    pub method_type: MethodType,

    pub is_class_method: bool,
}

impl MethodRecord {
    pub fn is_constructor(&self) -> bool {
        self.method_type == MethodType::Constructor
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub annotation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodType {
    Constructor,
    Normal,
}

/// A module-level or class-level assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRecord {
    pub name: String,
    pub full_qualified_name: String,
    pub absolute_path: String,
    pub start_line: usize,
    pub end_line: usize,
    pub content: String,
    pub modifiers: Vec<String>,

    /// Literal type name (`int`, `str`, ...) or the value's source text
    pub data_type: String,

    pub class_name: Option<String>,
}

/// Everything the scan records for one source file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// All classes in pre-order, inner classes included
    pub classes: Vec<ClassRecord>,

    /// Functions not defined directly in a class body
    pub functions: Vec<MethodRecord>,

    /// Module-level assignments
    pub variables: Vec<VariableRecord>,

    /// File lines, kept for content slicing and keyword search
    pub text: Vec<String>,
}

impl FileRecord {
    /// Record with no symbols, used when analysis of a file is abandoned
    pub fn empty(text: Vec<String>) -> Self {
        Self {
            text,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.functions.is_empty() && self.variables.is_empty()
    }

    pub fn symbol_count(&self) -> usize {
        self.classes
            .iter()
            .map(|class| 1 + class.methods.len() + class.constants.len())
            .sum::<usize>()
            + self.functions.len()
            + self.variables.len()
    }
}

/// A node of the structural tree: a directory or a scanned file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    File(FileRecord),
    Dir(BTreeMap<String, TreeNode>),
}

/// Nested mapping from path segments to file records, wrapped under the
/// project folder name. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureTree {
    root_name: String,
    entries: BTreeMap<String, TreeNode>,
}

impl StructureTree {
    pub fn new(root_name: impl Into<String>) -> Self {
        let root_name = root_name.into();
        let mut entries = BTreeMap::new();
        entries.insert(root_name.clone(), TreeNode::Dir(BTreeMap::new()));
        Self { root_name, entries }
    }

    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    /// Insert a file record under its `/`-separated project-relative path
    pub fn insert(&mut self, relative_path: &str, record: FileRecord) {
        let segments: Vec<&str> = relative_path.split('/').filter(|s| !s.is_empty()).collect();
        let Some((file_name, dirs)) = segments.split_last() else {
            return;
        };

        let mut current = match self.entries.get_mut(&self.root_name) {
            Some(TreeNode::Dir(children)) => children,
            _ => return,
        };

        for dir in dirs {
            let node = current
                .entry((*dir).to_string())
                .or_insert_with(|| TreeNode::Dir(BTreeMap::new()));
            if let TreeNode::File(_) = node {
                *node = TreeNode::Dir(BTreeMap::new());
            }
            current = match node {
                TreeNode::Dir(children) => children,
                TreeNode::File(_) => return,
            };
        }

        current.insert((*file_name).to_string(), TreeNode::File(record));
    }

    /// Look up a file by its project-relative path
    pub fn get(&self, relative_path: &str) -> Option<&FileRecord> {
        let mut node = self.entries.get(&self.root_name)?;
        for segment in relative_path.split('/').filter(|s| !s.is_empty()) {
            node = match node {
                TreeNode::Dir(children) => children.get(segment)?,
                TreeNode::File(_) => return None,
            };
        }
        match node {
            TreeNode::File(record) => Some(record),
            TreeNode::Dir(_) => None,
        }
    }

    /// All file records with their project-relative paths, in path order
    pub fn files(&self) -> Vec<(String, &FileRecord)> {
        let mut out = Vec::new();
        let Some(root) = self.entries.get(&self.root_name) else {
            return out;
        };

        // Children are pushed in reverse so the walk yields sorted paths
        let mut stack: Vec<(String, &TreeNode)> = vec![(String::new(), root)];
        while let Some((prefix, node)) = stack.pop() {
            match node {
                TreeNode::File(record) => out.push((prefix, record)),
                TreeNode::Dir(children) => {
                    for (name, child) in children.iter().rev() {
                        let path = if prefix.is_empty() {
                            name.clone()
                        } else {
                            format!("{prefix}/{name}")
                        };
                        stack.push((path, child));
                    }
                }
            }
        }
        out
    }

    pub fn file_count(&self) -> usize {
        self.files().len()
    }
}
