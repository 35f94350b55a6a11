use crate::error::{Result, ScanError};
use crate::language::Language;
use crate::legacy::rewrite_legacy_syntax;
use crate::module_path::{package_prefix, resolve_import_module};
use crate::source::split_lines;
use crate::types::{
    ClassRecord, ClassType, FileRecord, MethodRecord, MethodType, Param, VariableRecord,
};
use std::borrow::Cow;
use std::collections::HashMap;
use tree_sitter::{Node, Parser, Tree};

/// Where the file being analyzed lives
#[derive(Debug, Clone, Copy)]
pub struct FileContext<'a> {
    pub absolute_path: &'a str,
    pub module_path: &'a str,
}

/// Tree-sitter based extractor of class, method and variable records
pub struct PythonAnalyzer {
    parser: Parser,
    max_depth: usize,
}

impl PythonAnalyzer {
    pub fn new(max_depth: usize) -> Result<Self> {
        let ts_language = Language::Python.tree_sitter_language()?;
        let mut parser = Parser::new();
        parser
            .set_language(&ts_language)
            .map_err(|e| ScanError::tree_sitter(format!("Failed to set language: {e}")))?;

        Ok(Self { parser, max_depth })
    }

    /// Extract all records from one file's source.
    ///
    /// Fails with `ParseError` when the source does not parse even after the
    /// legacy rewrite, and with `DepthExceeded` on pathologically nested
    /// input. `content` slices always come from the original text.
    pub fn analyze(&mut self, source: &str, ctx: FileContext<'_>) -> Result<FileRecord> {
        let lines = split_lines(source);
        let (tree, analyzed) = self.parse_with_fallback(source, ctx.absolute_path)?;

        let extraction = Extraction {
            source: &analyzed,
            lines: &lines,
            ctx,
            max_depth: self.max_depth,
            import_map: HashMap::new(),
            scopes: Vec::new(),
            classes: Vec::new(),
            functions: Vec::new(),
            variables: Vec::new(),
        };
        let (classes, functions, variables) = extraction.run(tree.root_node())?;

        Ok(FileRecord {
            classes,
            functions,
            variables,
            text: lines,
        })
    }

    fn parse_with_fallback<'s>(
        &mut self,
        source: &'s str,
        path: &str,
    ) -> Result<(Tree, Cow<'s, str>)> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| ScanError::parse(format!("{path}: parser returned no tree")))?;
        if !tree.root_node().has_error() {
            return Ok((tree, Cow::Borrowed(source)));
        }

        let Some(rewritten) = rewrite_legacy_syntax(source) else {
            return Err(ScanError::parse(format!("{path}: syntax error")));
        };

        let tree = self
            .parser
            .parse(&rewritten, None)
            .ok_or_else(|| ScanError::parse(format!("{path}: parser returned no tree")))?;
        if tree.root_node().has_error() {
            return Err(ScanError::parse(format!(
                "{path}: syntax error persists after legacy rewrite"
            )));
        }

        log::warn!("Parsed {path} after rewriting legacy syntax");
        Ok((tree, Cow::Owned(rewritten)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeKind {
    Module,
    Class,
    Function,
}

#[derive(Debug)]
struct Scope {
    kind: ScopeKind,
    qualified_name: String,
    parent: Option<usize>,
    class_index: Option<usize>,
}

struct Frame<'t> {
    node: Node<'t>,
    depth: usize,
    scope: usize,
}

/// State of one file's traversal
struct Extraction<'a> {
    source: &'a str,
    lines: &'a [String],
    ctx: FileContext<'a>,
    max_depth: usize,
    import_map: HashMap<String, String>,
    scopes: Vec<Scope>,
    classes: Vec<ClassRecord>,
    functions: Vec<MethodRecord>,
    variables: Vec<VariableRecord>,
}

type Records = (Vec<ClassRecord>, Vec<MethodRecord>, Vec<VariableRecord>);

impl<'a> Extraction<'a> {
    fn run(mut self, root: Node<'_>) -> Result<Records> {
        self.import_map = self.collect_import_map(root);
        self.scopes.push(Scope {
            kind: ScopeKind::Module,
            qualified_name: self.ctx.module_path.to_string(),
            parent: None,
            class_index: None,
        });

        let mut stack = vec![Frame {
            node: root,
            depth: 0,
            scope: 0,
        }];

        while let Some(frame) = stack.pop() {
            if frame.depth > self.max_depth {
                return Err(ScanError::DepthExceeded {
                    limit: self.max_depth,
                });
            }

            let node = frame.node;
            let child_scope = match node.kind() {
                "class_definition" => {
                    let scope = self.enter_class(node, frame.scope);
                    if let Some(body) = node.child_by_field_name("body") {
                        stack.push(Frame {
                            node: body,
                            depth: frame.depth + 1,
                            scope,
                        });
                    }
                    continue;
                }
                "function_definition" => {
                    let scope = self.enter_function(node, frame.scope);
                    if let Some(body) = node.child_by_field_name("body") {
                        stack.push(Frame {
                            node: body,
                            depth: frame.depth + 1,
                            scope,
                        });
                    }
                    continue;
                }
                "expression_statement" => {
                    self.record_assignment(node, frame.scope);
                    continue;
                }
                _ => frame.scope,
            };

            let mut cursor = node.walk();
            let children: Vec<Node> = node.named_children(&mut cursor).collect();
            for child in children.into_iter().rev() {
                stack.push(Frame {
                    node: child,
                    depth: frame.depth + 1,
                    scope: child_scope,
                });
            }
        }

        Ok((self.classes, self.functions, self.variables))
    }

    /// Top-level `from X import Y [as Z]` statements, local name -> qualified name
    fn collect_import_map(&self, root: Node<'_>) -> HashMap<String, String> {
        let mut map = HashMap::new();
        let mut cursor = root.walk();

        for stmt in root.named_children(&mut cursor) {
            if stmt.kind() != "import_from_statement" {
                continue;
            }
            let Some(module_node) = stmt.child_by_field_name("module_name") else {
                continue;
            };
            let (level, module) = self.import_origin(module_node);
            let origin = resolve_import_module(self.ctx.module_path, level, &module);

            let mut name_cursor = stmt.walk();
            for name_node in stmt.children_by_field_name("name", &mut name_cursor) {
                let (imported, local) = match name_node.kind() {
                    "aliased_import" => {
                        let imported = name_node
                            .child_by_field_name("name")
                            .map(|n| self.text(n).to_string())
                            .unwrap_or_default();
                        let local = name_node
                            .child_by_field_name("alias")
                            .map(|n| self.text(n).to_string())
                            .unwrap_or_else(|| imported.clone());
                        (imported, local)
                    }
                    _ => {
                        let imported = self.text(name_node).to_string();
                        (imported.clone(), imported)
                    }
                };
                if imported.is_empty() {
                    continue;
                }
                let qualified = if origin.is_empty() {
                    imported
                } else {
                    format!("{origin}.{imported}")
                };
                map.insert(local, qualified);
            }
        }

        map
    }

    /// Split `from ..pkg import x` into (level, "pkg")
    fn import_origin(&self, module_node: Node<'_>) -> (usize, String) {
        if module_node.kind() != "relative_import" {
            return (0, self.text(module_node).to_string());
        }

        let mut level = 0;
        let mut module = String::new();
        let mut cursor = module_node.walk();
        for child in module_node.named_children(&mut cursor) {
            match child.kind() {
                "import_prefix" => level = self.text(child).chars().filter(|c| *c == '.').count(),
                "dotted_name" => module = self.text(child).to_string(),
                _ => {}
            }
        }
        (level, module)
    }

    fn enter_class(&mut self, node: Node<'_>, scope: usize) -> usize {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        let qualified_name = self.qualify(scope, &name);
        let (start_line, end_line) = line_span(node);

        let class_type = if self.enclosing_class(scope).is_some() {
            ClassType::Inner
        } else {
            ClassType::Normal
        };

        let parent_class = node
            .child_by_field_name("superclasses")
            .and_then(|bases| self.first_base(bases))
            .map(|base| self.resolve_parent(base));

        let class_index = self.classes.len();
        self.classes.push(ClassRecord {
            name,
            full_qualified_name: qualified_name.clone(),
            absolute_path: self.ctx.absolute_path.to_string(),
            start_line,
            end_line,
            content: self.content(start_line, end_line),
            class_type,
            parent_class,
            methods: Vec::new(),
            constants: Vec::new(),
        });

        self.push_scope(ScopeKind::Class, qualified_name, scope, Some(class_index))
    }

    fn first_base<'t>(&self, bases: Node<'t>) -> Option<Node<'t>> {
        let mut cursor = bases.walk();
        let first = bases
            .named_children(&mut cursor)
            .find(|child| !matches!(child.kind(), "keyword_argument" | "comment"));
        first
    }

    /// Only a bare identifier is resolved; anything else keeps its source text
    fn resolve_parent(&self, base: Node<'_>) -> String {
        let text = self.text(base).trim();
        if base.kind() != "identifier" {
            return text.to_string();
        }
        self.import_map
            .get(text)
            .cloned()
            .unwrap_or_else(|| format!("{}.{text}", package_prefix(self.ctx.module_path)))
    }

    fn enter_function(&mut self, node: Node<'_>, scope: usize) -> usize {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        let qualified_name = self.qualify(scope, &name);
        let (start_line, end_line) = line_span(node);

        let direct_class = (self.scopes[scope].kind == ScopeKind::Class)
            .then(|| self.scopes[scope].qualified_name.clone());

        let mut modifiers = self.decorators(node);
        let private = name.starts_with("__") && !name.ends_with("__");
        modifiers.push(if private { "private" } else { "public" }.to_string());

        let params_node = node.child_by_field_name("parameters");
        let params = params_node.map(|p| self.params(p)).unwrap_or_default();
        let params_text = params_node
            .map(|p| collapse_whitespace(self.text(p)))
            .unwrap_or_else(|| "()".to_string());

        let record = MethodRecord {
            signature: format!("def {name}{params_text}"),
            method_type: if name == "__init__" {
                MethodType::Constructor
            } else {
                MethodType::Normal
            },
            name,
            full_qualified_name: qualified_name.clone(),
            absolute_path: self.ctx.absolute_path.to_string(),
            start_line,
            end_line,
            content: self.content(start_line, end_line),
            params,
            modifiers,
            is_class_method: direct_class.is_some(),
            class_name: direct_class,
        };

        match self.scopes[scope].class_index {
            Some(idx) if self.scopes[scope].kind == ScopeKind::Class => {
                self.classes[idx].methods.push(record);
            }
            _ => self.functions.push(record),
        }

        self.push_scope(ScopeKind::Function, qualified_name, scope, None)
    }

    fn decorators(&self, function: Node<'_>) -> Vec<String> {
        let Some(parent) = function.parent() else {
            return Vec::new();
        };
        if parent.kind() != "decorated_definition" {
            return Vec::new();
        }

        let mut cursor = parent.walk();
        let decorators = parent
            .named_children(&mut cursor)
            .filter(|child| child.kind() == "decorator")
            .map(|child| self.text(child).trim_start_matches('@').trim().to_string())
            .collect();
        decorators
    }

    fn params(&self, parameters: Node<'_>) -> Vec<Param> {
        let mut out = Vec::new();
        let mut cursor = parameters.walk();

        for param in parameters.named_children(&mut cursor) {
            let (name_node, annotation) = match param.kind() {
                "identifier" => (Some(param), None),
                "default_parameter" => (param.child_by_field_name("name"), None),
                "typed_default_parameter" => (
                    param.child_by_field_name("name"),
                    param.child_by_field_name("type"),
                ),
                "typed_parameter" => {
                    let mut inner = param.walk();
                    let first = param.named_children(&mut inner).next();
                    (first, param.child_by_field_name("type"))
                }
                _ => (None, None),
            };

            // `*args: T` and `**kwargs: T` surface as splat patterns here
            let Some(name_node) = name_node.filter(|n| n.kind() == "identifier") else {
                continue;
            };
            out.push(Param {
                name: self.text(name_node).to_string(),
                annotation: annotation.map(|t| self.text(t).trim().to_string()),
            });
        }

        out
    }

    fn record_assignment(&mut self, statement: Node<'_>, scope: usize) {
        let kind = self.scopes[scope].kind;
        if kind == ScopeKind::Function {
            return;
        }

        let Some(assignment) = statement
            .named_child(0)
            .filter(|n| n.kind() == "assignment")
        else {
            return;
        };
        let Some(target) = assignment
            .child_by_field_name("left")
            .filter(|n| n.kind() == "identifier")
        else {
            return;
        };

        // Bare annotations (`x: int`) declare nothing
        let Some(mut value) = assignment.child_by_field_name("right") else {
            return;
        };
        // `a = b = 1` records `a` with the final value
        while value.kind() == "assignment" {
            match value.child_by_field_name("right") {
                Some(next) => value = next,
                None => break,
            }
        }

        let name = self.text(target).to_string();
        let (start_line, end_line) = line_span(statement);
        let data_type = literal_type(value, self.source, 0, self.max_depth)
            .map(str::to_string)
            .unwrap_or_else(|| self.text(value).trim().to_string());

        let class_name =
            (kind == ScopeKind::Class).then(|| self.scopes[scope].qualified_name.clone());

        let record = VariableRecord {
            full_qualified_name: self.qualify(scope, &name),
            name,
            absolute_path: self.ctx.absolute_path.to_string(),
            start_line,
            end_line,
            content: self.content(start_line, end_line),
            modifiers: Vec::new(),
            data_type,
            class_name,
        };

        match self.scopes[scope].class_index {
            Some(idx) if kind == ScopeKind::Class => self.classes[idx].constants.push(record),
            _ => self.variables.push(record),
        }
    }

    fn push_scope(
        &mut self,
        kind: ScopeKind,
        qualified_name: String,
        parent: usize,
        class_index: Option<usize>,
    ) -> usize {
        self.scopes.push(Scope {
            kind,
            qualified_name,
            parent: Some(parent),
            class_index,
        });
        self.scopes.len() - 1
    }

    fn enclosing_class(&self, scope: usize) -> Option<usize> {
        let mut current = Some(scope);
        while let Some(idx) = current {
            if self.scopes[idx].kind == ScopeKind::Class {
                return Some(idx);
            }
            current = self.scopes[idx].parent;
        }
        None
    }

    fn qualify(&self, scope: usize, name: &str) -> String {
        let prefix = &self.scopes[scope].qualified_name;
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        }
    }

    fn content(&self, start_line: usize, end_line: usize) -> String {
        let start = start_line.saturating_sub(1).min(self.lines.len());
        let end = end_line.min(self.lines.len()).max(start);
        self.lines[start..end].join("\n")
    }

    fn text(&self, node: Node<'_>) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }
}

/// 1-indexed inclusive line span of a node
fn line_span(node: Node<'_>) -> (usize, usize) {
    let start = node.start_position();
    let end = node.end_position();
    let end_line = if end.column == 0 && end.row > start.row {
        end.row
    } else {
        end.row + 1
    };
    (start.row + 1, end_line)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace("( ", "(")
        .replace(" )", ")")
}

/// Python type name of a literal expression, or `None` when the expression
/// is not a pure literal.
fn literal_type(node: Node<'_>, source: &str, depth: usize, max_depth: usize) -> Option<&'static str> {
    if depth > max_depth {
        return None;
    }
    let text = node.utf8_text(source.as_bytes()).unwrap_or("");

    let all_literal = |node: Node<'_>| -> bool {
        let mut cursor = node.walk();
        let children: Vec<Node> = node
            .named_children(&mut cursor)
            .filter(|child| child.kind() != "comment")
            .collect();
        children
            .into_iter()
            .all(|child| literal_type(child, source, depth + 1, max_depth).is_some())
    };

    match node.kind() {
        "integer" | "float" if text.ends_with(['j', 'J']) => Some("complex"),
        "integer" => Some("int"),
        "float" => Some("float"),
        "true" | "false" => Some("bool"),
        "none" => Some("NoneType"),
        "string" => string_literal_type(node, text),
        "concatenated_string" => {
            let mut cursor = node.walk();
            let first = node.named_children(&mut cursor).next()?;
            if all_literal(node) {
                literal_type(first, source, depth + 1, max_depth)
            } else {
                None
            }
        }
        "unary_operator" => {
            let operand = node.child_by_field_name("argument")?;
            match literal_type(operand, source, depth + 1, max_depth)? {
                numeric @ ("int" | "float" | "complex") => Some(numeric),
                _ => None,
            }
        }
        "parenthesized_expression" => {
            let inner = node.named_child(0)?;
            literal_type(inner, source, depth + 1, max_depth)
        }
        "list" if all_literal(node) => Some("list"),
        "tuple" if all_literal(node) => Some("tuple"),
        "set" if all_literal(node) => Some("set"),
        "dictionary" => {
            let mut cursor = node.walk();
            let pairs: Vec<Node> = node
                .named_children(&mut cursor)
                .filter(|child| child.kind() != "comment")
                .collect();
            pairs
                .into_iter()
                .all(|pair| pair.kind() == "pair" && all_literal(pair))
                .then_some("dict")
        }
        _ => None,
    }
}

fn string_literal_type(node: Node<'_>, text: &str) -> Option<&'static str> {
    let mut cursor = node.walk();
    let interpolated = node
        .named_children(&mut cursor)
        .any(|child| child.kind() == "interpolation");
    if interpolated {
        return None;
    }

    let prefix: String = text
        .chars()
        .take_while(|c| *c != '"' && *c != '\'')
        .collect::<String>()
        .to_ascii_lowercase();
    if prefix.contains('f') {
        None
    } else if prefix.contains('b') {
        Some("bytes")
    } else {
        Some("str")
    }
}
