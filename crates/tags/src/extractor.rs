use crate::builtins::{is_builtin, is_python_stdlib, python_module_callables};
use crate::config::TagConfig;
use crate::error::{Result, TagError};
use crate::grammar::{grammar_for, Grammar};
use crate::identifiers::identifier_names;
use crate::tag::{Capture, Tag, TagCategory, TagKind, TagLine};
use ckg_scanner::{decode_source, run_in_pool, Language, SourceFile};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Parser, QueryCursor};

/// Occurrences of one file, in document order
#[derive(Debug)]
pub struct TagStream {
    inner: std::vec::IntoIter<Tag>,
}

impl TagStream {
    fn new(tags: Vec<Tag>) -> Self {
        Self {
            inner: tags.into_iter(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl Iterator for TagStream {
    type Item = Tag;

    fn next(&mut self) -> Option<Tag> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Emits definition and reference tags using the bundled grammars
pub struct TagExtractor {
    root: PathBuf,
    config: TagConfig,

    /// Worker threads for `extract_all` (0 = rayon default)
    threads: usize,
}

type Parsers = HashMap<Language, Parser>;

impl TagExtractor {
    pub fn new(root: impl AsRef<Path>, config: TagConfig) -> Result<Self> {
        config.validate().map_err(TagError::invalid_config)?;
        Ok(Self {
            root: root.as_ref().to_path_buf(),
            config,
            threads: 0,
        })
    }

    /// Tag files on a pool of `threads` workers
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Tags of a single file. Empty when the file vanished or its language
    /// has no grammar.
    pub fn tags(&self, path: impl AsRef<Path>, rel_fname: &str) -> TagStream {
        let mut parsers = Parsers::new();
        TagStream::new(self.tag_file(&mut parsers, path.as_ref(), rel_fname))
    }

    /// Tags of every file, in file order. Files are tagged in parallel.
    pub fn extract_all(&self, files: &[SourceFile]) -> Vec<Tag> {
        let per_file: Vec<Vec<Tag>> = run_in_pool(self.threads, || {
            files
                .par_iter()
                .map_init(Parsers::new, |parsers, file| {
                    self.tag_file(parsers, &file.absolute, &file.relative)
                })
                .collect()
        });

        let tags: Vec<Tag> = per_file.into_iter().flatten().collect();
        log::info!("Extracted {} tags from {} files", tags.len(), files.len());
        tags
    }

    /// Tags of an in-memory source
    pub fn tags_for_source(
        &self,
        language: Language,
        source: &str,
        fname: &str,
        rel_fname: &str,
    ) -> Result<Vec<Tag>> {
        let grammar = grammar_for(language)
            .ok_or_else(|| TagError::unsupported_language(language.as_str()))?;
        let mut parsers = Parsers::new();
        self.tag_source(&mut parsers, grammar, source, fname, rel_fname)
    }

    fn tag_file(&self, parsers: &mut Parsers, path: &Path, rel_fname: &str) -> Vec<Tag> {
        let language = Language::from_path(path);
        if !language.has_grammar() {
            log::debug!("No grammar for {}, skipping tags", path.display());
            return Vec::new();
        }

        if let Err(e) = std::fs::metadata(path).and_then(|meta| meta.modified()) {
            log::debug!("No tags for {}: {e}", path.display());
            return Vec::new();
        }

        let Some(grammar) = grammar_for(language) else {
            log::warn!("Tag query unavailable for {}", language.as_str());
            return Vec::new();
        };

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Failed to read {}: {e}", path.display());
                return Vec::new();
            }
        };
        let decoded = decode_source(&bytes);
        let fname = path.to_string_lossy();

        match self.tag_source(parsers, grammar, &decoded.text, &fname, rel_fname) {
            Ok(tags) => tags,
            Err(e) => {
                log::warn!("Tag extraction failed for {rel_fname}: {e}");
                Vec::new()
            }
        }
    }

    fn tag_source(
        &self,
        parsers: &mut Parsers,
        grammar: &Grammar,
        source: &str,
        fname: &str,
        rel_fname: &str,
    ) -> Result<Vec<Tag>> {
        let parser = match parsers.entry(grammar.language) {
            std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::hash_map::Entry::Vacant(entry) => {
                let mut parser = Parser::new();
                parser
                    .set_language(&grammar.ts_language)
                    .map_err(|e| TagError::tree_sitter(format!("Failed to set language: {e}")))?;
                entry.insert(parser)
            }
        };

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| TagError::tree_sitter("parser returned no tree"))?;
        let root = tree.root_node();
        let exclusions = Exclusions::for_file(grammar.language, root, source, &self.config);

        let make_tag = |name: String, line: TagLine, kind: TagKind, category: TagCategory| Tag {
            rel_fname: rel_fname.to_string(),
            fname: fname.to_string(),
            line,
            name,
            kind,
            category,
            info: String::new(),
        };

        let mut located: Vec<(usize, Tag)> = Vec::new();
        let mut saw_def = false;
        let mut saw_ref = false;

        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&grammar.query, root, source.as_bytes());
        while let Some(query_match) = matches.next() {
            for capture in query_match.captures {
                let Some(meaning) = grammar.capture(capture.index) else {
                    continue;
                };
                match meaning {
                    Capture::Definition(_) => saw_def = true,
                    Capture::Reference(_) => saw_ref = true,
                }

                let name = capture
                    .node
                    .utf8_text(source.as_bytes())
                    .unwrap_or("")
                    .to_string();
                if name.is_empty() || exclusions.excludes(&name) {
                    continue;
                }

                let start = capture.node.start_position().row + 1;
                let line = match meaning {
                    Capture::Definition(_) => TagLine::Span {
                        start,
                        end: capture.node.end_position().row + 1,
                    },
                    Capture::Reference(_) => TagLine::Line(start),
                };
                located.push((
                    capture.node.start_byte(),
                    make_tag(name, line, meaning.kind(), meaning.category()),
                ));
            }
        }

        located.sort_by_key(|(offset, _)| *offset);
        let mut tags: Vec<Tag> = located.into_iter().map(|(_, tag)| tag).collect();

        // Captures of only one kind mean the grammar missed part of the file
        if saw_def != saw_ref {
            log::debug!("Lexical fallback for {rel_fname}");
            for name in identifier_names(root, source) {
                if exclusions.excludes(&name) {
                    continue;
                }
                tags.push(make_tag(name, TagLine::Unknown, TagKind::Ref, TagCategory::Function));
            }
        }

        Ok(tags)
    }
}

/// Names dropped from a file's tags
struct Exclusions<'c> {
    language: Language,
    imported: HashSet<String>,
    config: &'c TagConfig,
}

impl<'c> Exclusions<'c> {
    fn for_file(language: Language, root: Node<'_>, source: &str, config: &'c TagConfig) -> Self {
        let imported = if language == Language::Python {
            python_stdlib_imports(root, source)
        } else {
            HashSet::new()
        };
        Self {
            language,
            imported,
            config,
        }
    }

    fn excludes(&self, name: &str) -> bool {
        if self.config.allow.iter().any(|allowed| allowed == name) {
            return false;
        }
        self.config.deny.iter().any(|denied| denied == name)
            || is_builtin(self.language, name)
            || self.imported.contains(name)
    }
}

/// Names bound by standard-library imports anywhere in the file, plus the
/// known callables of the imported modules.
fn python_stdlib_imports(root: Node<'_>, source: &str) -> HashSet<String> {
    let mut names = HashSet::new();

    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        match node.kind() {
            "import_statement" => {
                let mut cursor = node.walk();
                for name_node in node.children_by_field_name("name", &mut cursor) {
                    let (module, alias) = split_alias(name_node, source);
                    if !is_python_stdlib(&module) {
                        continue;
                    }
                    if let Some(top) = module.split('.').next() {
                        names.insert(top.to_string());
                    }
                    names.extend(alias);
                    extend_callables(&mut names, &module);
                    names.insert(module);
                }
            }
            "import_from_statement" => {
                let Some(module_node) = node
                    .child_by_field_name("module_name")
                    .filter(|n| n.kind() == "dotted_name")
                else {
                    continue;
                };
                let module = node_text(module_node, source);
                if !is_python_stdlib(&module) {
                    continue;
                }

                let mut cursor = node.walk();
                let wildcard = node
                    .named_children(&mut cursor)
                    .any(|child| child.kind() == "wildcard_import");
                if wildcard {
                    extend_callables(&mut names, &module);
                }

                let mut cursor = node.walk();
                for name_node in node.children_by_field_name("name", &mut cursor) {
                    let (imported, alias) = split_alias(name_node, source);
                    extend_callables(&mut names, &format!("{module}.{imported}"));
                    names.extend(alias);
                    names.insert(imported);
                }
            }
            _ => {
                let mut cursor = node.walk();
                stack.extend(node.named_children(&mut cursor));
            }
        }
    }

    names
}

fn extend_callables(names: &mut HashSet<String>, module: &str) {
    names.extend(python_module_callables(module).iter().map(|c| c.to_string()));
}

fn node_text(node: Node<'_>, source: &str) -> String {
    node.utf8_text(source.as_bytes()).unwrap_or("").to_string()
}

/// `(name, alias)` of a possibly aliased import name
fn split_alias(node: Node<'_>, source: &str) -> (String, Option<String>) {
    if node.kind() != "aliased_import" {
        return (node_text(node, source), None);
    }
    let name = node
        .child_by_field_name("name")
        .map(|n| node_text(n, source))
        .unwrap_or_default();
    let alias = node
        .child_by_field_name("alias")
        .map(|n| node_text(n, source));
    (name, alias)
}
