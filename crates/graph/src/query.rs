use crate::indexer::CkgRetriever;
use crate::types::{
    FileExcerpt, FileSymbols, GraphStats, RelationshipKind, Relationships, Symbol,
};
use ckg_scanner::{ClassRecord, MethodRecord, VariableRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use std::sync::Arc;

/// Longest slice `file_lines` returns
const MAX_EXCERPT_LINES: usize = 50;

static IMPORT_LINE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^\s*(?:import|from)\s+").ok());

impl CkgRetriever {
    /// Absolute form of a query path; relative paths are taken from the root
    pub fn resolve_path(&self, path: &str) -> String {
        if Path::new(path).is_absolute() {
            path.to_string()
        } else {
            self.root.join(path).to_string_lossy().into_owned()
        }
    }

    /// Methods of `path` whose qualified name contains `fqn_fragment`
    pub fn lookup_symbol_exact(&self, path: &str, fqn_fragment: &str) -> Vec<Arc<MethodRecord>> {
        self.methods_by_file
            .get(&self.resolve_path(path))
            .map(|methods| {
                methods
                    .iter()
                    .filter(|method| method.full_qualified_name.contains(fqn_fragment))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Methods project-wide whose simple name contains `name`
    pub fn lookup_method_fuzzy(&self, name: &str) -> Vec<Arc<MethodRecord>> {
        let found: Vec<Arc<MethodRecord>> = self
            .methods_by_name
            .iter()
            .filter(|(method_name, _)| method_name.contains(name))
            .flat_map(|(_, methods)| methods.iter().cloned())
            .collect();
        if found.is_empty() {
            log::debug!("No methods with {name:?} in their name");
        }
        found
    }

    /// All six relationship groups of the symbol named `fqn`.
    ///
    /// The qualified name selects the symbol; `path` is only checked for
    /// consistency. Unknown symbols give an all-empty map.
    pub fn relationships_of(&self, path: &str, fqn: &str) -> Relationships {
        let mut out = Relationships::default();
        let Some(target) = self.symbol(fqn) else {
            return out;
        };

        let path = self.resolve_path(path);
        if target.absolute_path() != path {
            log::debug!("{fqn} lives in {}, not {path}", target.absolute_path());
        }

        let owner = target.class_name().and_then(|class| self.classes.get(class));
        match &target {
            Symbol::Class(class) => {
                out.extend(
                    RelationshipKind::HasMethod,
                    class.methods.iter().map(|m| Symbol::Method(Arc::new(m.clone()))),
                );
                out.extend(
                    RelationshipKind::HasVariable,
                    class.constants.iter().map(|v| Symbol::Variable(Arc::new(v.clone()))),
                );
                if let Some(parent) = self.parent_of(class) {
                    out.push(RelationshipKind::Inherits, Symbol::Class(parent));
                }
            }
            Symbol::Method(_) => {
                if let Some(owner) = owner {
                    out.push(RelationshipKind::BelongsTo, Symbol::Class(Arc::clone(owner)));
                    out.extend(
                        RelationshipKind::HasMethod,
                        owner
                            .methods
                            .iter()
                            .filter(|m| m.full_qualified_name != fqn)
                            .map(|m| Symbol::Method(Arc::new(m.clone()))),
                    );
                }
            }
            Symbol::Variable(_) => {
                if let Some(owner) = owner {
                    out.push(RelationshipKind::BelongsTo, Symbol::Class(Arc::clone(owner)));
                    out.extend(
                        RelationshipKind::HasVariable,
                        owner
                            .constants
                            .iter()
                            .filter(|v| v.full_qualified_name != fqn)
                            .map(|v| Symbol::Variable(Arc::new(v.clone()))),
                    );
                }
            }
        }

        if let Some(calls) = self.calls_index.get(fqn) {
            out.extend(RelationshipKind::Calls, calls.iter().cloned());
        }
        if let Some(references) = self.references_index.get(fqn) {
            out.extend(RelationshipKind::References, references.iter().cloned());
        }
        out
    }

    /// Classes and methods recorded for one file
    pub fn file_symbols(&self, path: &str) -> FileSymbols {
        let path = self.resolve_path(path);
        FileSymbols {
            classes: self.classes_by_file.get(&path).cloned().unwrap_or_default(),
            methods: self.methods_by_file.get(&path).cloned().unwrap_or_default(),
        }
    }

    /// Every method recorded for one file, class methods included
    pub fn methods_in_file(&self, path: &str) -> Vec<Arc<MethodRecord>> {
        self.methods_by_file
            .get(&self.resolve_path(path))
            .cloned()
            .unwrap_or_default()
    }

    /// Constructors of every class with this simple name
    pub fn constructor_of(&self, class_name: &str) -> Vec<MethodRecord> {
        self.classes_by_name
            .get(class_name)
            .into_iter()
            .flatten()
            .flat_map(|class| class.methods.iter().filter(|m| m.is_constructor()).cloned())
            .collect()
    }

    /// Exact name match without a dot, qualified-name fragment match with one
    pub fn variables_named(&self, query: &str) -> Vec<Arc<VariableRecord>> {
        let mut found: Vec<Arc<VariableRecord>> = if query.contains('.') {
            self.variables
                .values()
                .filter(|v| v.full_qualified_name.contains(query))
                .cloned()
                .collect()
        } else {
            self.variables_by_name.get(query).cloned().unwrap_or_default()
        };
        found.sort_by(|a, b| {
            (&a.absolute_path, a.start_line, &a.full_qualified_name).cmp(&(
                &b.absolute_path,
                b.start_line,
                &b.full_qualified_name,
            ))
        });
        found
    }

    /// `variables_named` restricted to one file, in source order
    pub fn variables_in_file(&self, path: &str, query: &str) -> Vec<Arc<VariableRecord>> {
        let Some(candidates) = self.variables_by_file.get(&self.resolve_path(path)) else {
            return Vec::new();
        };
        candidates
            .iter()
            .filter(|v| {
                if query.contains('.') {
                    v.full_qualified_name.contains(query)
                } else {
                    v.name == query
                }
            })
            .cloned()
            .collect()
    }

    /// Class-level variables of every class with this simple name
    pub fn class_fields(&self, class_name: &str) -> Vec<VariableRecord> {
        self.classes_by_name
            .get(class_name)
            .into_iter()
            .flatten()
            .flat_map(|class| class.constants.iter().cloned())
            .collect()
    }

    /// Paths whose classes, module functions or module variables mention
    /// `keyword`, ignoring case
    pub fn files_containing(&self, keyword: &str) -> Vec<String> {
        let needle = keyword.to_lowercase();
        let hit = |content: &str| content.to_lowercase().contains(&needle);

        let classes = self
            .classes
            .values()
            .filter(|c| hit(&c.content))
            .map(|c| &c.absolute_path);
        let functions = self
            .methods
            .values()
            .filter(|m| m.class_name.is_none() && hit(&m.content))
            .map(|m| &m.absolute_path);
        let variables = self
            .variables
            .values()
            .filter(|v| v.class_name.is_none() && hit(&v.content))
            .map(|v| &v.absolute_path);

        let mut paths: Vec<String> = classes.chain(functions).chain(variables).cloned().collect();
        paths.sort();
        paths.dedup();
        paths
    }

    /// Methods named after `fqn`'s last segment by test naming convention
    pub fn test_cases_for(&self, fqn: &str) -> Vec<Arc<MethodRecord>> {
        let name = fqn.rsplit('.').next().unwrap_or(fqn);
        if name.is_empty() {
            return Vec::new();
        }
        let patterns = [format!("test_{name}"), format!("test{}", capitalize(name))];

        let mut found: Vec<Arc<MethodRecord>> = self
            .methods
            .values()
            .filter(|m| patterns.iter().any(|pattern| m.name.contains(pattern.as_str())))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            (&a.absolute_path, a.start_line, &a.full_qualified_name).cmp(&(
                &b.absolute_path,
                b.start_line,
                &b.full_qualified_name,
            ))
        });
        found
    }

    /// Containers with a CALLS edge into `fqn`
    pub fn callers_of(&self, fqn: &str) -> Vec<Symbol> {
        self.reverse(fqn, RelationshipKind::Calls)
    }

    /// Containers with a REFERENCES edge into `fqn`
    pub fn referrers_of(&self, fqn: &str) -> Vec<Symbol> {
        self.reverse(fqn, RelationshipKind::References)
    }

    fn reverse(&self, fqn: &str, kind: RelationshipKind) -> Vec<Symbol> {
        self.relations
            .sources(fqn, kind)
            .into_iter()
            .filter_map(|source| self.symbol(source))
            .collect()
    }

    /// Lines `start..=end` of an indexed file, 1-indexed.
    ///
    /// `start` is raised to 1, `end` is clamped to the file and to a
    /// bounded window. `None` when the file is unknown, empty or `start`
    /// lies past its end.
    pub fn file_lines(&self, path: &str, start: usize, end: usize) -> Option<FileExcerpt> {
        let path = self.resolve_path(path);
        let text = self.file_text(&path)?;

        let total = text.len();
        let start = start.max(1);
        if total == 0 || start > total {
            return None;
        }
        let end = end.max(start).min(start + MAX_EXCERPT_LINES - 1).min(total);

        Some(FileExcerpt {
            path,
            total_lines: total,
            start_line: start,
            end_line: end,
            lines: text[start - 1..end].to_vec(),
        })
    }

    /// Import statements of an indexed file, one per line, trimmed
    pub fn file_imports(&self, path: &str) -> Vec<String> {
        let Some(text) = self.file_text(&self.resolve_path(path)) else {
            return Vec::new();
        };
        let Some(pattern) = IMPORT_LINE.as_ref() else {
            return Vec::new();
        };
        text.iter()
            .filter(|line| pattern.is_match(line))
            .map(|line| line.trim().to_string())
            .collect()
    }

    /// Absolute paths of every indexed file, sorted
    pub fn indexed_files(&self) -> Vec<&str> {
        self.files.keys().map(String::as_str).collect()
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            files: self.files.len(),
            classes: self.classes.len(),
            methods: self.methods.len(),
            variables: self.variables.len(),
            tags: self.tag_count,
            calls_edges: self.calls_index.values().map(Vec::len).sum(),
            references_edges: self.references_index.values().map(Vec::len).sum(),
        }
    }

    /// Symbol by qualified name: methods first, then classes, then variables
    pub fn symbol(&self, fqn: &str) -> Option<Symbol> {
        if let Some(method) = self.methods.get(fqn) {
            return Some(Symbol::Method(Arc::clone(method)));
        }
        if let Some(class) = self.classes.get(fqn) {
            return Some(Symbol::Class(Arc::clone(class)));
        }
        self.variables
            .get(fqn)
            .map(|variable| Symbol::Variable(Arc::clone(variable)))
    }

    /// Indexed parent class. A parent recorded as `X.Y` from `from X import Y`
    /// that is not indexed is retried under the enclosing packages of the
    /// subclass, innermost first, which covers implicit relative imports.
    fn parent_of(&self, class: &ClassRecord) -> Option<Arc<ClassRecord>> {
        let parent = class.parent_class.as_deref()?;
        if let Some(found) = self.classes.get(parent) {
            return Some(Arc::clone(found));
        }

        let mut scope = class.full_qualified_name.as_str();
        while let Some((outer, _)) = scope.rsplit_once('.') {
            if let Some(found) = self.classes.get(&format!("{outer}.{parent}")) {
                log::debug!(
                    "{} inherits {} through {outer}",
                    class.full_qualified_name,
                    found.full_qualified_name
                );
                return Some(Arc::clone(found));
            }
            scope = outer;
        }
        None
    }

    fn file_text(&self, absolute: &str) -> Option<&[String]> {
        let relative = self.files.get(absolute)?;
        self.tree.get(relative).map(|record| record.text.as_slice())
    }
}

/// First character upper-cased, the rest lower-cased
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn capitalize_lowers_the_tail() {
        assert_eq!(capitalize("parseURL"), "Parseurl");
        assert_eq!(capitalize("run"), "Run");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn import_pattern_matches_both_forms() {
        let pattern = IMPORT_LINE.as_ref().unwrap();
        assert!(pattern.is_match("import os"));
        assert!(pattern.is_match("    from . import b"));
        assert!(!pattern.is_match("important = 1"));
        assert!(!pattern.is_match("# import os"));
    }
}
