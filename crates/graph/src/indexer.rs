use crate::graph::RelationGraph;
use crate::resolver::RelationshipResolver;
use crate::types::{ContainerInterval, ContainerLabel, RelationshipKind, Symbol};
use ckg_scanner::{ClassRecord, FileRecord, MethodRecord, StructureTree, VariableRecord};
use ckg_tags::Tag;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

type ByKey<T> = HashMap<String, Arc<T>>;
type ByName<T> = BTreeMap<String, Vec<Arc<T>>>;
type ByFile<T> = HashMap<String, Vec<Arc<T>>>;

/// Read-only knowledge graph over one scanned project.
///
/// Built once from a structural tree and a tag stream; every query in
/// `query.rs` reads the indices below and never mutates them.
#[derive(Debug)]
pub struct CkgRetriever {
    pub(crate) root: PathBuf,
    pub(crate) tree: StructureTree,
    pub(crate) tag_count: usize,

    // Flat maps by qualified name, last write wins
    pub(crate) classes: ByKey<ClassRecord>,
    pub(crate) methods: ByKey<MethodRecord>,
    pub(crate) variables: ByKey<VariableRecord>,

    pub(crate) classes_by_name: ByName<ClassRecord>,
    pub(crate) methods_by_name: ByName<MethodRecord>,
    pub(crate) variables_by_name: ByName<VariableRecord>,

    pub(crate) classes_by_file: ByFile<ClassRecord>,
    pub(crate) methods_by_file: ByFile<MethodRecord>,
    pub(crate) variables_by_file: ByFile<VariableRecord>,

    /// Absolute path -> project-relative path of every indexed file
    pub(crate) files: BTreeMap<String, String>,

    pub(crate) intervals: HashMap<String, Vec<ContainerInterval>>,

    pub(crate) calls_index: HashMap<String, Vec<Symbol>>,
    pub(crate) references_index: HashMap<String, Vec<Symbol>>,
    pub(crate) relations: RelationGraph,
}

impl CkgRetriever {
    /// Index `tree` and resolve the reference tags against it
    pub fn new(root: impl AsRef<Path>, tree: StructureTree, tags: impl IntoIterator<Item = Tag>) -> Self {
        let start = Instant::now();
        let mut retriever = Self {
            root: root.as_ref().to_path_buf(),
            tree,
            tag_count: 0,
            classes: HashMap::new(),
            methods: HashMap::new(),
            variables: HashMap::new(),
            classes_by_name: BTreeMap::new(),
            methods_by_name: BTreeMap::new(),
            variables_by_name: BTreeMap::new(),
            classes_by_file: HashMap::new(),
            methods_by_file: HashMap::new(),
            variables_by_file: HashMap::new(),
            files: BTreeMap::new(),
            intervals: HashMap::new(),
            calls_index: HashMap::new(),
            references_index: HashMap::new(),
            relations: RelationGraph::new(),
        };

        retriever.index_structure();
        retriever.index_tags(tags);

        log::info!(
            "Indexed {} classes, {} methods, {} variables from {} files in {:.2?}",
            retriever.classes.len(),
            retriever.methods.len(),
            retriever.variables.len(),
            retriever.files.len(),
            start.elapsed()
        );
        retriever
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tree(&self) -> &StructureTree {
        &self.tree
    }

    /// Pass one: symbol maps and container intervals
    fn index_structure(&mut self) {
        let tree = std::mem::replace(&mut self.tree, StructureTree::new(""));

        for (relative, record) in tree.files() {
            let absolute = self.root.join(&relative).to_string_lossy().into_owned();
            self.files.insert(absolute, relative);
            self.add_file(record);
        }

        self.tree = tree;

        for intervals in self.intervals.values_mut() {
            intervals.sort_by_key(|interval| interval.start_line);
        }
    }

    fn add_file(&mut self, record: &FileRecord) {
        for class in &record.classes {
            self.add_class(Arc::new(class.clone()));
        }
        for function in &record.functions {
            self.add_method(Arc::new(function.clone()));
        }
        for variable in &record.variables {
            self.add_variable(Arc::new(variable.clone()));
        }
    }

    fn add_class(&mut self, class: Arc<ClassRecord>) {
        for method in &class.methods {
            self.add_method(Arc::new(method.clone()));
        }
        for constant in &class.constants {
            self.add_variable(Arc::new(constant.clone()));
        }

        self.push_interval(
            &class.absolute_path,
            ContainerInterval {
                start_line: class.start_line,
                end_line: class.end_line,
                fqn: class.full_qualified_name.clone(),
                label: ContainerLabel::Class,
                name: class.name.clone(),
            },
        );
        self.classes
            .insert(class.full_qualified_name.clone(), Arc::clone(&class));
        self.classes_by_name
            .entry(class.name.clone())
            .or_default()
            .push(Arc::clone(&class));
        self.classes_by_file
            .entry(class.absolute_path.clone())
            .or_default()
            .push(class);
    }

    fn add_method(&mut self, method: Arc<MethodRecord>) {
        self.push_interval(
            &method.absolute_path,
            ContainerInterval {
                start_line: method.start_line,
                end_line: method.end_line,
                fqn: method.full_qualified_name.clone(),
                label: ContainerLabel::Method,
                name: method.name.clone(),
            },
        );
        self.methods
            .insert(method.full_qualified_name.clone(), Arc::clone(&method));
        self.methods_by_name
            .entry(method.name.clone())
            .or_default()
            .push(Arc::clone(&method));
        self.methods_by_file
            .entry(method.absolute_path.clone())
            .or_default()
            .push(method);
    }

    fn add_variable(&mut self, variable: Arc<VariableRecord>) {
        self.variables
            .insert(variable.full_qualified_name.clone(), Arc::clone(&variable));
        self.variables_by_name
            .entry(variable.name.clone())
            .or_default()
            .push(Arc::clone(&variable));
        self.variables_by_file
            .entry(variable.absolute_path.clone())
            .or_default()
            .push(variable);
    }

    fn push_interval(&mut self, path: &str, interval: ContainerInterval) {
        self.intervals
            .entry(path.to_string())
            .or_default()
            .push(interval);
    }

    /// Pass two: CALLS / REFERENCES edges from reference tags
    fn index_tags(&mut self, tags: impl IntoIterator<Item = Tag>) {
        let resolver =
            RelationshipResolver::new(&self.intervals, &self.methods_by_name, &self.classes_by_name);

        let mut calls: HashMap<String, Vec<Symbol>> = HashMap::new();
        let mut references: HashMap<String, Vec<Symbol>> = HashMap::new();
        let mut relations = RelationGraph::new();
        let mut tag_count = 0;
        let mut unresolved = 0;

        for tag in tags {
            tag_count += 1;
            if !tag.is_reference() {
                continue;
            }
            let Some(edge) = resolver.resolve(&tag) else {
                unresolved += 1;
                continue;
            };

            relations.add_edge(&edge.source_fqn, edge.target.full_qualified_name(), edge.kind);
            let index = match edge.kind {
                RelationshipKind::Calls => &mut calls,
                _ => &mut references,
            };
            let targets = index.entry(edge.source_fqn).or_default();
            if !targets
                .iter()
                .any(|known| known.full_qualified_name() == edge.target.full_qualified_name())
            {
                targets.push(edge.target);
            }
        }

        log::debug!("{unresolved} reference tags left without an edge");
        log::info!(
            "Resolved {} callers and {} referrers from {tag_count} tags",
            calls.len(),
            references.len()
        );

        self.calls_index = calls;
        self.references_index = references;
        self.relations = relations;
        self.tag_count = tag_count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ckg_scanner::{ClassType, MethodType};
    use ckg_tags::{TagCategory, TagKind, TagLine};
    use pretty_assertions::assert_eq;

    fn method(module: &str, class: Option<&str>, name: &str, lines: (usize, usize)) -> MethodRecord {
        let fqn = match class {
            Some(class) => format!("{module}.{class}.{name}"),
            None => format!("{module}.{name}"),
        };
        MethodRecord {
            name: name.to_string(),
            full_qualified_name: fqn,
            absolute_path: format!("/proj/{module}.py"),
            start_line: lines.0,
            end_line: lines.1,
            content: format!("def {name}():"),
            params: Vec::new(),
            modifiers: vec!["public".to_string()],
            signature: format!("def {name}()"),
            class_name: class.map(|class| format!("{module}.{class}")),
            method_type: MethodType::Normal,
            is_class_method: class.is_some(),
        }
    }

    fn project() -> StructureTree {
        let mut tree = StructureTree::new("proj");
        tree.insert(
            "a.py",
            FileRecord {
                classes: vec![ClassRecord {
                    name: "A".to_string(),
                    full_qualified_name: "a.A".to_string(),
                    absolute_path: "/proj/a.py".to_string(),
                    start_line: 1,
                    end_line: 3,
                    content: "class A:\n    def foo(self):\n        return bar()".to_string(),
                    class_type: ClassType::Normal,
                    parent_class: None,
                    methods: vec![method("a", Some("A"), "foo", (2, 3))],
                    constants: Vec::new(),
                }],
                ..Default::default()
            },
        );
        tree.insert(
            "b.py",
            FileRecord {
                functions: vec![method("b", None, "bar", (1, 2))],
                ..Default::default()
            },
        );
        tree
    }

    fn reference(path: &str, line: usize, name: &str) -> Tag {
        Tag {
            rel_fname: path.trim_start_matches("/proj/").to_string(),
            fname: path.to_string(),
            line: TagLine::Line(line),
            name: name.to_string(),
            kind: TagKind::Ref,
            category: TagCategory::Function,
            info: String::new(),
        }
    }

    #[test]
    fn first_pass_fills_every_index() {
        let retriever = CkgRetriever::new("/proj", project(), Vec::new());
        assert!(retriever.methods.contains_key("a.A.foo"));
        assert!(retriever.methods.contains_key("b.bar"));
        assert_eq!(retriever.methods_by_file["/proj/a.py"].len(), 1);
        assert_eq!(retriever.classes_by_name["A"].len(), 1);

        let spans: Vec<(usize, ContainerLabel)> = retriever.intervals["/proj/a.py"]
            .iter()
            .map(|interval| (interval.start_line, interval.label))
            .collect();
        assert_eq!(spans, vec![(1, ContainerLabel::Class), (2, ContainerLabel::Method)]);
        assert_eq!(
            retriever.files.values().cloned().collect::<Vec<_>>(),
            vec!["a.py".to_string(), "b.py".to_string()]
        );
    }

    #[test]
    fn repeated_calls_record_one_edge() {
        let tags = vec![
            reference("/proj/a.py", 3, "bar"),
            reference("/proj/a.py", 3, "bar"),
            reference("/proj/a.py", 9, "bar"),
        ];
        let retriever = CkgRetriever::new("/proj", project(), tags);

        let callees: Vec<&str> = retriever.calls_index["a.A.foo"]
            .iter()
            .map(Symbol::full_qualified_name)
            .collect();
        assert_eq!(callees, vec!["b.bar"]);
        assert_eq!(retriever.tag_count, 3);
        assert_eq!(retriever.relations.edge_count(RelationshipKind::Calls), 2);
    }

    #[test]
    fn lineless_references_are_counted_but_not_resolved() {
        let mut fallback = reference("/proj/a.py", 3, "bar");
        fallback.line = TagLine::Unknown;
        let retriever = CkgRetriever::new("/proj", project(), vec![fallback]);

        assert_eq!(retriever.tag_count, 1);
        assert!(retriever.calls_index.is_empty());
        assert_eq!(retriever.relations.edge_count(RelationshipKind::Calls), 0);
    }

    #[test]
    fn class_named_call_is_not_an_edge() {
        let retriever = CkgRetriever::new("/proj", project(), vec![reference("/proj/b.py", 2, "A")]);
        assert!(retriever.calls_index.is_empty());
        assert!(retriever.references_index.is_empty());
    }

    #[test]
    fn retriever_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CkgRetriever>();
    }
}
