use ckg_graph::{
    build_knowledge_graph, build_with_structure, CkgConfig, CkgRetriever, GraphError,
    RelationshipKind, Symbol,
};
use ckg_scanner::SymbolScanner;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

const BASE: &str = "\
class Shape:
    SIDES = 0
    NAME = \"shape\"

    def area(self):
        return 0

    def describe(self):
        return render(self)
";

const SQUARE: &str = "\
from pkg.base import Shape
from pkg.util import render

LIMIT = 10


class Square(Shape):
    SIDES = 4

    def __init__(self, size):
        self.size = size

    def area(self):
        return self.size * self.size


def make_square():
    return Square(LIMIT)
";

const UTIL: &str = "\
def render(shape):
    return str(shape.area())


def test_render():
    assert render(None)
";

fn shapes_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "pkg/base.py", BASE);
    write(temp.path(), "pkg/square.py", SQUARE);
    write(temp.path(), "pkg/util.py", UTIL);
    temp
}

fn build(temp: &TempDir) -> CkgRetriever {
    build_knowledge_graph(temp.path(), &CkgConfig::default()).unwrap()
}

fn names(symbols: &[Symbol]) -> Vec<&str> {
    symbols.iter().map(Symbol::full_qualified_name).collect()
}

#[test]
fn call_in_method_resolves_to_unique_function() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "pkg/a.py",
        "class A:\n    def foo(self):\n        return bar()\n",
    );
    write(temp.path(), "pkg/b.py", "def bar():\n    return 1\n");

    let graph = build(&temp);
    let relations = graph.relationships_of("pkg/a.py", "pkg.a.A.foo");

    assert_eq!(names(relations.get(RelationshipKind::Calls)), vec!["pkg.b.bar"]);
    assert_eq!(names(relations.get(RelationshipKind::BelongsTo)), vec!["pkg.a.A"]);
    assert!(relations.get(RelationshipKind::HasMethod).is_empty());
    assert!(relations.get(RelationshipKind::References).is_empty());
}

#[test]
fn class_relationships_cover_members_and_parent() {
    let temp = shapes_project();
    let graph = build(&temp);
    let relations = graph.relationships_of("pkg/square.py", "pkg.square.Square");

    assert_eq!(
        names(relations.get(RelationshipKind::HasMethod)),
        vec!["pkg.square.Square.__init__", "pkg.square.Square.area"]
    );
    assert_eq!(
        names(relations.get(RelationshipKind::HasVariable)),
        vec!["pkg.square.Square.SIDES"]
    );
    assert_eq!(names(relations.get(RelationshipKind::Inherits)), vec!["pkg.base.Shape"]);
    assert_eq!(names(relations.get(RelationshipKind::References)), vec!["pkg.base.Shape"]);
    assert!(relations.get(RelationshipKind::BelongsTo).is_empty());
}

#[test]
fn members_see_their_class_and_siblings() {
    let temp = shapes_project();
    let graph = build(&temp);

    let describe = graph.relationships_of("pkg/base.py", "pkg.base.Shape.describe");
    assert_eq!(names(describe.get(RelationshipKind::BelongsTo)), vec!["pkg.base.Shape"]);
    assert_eq!(
        names(describe.get(RelationshipKind::HasMethod)),
        vec!["pkg.base.Shape.area"]
    );
    assert_eq!(names(describe.get(RelationshipKind::Calls)), vec!["pkg.util.render"]);

    let sides = graph.relationships_of("pkg/base.py", "pkg.base.Shape.SIDES");
    assert_eq!(names(sides.get(RelationshipKind::BelongsTo)), vec!["pkg.base.Shape"]);
    assert_eq!(
        names(sides.get(RelationshipKind::HasVariable)),
        vec!["pkg.base.Shape.NAME"]
    );
}

#[test]
fn ambiguous_names_record_no_edge() {
    let temp = shapes_project();
    let graph = build(&temp);

    // `area` is defined on both Shape and Square
    let render = graph.relationships_of("pkg/util.py", "pkg.util.render");
    assert!(render.get(RelationshipKind::Calls).is_empty());
    assert!(graph.callers_of("pkg.base.Shape.area").is_empty());
}

#[test]
fn instantiation_records_no_edge() {
    let temp = shapes_project();
    let graph = build(&temp);

    // `Square(LIMIT)` is a call with no method named `Square`
    let factory = graph.relationships_of("pkg/square.py", "pkg.square.make_square");
    assert!(factory.get(RelationshipKind::Calls).is_empty());
    assert!(factory.get(RelationshipKind::References).is_empty());
    assert!(graph.referrers_of("pkg.square.Square").is_empty());
}

#[test]
fn class_call_without_same_named_method_records_nothing() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "m.py",
        "class Foo:\n    pass\n\n\ndef make():\n    return Foo()\n",
    );

    let graph = build(&temp);
    let make = graph.relationships_of("m.py", "m.make");
    assert!(make.is_empty());
    assert_eq!(graph.stats().references_edges, 0);
}

#[test]
fn duplicate_definitions_keep_the_last_and_block_resolution() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "m.py",
        "def f():\n    return 1\n\n\ndef f():\n    return 2\n\n\ndef g():\n    return f()\n",
    );

    for _ in 0..2 {
        let graph = build(&temp);
        match graph.symbol("m.f") {
            Some(Symbol::Method(method)) => {
                assert_eq!(method.start_line, 5);
                assert_eq!(method.content, "def f():\n    return 2");
            }
            other => panic!("expected method m.f, got {other:?}"),
        }
        assert_eq!(graph.lookup_method_fuzzy("f").len(), 2);
        assert!(graph.relationships_of("m.py", "m.g").get(RelationshipKind::Calls).is_empty());
        assert!(graph.callers_of("m.f").is_empty());
    }
}

#[test]
fn lexical_fallback_tags_never_become_edges() {
    let temp = TempDir::new().unwrap();
    // Both files only have definitions, so their names are tagged lexically
    write(temp.path(), "a.py", "def helper():\n    return 1\n");
    write(temp.path(), "b.py", "class Holder:\n    value = helper\n");

    let graph = build(&temp);
    let stats = graph.stats();
    assert_eq!(stats.tags, 6);
    assert_eq!(stats.calls_edges, 0);
    assert_eq!(stats.references_edges, 0);
    assert!(graph.callers_of("a.helper").is_empty());
    assert!(graph.relationships_of("b.py", "b.Holder").get(RelationshipKind::Calls).is_empty());
}

#[test]
fn implicit_relative_parent_resolves_within_the_package() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "legacy/__init__.py", "");
    write(temp.path(), "legacy/helpers.py", "class Base:\n    pass\n");
    write(
        temp.path(),
        "legacy/models.py",
        "from helpers import Base\n\n\nclass Model(Base):\n    pass\n",
    );

    let graph = build(&temp);
    let model = graph.relationships_of("legacy/models.py", "legacy.models.Model");
    assert_eq!(names(model.get(RelationshipKind::Inherits)), vec!["legacy.helpers.Base"]);
}

#[test]
fn unknown_symbol_gives_empty_groups() {
    let temp = shapes_project();
    let graph = build(&temp);
    let relations = graph.relationships_of("pkg/base.py", "pkg.base.Missing");

    assert!(relations.is_empty());
    assert_eq!(relations.iter().count(), RelationshipKind::ALL.len());
}

#[test]
fn reverse_edges_list_callers_and_referrers() {
    let temp = shapes_project();
    let graph = build(&temp);

    assert_eq!(
        names(&graph.callers_of("pkg.util.render")),
        vec!["pkg.base.Shape.describe", "pkg.util.test_render"]
    );
    assert_eq!(names(&graph.referrers_of("pkg.base.Shape")), vec!["pkg.square.Square"]);
}

#[test]
fn method_lookups() {
    let temp = shapes_project();
    let graph = build(&temp);

    let exact: Vec<String> = graph
        .lookup_symbol_exact("pkg/square.py", "Square.")
        .iter()
        .map(|m| m.full_qualified_name.clone())
        .collect();
    assert_eq!(exact, vec!["pkg.square.Square.__init__", "pkg.square.Square.area"]);

    let absolute = temp.path().canonicalize().unwrap().join("pkg/square.py");
    assert_eq!(
        graph
            .lookup_symbol_exact(&absolute.to_string_lossy(), "Square.")
            .len(),
        2
    );
    assert!(graph.lookup_symbol_exact("pkg/missing.py", "Square").is_empty());

    let fuzzy: Vec<String> = graph
        .lookup_method_fuzzy("are")
        .iter()
        .map(|m| m.full_qualified_name.clone())
        .collect();
    assert_eq!(
        fuzzy,
        vec![
            "pkg.base.Shape.area",
            "pkg.square.Square.area",
            "pkg.square.make_square"
        ]
    );

    assert_eq!(graph.methods_in_file("pkg/square.py").len(), 3);
    let file = graph.file_symbols("pkg/base.py");
    assert_eq!(file.classes.len(), 1);
    assert_eq!(file.methods.len(), 2);
}

#[test]
fn constructors_and_fields() {
    let temp = shapes_project();
    let graph = build(&temp);

    let constructors = graph.constructor_of("Square");
    assert_eq!(constructors.len(), 1);
    assert_eq!(constructors[0].full_qualified_name, "pkg.square.Square.__init__");
    assert!(graph.constructor_of("Shape").is_empty());
    assert!(graph.constructor_of("Nothing").is_empty());

    let fields: Vec<String> = graph
        .class_fields("Shape")
        .into_iter()
        .map(|v| v.full_qualified_name)
        .collect();
    assert_eq!(fields, vec!["pkg.base.Shape.SIDES", "pkg.base.Shape.NAME"]);
}

#[test]
fn variable_queries() {
    let temp = shapes_project();
    let graph = build(&temp);

    let exact: Vec<(String, usize)> = graph
        .variables_named("SIDES")
        .iter()
        .map(|v| (v.full_qualified_name.clone(), v.start_line))
        .collect();
    assert_eq!(
        exact,
        vec![
            ("pkg.base.Shape.SIDES".to_string(), 2),
            ("pkg.square.Square.SIDES".to_string(), 8)
        ]
    );

    let fragment = graph.variables_named("Square.SIDES");
    assert_eq!(fragment.len(), 1);
    assert_eq!(fragment[0].data_type, "int");

    assert!(graph.variables_named("SIDE").is_empty());
    assert_eq!(graph.variables_in_file("pkg/square.py", "LIMIT").len(), 1);
    assert!(graph.variables_in_file("pkg/base.py", "LIMIT").is_empty());
}

#[test]
fn keyword_search_is_case_insensitive() {
    let temp = shapes_project();
    let graph = build(&temp);

    let files: Vec<String> = graph
        .files_containing("RENDER")
        .into_iter()
        .map(|path| {
            Path::new(&path)
                .file_name()
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    assert_eq!(files, vec!["base.py", "util.py"]);
    assert!(graph.files_containing("nowhere-to-be-found").is_empty());
}

#[test]
fn tests_are_found_by_naming_convention() {
    let temp = shapes_project();
    let graph = build(&temp);

    let tests: Vec<String> = graph
        .test_cases_for("pkg.util.render")
        .iter()
        .map(|m| m.full_qualified_name.clone())
        .collect();
    assert_eq!(tests, vec!["pkg.util.test_render"]);
    assert!(graph.test_cases_for("pkg.base.Shape.describe").is_empty());
}

#[test]
fn file_text_queries() {
    let temp = shapes_project();
    let graph = build(&temp);

    let head = graph.file_lines("pkg/square.py", 0, 2).unwrap();
    assert_eq!(head.start_line, 1);
    assert_eq!(head.end_line, 2);
    assert_eq!(head.total_lines, 18);
    assert_eq!(
        head.numbered(),
        "   1: from pkg.base import Shape\n   2: from pkg.util import render\n"
    );

    let tail = graph.file_lines("pkg/square.py", 17, 400).unwrap();
    assert_eq!(tail.end_line, 18);
    assert_eq!(tail.lines, vec!["def make_square():", "    return Square(LIMIT)"]);

    assert!(graph.file_lines("pkg/square.py", 19, 30).is_none());
    assert!(graph.file_lines("pkg/missing.py", 1, 3).is_none());

    assert_eq!(
        graph.file_imports("pkg/square.py"),
        vec!["from pkg.base import Shape", "from pkg.util import render"]
    );
    assert!(graph.file_imports("pkg/util.py").is_empty());
}

#[test]
fn excerpts_are_bounded() {
    let temp = TempDir::new().unwrap();
    let body: String = (0..120).map(|i| format!("V{i} = {i}\n")).collect();
    write(temp.path(), "big.py", &body);

    let graph = build(&temp);
    let excerpt = graph.file_lines("big.py", 10, 500).unwrap();
    assert_eq!(excerpt.start_line, 10);
    assert_eq!(excerpt.end_line, 59);
    assert_eq!(excerpt.lines.len(), 50);
}

#[test]
fn stats_count_the_index() {
    let temp = shapes_project();
    let graph = build(&temp);
    let stats = graph.stats();

    assert_eq!(stats.files, 3);
    assert_eq!(stats.classes, 2);
    assert_eq!(stats.methods, 7);
    assert_eq!(stats.variables, 4);
    assert_eq!(stats.calls_edges, 2);
    assert_eq!(stats.references_edges, 1);
    assert!(stats.tags > 0);
}

#[test]
fn broken_file_leaves_the_graph_usable() {
    let temp = shapes_project();
    write(temp.path(), "pkg/broken.py", "def broken(:\n    pass\n");

    let graph = build(&temp);
    assert_eq!(graph.stats().files, 4);
    assert!(graph.file_symbols("pkg/broken.py").methods.is_empty());
    assert_eq!(
        names(&graph.callers_of("pkg.util.render")),
        vec!["pkg.base.Shape.describe", "pkg.util.test_render"]
    );
}

#[test]
fn missing_root_fails_the_build() {
    let temp = TempDir::new().unwrap();
    let result = build_knowledge_graph(temp.path().join("absent"), &CkgConfig::default());
    assert!(matches!(result, Err(GraphError::InvalidRoot { .. })));
}

#[test]
fn reused_structure_gives_the_same_graph() {
    let temp = shapes_project();
    let config = CkgConfig::default();
    let scan = SymbolScanner::new(config.scanner.clone())
        .unwrap()
        .scan(temp.path())
        .unwrap();

    let reused = build_with_structure(temp.path(), scan.tree, &config).unwrap();
    let fresh = build(&temp);

    assert_eq!(reused.stats(), fresh.stats());
    assert_eq!(
        names(&reused.callers_of("pkg.util.render")),
        names(&fresh.callers_of("pkg.util.render"))
    );
}

#[test]
fn repeated_builds_are_identical() {
    let temp = shapes_project();
    let first = build(&temp);
    let second = build(&temp);

    assert_eq!(
        serde_json::to_string(first.tree()).unwrap(),
        serde_json::to_string(second.tree()).unwrap()
    );
    for fqn in ["pkg.square.Square", "pkg.base.Shape.describe", "pkg.util.test_render"] {
        assert_eq!(
            serde_json::to_string(&first.relationships_of("pkg/base.py", fqn)).unwrap(),
            serde_json::to_string(&second.relationships_of("pkg/base.py", fqn)).unwrap()
        );
    }
}
