use crate::types::{ContainerInterval, ContainerLabel, RelationshipKind, Symbol};
use ckg_scanner::{ClassRecord, MethodRecord};
use ckg_tags::{Tag, TagCategory};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Positions inspected on each side of the binary-search hit
const NEIGHBORHOOD: usize = 5;

/// Innermost container of `line` among intervals sorted by start line.
///
/// Methods win over classes; among equals the tightest span wins.
pub fn find_container(intervals: &[ContainerInterval], line: usize) -> Option<&ContainerInterval> {
    if intervals.is_empty() {
        return None;
    }

    // Rightmost interval starting at or before `line`
    let upper = intervals.partition_point(|interval| interval.start_line <= line);
    let lo = upper.saturating_sub(1).saturating_sub(NEIGHBORHOOD);
    let hi = (upper + NEIGHBORHOOD).min(intervals.len());

    intervals[lo..hi]
        .iter()
        .filter(|interval| interval.contains(line))
        .min_by_key(|interval| (interval.label != ContainerLabel::Method, interval.span()))
}

/// An edge reconstructed from one reference tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEdge {
    pub source_fqn: String,
    pub source_label: ContainerLabel,
    pub kind: RelationshipKind,
    pub target: Symbol,
}

/// Turns reference tags into CALLS / REFERENCES edges using the indices of
/// the first build pass.
pub struct RelationshipResolver<'a> {
    intervals: &'a HashMap<String, Vec<ContainerInterval>>,
    methods_by_name: &'a BTreeMap<String, Vec<Arc<MethodRecord>>>,
    classes_by_name: &'a BTreeMap<String, Vec<Arc<ClassRecord>>>,
}

impl<'a> RelationshipResolver<'a> {
    pub fn new(
        intervals: &'a HashMap<String, Vec<ContainerInterval>>,
        methods_by_name: &'a BTreeMap<String, Vec<Arc<MethodRecord>>>,
        classes_by_name: &'a BTreeMap<String, Vec<Arc<ClassRecord>>>,
    ) -> Self {
        Self {
            intervals,
            methods_by_name,
            classes_by_name,
        }
    }

    /// Enclosing container of a file position
    pub fn container(&self, path: &str, line: usize) -> Option<&'a ContainerInterval> {
        find_container(self.intervals.get(path)?, line)
    }

    /// Edge for a reference tag, if its target is unambiguous
    pub fn resolve(&self, tag: &Tag) -> Option<ResolvedEdge> {
        if !tag.is_reference() {
            return None;
        }
        let line = tag.line.first()?;
        let path = if tag.fname.is_empty() {
            &tag.rel_fname
        } else {
            &tag.fname
        };
        let container = self.container(path, line)?;

        let (kind, target) = match tag.category {
            TagCategory::Function => {
                let method = unique(self.methods_by_name, &tag.name)?;
                (RelationshipKind::Calls, Symbol::Method(method))
            }
            TagCategory::Class => {
                let class = unique(self.classes_by_name, &tag.name)?;
                (RelationshipKind::References, Symbol::Class(class))
            }
        };

        Some(ResolvedEdge {
            source_fqn: container.fqn.clone(),
            source_label: container.label,
            kind,
            target,
        })
    }
}

fn unique<T>(index: &BTreeMap<String, Vec<Arc<T>>>, name: &str) -> Option<Arc<T>> {
    match index.get(name).map(Vec::as_slice) {
        Some([only]) => Some(Arc::clone(only)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn interval(start: usize, end: usize, fqn: &str, label: ContainerLabel) -> ContainerInterval {
        ContainerInterval {
            start_line: start,
            end_line: end,
            fqn: fqn.to_string(),
            label,
            name: fqn.rsplit('.').next().unwrap_or(fqn).to_string(),
        }
    }

    fn class_with_method() -> Vec<ContainerInterval> {
        vec![
            interval(10, 40, "m.C", ContainerLabel::Class),
            interval(15, 20, "m.C.M", ContainerLabel::Method),
        ]
    }

    #[test]
    fn method_wins_inside_its_span() {
        let intervals = class_with_method();
        assert_eq!(find_container(&intervals, 17).map(|c| c.fqn.as_str()), Some("m.C.M"));
    }

    #[test]
    fn class_contains_lines_outside_methods() {
        let intervals = class_with_method();
        assert_eq!(find_container(&intervals, 25).map(|c| c.fqn.as_str()), Some("m.C"));
        assert_eq!(find_container(&intervals, 10).map(|c| c.fqn.as_str()), Some("m.C"));
    }

    #[test]
    fn lines_outside_all_intervals_have_no_container() {
        let intervals = class_with_method();
        assert_eq!(find_container(&intervals, 5), None);
        assert_eq!(find_container(&intervals, 41), None);
        assert_eq!(find_container(&[], 1), None);
    }

    #[test]
    fn tightest_method_wins_for_nested_functions() {
        let intervals = vec![
            interval(1, 30, "m.outer", ContainerLabel::Method),
            interval(5, 10, "m.outer.inner", ContainerLabel::Method),
        ];
        assert_eq!(
            find_container(&intervals, 7).map(|c| c.fqn.as_str()),
            Some("m.outer.inner")
        );
        assert_eq!(find_container(&intervals, 20).map(|c| c.fqn.as_str()), Some("m.outer"));
    }

    #[test]
    fn containers_beyond_the_neighborhood_are_not_seen() {
        // A long class followed by many short methods that end before the line
        let mut intervals = vec![interval(1, 100, "m.Big", ContainerLabel::Class)];
        for idx in 0..10 {
            let start = 2 + idx * 2;
            intervals.push(interval(start, start, &format!("m.Big.f{idx}"), ContainerLabel::Method));
        }
        assert_eq!(find_container(&intervals, 50), None);
        assert_eq!(find_container(&intervals, 19), None);
        assert_eq!(find_container(&intervals, 3).map(|c| c.fqn.as_str()), Some("m.Big"));
    }
}
