use tree_sitter::Node;

/// Node kinds the bundled grammars use for name tokens
const NAME_KINDS: &[&str] = &[
    "identifier",
    "type_identifier",
    "property_identifier",
    "field_identifier",
];

/// Every name leaf under `root`, in byte order.
///
/// Keywords, literals and comments never surface as name nodes, while names
/// inside f-string or template interpolations do.
pub fn identifier_names(root: Node<'_>, source: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if NAME_KINDS.contains(&node.kind()) {
            if let Ok(text) = node.utf8_text(source.as_bytes()) {
                if !text.is_empty() {
                    names.push(text.to_string());
                }
            }
            continue;
        }

        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }

    names
}
