use crate::node::Node;

/// Whether a node can take keyboard focus.
///
/// Links need an `href`, form controls must not be disabled, and anything with
/// `tabindex="0"` is focusable.
pub fn is_focusable(node: &Node) -> bool {
    let by_tag = match node.tag() {
        "a" | "area" => node.has_attribute("href"),
        "input" | "select" | "textarea" | "button" => !node.is_disabled(),
        _ => false,
    };
    by_tag || node.attribute("tabindex").as_deref() == Some("0")
}

/// Collect focusable descendants of `root` in document order.
///
/// `root` itself is not considered.
pub fn collect_focusable(root: &Node) -> Vec<Node> {
    let mut result = Vec::new();
    collect_focusable_recursive(root, &mut result);
    result
}

fn collect_focusable_recursive(node: &Node, result: &mut Vec<Node>) {
    for child in node.children() {
        if is_focusable(&child) {
            result.push(child.clone());
        }
        collect_focusable_recursive(&child, result);
    }
}

/// First focusable descendant of `root`, if any.
pub fn first_focusable(root: &Node) -> Option<Node> {
    for child in root.children() {
        if is_focusable(&child) {
            return Some(child);
        }
        if let Some(found) = first_focusable(&child) {
            return Some(found);
        }
    }
    None
}
