use layerdom::{Document, Node, first_focusable};

/// Focus the first focusable element inside `container` and return it.
pub fn auto_focus(document: &Document, container: &Node) -> Option<Node> {
    let node = first_focusable(container)?;
    document.focus(&node);
    Some(node)
}
