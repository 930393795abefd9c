use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

static NEXT_KEY: AtomicU64 = AtomicU64::new(0);

/// Tags treated as text-entry controls (an open virtual keyboard belongs to them).
const TEXT_INPUT_TAGS: &[&str] = &["input", "textarea", "text-input", "text-area"];

/// Process-unique identity of a node, independent of its `id` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(u64);

impl NodeKey {
    fn next() -> Self {
        Self(NEXT_KEY.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Shared handle to an element in a document tree.
///
/// Cloning a `Node` clones the handle, not the element. Children are owned by
/// their parent; the parent link is weak so detached subtrees are freed once
/// the last handle goes away.
#[derive(Clone)]
pub struct Node {
    inner: Arc<NodeInner>,
}

struct NodeInner {
    key: NodeKey,
    /// Lowercased tag name.
    tag: String,
    data: Mutex<NodeData>,
    parent: Mutex<Weak<NodeInner>>,
    children: Mutex<Vec<Node>>,
}

#[derive(Default)]
struct NodeData {
    id: Option<String>,
    classes: Vec<String>,
    attributes: HashMap<String, String>,
    disabled: bool,
    shadow_root: Option<Node>,
}

impl Node {
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self {
            inner: Arc::new(NodeInner {
                key: NodeKey::next(),
                tag: tag.as_ref().to_ascii_lowercase(),
                data: Mutex::new(NodeData::default()),
                parent: Mutex::new(Weak::new()),
                children: Mutex::new(Vec::new()),
            }),
        }
    }

    // Builder helpers

    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.set_id(id);
        self
    }

    pub fn with_class(self, class: impl Into<String>) -> Self {
        self.add_class(class);
        self
    }

    pub fn with_attr(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn disabled(self, disabled: bool) -> Self {
        self.set_disabled(disabled);
        self
    }

    pub fn child(self, child: Node) -> Self {
        self.append_child(&child);
        self
    }

    // Identity

    pub fn key(&self) -> NodeKey {
        self.inner.key
    }

    pub fn tag(&self) -> &str {
        &self.inner.tag
    }

    /// Case-insensitive tag comparison.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.inner.tag.eq_ignore_ascii_case(tag)
    }

    pub fn id(&self) -> Option<String> {
        self.inner.data.lock().unwrap().id.clone()
    }

    pub fn has_id(&self) -> bool {
        self.inner.data.lock().unwrap().id.is_some()
    }

    pub fn set_id(&self, id: impl Into<String>) {
        self.inner.data.lock().unwrap().id = Some(id.into());
    }

    // Classes

    pub fn add_class(&self, class: impl Into<String>) {
        let class = class.into();
        let mut data = self.inner.data.lock().unwrap();
        if !data.classes.contains(&class) {
            data.classes.push(class);
        }
    }

    /// Returns true if the class was present.
    pub fn remove_class(&self, class: &str) -> bool {
        let mut data = self.inner.data.lock().unwrap();
        let before = data.classes.len();
        data.classes.retain(|c| c != class);
        before != data.classes.len()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.inner
            .data
            .lock()
            .unwrap()
            .classes
            .iter()
            .any(|c| c == class)
    }

    pub fn classes(&self) -> Vec<String> {
        self.inner.data.lock().unwrap().classes.clone()
    }

    // Attributes

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.inner.data.lock().unwrap().attributes.get(name).cloned()
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.inner
            .data
            .lock()
            .unwrap()
            .attributes
            .contains_key(name)
    }

    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        self.inner
            .data
            .lock()
            .unwrap()
            .attributes
            .insert(name.into(), value.into());
    }

    pub fn remove_attribute(&self, name: &str) -> Option<String> {
        self.inner.data.lock().unwrap().attributes.remove(name)
    }

    pub fn is_disabled(&self) -> bool {
        self.inner.data.lock().unwrap().disabled
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.inner.data.lock().unwrap().disabled = disabled;
    }

    /// Whether this node is a text-entry control.
    pub fn is_text_input(&self) -> bool {
        TEXT_INPUT_TAGS.iter().any(|tag| self.has_tag(tag))
    }

    // Encapsulated rendering root

    pub fn shadow_root(&self) -> Option<Node> {
        self.inner.data.lock().unwrap().shadow_root.clone()
    }

    /// Attach an encapsulated root, or return the existing one.
    pub fn attach_shadow(&self) -> Node {
        let mut data = self.inner.data.lock().unwrap();
        data.shadow_root
            .get_or_insert_with(|| Node::new("#shadow-root"))
            .clone()
    }

    // Tree

    pub fn parent(&self) -> Option<Node> {
        self.inner
            .parent
            .lock()
            .unwrap()
            .upgrade()
            .map(|inner| Node { inner })
    }

    /// Snapshot of the direct children in order.
    pub fn children(&self) -> Vec<Node> {
        self.inner.children.lock().unwrap().clone()
    }

    pub fn child_count(&self) -> usize {
        self.inner.children.lock().unwrap().len()
    }

    /// Append `child` as the last child, moving it from its previous parent.
    ///
    /// Returns false (and leaves the tree untouched) if `child` is this node or
    /// one of its ancestors.
    pub fn append_child(&self, child: &Node) -> bool {
        if child == self || child.contains(self) {
            log::warn!(
                "[layerdom] refusing to append <{}> into its own subtree",
                child.tag()
            );
            return false;
        }
        child.remove();
        *child.inner.parent.lock().unwrap() = Arc::downgrade(&self.inner);
        self.inner.children.lock().unwrap().push(child.clone());
        true
    }

    /// Detach this node from its parent. Returns false if it had none.
    pub fn remove(&self) -> bool {
        let Some(parent) = self.parent() else {
            return false;
        };
        parent
            .inner
            .children
            .lock()
            .unwrap()
            .retain(|c| c != self);
        *self.inner.parent.lock().unwrap() = Weak::new();
        true
    }

    /// Whether `other` is this node or one of its descendants.
    pub fn contains(&self, other: &Node) -> bool {
        let mut current = Some(other.clone());
        while let Some(node) = current {
            if &node == self {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// All descendants in document (pre-)order, excluding this node.
    pub fn descendants(&self) -> Vec<Node> {
        let mut result = Vec::new();
        collect_descendants(self, &mut result);
        result
    }
}

fn collect_descendants(node: &Node, result: &mut Vec<Node>) {
    for child in node.children() {
        result.push(child.clone());
        collect_descendants(&child, result);
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("key", &self.inner.key)
            .field("tag", &self.inner.tag)
            .field("id", &self.id())
            .finish()
    }
}
