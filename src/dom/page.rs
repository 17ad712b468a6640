//! Arena-backed in-memory implementation of [`Document`].
//!
//! Used by the test suite and the terminal simulator. Mutation observers
//! receive child-list changes over plain mpsc channels; observers whose
//! receiver has gone away are pruned on the next emission, so a one-shot
//! consumer unsubscribes simply by dropping its receiver.

use std::collections::HashMap;
use std::sync::mpsc::{Receiver, Sender, channel};

use super::{Document, Mutation, NodeId};

#[derive(Debug, Default)]
struct NodeData {
    tag: String,
    attrs: HashMap<String, String>,
    classes: Vec<String>,
    text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

struct Observer {
    scope: NodeId,
    tx: Sender<Mutation>,
}

/// In-memory page tree. Node ids stay stable for the life of the document;
/// detached nodes keep their data but stop being reachable from the root.
pub struct PageDom {
    nodes: Vec<NodeData>,
    focused: Option<NodeId>,
    observers: Vec<Observer>,
}

impl PageDom {
    pub fn new() -> Self {
        let root = NodeData {
            tag: "html".into(),
            ..NodeData::default()
        };
        Self {
            nodes: vec![root],
            focused: None,
            observers: Vec::new(),
        }
    }

    /// Create a detached element. Attach it with [`PageDom::append_child`].
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            tag: tag.to_ascii_lowercase(),
            ..NodeData::default()
        });
        id
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(data) = self.nodes.get_mut(node.0) {
            data.attrs.insert(name.to_ascii_lowercase(), value.to_owned());
        }
    }

    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(data) = self.nodes.get_mut(node.0) {
            data.text = Some(text.to_owned());
        }
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.0)?.text.as_deref()
    }

    /// Attach `child` as the last child of `parent` and notify observers
    /// whose scope contains the insertion point.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.nodes.get(parent.0).is_none() || self.nodes.get(child.0).is_none() {
            return;
        }
        if let Some(old_parent) = self.nodes[child.0].parent {
            self.nodes[old_parent.0].children.retain(|&c| c != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        self.emit(Mutation::ChildInserted { parent, node: child });
    }

    /// Detach `node` from its parent and notify observers.
    pub fn remove(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get(node.0).and_then(|data| data.parent) else {
            return;
        };
        self.nodes[parent.0].children.retain(|&c| c != node);
        self.nodes[node.0].parent = None;
        self.emit(Mutation::ChildRemoved { parent, node });
    }

    pub fn set_focus(&mut self, node: Option<NodeId>) {
        self.focused = node;
    }

    /// Subscribe to child-list mutations under `scope` (subtree included).
    pub fn observe(&mut self, scope: NodeId) -> Receiver<Mutation> {
        let (tx, rx) = channel();
        self.observers.push(Observer { scope, tx });
        rx
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn emit(&mut self, mutation: Mutation) {
        let parent = match mutation {
            Mutation::ChildInserted { parent, .. } => parent,
            Mutation::ChildRemoved { parent, .. } => parent,
        };
        let mut live = Vec::with_capacity(self.observers.len());
        for observer in self.observers.drain(..) {
            if !in_scope(&self.nodes, observer.scope, parent) {
                live.push(observer);
                continue;
            }
            if observer.tx.send(mutation).is_ok() {
                live.push(observer);
            }
        }
        self.observers = live;
    }

    fn collect_by_tag(&self, node: NodeId, tag: &str, out: &mut Vec<NodeId>) {
        for &child in &self.nodes[node.0].children {
            if self.nodes[child.0].tag.eq_ignore_ascii_case(tag) {
                out.push(child);
            }
            self.collect_by_tag(child, tag, out);
        }
    }

    fn collect_by_class(&self, node: NodeId, class: &str, out: &mut Vec<NodeId>) {
        if self.nodes[node.0].classes.iter().any(|c| c == class) {
            out.push(node);
        }
        for &child in &self.nodes[node.0].children {
            self.collect_by_class(child, class, out);
        }
    }
}

impl Default for PageDom {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `node` is `scope` or one of its descendants.
fn in_scope(nodes: &[NodeData], scope: NodeId, node: NodeId) -> bool {
    let mut current = Some(node);
    while let Some(id) = current {
        if id == scope {
            return true;
        }
        current = nodes[id.0].parent;
    }
    false
}

impl Document for PageDom {
    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn contains(&self, node: NodeId) -> bool {
        self.nodes.get(node.0).is_some() && in_scope(&self.nodes, self.root(), node)
    }

    fn tag(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.0).map(|data| data.tag.as_str())
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes.get(node.0)?.attrs.get(name).map(String::as_str)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let mut stack = vec![self.root()];
        while let Some(node) = stack.pop() {
            if self.attr(node, "id") == Some(id) {
                return Some(node);
            }
            // keep document order under a LIFO stack
            stack.extend(self.nodes[node.0].children.iter().rev());
        }
        None
    }

    fn descendants_by_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        if self.nodes.get(root.0).is_some() {
            self.collect_by_tag(root, tag, &mut out);
        }
        out
    }

    fn elements_with_class(&self, class: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_by_class(self.root(), class, &mut out);
        out
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(data) = self.nodes.get_mut(node.0)
            && !data.classes.iter().any(|c| c == class)
        {
            data.classes.push(class.to_owned());
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(data) = self.nodes.get_mut(node.0) {
            data.classes.retain(|c| c != class);
        }
    }

    fn focused_tag(&self) -> Option<&str> {
        let node = self.focused?;
        self.tag(node)
    }
}
