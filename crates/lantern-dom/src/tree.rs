//! DOM Tree (arena-based allocation)
//!
//! Low-level structure edits. These never notify observers; `Document`
//! wraps them with mutation bookkeeping.

use crate::{DomError, Node, NodeId};

/// Arena-based DOM tree. Node 0 is always the document node.
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if !id.is_valid() {
            return None;
        }
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if !id.is_valid() {
            return None;
        }
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes ever allocated (detached nodes included)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content))
    }

    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.push(Node::comment(content))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(|p| p.is_valid())
    }

    /// Is `ancestor` an inclusive ancestor of `node`?
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Iterate over direct children
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.get(id).map_or(NodeId::NONE, |n| n.first_child),
        }
    }

    /// All descendants in tree order, excluding `id` itself
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).collect();
        stack.reverse();
        while let Some(node) = stack.pop() {
            out.push(node);
            let mut kids: Vec<NodeId> = self.children(node).collect();
            kids.reverse();
            stack.extend(kids);
        }
        out
    }

    /// Remove `id` from its parent, keeping its subtree intact
    pub fn detach(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else { return };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);
        if !parent.is_valid() {
            return;
        }
        if let Some(p) = self.get_mut(prev) {
            p.next_sibling = next;
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = next;
        }
        if let Some(n) = self.get_mut(next) {
            n.prev_sibling = prev;
        } else if let Some(par) = self.get_mut(parent) {
            par.last_child = prev;
        }
        if let Some(node) = self.get_mut(id) {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }
    }

    /// Insert `child` under `parent` before `reference` (append when `None`)
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        if self.get(parent).is_none() || self.get(child).is_none() {
            return Err(DomError::HierarchyRequest {
                parent,
                child,
                reason: "unknown node",
            });
        }
        if self.contains(child, parent) {
            return Err(DomError::HierarchyRequest {
                parent,
                child,
                reason: "child is an ancestor of parent",
            });
        }
        if let Some(r) = reference {
            if self.parent(r) != Some(parent) {
                return Err(DomError::HierarchyRequest {
                    parent,
                    child,
                    reason: "reference is not a child of parent",
                });
            }
            if r == child {
                return Ok(());
            }
        }

        self.detach(child);

        match reference {
            Some(r) => {
                let prev = self.nodes[r.index()].prev_sibling;
                {
                    let node = &mut self.nodes[child.index()];
                    node.parent = parent;
                    node.prev_sibling = prev;
                    node.next_sibling = r;
                }
                self.nodes[r.index()].prev_sibling = child;
                if let Some(p) = self.get_mut(prev) {
                    p.next_sibling = child;
                } else {
                    self.nodes[parent.index()].first_child = child;
                }
            }
            None => {
                let last = self.nodes[parent.index()].last_child;
                {
                    let node = &mut self.nodes[child.index()];
                    node.parent = parent;
                    node.prev_sibling = last;
                    node.next_sibling = NodeId::NONE;
                }
                if let Some(l) = self.get_mut(last) {
                    l.next_sibling = child;
                } else {
                    self.nodes[parent.index()].first_child = child;
                }
                self.nodes[parent.index()].last_child = child;
            }
        }
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }
}

/// Iterator over child node IDs
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next;
        let node = self.tree.get(current)?;
        self.next = node.next_sibling;
        Some(current)
    }
}
