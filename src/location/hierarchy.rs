use serde::Serialize;
use std::collections::HashMap;

use crate::access::{ScopeError, ScopePrefix};
use crate::location::LocationCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub struct Node {
    pub code: LocationCode,
    pub name: Option<String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Arena-backed location tree. Ancestry is answered by walking parent
/// indices, not by comparing strings.
#[derive(Debug, Clone, Default)]
pub struct HierarchyTree {
    nodes: Vec<Node>,
    by_code: HashMap<LocationCode, NodeId>,
}

/// Nested rendering of a subtree.
#[derive(Debug, Clone, Serialize)]
pub struct TreeView {
    pub code: String,
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub children: Vec<TreeView>,
}

impl HierarchyTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(code, name)` rows in any order. Rows whose parent is not
    /// present are attached as roots of the forest.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (LocationCode, Option<String>)>,
    {
        let mut rows: Vec<_> = rows.into_iter().collect();
        rows.sort_by_key(|(code, _)| code.depth());

        let mut tree = Self::new();
        for (code, name) in rows {
            let parent = code.parent().and_then(|p| tree.find(&p));
            tree.push(code, name, parent);
        }
        tree
    }

    /// Insert a node whose parent is already in the tree, or a country root.
    pub fn insert(&mut self, code: LocationCode, name: Option<String>) -> Result<NodeId, ScopeError> {
        if let Some(id) = self.find(&code) {
            return Ok(id);
        }
        let parent = match code.parent() {
            None => None,
            Some(parent_code) => Some(self.find(&parent_code).ok_or_else(|| {
                ScopeError::NotFound(format!("parent '{}' of '{}'", parent_code, code))
            })?),
        };
        Ok(self.push(code, name, parent))
    }

    fn push(&mut self, code: LocationCode, name: Option<String>, parent: Option<NodeId>) -> NodeId {
        if let Some(id) = self.by_code.get(&code) {
            return *id;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            code: code.clone(),
            name,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        self.by_code.insert(code, id);
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn find(&self, code: &LocationCode) -> Option<NodeId> {
        self.by_code.get(code).copied()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Pre-order walk starting at `root`.
    pub fn subtree(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else { continue };
            out.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Topmost nodes the scope can see: the scope node itself if present,
    /// otherwise every in-scope node whose parent is out of scope or missing.
    pub fn visible_roots(&self, scope: &ScopePrefix) -> Vec<NodeId> {
        if let Some(id) = self.find(scope.code()) {
            return vec![id];
        }
        let mut roots: Vec<NodeId> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| scope.contains_code(&node.code))
            .filter(|(_, node)| match node.parent {
                None => true,
                Some(p) => !scope.contains_code(&self.nodes[p.0].code),
            })
            .map(|(i, _)| NodeId(i))
            .collect();
        roots.sort_by(|a, b| self.nodes[a.0].code.cmp(&self.nodes[b.0].code));
        roots
    }

    pub fn view(&self, id: NodeId) -> Option<TreeView> {
        let node = self.get(id)?;
        let mut children: Vec<TreeView> = node.children.iter().filter_map(|c| self.view(*c)).collect();
        children.sort_by(|a, b| a.code.cmp(&b.code));
        Some(TreeView {
            code: node.code.to_string(),
            level: node.code.level().to_string(),
            name: node.name.clone(),
            children,
        })
    }

    pub fn visible_views(&self, scope: &ScopePrefix) -> Vec<TreeView> {
        self.visible_roots(scope)
            .into_iter()
            .filter_map(|id| self.view(id))
            .collect()
    }
}
