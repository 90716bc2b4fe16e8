//! Simplified tree navigation
//!
//! This module provides read-only querying operations on simplified nodes.
//! Lookups work on local names only; namespaces are gone by this stage.

use super::models::*;

impl SimplifiedNode {
    /// Child nodes in document order; empty for a leaf
    pub fn children(&self) -> &[SimplifiedNode] {
        match &self.content {
            NodeContent::Branch(children) => children,
            NodeContent::Leaf(_) => &[],
        }
    }

    /// Leaf value; `None` for a branch
    pub fn value(&self) -> Option<&str> {
        match &self.content {
            NodeContent::Leaf(value) => Some(value),
            NodeContent::Branch(_) => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.content, NodeContent::Leaf(_))
    }

    /// First direct child with the given name
    pub fn child(&self, name: &str) -> Option<&SimplifiedNode> {
        self.children().iter().find(|child| child.name == name)
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    /// All nodes below this one in pre-order (document order), excluding itself
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![self.children().iter()],
        }
    }

    pub fn descendants_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a SimplifiedNode> + 'a {
        self.descendants().filter(move |node| node.name == name)
    }

    pub fn has_descendant(&self, name: &str) -> bool {
        self.descendants_named(name).next().is_some()
    }

    /// Concatenated values of every descendant leaf with the given name
    pub fn text_of(&self, name: &str) -> String {
        self.descendants_named(name)
            .filter_map(SimplifiedNode::value)
            .collect()
    }
}

/// Pre-order iterator over a simplified subtree
pub struct Descendants<'a> {
    stack: Vec<std::slice::Iter<'a, SimplifiedNode>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a SimplifiedNode;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(node) => {
                    if !node.children().is_empty() {
                        self.stack.push(node.children().iter());
                    }
                    return Some(node);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}
