//! Work breakdown structure containment computed from outline ids.
//!
//! A task is the parent of another when its outline id is the nearest
//! existing dot-prefix of the other's id ("1.2" contains "1.2.3"; with "1.2"
//! absent, "1" contains "1.2.3" directly). The index is rebuilt from the ids
//! on every run and never stored on the tasks themselves.

use crate::interner::{NodeId, OutlineInterner};

/// Strict outline prefix of an id, one segment up.
pub fn parent_outline(outline_id: &str) -> Option<&str> {
    outline_id.rsplit_once('.').map(|(parent, _)| parent)
}

/// Number of dot segments in an outline id.
pub fn outline_depth(outline_id: &str) -> usize {
    outline_id.split('.').count()
}

/// Parent/children index over interned tasks.
#[derive(Debug, Clone, Default)]
pub struct OutlineHierarchy {
    parents: Vec<Option<NodeId>>,
    children: Vec<Vec<NodeId>>,
    depths: Vec<usize>,
}

impl OutlineHierarchy {
    pub fn build(index: &OutlineInterner) -> Self {
        let n = index.len();
        let mut parents = vec![None; n];
        let mut children: Vec<Vec<NodeId>> = vec![Vec::new(); n];
        let mut depths = vec![1; n];

        for (node, id) in index.ids().iter().enumerate() {
            depths[node] = outline_depth(id);
            let mut prefix = parent_outline(id);
            while let Some(candidate) = prefix {
                if let Some(parent) = index.get(candidate) {
                    parents[node] = Some(parent);
                    children[parent as usize].push(node as NodeId);
                    break;
                }
                prefix = parent_outline(candidate);
            }
        }

        Self {
            parents,
            children,
            depths,
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parents.get(node as usize).copied().flatten()
    }

    /// Direct children, ascending.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.children
            .get(node as usize)
            .map(|c| c.as_slice())
            .unwrap_or(&[])
    }

    pub fn depth(&self, node: NodeId) -> usize {
        self.depths.get(node as usize).copied().unwrap_or(0)
    }

    /// A summary is any task with at least one descendant.
    pub fn is_summary(&self, node: NodeId) -> bool {
        !self.children(node).is_empty()
    }

    /// Non-summary tasks anywhere below `node`, ascending.
    pub fn leaf_descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            let kids = self.children(current);
            if kids.is_empty() {
                leaves.push(current);
            } else {
                stack.extend(kids.iter().rev());
            }
        }
        leaves.sort_unstable();
        leaves
    }

    /// Summary tasks ordered so every summary follows all summaries below it.
    pub fn summaries_deepest_first(&self) -> Vec<NodeId> {
        let mut summaries: Vec<NodeId> = (0..self.children.len() as NodeId)
            .filter(|&node| self.is_summary(node))
            .collect();
        summaries.sort_by(|a, b| self.depth(*b).cmp(&self.depth(*a)).then(a.cmp(b)));
        summaries
    }
}
