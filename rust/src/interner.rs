//! Outline id interning.
//!
//! Maps outline id strings to dense integer node ids so every pass can keep
//! its per-task state in plain vectors. Ids are assigned in ascending
//! outline-id order, so comparing node ids compares outline ids.

use rustc_hash::FxHashMap;

/// Interned task node (u32 for compact storage and fast hashing).
pub type NodeId = u32;

/// Bidirectional outline id <-> `NodeId` table.
#[derive(Debug, Clone, Default)]
pub struct OutlineInterner {
    to_node: FxHashMap<String, NodeId>,
    from_node: Vec<String>,
}

impl OutlineInterner {
    /// Intern a set of unique ids, numbering them in sorted order.
    pub fn from_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let mut sorted: Vec<&str> = ids.into_iter().collect();
        sorted.sort_unstable();
        sorted.dedup();

        let mut to_node = FxHashMap::with_capacity_and_hasher(sorted.len(), Default::default());
        let mut from_node = Vec::with_capacity(sorted.len());
        for (node, id) in sorted.into_iter().enumerate() {
            to_node.insert(id.to_string(), node as NodeId);
            from_node.push(id.to_string());
        }
        Self { to_node, from_node }
    }

    /// Node id for an outline id, if it exists.
    #[inline]
    pub fn get(&self, outline_id: &str) -> Option<NodeId> {
        self.to_node.get(outline_id).copied()
    }

    /// Outline id for a node id.
    #[inline]
    pub fn resolve(&self, node: NodeId) -> Option<&str> {
        self.from_node.get(node as usize).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.from_node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.from_node.is_empty()
    }

    /// All outline ids in node order.
    pub fn ids(&self) -> &[String] {
        &self.from_node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nodes_follow_sorted_order() {
        let interner = OutlineInterner::from_ids(["2", "1.10", "1", "1.2"]);

        assert_eq!(interner.len(), 4);
        assert_eq!(interner.get("1"), Some(0));
        assert_eq!(interner.get("1.10"), Some(1));
        assert_eq!(interner.get("1.2"), Some(2));
        assert_eq!(interner.get("2"), Some(3));
        assert_eq!(interner.resolve(1), Some("1.10"));
        assert_eq!(interner.get("3"), None);
        assert_eq!(interner.resolve(9), None);
    }

    #[test]
    fn test_empty() {
        let interner = OutlineInterner::from_ids(std::iter::empty());
        assert!(interner.is_empty());
        assert!(interner.ids().is_empty());
    }
}
