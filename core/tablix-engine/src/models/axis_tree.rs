//! FILENAME: core/tablix-engine/src/models/axis_tree.rs
//! Axis Tree - An arena of header nodes for one axis.
//!
//! Built from label paths (one path per leaf, outermost level first).
//! Consecutive paths sharing a prefix share the group nodes of that prefix,
//! so the leaves of a group are always contiguous. A path shorter than the
//! tree's depth makes a ragged leaf.

// ============================================================================
// AXIS NODE
// ============================================================================

/// A node in the axis tree (row or column hierarchy).
#[derive(Debug, Clone)]
pub struct AxisNode {
    pub label: String,
    pub level: usize,
    /// Position among its siblings.
    pub index: usize,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// Set for leaves only.
    pub leaf_index: Option<usize>,
    /// Leaf index of the first leaf below this node.
    pub first_leaf: usize,
    pub leaf_count: usize,
}

impl AxisNode {
    fn new(label: String, level: usize, index: usize, parent: Option<usize>) -> Self {
        AxisNode {
            label,
            level,
            index,
            parent,
            children: Vec::new(),
            leaf_index: None,
            first_leaf: 0,
            leaf_count: 0,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

// ============================================================================
// AXIS TREE
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct AxisTree {
    nodes: Vec<AxisNode>,
    roots: Vec<usize>,
    /// Node ids of the leaves, in document order.
    leaves: Vec<usize>,
    depth: usize,
    level_names: Vec<String>,
}

impl AxisTree {
    /// Builds the tree from one label path per leaf. Empty paths are skipped.
    pub fn from_paths<S: AsRef<str>>(level_names: Vec<String>, paths: &[Vec<S>]) -> Self {
        let mut tree = AxisTree {
            depth: level_names.len(),
            level_names,
            ..AxisTree::default()
        };

        for path in paths.iter().filter(|p| !p.is_empty()) {
            tree.depth = tree.depth.max(path.len());
            let mut parent: Option<usize> = None;
            for (level, label) in path.iter().enumerate() {
                let label = label.as_ref();
                let is_last = level + 1 == path.len();
                let siblings = match parent {
                    Some(id) => &tree.nodes[id].children,
                    None => &tree.roots,
                };

                // Only the most recent sibling can be extended; leaves never are.
                let reusable = siblings.last().copied().filter(|&id| {
                    let node = &tree.nodes[id];
                    !is_last && !node.is_leaf() && node.label == label
                });
                let id = match reusable {
                    Some(id) => id,
                    None => tree.push_node(label, level, parent),
                };
                parent = Some(id);
            }
        }

        while tree.level_names.len() < tree.depth {
            let level = tree.level_names.len();
            tree.level_names.push(format!("Level {}", level + 1));
        }
        tree.number_leaves();
        tree
    }

    /// One level, one leaf per label.
    pub fn flat<S: AsRef<str>>(level_name: &str, labels: &[S]) -> Self {
        let paths: Vec<Vec<&str>> = labels.iter().map(|l| vec![l.as_ref()]).collect();
        AxisTree::from_paths(vec![level_name.to_string()], &paths)
    }

    fn push_node(&mut self, label: &str, level: usize, parent: Option<usize>) -> usize {
        let id = self.nodes.len();
        let index = match parent {
            Some(p) => self.nodes[p].children.len(),
            None => self.roots.len(),
        };
        self.nodes.push(AxisNode::new(label.to_string(), level, index, parent));
        match parent {
            Some(p) => self.nodes[p].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// Depth-first numbering of leaves plus leaf ranges of every node.
    fn number_leaves(&mut self) {
        let mut stack: Vec<(usize, bool)> = self.roots.iter().rev().map(|&id| (id, false)).collect();
        let mut next = 0;
        while let Some((id, done)) = stack.pop() {
            if done {
                let node = &mut self.nodes[id];
                node.leaf_count = next - node.first_leaf;
                continue;
            }
            self.nodes[id].first_leaf = next;
            if self.nodes[id].is_leaf() {
                self.nodes[id].leaf_index = Some(next);
                self.nodes[id].leaf_count = 1;
                self.leaves.push(id);
                next += 1;
                continue;
            }
            stack.push((id, true));
            for &child in self.nodes[id].children.iter().rev() {
                stack.push((child, false));
            }
        }
    }

    pub fn node(&self, id: usize) -> Option<&AxisNode> {
        self.nodes.get(id)
    }

    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn leaves(&self) -> &[usize] {
        &self.leaves
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn level_names(&self) -> &[String] {
        &self.level_names
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Labels from the root down to `id`.
    pub fn label_path(&self, id: usize) -> Vec<&str> {
        let mut labels = Vec::new();
        let mut current = self.nodes.get(id);
        while let Some(node) = current {
            labels.push(node.label.as_str());
            current = node.parent.and_then(|p| self.nodes.get(p));
        }
        labels.reverse();
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_tree() -> AxisTree {
        AxisTree::from_paths(
            vec!["Year".to_string(), "Quarter".to_string()],
            &[
                vec!["2023", "Q1"],
                vec!["2023", "Q2"],
                vec!["2024", "Q1"],
                vec!["Total"],
            ],
        )
    }

    #[test]
    fn test_shared_prefix_builds_groups() {
        let tree = create_test_tree();
        assert_eq!(tree.roots().len(), 3);
        assert_eq!(tree.leaf_count(), 4);
        assert_eq!(tree.depth(), 2);

        let first = tree.node(tree.roots()[0]).unwrap();
        assert_eq!(first.label, "2023");
        assert_eq!(first.children.len(), 2);
        assert_eq!((first.first_leaf, first.leaf_count), (0, 2));
        let second = tree.node(tree.roots()[1]).unwrap();
        assert_eq!((second.first_leaf, second.leaf_count), (2, 1));
    }

    #[test]
    fn test_ragged_leaf() {
        let tree = create_test_tree();
        let total = tree.node(tree.leaves()[3]).unwrap();
        assert_eq!(total.level, 0);
        assert_eq!(total.leaf_index, Some(3));
        assert!(total.is_leaf());
    }

    #[test]
    fn test_non_contiguous_paths_split_groups() {
        let tree = AxisTree::from_paths(
            vec!["A".to_string(), "B".to_string()],
            &[vec!["x", "1"], vec!["y", "1"], vec!["x", "2"]],
        );
        assert_eq!(tree.roots().len(), 3);
        assert_eq!(tree.node(tree.roots()[2]).unwrap().index, 2);
    }

    #[test]
    fn test_label_path_and_flat() {
        let tree = create_test_tree();
        assert_eq!(tree.label_path(tree.leaves()[1]), vec!["2023", "Q2"]);

        let flat = AxisTree::flat("Product", &["Apples", "Pears"]);
        assert_eq!(flat.depth(), 1);
        assert_eq!(flat.leaf_count(), 2);
        assert_eq!(flat.level_names(), &["Product".to_string()]);
    }

    #[test]
    fn test_missing_level_names_are_filled() {
        let tree = AxisTree::from_paths(Vec::new(), &[vec!["a", "b", "c"]]);
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.level_names()[2], "Level 3");
    }
}
