//! Text rendering of the forest with `termtree`.

use generational_arena::Index;
use termtree::Tree;

use crate::domain::TreeArena;

pub trait TreeNodeConvert {
    /// One diagram per top-level node.
    fn to_tree_strings(&self) -> Vec<Tree<String>>;
}

impl TreeNodeConvert for TreeArena {
    fn to_tree_strings(&self) -> Vec<Tree<String>> {
        fn build_tree(arena: &TreeArena, idx: Index) -> Option<Tree<String>> {
            let node = arena.node(idx)?;
            let leaves: Vec<_> = node
                .children
                .iter()
                .filter_map(|&child| build_tree(arena, child))
                .collect();
            Some(Tree::new(format!("{} [{}]", node.label, node.id)).with_leaves(leaves))
        }

        self.roots()
            .iter()
            .filter_map(|&root| build_tree(self, root))
            .collect()
    }
}
