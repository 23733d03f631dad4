//! Lazy, depth-first rendering of a subtree.

use super::node::Node;

/// Prefix added per nesting level.
pub const INDENT: &str = "    ";

/// Iterator over the rendered lines of a node.
///
/// A directory's children are looked up only when the directory's own line is
/// produced, so the iterator reflects the tree as it is while being consumed.
pub struct Render {
    stack: Vec<(Node, usize)>,
}

impl Render {
    pub(crate) fn new(root: Node) -> Self {
        Self {
            stack: vec![(root, 0)],
        }
    }
}

impl Iterator for Render {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let (node, depth) = self.stack.pop()?;
        if let Node::Directory(dir) = &node {
            // Reversed so the first child is popped first
            for child in dir.children().into_iter().rev() {
                self.stack.push((child, depth + 1));
            }
        }
        Some(format!(
            "{}{}.{}",
            INDENT.repeat(depth),
            node.kind().label(),
            node.name()
        ))
    }
}
