//! Node listing written into set-definition lines

use std::fmt;

/// One decision node: test fact `fact`, go to `lo` if false, `hi` if true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpNode {
    pub fact: usize,
    pub lo: usize,
    pub hi: usize,
}

/// A self-contained decision diagram.
///
/// Reference 0 is the empty set, 1 is every state, `k + 2` is `nodes[k]`.
/// Every node only references terminals or nodes listed before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDump {
    pub root: usize,
    pub nodes: Vec<DumpNode>,
}

impl NodeDump {
    /// Evaluate the diagram against a fact valuation.
    pub fn evaluate(&self, holds: impl Fn(usize) -> bool) -> bool {
        let mut current = self.root;
        while current >= 2 {
            let node = self.nodes[current - 2];
            current = if holds(node.fact) { node.hi } else { node.lo };
        }
        current == 1
    }
}

impl fmt::Display for NodeDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.root, self.nodes.len())?;
        for node in &self.nodes {
            write!(f, " {} {} {}", node.fact, node.lo, node.hi)?;
        }
        write!(f, " ;")
    }
}
