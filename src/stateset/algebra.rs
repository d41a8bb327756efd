//! Reduced ordered decision diagrams over one-hot fact indicators
//!
//! One decision variable per fact index, ordered by index. Nodes are
//! hash-consed through the unique table, so two expressions denote the same
//! set of states iff they are the same node. All operations are memoised.
//!
//! A handle is only meaningful for the engine that produced it.

use std::collections::HashMap;

use crate::task::Fact;

use super::dump::{DumpNode, NodeDump};
use super::encoding::FactEncoding;
use super::tuple::Tuple;

const TERMINAL_VAR: u32 = u32::MAX;

/// Handle to a canonical set of states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateSetExpr(u32);

impl StateSetExpr {
    /// The empty set
    pub const EMPTY: StateSetExpr = StateSetExpr(0);
    /// Every state
    pub const ALL: StateSetExpr = StateSetExpr(1);

    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    pub fn is_all(&self) -> bool {
        *self == Self::ALL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Node {
    var: u32,
    lo: u32,
    hi: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Op {
    And,
    Or,
}

/// The set algebra engine.
#[derive(Debug)]
pub struct SetAlgebra {
    encoding: FactEncoding,
    nodes: Vec<Node>,
    unique: HashMap<Node, u32>,
    apply_cache: HashMap<(Op, u32, u32), u32>,
    negate_cache: HashMap<u32, u32>,
}

impl SetAlgebra {
    pub fn new(encoding: FactEncoding) -> Self {
        let terminal = |v| Node {
            var: TERMINAL_VAR,
            lo: v,
            hi: v,
        };
        Self {
            encoding,
            nodes: vec![terminal(0), terminal(1)],
            unique: HashMap::new(),
            apply_cache: HashMap::new(),
            negate_cache: HashMap::new(),
        }
    }

    pub fn encoding(&self) -> &FactEncoding {
        &self.encoding
    }

    /// Total nodes held by the engine, terminals included.
    pub fn total_nodes(&self) -> usize {
        self.nodes.len()
    }

    fn mk(&mut self, var: u32, lo: u32, hi: u32) -> u32 {
        if lo == hi {
            return lo;
        }
        let node = Node { var, lo, hi };
        if let Some(&id) = self.unique.get(&node) {
            return id;
        }
        let id = self.nodes.len() as u32;
        self.nodes.push(node);
        self.unique.insert(node, id);
        id
    }

    fn fact_var(&self, fact: Fact) -> u32 {
        self.encoding.index(fact) as u32
    }

    pub fn constant(&self, value: bool) -> StateSetExpr {
        if value {
            StateSetExpr::ALL
        } else {
            StateSetExpr::EMPTY
        }
    }

    /// States in which `fact` holds.
    pub fn fact(&mut self, fact: Fact) -> StateSetExpr {
        let var = self.fact_var(fact);
        StateSetExpr(self.mk(var, 0, 1))
    }

    /// Conjunction of the tuple's fact indicators; other variables free.
    pub fn from_tuple(&mut self, tuple: &Tuple) -> StateSetExpr {
        let mut root = 1;
        for fact in tuple.facts().iter().rev() {
            let var = self.fact_var(*fact);
            root = self.mk(var, 0, root);
        }
        StateSetExpr(root)
    }

    /// `fact` holds and every other value of its variable is false.
    pub fn pinned_fact(&mut self, fact: Fact) -> StateSetExpr {
        let mut root = 1;
        for value in (0..self.encoding.domain_size(fact.var)).rev() {
            let var = self.fact_var(Fact::new(fact.var, value));
            root = if value == fact.value {
                self.mk(var, 0, root)
            } else {
                self.mk(var, root, 0)
            };
        }
        StateSetExpr(root)
    }

    /// The singleton set of a full assignment.
    pub fn from_state(&mut self, state: &[usize]) -> StateSetExpr {
        let mut root = 1;
        for var in (0..self.encoding.num_variables()).rev() {
            for value in (0..self.encoding.domain_size(var)).rev() {
                let index = self.fact_var(Fact::new(var, value));
                root = if state[var] == value {
                    self.mk(index, 0, root)
                } else {
                    self.mk(index, root, 0)
                };
            }
        }
        StateSetExpr(root)
    }

    pub fn negate(&mut self, a: StateSetExpr) -> StateSetExpr {
        StateSetExpr(self.negate_node(a.0))
    }

    fn negate_node(&mut self, a: u32) -> u32 {
        if a < 2 {
            return 1 - a;
        }
        if let Some(&r) = self.negate_cache.get(&a) {
            return r;
        }
        let Node { var, lo, hi } = self.nodes[a as usize];
        let lo = self.negate_node(lo);
        let hi = self.negate_node(hi);
        let r = self.mk(var, lo, hi);
        self.negate_cache.insert(a, r);
        r
    }

    pub fn and(&mut self, a: StateSetExpr, b: StateSetExpr) -> StateSetExpr {
        StateSetExpr(self.apply(Op::And, a.0, b.0))
    }

    pub fn or(&mut self, a: StateSetExpr, b: StateSetExpr) -> StateSetExpr {
        StateSetExpr(self.apply(Op::Or, a.0, b.0))
    }

    /// `acc = acc OR other`
    pub fn or_assign(&mut self, acc: &mut StateSetExpr, other: StateSetExpr) {
        *acc = self.or(*acc, other);
    }

    /// Conjunction of all expressions; `ALL` for none.
    pub fn and_all(&mut self, exprs: &[StateSetExpr]) -> StateSetExpr {
        exprs
            .iter()
            .fold(StateSetExpr::ALL, |acc, e| self.and(acc, *e))
    }

    fn apply(&mut self, op: Op, a: u32, b: u32) -> u32 {
        match op {
            Op::And => {
                if a == 0 || b == 0 {
                    return 0;
                }
                if a == 1 || a == b {
                    return b;
                }
                if b == 1 {
                    return a;
                }
            }
            Op::Or => {
                if a == 1 || b == 1 {
                    return 1;
                }
                if a == 0 || a == b {
                    return b;
                }
                if b == 0 {
                    return a;
                }
            }
        }

        let key = (op, a.min(b), a.max(b));
        if let Some(&r) = self.apply_cache.get(&key) {
            return r;
        }

        let na = self.nodes[a as usize];
        let nb = self.nodes[b as usize];
        let var = na.var.min(nb.var);
        let (a_lo, a_hi) = if na.var == var { (na.lo, na.hi) } else { (a, a) };
        let (b_lo, b_hi) = if nb.var == var { (nb.lo, nb.hi) } else { (b, b) };

        let lo = self.apply(op, a_lo, b_lo);
        let hi = self.apply(op, a_hi, b_hi);
        let r = self.mk(var, lo, hi);
        self.apply_cache.insert(key, r);
        r
    }

    /// True iff every state in `a` is also in `b`.
    pub fn is_subset_of(&mut self, a: StateSetExpr, b: StateSetExpr) -> bool {
        let not_b = self.negate(b);
        self.and(a, not_b).is_empty()
    }

    pub fn contains_state(&self, a: StateSetExpr, state: &[usize]) -> bool {
        let mut current = a.0;
        while current >= 2 {
            let node = self.nodes[current as usize];
            let fact = self.encoding.fact_at(node.var as usize);
            current = if fact.holds_in(state) { node.hi } else { node.lo };
        }
        current == 1
    }

    /// Decision nodes reachable from `a`.
    pub fn node_count(&self, a: StateSetExpr) -> usize {
        let mut seen = std::collections::HashSet::new();
        let mut stack = vec![a.0];
        while let Some(n) = stack.pop() {
            if n < 2 || !seen.insert(n) {
                continue;
            }
            let node = self.nodes[n as usize];
            stack.push(node.lo);
            stack.push(node.hi);
        }
        seen.len()
    }

    /// Post-order node listing of `a`: children before parents.
    pub fn dump(&self, a: StateSetExpr) -> NodeDump {
        let mut refs: HashMap<u32, usize> = HashMap::new();
        let mut nodes = Vec::new();
        // (node, children pushed)
        let mut stack = vec![(a.0, false)];
        while let Some((n, expanded)) = stack.pop() {
            if n < 2 || refs.contains_key(&n) {
                continue;
            }
            let node = self.nodes[n as usize];
            if expanded {
                let lo = self.reference(&refs, node.lo);
                let hi = self.reference(&refs, node.hi);
                refs.insert(n, nodes.len() + 2);
                nodes.push(DumpNode {
                    fact: node.var as usize,
                    lo,
                    hi,
                });
            } else {
                stack.push((n, true));
                stack.push((node.hi, false));
                stack.push((node.lo, false));
            }
        }
        NodeDump {
            root: self.reference(&refs, a.0),
            nodes,
        }
    }

    fn reference(&self, refs: &HashMap<u32, usize>, n: u32) -> usize {
        if n < 2 {
            n as usize
        } else {
            refs[&n]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn algebra() -> SetAlgebra {
        SetAlgebra::new(FactEncoding::from_domains(&[2, 3]))
    }

    fn all_states() -> Vec<Vec<usize>> {
        let mut out = Vec::new();
        for a in 0..2 {
            for b in 0..3 {
                out.push(vec![a, b]);
            }
        }
        out
    }

    /// Count the full assignments contained in `e`.
    fn members(alg: &SetAlgebra, e: StateSetExpr) -> Vec<Vec<usize>> {
        all_states()
            .into_iter()
            .filter(|s| alg.contains_state(e, s))
            .collect()
    }

    #[test]
    fn test_constants() {
        let alg = algebra();
        assert_eq!(members(&alg, alg.constant(true)).len(), 6);
        assert!(members(&alg, alg.constant(false)).is_empty());
    }

    #[test]
    fn test_fact_and_tuple() {
        let mut alg = algebra();
        let f = alg.fact(Fact::new(1, 2));
        assert_eq!(members(&alg, f), vec![vec![0, 2], vec![1, 2]]);

        let t = Tuple::new(vec![Fact::new(0, 1), Fact::new(1, 2)]).unwrap();
        let e = alg.from_tuple(&t);
        assert_eq!(members(&alg, e), vec![vec![1, 2]]);
    }

    #[test]
    fn test_canonical_equality() {
        let mut alg = algebra();
        let a = alg.fact(Fact::new(0, 0));
        let b = alg.fact(Fact::new(1, 1));
        let ab = alg.and(a, b);
        let ba = alg.and(b, a);
        assert_eq!(ab, ba);

        // De Morgan
        let na = alg.negate(a);
        let nb = alg.negate(b);
        let or_neg = alg.or(na, nb);
        let neg_and = alg.negate(ab);
        assert_eq!(or_neg, neg_and);

        let double = alg.negate(neg_and);
        assert_eq!(double, ab);
    }

    #[test]
    fn test_pinned_fact_and_from_state() {
        let mut alg = algebra();
        let pinned = alg.pinned_fact(Fact::new(1, 0));
        assert_eq!(members(&alg, pinned), vec![vec![0, 0], vec![1, 0]]);

        let single = alg.from_state(&[1, 2]);
        assert_eq!(members(&alg, single), vec![vec![1, 2]]);
        assert!(alg.contains_state(single, &[1, 2]));
    }

    #[test]
    fn test_subset() {
        let mut alg = algebra();
        let a = alg.fact(Fact::new(0, 1));
        let single = alg.from_state(&[1, 0]);
        assert!(alg.is_subset_of(single, a));
        assert!(!alg.is_subset_of(a, single));
        assert!(alg.is_subset_of(StateSetExpr::EMPTY, single));
        assert!(alg.is_subset_of(a, StateSetExpr::ALL));
    }

    #[test]
    fn test_or_assign() {
        let mut alg = algebra();
        let mut acc = StateSetExpr::EMPTY;
        for value in 0..3 {
            let f = alg.pinned_fact(Fact::new(1, value));
            alg.or_assign(&mut acc, f);
        }
        // every one-hot assignment of var 1 is covered
        assert_eq!(members(&alg, acc).len(), 6);
    }

    #[test]
    fn test_dump_children_first() {
        let mut alg = algebra();
        let t = Tuple::new(vec![Fact::new(0, 1), Fact::new(1, 2)]).unwrap();
        let e = alg.from_tuple(&t);
        let dump = alg.dump(e);
        assert_eq!(dump.nodes.len(), alg.node_count(e));
        for (i, node) in dump.nodes.iter().enumerate() {
            assert!(node.lo < i + 2);
            assert!(node.hi < i + 2);
        }
        assert_eq!(dump.root, dump.nodes.len() + 1);
    }

    #[test]
    fn test_dump_evaluates_like_engine() {
        let mut alg = algebra();
        let a = alg.fact(Fact::new(0, 0));
        let b = alg.pinned_fact(Fact::new(1, 1));
        let e = alg.or(a, b);
        let dump = alg.dump(e);
        let enc = alg.encoding().clone();
        for state in all_states() {
            let holds = |i: usize| enc.fact_at(i).holds_in(&state);
            assert_eq!(dump.evaluate(holds), alg.contains_state(e, &state));
        }
    }
}
