//! The abstract syntax of candidate formulas.
//!
//! Formulas are binary trees. A quantifier node keeps its scope in the left
//! child; a binary connective uses both children; negation keeps its operand
//! in the right child; predicates and equalities are leaves. Every tree
//! carries a [`VarRange`] bitmask summarizing which enumeration variables
//! occur in it.

use crate::printer;
use crate::spec::Relation;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// A variable name. Enumeration uses `x`, `y`, `z`, `w`; uniqueness
/// elimination introduces the fresh names `t`, `u`, `v`, `s`.
pub type Var = char;

/// The enumeration variables, in canonical order.
pub const VARS: [Var; 4] = ['x', 'y', 'z', 'w'];

/// The fresh variable paired with an enumeration variable: `x` maps to `t`,
/// `y` to `u`, `z` to `v`, `w` to `s`.
pub fn fresh_var(v: Var) -> Var {
    (v as u8 - 4) as char
}

/// A bitmask of the enumeration variables occurring in a formula:
/// `x = 0b1000`, `y = 0b0100`, `z = 0b0010`, `w = 0b0001`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct VarRange(pub u8);

impl VarRange {
    /// The empty range.
    pub const EMPTY: VarRange = VarRange(0);

    /// The range containing a single enumeration variable. Fresh variables
    /// are outside the enumeration alphabet and contribute nothing.
    pub fn of_var(v: Var) -> VarRange {
        match v {
            'x' => VarRange(0b1000),
            'y' => VarRange(0b0100),
            'z' => VarRange(0b0010),
            'w' => VarRange(0b0001),
            _ => VarRange::EMPTY,
        }
    }

    /// The range of a variable tuple.
    pub fn of_tuple(vars: &[Var]) -> VarRange {
        vars.iter()
            .fold(VarRange::EMPTY, |r, &v| r.union(VarRange::of_var(v)))
    }

    /// Set union of two ranges.
    pub fn union(self, other: VarRange) -> VarRange {
        VarRange(self.0 | other.0)
    }

    /// Whether the range contains a variable.
    pub fn contains(self, v: Var) -> bool {
        self.0 & VarRange::of_var(v).0 != 0
    }

    /// The number of variables in a valid range.
    ///
    /// Only contiguous prefixes of the canonical order are valid:
    /// one-variable formulas are over `x`, two-variable formulas over
    /// `x, y`, and so on. Any other combination returns zero, which the
    /// enumerator uses to discard gappy terms.
    pub fn num_vars(self) -> usize {
        match self.0 {
            0b1000 => 1,
            0b1100 => 2,
            0b1110 => 3,
            0b1111 => 4,
            _ => 0,
        }
    }
}

/// The three quantifier flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QuantifierKind {
    /// For all.
    Universal,
    /// There exists exactly one.
    Unique,
    /// There exists.
    Existential,
}

impl QuantifierKind {
    /// Decode a prefix-vector digit. The digit order is the strength order
    /// used everywhere in prefix generation: `0` is universal, `1` is
    /// unique, `2` is existential.
    pub fn from_index(i: usize) -> QuantifierKind {
        match i {
            0 => QuantifierKind::Universal,
            1 => QuantifierKind::Unique,
            2 => QuantifierKind::Existential,
            _ => panic!("quantifier index out of range: {i}"),
        }
    }
}

/// A quantifier node: flavor, bound variable, and for typed enumeration the
/// name of the type the variable ranges over.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Quantifier {
    /// The quantifier flavor.
    pub kind: QuantifierKind,
    /// The bound variable.
    pub var: Var,
    /// The bound variable's type, if the enumeration is typed.
    pub ty: Option<String>,
}

impl Quantifier {
    /// An untyped quantifier.
    pub fn new(kind: QuantifierKind, var: Var) -> Self {
        Quantifier {
            kind,
            var,
            ty: None,
        }
    }

    /// A typed quantifier.
    pub fn typed(kind: QuantifierKind, var: Var, ty: impl Into<String>) -> Self {
        Quantifier {
            kind,
            var,
            ty: Some(ty.into()),
        }
    }
}

/// A connective node. `Not` keeps its operand in the right child of the
/// enclosing tree; `Equals` is a leaf carrying its two variables.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Operator {
    /// Conjunction.
    And,
    /// Disjunction.
    Or,
    /// Material implication.
    Implies,
    /// Biconditional.
    Iff,
    /// Negation.
    Not,
    /// Equality of two variables.
    Equals(Var, Var),
}

impl Operator {
    /// Whether this connective takes two subtree operands.
    pub fn is_binary(&self) -> bool {
        !matches!(self, Operator::Not | Operator::Equals(_, _))
    }
}

/// An atomic formula: a relation applied to a variable tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Predicate {
    /// The relation this atom tests.
    pub relation: Arc<Relation>,
    /// The variable tuple, one entry per relation position.
    pub vars: Vec<Var>,
}

/// The payload of a formula tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FormulaNode {
    /// A quantifier; scope in the left child.
    Quantifier(Quantifier),
    /// A connective.
    Operator(Operator),
    /// An atom; a leaf.
    Predicate(Predicate),
}

/// A step on a path from a tree's root to one of its nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Descend into the left child.
    Left,
    /// Descend into the right child.
    Right,
}

/// A formula, as a binary tree over [`FormulaNode`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormulaTree {
    /// This node's payload.
    pub node: FormulaNode,
    /// Left child: a quantifier's scope, or a binary connective's first
    /// operand.
    pub left: Option<Box<FormulaTree>>,
    /// Right child: a binary connective's second operand, or a negation's
    /// operand.
    pub right: Option<Box<FormulaTree>>,
    /// The enumeration variables occurring anywhere in this tree.
    pub range: VarRange,
}

impl FormulaTree {
    /// An atom `R(vars...)`.
    pub fn predicate(relation: Arc<Relation>, vars: Vec<Var>) -> FormulaTree {
        let range = VarRange::of_tuple(&vars);
        FormulaTree {
            node: FormulaNode::Predicate(Predicate { relation, vars }),
            left: None,
            right: None,
            range,
        }
    }

    /// The equality leaf `(a = b)`.
    pub fn equals(a: Var, b: Var) -> FormulaTree {
        FormulaTree {
            node: FormulaNode::Operator(Operator::Equals(a, b)),
            left: None,
            right: None,
            range: VarRange::of_var(a).union(VarRange::of_var(b)),
        }
    }

    /// A binary connective applied to two operands.
    pub fn binary(op: Operator, left: FormulaTree, right: FormulaTree) -> FormulaTree {
        assert!(op.is_binary());
        let range = left.range.union(right.range);
        FormulaTree {
            node: FormulaNode::Operator(op),
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
            range,
        }
    }

    /// `left & right`.
    pub fn and(left: FormulaTree, right: FormulaTree) -> FormulaTree {
        FormulaTree::binary(Operator::And, left, right)
    }

    /// `left v right`.
    pub fn or(left: FormulaTree, right: FormulaTree) -> FormulaTree {
        FormulaTree::binary(Operator::Or, left, right)
    }

    /// `left ⊃ right`.
    pub fn implies(left: FormulaTree, right: FormulaTree) -> FormulaTree {
        FormulaTree::binary(Operator::Implies, left, right)
    }

    /// `left ≡ right`.
    pub fn iff(left: FormulaTree, right: FormulaTree) -> FormulaTree {
        FormulaTree::binary(Operator::Iff, left, right)
    }

    /// `¬operand`. The operand lives in the right child; the left child is
    /// always empty.
    pub fn not(operand: FormulaTree) -> FormulaTree {
        let range = operand.range;
        FormulaTree {
            node: FormulaNode::Operator(Operator::Not),
            left: None,
            right: Some(Box::new(operand)),
            range,
        }
    }

    /// A quantified formula; the scope lives in the left child.
    pub fn quantified(q: Quantifier, scope: FormulaTree) -> FormulaTree {
        let range = scope.range.union(VarRange::of_var(q.var));
        FormulaTree {
            node: FormulaNode::Quantifier(q),
            left: Some(Box::new(scope)),
            right: None,
            range,
        }
    }

    /// `∀var scope`.
    pub fn forall(var: Var, scope: FormulaTree) -> FormulaTree {
        FormulaTree::quantified(Quantifier::new(QuantifierKind::Universal, var), scope)
    }

    /// `∃var scope`.
    pub fn exists(var: Var, scope: FormulaTree) -> FormulaTree {
        FormulaTree::quantified(Quantifier::new(QuantifierKind::Existential, var), scope)
    }

    /// `∃!var scope`.
    pub fn unique(var: Var, scope: FormulaTree) -> FormulaTree {
        FormulaTree::quantified(Quantifier::new(QuantifierKind::Unique, var), scope)
    }

    /// The number of variables this tree's range covers, or zero for a
    /// gappy range. See [`VarRange::num_vars`].
    pub fn num_vars(&self) -> usize {
        self.range.num_vars()
    }

    /// Walk the chain of quantifiers at the root, returning the prefix and
    /// the first non-quantifier descendant (the matrix).
    pub fn prefix_chain(&self) -> (Vec<&Quantifier>, &FormulaTree) {
        let mut prefix = vec![];
        let mut current = self;
        while let FormulaNode::Quantifier(q) = &current.node {
            prefix.push(q);
            current = current
                .left
                .as_deref()
                .expect("quantifier node without a scope");
        }
        (prefix, current)
    }

    /// Whether any node in the tree is a uniqueness quantifier.
    pub fn has_unique(&self) -> bool {
        if let FormulaNode::Quantifier(q) = &self.node {
            if q.kind == QuantifierKind::Unique {
                return true;
            }
        }
        self.left.as_deref().map_or(false, FormulaTree::has_unique)
            || self.right.as_deref().map_or(false, FormulaTree::has_unique)
    }

    /// The free variables of the tree, in order of first occurrence.
    pub fn free_vars(&self) -> Vec<Var> {
        fn walk(tree: &FormulaTree, bound: &mut Vec<Var>, free: &mut Vec<Var>) {
            match &tree.node {
                FormulaNode::Quantifier(q) => {
                    bound.push(q.var);
                    if let Some(scope) = &tree.left {
                        walk(scope, bound, free);
                    }
                    bound.pop();
                }
                FormulaNode::Operator(Operator::Equals(a, b)) => {
                    for v in [*a, *b] {
                        if !bound.contains(&v) && !free.contains(&v) {
                            free.push(v);
                        }
                    }
                }
                FormulaNode::Operator(_) => {
                    if let Some(left) = &tree.left {
                        walk(left, bound, free);
                    }
                    if let Some(right) = &tree.right {
                        walk(right, bound, free);
                    }
                }
                FormulaNode::Predicate(p) => {
                    for &v in &p.vars {
                        if !bound.contains(&v) && !free.contains(&v) {
                            free.push(v);
                        }
                    }
                }
            }
        }
        let mut free = vec![];
        walk(self, &mut vec![], &mut free);
        free
    }

    /// Paths to every predicate leaf, with a flag marking leaves whose
    /// parent is a negation. Leaf order is a left-to-right preorder, which
    /// keeps growth enumeration deterministic.
    pub fn predicate_leaf_paths(&self) -> Vec<(Vec<Step>, bool)> {
        fn walk(
            tree: &FormulaTree,
            path: &mut Vec<Step>,
            under_not: bool,
            out: &mut Vec<(Vec<Step>, bool)>,
        ) {
            match &tree.node {
                FormulaNode::Predicate(_) => out.push((path.clone(), under_not)),
                FormulaNode::Operator(op) => {
                    let negation = matches!(op, Operator::Not);
                    if let Some(left) = &tree.left {
                        path.push(Step::Left);
                        walk(left, path, false, out);
                        path.pop();
                    }
                    if let Some(right) = &tree.right {
                        path.push(Step::Right);
                        walk(right, path, negation, out);
                        path.pop();
                    }
                }
                FormulaNode::Quantifier(_) => {
                    if let Some(scope) = &tree.left {
                        path.push(Step::Left);
                        walk(scope, path, false, out);
                        path.pop();
                    }
                }
            }
        }
        let mut out = vec![];
        walk(self, &mut vec![], false, &mut out);
        out
    }

    /// Build a copy of the tree with the subtree at `path` replaced.
    /// Ranges along the rebuilt spine are recomputed from the new leaves.
    pub fn replace_at(&self, path: &[Step], replacement: FormulaTree) -> FormulaTree {
        match path.split_first() {
            None => replacement,
            Some((step, rest)) => {
                let mut copy = self.clone();
                match step {
                    Step::Left => {
                        let child = copy.left.as_deref().expect("path descends into empty child");
                        copy.left = Some(Box::new(child.replace_at(rest, replacement)));
                    }
                    Step::Right => {
                        let child = copy
                            .right
                            .as_deref()
                            .expect("path descends into empty child");
                        copy.right = Some(Box::new(child.replace_at(rest, replacement)));
                    }
                }
                copy.update_range();
                copy
            }
        }
    }

    /// Recompute this node's range from its payload and children.
    pub fn update_range(&mut self) {
        let own = match &self.node {
            FormulaNode::Quantifier(q) => VarRange::of_var(q.var),
            FormulaNode::Operator(Operator::Equals(a, b)) => {
                VarRange::of_var(*a).union(VarRange::of_var(*b))
            }
            FormulaNode::Operator(_) => VarRange::EMPTY,
            FormulaNode::Predicate(p) => VarRange::of_tuple(&p.vars),
        };
        let left = self.left.as_deref().map_or(VarRange::EMPTY, |t| t.range);
        let right = self.right.as_deref().map_or(VarRange::EMPTY, |t| t.range);
        self.range = own.union(left).union(right);
    }
}

impl fmt::Display for FormulaTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", printer::display_text(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel(name: &str, arity: usize) -> Arc<Relation> {
        let mut r = Relation::new(name, arity);
        r.facts = vec![vec![0; arity]];
        Arc::new(r)
    }

    #[test]
    fn test_num_vars_contiguous_prefixes_only() {
        assert_eq!(VarRange(0b1000).num_vars(), 1);
        assert_eq!(VarRange(0b1100).num_vars(), 2);
        assert_eq!(VarRange(0b1110).num_vars(), 3);
        assert_eq!(VarRange(0b1111).num_vars(), 4);
        // gappy or headless combinations are invalid
        assert_eq!(VarRange(0b0100).num_vars(), 0);
        assert_eq!(VarRange(0b1010).num_vars(), 0);
        assert_eq!(VarRange(0b0111).num_vars(), 0);
        assert_eq!(VarRange(0b0000).num_vars(), 0);
    }

    #[test]
    fn test_range_construction() {
        let r = rel("R", 2);
        let tree = FormulaTree::implies(
            FormulaTree::predicate(r.clone(), vec!['x', 'y']),
            FormulaTree::predicate(r, vec!['y', 'x']),
        );
        assert_eq!(tree.range, VarRange(0b1100));
        assert_eq!(tree.num_vars(), 2);
    }

    #[test]
    fn test_fresh_var() {
        assert_eq!(fresh_var('x'), 't');
        assert_eq!(fresh_var('y'), 'u');
        assert_eq!(fresh_var('z'), 'v');
        assert_eq!(fresh_var('w'), 's');
    }

    #[test]
    fn test_fresh_vars_outside_range_alphabet() {
        let eq = FormulaTree::equals('x', 't');
        assert_eq!(eq.range, VarRange(0b1000));
    }

    #[test]
    fn test_prefix_chain() {
        let r = rel("R", 2);
        let body = FormulaTree::predicate(r, vec!['x', 'y']);
        let tree = FormulaTree::forall('x', FormulaTree::unique('y', body.clone()));
        let (prefix, matrix) = tree.prefix_chain();
        assert_eq!(prefix.len(), 2);
        assert_eq!(prefix[0].kind, QuantifierKind::Universal);
        assert_eq!(prefix[1].kind, QuantifierKind::Unique);
        assert_eq!(*matrix, body);
    }

    #[test]
    fn test_has_unique() {
        let r = rel("R", 1);
        let body = FormulaTree::predicate(r, vec!['x']);
        assert!(!FormulaTree::forall('x', body.clone()).has_unique());
        assert!(FormulaTree::unique('x', body.clone()).has_unique());
        // uniqueness below the root is found too
        let nested = FormulaTree::and(
            body.clone(),
            FormulaTree::not(FormulaTree::unique('x', body)),
        );
        assert!(nested.has_unique());
    }

    #[test]
    fn test_free_vars_first_occurrence_order() {
        let r = rel("R", 2);
        let tree = FormulaTree::or(
            FormulaTree::predicate(r.clone(), vec!['y', 'x']),
            FormulaTree::predicate(r, vec!['x', 'z']),
        );
        assert_eq!(tree.free_vars(), vec!['y', 'x', 'z']);
    }

    #[test]
    fn test_free_vars_skip_bound() {
        let r = rel("R", 2);
        let tree = FormulaTree::forall(
            'x',
            FormulaTree::predicate(r, vec!['x', 'y']),
        );
        assert_eq!(tree.free_vars(), vec!['y']);
    }

    #[test]
    fn test_replace_at_rebuilds_ranges() {
        let r = rel("R", 2);
        let s = rel("S", 1);
        let tree = FormulaTree::and(
            FormulaTree::predicate(r.clone(), vec!['x', 'y']),
            FormulaTree::predicate(r, vec!['x', 'x']),
        );
        let paths = tree.predicate_leaf_paths();
        assert_eq!(paths.len(), 2);
        let grown = tree.replace_at(&paths[1].0, FormulaTree::predicate(s, vec!['z']));
        assert_eq!(grown.range, VarRange(0b1110));
        // the original is untouched
        assert_eq!(tree.range, VarRange(0b1100));
    }

    #[test]
    fn test_leaf_paths_flag_negated_parents() {
        let r = rel("R", 1);
        let tree = FormulaTree::and(
            FormulaTree::predicate(r.clone(), vec!['x']),
            FormulaTree::not(FormulaTree::predicate(r, vec!['y'])),
        );
        let paths = tree.predicate_leaf_paths();
        assert_eq!(paths.len(), 2);
        assert!(!paths[0].1);
        assert!(paths[1].1);
    }
}
