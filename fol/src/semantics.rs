//! Evaluating formulas over a finite structure.
//!
//! Evaluation walks the tree with a persistent assignment of variables to
//! elements. Universal quantifiers short-circuit on the first falsifying
//! element and existentials on the first witness; uniqueness quantifiers
//! count every witness, since one early witness says nothing about whether
//! a second exists.

use crate::spec::Element;
use crate::syntax::{FormulaNode, FormulaTree, Operator, QuantifierKind, Var};

/// A partial map from variables to elements. Persistent, so extending it
/// under a quantifier never disturbs sibling branches.
pub type Assignment = im::HashMap<Var, Element>;

/// The truth value of a closed formula over a universe of the given size.
///
/// Typed trees are translated to untyped form before evaluation, so any
/// type annotation still present is ignored and the variable ranges over
/// the whole universe. Panics on malformed trees (a quantifier without a
/// scope, an unbound variable).
pub fn value(tree: &FormulaTree, universe: usize) -> bool {
    eval(tree, universe, &Assignment::new())
}

fn eval(tree: &FormulaTree, universe: usize, assignment: &Assignment) -> bool {
    match &tree.node {
        FormulaNode::Quantifier(q) => {
            let scope = tree.left.as_deref().expect("quantifier without a scope");
            let branch = |e: Element| eval(scope, universe, &assignment.update(q.var, e));
            match q.kind {
                QuantifierKind::Universal => (0..universe).all(branch),
                QuantifierKind::Existential => (0..universe).any(branch),
                QuantifierKind::Unique => (0..universe).filter(|&e| branch(e)).count() == 1,
            }
        }
        FormulaNode::Operator(op) => {
            let left = || {
                let t = tree.left.as_deref().expect("connective without operands");
                eval(t, universe, assignment)
            };
            let right = || {
                let t = tree.right.as_deref().expect("connective without operands");
                eval(t, universe, assignment)
            };
            match op {
                Operator::And => left() && right(),
                Operator::Or => left() || right(),
                Operator::Implies => !left() || right(),
                Operator::Iff => left() == right(),
                Operator::Not => !right(),
                Operator::Equals(a, b) => lookup(assignment, *a) == lookup(assignment, *b),
            }
        }
        FormulaNode::Predicate(p) => {
            let claim: Vec<Element> = p.vars.iter().map(|&v| lookup(assignment, v)).collect();
            p.relation.holds(&claim)
        }
    }
}

fn lookup(assignment: &Assignment, v: Var) -> Element {
    *assignment
        .get(&v)
        .unwrap_or_else(|| panic!("unbound variable {v}"))
}
