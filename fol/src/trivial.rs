//! Filtering trivially-true formula shapes.
//!
//! The enumerator produces plenty of formulas that are true for
//! uninteresting structural reasons: implications from impossible
//! antecedents, disjunctions with a vacuous disjunct, and so on. These are
//! filtered by shape before any oracle time is spent on them. "Always
//! false" and "always true" are judged over the structure at hand, by
//! universally closing the subformula's free variables and evaluating it.

use crate::semantics::value;
use crate::syntax::{FormulaNode, FormulaTree, Operator, Var};

/// Shape-based triviality checks over a fixed universe size.
pub struct TrivialityTester {
    universe: usize,
}

impl TrivialityTester {
    /// A tester judging "always" against a universe of the given size.
    pub fn new(universe: usize) -> Self {
        TrivialityTester { universe }
    }

    /// Whether the formula, or any of its subformulas, is trivial.
    pub fn contains_trivial(&self, f: &FormulaTree) -> bool {
        if let FormulaNode::Operator(Operator::Implies | Operator::Or | Operator::Iff) = &f.node {
            if self.is_trivial(f) {
                return true;
            }
        }
        f.left
            .as_deref()
            .map_or(false, |left| self.contains_trivial(left))
            || f.right
                .as_deref()
                .map_or(false, |right| self.contains_trivial(right))
    }

    /// Whether the formula's root is one of the trivial shapes.
    pub fn is_trivial(&self, f: &FormulaTree) -> bool {
        match &f.node {
            FormulaNode::Operator(Operator::Implies) => self.trivial_implication(f),
            FormulaNode::Operator(Operator::Or) => self.trivial_disjunction(f),
            FormulaNode::Operator(Operator::Iff) => self.trivial_biconditional(f),
            _ => false,
        }
    }

    // A ⊃ (B ⊃ A), an impossible antecedent, or an unavoidable consequent.
    fn trivial_implication(&self, f: &FormulaTree) -> bool {
        let antecedent = f.left.as_deref().expect("implication without operands");
        let consequent = f.right.as_deref().expect("implication without operands");

        if let FormulaNode::Operator(Operator::Implies) = &consequent.node {
            let tail = consequent
                .right
                .as_deref()
                .expect("implication without operands");
            if antecedent.to_string() == tail.to_string() {
                return true;
            }
        }
        self.always_false(antecedent) || self.always_true(consequent)
    }

    // A v ¬A, or a disjunct that can never hold.
    fn trivial_disjunction(&self, f: &FormulaTree) -> bool {
        let left = f.left.as_deref().expect("disjunction without operands");
        let right = f.right.as_deref().expect("disjunction without operands");
        if self.always_false(left) || self.always_false(right) {
            return true;
        }
        let left_text = left.to_string();
        let right_text = right.to_string();
        left_text == format!("¬{right_text}") || right_text == format!("¬{left_text}")
    }

    // A ≡ A, or a biconditional between two impossibilities. Atomic cases
    // never reach here (the enumerator skips them), but composite ones do.
    fn trivial_biconditional(&self, f: &FormulaTree) -> bool {
        let left = f.left.as_deref().expect("biconditional without operands");
        let right = f.right.as_deref().expect("biconditional without operands");
        if left.to_string() == right.to_string() {
            return true;
        }
        self.always_false(left) && self.always_false(right)
    }

    /// Whether `f` can never hold: the universal closure of `¬f` is true.
    pub fn always_false(&self, f: &FormulaTree) -> bool {
        let closed = close(FormulaTree::not(f.clone()), &f.free_vars());
        value(&closed, self.universe)
    }

    /// Whether `f` cannot fail to hold: its universal closure is true.
    /// An equality between distinct variables never qualifies unless the
    /// universe has a single element.
    pub fn always_true(&self, f: &FormulaTree) -> bool {
        if let FormulaNode::Operator(Operator::Equals(_, _)) = &f.node {
            if self.universe > 1 {
                return false;
            }
        }
        let closed = close(f.clone(), &f.free_vars());
        value(&closed, self.universe)
    }
}

// Universally bind the given variables around a formula. This is a
// judgment harness, not an enumerated term, so the contiguous-range rule
// does not apply.
fn close(f: FormulaTree, vars: &[Var]) -> FormulaTree {
    vars.iter().rev().fold(f, |t, &v| FormulaTree::forall(v, t))
}
