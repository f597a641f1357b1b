//! Uniqueness elimination.
//!
//! External decision procedures speak plain first-order logic, so before a
//! formula is rendered for them every uniqueness quantifier is rewritten
//! using the equivalence `∃!x S  <->  ∃x ∀t (S[x≔t] ≡ (x = t))`, where `t`
//! is the fresh partner of `x` (see [`fresh_var`]).

use crate::syntax::{fresh_var, FormulaNode, FormulaTree, Operator, QuantifierKind, Var};

/// A variable renaming threaded through the rewrite. Persistent so each
/// branch of the tree sees exactly the renamings of its enclosing
/// uniqueness quantifiers.
type Substitution = im::HashMap<Var, Var>;

/// Rewrite away every uniqueness quantifier, returning an equivalent tree.
/// The input is not modified.
pub fn eliminate_unique(tree: &FormulaTree) -> FormulaTree {
    elim(tree, &Substitution::new())
}

fn elim(tree: &FormulaTree, subst: &Substitution) -> FormulaTree {
    match &tree.node {
        FormulaNode::Quantifier(q) if q.kind == QuantifierKind::Unique => {
            let old = q.var;
            let new = fresh_var(old);
            let scope = tree
                .left
                .as_deref()
                .expect("uniqueness quantifier without a scope");
            // the scope is copied with old renamed to the fresh variable,
            // while the equality re-uses the original name bound by the
            // outer existential
            let renamed = elim(scope, &subst.update(old, new));
            let body = FormulaTree::iff(renamed, FormulaTree::equals(old, new));
            FormulaTree::exists(old, FormulaTree::forall(new, body))
        }
        FormulaNode::Quantifier(q) => {
            let scope = tree.left.as_deref().expect("quantifier without a scope");
            FormulaTree::quantified(q.clone(), elim(scope, subst))
        }
        FormulaNode::Operator(Operator::Not) => {
            let operand = tree.right.as_deref().expect("negation without an operand");
            FormulaTree::not(elim(operand, subst))
        }
        // equality leaves are copied as-is; they are only ever introduced
        // by this rewrite or by schema instantiation, never under a
        // uniqueness quantifier
        FormulaNode::Operator(Operator::Equals(a, b)) => FormulaTree::equals(*a, *b),
        FormulaNode::Operator(op) => {
            let left = tree.left.as_deref().expect("connective without operands");
            let right = tree.right.as_deref().expect("connective without operands");
            FormulaTree::binary(op.clone(), elim(left, subst), elim(right, subst))
        }
        FormulaNode::Predicate(p) => {
            let vars = p
                .vars
                .iter()
                .map(|v| *subst.get(v).unwrap_or(v))
                .collect();
            FormulaTree::predicate(p.relation.clone(), vars)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantics::value;
    use crate::spec::Relation;
    use std::sync::Arc;

    fn rel(name: &str, facts: Vec<Vec<usize>>) -> Arc<Relation> {
        let arity = facts[0].len();
        let mut r = Relation::new(name, arity);
        r.facts = facts;
        Arc::new(r)
    }

    #[test]
    fn test_shape_of_rewritten_tree() {
        let r = rel("R", vec![vec![0, 0]]);
        let tree = FormulaTree::unique('x', FormulaTree::predicate(r, vec!['x', 'x']));
        let rewritten = eliminate_unique(&tree);
        assert!(!rewritten.has_unique());
        assert_eq!(format!("{rewritten}"), "∃x∀t R(t,t) ≡ (x = t)");
    }

    #[test]
    fn test_scope_is_renamed_equality_is_not() {
        let r = rel("R", vec![vec![0, 1]]);
        let tree = FormulaTree::forall(
            'x',
            FormulaTree::unique('y', FormulaTree::predicate(r, vec!['x', 'y'])),
        );
        let rewritten = eliminate_unique(&tree);
        assert_eq!(format!("{rewritten}"), "∀x∃y∀u R(x,u) ≡ (y = u)");
    }

    #[test]
    fn test_untouched_trees_copy_cleanly() {
        let r = rel("R", vec![vec![0, 1]]);
        let tree = FormulaTree::forall(
            'x',
            FormulaTree::not(FormulaTree::predicate(r, vec!['x', 'x'])),
        );
        assert_eq!(eliminate_unique(&tree), tree);
    }

    // the rewrite must preserve truth values over any finite structure
    #[test]
    fn test_equivalence_on_small_structures() {
        let tables = [
            vec![vec![0, 0]],
            vec![vec![0, 1], vec![1, 0]],
            vec![vec![0, 0], vec![1, 1]],
            vec![vec![0, 1], vec![1, 1], vec![0, 0]],
        ];
        for facts in tables {
            for universe in [1, 2, 3] {
                let r = rel("R", facts.clone());
                let candidates = [
                    FormulaTree::unique('x', FormulaTree::predicate(r.clone(), vec!['x', 'x'])),
                    FormulaTree::unique(
                        'x',
                        FormulaTree::exists('y', FormulaTree::predicate(r.clone(), vec!['x', 'y'])),
                    ),
                    FormulaTree::forall(
                        'x',
                        FormulaTree::unique('y', FormulaTree::predicate(r.clone(), vec!['x', 'y'])),
                    ),
                    FormulaTree::unique(
                        'x',
                        FormulaTree::unique('y', FormulaTree::predicate(r.clone(), vec!['y', 'x'])),
                    ),
                ];
                for tree in candidates {
                    let rewritten = eliminate_unique(&tree);
                    assert_eq!(
                        value(&tree, universe),
                        value(&rewritten, universe),
                        "disagreement on {tree} over universe of {universe}"
                    );
                }
            }
        }
    }

    // the same check over a spread of generated relations on larger
    // domains, where a uniqueness count of exactly one is easier to miss
    #[test]
    fn test_equivalence_across_generated_structures() {
        for universe in 1..=6 {
            for seed in 0..4 {
                let facts: Vec<Vec<usize>> = (0..universe)
                    .flat_map(|a| (0..universe).map(move |b| vec![a, b]))
                    .filter(|pair| (pair[0] * 3 + pair[1] * 5 + seed) % 4 < 2)
                    .collect();
                if facts.is_empty() {
                    continue;
                }
                let r = rel("R", facts);
                let candidates = [
                    FormulaTree::unique('x', FormulaTree::predicate(r.clone(), vec!['x', 'x'])),
                    FormulaTree::unique(
                        'x',
                        FormulaTree::exists('y', FormulaTree::predicate(r.clone(), vec!['x', 'y'])),
                    ),
                    FormulaTree::forall(
                        'x',
                        FormulaTree::unique('y', FormulaTree::predicate(r.clone(), vec!['x', 'y'])),
                    ),
                    FormulaTree::not(FormulaTree::unique(
                        'x',
                        FormulaTree::predicate(r.clone(), vec!['x', 'x']),
                    )),
                    FormulaTree::unique(
                        'x',
                        FormulaTree::unique('y', FormulaTree::predicate(r.clone(), vec!['y', 'x'])),
                    ),
                ];
                for tree in candidates {
                    let rewritten = eliminate_unique(&tree);
                    assert!(!rewritten.has_unique());
                    assert_eq!(
                        value(&tree, universe),
                        value(&rewritten, universe),
                        "disagreement on {tree} over universe of {universe}"
                    );
                }
            }
        }
    }
}
