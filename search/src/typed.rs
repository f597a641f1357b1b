//! Enumeration over typed domains.
//!
//! Typed domains reuse the untyped body enumeration but replace the prefix
//! sweep: every quantifier-kind vector is crossed with every assignment of
//! declared types to the bound variables, ill-typed combinations are
//! rejected against the relations' constraints, and each survivor is
//! translated to an untyped formula whose quantifiers are guarded by the
//! synthesized unary type relations. There is no prefix pruning here; the
//! oracle pass absorbs the extra redundancy.

use crate::hashmap::HashMap;
use crate::prefixes::combinations;
use fol::semantics::value;
use fol::spec::{DomainSpec, Relation};
use fol::syntax::{
    FormulaNode, FormulaTree, Operator, Quantifier, QuantifierKind, Var, VARS,
};
use std::sync::Arc;

/// Builds, type-checks, and translates typed candidates over one domain.
pub struct TypedEnumerator<'a> {
    spec: &'a DomainSpec,
    untyped: DomainSpec,
    type_relations: Vec<Arc<Relation>>,
}

impl<'a> TypedEnumerator<'a> {
    /// Set up for a typed domain, precomputing the untyped translation.
    pub fn new(spec: &'a DomainSpec) -> Self {
        TypedEnumerator {
            untyped: spec.untyped(),
            type_relations: spec.type_relations(),
            spec,
        }
    }

    /// The untyped translation of the domain.
    pub fn untyped(&self) -> &DomainSpec {
        &self.untyped
    }

    fn type_relation(&self, name: &str) -> &Arc<Relation> {
        self.type_relations
            .iter()
            .find(|r| r.name == name)
            .expect("quantifier names an undeclared type")
    }

    /// The membership claims every typed search starts from: each type is
    /// nonempty (guaranteed by validation), and singleton types are claimed
    /// as such.
    pub fn seed_claims(&self) -> Vec<FormulaTree> {
        let universe = self.untyped.universe();
        let mut out = vec![];
        for r in &self.type_relations {
            out.push(FormulaTree::exists(
                'x',
                FormulaTree::predicate(r.clone(), vec!['x']),
            ));
            let singleton =
                FormulaTree::unique('x', FormulaTree::predicate(r.clone(), vec!['x']));
            if value(&singleton, universe) {
                out.push(singleton);
            }
        }
        out
    }

    /// All true, well-typed closures of a body: quantifier kinds crossed
    /// with type assignments, translated to untyped form.
    pub fn expand(&self, body: &FormulaTree) -> Vec<FormulaTree> {
        let n = body.num_vars();
        let universe = self.untyped.universe();
        let mut out = vec![];
        for kinds in combinations(n, 3) {
            for tys in combinations(n, self.spec.types.len()) {
                let typed = self.typed_prefix(&kinds, &tys, body);
                if !self.well_typed(&typed) {
                    continue;
                }
                let translated = self.translate(&typed);
                if value(&translated, universe) {
                    out.push(translated);
                }
            }
        }
        out
    }

    fn typed_prefix(&self, kinds: &[usize], tys: &[usize], body: &FormulaTree) -> FormulaTree {
        let mut tree = body.clone();
        for i in (0..kinds.len()).rev() {
            let q = Quantifier::typed(
                QuantifierKind::from_index(kinds[i]),
                VARS[i],
                self.spec.types[tys[i]].name.clone(),
            );
            tree = FormulaTree::quantified(q, tree);
        }
        tree
    }

    /// Check the matrix's atoms against the relations' typing constraints
    /// under the prefix's variable typing. Unconstrained relations accept
    /// anything, as does the wildcard position.
    pub fn well_typed(&self, tree: &FormulaTree) -> bool {
        let (prefix, matrix) = tree.prefix_chain();
        let types: HashMap<Var, &str> = prefix
            .iter()
            .filter_map(|q| q.ty.as_deref().map(|t| (q.var, t)))
            .collect();
        atoms_well_typed(matrix, &types)
    }

    /// Rewrite typed quantifiers into guarded untyped ones: a universal
    /// gets an implication from the type guard, the existentials a
    /// conjunction with it.
    pub fn translate(&self, tree: &FormulaTree) -> FormulaTree {
        match &tree.node {
            FormulaNode::Quantifier(q) => {
                let scope = self.translate(tree.left.as_deref().expect("quantifier without scope"));
                match &q.ty {
                    Some(ty) => {
                        let guard =
                            FormulaTree::predicate(self.type_relation(ty).clone(), vec![q.var]);
                        let body = match q.kind {
                            QuantifierKind::Universal => FormulaTree::implies(guard, scope),
                            QuantifierKind::Unique | QuantifierKind::Existential => {
                                FormulaTree::and(guard, scope)
                            }
                        };
                        FormulaTree::quantified(Quantifier::new(q.kind, q.var), body)
                    }
                    None => FormulaTree::quantified(q.clone(), scope),
                }
            }
            FormulaNode::Operator(Operator::Not) => FormulaTree::not(
                self.translate(tree.right.as_deref().expect("negation without operand")),
            ),
            FormulaNode::Operator(op) if op.is_binary() => FormulaTree::binary(
                op.clone(),
                self.translate(tree.left.as_deref().expect("binary operator without left operand")),
                self.translate(
                    tree.right
                        .as_deref()
                        .expect("binary operator without right operand"),
                ),
            ),
            // equality and predicate leaves are unchanged
            _ => tree.clone(),
        }
    }
}

fn atoms_well_typed(tree: &FormulaTree, types: &HashMap<Var, &str>) -> bool {
    match &tree.node {
        FormulaNode::Predicate(p) => match &p.relation.constraint {
            None => true,
            Some(constraint) => p
                .vars
                .iter()
                .zip(constraint)
                .all(|(v, position)| types.get(v).map_or(true, |t| position.matches(t))),
        },
        _ => {
            tree.left
                .as_deref()
                .map_or(true, |t| atoms_well_typed(t, types))
                && tree
                    .right
                    .as_deref()
                    .map_or(true, |t| atoms_well_typed(t, types))
        }
    }
}
