//! Well-known axiom schemas, instantiated per relation and checked against
//! the structure before enumeration begins.
//!
//! These shapes use more variables or deeper nesting than the enumerator
//! reaches at practical limits, so they are seeded directly: ternary
//! relations get the algebraic schemas (function-ness, associativity,
//! identities and inverses), binary relations get the order and
//! equivalence schemas. Only schemas that actually hold on the structure
//! are kept; the caller still applies the triviality sweep.

use fol::semantics::value;
use fol::spec::{DomainSpec, Relation};
use fol::syntax::FormulaTree;
use std::sync::Arc;

/// A named schema instance that holds on the structure.
#[derive(Debug, Clone)]
pub struct CommonAxiom {
    /// Human-readable schema name, mentioning the relation.
    pub label: String,
    /// The instantiated formula.
    pub tree: FormulaTree,
}

fn atom(r: &Arc<Relation>, vars: [char; 3]) -> FormulaTree {
    FormulaTree::predicate(r.clone(), vars.to_vec())
}

fn atom2(r: &Arc<Relation>, vars: [char; 2]) -> FormulaTree {
    FormulaTree::predicate(r.clone(), vars.to_vec())
}

/// ∀x∀y∃z∀w (P(x,y,w) ≡ (w = z)): every input pair has exactly one output.
fn is_a_function(r: &Arc<Relation>) -> FormulaTree {
    FormulaTree::forall(
        'x',
        FormulaTree::forall(
            'y',
            FormulaTree::exists(
                'z',
                FormulaTree::forall(
                    'w',
                    FormulaTree::iff(atom(r, ['x', 'y', 'w']), FormulaTree::equals('w', 'z')),
                ),
            ),
        ),
    )
}

/// ∀x∀y∀z∀u∀v∀w ((P(y,z,u) & P(x,y,v)) ⊃ (P(v,z,w) ≡ P(x,u,w))).
fn associativity(r: &Arc<Relation>) -> FormulaTree {
    let matrix = FormulaTree::implies(
        FormulaTree::and(atom(r, ['y', 'z', 'u']), atom(r, ['x', 'y', 'v'])),
        FormulaTree::iff(atom(r, ['v', 'z', 'w']), atom(r, ['x', 'u', 'w'])),
    );
    ['x', 'y', 'z', 'u', 'v', 'w']
        .iter()
        .rev()
        .fold(matrix, |scope, &v| FormulaTree::forall(v, scope))
}

/// ∀x∀y∀z (P(x,y,z) ≡ P(y,x,z)).
fn commutativity(r: &Arc<Relation>) -> FormulaTree {
    FormulaTree::forall(
        'x',
        FormulaTree::forall(
            'y',
            FormulaTree::forall(
                'z',
                FormulaTree::iff(atom(r, ['x', 'y', 'z']), atom(r, ['y', 'x', 'z'])),
            ),
        ),
    )
}

/// ∀x∀y∃z P(x,y,z).
fn closure(r: &Arc<Relation>) -> FormulaTree {
    FormulaTree::forall(
        'x',
        FormulaTree::forall('y', FormulaTree::exists('z', atom(r, ['x', 'y', 'z']))),
    )
}

/// ∃x∀y P(x,y,y).
fn left_identity(r: &Arc<Relation>) -> FormulaTree {
    FormulaTree::exists('x', FormulaTree::forall('y', atom(r, ['x', 'y', 'y'])))
}

/// ∃x∀y P(x,y,x).
fn right_identity(r: &Arc<Relation>) -> FormulaTree {
    FormulaTree::exists('x', FormulaTree::forall('y', atom(r, ['x', 'y', 'x'])))
}

/// ∃x∀y∃z (identity & inverse), for the given identity and inverse tuples.
fn identity_and_inverse(
    r: &Arc<Relation>,
    identity: [char; 3],
    inverse: [char; 3],
) -> FormulaTree {
    FormulaTree::exists(
        'x',
        FormulaTree::forall(
            'y',
            FormulaTree::exists('z', FormulaTree::and(atom(r, identity), atom(r, inverse))),
        ),
    )
}

/// ∀x∀y ((R(x,y) & R(y,x)) ⊃ (x = y)).
fn antisymmetry(r: &Arc<Relation>) -> FormulaTree {
    FormulaTree::forall(
        'x',
        FormulaTree::forall(
            'y',
            FormulaTree::implies(
                FormulaTree::and(atom2(r, ['x', 'y']), atom2(r, ['y', 'x'])),
                FormulaTree::equals('x', 'y'),
            ),
        ),
    )
}

/// ∀x∀y (R(x,y) ⊃ R(y,x)).
fn congruence(r: &Arc<Relation>) -> FormulaTree {
    FormulaTree::forall(
        'x',
        FormulaTree::forall(
            'y',
            FormulaTree::implies(atom2(r, ['x', 'y']), atom2(r, ['y', 'x'])),
        ),
    )
}

/// ∀x∀y∀z∀u∀v∀w (((R(x,y) ≡ R(z,u)) & (R(x,y) ≡ R(v,w))) ⊃ (R(z,u) ≡ R(v,w))).
fn transitivity_of_congruence(r: &Arc<Relation>) -> FormulaTree {
    let matrix = FormulaTree::implies(
        FormulaTree::and(
            FormulaTree::iff(atom2(r, ['x', 'y']), atom2(r, ['z', 'u'])),
            FormulaTree::iff(atom2(r, ['x', 'y']), atom2(r, ['v', 'w'])),
        ),
        FormulaTree::iff(atom2(r, ['z', 'u']), atom2(r, ['v', 'w'])),
    );
    ['x', 'y', 'z', 'u', 'v', 'w']
        .iter()
        .rev()
        .fold(matrix, |scope, &v| FormulaTree::forall(v, scope))
}

/// ∀x R(x,x).
fn reflexivity(r: &Arc<Relation>) -> FormulaTree {
    FormulaTree::forall('x', atom2(r, ['x', 'x']))
}

/// ∀x∀y (R(x,y) ≡ R(y,x)).
fn symmetry(r: &Arc<Relation>) -> FormulaTree {
    FormulaTree::forall(
        'x',
        FormulaTree::forall(
            'y',
            FormulaTree::iff(atom2(r, ['x', 'y']), atom2(r, ['y', 'x'])),
        ),
    )
}

/// ∀x∀y∀z ((R(x,y) & R(y,z)) ⊃ R(x,z)).
fn transitivity(r: &Arc<Relation>) -> FormulaTree {
    FormulaTree::forall(
        'x',
        FormulaTree::forall(
            'y',
            FormulaTree::forall(
                'z',
                FormulaTree::implies(
                    FormulaTree::and(atom2(r, ['x', 'y']), atom2(r, ['y', 'z'])),
                    atom2(r, ['x', 'z']),
                ),
            ),
        ),
    )
}

/// Instantiate every schema matching a relation's arity and keep the ones
/// that hold on the structure.
pub fn common_axioms(spec: &DomainSpec) -> Vec<CommonAxiom> {
    let universe = spec.universe();
    let mut candidates: Vec<(String, FormulaTree)> = vec![];
    for r in &spec.relations {
        if r.arity != 3 {
            continue;
        }
        let n = &r.name;
        candidates.push((format!("{n} represents a function"), is_a_function(r)));
        candidates.push((format!("associativity ({n})"), associativity(r)));
        candidates.push((format!("commutativity ({n})"), commutativity(r)));
        candidates.push((format!("closure ({n})"), closure(r)));
        candidates.push((format!("left identity ({n})"), left_identity(r)));
        candidates.push((format!("right identity ({n})"), right_identity(r)));
        candidates.push((
            format!("left identity, left inverse ({n})"),
            identity_and_inverse(r, ['x', 'y', 'y'], ['z', 'y', 'x']),
        ));
        candidates.push((
            format!("left identity, right inverse ({n})"),
            identity_and_inverse(r, ['x', 'y', 'y'], ['y', 'z', 'x']),
        ));
        candidates.push((
            format!("right identity, left inverse ({n})"),
            identity_and_inverse(r, ['y', 'x', 'y'], ['z', 'y', 'x']),
        ));
        candidates.push((
            format!("right identity, right inverse ({n})"),
            identity_and_inverse(r, ['y', 'x', 'y'], ['y', 'z', 'x']),
        ));
    }
    for r in &spec.relations {
        if r.arity != 2 {
            continue;
        }
        let n = &r.name;
        candidates.push((format!("antisymmetry ({n})"), antisymmetry(r)));
        candidates.push((format!("congruence ({n})"), congruence(r)));
        // six nested quantifiers; past a dozen elements this one check
        // costs more than the rest of generation combined
        if universe <= 12 {
            candidates.push((
                format!("transitivity of congruence({n})"),
                transitivity_of_congruence(r),
            ));
        }
    }
    for r in &spec.relations {
        if r.arity != 2 {
            continue;
        }
        let n = &r.name;
        candidates.push((format!("reflexivity ({n})"), reflexivity(r)));
        candidates.push((format!("symmetry ({n})"), symmetry(r)));
        candidates.push((format!("transitivity ({n})"), transitivity(r)));
    }
    candidates
        .into_iter()
        .filter(|(_, tree)| value(tree, universe))
        .map(|(label, tree)| CommonAxiom { label, tree })
        .collect()
}
