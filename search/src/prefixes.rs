//! Quantifier prefix enumeration and hand elimination.
//!
//! For a matrix with `n` variables there are `3^n` quantifier prefixes
//! (universal, unique-existential, or existential at each position). Hand
//! elimination sweeps them in lexicographic order and, whenever a prefix
//! yields a true formula, deactivates the prefixes it makes redundant, so
//! the strictly weaker variants never reach the oracles.

use fol::semantics::value;
use fol::syntax::{FormulaTree, Quantifier, QuantifierKind, VARS};
use itertools::Itertools;

/// All vectors of the given length over `0..alphabet`, in lexicographic
/// order with the first position most significant.
pub fn combinations(positions: usize, alphabet: usize) -> Vec<Vec<usize>> {
    (0..positions)
        .map(|_| 0..alphabet)
        .multi_cartesian_product()
        .collect()
}

/// One quantifier prefix in the sweep, with its activation bit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefix {
    /// Quantifier kind indices, position `i` binding `VARS[i]`.
    pub vector: Vec<usize>,
    /// Still a candidate? Cleared when a stronger prefix held.
    pub active: bool,
}

impl Prefix {
    fn new(vector: Vec<usize>) -> Self {
        Prefix {
            vector,
            active: true,
        }
    }
}

/// Attach the prefix to a copy of the matrix, innermost quantifier first.
pub fn attach_prefix(vector: &[usize], matrix: &FormulaTree) -> FormulaTree {
    let mut tree = matrix.clone();
    for (i, &kind) in vector.iter().enumerate().rev() {
        let q = Quantifier::new(QuantifierKind::from_index(kind), VARS[i]);
        tree = FormulaTree::quantified(q, tree);
    }
    tree
}

/// The prefixes made redundant by this one holding.
///
/// A prefix containing a unique-existential quantifier only subsumes
/// anything when that quantifier is leftmost, and then only the variant
/// with it weakened to a plain existential. A prefix free of them subsumes
/// every nonempty weakening of its universal positions to existentials.
/// This rule is deliberately conservative about uniqueness but is unsound
/// for mixed prefixes on some structures; the oracle pass downstream
/// catches what slips through.
pub fn redundant_prefixes(vector: &[usize]) -> Vec<Vec<usize>> {
    if vector.contains(&1) {
        if vector[0] == 1 {
            let mut weakened = vector.to_vec();
            weakened[0] = 2;
            return vec![weakened];
        }
        return vec![];
    }
    let universal_positions = vector.iter().positions(|&kind| kind == 0).collect_vec();
    let mut redundant = vec![];
    for swaps in combinations(universal_positions.len(), 2) {
        if swaps.iter().all(|&s| s == 0) {
            continue;
        }
        let mut weakened = vector.to_vec();
        for (swap, &position) in swaps.iter().zip(&universal_positions) {
            if *swap == 1 {
                weakened[position] = 2;
            }
        }
        redundant.push(weakened);
    }
    redundant
}

/// Sweep every prefix over the matrix, keeping the formulas that hold on
/// the structure and skipping prefixes already subsumed by an earlier hit.
pub fn hand_elimination_search(matrix: &FormulaTree, universe: usize) -> Vec<FormulaTree> {
    let n = matrix.num_vars();
    debug_assert!(n > 0, "hand elimination needs at least one variable");
    let mut prefixes = combinations(n, 3).into_iter().map(Prefix::new).collect_vec();
    let mut found = vec![];
    for i in 0..prefixes.len() {
        if !prefixes[i].active {
            continue;
        }
        let formula = attach_prefix(&prefixes[i].vector, matrix);
        if value(&formula, universe) {
            for weakened in redundant_prefixes(&prefixes[i].vector) {
                for prefix in prefixes.iter_mut() {
                    if prefix.vector == weakened {
                        prefix.active = false;
                    }
                }
            }
            found.push(formula);
        }
    }
    found
}
