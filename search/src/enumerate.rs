//! Matrix enumeration: the quantifier-free bodies candidates are built from.
//!
//! Size 0 is the bare predicates, size 1 the filtered two-predicate
//! connectives, and each further size grows the previous batch by splicing
//! a size-1 subtree over a predicate leaf. Bodies are deduplicated by their
//! display text, and only bodies whose variables form a contiguous prefix
//! of the canonical order are handed on for prefix attachment.

use crate::cancel::Canceler;
use crate::hashmap::HashMap;
use fol::spec::DomainSpec;
use fol::syntax::{FormulaNode, FormulaTree, Operator, VARS};
use fol::trivial::TrivialityTester;
use itertools::Itertools;

/// Enumerates candidate bodies over a domain, up to its size limit.
pub struct Enumerator<'a> {
    spec: &'a DomainSpec,
    tester: TrivialityTester,
}

impl<'a> Enumerator<'a> {
    /// An enumerator over the domain's relations and limits.
    pub fn new(spec: &'a DomainSpec) -> Self {
        Enumerator {
            spec,
            tester: TrivialityTester::new(spec.universe()),
        }
    }

    /// Every atom over the enumeration variables: each relation applied to
    /// each variable tuple, tuples in lexicographic order with the first
    /// position most significant.
    pub fn predicates(&self) -> Vec<FormulaTree> {
        let vars = &VARS[..self.spec.var_limit];
        let mut out = vec![];
        for r in &self.spec.relations {
            for tuple in (0..r.arity)
                .map(|_| vars.iter().copied())
                .multi_cartesian_product()
            {
                out.push(FormulaTree::predicate(r.clone(), tuple));
            }
        }
        out
    }

    /// Every size-1 body: binary connectives over predicate pairs, plus the
    /// negation of each predicate.
    ///
    /// The symmetric connectives take each unordered pair once; implication
    /// takes ordered pairs but skips consequents that never hold, since
    /// those implications only survive where the antecedent never holds
    /// either, and the triviality filter owns that case. Negations pass
    /// unfiltered.
    pub fn subtrees(&self, predicates: &[FormulaTree]) -> Vec<FormulaTree> {
        let mut out = vec![];
        for op in [
            Operator::And,
            Operator::Or,
            Operator::Implies,
            Operator::Iff,
            Operator::Not,
        ] {
            match op {
                Operator::And | Operator::Or | Operator::Iff => {
                    for i in 0..predicates.len() {
                        for j in i + 1..predicates.len() {
                            let tree = FormulaTree::binary(
                                op.clone(),
                                predicates[i].clone(),
                                predicates[j].clone(),
                            );
                            if !self.tester.is_trivial(&tree) {
                                out.push(tree);
                            }
                        }
                    }
                }
                Operator::Implies => {
                    for i in 0..predicates.len() {
                        for j in 0..predicates.len() {
                            if i == j || self.tester.always_false(&predicates[j]) {
                                continue;
                            }
                            let tree =
                                FormulaTree::implies(predicates[i].clone(), predicates[j].clone());
                            if !self.tester.is_trivial(&tree) {
                                out.push(tree);
                            }
                        }
                    }
                }
                Operator::Not => {
                    for p in predicates {
                        out.push(FormulaTree::not(p.clone()));
                    }
                }
                Operator::Equals(_, _) => unreachable!(),
            }
        }
        out
    }

    /// Grow each body by one connective: splice every size-1 subtree over
    /// every predicate leaf. A negation never replaces the operand of a
    /// negation. Returns `None` when canceled mid-batch.
    pub fn grow<C: Canceler>(
        &self,
        old_terms: &[FormulaTree],
        subtrees: &[FormulaTree],
        canceler: &C,
    ) -> Option<HashMap<String, FormulaTree>> {
        let mut out: HashMap<String, FormulaTree> = HashMap::default();
        for term in old_terms {
            if canceler.is_canceled() {
                return None;
            }
            for (path, under_not) in term.predicate_leaf_paths() {
                for subtree in subtrees {
                    if under_not && matches!(subtree.node, FormulaNode::Operator(Operator::Not)) {
                        continue;
                    }
                    let grown = term.replace_at(&path, subtree.clone());
                    out.entry(grown.to_string()).or_insert(grown);
                }
            }
        }
        Some(out)
    }

    /// Run the full size ladder, calling `expand` on every range-valid body
    /// in enumeration order. Returns `false` when canceled.
    pub fn run<C: Canceler>(&self, canceler: &C, mut expand: impl FnMut(&FormulaTree)) -> bool {
        let predicates = self.predicates();
        log::debug!("enumerated {} predicates", predicates.len());
        for p in &predicates {
            if p.num_vars() > 0 {
                expand(p);
            }
        }
        if self.spec.size_limit == 0 {
            return true;
        }
        if canceler.is_canceled() {
            return false;
        }
        let subtrees = self.subtrees(&predicates);
        log::debug!("enumerated {} size-1 bodies", subtrees.len());
        for t in &subtrees {
            if t.num_vars() > 0 {
                expand(t);
            }
        }
        let mut old_terms = subtrees.clone();
        for size in 2..=self.spec.size_limit {
            if canceler.is_canceled() {
                return false;
            }
            let Some(mut higher) = self.grow(&old_terms, &subtrees, canceler) else {
                return false;
            };
            higher.retain(|_, t| !self.tester.contains_trivial(t));
            log::debug!("size {size}: {} bodies after triviality sweep", higher.len());
            for t in higher.values() {
                if t.num_vars() > 0 {
                    expand(t);
                }
            }
            old_terms = higher.into_iter().map(|(_, t)| t).collect();
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::BasicCanceler;
    use fol::spec::Relation;
    use std::sync::Arc;

    fn swap_spec() -> DomainSpec {
        let mut r = Relation::new("R", 2);
        r.facts = vec![vec![0, 1], vec![1, 0]];
        DomainSpec {
            elements: vec!["a".to_string(), "b".to_string()],
            types: vec![],
            relations: vec![Arc::new(r)],
            var_limit: 2,
            size_limit: 0,
            chunk_size: 0,
            timeout: 3,
            filename: None,
        }
    }

    #[test]
    fn test_predicate_order() {
        let spec = swap_spec();
        let texts: Vec<String> = Enumerator::new(&spec)
            .predicates()
            .iter()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(texts, vec!["R(x,x)", "R(x,y)", "R(y,x)", "R(y,y)"]);
    }

    #[test]
    fn test_subtrees_triangles_and_filters() {
        let spec = swap_spec();
        let e = Enumerator::new(&spec);
        let predicates = e.predicates();
        let texts: Vec<String> = e
            .subtrees(&predicates)
            .iter()
            .map(|t| t.to_string())
            .collect();
        // the symmetric connectives take each pair once
        assert!(texts.contains(&"R(x,x) & R(x,y)".to_string()));
        assert!(!texts.contains(&"R(x,y) & R(x,x)".to_string()));
        // implication takes both orders
        assert!(texts.contains(&"R(x,y) ⊃ R(y,x)".to_string()));
        assert!(texts.contains(&"R(y,x) ⊃ R(x,y)".to_string()));
        // but never with a consequent that cannot hold
        assert!(!texts.contains(&"R(x,y) ⊃ R(x,x)".to_string()));
        // negations are unfiltered
        assert!(texts.contains(&"¬R(x,x)".to_string()));
        // the excluded-middle shape was filtered as trivial
        assert!(!texts.iter().any(|t| t.contains("R(x,y) v ¬R(x,y)")));
    }

    #[test]
    fn test_grow_dedupes_and_blocks_double_negation() {
        let spec = swap_spec();
        let e = Enumerator::new(&spec);
        let predicates = e.predicates();
        let subtrees = e.subtrees(&predicates);
        let never = BasicCanceler::new();
        let grown = e.grow(&subtrees, &subtrees, &never).unwrap();
        for text in grown.keys() {
            assert!(!text.contains("¬¬"), "double negation slipped through: {text}");
        }
        // keys are exactly the display texts
        for (text, tree) in &grown {
            assert_eq!(*text, tree.to_string());
        }
    }

    #[test]
    fn test_run_skips_gappy_ranges() {
        let spec = swap_spec();
        let e = Enumerator::new(&spec);
        let never = BasicCanceler::new();
        let mut seen = vec![];
        assert!(e.run(&never, |t| seen.push(t.to_string())));
        // R(y,y) uses y without x and is not a valid body
        assert_eq!(seen, vec!["R(x,x)", "R(x,y)", "R(y,x)"]);
    }

    #[test]
    fn test_run_honors_cancellation() {
        let mut spec = swap_spec();
        spec.size_limit = 2;
        let e = Enumerator::new(&spec);
        let canceled = BasicCanceler::new();
        canceled.cancel();
        let mut seen = 0;
        assert!(!e.run(&canceled, |_| seen += 1));
        // the predicate pass completes before the first poll
        assert_eq!(seen, 3);
    }
}
