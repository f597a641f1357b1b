//! One axiom search from generation through verification.
//!
//! A [`SearchSession`] owns the candidate pool, the growing minimal set,
//! the oracle outcome tallies, and the phase timings. Repeated passes seed
//! the pool from the previous pass's minimal set.

use crate::cancel::Canceler;
use crate::common::common_axioms;
use crate::enumerate::Enumerator;
use crate::hashmap::{HashMap, HashSet};
use crate::prefixes::hand_elimination_search;
use crate::typed::TypedEnumerator;
use fol::spec::DomainSpec;
use fol::syntax::FormulaTree;
use fol::trivial::TrivialityTester;
use prover::outcome::OracleOutcome;
use serde::Serialize;
use std::fmt::Write;
use std::time::{Duration, Instant};

/// One candidate axiom in the pool.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateAxiom {
    /// The formula.
    pub tree: FormulaTree,
    /// Its display text, also its pool key.
    pub text: String,
    /// Cleared once something proved this candidate redundant.
    pub active: bool,
    /// The schema name, for candidates seeded from the common library.
    pub label: Option<String>,
}

/// The candidate pool, keyed by display text in generation order.
pub type FormulaPool = HashMap<String, CandidateAxiom>;

/// Tallies of every oracle race outcome in a verification pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounters {
    /// Races the prover won with a proof.
    pub proofs_found: usize,
    /// Races where the prover exhausted its search without a proof.
    pub no_proofs_found: usize,
    /// Races where the prover ran out of time.
    pub prover_timeouts: usize,
    /// Races the prover rejected its input in.
    pub prover_input_errors: usize,
    /// Races the prover crashed in.
    pub prover_process_errors: usize,
    /// Races the prover ended in an unrecognized way.
    pub prover_other: usize,
    /// Races the model finder won with a counterexample.
    pub counterexamples_found: usize,
    /// Races where the model finder exhausted its search without a model.
    pub no_models_found: usize,
    /// Races where the model finder ran out of time.
    pub model_finder_timeouts: usize,
    /// Races the model finder ended in an unrecognized way.
    pub model_finder_other: usize,
}

impl OutcomeCounters {
    /// Tally one race outcome.
    pub fn record(&mut self, outcome: OracleOutcome) {
        match outcome {
            OracleOutcome::ProofFound => self.proofs_found += 1,
            OracleOutcome::NoProofFound => self.no_proofs_found += 1,
            OracleOutcome::ProverTimeout => self.prover_timeouts += 1,
            OracleOutcome::ProverInputError => self.prover_input_errors += 1,
            OracleOutcome::ProverProcessError => self.prover_process_errors += 1,
            OracleOutcome::ProverOther => self.prover_other += 1,
            OracleOutcome::CounterexampleFound => self.counterexamples_found += 1,
            OracleOutcome::NoModelFound => self.no_models_found += 1,
            OracleOutcome::ModelFinderTimeout => self.model_finder_timeouts += 1,
            OracleOutcome::ModelFinderOther => self.model_finder_other += 1,
        }
    }

    /// Number of races tallied.
    pub fn total(&self) -> usize {
        self.proofs_found
            + self.no_proofs_found
            + self.prover_timeouts
            + self.prover_input_errors
            + self.prover_process_errors
            + self.prover_other
            + self.counterexamples_found
            + self.no_models_found
            + self.model_finder_timeouts
            + self.model_finder_other
    }
}

/// The full state of one search over a domain.
pub struct SearchSession {
    /// The domain being searched.
    pub spec: DomainSpec,
    /// Candidates, in generation order.
    pub pool: FormulaPool,
    /// Keys of candidates the oracles could not prove redundant.
    pub minimal: HashSet<String>,
    /// Oracle outcome tallies for the current pass.
    pub counters: OutcomeCounters,
    /// Total time spent generating candidates.
    pub generation_time: Duration,
    /// Total time spent in oracle races.
    pub verification_time: Duration,
}

impl SearchSession {
    /// A fresh session over a validated domain.
    pub fn new(spec: DomainSpec) -> Self {
        SearchSession {
            spec,
            pool: FormulaPool::default(),
            minimal: HashSet::default(),
            counters: OutcomeCounters::default(),
            generation_time: Duration::ZERO,
            verification_time: Duration::ZERO,
        }
    }

    fn insert(pool: &mut FormulaPool, tree: FormulaTree, label: Option<String>) {
        let text = tree.to_string();
        pool.entry(text.clone()).or_insert(CandidateAxiom {
            tree,
            text,
            active: true,
            label,
        });
    }

    /// Fill the pool: common schemas first when enabled, then the
    /// enumerated candidates, then a final triviality sweep over
    /// everything. Returns `false` when canceled partway.
    pub fn generate<C: Canceler>(&mut self, search_common: bool, canceler: &C) -> bool {
        let started = Instant::now();
        let completed = if self.spec.has_types() {
            self.generate_typed(search_common, canceler)
        } else {
            self.generate_untyped(search_common, canceler)
        };
        let tester = TrivialityTester::new(self.spec.universe());
        self.pool.retain(|_, c| !tester.contains_trivial(&c.tree));
        self.generation_time += started.elapsed();
        log::info!(
            "generated {} candidates in {:.2?}",
            self.pool.len(),
            started.elapsed()
        );
        completed
    }

    fn generate_untyped<C: Canceler>(&mut self, search_common: bool, canceler: &C) -> bool {
        let spec = self.spec.clone();
        if search_common {
            for axiom in common_axioms(&spec) {
                Self::insert(&mut self.pool, axiom.tree, Some(axiom.label));
            }
        }
        let universe = spec.universe();
        let pool = &mut self.pool;
        Enumerator::new(&spec).run(canceler, |body| {
            for formula in hand_elimination_search(body, universe) {
                Self::insert(pool, formula, None);
            }
        })
    }

    fn generate_typed<C: Canceler>(&mut self, search_common: bool, canceler: &C) -> bool {
        let spec = self.spec.clone();
        let typed = TypedEnumerator::new(&spec);
        for claim in typed.seed_claims() {
            Self::insert(&mut self.pool, claim, None);
        }
        if search_common {
            for axiom in common_axioms(typed.untyped()) {
                Self::insert(&mut self.pool, axiom.tree, Some(axiom.label));
            }
        }
        let pool = &mut self.pool;
        Enumerator::new(&spec).run(canceler, |body| {
            for formula in typed.expand(body) {
                Self::insert(pool, formula, None);
            }
        })
    }

    /// Number of candidates not yet proved redundant.
    pub fn active_count(&self) -> usize {
        self.pool.values().filter(|c| c.active).count()
    }

    /// The minimal set, in pool order.
    pub fn minimal_axioms(&self) -> Vec<&CandidateAxiom> {
        self.pool
            .values()
            .filter(|c| self.minimal.contains(&c.text))
            .collect()
    }

    /// Shrink the pool to the minimal set and reset per-pass state, ready
    /// for another verification pass over just the survivors.
    pub fn seed_next_pass(&mut self) {
        let minimal = std::mem::take(&mut self.minimal);
        self.pool.retain(|key, _| minimal.contains(key));
        for c in self.pool.values_mut() {
            c.active = true;
        }
        self.counters = OutcomeCounters::default();
    }

    /// A human-readable summary of the session's result.
    pub fn report(&self) -> String {
        let mut out = String::new();
        if let Some(name) = &self.spec.filename {
            let _ = writeln!(out, "domain: {name}");
        }
        let minimal = self.minimal_axioms();
        let _ = writeln!(out, "minimal axiom set ({} axioms):", minimal.len());
        for c in minimal {
            match &c.label {
                Some(label) => {
                    let _ = writeln!(out, "  {}    [{label}]", c.text);
                }
                None => {
                    let _ = writeln!(out, "  {}", c.text);
                }
            }
        }
        let n = &self.counters;
        let _ = writeln!(out, "oracle races: {}", n.total());
        let _ = writeln!(out, "  proofs found: {}", n.proofs_found);
        let _ = writeln!(out, "  no proof found: {}", n.no_proofs_found);
        let _ = writeln!(out, "  prover timeouts: {}", n.prover_timeouts);
        let _ = writeln!(out, "  prover input errors: {}", n.prover_input_errors);
        let _ = writeln!(out, "  prover process errors: {}", n.prover_process_errors);
        let _ = writeln!(out, "  prover other: {}", n.prover_other);
        let _ = writeln!(out, "  counterexamples found: {}", n.counterexamples_found);
        let _ = writeln!(out, "  no model found: {}", n.no_models_found);
        let _ = writeln!(out, "  model finder timeouts: {}", n.model_finder_timeouts);
        let _ = writeln!(out, "  model finder other: {}", n.model_finder_other);
        let _ = writeln!(out, "generation time: {:.2?}", self.generation_time);
        let _ = writeln!(out, "verification time: {:.2?}", self.verification_time);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::BasicCanceler;
    use fol::spec::{Relation, TypeDecl};
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
    fn test_generation_over_swap_structure() {
        let mut session = SearchSession::new(swap_spec());
        assert!(session.generate(false, &BasicCanceler::new()));
        let keys: Vec<&String> = session.pool.keys().collect();
        assert_eq!(
            keys,
            vec![
                "∀x∃!y R(x,y)",
                "∀x∃y R(x,y)",
                "∃x∃!y R(x,y)",
                "∀x∃!y R(y,x)",
                "∀x∃y R(y,x)",
                "∃x∃!y R(y,x)",
            ]
        );
        assert_eq!(session.active_count(), 6);
    }

    #[test]
    fn test_common_schemas_precede_enumeration() {
        let mut session = SearchSession::new(swap_spec());
        assert!(session.generate(true, &BasicCanceler::new()));
        let first = session.pool.values().next().unwrap();
        assert!(first.label.is_some());
        // the swap relation is symmetric but not reflexive
        let labels: Vec<&str> = session
            .pool
            .values()
            .filter_map(|c| c.label.as_deref())
            .collect();
        assert!(labels.contains(&"symmetry (R)"));
        assert!(labels.contains(&"congruence (R)"));
        assert!(!labels.contains(&"reflexivity (R)"));
        assert!(!labels.contains(&"antisymmetry (R)"));
    }

    #[test]
    fn test_typed_generation_seeds_membership_claims() {
        let mut on = Relation::new("On", 2);
        on.facts = vec![vec![0, 2], vec![1, 2]];
        let spec = DomainSpec {
            elements: vec![],
            types: vec![
                TypeDecl {
                    name: "Point".to_string(),
                    elements: vec!["p1".to_string(), "p2".to_string()],
                },
                TypeDecl {
                    name: "Line".to_string(),
                    elements: vec!["l1".to_string()],
                },
            ],
            relations: vec![Arc::new(on)],
            var_limit: 2,
            size_limit: 0,
            chunk_size: 0,
            timeout: 3,
            filename: None,
        };
        let mut session = SearchSession::new(spec);
        assert!(session.generate(false, &BasicCanceler::new()));
        let keys: Vec<&String> = session.pool.keys().collect();
        assert_eq!(keys[0], "∃x Point(x)");
        assert_eq!(keys[1], "∃x Line(x)");
        assert_eq!(keys[2], "∃!x Line(x)");
        // everything after the seeds is an untyped translation
        assert!(keys[3..].iter().all(|k| k.contains("Point(x)")
            || k.contains("Line(")
            || k.contains("Point(")));
    }

    #[test]
    fn test_seed_next_pass_keeps_only_minimal() {
        let mut session = SearchSession::new(swap_spec());
        assert!(session.generate(false, &BasicCanceler::new()));
        let keep = session.pool.keys().nth(1).unwrap().clone();
        if let Some(c) = session.pool.get_mut(&keep) {
            c.active = false;
        }
        session.minimal.insert(keep.clone());
        session.counters.record(OracleOutcome::ProofFound);
        session.seed_next_pass();
        assert_eq!(session.pool.len(), 1);
        assert!(session.pool.contains_key(&keep));
        assert_eq!(session.active_count(), 1);
        assert_eq!(session.counters, OutcomeCounters::default());
    }

    #[test]
    fn test_counters_record_and_total() {
        let mut counters = OutcomeCounters::default();
        counters.record(OracleOutcome::ProofFound);
        counters.record(OracleOutcome::ProofFound);
        counters.record(OracleOutcome::ModelFinderTimeout);
        counters.record(OracleOutcome::CounterexampleFound);
        assert_eq!(counters.proofs_found, 2);
        assert_eq!(counters.model_finder_timeouts, 1);
        assert_eq!(counters.counterexamples_found, 1);
        assert_eq!(counters.total(), 4);
    }

    #[test]
    fn test_report_lists_minimal_set() {
        let mut session = SearchSession::new(swap_spec());
        assert!(session.generate(false, &BasicCanceler::new()));
        for key in session.pool.keys().cloned().collect::<Vec<_>>() {
            session.minimal.insert(key);
        }
        let report = session.report();
        assert!(report.contains("minimal axiom set (6 axioms):"));
        assert!(report.contains("∀x∃y R(x,y)"));
    }
}
