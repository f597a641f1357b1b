//! The oracle verification pass.
//!
//! Candidates are visited newest first. For each one, every other active
//! candidate (or a window of them, when chunking) becomes a premise, and
//! the prover and model finder race over the shared input file: the first
//! definitive answer wins and the loser is killed. A proof or an exhausted
//! model search marks the candidate redundant; every other outcome keeps
//! it in the minimal set.

use crate::cancel::{Canceler, MultiCanceler, OracleCancelers};
use crate::session::SearchSession;
use fol::printer::oracle_text;
use prover::artifact::write_artifact;
use prover::conf::OracleConf;
use prover::outcome::{OracleOutcome, OracleRole};
use prover::proc::{OracleError, OracleProc};
use std::fs::File;
use std::sync::mpsc;
use std::thread;
use std::time::Instant;
use thiserror::Error;

/// Errors that abort a verification pass.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The oracle input file could not be written.
    #[error("failed to write oracle input file: {0}")]
    Artifact(#[from] std::io::Error),
    /// An oracle process could not be managed.
    #[error(transparent)]
    Oracle(#[from] OracleError),
}

/// Settings for a verification pass.
#[derive(Debug, Clone)]
pub struct VerifyConfig {
    /// The oracle commands and their shared input file.
    pub oracle: OracleConf,
    /// Time budget per race, in seconds.
    pub timeout: u64,
    /// Premise window size; 0 gives every candidate the full premise set.
    pub chunk_size: usize,
}

/// The inclusive range of pool indices whose active candidates serve as
/// premises for the candidate at `idx`, for a window of roughly `chunk`
/// premises. The window is centered when it fits and clamped to the pool's
/// edge when it does not.
pub fn premise_window(num: usize, idx: usize, chunk: usize) -> (usize, usize) {
    debug_assert!(num > 0 && idx < num);
    if chunk >= num {
        return (0, num - 1);
    }
    let half = chunk / 2;
    let fits_upper = idx >= half;
    let fits_lower = idx + half + 1 <= num;
    if fits_upper && fits_lower {
        (idx - half, idx + half)
    } else if !fits_upper {
        (0, chunk)
    } else {
        (num - chunk - 1, num - 1)
    }
}

/// Race the two oracles over the current input file.
///
/// A launch failure on either side is an outcome, not an error: the race
/// is abandoned and the candidate under test stays put. The pids of both
/// children are registered on the canceler, grouped per race, so a session
/// cancel reaches them while the race runs and cannot signal them after it
/// resolves (their pids may be reassigned).
pub fn race(
    conf: &OracleConf,
    canceler: &MultiCanceler<OracleCancelers>,
) -> Result<OracleOutcome, VerifyError> {
    let prover = match OracleProc::start(&conf.prover, OracleRole::Prover) {
        Ok(proc) => proc,
        Err(err) => {
            log::warn!("failed to launch prover: {err}");
            return Ok(OracleOutcome::ProverProcessError);
        }
    };
    let finder = match OracleProc::start(&conf.model_finder, OracleRole::ModelFinder) {
        Ok(proc) => proc,
        Err(err) => {
            log::warn!("failed to launch model finder: {err}");
            prover.pid().kill()?;
            return Ok(OracleOutcome::ModelFinderOther);
        }
    };
    let prover_pid = prover.pid();
    let finder_pid = finder.pid();
    let pids = OracleCancelers::new();
    pids.add_canceler(prover_pid);
    pids.add_canceler(finder_pid);
    canceler.add_canceler(pids.clone());

    let (tx, rx) = mpsc::channel();
    let result = thread::scope(|s| {
        let prover_tx = tx.clone();
        s.spawn(move || {
            let _ = prover_tx.send((OracleRole::Prover, prover.finish()));
        });
        s.spawn(move || {
            let _ = tx.send((OracleRole::ModelFinder, finder.finish()));
        });

        let (first_role, first) = rx.recv().expect("oracle thread hung up");
        let first = first?;
        if !first.is_timeout() {
            // a definitive answer: the other side's work is moot
            match first_role {
                OracleRole::Prover => finder_pid.kill()?,
                OracleRole::ModelFinder => prover_pid.kill()?,
            }
            let _ = rx.recv();
            return Ok(first);
        }
        // one side timed out; the other may still answer
        let (_, second) = rx.recv().expect("oracle thread hung up");
        let second = second?;
        if second.is_timeout() {
            // both budgets exhausted; report the prover's timeout
            return Ok(OracleOutcome::ProverTimeout);
        }
        Ok(second)
    });
    pids.release();
    result
}

/// Run one verification pass over the session's pool, newest candidate
/// first. Returns `Ok(false)` when canceled partway; an interrupted pass
/// is discarded wholesale, leaving the pool, minimal set, and counters as
/// they were when the pass began.
pub fn verify_pass(
    session: &mut SearchSession,
    conf: &VerifyConfig,
    canceler: &MultiCanceler<OracleCancelers>,
) -> Result<bool, VerifyError> {
    let started = Instant::now();
    let keys: Vec<String> = session.pool.keys().cloned().collect();
    let num = keys.len();
    let counters_before = session.counters.clone();
    let minimal_before = session.minimal.clone();
    let active_before: Vec<bool> = session.pool.values().map(|c| c.active).collect();
    for idx in (0..num).rev() {
        if canceler.is_canceled() {
            // roll back the races that did complete
            session.counters = counters_before;
            session.minimal = minimal_before;
            for (candidate, &active) in session.pool.values_mut().zip(&active_before) {
                candidate.active = active;
            }
            return Ok(false);
        }
        let goal = match session.pool.get(&keys[idx]) {
            Some(candidate) => oracle_text(&candidate.tree),
            None => continue,
        };
        let (lo, hi) = if conf.chunk_size > 0 {
            premise_window(num, idx, conf.chunk_size)
        } else {
            (0, num - 1)
        };
        let mut premises = vec![];
        for key in keys.iter().take(hi + 1).skip(lo) {
            if key == &keys[idx] {
                continue;
            }
            if let Some(candidate) = session.pool.get(key) {
                if candidate.active {
                    premises.push(oracle_text(&candidate.tree));
                }
            }
        }
        let mut file = File::create(&conf.oracle.infile)?;
        write_artifact(&mut file, conf.timeout, &premises, &goal)?;
        drop(file);

        let outcome = race(&conf.oracle, canceler)?;
        log::debug!("race for {:?}: {outcome:?}", keys[idx]);
        session.counters.record(outcome);
        if outcome.shows_redundant() {
            if let Some(candidate) = session.pool.get_mut(&keys[idx]) {
                candidate.active = false;
            }
        } else {
            session.minimal.insert(keys[idx].clone());
        }
    }
    session.verification_time += started.elapsed();
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::BasicCanceler;
    use fol::spec::{DomainSpec, Relation};
    use std::sync::Arc;
    use std::time::Duration;

    fn stub_conf(prover_script: &str, finder_script: &str) -> OracleConf {
        let infile = std::env::temp_dir().join(format!(
            "axiom-race-test-{}.in",
            std::process::id()
        ));
        OracleConf {
            prover: prover::conf::OracleCmd::new(
                "sh",
                vec!["-c".to_string(), prover_script.to_string()],
            ),
            model_finder: prover::conf::OracleCmd::new(
                "sh",
                vec!["-c".to_string(), finder_script.to_string()],
            ),
            infile,
        }
    }

    #[test]
    fn test_window_centered() {
        assert_eq!(premise_window(10, 5, 4), (3, 7));
    }

    #[test]
    fn test_window_clamped_low() {
        assert_eq!(premise_window(10, 0, 4), (0, 4));
        assert_eq!(premise_window(10, 1, 4), (0, 4));
    }

    #[test]
    fn test_window_clamped_high() {
        assert_eq!(premise_window(10, 9, 4), (5, 9));
        assert_eq!(premise_window(10, 8, 4), (5, 9));
    }

    #[test]
    fn test_window_covers_pool_when_chunk_is_large() {
        assert_eq!(premise_window(3, 1, 5), (0, 2));
        assert_eq!(premise_window(3, 0, 3), (0, 2));
    }

    #[test]
    fn test_race_proof_beats_slow_model_finder() {
        let conf = stub_conf("exit 0", "sleep 5; exit 0");
        let started = Instant::now();
        let outcome = race(&conf, &MultiCanceler::new()).unwrap();
        assert_eq!(outcome, OracleOutcome::ProofFound);
        // the model finder was killed, not waited out
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_race_counterexample_beats_slow_prover() {
        let conf = stub_conf("sleep 5; exit 0", "exit 0");
        let started = Instant::now();
        let outcome = race(&conf, &MultiCanceler::new()).unwrap();
        assert_eq!(outcome, OracleOutcome::CounterexampleFound);
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_race_timeout_waits_for_the_other_side() {
        // the prover times out immediately; the model finder still answers
        let conf = stub_conf("exit 4", "sleep 0.3; exit 2");
        let outcome = race(&conf, &MultiCanceler::new()).unwrap();
        assert_eq!(outcome, OracleOutcome::NoModelFound);
    }

    #[test]
    fn test_race_both_timeouts_report_the_prover() {
        let conf = stub_conf("exit 4", "exit 5");
        let outcome = race(&conf, &MultiCanceler::new()).unwrap();
        assert_eq!(outcome, OracleOutcome::ProverTimeout);

        // arrival order does not matter
        let conf = stub_conf("sleep 0.3; exit 4", "exit 5");
        let outcome = race(&conf, &MultiCanceler::new()).unwrap();
        assert_eq!(outcome, OracleOutcome::ProverTimeout);
    }

    #[test]
    fn test_race_launch_failure_is_an_outcome() {
        let mut conf = stub_conf("exit 0", "exit 0");
        conf.prover.program = "definitely-not-a-real-oracle".to_string();
        let outcome = race(&conf, &MultiCanceler::new()).unwrap();
        assert_eq!(outcome, OracleOutcome::ProverProcessError);
    }

    fn swap_session() -> SearchSession {
        let mut r = Relation::new("R", 2);
        r.facts = vec![vec![0, 1], vec![1, 0]];
        let spec = DomainSpec {
            elements: vec!["a".to_string(), "b".to_string()],
            types: vec![],
            relations: vec![Arc::new(r)],
            var_limit: 2,
            size_limit: 0,
            chunk_size: 0,
            timeout: 3,
            filename: None,
        };
        let mut session = SearchSession::new(spec);
        assert!(session.generate(false, &BasicCanceler::new()));
        session
    }

    #[test]
    fn test_verify_pass_proofs_deactivate_candidates() {
        let mut session = swap_session();
        // every race ends with a proof: everything is redundant
        let conf = VerifyConfig {
            oracle: stub_conf("exit 0", "sleep 5; exit 0"),
            timeout: 3,
            chunk_size: 0,
        };
        assert!(verify_pass(&mut session, &conf, &MultiCanceler::new()).unwrap());
        assert_eq!(session.active_count(), 0);
        assert!(session.minimal.is_empty());
        assert_eq!(session.counters.proofs_found, session.pool.len());
    }

    #[test]
    fn test_verify_pass_counterexamples_fill_minimal_set() {
        let mut session = swap_session();
        let conf = VerifyConfig {
            oracle: stub_conf("sleep 5; exit 0", "exit 0"),
            timeout: 3,
            chunk_size: 0,
        };
        assert!(verify_pass(&mut session, &conf, &MultiCanceler::new()).unwrap());
        assert_eq!(session.active_count(), session.pool.len());
        assert_eq!(session.minimal.len(), session.pool.len());
        assert_eq!(
            session.counters.counterexamples_found,
            session.pool.len()
        );
    }

    #[test]
    fn test_verify_pass_writes_goal_and_premises() {
        let mut session = swap_session();
        let conf = VerifyConfig {
            oracle: stub_conf("sleep 5; exit 0", "exit 0"),
            timeout: 7,
            chunk_size: 0,
        };
        assert!(verify_pass(&mut session, &conf, &MultiCanceler::new()).unwrap());
        // the last race is for the oldest candidate; its artifact survives
        let text = std::fs::read_to_string(&conf.oracle.infile).unwrap();
        assert!(text.contains("assign(max_seconds, 7)."));
        assert!(
            text.contains("formulas(goals).\n\nall x exists y all u (R(x,u) <-> (y = u)).\n")
        );
        let _ = std::fs::remove_file(&conf.oracle.infile);
    }

    #[test]
    fn test_verify_pass_canceled_before_any_race() {
        let mut session = swap_session();
        let conf = VerifyConfig {
            oracle: stub_conf("exit 0", "exit 0"),
            timeout: 3,
            chunk_size: 0,
        };
        let canceler = MultiCanceler::new();
        canceler.cancel();
        assert!(!verify_pass(&mut session, &conf, &canceler).unwrap());
        assert_eq!(session.counters.total(), 0);
        assert_eq!(session.active_count(), session.pool.len());
    }

    #[test]
    fn test_cancel_discards_completed_races() {
        let mut session = swap_session();
        let conf = VerifyConfig {
            oracle: stub_conf("sleep 0.3; exit 0", "sleep 5; exit 0"),
            timeout: 3,
            chunk_size: 0,
        };
        let canceler: MultiCanceler<OracleCancelers> = MultiCanceler::new();
        let completed = thread::scope(|s| {
            let c = canceler.clone();
            s.spawn(move || {
                thread::sleep(Duration::from_millis(100));
                c.cancel();
            });
            verify_pass(&mut session, &conf, &canceler).unwrap()
        });
        assert!(!completed);
        // whatever the first race concluded was rolled back with the rest
        assert_eq!(session.counters.total(), 0);
        assert!(session.minimal.is_empty());
        assert_eq!(session.active_count(), session.pool.len());
    }
}
