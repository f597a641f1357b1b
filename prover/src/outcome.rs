//! Classifying oracle exit codes.

use serde::Serialize;

/// Which of the two racing programs produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OracleRole {
    /// The theorem prover, searching for a derivation of the goal.
    Prover,
    /// The model finder, searching for a countermodel.
    ModelFinder,
}

/// The classified result of one oracle run.
///
/// The prover reports `0` for a proof, `2` for an exhausted search, `4` for
/// hitting its time limit, `1` for an input error, and `7` or `101` when
/// terminated or crashed. The model finder reports `0` for a countermodel,
/// `2` for an exhausted search, and `5` for its time limit. Anything else
/// lands in the catch-all variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OracleOutcome {
    /// The goal follows from the premises.
    ProofFound,
    /// The prover exhausted its search without a proof.
    NoProofFound,
    /// The prover hit the time limit.
    ProverTimeout,
    /// The prover rejected the input file.
    ProverInputError,
    /// The prover was terminated or crashed.
    ProverProcessError,
    /// An unclassified prover exit code.
    ProverOther,
    /// The model finder found a countermodel, so no proof exists.
    CounterexampleFound,
    /// The model finder exhausted its search without a model.
    NoModelFound,
    /// The model finder hit the time limit.
    ModelFinderTimeout,
    /// An unclassified model finder exit code.
    ModelFinderOther,
}

impl OracleOutcome {
    /// Classify a prover exit code.
    pub fn from_prover_exit(code: i32) -> OracleOutcome {
        match code {
            0 => OracleOutcome::ProofFound,
            2 => OracleOutcome::NoProofFound,
            4 => OracleOutcome::ProverTimeout,
            1 => OracleOutcome::ProverInputError,
            7 | 101 => OracleOutcome::ProverProcessError,
            _ => OracleOutcome::ProverOther,
        }
    }

    /// Classify a model finder exit code.
    pub fn from_model_finder_exit(code: i32) -> OracleOutcome {
        match code {
            0 => OracleOutcome::CounterexampleFound,
            2 => OracleOutcome::NoModelFound,
            5 => OracleOutcome::ModelFinderTimeout,
            _ => OracleOutcome::ModelFinderOther,
        }
    }

    /// Classify an exit code for the given role.
    pub fn from_exit(role: OracleRole, code: i32) -> OracleOutcome {
        match role {
            OracleRole::Prover => OracleOutcome::from_prover_exit(code),
            OracleRole::ModelFinder => OracleOutcome::from_model_finder_exit(code),
        }
    }

    /// Whether this outcome is a time limit rather than an answer. A
    /// timeout from one oracle defers to whatever the other one says.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            OracleOutcome::ProverTimeout | OracleOutcome::ModelFinderTimeout
        )
    }

    /// Whether this outcome shows the goal is redundant: either a proof
    /// was found, or every candidate countermodel was ruled out.
    pub fn shows_redundant(&self) -> bool {
        matches!(
            self,
            OracleOutcome::ProofFound | OracleOutcome::NoModelFound
        )
    }
}
