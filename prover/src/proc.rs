//! Spawning, reaping, and killing oracle processes.

use crate::conf::OracleCmd;
use crate::outcome::{OracleOutcome, OracleRole};
use nix::{errno::Errno, sys::signal, unistd::Pid};
use thiserror::Error;

/// Errors from launching or reaping an oracle process.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The program could not be spawned or reaped.
    #[error("failed to run oracle {program}: {err}")]
    Io {
        /// The program that failed.
        program: String,
        /// The underlying error.
        #[source]
        err: std::io::Error,
    },
    /// A kill signal could not be delivered.
    #[error("failed to kill oracle process: {0}")]
    Kill(Errno),
}

/// A handle to a running oracle's process id, detached from the [`OracleProc`]
/// so the losing side of a race can be killed from another thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OraclePid(Pid);

impl OraclePid {
    /// Kill the process. A process that already exited is not an error;
    /// the race winner routinely outlives the loser's handle.
    pub fn kill(&self) -> Result<(), OracleError> {
        match signal::kill(self.0, signal::Signal::SIGKILL) {
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(err) => Err(OracleError::Kill(err)),
        }
    }
}

/// One spawned oracle process.
pub struct OracleProc {
    child: std::process::Child,
    role: OracleRole,
    program: String,
}

impl OracleProc {
    /// Spawn the oracle.
    pub fn start(cmd: &OracleCmd, role: OracleRole) -> Result<OracleProc, OracleError> {
        let child = cmd.command().spawn().map_err(|err| OracleError::Io {
            program: cmd.program.clone(),
            err,
        })?;
        log::debug!("started {role:?} oracle {} (pid {})", cmd.program, child.id());
        Ok(OracleProc {
            child,
            role,
            program: cmd.program.clone(),
        })
    }

    /// The process id, for killing from another thread.
    pub fn pid(&self) -> OraclePid {
        OraclePid(Pid::from_raw(self.child.id() as i32))
    }

    /// Wait for the process and classify its exit code. A process that
    /// died to a signal (normally the loser we killed) classifies as a
    /// process error; race resolution never consults the loser's outcome.
    pub fn finish(mut self) -> Result<OracleOutcome, OracleError> {
        let status = self.child.wait().map_err(|err| OracleError::Io {
            program: self.program.clone(),
            err,
        })?;
        let outcome = match status.code() {
            Some(code) => OracleOutcome::from_exit(self.role, code),
            None => match self.role {
                OracleRole::Prover => OracleOutcome::ProverProcessError,
                OracleRole::ModelFinder => OracleOutcome::ModelFinderOther,
            },
        };
        log::debug!("{:?} oracle exited: {outcome:?}", self.role);
        Ok(outcome)
    }
}
