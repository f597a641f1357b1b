//! Locating and configuring the oracle executables.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Default name of the shared input file both oracles read.
pub const DEFAULT_INFILE: &str = "axiom_prover_file.in";

/// One launchable oracle: a program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleCmd {
    /// Program name or path.
    pub program: String,
    /// Arguments passed to the program.
    pub args: Vec<String>,
}

impl OracleCmd {
    /// A command from a program and its arguments.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        OracleCmd {
            program: program.into(),
            args,
        }
    }

    /// The ready-to-spawn process builder. Output streams are discarded so
    /// the child can never block on a full pipe.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

/// Configuration for one race: the two oracle commands and the input file
/// they share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleConf {
    /// The theorem prover invocation.
    pub prover: OracleCmd,
    /// The model finder invocation.
    pub model_finder: OracleCmd,
    /// The input file both programs read.
    pub infile: PathBuf,
}

impl OracleConf {
    /// The standard configuration: `prover9` and `mace4` found under
    /// `path` (or on `$PATH` when `path` is `None`), both reading the
    /// shared input file with `-f`.
    pub fn new(path: Option<&Path>, infile: impl Into<PathBuf>) -> Self {
        let infile = infile.into();
        let args = vec!["-f".to_string(), infile.display().to_string()];
        let locate = |binary: &str| match path {
            Some(dir) => dir.join(binary).display().to_string(),
            None => binary.to_string(),
        };
        OracleConf {
            prover: OracleCmd::new(locate("prover9"), args.clone()),
            model_finder: OracleCmd::new(locate("mace4"), args),
            infile,
        }
    }
}
