//! The axiom-finder binary's command-line interface.

use std::path::PathBuf;
use std::{fs, process};

use clap::Args;
use fol::parser;
use fol::spec::DomainSpec;
use prover::conf::{OracleConf, DEFAULT_INFILE};
use search::cancel::{MultiCanceler, OracleCancelers};
use search::session::SearchSession;
use search::verify::{verify_pass, VerifyConfig};

#[derive(Args, Clone, Debug, PartialEq, Eq)]
struct OracleArgs {
    #[arg(long, global = true)]
    /// Directory holding the prover9 and mace4 executables; by default they
    /// are found on $PATH
    prover_path: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_INFILE, global = true)]
    /// Input file shared by both oracle processes
    infile: PathBuf,
}

#[derive(Args, Clone, Debug, PartialEq, Eq)]
struct GenerateArgs {
    #[arg(long)]
    /// Skip the common-axiom library and enumerate only
    no_common: bool,

    /// File name for a domain specification file
    file: String,
}

#[derive(Args, Clone, Debug, PartialEq, Eq)]
struct SearchArgs {
    #[command(flatten)]
    oracle: OracleArgs,

    #[arg(long)]
    /// Skip the common-axiom library and enumerate only
    no_common: bool,

    #[arg(long, default_value_t = 1)]
    /// Number of verification passes; each pass after the first is seeded
    /// with the previous pass's minimal set
    passes: usize,

    #[arg(long)]
    /// Print the report without writing the output file
    no_output_file: bool,

    /// File name for a domain specification file
    file: String,
}

#[derive(clap::Subcommand, Clone, Debug, PartialEq, Eq)]
enum Command {
    /// Parse and validate a domain specification, then dump it (for
    /// debugging)
    Print {
        /// File name for a domain specification file
        file: String,
    },
    /// Generate the candidate pool and print it, without calling the
    /// oracles.
    Generate(GenerateArgs),
    /// Generate candidates, race the oracles over them, and report a
    /// minimal axiom set.
    Search(SearchArgs),
}

#[derive(clap::Parser, Debug)]
#[command(about, long_about=None)]
/// Entrypoint for the axiom-finder binary, including all commands.
pub struct App {
    #[command(subcommand)]
    /// Command to run
    command: Command,
}

fn load(file: &str) -> DomainSpec {
    let text = match fs::read_to_string(file) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("could not read {file}: {err}");
            process::exit(1);
        }
    };
    match parser::parse_spec(&text, Some(file)) {
        Ok(spec) => spec,
        Err(err) => {
            eprintln!("{file}: {err}");
            process::exit(1);
        }
    }
}

impl App {
    /// Run the application.
    pub fn exec(self) {
        match self.command {
            Command::Print { file } => {
                let spec = load(&file);
                println!("{spec:#?}");
            }
            Command::Generate(args) => {
                let spec = load(&args.file);
                let mut session = SearchSession::new(spec);
                let canceler: MultiCanceler<OracleCancelers> = MultiCanceler::new();
                session.generate(!args.no_common, &canceler);
                for candidate in session.pool.values() {
                    match &candidate.label {
                        Some(label) => println!("{}    [{label}]", candidate.text),
                        None => println!("{}", candidate.text),
                    }
                }
                log::info!("{} candidates", session.pool.len());
            }
            Command::Search(args) => {
                let spec = load(&args.file);
                let conf = VerifyConfig {
                    oracle: OracleConf::new(
                        args.oracle.prover_path.as_deref(),
                        args.oracle.infile.clone(),
                    ),
                    timeout: spec.timeout,
                    chunk_size: spec.chunk_size,
                };
                let mut session = SearchSession::new(spec);
                let canceler: MultiCanceler<OracleCancelers> = MultiCanceler::new();
                session.generate(!args.no_common, &canceler);
                for pass in 1..=args.passes {
                    if pass > 1 {
                        session.seed_next_pass();
                    }
                    match verify_pass(&mut session, &conf, &canceler) {
                        Ok(true) => log::info!(
                            "pass {pass}: {} axioms in the minimal set",
                            session.minimal.len()
                        ),
                        Ok(false) => {
                            log::info!("pass {pass} was canceled and discarded");
                            break;
                        }
                        Err(err) => {
                            eprintln!("verification failed: {err}");
                            process::exit(1);
                        }
                    }
                }
                let report = session.report();
                print!("{report}");
                if !args.no_output_file {
                    let out_name = session.spec.output_name();
                    if let Err(err) = fs::write(&out_name, &report) {
                        eprintln!("could not write {out_name}: {err}");
                        process::exit(1);
                    }
                    println!("wrote {out_name}");
                }
            }
        }
    }
}
