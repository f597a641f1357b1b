//! Driving the external decision procedures.
//!
//! Each redundancy check races two external programs over the same input
//! file: a theorem prover trying to derive the goal from the premises, and
//! a model finder looking for a countermodel. This crate writes the shared
//! input artifact, spawns and kills the processes, and classifies their
//! exit codes.

// configure clippy
#![allow(clippy::needless_return)]
#![allow(clippy::large_enum_variant)]
// documentation-related lints (only checked when running rustdoc)
#![warn(missing_docs)]
#![allow(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod artifact;
pub mod conf;
pub mod outcome;
pub mod proc;
