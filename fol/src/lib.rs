//! First-order formulas over small finite relational structures.

// configure clippy
#![allow(clippy::needless_return)]
#![allow(clippy::large_enum_variant)]
// documentation-related lints (only checked when running rustdoc)
#![warn(missing_docs)]
#![allow(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod parser;
pub mod printer;
pub mod rewrite;
pub mod semantics;
pub mod spec;
pub mod syntax;
pub mod trivial;
