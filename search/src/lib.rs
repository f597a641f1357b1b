//! The axiom search engine.
//!
//! Generation enumerates candidate formulas over the domain, prunes
//! quantifier-prefix redundancy before any external call, and filters
//! trivial shapes. Verification then races the external oracles over each
//! surviving candidate to shrink the set down to a minimal one.

// configure clippy
#![allow(clippy::needless_return)]
#![allow(clippy::large_enum_variant)]
// documentation-related lints (only checked when running rustdoc)
#![warn(missing_docs)]
#![allow(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod cancel;
pub mod common;
pub mod enumerate;
pub mod hashmap;
pub mod prefixes;
pub mod session;
pub mod typed;
pub mod verify;
