//! Deterministic hash containers.
//!
//! The engine's output order is part of its observable behavior: candidate
//! pools are iterated in insertion order during verification, and keys are
//! display strings. These aliases give insertion-order iteration with a
//! fast non-cryptographic hasher.

use fxhash::FxBuildHasher;

/// A hash map that iterates in insertion order.
pub type HashMap<K, V> = indexmap::IndexMap<K, V, FxBuildHasher>;
/// A hash set that iterates in insertion order.
pub type HashSet<K> = indexmap::IndexSet<K, FxBuildHasher>;
