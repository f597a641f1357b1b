//! Domain specifications: the finite structure a search runs over.
//!
//! A [`DomainSpec`] is the validated value object the engine consumes. It
//! holds the ordered element table (or its partition into named types), the
//! relations with their fact tables, and the scalar search limits.

use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// An element of the finite domain, as an index into the ordered element
/// table of the enclosing [`DomainSpec`].
pub type Element = usize;

/// A named type owning a subset of the domain's elements.
///
/// Typed and untyped domains are mutually exclusive: a spec has either a
/// plain element list or a list of types whose element lists are disjoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDecl {
    /// The type's name, also the name of its synthesized unary relation.
    pub name: String,
    /// The elements belonging to this type.
    pub elements: Vec<String>,
}

/// One position of a relation's typing constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TypeRef {
    /// The wildcard `_`, matching any type.
    Wild,
    /// A declared type, by name.
    Named(String),
}

impl TypeRef {
    /// Whether a variable of type `name` satisfies this constraint position.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            TypeRef::Wild => true,
            TypeRef::Named(n) => n == name,
        }
    }
}

/// A relation over the domain: a name, an arity, and a fact table.
///
/// Fact tuples hold element indices and are arity-homogeneous. Relations are
/// owned by the domain specification and read-only to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relation {
    /// The relation's name as it appears in formulas.
    pub name: String,
    /// Number of positions in each fact tuple.
    pub arity: usize,
    /// The fact table.
    pub facts: Vec<Vec<Element>>,
    /// Optional per-position typing constraint.
    pub constraint: Option<Vec<TypeRef>>,
}

impl Relation {
    /// Create a relation with an empty fact table.
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Relation {
            name: name.into(),
            arity,
            facts: vec![],
            constraint: None,
        }
    }

    /// Exact tuple membership in the fact table.
    ///
    /// Linear scan; the targeted domains are small enough that indexing
    /// would not pay for itself.
    pub fn holds(&self, claim: &[Element]) -> bool {
        self.facts.iter().any(|fact| fact == claim)
    }
}

/// Errors detected while validating a domain specification.
///
/// All of these are fatal: the engine refuses to start a search over a spec
/// that fails validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpecError {
    /// Could not parse the specification file.
    #[error("parse error: {0}")]
    Parse(String),
    /// The variable limit is outside 1..=4.
    #[error("variable limit must be between 1 and 4, got {0}")]
    VarLimit(usize),
    /// The oracle time budget is zero.
    #[error("timeout must be positive")]
    Timeout,
    /// A relation has an empty fact table.
    #[error("relation {0} has no facts")]
    EmptyFacts(String),
    /// A relation's facts disagree on arity.
    #[error("arity mismatch in facts for relation {relation}: expected {expected}, got {got}")]
    ArityMismatch {
        /// The offending relation.
        relation: String,
        /// Arity of the relation's first fact.
        expected: usize,
        /// Arity of the disagreeing fact.
        got: usize,
    },
    /// A relation's typing constraint disagrees with its arity.
    #[error("arity mismatch in constraint for relation {0}")]
    ConstraintArity(String),
    /// A constraint names an unknown type.
    #[error("bad constraint for relation {0}: unknown type {1}")]
    BadConstraint(String, String),
    /// The spec declares both a plain element list and types.
    #[error("elements must be either all typed or all untyped")]
    TypesAndElements,
    /// The spec declares no elements at all.
    #[error("no elements found")]
    NoElements,
    /// A type has no elements.
    #[error("type {0} has no elements")]
    EmptyType(String),
    /// A fact names an element outside the domain.
    #[error("unknown element {element} in a fact for relation {relation}")]
    UnknownElement {
        /// The offending relation.
        relation: String,
        /// The unresolved element name.
        element: String,
    },
    /// A fact names a relation that was never declared.
    #[error("no relation named {0}")]
    UnknownRelation(String),
}

/// A validated domain specification: the input to a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainSpec {
    /// Ordered element names. Empty when the domain is typed; the canonical
    /// element table of a typed domain is the concatenation of its types'
    /// element lists in declaration order.
    pub elements: Vec<String>,
    /// Declared types, if any.
    pub types: Vec<TypeDecl>,
    /// Declared relations.
    pub relations: Vec<Arc<Relation>>,
    /// Number of distinct variables to enumerate over (1..=4).
    pub var_limit: usize,
    /// Maximum number of connectives in an enumerated formula body.
    pub size_limit: usize,
    /// Premise window size for oracle calls; 0 disables chunking.
    pub chunk_size: usize,
    /// Shared time budget for both oracles, in seconds.
    pub timeout: u64,
    /// The name of the file this spec was read from, if any.
    pub filename: Option<String>,
}

impl DomainSpec {
    /// Whether the domain's elements are partitioned into types.
    pub fn has_types(&self) -> bool {
        !self.types.is_empty()
    }

    /// Whether oracle calls should window their premise blocks.
    pub fn use_chunking(&self) -> bool {
        self.chunk_size > 0
    }

    /// Number of elements in the evaluation universe.
    pub fn universe(&self) -> usize {
        if self.has_types() {
            self.types.iter().map(|t| t.elements.len()).sum()
        } else {
            self.elements.len()
        }
    }

    /// Derive a distinct output filename from the input filename, so output
    /// never overwrites an unrelated file: `name.txt` becomes
    /// `name_output.txt`.
    pub fn output_name(&self) -> String {
        let name = self.filename.as_deref().unwrap_or("axioms");
        let base = name.strip_suffix(".txt").unwrap_or(name);
        format!("{base}_output.txt")
    }

    /// Check the structural rules a spec must satisfy before a search may
    /// begin.
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.var_limit < 1 || self.var_limit > 4 {
            return Err(SpecError::VarLimit(self.var_limit));
        }
        if self.timeout == 0 {
            return Err(SpecError::Timeout);
        }
        if !self.elements.is_empty() && !self.types.is_empty() {
            return Err(SpecError::TypesAndElements);
        }
        if self.elements.is_empty() && self.types.is_empty() {
            return Err(SpecError::NoElements);
        }
        for t in &self.types {
            if t.elements.is_empty() {
                return Err(SpecError::EmptyType(t.name.clone()));
            }
        }
        for r in &self.relations {
            if r.facts.is_empty() {
                return Err(SpecError::EmptyFacts(r.name.clone()));
            }
            for fact in &r.facts {
                if fact.len() != r.arity {
                    return Err(SpecError::ArityMismatch {
                        relation: r.name.clone(),
                        expected: r.arity,
                        got: fact.len(),
                    });
                }
            }
            if let Some(constraint) = &r.constraint {
                if constraint.len() != r.arity {
                    return Err(SpecError::ConstraintArity(r.name.clone()));
                }
            }
        }
        Ok(())
    }

    /// Synthesize, for each type, a unary relation whose facts are exactly
    /// that type's elements, indexed into the merged element table.
    pub fn type_relations(&self) -> Vec<Arc<Relation>> {
        let mut out = vec![];
        let mut next = 0;
        for t in &self.types {
            let mut r = Relation::new(t.name.clone(), 1);
            for _ in &t.elements {
                r.facts.push(vec![next]);
                next += 1;
            }
            out.push(Arc::new(r));
        }
        out
    }

    /// Convert a typed spec into an equivalent untyped one: types become
    /// unary relations appended to the relation list, and the element table
    /// becomes the union of all typed elements in type order.
    pub fn untyped(&self) -> DomainSpec {
        let mut relations = self.relations.clone();
        relations.extend(self.type_relations());
        let elements = self
            .types
            .iter()
            .flat_map(|t| t.elements.iter().cloned())
            .collect();
        DomainSpec {
            elements,
            types: vec![],
            relations,
            var_limit: self.var_limit,
            size_limit: self.size_limit,
            chunk_size: self.chunk_size,
            timeout: self.timeout,
            filename: self.filename.clone(),
        }
    }
}
