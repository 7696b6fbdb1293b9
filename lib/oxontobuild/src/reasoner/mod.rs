//! The reasoner seam of the build.
//!
//! Backends implement [`ReasonerAdapter`] and are handed to the orchestrator when it is built. The crate ships
//! one backend, [`StructuralReasoner`].

mod structural;

pub use structural::StructuralReasoner;

use oxonto::{Axiom, OntologyModule};
use oxrdf::NamedNode;
use std::collections::BTreeSet;
use std::time::Duration;

/// Configuration for the reasoner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasonerConfig {
    /// Maximum number of iterations for fixpoint computation.
    pub max_iterations: usize,
    /// Maximum time allowed for reasoning (None = unlimited).
    pub timeout: Option<Duration>,
    /// Whether to return inferred axioms.
    pub materialize: bool,
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100_000,
            timeout: None,
            materialize: true,
        }
    }
}

/// A reasoning backend.
///
/// A call is blocking and answers for the whole ontology: there are no partial verdicts.
pub trait ReasonerAdapter: Send + Sync {
    /// The name of the backend, for logs and reports.
    fn name(&self) -> &str;

    /// Checks the consistency of `ontology` and looks for unsatisfiable classes.
    fn check(&self, ontology: &OntologyModule) -> Result<ReasonerVerdict, ReasonerError>;
}

/// The answer of a reasoner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReasonerVerdict {
    pub consistent: bool,
    /// Named classes equivalent to `owl:Nothing`.
    pub unsatisfiable: BTreeSet<NamedNode>,
    /// Entailed axioms not already in the ontology, in canonical order.
    pub inferred: Option<Vec<Axiom>>,
    /// Why the ontology is inconsistent.
    pub explanation: Option<String>,
}

impl ReasonerVerdict {
    /// A verdict with nothing to report.
    pub fn consistent() -> Self {
        Self {
            consistent: true,
            ..Self::default()
        }
    }
}

/// The reasoner could not give a verdict.
#[derive(Debug, thiserror::Error)]
pub enum ReasonerError {
    #[error("reasoning did not finish within {0:?}")]
    Timeout(Duration),
    #[error("{0}")]
    Backend(String),
}
