use crate::config::ReasonerKind;
use crate::record::Provenance;
use crate::report::ErrorKind;
use oxiri::IriParseError;
use oxmanchester::SyntaxError;
use oxonto::{EntityKind, IdentifierError, Signature, UnknownNameError};
use oxrdf::NamedNode;
use std::io;
use std::time::Duration;

/// An error attached to a single term record.
///
/// These errors never stop the compilation of the other records: they are collected into the build report.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// A cell does not follow the expression syntax.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    /// An identifier or a label could not be turned into a known entity.
    #[error("unresolved reference {reference}: {reason}")]
    UnresolvedReference { reference: String, reason: String },
    /// A keyword (entity kind, characteristic...) is not known.
    #[error(transparent)]
    UnknownName(#[from] UnknownNameError),
    /// The record misses a required column, or a cell holds a value of the wrong shape.
    #[error("{0}")]
    Malformed(String),
}

impl RecordError {
    pub(crate) fn unresolved(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    /// The kind this error is reported with.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnresolvedReference { .. } => ErrorKind::UnresolvedReference,
            Self::Syntax(_) | Self::UnknownName(_) | Self::Malformed(_) => ErrorKind::Syntax,
        }
    }
}

impl From<IdentifierError> for RecordError {
    fn from(error: IdentifierError) -> Self {
        let message = error.to_string();
        match error {
            IdentifierError::UnknownPrefix { identifier, .. } => {
                Self::unresolved(identifier, message)
            }
            IdentifierError::Empty | IdentifierError::InvalidIri { .. } => {
                Self::Malformed(message)
            }
        }
    }
}

/// An error that stops the build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// One identifier is declared by two records that cannot be merged.
    #[error("{iri} is declared twice ({first} and {second}): {reason}")]
    DuplicateIri {
        iri: NamedNode,
        reason: String,
        first: Provenance,
        second: Provenance,
    },
    /// The reasoner found the ontology inconsistent.
    #[error("the ontology is inconsistent: {explanation}")]
    Inconsistency { explanation: String },
    /// The reasoner found unsatisfiable classes and they are configured to be fatal.
    #[error("unsatisfiable classes: {classes}")]
    Unsatisfiable { classes: Signature },
    /// The reasoner did not answer in time.
    #[error("the reasoner did not finish within {0:?}")]
    ReasonerTimeout(Duration),
    /// The reasoner failed for another reason.
    #[error("reasoner failure: {0}")]
    Reasoner(String),
    /// The build configuration is invalid.
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    /// Writing the ontology failed.
    #[error("failed to write the {format} output: {source}")]
    Output {
        format: String,
        #[source]
        source: io::Error,
    },
}

impl BuildError {
    pub(crate) fn duplicate(
        iri: NamedNode,
        reason: impl Into<String>,
        first: Provenance,
        second: Provenance,
    ) -> Self {
        Self::DuplicateIri {
            iri,
            reason: reason.into(),
            first,
            second,
        }
    }

    pub(crate) fn kind_conflict(
        iri: NamedNode,
        first_kind: EntityKind,
        second_kind: EntityKind,
        first: Provenance,
        second: Provenance,
    ) -> Self {
        Self::duplicate(
            iri,
            format!("declared as {first_kind} then as {second_kind}"),
            first,
            second,
        )
    }

    /// The kind this error is reported with.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateIri { .. } => ErrorKind::DuplicateIri,
            Self::Inconsistency { .. } | Self::Unsatisfiable { .. } => ErrorKind::Inconsistency,
            Self::ReasonerTimeout(_) => ErrorKind::ReasonerTimeout,
            Self::Reasoner(_) => ErrorKind::ReasonerFailure,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Output { .. } => ErrorKind::Output,
        }
    }

    /// The record the error comes from, if any.
    pub fn provenance(&self) -> Option<&Provenance> {
        match self {
            Self::DuplicateIri { second, .. } => Some(second),
            _ => None,
        }
    }
}

/// An invalid build configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("base_iri must be set")]
    EmptyBaseIri,
    #[error("invalid IRI '{value}' for {option}: {source}")]
    InvalidIri {
        option: &'static str,
        value: String,
        #[source]
        source: IriParseError,
    },
    #[error(transparent)]
    Identifier(#[from] IdentifierError),
    #[error("version_iri_pattern '{pattern}' uses {{version}} but no version is set")]
    MissingVersion { pattern: String },
    #[error("no built-in adapter for the {0} reasoner, inject one instead")]
    UnsupportedReasoner(ReasonerKind),
    #[error("max_expression_depth must be at least 1")]
    ZeroDepth,
    #[error("unknown source ontology '{0}'")]
    UnknownSource(String),
}
