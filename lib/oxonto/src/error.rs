use oxiri::IriParseError;

/// An error raised while turning a textual identifier into an IRI.
#[derive(Debug, thiserror::Error)]
pub enum IdentifierError {
    /// The identifier is empty.
    #[error("empty identifier")]
    Empty,
    /// The identifier is a CURIE whose prefix is not declared.
    #[error("unknown prefix '{prefix}' in '{identifier}'")]
    UnknownPrefix { prefix: String, identifier: String },
    /// The identifier expands into an invalid IRI.
    #[error("invalid IRI '{iri}': {error}")]
    InvalidIri {
        iri: String,
        #[source]
        error: IriParseError,
    },
}

impl IdentifierError {
    pub(crate) fn invalid_iri(iri: impl Into<String>, error: IriParseError) -> Self {
        Self::InvalidIri {
            iri: iri.into(),
            error,
        }
    }
}

/// An error raised when a keyword written in a table (entity kind, characteristic...) is not known.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {category} '{name}'")]
pub struct UnknownNameError {
    category: &'static str,
    name: String,
}

impl UnknownNameError {
    /// Builds an error for `name`, which was expected to be one of the `category` keywords.
    pub fn new(category: &'static str, name: impl Into<String>) -> Self {
        Self {
            category,
            name: name.into(),
        }
    }

    /// The kind of keyword that was expected.
    #[inline]
    pub fn category(&self) -> &'static str {
        self.category
    }

    /// The unrecognized text.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}
