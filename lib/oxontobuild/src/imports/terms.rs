use oxonto::UnknownNameError;
use oxrdf::NamedNode;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// How the axioms of an explicitly imported term are chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExtractionMethod {
    /// The term joins the locality module seed.
    #[default]
    Locality,
    /// Only the declaration, annotations and characteristics of the term.
    Single,
}

impl FromStr for ExtractionMethod {
    type Err = UnknownNameError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "locality" | "star" | "bottom" => Ok(Self::Locality),
            "single" => Ok(Self::Single),
            _ => Err(UnknownNameError::new("extraction method", name)),
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Locality => "locality",
            Self::Single => "single",
        })
    }
}

/// A relationship followed from an explicitly imported term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RelatedType {
    /// Named superclasses and superproperties.
    Ancestors,
    /// Named subclasses and subproperties.
    Descendants,
    Equivalents,
    Disjoints,
    Domains,
    Ranges,
    Inverses,
    /// The classes an individual belongs to.
    Types,
    /// The individuals an individual is related to.
    PropertyAssertions,
}

impl RelatedType {
    pub const ALL: [Self; 9] = [
        Self::Ancestors,
        Self::Descendants,
        Self::Equivalents,
        Self::Disjoints,
        Self::Domains,
        Self::Ranges,
        Self::Inverses,
        Self::Types,
        Self::PropertyAssertions,
    ];

    /// Parses a `,` or `;` separated list of relationship names.
    ///
    /// ```
    /// use oxontobuild::imports::RelatedType;
    ///
    /// assert_eq!(
    ///     RelatedType::parse_list("ancestors, Property Assertions")?,
    ///     [RelatedType::Ancestors, RelatedType::PropertyAssertions].into()
    /// );
    /// # Result::<_, oxonto::UnknownNameError>::Ok(())
    /// ```
    pub fn parse_list(list: &str) -> Result<BTreeSet<Self>, UnknownNameError> {
        list.split([',', ';'])
            .filter(|name| !name.trim().is_empty())
            .map(str::parse)
            .collect()
    }
}

impl FromStr for RelatedType {
    type Err = UnknownNameError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let normalized = name
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();
        Ok(match normalized.as_str() {
            "ancestors" => Self::Ancestors,
            "descendants" => Self::Descendants,
            "equivalents" => Self::Equivalents,
            "disjoints" => Self::Disjoints,
            "domains" => Self::Domains,
            "ranges" => Self::Ranges,
            "inverses" => Self::Inverses,
            "types" => Self::Types,
            "propertyassertions" => Self::PropertyAssertions,
            _ => return Err(UnknownNameError::new("related entity type", name)),
        })
    }
}

/// A term explicitly requested from a source ontology.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportTerm {
    iri: NamedNode,
    method: ExtractionMethod,
    related: BTreeSet<RelatedType>,
    exclude: bool,
}

impl ImportTerm {
    pub fn new(iri: NamedNode) -> Self {
        Self {
            iri,
            method: ExtractionMethod::default(),
            related: BTreeSet::new(),
            exclude: false,
        }
    }

    #[must_use]
    pub fn with_method(mut self, method: ExtractionMethod) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn with_related(mut self, related: impl IntoIterator<Item = RelatedType>) -> Self {
        self.related.extend(related);
        self
    }

    /// Removes the term, and its related terms, from the module.
    #[must_use]
    pub fn excluded(mut self) -> Self {
        self.exclude = true;
        self
    }

    #[inline]
    pub fn iri(&self) -> &NamedNode {
        &self.iri
    }

    #[inline]
    pub fn method(&self) -> ExtractionMethod {
        self.method
    }

    #[inline]
    pub fn related(&self) -> &BTreeSet<RelatedType> {
        &self.related
    }

    #[inline]
    pub fn is_excluded(&self) -> bool {
        self.exclude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert_eq!(
            "Single".parse::<ExtractionMethod>().unwrap(),
            ExtractionMethod::Single
        );
        assert!("mireot".parse::<ExtractionMethod>().is_err());
        assert_eq!(
            RelatedType::parse_list("descendants;  ;types").unwrap(),
            [RelatedType::Descendants, RelatedType::Types].into()
        );
        let error = RelatedType::parse_list("ancestors, cousins").unwrap_err();
        assert_eq!(error.name(), " cousins");
    }
}
