//! Build configuration.

use crate::error::ConfigError;
use crate::reasoner::ReasonerConfig;
use crate::report::Severity;
use oxiri::Iri;
use oxonto::{IriResolver, PrefixMap};
use oxrdf::NamedNode;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Duration;

/// The project options of a build, as written in the project configuration file.
///
/// ```
/// use oxontobuild::{BuildConfig, OutputFormat};
///
/// let mut config = BuildConfig::new("http://purl.obolibrary.org/obo/obto/");
/// config.version = Some("2024-05-01".into());
/// config.version_iri_pattern = Some("releases/{version}/obto.owl".into());
/// let settings = config.validate()?;
/// assert_eq!(
///     settings.version_iri.unwrap().as_str(),
///     "http://purl.obolibrary.org/obo/obto/releases/2024-05-01/obto.owl"
/// );
/// assert!(config.output_formats.contains(&OutputFormat::RdfXml));
/// # Result::<_, oxontobuild::ConfigError>::Ok(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Base of the IRIs minted for relative identifiers.
    pub base_iri: String,
    /// IRI of the compiled ontology, defaults to `{base_iri}ontology.owl`.
    pub ontology_iri: Option<String>,
    pub version: Option<String>,
    /// Pattern of the version IRI, `{version}` is replaced by `version`. Relative patterns are resolved against `base_iri`.
    pub version_iri_pattern: Option<String>,
    /// Turns every collected row-level error into a fatal error at the end of its stage.
    pub strict_mode: bool,
    /// Source ontology names to their location. When not empty, only these catalog entries are used.
    pub import_catalog: BTreeMap<String, String>,
    /// CURIE prefixes, in addition to the built-in ones.
    pub prefixes: BTreeMap<String, String>,
    pub output_formats: BTreeSet<OutputFormat>,
    pub reasoner: ReasonerKind,
    pub reasoner_timeout_secs: Option<u64>,
    /// Severity of the unsatisfiable classes found by the reasoner.
    pub unsatisfiable_severity: Severity,
    /// Copies the import module axioms into the compiled ontology instead of only importing them.
    pub merge_imports: bool,
    /// Adds the axioms inferred by the reasoner to the compiled ontology.
    pub add_inferred: bool,
    pub max_expression_depth: usize,
}

impl BuildConfig {
    /// The default configuration with the given base IRI.
    pub fn new(base_iri: impl Into<String>) -> Self {
        Self {
            base_iri: base_iri.into(),
            ..Self::default()
        }
    }

    /// Checks the configuration and computes the values the build uses.
    pub fn validate(&self) -> Result<BuildSettings, ConfigError> {
        if self.base_iri.trim().is_empty() {
            return Err(ConfigError::EmptyBaseIri);
        }
        if self.max_expression_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        let base = parse_iri("base_iri", self.base_iri.trim())?;
        let mut prefixes = PrefixMap::default();
        for (prefix, namespace) in &self.prefixes {
            prefixes.insert(prefix.as_str(), namespace.as_str())?;
        }
        let resolver = IriResolver::new(base.as_str(), prefixes)?;
        let ontology_iri = match &self.ontology_iri {
            Some(iri) => resolve_iri(&base, "ontology_iri", iri)?,
            None => resolve_iri(&base, "ontology_iri", "ontology.owl")?,
        };
        let version_iri = match &self.version_iri_pattern {
            Some(pattern) => {
                let iri = if pattern.contains("{version}") {
                    let version =
                        self.version
                            .as_deref()
                            .ok_or_else(|| ConfigError::MissingVersion {
                                pattern: pattern.clone(),
                            })?;
                    pattern.replace("{version}", version)
                } else {
                    pattern.clone()
                };
                Some(resolve_iri(&base, "version_iri_pattern", &iri)?)
            }
            None => None,
        };
        let module_base = resolve_iri(&base, "base_iri", "imports/")?.into_string();
        Ok(BuildSettings {
            resolver,
            ontology_iri,
            version_iri,
            module_base,
            max_expression_depth: self.max_expression_depth,
        })
    }

    /// The options passed to the reasoner.
    pub fn reasoner_config(&self) -> ReasonerConfig {
        ReasonerConfig {
            timeout: self.reasoner_timeout_secs.map(Duration::from_secs),
            materialize: self.add_inferred,
            ..ReasonerConfig::default()
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            base_iri: String::new(),
            ontology_iri: None,
            version: None,
            version_iri_pattern: None,
            strict_mode: false,
            import_catalog: BTreeMap::new(),
            prefixes: BTreeMap::new(),
            output_formats: [OutputFormat::RdfXml].into(),
            reasoner: ReasonerKind::default(),
            reasoner_timeout_secs: None,
            unsatisfiable_severity: Severity::Warning,
            merge_imports: false,
            add_inferred: false,
            max_expression_depth: oxmanchester::DEFAULT_MAX_DEPTH,
        }
    }
}

fn parse_iri(option: &'static str, value: &str) -> Result<Iri<String>, ConfigError> {
    Iri::parse(value.to_owned()).map_err(|source| ConfigError::InvalidIri {
        option,
        value: value.to_owned(),
        source,
    })
}

fn resolve_iri(
    base: &Iri<String>,
    option: &'static str,
    value: &str,
) -> Result<NamedNode, ConfigError> {
    let iri = base
        .resolve(value.trim())
        .map_err(|source| ConfigError::InvalidIri {
            option,
            value: value.to_owned(),
            source,
        })?;
    Ok(NamedNode::new_unchecked(iri.into_inner()))
}

/// The checked values derived from a [`BuildConfig`].
#[derive(Debug, Clone)]
pub struct BuildSettings {
    /// Resolves the identifiers written in the tables.
    pub resolver: IriResolver,
    pub ontology_iri: NamedNode,
    pub version_iri: Option<NamedNode>,
    /// Prefix of the import module IRIs.
    pub module_base: String,
    pub max_expression_depth: usize,
}

/// A serialization the compiled ontology is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    RdfXml,
    Turtle,
    OwlXml,
    Obo,
}

impl OutputFormat {
    /// The usual file extension for this format.
    pub const fn file_extension(self) -> &'static str {
        match self {
            Self::RdfXml => "owl",
            Self::Turtle => "ttl",
            Self::OwlXml => "owx",
            Self::Obo => "obo",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RdfXml => "rdfxml",
            Self::Turtle => "turtle",
            Self::OwlXml => "owlxml",
            Self::Obo => "obo",
        })
    }
}

/// The reasoner backend the build should use.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ReasonerKind {
    #[default]
    Structural,
    Elk,
    Hermit,
    Pellet,
    Jfact,
}

impl fmt::Display for ReasonerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Structural => "structural",
            Self::Elk => "ELK",
            Self::Hermit => "HermiT",
            Self::Pellet => "Pellet",
            Self::Jfact => "JFact",
        })
    }
}
