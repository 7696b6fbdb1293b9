//! Where the build hands its results.
//!
//! Serialization is not done here: a sink receives the finished ontology and its import modules once per
//! configured [`OutputFormat`].

use crate::config::OutputFormat;
use oxonto::OntologyModule;
use std::collections::BTreeMap;
use std::io;

/// Receives the outputs of a successful build.
pub trait OntologySink {
    /// Writes `ontology` and its import `modules` (by source name) in `format`.
    fn write(
        &mut self,
        format: OutputFormat,
        ontology: &OntologyModule,
        modules: &BTreeMap<String, OntologyModule>,
    ) -> io::Result<()>;
}

/// A sink keeping the written ontologies in memory.
///
/// ```
/// use oxonto::OntologyModule;
/// use oxontobuild::{MemorySink, OntologySink, OutputFormat};
/// use std::collections::BTreeMap;
///
/// let mut sink = MemorySink::new();
/// sink.write(OutputFormat::Turtle, &OntologyModule::new(None), &BTreeMap::new())?;
/// assert_eq!(sink.formats().collect::<Vec<_>>(), [OutputFormat::Turtle]);
/// # std::io::Result::Ok(())
/// ```
#[derive(Debug, Default)]
pub struct MemorySink {
    outputs: BTreeMap<OutputFormat, (OntologyModule, BTreeMap<String, OntologyModule>)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The formats written so far.
    pub fn formats(&self) -> impl Iterator<Item = OutputFormat> + '_ {
        self.outputs.keys().copied()
    }

    pub fn ontology(&self, format: OutputFormat) -> Option<&OntologyModule> {
        self.outputs.get(&format).map(|(ontology, _)| ontology)
    }

    pub fn modules(&self, format: OutputFormat) -> Option<&BTreeMap<String, OntologyModule>> {
        self.outputs.get(&format).map(|(_, modules)| modules)
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

impl OntologySink for MemorySink {
    fn write(
        &mut self,
        format: OutputFormat,
        ontology: &OntologyModule,
        modules: &BTreeMap<String, OntologyModule>,
    ) -> io::Result<()> {
        self.outputs
            .insert(format, (ontology.clone(), modules.clone()));
        Ok(())
    }
}
