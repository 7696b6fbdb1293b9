//! The build state machine.

use crate::compiler::Compiler;
use crate::config::{BuildConfig, BuildSettings, ReasonerKind};
use crate::context::BuildContext;
use crate::error::{BuildError, ConfigError};
use crate::imports::{Catalog, ImportClosure, ImportClosureBuilder, ImportTerm};
use crate::reasoner::{ReasonerAdapter, ReasonerError, ReasonerVerdict, StructuralReasoner};
use crate::record::SourceTable;
use crate::report::{BuildReport, ErrorKind, Severity};
use crate::sink::OntologySink;
use oxonto::{OntologyModule, Signature};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{error, info};

/// A stage of the build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BuildState {
    #[default]
    Idle,
    Loading,
    Compiling,
    ImportResolution,
    Reasoning,
    Merging,
    Writing,
    Done,
    Failed,
}

impl BuildState {
    /// Returns true for [`Done`](Self::Done) and [`Failed`](Self::Failed).
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Compiling => "compiling",
            Self::ImportResolution => "import resolution",
            Self::Reasoning => "reasoning",
            Self::Merging => "merging",
            Self::Writing => "writing",
            Self::Done => "done",
            Self::Failed => "failed",
        })
    }
}

/// What the table loader produced for one build.
#[derive(Debug, Clone, Default)]
pub struct BuildInput {
    pub tables: Vec<SourceTable>,
    /// Terms explicitly requested from each source ontology.
    pub import_terms: BTreeMap<String, Vec<ImportTerm>>,
}

impl BuildInput {
    /// An input without explicit import terms.
    pub fn new(tables: impl IntoIterator<Item = SourceTable>) -> Self {
        Self {
            tables: tables.into_iter().collect(),
            import_terms: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_import_terms(
        mut self,
        source: impl Into<String>,
        terms: impl IntoIterator<Item = ImportTerm>,
    ) -> Self {
        self.import_terms
            .entry(source.into())
            .or_default()
            .extend(terms);
        self
    }
}

/// The result of a build, successful or not.
#[derive(Debug, Default)]
pub struct BuildOutcome {
    state: BuildState,
    states: Vec<BuildState>,
    ontology: Option<OntologyModule>,
    imports: BTreeMap<String, OntologyModule>,
    verdict: Option<ReasonerVerdict>,
    report: BuildReport,
}

impl BuildOutcome {
    /// The final state: [`BuildState::Done`] or [`BuildState::Failed`].
    #[inline]
    pub fn state(&self) -> BuildState {
        self.state
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        self.state == BuildState::Done
    }

    /// Every state the build went through, in order.
    #[inline]
    pub fn states(&self) -> &[BuildState] {
        &self.states
    }

    /// The merged ontology, if the build reached the merging stage.
    #[inline]
    pub fn ontology(&self) -> Option<&OntologyModule> {
        self.ontology.as_ref()
    }

    /// The import modules, by source name.
    #[inline]
    pub fn imports(&self) -> &BTreeMap<String, OntologyModule> {
        &self.imports
    }

    /// The reasoner answer, if the reasoner was called and answered.
    #[inline]
    pub fn verdict(&self) -> Option<&ReasonerVerdict> {
        self.verdict.as_ref()
    }

    #[inline]
    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    pub fn into_report(self) -> BuildReport {
        self.report
    }

    fn enter(&mut self, state: BuildState) {
        info!(stage = ?state, "build stage");
        self.state = state;
        self.states.push(state);
    }
}

/// Why a build stopped.
enum Failure {
    Fatal(BuildError),
    /// Strict mode turned warnings of the stage into errors.
    Promoted(usize),
}

impl From<BuildError> for Failure {
    fn from(error: BuildError) -> Self {
        Self::Fatal(error)
    }
}

impl From<ConfigError> for Failure {
    fn from(error: ConfigError) -> Self {
        Self::Fatal(error.into())
    }
}

/// Runs builds: `Idle → Loading → Compiling → ImportResolution → Reasoning → Merging → Writing → Done`.
///
/// Each stage starts once the previous one is complete. A fatal error moves the build to
/// [`BuildState::Failed`] and skips the remaining stages.
///
/// ```
/// use oxonto::EntityKind;
/// use oxontobuild::imports::Catalog;
/// use oxontobuild::{
///     BuildConfig, BuildInput, BuildOrchestrator, BuildState, MemorySink, OutputFormat, Provenance,
///     SourceTable, TermRecord,
/// };
///
/// let mut config = BuildConfig::new("http://purl.obolibrary.org/obo/obto/");
/// config.output_formats = [OutputFormat::Turtle].into();
/// let orchestrator = BuildOrchestrator::from_config(config, Catalog::new())?;
///
/// let mut table = SourceTable::new("terms.csv");
/// table.push(TermRecord::new("OBTO:0001", EntityKind::Class, Provenance::new("terms.csv", 2)));
/// let mut sink = MemorySink::new();
/// let outcome = orchestrator.run(&BuildInput::new([table]), &mut sink);
///
/// assert_eq!(outcome.state(), BuildState::Done);
/// assert_eq!(sink.ontology(OutputFormat::Turtle).map(|o| o.len()), Some(1));
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
pub struct BuildOrchestrator {
    config: BuildConfig,
    catalog: Catalog,
    reasoner: Box<dyn ReasonerAdapter>,
}

impl BuildOrchestrator {
    /// Builds an orchestrator checking the builds with `reasoner`.
    pub fn new(config: BuildConfig, catalog: Catalog, reasoner: Box<dyn ReasonerAdapter>) -> Self {
        Self {
            config,
            catalog,
            reasoner,
        }
    }

    /// Builds an orchestrator with the reasoner named in the configuration.
    ///
    /// Only [`ReasonerKind::Structural`] is built in: other backends must be passed to [`new`](Self::new).
    pub fn from_config(config: BuildConfig, catalog: Catalog) -> Result<Self, ConfigError> {
        let reasoner = match config.reasoner {
            ReasonerKind::Structural => {
                Box::new(StructuralReasoner::with_config(config.reasoner_config()))
            }
            other => return Err(ConfigError::UnsupportedReasoner(other)),
        };
        Ok(Self::new(config, catalog, reasoner))
    }

    #[inline]
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Runs a build to completion.
    ///
    /// It always ends in [`BuildState::Done`] or [`BuildState::Failed`], and a failed build always has an
    /// error in its report.
    pub fn run(&self, input: &BuildInput, sink: &mut dyn OntologySink) -> BuildOutcome {
        let mut outcome = BuildOutcome::default();
        outcome.states.push(BuildState::Idle);
        match self.stages(input, sink, &mut outcome) {
            Ok(()) => {
                outcome.enter(BuildState::Done);
                info!(
                    axioms = outcome.ontology.as_ref().map_or(0, OntologyModule::len),
                    warnings = outcome.report.len(),
                    "build done"
                );
            }
            Err(Failure::Fatal(error)) => {
                outcome
                    .report
                    .error(error.kind(), error.to_string(), error.provenance().cloned());
                outcome.enter(BuildState::Failed);
            }
            Err(Failure::Promoted(count)) => {
                error!(promoted = count, "strict mode: warnings promoted to errors");
                outcome.enter(BuildState::Failed);
            }
        }
        outcome
    }

    fn stages(
        &self,
        input: &BuildInput,
        sink: &mut dyn OntologySink,
        outcome: &mut BuildOutcome,
    ) -> Result<(), Failure> {
        outcome.enter(BuildState::Loading);
        let settings = self.config.validate()?;
        let catalog = self.catalog()?;

        outcome.enter(BuildState::Compiling);
        let context = self.compile(&settings, &catalog, input, outcome)?;

        outcome.enter(BuildState::ImportResolution);
        let closure = self.resolve_imports(&settings, &catalog, input, &context, outcome)?;

        outcome.enter(BuildState::Reasoning);
        let mark = outcome.report.len();
        let mut reasoned = context.ontology().clone();
        for module in closure.modules().values() {
            reasoned.merge(module);
        }
        self.reason(&reasoned, outcome)?;
        self.finish_stage(outcome, mark)?;

        outcome.enter(BuildState::Merging);
        let mut ontology = context.into_ontology();
        for module in closure.modules().values() {
            if self.config.merge_imports {
                ontology.merge(module);
            } else if let Some(iri) = module.iri() {
                ontology.add_import(iri.clone());
            }
        }
        if self.config.add_inferred {
            let inferred = outcome
                .verdict
                .as_ref()
                .and_then(|verdict| verdict.inferred.as_ref());
            for axiom in inferred.into_iter().flatten() {
                ontology.insert(axiom.clone());
            }
        }
        info!(axioms = ontology.len(), imports = closure.modules().len(), "merged");
        outcome.imports = closure.into_modules();

        outcome.enter(BuildState::Writing);
        let written = self.write(&ontology, &outcome.imports, sink);
        outcome.ontology = Some(ontology);
        written
    }

    fn write(
        &self,
        ontology: &OntologyModule,
        imports: &BTreeMap<String, OntologyModule>,
        sink: &mut dyn OntologySink,
    ) -> Result<(), Failure> {
        for format in &self.config.output_formats {
            sink.write(*format, ontology, imports)
                .map_err(|source| BuildError::Output {
                    format: format.to_string(),
                    source,
                })?;
        }
        Ok(())
    }

    /// The catalog restricted to the configured sources.
    fn catalog(&self) -> Result<Cow<'_, Catalog>, ConfigError> {
        if self.config.import_catalog.is_empty() {
            return Ok(Cow::Borrowed(&self.catalog));
        }
        self.catalog
            .restricted_to(self.config.import_catalog.keys().map(String::as_str))
            .map(Cow::Owned)
            .map_err(|name| ConfigError::UnknownSource(name.to_owned()))
    }

    fn compile(
        &self,
        settings: &BuildSettings,
        catalog: &Catalog,
        input: &BuildInput,
        outcome: &mut BuildOutcome,
    ) -> Result<BuildContext, Failure> {
        let mark = outcome.report.len();
        let compiler = Compiler::new(settings, catalog);
        let mut context =
            BuildContext::new(settings.ontology_iri.clone(), settings.version_iri.clone());
        let declared = compiler.declare(&mut context, &input.tables);
        if declared.is_ok() {
            compiler.compile_expressions(&mut context);
        }
        outcome.report.append(context.take_report());
        declared?;
        self.finish_stage(outcome, mark)?;
        Ok(context)
    }

    fn resolve_imports(
        &self,
        settings: &BuildSettings,
        catalog: &Catalog,
        input: &BuildInput,
        context: &BuildContext,
        outcome: &mut BuildOutcome,
    ) -> Result<ImportClosure, Failure> {
        let mark = outcome.report.len();
        let mut builder =
            ImportClosureBuilder::new(catalog).with_module_base(settings.module_base.as_str());
        for (source, terms) in &input.import_terms {
            builder = builder.with_terms(source.as_str(), terms.iter().cloned());
        }
        let closure = builder.build(&context.external_signature())?;
        for iri in closure.missing() {
            outcome.report.warning(
                ErrorKind::MissingTerm,
                format!("{iri} is not defined by any source ontology"),
                context.first_reference(iri).cloned(),
            );
        }
        self.finish_stage(outcome, mark)?;
        Ok(closure)
    }

    fn reason(
        &self,
        ontology: &OntologyModule,
        outcome: &mut BuildOutcome,
    ) -> Result<(), BuildError> {
        info!(reasoner = self.reasoner.name(), axioms = ontology.len(), "reasoning");
        let verdict = self
            .reasoner
            .check(ontology)
            .map_err(|error| match error {
                ReasonerError::Timeout(timeout) => BuildError::ReasonerTimeout(timeout),
                ReasonerError::Backend(message) => BuildError::Reasoner(message),
            })?;
        let verdict = outcome.verdict.insert(verdict);
        if !verdict.consistent {
            return Err(BuildError::Inconsistency {
                explanation: verdict
                    .explanation
                    .clone()
                    .unwrap_or_else(|| "no explanation given by the reasoner".into()),
            });
        }
        if verdict.unsatisfiable.is_empty() {
            return Ok(());
        }
        let classes = verdict
            .unsatisfiable
            .iter()
            .cloned()
            .collect::<Signature>();
        match self.config.unsatisfiable_severity {
            Severity::Error => Err(BuildError::Unsatisfiable { classes }),
            Severity::Warning => {
                outcome.report.warning(
                    ErrorKind::Inconsistency,
                    format!("unsatisfiable classes: {classes}"),
                    None,
                );
                Ok(())
            }
        }
    }

    /// In strict mode, fails if the stage reported anything since `mark`.
    fn finish_stage(&self, outcome: &mut BuildOutcome, mark: usize) -> Result<(), Failure> {
        if !self.config.strict_mode {
            return Ok(());
        }
        match outcome.report.promote_since(mark) {
            0 => Ok(()),
            promoted => Err(Failure::Promoted(promoted)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Provenance, TermRecord};
    use crate::sink::MemorySink;
    use oxonto::EntityKind;
    use std::io;

    struct FailingSink;

    impl OntologySink for FailingSink {
        fn write(
            &mut self,
            _: crate::config::OutputFormat,
            _: &OntologyModule,
            _: &BTreeMap<String, OntologyModule>,
        ) -> io::Result<()> {
            Err(io::Error::other("disk full"))
        }
    }

    fn input() -> BuildInput {
        let mut table = SourceTable::new("terms.csv");
        table.push(
            TermRecord::new("OBTO:0001", EntityKind::Class, Provenance::new("terms.csv", 2))
                .with_parent("OBTO:0404"),
        );
        BuildInput::new([table])
    }

    fn config() -> BuildConfig {
        BuildConfig::new("http://purl.obolibrary.org/obo/obto/")
    }

    #[test]
    fn lenient_build() {
        let orchestrator = BuildOrchestrator::from_config(config(), Catalog::new()).unwrap();
        let mut sink = MemorySink::new();
        let outcome = orchestrator.run(&input(), &mut sink);
        assert_eq!(
            outcome.states(),
            [
                BuildState::Idle,
                BuildState::Loading,
                BuildState::Compiling,
                BuildState::ImportResolution,
                BuildState::Reasoning,
                BuildState::Merging,
                BuildState::Writing,
                BuildState::Done,
            ]
        );
        let entries = outcome.report().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, ErrorKind::MissingTerm);
        assert_eq!(entries[0].provenance, Some(Provenance::new("terms.csv", 2)));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn strict_build() {
        let mut config = config();
        config.strict_mode = true;
        let orchestrator = BuildOrchestrator::from_config(config, Catalog::new()).unwrap();
        let outcome = orchestrator.run(&input(), &mut MemorySink::new());
        assert_eq!(outcome.state(), BuildState::Failed);
        assert_eq!(
            outcome.states().last(),
            Some(&BuildState::Failed)
        );
        assert!(!outcome.states().contains(&BuildState::Reasoning));
        assert!(outcome.report().has_errors());
        assert!(outcome.ontology().is_none());
    }

    #[test]
    fn configuration_and_output_errors() {
        let mut unsupported = config();
        unsupported.reasoner = ReasonerKind::Hermit;
        assert!(matches!(
            BuildOrchestrator::from_config(unsupported, Catalog::new()),
            Err(ConfigError::UnsupportedReasoner(ReasonerKind::Hermit))
        ));

        let mut unknown_source = config();
        unknown_source
            .import_catalog
            .insert("po".into(), "po.owl".into());
        let outcome = BuildOrchestrator::from_config(unknown_source, Catalog::new())
            .unwrap()
            .run(&input(), &mut MemorySink::new());
        assert_eq!(
            outcome.states(),
            [BuildState::Idle, BuildState::Loading, BuildState::Failed]
        );
        assert_eq!(outcome.report().count(ErrorKind::Configuration), 1);

        let outcome = BuildOrchestrator::from_config(config(), Catalog::new())
            .unwrap()
            .run(&input(), &mut FailingSink);
        assert_eq!(outcome.state(), BuildState::Failed);
        assert_eq!(outcome.report().count(ErrorKind::Output), 1);
        assert!(outcome.ontology().is_some());
    }
}
