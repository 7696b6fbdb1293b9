#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![doc(test(attr(deny(warnings))))]

mod compiler;
mod config;
mod context;
mod error;
pub mod imports;
mod orchestrator;
pub mod reasoner;
mod record;
mod report;
mod resolver;
mod sink;

pub use compiler::Compiler;
pub use config::{BuildConfig, BuildSettings, OutputFormat, ReasonerKind};
pub use context::{BuildContext, DeclaredRecord, TermEntry};
pub use error::{BuildError, ConfigError, RecordError};
pub use orchestrator::{BuildInput, BuildOrchestrator, BuildOutcome, BuildState};
pub use record::{AnnotationText, Provenance, SourceTable, TermRecord};
pub use report::{BuildReport, ErrorKind, ReportEntry, Severity};
pub use resolver::{LabelMap, TermResolver};
pub use sink::{MemorySink, OntologySink};
