//! The build report: every diagnostic of a build, in the order it was raised.

use crate::record::Provenance;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, warn};

/// How bad a report entry is.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The build goes on.
    #[default]
    Warning,
    /// The build failed.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// The error taxonomy of the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ErrorKind {
    #[serde(rename = "SyntaxError")]
    Syntax,
    #[serde(rename = "UnresolvedReferenceError")]
    UnresolvedReference,
    #[serde(rename = "DuplicateIRIError")]
    DuplicateIri,
    #[serde(rename = "MissingTermError")]
    MissingTerm,
    #[serde(rename = "InconsistencyError")]
    Inconsistency,
    #[serde(rename = "ReasonerTimeoutError")]
    ReasonerTimeout,
    #[serde(rename = "ReasonerError")]
    ReasonerFailure,
    #[serde(rename = "ConfigurationError")]
    Configuration,
    #[serde(rename = "OutputError")]
    Output,
}

impl ErrorKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Syntax => "SyntaxError",
            Self::UnresolvedReference => "UnresolvedReferenceError",
            Self::DuplicateIri => "DuplicateIRIError",
            Self::MissingTerm => "MissingTermError",
            Self::Inconsistency => "InconsistencyError",
            Self::ReasonerTimeout => "ReasonerTimeoutError",
            Self::ReasonerFailure => "ReasonerError",
            Self::Configuration => "ConfigurationError",
            Self::Output => "OutputError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One `(severity, kind, message, provenance)` diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub severity: Severity,
    pub kind: ErrorKind,
    pub message: String,
    pub provenance: Option<Provenance>,
}

impl fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.severity, self.kind)?;
        if let Some(provenance) = &self.provenance {
            write!(f, " at {provenance}")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// The ordered list of diagnostics raised during a build.
///
/// Entries are mirrored to `tracing` as they are pushed: warnings at the `WARN` level, errors at the `ERROR` level.
/// Warnings promoted to errors are logged again at the `ERROR` level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BuildReport {
    entries: Vec<ReportEntry>,
}

impl BuildReport {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ReportEntry) {
        log_entry(&entry);
        self.entries.push(entry);
    }

    pub fn warning(
        &mut self,
        kind: ErrorKind,
        message: impl Into<String>,
        provenance: Option<Provenance>,
    ) {
        self.push(ReportEntry {
            severity: Severity::Warning,
            kind,
            message: message.into(),
            provenance,
        });
    }

    pub fn error(
        &mut self,
        kind: ErrorKind,
        message: impl Into<String>,
        provenance: Option<Provenance>,
    ) {
        self.push(ReportEntry {
            severity: Severity::Error,
            kind,
            message: message.into(),
            provenance,
        });
    }

    #[inline]
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if at least one entry is fatal.
    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.severity == Severity::Error)
    }

    /// The number of entries of the given kind.
    pub fn count(&self, kind: ErrorKind) -> usize {
        self.entries.iter().filter(|entry| entry.kind == kind).count()
    }

    /// Turns the warnings pushed since the `mark`-th entry into errors, returning how many were promoted.
    pub(crate) fn promote_since(&mut self, mark: usize) -> usize {
        let mut promoted = 0;
        for entry in self.entries.iter_mut().skip(mark) {
            if entry.severity == Severity::Warning {
                entry.severity = Severity::Error;
                log_entry(entry);
                promoted += 1;
            }
        }
        promoted
    }

    pub(crate) fn append(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }
}

fn log_entry(entry: &ReportEntry) {
    match (entry.severity, &entry.provenance) {
        (Severity::Warning, Some(provenance)) => {
            warn!(kind = %entry.kind, %provenance, "{}", entry.message);
        }
        (Severity::Warning, None) => warn!(kind = %entry.kind, "{}", entry.message),
        (Severity::Error, Some(provenance)) => {
            error!(kind = %entry.kind, %provenance, "{}", entry.message);
        }
        (Severity::Error, None) => error!(kind = %entry.kind, "{}", entry.message),
    }
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a BuildReport {
    type Item = &'a ReportEntry;
    type IntoIter = std::slice::Iter<'a, ReportEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn lines(&self) -> Vec<String> {
            String::from_utf8(self.0.lock().unwrap().clone())
                .unwrap()
                .lines()
                .map(str::to_owned)
                .collect()
        }
    }

    #[test]
    fn promotion() {
        let mut report = BuildReport::new();
        report.warning(ErrorKind::Syntax, "first", None);
        let mark = report.len();
        report.warning(
            ErrorKind::UnresolvedReference,
            "second",
            Some(Provenance::new("terms.csv", 4)),
        );
        assert!(!report.has_errors());
        assert_eq!(report.promote_since(mark), 1);
        assert!(report.has_errors());
        assert_eq!(report.entries()[0].severity, Severity::Warning);
        assert_eq!(
            report.entries()[1].to_string(),
            "error UnresolvedReferenceError at terms.csv:4: second"
        );
        assert_eq!(report.count(ErrorKind::Syntax), 1);
    }

    #[test]
    fn promoted_entries_are_logged_as_errors() {
        let buffer = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer({
                let buffer = buffer.clone();
                move || buffer.clone()
            })
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let mut report = BuildReport::new();
            report.warning(
                ErrorKind::MissingTerm,
                "OBTO_0404 is not defined",
                Some(Provenance::new("terms.csv", 2)),
            );
            report.promote_since(0);
        });
        let lines = buffer.lines();
        assert_eq!(lines.len(), 2, "{lines:?}");
        assert!(lines[0].contains("WARN"));
        assert!(lines[1].contains("ERROR"));
        assert!(lines[1].contains("OBTO_0404 is not defined"));
    }
}
