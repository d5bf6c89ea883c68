use smol_str::SmolStr;
use std::fmt;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// One diagnostic message, tagged with the declaration it originates from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub origin: Option<SmolStr>,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(origin: Option<SmolStr>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            origin,
            message: message.into(),
        }
    }

    pub fn error(origin: Option<SmolStr>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            origin,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        match &self.origin {
            Some(origin) => write!(f, "{level}: {origin}: {}", self.message),
            None => write!(f, "{level}: {}", self.message),
        }
    }
}

/// Where diagnostics go. The sink is an external collaborator; the compiler
/// only reports, it never formats for an end user.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Default sink: forwards to `tracing`.
#[derive(Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => {
                tracing::warn!(origin = ?diagnostic.origin, "{}", diagnostic.message)
            }
            Severity::Error => {
                tracing::error!(origin = ?diagnostic.origin, "{}", diagnostic.message)
            }
        }
    }
}

/// Sink that keeps every diagnostic, for assertions in tests.
#[derive(Debug, Default)]
pub struct CollectingSink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.lock().expect("diagnostic store poisoned").clone()
    }

    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.entries()
            .into_iter()
            .filter(|d| d.severity == Severity::Warning)
            .collect()
    }

    pub fn errors(&self) -> Vec<Diagnostic> {
        self.entries()
            .into_iter()
            .filter(|d| d.severity == Severity::Error)
            .collect()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.entries
            .lock()
            .expect("diagnostic store poisoned")
            .push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_sink_partitions_by_severity() {
        let sink = CollectingSink::new();
        sink.report(Diagnostic::warning(None, "w"));
        sink.report(Diagnostic::error(Some("sample::Decl".into()), "e"));

        assert_eq!(sink.warnings().len(), 1);
        assert_eq!(sink.errors().len(), 1);
        assert_eq!(
            sink.errors()[0].to_string(),
            "error: sample::Decl: e"
        );
    }
}
