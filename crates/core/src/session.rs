use crate::convert::TypeConverter;
use crate::diag::{Diagnostic, DiagnosticSink};
use crate::error::{CompileError, Result};
use indexmap::IndexSet;
use smol_str::SmolStr;
use std::sync::Arc;
use uriscope_api::CompilerOptions;
use uriscope_codegen::{Artifact, SourceBackend};

/// Shared state of one compilation: options, the diagnostics sink, the
/// emission backend and the artifact registry. The registry is the symbol
/// universe cross-referencing steps resolve against; it only ever grows.
pub struct CompileSession {
    options: CompilerOptions,
    backend: Arc<dyn SourceBackend>,
    diags: Arc<dyn DiagnosticSink>,
    converter: TypeConverter,
    registry: IndexSet<SmolStr>,
    failures: Vec<(SmolStr, CompileError)>,
}

impl CompileSession {
    pub fn new(
        options: CompilerOptions,
        backend: Arc<dyn SourceBackend>,
        diags: Arc<dyn DiagnosticSink>,
    ) -> Self {
        let converter = TypeConverter::new(options.type_adapter_factory.clone());
        Self {
            options,
            backend,
            diags,
            converter,
            registry: IndexSet::new(),
            failures: Vec::new(),
        }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn converter(&self) -> &TypeConverter {
        &self.converter
    }

    pub fn diags(&self) -> &dyn DiagnosticSink {
        self.diags.as_ref()
    }

    pub fn warn(&self, origin: impl Into<SmolStr>, message: impl Into<String>) {
        self.diags
            .report(Diagnostic::warning(Some(origin.into()), message));
    }

    /// Hands one artifact to the backend and registers it. A failed write
    /// is fatal for the producing declaration and is not retried.
    pub fn emit(&mut self, artifact: Artifact) -> Result<()> {
        self.backend.emit(&artifact)?;
        self.registry.insert(SmolStr::new(&artifact.name));
        tracing::debug!("Emitted {}", artifact.name);
        Ok(())
    }

    pub fn has_artifact(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    pub fn artifacts(&self) -> impl Iterator<Item = &SmolStr> {
        self.registry.iter()
    }

    pub fn artifact_count(&self) -> usize {
        self.registry.len()
    }

    /// Records a per-declaration failure. The declaration stops compiling;
    /// siblings are unaffected.
    pub fn record_failure(&mut self, decl: impl Into<SmolStr>, error: CompileError) {
        let decl = decl.into();
        self.diags
            .report(Diagnostic::error(Some(decl.clone()), error.to_string()));
        self.failures.push((decl, error));
    }

    pub fn failed(&self, decl: &str) -> bool {
        self.failures.iter().any(|(name, _)| name == decl)
    }

    pub fn failures(&self) -> &[(SmolStr, CompileError)] {
        &self.failures
    }
}
