//! The processing steps: one per generated artifact family.

pub mod adapter_factory;
pub mod associated;
pub mod factory;
pub mod independent;
pub mod matcher;
pub mod names;
pub mod reader;
pub mod registry;

pub use adapter_factory::AdapterFactoryStep;
pub use associated::AssociatedReaderStep;
pub use factory::BuilderFactoryStep;
pub use independent::IndependentReaderStep;
pub use matcher::MatcherStep;
pub use registry::RegistryModuleStep;

use std::sync::Arc;
use uriscope_api::CompilerOptions;
use uriscope_codegen::SourceBackend;
use uriscope_core::{
    CompileError, CompileReport, CompileSession, DiagnosticSink, HostEnv, ProcessingStep, Result,
    Scheduler,
};

/// The full step set, in the order independent artifacts are produced
/// before dependent ones.
pub fn standard_steps() -> Vec<Box<dyn ProcessingStep>> {
    vec![
        Box::new(BuilderFactoryStep::new()),
        Box::new(AssociatedReaderStep::new()),
        Box::new(IndependentReaderStep::new()),
        Box::new(MatcherStep::new()),
        Box::new(AdapterFactoryStep::new()),
        Box::new(RegistryModuleStep::new()),
    ]
}

/// Compiles everything the host exposes. Per-declaration failures are
/// reported through the sink and counted on the report; only unresolved
/// deferrals and infrastructure failures produce an `Err`.
pub fn compile(
    host: &dyn HostEnv,
    backend: Arc<dyn SourceBackend>,
    diags: Arc<dyn DiagnosticSink>,
) -> Result<CompileReport> {
    let options = CompilerOptions::from_map(&host.options())
        .map_err(|err| CompileError::Invalid(err.to_string()))?;
    let mut session = CompileSession::new(options, backend, diags);
    let mut scheduler = Scheduler::new(standard_steps());
    scheduler.run(host, &mut session)
}
