//! The cross-cutting registration artifact: one accessor per generated
//! factory implementation. It can only be finalized once every factory
//! implementation is visible, so it defers until the registry has them all.

use crate::names::{DEFAULT_MODULE_NAME, impl_name, simple_name};
use quote::{format_ident, quote};
use smol_str::SmolStr;
use uriscope_api::models::naming::to_snake_case;
use uriscope_core::{CompileSession, HostEnv, ProcessingStep, Result, StepReport};
use uriscope_codegen::{Artifact, ClassSpec, MethodSpec, Receiver, path_tokens};

#[derive(Default)]
pub struct RegistryModuleStep {
    emitted: bool,
}

impl RegistryModuleStep {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProcessingStep for RegistryModuleStep {
    fn name(&self) -> &'static str {
        "registry-module"
    }

    fn process(
        &mut self,
        session: &mut CompileSession,
        host: &dyn HostEnv,
        _round: usize,
    ) -> Result<StepReport> {
        if self.emitted {
            return Ok(StepReport::default());
        }

        let factories = host.factories();
        if factories.is_empty() {
            self.emitted = true;
            return Ok(StepReport::default());
        }

        let mut deferred = Vec::new();
        let mut provided = Vec::new();
        for factory in &factories {
            // A failed factory will never produce its implementation; its
            // absence is already reported, so it is excluded rather than
            // deferred forever.
            if session.failed(&factory.name) {
                continue;
            }
            let impl_qualified = impl_name(&factory.name);
            if session.has_artifact(&impl_qualified) {
                provided.push((factory.name.clone(), impl_qualified));
            } else {
                deferred.push(factory.name.clone());
            }
        }

        if !deferred.is_empty() {
            return Ok(StepReport {
                resolved: Vec::new(),
                deferred,
            });
        }

        let module_name = session
            .options()
            .module_name
            .clone()
            .unwrap_or_else(|| SmolStr::new(DEFAULT_MODULE_NAME));

        let mut class = ClassSpec::new(simple_name(&module_name));
        provided.sort_by(|a, b| a.0.cmp(&b.0));
        for (factory_name, impl_qualified) in &provided {
            let accessor =
                format_ident!("provide_{}", to_snake_case(simple_name(factory_name)));
            let impl_path = path_tokens(impl_qualified);
            class.add_method(
                MethodSpec::new(accessor.to_string(), Receiver::Static)
                    .returns(impl_path.clone())
                    .with_body(quote! { #impl_path::new() }),
            );
        }

        let resolved: Vec<SmolStr> = provided.into_iter().map(|(name, _)| name).collect();
        let artifact = Artifact::new(module_name.to_string(), class);
        if let Err(err) = session.emit(artifact) {
            session.record_failure(module_name.clone(), err);
        }
        self.emitted = true;
        Ok(StepReport {
            resolved,
            deferred: Vec::new(),
        })
    }

    fn on_processing_over(&mut self, _session: &mut CompileSession) -> Result<()> {
        if !self.emitted {
            tracing::warn!("registration module was never finalized");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use uriscope_api::{CompilerOptions, FactoryDecl};
    use uriscope_codegen::{ClassSpec as Spec, MemoryBackend};
    use uriscope_core::diag::CollectingSink;
    use uriscope_core::host::StaticHost;

    fn squash(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn defers_until_every_factory_impl_exists() {
        let backend = Arc::new(MemoryBackend::new());
        let sink = Arc::new(CollectingSink::new());
        let mut session = CompileSession::new(CompilerOptions::default(), backend.clone(), sink);
        let host = StaticHost::new()
            .with_factory(FactoryDecl::new("sample::AFactory", "content", "a"))
            .with_factory(FactoryDecl::new("sample::BFactory", "content", "b"));

        let mut step = RegistryModuleStep::new();
        let report = step.process(&mut session, &host, 1).unwrap();
        assert_eq!(report.deferred.len(), 2);

        // One impl appears; still deferred on the other.
        session
            .emit(Artifact::new("sample::AFactoryImpl", Spec::new("AFactoryImpl")))
            .unwrap();
        let report = step.process(&mut session, &host, 2).unwrap();
        assert_eq!(report.deferred, vec![SmolStr::new("sample::BFactory")]);

        session
            .emit(Artifact::new("sample::BFactoryImpl", Spec::new("BFactoryImpl")))
            .unwrap();
        let report = step.process(&mut session, &host, 3).unwrap();
        assert!(report.deferred.is_empty());
        assert!(session.has_artifact(DEFAULT_MODULE_NAME));

        let rendered = squash(&backend.rendered(DEFAULT_MODULE_NAME).unwrap());
        assert!(rendered.contains("pubfnprovide_a_factory()->sample::AFactoryImpl"));
        assert!(rendered.contains("sample::BFactoryImpl::new()"));
    }

    #[test]
    fn module_name_override_is_honored() {
        let backend = Arc::new(MemoryBackend::new());
        let sink = Arc::new(CollectingSink::new());
        let options = CompilerOptions {
            type_adapter_factory: None,
            module_name: Some("sample::LocatorModule".into()),
        };
        let mut session = CompileSession::new(options, backend.clone(), sink);
        let host = StaticHost::new().with_factory(FactoryDecl::new("sample::AFactory", "content", "a"));

        session
            .emit(Artifact::new("sample::AFactoryImpl", Spec::new("AFactoryImpl")))
            .unwrap();
        RegistryModuleStep::new()
            .process(&mut session, &host, 1)
            .unwrap();
        assert!(session.has_artifact("sample::LocatorModule"));
    }

    #[test]
    fn failed_factories_are_excluded_not_awaited() {
        let backend = Arc::new(MemoryBackend::new());
        let sink = Arc::new(CollectingSink::new());
        let mut session = CompileSession::new(CompilerOptions::default(), backend.clone(), sink);
        session.record_failure(
            "sample::BrokenFactory",
            uriscope_core::CompileError::Invalid("boom".to_string()),
        );
        let host = StaticHost::new()
            .with_factory(FactoryDecl::new("sample::BrokenFactory", "content", "a"));

        let report = RegistryModuleStep::new()
            .process(&mut session, &host, 1)
            .unwrap();
        assert!(report.deferred.is_empty());
        // The module still materializes, without the broken factory.
        let rendered = backend.rendered(DEFAULT_MODULE_NAME).unwrap();
        assert!(!rendered.contains("BrokenFactory"));
    }
}
