//! Generates the adapter factory when one is configured: a construct-once
//! accessor per adapter type, backed by a cache owned by the factory type.

use crate::names::simple_name;
use indexmap::IndexSet;
use quote::{format_ident, quote};
use smol_str::SmolStr;
use uriscope_api::AdapterRef;
use uriscope_api::models::naming::to_snake_case;
use uriscope_core::{CompileSession, HostEnv, ProcessingStep, Result, StepReport};
use uriscope_codegen::{Artifact, ClassSpec, MethodSpec, Receiver, path_tokens};

#[derive(Default)]
pub struct AdapterFactoryStep;

impl AdapterFactoryStep {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessingStep for AdapterFactoryStep {
    fn name(&self) -> &'static str {
        "adapter-factory"
    }

    fn process(
        &mut self,
        session: &mut CompileSession,
        host: &dyn HostEnv,
        round: usize,
    ) -> Result<StepReport> {
        if round > 1 {
            return Ok(StepReport::default());
        }
        // Without a configured factory every adapter is constructed at its
        // use site and there is nothing to generate.
        let Some(factory_name) = session.options().type_adapter_factory.clone() else {
            return Ok(StepReport::default());
        };

        let mut adapters: IndexSet<AdapterRef> = IndexSet::new();
        for factory in host.factories() {
            for op in &factory.ops {
                adapters.extend(op.fields.iter().filter_map(|f| f.adapter.clone()));
            }
        }
        for reader in host.readers() {
            adapters.extend(reader.fields.iter().filter_map(|f| f.adapter.clone()));
        }
        if adapters.is_empty() {
            return Ok(StepReport::default());
        }

        let mut adapters: Vec<AdapterRef> = adapters.into_iter().collect();
        adapters.sort_by(|a, b| a.simple_name().cmp(b.simple_name()));

        let mut class = ClassSpec::new(simple_name(&factory_name));
        class.add_method(
            MethodSpec::new("cache", Receiver::Static)
                .returns(quote! { &'static uriscope_runtime::AdapterCache })
                .with_body(quote! {
                    static CACHE: std::sync::OnceLock<uriscope_runtime::AdapterCache> =
                        std::sync::OnceLock::new();
                    CACHE.get_or_init(uriscope_runtime::AdapterCache::new)
                }),
        );
        for adapter in &adapters {
            let adapter_path = path_tokens(&adapter.ty);
            let accessor = format_ident!("create_{}", to_snake_case(adapter.simple_name()));
            class.add_method(
                MethodSpec::new(accessor.to_string(), Receiver::Static)
                    .returns(quote! { std::sync::Arc<#adapter_path> })
                    .with_body(quote! { Self::cache().get_or_create(#adapter_path::new) }),
            );
        }

        let artifact = Artifact::new(factory_name.to_string(), class);
        if let Err(err) = session.emit(artifact) {
            session.record_failure(factory_name.clone(), err);
        }
        Ok(StepReport::resolved([SmolStr::from(factory_name)]))
    }
}
