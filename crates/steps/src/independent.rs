//! Generates readers for interfaces declared without a builder counterpart.
//! Field names derive from getter names; binding is strict, there is no
//! positional fallback here.

use crate::names::{impl_name, simple_name};
use crate::reader::generate_reader_class;
use uriscope_api::ReaderDecl;
use uriscope_api::models::naming::field_name_from_getter;
use uriscope_core::bind::ReaderSource;
use uriscope_core::{CompileSession, HostEnv, ProcessingStep, Result, StepReport, bind_reader};
use uriscope_codegen::Artifact;

#[derive(Default)]
pub struct IndependentReaderStep;

impl IndependentReaderStep {
    pub fn new() -> Self {
        Self
    }

    fn build_reader(&self, session: &CompileSession, reader: &ReaderDecl) -> Result<Artifact> {
        let fields: Vec<_> = reader
            .fields
            .iter()
            .map(|field| {
                let mut field = field.clone();
                field.name = field_name_from_getter(&field.name).into();
                field
            })
            .collect();

        let schema = bind_reader(
            &reader.name,
            &reader.base_path,
            &fields,
            &reader.constants,
            ReaderSource::Independent,
            session.diags(),
        )?;

        let class_name = impl_name(&reader.name);
        let class = generate_reader_class(
            session.converter(),
            simple_name(&class_name),
            &schema,
            Some(&reader.name),
        )?;
        Ok(Artifact::new(class_name.to_string(), class))
    }
}

impl ProcessingStep for IndependentReaderStep {
    fn name(&self) -> &'static str {
        "independent-reader"
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
        let mut resolved = Vec::new();
        for reader in host.readers() {
            match self.build_reader(session, &reader) {
                Ok(artifact) => {
                    if let Err(err) = session.emit(artifact) {
                        session.record_failure(reader.name.clone(), err);
                    }
                }
                Err(err) => session.record_failure(reader.name.clone(), err),
            }
            resolved.push(reader.name.clone());
        }
        Ok(StepReport::resolved(resolved))
    }
}
