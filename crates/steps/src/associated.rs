//! Generates a reader for every builder operation that asked for one.

use crate::names::{resolve_override, sibling, simple_name};
use crate::reader::generate_reader_class;
use smol_str::SmolStr;
use uriscope_api::models::naming::reader_class_name;
use uriscope_core::bind::ReaderSource;
use uriscope_core::{CompileSession, HostEnv, ProcessingStep, Result, StepReport, bind_reader};
use uriscope_codegen::Artifact;

#[derive(Default)]
pub struct AssociatedReaderStep;

impl AssociatedReaderStep {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessingStep for AssociatedReaderStep {
    fn name(&self) -> &'static str {
        "associated-reader"
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
        for factory in host.factories() {
            for op in &factory.ops {
                let Some(request) = &op.reader else {
                    continue;
                };
                let decl = SmolStr::new(format!("{}::{}", factory.name, op.name));
                let class_name = match request.name.as_deref() {
                    Some(desired) => resolve_override(&factory.name, desired),
                    None => sibling(&factory.name, &reader_class_name(&op.name)),
                };

                let generated = bind_reader(
                    &decl,
                    &op.base_path,
                    &op.fields,
                    &op.constants,
                    ReaderSource::Associated,
                    session.diags(),
                )
                .and_then(|schema| {
                    generate_reader_class(
                        session.converter(),
                        simple_name(&class_name),
                        &schema,
                        None,
                    )
                });

                match generated {
                    Ok(class) => {
                        if let Err(err) = session.emit(Artifact::new(class_name.to_string(), class))
                        {
                            session.record_failure(decl.clone(), err);
                        }
                    }
                    Err(err) => session.record_failure(decl.clone(), err),
                }
                resolved.push(decl);
            }
        }
        Ok(StepReport::resolved(resolved))
    }
}
