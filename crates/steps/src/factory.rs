//! Generates one builder implementation per factory interface.

use crate::names::{impl_name, simple_name};
use proc_macro2::Ident;
use quote::{format_ident, quote};
use smol_str::SmolStr;
use uriscope_api::{BuilderOpDecl, ConstantValue, FactoryDecl, TypeDesc};
use uriscope_core::convert::param_type;
use uriscope_core::schema::{BuilderSchema, WriteSegment};
use uriscope_core::{
    CompileSession, HostEnv, ProcessingStep, Result, StepReport, TypeConverter, bind_builder,
};
use uriscope_codegen::{Artifact, ClassSpec, MethodSpec, Param, Receiver};

#[derive(Default)]
pub struct BuilderFactoryStep;

impl BuilderFactoryStep {
    pub fn new() -> Self {
        Self
    }

    fn build_factory(&self, session: &CompileSession, factory: &FactoryDecl) -> Result<Artifact> {
        let mut class = ClassSpec::new(format!("{}{}", simple_name(&factory.name), "Impl"))
            .implementing(factory.name.to_string());
        class.add_method(
            MethodSpec::new("new", Receiver::Static)
                .returns(quote! { Self })
                .with_body(quote! { Self }),
        );

        for op in &factory.ops {
            let schema = bind_builder(factory, op, session.diags())?;
            let decl = SmolStr::new(format!("{}::{}", factory.name, op.name));
            class.add_method(build_op_method(session.converter(), &decl, op, &schema)?);
        }

        Ok(Artifact::new(impl_name(&factory.name).to_string(), class))
    }
}

impl ProcessingStep for BuilderFactoryStep {
    fn name(&self) -> &'static str {
        "builder-factory"
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
            match self.build_factory(session, &factory) {
                Ok(artifact) => {
                    if let Err(err) = session.emit(artifact) {
                        session.record_failure(factory.name.clone(), err);
                    }
                }
                Err(err) => session.record_failure(factory.name.clone(), err),
            }
            resolved.push(factory.name.clone());
        }
        Ok(StepReport::resolved(resolved))
    }
}

fn append_method(encoded: bool) -> Ident {
    if encoded {
        format_ident!("append_encoded_path")
    } else {
        format_ident!("append_path")
    }
}

fn build_op_method(
    converter: &TypeConverter,
    decl: &SmolStr,
    op: &BuilderOpDecl,
    schema: &BuilderSchema,
) -> Result<MethodSpec> {
    let scheme = schema.scheme.as_str();
    let authority = schema.authority.as_str();
    let mut body = quote! {
        let mut builder = uriscope_runtime::LocatorBuilder::new()
            .scheme(#scheme)
            .authority(#authority);
    };

    for segment in &schema.segments {
        match segment {
            WriteSegment::Constant { value, encoded } => {
                let method = append_method(*encoded);
                let value = value.as_str();
                body.extend(quote! { builder.#method(#value); });
            }
            WriteSegment::Variable(var) => {
                let ident = format_ident!("{}", var.field.as_str());
                let method = append_method(var.encoded);
                if var.nullable {
                    // The binder guarantees a default for nullable path fields.
                    let default = var.default.as_deref().unwrap_or("");
                    let serialized = converter.serialize_expr(
                        decl,
                        &var.field,
                        quote! { value },
                        &var.ty,
                        var.adapter.as_ref(),
                    )?;
                    body.extend(quote! {
                        if let Some(value) = #ident {
                            builder.#method(#serialized);
                        } else {
                            builder.#method(#default);
                        }
                    });
                } else {
                    let serialized = converter.serialize_expr(
                        decl,
                        &var.field,
                        quote! { #ident },
                        &var.ty,
                        var.adapter.as_ref(),
                    )?;
                    body.extend(quote! { builder.#method(#serialized); });
                }
            }
        }
    }

    for query in &schema.query {
        let ident = format_ident!("{}", query.field.as_str());
        let name = query.name.as_str();
        if let TypeDesc::Array(element) = &query.ty {
            let serialized = converter.serialize_expr(
                decl,
                &query.field,
                quote! { value },
                element,
                query.adapter.as_ref(),
            )?;
            let append_all = quote! {
                for value in values {
                    builder.append_query(#name, #serialized);
                }
            };
            if query.nullable {
                body.extend(quote! {
                    if let Some(values) = #ident {
                        #append_all
                    }
                });
            } else {
                body.extend(quote! {
                    {
                        let values = #ident;
                        #append_all
                    }
                });
            }
        } else if query.nullable {
            let serialized = converter.serialize_expr(
                decl,
                &query.field,
                quote! { value },
                &query.ty,
                query.adapter.as_ref(),
            )?;
            let mut guarded = quote! {
                if let Some(value) = #ident {
                    builder.append_query(#name, #serialized);
                }
            };
            if let Some(default) = query.default.as_deref() {
                guarded = quote! {
                    if let Some(value) = #ident {
                        builder.append_query(#name, #serialized);
                    } else {
                        builder.append_query(#name, #default);
                    }
                };
            }
            body.extend(guarded);
        } else {
            let serialized = converter.serialize_expr(
                decl,
                &query.field,
                quote! { #ident },
                &query.ty,
                query.adapter.as_ref(),
            )?;
            body.extend(quote! { builder.append_query(#name, #serialized); });
        }
    }

    for constant in &schema.constants {
        let name = constant.name.as_str();
        let value = constant_string(&constant.value);
        body.extend(quote! { builder.append_query(#name, #value); });
    }

    body.extend(quote! { builder.build() });

    let mut method = MethodSpec::new(op.name.as_str(), Receiver::Ref)
        .returns(quote! { uriscope_runtime::Locator });
    for field in &op.fields {
        method = method.with_param(Param::new(
            field.name.as_str(),
            param_type(&field.ty, field.nullable),
        ));
    }
    Ok(method.with_body(body))
}

fn constant_string(value: &ConstantValue) -> String {
    match value {
        ConstantValue::Str(s) => s.clone(),
        ConstantValue::Bool(b) => b.to_string(),
        ConstantValue::Long(l) => l.to_string(),
        ConstantValue::Double(d) => d.to_string(),
    }
}
