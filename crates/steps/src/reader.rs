//! Shared reader generation: a value holder around one locator with
//! lazily parsed, bitmask-guarded accessors.

use crate::names::sanitize_ident;
use indexmap::IndexMap;
use proc_macro2::{Literal, TokenStream};
use quote::{format_ident, quote};
use smol_str::SmolStr;
use uriscope_api::{AdapterRef, ConstantParam, ConstantValue, TypeDesc};
use uriscope_core::convert::rust_type;
use uriscope_core::schema::{ReadQuery, ReadSegment, ReaderSchema};
use uriscope_core::{Result, TypeConverter};
use uriscope_codegen::{ClassSpec, FieldSpec, MethodSpec, Param, Receiver};

pub(crate) fn generate_reader_class(
    converter: &TypeConverter,
    class_name: &str,
    schema: &ReaderSchema,
    implements: Option<&str>,
) -> Result<ClassSpec> {
    let mut class = ClassSpec::new(class_name);
    if let Some(interface) = implements {
        class = class.implementing(interface);
    }

    class.add_field(FieldSpec::new("uri", quote! { uriscope_runtime::Locator }));
    class.add_field(FieldSpec::new("parse_flags", quote! { u64 }));

    let mut field_idents = Vec::new();
    for segment in &schema.segments {
        let stored = rust_type(&segment.var.ty, segment.var.nullable);
        class.add_field(FieldSpec::new(segment.var.field.as_str(), quote! { Option<#stored> }));
        field_idents.push(format_ident!("{}", segment.var.field.as_str()));
    }
    for query in &schema.query {
        let stored = rust_type(&query.ty, query.nullable);
        class.add_field(FieldSpec::new(query.field.as_str(), quote! { Option<#stored> }));
        field_idents.push(format_ident!("{}", query.field.as_str()));
    }

    class.add_method(
        MethodSpec::new("new", Receiver::Static)
            .with_param(Param::new("uri", quote! { uriscope_runtime::Locator }))
            .returns(quote! { Self })
            .with_body(quote! {
                Self {
                    uri,
                    parse_flags: 0u64,
                    #(#field_idents: None,)*
                }
            }),
    );

    let mut bit = 0usize;
    for segment in &schema.segments {
        class.add_method(segment_accessor(converter, &schema.source, segment, bit)?);
        bit += 1;
    }
    for query in &schema.query {
        class.add_method(query_accessor(converter, &schema.source, query, bit)?);
        bit += 1;
    }

    add_constant_getters(&mut class, &schema.constants);

    class.add_method(
        MethodSpec::new("to_string", Receiver::Ref)
            .returns(quote! { String })
            .with_body(quote! { self.uri.to_string() }),
    );

    Ok(class)
}

/// Typed expression for a default literal, `Some`-wrapped for nullable
/// fields and routed through the adapter when one is declared.
fn default_value_expr(
    converter: &TypeConverter,
    decl: &SmolStr,
    literal: &str,
    ty: &TypeDesc,
    nullable: bool,
    adapter: Option<&AdapterRef>,
) -> Result<TokenStream> {
    let value = match adapter {
        Some(adapter) => {
            let adapter_expr = converter.adapter_expr(adapter);
            let lit = Literal::string(literal);
            quote! { #adapter_expr.deserialize(#lit)? }
        }
        None => converter.default_expr(decl, literal, ty)?,
    };
    if nullable {
        Ok(quote! { Some(#value) })
    } else {
        Ok(value)
    }
}

fn read_raw_expr(
    converter: &TypeConverter,
    decl: &SmolStr,
    field: &SmolStr,
    ty: &TypeDesc,
    nullable: bool,
    default: Option<&str>,
    adapter: Option<&AdapterRef>,
) -> Result<TokenStream> {
    match adapter {
        Some(adapter) => Ok(converter.read_adapter_expr(quote! { raw }, adapter, nullable)),
        None => converter.read_scalar_expr(decl, field, quote! { raw }, ty, nullable, default),
    }
}

fn accessor_shell(
    field: &SmolStr,
    stored: &TokenStream,
    bit: usize,
    compute: TokenStream,
) -> MethodSpec {
    let ident = format_ident!("{}", field.as_str());
    let mask = Literal::u64_suffixed(1u64 << bit);
    MethodSpec::new(sanitize_ident(field), Receiver::Mut)
        .returns(quote! { Result<#stored, uriscope_runtime::RuntimeError> })
        .with_body(quote! {
            if self.parse_flags & #mask == 0 {
                let value = #compute;
                self.#ident = Some(value);
                self.parse_flags |= #mask;
            }
            Ok(self.#ident.clone().expect("value parsed"))
        })
}

fn segment_accessor(
    converter: &TypeConverter,
    decl: &SmolStr,
    segment: &ReadSegment,
    bit: usize,
) -> Result<MethodSpec> {
    let var = &segment.var;
    let name = segment.name.as_str();
    let position = segment.position;
    let stored = rust_type(&var.ty, var.nullable);

    let absent = match var.default.as_deref() {
        Some(literal) => default_value_expr(
            converter,
            decl,
            literal,
            &var.ty,
            var.nullable,
            var.adapter.as_ref(),
        )?,
        None => quote! {
            return Err(uriscope_runtime::RuntimeError::MissingSegment {
                name: #name.to_string(),
                uri: self.uri.to_string(),
            })
        },
    };
    let read = read_raw_expr(
        converter,
        decl,
        &var.field,
        &var.ty,
        var.nullable,
        var.default.as_deref(),
        var.adapter.as_ref(),
    )?;

    let compute = quote! {
        {
            let segments = self.uri.path_segments();
            if segments.len() <= #position {
                #absent
            } else {
                let raw = segments[#position].as_str();
                #read
            }
        }
    };
    Ok(accessor_shell(&var.field, &stored, bit, compute))
}

fn query_accessor(
    converter: &TypeConverter,
    decl: &SmolStr,
    query: &ReadQuery,
    bit: usize,
) -> Result<MethodSpec> {
    let name = query.name.as_str();
    let stored = rust_type(&query.ty, query.nullable);

    let compute = if let TypeDesc::Array(element) = &query.ty {
        let absent = match query.default.as_deref() {
            Some(literal) => {
                let array = converter.default_array_expr(
                    decl,
                    literal,
                    element,
                    query.adapter.as_ref(),
                )?;
                if query.nullable {
                    quote! { Some(#array) }
                } else {
                    array
                }
            }
            None if query.nullable => quote! { None },
            None => quote! {
                return Err(uriscope_runtime::RuntimeError::MissingParameter {
                    name: #name.to_string(),
                    uri: self.uri.to_string(),
                })
            },
        };
        let element_expr = match query.adapter.as_ref() {
            Some(adapter) => {
                let adapter_expr = converter.adapter_expr(adapter);
                quote! { #adapter_expr.deserialize(raw)? }
            }
            None => converter.read_scalar_expr(
                decl,
                &query.field,
                quote! { raw },
                element,
                false,
                query.default.as_deref(),
            )?,
        };
        let mut collected = quote! {
            {
                let mut items = Vec::with_capacity(raws.len());
                for raw in &raws {
                    let raw = raw.as_str();
                    items.push(#element_expr);
                }
                items
            }
        };
        if query.nullable {
            collected = quote! { Some(#collected) };
        }
        quote! {
            {
                let raws = self.uri.query_values(#name);
                if raws.is_empty() {
                    #absent
                } else {
                    #collected
                }
            }
        }
    } else {
        let absent = match query.default.as_deref() {
            Some(literal) => default_value_expr(
                converter,
                decl,
                literal,
                &query.ty,
                query.nullable,
                query.adapter.as_ref(),
            )?,
            None if query.nullable => quote! { None },
            None => quote! {
                return Err(uriscope_runtime::RuntimeError::MissingParameter {
                    name: #name.to_string(),
                    uri: self.uri.to_string(),
                })
            },
        };
        let read = read_raw_expr(
            converter,
            decl,
            &query.field,
            &query.ty,
            query.nullable,
            query.default.as_deref(),
            query.adapter.as_ref(),
        )?;
        quote! {
            match self.uri.query_value(#name) {
                Some(raw) => {
                    let raw = raw.as_str();
                    #read
                }
                None => #absent,
            }
        }
    };

    Ok(accessor_shell(&query.field, &stored, bit, compute))
}

/// Getters for declaration-level constant parameters. One value yields a
/// scalar getter, several same-named values an array getter.
fn add_constant_getters(class: &mut ClassSpec, constants: &[ConstantParam]) {
    let mut groups: IndexMap<(&str, u8), Vec<&ConstantValue>> = IndexMap::new();
    for constant in constants {
        let discr = match constant.value {
            ConstantValue::Str(_) => 0u8,
            ConstantValue::Bool(_) => 1,
            ConstantValue::Long(_) => 2,
            ConstantValue::Double(_) => 3,
        };
        groups
            .entry((constant.name.as_str(), discr))
            .or_default()
            .push(&constant.value);
    }

    for ((name, _), values) in groups {
        let ty = match values[0] {
            ConstantValue::Str(_) => quote! { String },
            ConstantValue::Bool(_) => quote! { bool },
            ConstantValue::Long(_) => quote! { i64 },
            ConstantValue::Double(_) => quote! { f64 },
        };
        let literals: Vec<TokenStream> = values
            .iter()
            .map(|value| match value {
                ConstantValue::Str(s) => {
                    let lit = Literal::string(s);
                    quote! { #lit.to_string() }
                }
                ConstantValue::Bool(b) => quote! { #b },
                ConstantValue::Long(l) => {
                    let lit = Literal::i64_suffixed(*l);
                    quote! { #lit }
                }
                ConstantValue::Double(d) => {
                    let lit = Literal::f64_suffixed(*d);
                    quote! { #lit }
                }
            })
            .collect();

        let method = if literals.len() == 1 {
            let value = &literals[0];
            MethodSpec::new(sanitize_ident(name), Receiver::Ref)
                .returns(ty)
                .with_body(quote! { #value })
        } else {
            MethodSpec::new(sanitize_ident(name), Receiver::Ref)
                .returns(quote! { Vec<#ty> })
                .with_body(quote! { vec![#(#literals),*] })
        };
        class.add_method(method);
    }
}
