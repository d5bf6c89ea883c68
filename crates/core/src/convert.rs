//! The type conversion engine: emits serialization expressions and
//! deserialization fragments against the runtime support API.
//!
//! Compile-time validation happens here. Default literals are parsed while
//! compiling, so a malformed default fails the declaration instead of the
//! generated code; runtime numeric parses stay lenient per the fallback
//! chain (explicit default, then null, then the zero value).

use crate::error::{CompileError, Result};
use proc_macro2::{Literal, TokenStream};
use quote::{format_ident, quote};
use smol_str::SmolStr;
use uriscope_api::models::naming::to_snake_case;
use uriscope_api::{AdapterRef, ScalarKind, TypeDesc};
use uriscope_codegen::path_tokens;

/// Separator for multi-element default literals of adapter-backed arrays.
pub const ARRAY_DEFAULT_SEPARATOR: char = ';';

#[derive(Debug, Clone, Default)]
pub struct TypeConverter {
    adapter_factory: Option<SmolStr>,
}

impl TypeConverter {
    pub fn new(adapter_factory: Option<SmolStr>) -> Self {
        Self { adapter_factory }
    }

    /// Expression constructing (or fetching) an adapter instance. With a
    /// configured factory the instance comes out of the factory's cache;
    /// without one a fresh adapter is built at the use site.
    pub fn adapter_expr(&self, adapter: &AdapterRef) -> TokenStream {
        let adapter_path = path_tokens(&adapter.ty);
        match &self.adapter_factory {
            Some(factory) => {
                let factory_path = path_tokens(factory);
                let accessor = format_ident!("create_{}", to_snake_case(adapter.simple_name()));
                quote! { #factory_path::#accessor() }
            }
            None => quote! { #adapter_path::new() },
        }
    }

    /// Serialize `value` (a place expression) to a string expression.
    pub fn serialize_expr(
        &self,
        decl: &SmolStr,
        name: &SmolStr,
        value: TokenStream,
        ty: &TypeDesc,
        adapter: Option<&AdapterRef>,
    ) -> Result<TokenStream> {
        if let Some(adapter) = adapter {
            let adapter_expr = self.adapter_expr(adapter);
            return Ok(quote! { #adapter_expr.serialize(&#value) });
        }
        match ty {
            TypeDesc::Str => Ok(value),
            TypeDesc::Scalar(_) | TypeDesc::Boxed(_) | TypeDesc::Locator => {
                Ok(quote! { #value.to_string() })
            }
            TypeDesc::Array(_) | TypeDesc::Custom(_) => Err(CompileError::UnknownType {
                decl: decl.clone(),
                name: name.clone(),
                ty: ty.to_string(),
            }),
        }
    }

    /// Typed literal for a default value, validated at compile time.
    pub fn default_expr(&self, decl: &SmolStr, literal: &str, ty: &TypeDesc) -> Result<TokenStream> {
        if literal.is_empty() && !matches!(ty, TypeDesc::Str | TypeDesc::Locator) {
            return Err(CompileError::EmptyDefault {
                decl: decl.clone(),
                ty: ty.to_string(),
            });
        }
        match ty {
            TypeDesc::Str => {
                let lit = Literal::string(literal);
                Ok(quote! { #lit.to_string() })
            }
            TypeDesc::Locator => {
                if literal.is_empty() {
                    Ok(quote! { uriscope_runtime::Locator::empty() })
                } else {
                    let lit = Literal::string(literal);
                    Ok(quote! { uriscope_runtime::Locator::parse(#lit) })
                }
            }
            TypeDesc::Scalar(kind) | TypeDesc::Boxed(kind) => {
                self.scalar_default(decl, literal, *kind, ty)
            }
            TypeDesc::Array(_) | TypeDesc::Custom(_) => Err(CompileError::InvalidDefault {
                decl: decl.clone(),
                value: literal.to_string(),
                ty: ty.to_string(),
            }),
        }
    }

    fn scalar_default(
        &self,
        decl: &SmolStr,
        literal: &str,
        kind: ScalarKind,
        ty: &TypeDesc,
    ) -> Result<TokenStream> {
        let invalid = || CompileError::InvalidDefault {
            decl: decl.clone(),
            value: literal.to_string(),
            ty: ty.to_string(),
        };
        let lit = match kind {
            ScalarKind::Bool => {
                let value = literal.eq_ignore_ascii_case("true");
                return Ok(quote! { #value });
            }
            ScalarKind::Char => {
                let c = literal.chars().next().ok_or_else(invalid)?;
                Literal::character(c)
            }
            ScalarKind::I8 => Literal::i8_suffixed(literal.parse().map_err(|_| invalid())?),
            ScalarKind::I16 => Literal::i16_suffixed(literal.parse().map_err(|_| invalid())?),
            ScalarKind::I32 => Literal::i32_suffixed(literal.parse().map_err(|_| invalid())?),
            ScalarKind::I64 => Literal::i64_suffixed(literal.parse().map_err(|_| invalid())?),
            ScalarKind::F32 => Literal::f32_suffixed(literal.parse().map_err(|_| invalid())?),
            ScalarKind::F64 => Literal::f64_suffixed(literal.parse().map_err(|_| invalid())?),
        };
        Ok(quote! { #lit })
    }

    /// Expression deserializing `raw` (an expression of type `&str`) into
    /// the stored field type: `Option<T>` for nullable fields, `T`
    /// otherwise. Adapter failures propagate with `?`; numeric parse
    /// failures never do.
    pub fn read_scalar_expr(
        &self,
        decl: &SmolStr,
        name: &SmolStr,
        raw: TokenStream,
        ty: &TypeDesc,
        nullable: bool,
        default: Option<&str>,
    ) -> Result<TokenStream> {
        let value = self.read_scalar_value(decl, name, raw, ty, nullable, default)?;
        // Nullable scalar kinds already produce an Option.
        let wraps_option = nullable
            && matches!(ty.scalar_kind(), Some(kind) if kind != ScalarKind::Bool)
            && default.is_none();
        if nullable && !wraps_option {
            Ok(quote! { Some(#value) })
        } else {
            Ok(value)
        }
    }

    fn read_scalar_value(
        &self,
        decl: &SmolStr,
        name: &SmolStr,
        raw: TokenStream,
        ty: &TypeDesc,
        nullable: bool,
        default: Option<&str>,
    ) -> Result<TokenStream> {
        match ty {
            TypeDesc::Str => Ok(quote! { #raw.to_string() }),
            TypeDesc::Locator => Ok(quote! { uriscope_runtime::Locator::parse(#raw) }),
            TypeDesc::Scalar(kind) | TypeDesc::Boxed(kind) => match kind {
                ScalarKind::Bool => Ok(quote! { uriscope_runtime::convert::parse_bool(#raw) }),
                ScalarKind::Char => {
                    let fallback = match default {
                        Some(literal) => self.default_expr(decl, literal, ty)?,
                        None if nullable => {
                            return Ok(quote! { #raw.chars().next() });
                        }
                        None => quote! { '0' },
                    };
                    Ok(quote! { uriscope_runtime::convert::parse_char_or(#raw, #fallback) })
                }
                _ => {
                    let fallback = match default {
                        Some(literal) => self.default_expr(decl, literal, ty)?,
                        None if nullable => {
                            let target = scalar_type_tokens(*kind);
                            return Ok(
                                quote! { uriscope_runtime::convert::parse_opt::<#target>(#raw) },
                            );
                        }
                        None => zero_literal(*kind),
                    };
                    Ok(quote! { uriscope_runtime::convert::parse_or(#raw, #fallback) })
                }
            },
            TypeDesc::Array(_) | TypeDesc::Custom(_) => Err(CompileError::UnknownType {
                decl: decl.clone(),
                name: name.clone(),
                ty: ty.to_string(),
            }),
        }
    }

    /// Expression deserializing `raw` through an adapter; evaluates to the
    /// stored field type.
    pub fn read_adapter_expr(
        &self,
        raw: TokenStream,
        adapter: &AdapterRef,
        nullable: bool,
    ) -> TokenStream {
        let adapter_expr = self.adapter_expr(adapter);
        if nullable {
            quote! { Some(#adapter_expr.deserialize(#raw)?) }
        } else {
            quote! { #adapter_expr.deserialize(#raw)? }
        }
    }

    /// Default array for an absent array-typed parameter. With an adapter
    /// the literal is split on `;`, one element per sub-value; without one
    /// the whole literal becomes a single-element array.
    pub fn default_array_expr(
        &self,
        decl: &SmolStr,
        literal: &str,
        element: &TypeDesc,
        adapter: Option<&AdapterRef>,
    ) -> Result<TokenStream> {
        match adapter {
            Some(adapter) => {
                let adapter_expr = self.adapter_expr(adapter);
                let elements = literal.split(ARRAY_DEFAULT_SEPARATOR).map(|part| {
                    let lit = Literal::string(part);
                    quote! { #adapter_expr.deserialize(#lit)? }
                });
                Ok(quote! { vec![#(#elements),*] })
            }
            None => {
                let element_default = self.default_expr(decl, literal, element)?;
                Ok(quote! { vec![#element_default] })
            }
        }
    }
}

/// Rust type tokens for a declared type as stored in a generated reader.
pub fn rust_type(ty: &TypeDesc, nullable: bool) -> TokenStream {
    let base = match ty {
        TypeDesc::Scalar(kind) | TypeDesc::Boxed(kind) => scalar_type_tokens(*kind),
        TypeDesc::Str => quote! { String },
        TypeDesc::Locator => quote! { uriscope_runtime::Locator },
        TypeDesc::Array(element) => {
            let inner = rust_type(element, false);
            quote! { Vec<#inner> }
        }
        TypeDesc::Custom(path) => path_tokens(path),
    };
    if nullable { quote! { Option<#base> } } else { base }
}

/// Rust type tokens for a builder method parameter. Borrowed where a
/// borrow is the idiomatic parameter shape.
pub fn param_type(ty: &TypeDesc, nullable: bool) -> TokenStream {
    let base = match ty {
        TypeDesc::Scalar(kind) | TypeDesc::Boxed(kind) => scalar_type_tokens(*kind),
        TypeDesc::Str => quote! { &str },
        TypeDesc::Locator => quote! { &uriscope_runtime::Locator },
        TypeDesc::Array(element) => {
            let inner = rust_type(element, false);
            quote! { &[#inner] }
        }
        TypeDesc::Custom(path) => {
            let path = path_tokens(path);
            quote! { &#path }
        }
    };
    if nullable { quote! { Option<#base> } } else { base }
}

fn scalar_type_tokens(kind: ScalarKind) -> TokenStream {
    match kind {
        ScalarKind::Bool => quote! { bool },
        ScalarKind::Char => quote! { char },
        ScalarKind::I8 => quote! { i8 },
        ScalarKind::I16 => quote! { i16 },
        ScalarKind::I32 => quote! { i32 },
        ScalarKind::I64 => quote! { i64 },
        ScalarKind::F32 => quote! { f32 },
        ScalarKind::F64 => quote! { f64 },
    }
}

fn zero_literal(kind: ScalarKind) -> TokenStream {
    let lit = match kind {
        ScalarKind::Bool | ScalarKind::Char => unreachable!("handled by the caller"),
        ScalarKind::I8 => Literal::i8_suffixed(0),
        ScalarKind::I16 => Literal::i16_suffixed(0),
        ScalarKind::I32 => Literal::i32_suffixed(0),
        ScalarKind::I64 => Literal::i64_suffixed(0),
        ScalarKind::F32 => Literal::f32_suffixed(0.0),
        ScalarKind::F64 => Literal::f64_suffixed(0.0),
    };
    quote! { #lit }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn squash(tokens: &TokenStream) -> String {
        tokens.to_string().chars().filter(|c| !c.is_whitespace()).collect()
    }

    fn decl() -> SmolStr {
        SmolStr::new("sample::Factory::op")
    }

    fn name() -> SmolStr {
        SmolStr::new("field")
    }

    #[test]
    fn serialize_passes_strings_through_and_stringifies_scalars() {
        let converter = TypeConverter::default();
        let s = converter
            .serialize_expr(&decl(), &name(), quote! { value }, &TypeDesc::Str, None)
            .unwrap();
        assert_eq!(squash(&s), "value");

        let s = converter
            .serialize_expr(
                &decl(),
                &name(),
                quote! { count },
                &TypeDesc::Scalar(ScalarKind::I32),
                None,
            )
            .unwrap();
        assert_eq!(squash(&s), "count.to_string()");
    }

    #[test]
    fn serialize_rejects_unknown_types() {
        let converter = TypeConverter::default();
        let err = converter
            .serialize_expr(
                &decl(),
                &name(),
                quote! { value },
                &TypeDesc::Custom("sample::Rect".into()),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, CompileError::UnknownType { .. }));
    }

    #[test]
    fn adapter_construction_is_a_config_switch() {
        let fresh = TypeConverter::default();
        let expr = fresh.adapter_expr(&AdapterRef::new("sample::RectAdapter"));
        assert_eq!(squash(&expr), "sample::RectAdapter::new()");

        let cached = TypeConverter::new(Some("sample::AdapterFactory".into()));
        let expr = cached.adapter_expr(&AdapterRef::new("sample::RectAdapter"));
        assert_eq!(squash(&expr), "sample::AdapterFactory::create_rect_adapter()");
    }

    #[test]
    fn default_literals_are_validated_at_compile_time() {
        let converter = TypeConverter::default();
        let ok = converter
            .default_expr(&decl(), "42", &TypeDesc::Scalar(ScalarKind::I32))
            .unwrap();
        assert_eq!(squash(&ok), "42i32");

        let err = converter
            .default_expr(&decl(), "not a number", &TypeDesc::Scalar(ScalarKind::I32))
            .unwrap_err();
        assert!(matches!(err, CompileError::InvalidDefault { .. }));

        let err = converter
            .default_expr(&decl(), "", &TypeDesc::Scalar(ScalarKind::I64))
            .unwrap_err();
        assert!(matches!(err, CompileError::EmptyDefault { .. }));

        // Empty defaults are fine for strings and locators.
        assert!(converter.default_expr(&decl(), "", &TypeDesc::Str).is_ok());
        let loc = converter.default_expr(&decl(), "", &TypeDesc::Locator).unwrap();
        assert_eq!(squash(&loc), "uriscope_runtime::Locator::empty()");
    }

    #[test]
    fn numeric_reads_use_the_fallback_chain() {
        let converter = TypeConverter::default();
        let with_default = converter
            .read_scalar_expr(
                &decl(),
                &name(),
                quote! { raw },
                &TypeDesc::Scalar(ScalarKind::I32),
                false,
                Some("7"),
            )
            .unwrap();
        assert_eq!(squash(&with_default), "uriscope_runtime::convert::parse_or(raw,7i32)");

        let nullable = converter
            .read_scalar_expr(
                &decl(),
                &name(),
                quote! { raw },
                &TypeDesc::Scalar(ScalarKind::I64),
                true,
                None,
            )
            .unwrap();
        assert_eq!(
            squash(&nullable),
            "uriscope_runtime::convert::parse_opt::<i64>(raw)"
        );

        let zero = converter
            .read_scalar_expr(
                &decl(),
                &name(),
                quote! { raw },
                &TypeDesc::Scalar(ScalarKind::F64),
                false,
                None,
            )
            .unwrap();
        assert_eq!(squash(&zero), "uriscope_runtime::convert::parse_or(raw,0f64)");
    }

    #[test]
    fn nullable_string_reads_wrap_in_some() {
        let converter = TypeConverter::default();
        let expr = converter
            .read_scalar_expr(&decl(), &name(), quote! { raw }, &TypeDesc::Str, true, None)
            .unwrap();
        assert_eq!(squash(&expr), "Some(raw.to_string())");
    }

    #[test]
    fn array_defaults_split_on_semicolon_with_adapter() {
        let converter = TypeConverter::default();
        let adapter = AdapterRef::new("sample::PairAdapter");
        let expr = converter
            .default_array_expr(&decl(), "a|1;b|2", &TypeDesc::Custom("sample::Pair".into()), Some(&adapter))
            .unwrap();
        // One element per `;`-separated sub-value.
        assert_eq!(squash(&expr).matches("deserialize").count(), 2);

        let plain = converter
            .default_array_expr(&decl(), "5", &TypeDesc::Scalar(ScalarKind::I16), None)
            .unwrap();
        assert_eq!(squash(&plain), "vec![5i16]");
    }

    #[test]
    fn type_mapping() {
        assert_eq!(squash(&rust_type(&TypeDesc::Str, true)), "Option<String>");
        assert_eq!(
            squash(&rust_type(&TypeDesc::Array(Box::new(TypeDesc::Scalar(ScalarKind::I32))), false)),
            "Vec<i32>"
        );
        assert_eq!(squash(&param_type(&TypeDesc::Str, false)), "&str");
        assert_eq!(
            squash(&param_type(&TypeDesc::Array(Box::new(TypeDesc::Str)), false)),
            "&[String]"
        );
    }
}
