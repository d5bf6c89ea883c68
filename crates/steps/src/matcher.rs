//! Generates one dispatcher per factory that opted in: wildcard-rewritten
//! templates, counter-assigned codes and a nested symbolic-code holder.

use crate::names::{MATCHER_CODE_HOLDER, MATCHER_SUFFIX, resolve_override, sibling, simple_name};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use regex::Regex;
use smol_str::SmolStr;
use uriscope_api::{FactoryDecl, TypeDesc};
use uriscope_core::template::{self, TokenKind};
use uriscope_core::{CompileError, CompileSession, HostEnv, ProcessingStep, Result, StepReport};
use uriscope_codegen::{Artifact, ClassSpec, ConstSpec, FieldSpec, MethodSpec, Param, Receiver};

static CODE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[a-zA-Z_][a-zA-Z0-9_]*$").expect("code name pattern is valid"));

const WILDCARD_NUMBER: &str = "#";
const WILDCARD_ANY: &str = "*";

struct CodeEntry {
    code: i32,
    enabled: bool,
}

enum CodeRef {
    Symbolic(SmolStr),
    Numeric { code: i32, enabled: bool },
}

#[derive(Default)]
pub struct MatcherStep;

impl MatcherStep {
    pub fn new() -> Self {
        Self
    }

    fn build_matcher(&self, session: &CompileSession, factory: &FactoryDecl) -> Result<Artifact> {
        let decl = factory.name.clone();
        let mut counter = 0i32;
        let mut symbolic: IndexMap<SmolStr, CodeEntry> = IndexMap::new();
        let mut mappings: Vec<(String, CodeRef)> = Vec::new();

        for op in &factory.ops {
            let Some(code_decl) = &op.matcher_code else {
                continue;
            };

            let path_types: IndexMap<&str, &TypeDesc> = op
                .fields
                .iter()
                .filter(|field| matches!(field.role, uriscope_api::Role::Path { .. }))
                .map(|field| (field.declared_name(), &field.ty))
                .collect();

            let rewritten = rewrite_template(&op.base_path, &path_types);
            if rewritten.is_empty() {
                session.warn(
                    decl.clone(),
                    format!("Dispatch template can't be built for '{}'", op.base_path),
                );
                continue;
            }

            if code_decl.symbolic.is_some() && code_decl.numeric.is_some() {
                session.warn(
                    decl.clone(),
                    format!(
                        "Operation '{}' declares both a symbolic and a numeric matcher code; \
                         only the symbolic one takes effect",
                        op.name
                    ),
                );
            }

            if let Some(sym) = &code_decl.symbolic {
                if !CODE_NAME_RE.is_match(&sym.name) {
                    return Err(CompileError::InvalidCodeName {
                        decl,
                        name: sym.name.to_string(),
                    });
                }
                let field = SmolStr::new(sym.name.to_uppercase());
                match symbolic.get(&field) {
                    Some(entry) => {
                        if entry.enabled != sym.enabled {
                            return Err(CompileError::CodeFlagConflict { decl, name: field });
                        }
                    }
                    None => {
                        counter += 1;
                        symbolic.insert(
                            field.clone(),
                            CodeEntry {
                                code: counter,
                                enabled: sym.enabled,
                            },
                        );
                    }
                }
                mappings.push((rewritten, CodeRef::Symbolic(field)));
            } else if let Some(num) = &code_decl.numeric {
                mappings.push((
                    rewritten,
                    CodeRef::Numeric {
                        code: num.code,
                        enabled: num.enabled,
                    },
                ));
            }
        }

        let matcher_decl = factory.matcher.as_ref().expect("matcher opt-in checked");
        let class_name = match matcher_decl.name.as_deref() {
            Some(desired) => resolve_override(&factory.name, desired),
            None => sibling(
                &factory.name,
                &format!("{}{MATCHER_SUFFIX}", simple_name(&factory.name)),
            ),
        };

        let mut class =
            ClassSpec::new(simple_name(&class_name));
        class.add_field(FieldSpec::new(
            "dispatcher",
            quote! { uriscope_runtime::LocatorDispatcher },
        ));

        let authority = factory.authority.as_str();
        let mut rules: Vec<TokenStream> = Vec::new();
        for (template, code) in &mappings {
            let (enabled, code_tokens) = match code {
                CodeRef::Symbolic(name) => {
                    let entry = &symbolic[name];
                    let ident = format_ident!("{}", name.as_str());
                    let holder = format_ident!("{}", MATCHER_CODE_HOLDER);
                    (entry.enabled, quote! { #holder::#ident })
                }
                CodeRef::Numeric { code, enabled } => (*enabled, quote! { #code }),
            };
            if !enabled {
                continue;
            }
            let template = template.as_str();
            rules.push(quote! {
                uriscope_runtime::MatchRule::new(#authority, #template, #code_tokens)
            });
        }

        class.add_method(
            MethodSpec::new("new", Receiver::Static)
                .returns(quote! { Self })
                .with_body(quote! {
                    Self {
                        dispatcher: uriscope_runtime::LocatorDispatcher::new(|| {
                            vec![
                                #(#rules,)*
                            ]
                        }),
                    }
                }),
        );
        class.add_method(
            MethodSpec::new("match_locator", Receiver::Ref)
                .with_param(Param::new("uri", quote! { &uriscope_runtime::Locator }))
                .returns(quote! { i32 })
                .with_body(quote! { self.dispatcher.match_locator(uri) }),
        );
        class.add_method(
            MethodSpec::new("add_rule", Receiver::Ref)
                .with_param(Param::new("rule", quote! { uriscope_runtime::MatchRule }))
                .returns(quote! { Result<(), uriscope_runtime::RuntimeError> })
                .with_body(quote! { self.dispatcher.add_rule(rule) }),
        );

        if !symbolic.is_empty() {
            class.add_nested(code_holder(&symbolic));
        }

        Ok(Artifact::new(class_name.to_string(), class))
    }
}

/// Disabled codes keep their symbolic identity in the holder even though
/// they are absent from the live dispatch table.
fn code_holder(symbolic: &IndexMap<SmolStr, CodeEntry>) -> ClassSpec {
    let mut holder = ClassSpec::new(MATCHER_CODE_HOLDER);
    for (name, entry) in symbolic {
        holder.add_const(ConstSpec::new(
            name.as_str(),
            quote! { i32 },
            {
                let code = entry.code;
                quote! { #code }
            },
        ));
    }

    let arms = symbolic.keys().map(|name| {
        let ident = format_ident!("{}", name.as_str());
        let label = name.as_str();
        quote! { Self::#ident => #label.to_string(), }
    });
    holder.add_method(
        MethodSpec::new("code_name", Receiver::Static)
            .with_param(Param::new("code", quote! { i32 }))
            .returns(quote! { String })
            .with_body(quote! {
                match code {
                    #(#arms)*
                    _ => code.to_string(),
                }
            }),
    );
    holder
}

fn rewrite_template(base_path: &str, path_types: &IndexMap<&str, &TypeDesc>) -> String {
    let components: Vec<String> = template::tokenize(base_path)
        .into_iter()
        .map(|token| match token.kind {
            TokenKind::Literal(value) => value.to_string(),
            TokenKind::Placeholder(name) => {
                let numeric = path_types
                    .get(name.as_str())
                    .is_some_and(|ty| ty.is_integer());
                if numeric {
                    WILDCARD_NUMBER.to_string()
                } else {
                    WILDCARD_ANY.to_string()
                }
            }
        })
        .collect();
    components.join("/")
}

impl ProcessingStep for MatcherStep {
    fn name(&self) -> &'static str {
        "matcher"
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
            if factory.matcher.is_none() {
                continue;
            }
            match self.build_matcher(session, &factory) {
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use uriscope_api::{
        BuilderOpDecl, CompilerOptions, FieldDecl, MatcherCodeDecl, MatcherDecl, NumericCode, Role,
        ScalarKind, SymbolicCode,
    };
    use uriscope_codegen::MemoryBackend;
    use uriscope_core::diag::CollectingSink;
    use uriscope_core::host::StaticHost;

    fn squash(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    fn op_with_code(name: &str, path: &str, field: Option<FieldDecl>, code: MatcherCodeDecl) -> BuilderOpDecl {
        let mut op = BuilderOpDecl::new(name, path);
        if let Some(field) = field {
            op.fields.push(field);
        }
        op.matcher_code = Some(code);
        op
    }

    fn symbolic(name: &str, enabled: bool) -> MatcherCodeDecl {
        MatcherCodeDecl {
            symbolic: Some(SymbolicCode {
                name: name.into(),
                enabled,
            }),
            numeric: None,
        }
    }

    fn run(factory: FactoryDecl) -> (Arc<MemoryBackend>, Arc<CollectingSink>, CompileSession) {
        let backend = Arc::new(MemoryBackend::new());
        let sink = Arc::new(CollectingSink::new());
        let mut session =
            CompileSession::new(CompilerOptions::default(), backend.clone(), sink.clone());
        let host = StaticHost::new().with_factory(factory);
        MatcherStep::new().process(&mut session, &host, 1).unwrap();
        (backend, sink, session)
    }

    fn matcher_factory() -> FactoryDecl {
        let mut factory = FactoryDecl::new("sample::MapFactory", "content", "com.example.maps");
        factory.matcher = Some(MatcherDecl::default());
        factory
    }

    #[test]
    fn numeric_placeholders_become_number_wildcards() {
        let mut factory = matcher_factory();
        factory.ops.push(op_with_code(
            "by_id",
            "/a/{x}",
            Some(FieldDecl::new(
                "x",
                Role::Path { encoded: false },
                TypeDesc::Scalar(ScalarKind::I32),
            )),
            symbolic("user", true),
        ));
        factory.ops.push(op_with_code(
            "by_name",
            "/a/{y}",
            Some(FieldDecl::new("y", Role::Path { encoded: false }, TypeDesc::Str)),
            symbolic("name", true),
        ));

        let (backend, _, session) = run(factory);
        assert!(session.failures().is_empty());
        let rendered = squash(&backend.rendered("sample::MapFactoryMatcher").unwrap());
        assert!(rendered.contains(r#"MatchRule::new("com.example.maps","a/#",MatcherCode::USER)"#));
        assert!(rendered.contains(r#"MatchRule::new("com.example.maps","a/*",MatcherCode::NAME)"#));
        assert!(rendered.contains("pubconstUSER:i32=1i32;"));
        assert!(rendered.contains("pubconstNAME:i32=2i32;"));
        assert!(rendered.contains(r#"Self::USER=>"USER".to_string()"#));
    }

    #[test]
    fn invalid_code_names_are_fatal_with_the_offending_string() {
        let mut factory = matcher_factory();
        factory
            .ops
            .push(op_with_code("bad", "/a/b", None, symbolic("has space", true)));

        let (_, sink, session) = run(factory);
        assert_eq!(session.failures().len(), 1);
        assert!(sink.errors()[0].message.contains("'has space'"));

        let mut factory = matcher_factory();
        factory
            .ops
            .push(op_with_code("bad", "/a/b", None, symbolic("1digit", true)));
        let (_, _, session) = run(factory);
        assert!(matches!(
            session.failures()[0].1,
            CompileError::InvalidCodeName { ref name, .. } if name == "1digit"
        ));
    }

    #[test]
    fn shared_symbolic_names_collapse_to_one_code() {
        let mut factory = matcher_factory();
        factory
            .ops
            .push(op_with_code("one", "/a/b", None, symbolic("user", true)));
        factory
            .ops
            .push(op_with_code("two", "/a/c", None, symbolic("USER", true)));

        let (backend, _, session) = run(factory);
        assert!(session.failures().is_empty());
        let rendered = squash(&backend.rendered("sample::MapFactoryMatcher").unwrap());
        // Both templates map to the same collapsed code.
        assert_eq!(rendered.matches("MatcherCode::USER").count(), 2);
        assert_eq!(rendered.matches("pubconst").count(), 1);
    }

    #[test]
    fn conflicting_enabled_flags_are_an_error() {
        let mut factory = matcher_factory();
        factory
            .ops
            .push(op_with_code("one", "/a/b", None, symbolic("user", true)));
        factory
            .ops
            .push(op_with_code("two", "/a/c", None, symbolic("user", false)));

        let (_, _, session) = run(factory);
        assert!(matches!(
            session.failures()[0].1,
            CompileError::CodeFlagConflict { ref name, .. } if name == "USER"
        ));
    }

    #[test]
    fn disabled_codes_are_listed_but_not_dispatched() {
        let mut factory = matcher_factory();
        factory
            .ops
            .push(op_with_code("gone", "/a/b", None, symbolic("legacy", false)));

        let (backend, _, _) = run(factory);
        let rendered = squash(&backend.rendered("sample::MapFactoryMatcher").unwrap());
        assert!(rendered.contains("pubconstLEGACY:i32=1i32;"));
        assert!(!rendered.contains("MatchRule::new"));
    }

    #[test]
    fn all_wildcard_template_is_skipped_with_a_warning() {
        let mut factory = matcher_factory();
        factory.ops.push(op_with_code(
            "opaque",
            "",
            None,
            MatcherCodeDecl {
                symbolic: None,
                numeric: Some(NumericCode {
                    code: 5,
                    enabled: true,
                }),
            },
        ));

        let (backend, sink, session) = run(factory);
        assert!(session.failures().is_empty());
        assert_eq!(sink.warnings().len(), 1);
        let rendered = squash(&backend.rendered("sample::MapFactoryMatcher").unwrap());
        assert!(!rendered.contains("MatchRule::new"));
    }

    #[test]
    fn both_code_forms_warn_and_symbolic_wins() {
        let mut factory = matcher_factory();
        factory.ops.push(op_with_code(
            "dual",
            "/a/b",
            None,
            MatcherCodeDecl {
                symbolic: Some(SymbolicCode {
                    name: "dual".into(),
                    enabled: true,
                }),
                numeric: Some(NumericCode {
                    code: 9,
                    enabled: true,
                }),
            },
        ));

        let (backend, sink, _) = run(factory);
        assert_eq!(sink.warnings().len(), 1);
        let rendered = squash(&backend.rendered("sample::MapFactoryMatcher").unwrap());
        assert!(rendered.contains("MatcherCode::DUAL"));
        assert!(!rendered.contains(",9i32)"));
    }
}
