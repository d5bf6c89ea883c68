//! The parameter binder: matches declared fields against template tokens
//! and produces locator schemas.

use crate::diag::{Diagnostic, DiagnosticSink};
use crate::error::{CompileError, Result};
use crate::schema::{
    BuilderSchema, ReadQuery, ReadSegment, ReadVar, ReaderSchema, WriteQuery, WriteSegment, WriteVar,
};
use crate::template::{self, TokenKind};
use indexmap::IndexMap;
use smol_str::SmolStr;
use uriscope_api::{BuilderOpDecl, ConstantParam, FactoryDecl, FieldDecl, Role};

/// What kind of declaration a reader is derived from. Associated readers
/// keep the legacy positional fallback; independent readers are strict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderSource {
    Associated,
    Independent,
}

pub fn bind_builder(
    factory: &FactoryDecl,
    op: &BuilderOpDecl,
    diags: &dyn DiagnosticSink,
) -> Result<BuilderSchema> {
    let decl = SmolStr::new(format!("{}::{}", factory.name, op.name));

    let mut path_vars: IndexMap<SmolStr, (WriteVar, bool)> = IndexMap::new();
    let mut query = Vec::new();
    for field in &op.fields {
        match field.role {
            Role::Path { encoded } => {
                if field.nullable && field.default.is_none() {
                    return Err(CompileError::NullablePathSegment {
                        decl,
                        name: field.name.clone(),
                    });
                }
                let var = WriteVar {
                    field: field.name.clone(),
                    ty: field.ty.clone(),
                    nullable: field.nullable,
                    default: field.default.clone(),
                    adapter: field.adapter.clone(),
                    encoded,
                };
                path_vars.insert(SmolStr::new(field.declared_name()), (var, false));
            }
            Role::Query => query.push(WriteQuery {
                name: SmolStr::new(field.declared_name()),
                field: field.name.clone(),
                ty: field.ty.clone(),
                nullable: field.nullable,
                default: field.default.clone(),
                adapter: field.adapter.clone(),
            }),
            Role::None => diags.report(Diagnostic::warning(
                Some(decl.clone()),
                format!("Parameter '{}' is ignored", field.name),
            )),
        }
    }

    let mut segments = Vec::new();
    for token in template::tokenize(&op.base_path) {
        match token.kind {
            TokenKind::Literal(value) => segments.push(WriteSegment::Constant {
                value,
                encoded: op.encoded,
            }),
            TokenKind::Placeholder(name) => match path_vars.get_mut(&name) {
                Some((var, used)) => {
                    *used = true;
                    segments.push(WriteSegment::Variable(var.clone()));
                }
                None => {
                    return Err(CompileError::UnresolvedTemplate { decl, name });
                }
            },
        }
    }

    let unbound: Vec<&str> = path_vars
        .iter()
        .filter(|(_, (_, used))| !used)
        .map(|(name, _)| name.as_str())
        .collect();
    if !unbound.is_empty() {
        return Err(CompileError::UnboundPathFields {
            decl,
            fields: unbound.join(", "),
            base_path: op.base_path.clone(),
        });
    }

    Ok(BuilderSchema {
        op: op.name.clone(),
        scheme: factory.scheme.clone(),
        authority: factory.authority.clone(),
        segments,
        query,
        constants: op.constants.clone(),
    })
}

pub fn bind_reader(
    source_name: &SmolStr,
    base_path: &str,
    fields: &[FieldDecl],
    constants: &[ConstantParam],
    source: ReaderSource,
    diags: &dyn DiagnosticSink,
) -> Result<ReaderSchema> {
    let decl = source_name.clone();

    // Template slots in template order; constant components are not slots
    // but still occupy positions.
    let mut slots: IndexMap<SmolStr, usize> = IndexMap::new();
    for token in template::tokenize(base_path) {
        if let TokenKind::Placeholder(name) = token.kind {
            slots.insert(name, token.index);
        }
    }
    let after_templates = slots.values().max().map_or(0, |max| max + 1);

    let mut bound: IndexMap<SmolStr, Option<ReadSegment>> =
        slots.keys().map(|name| (name.clone(), None)).collect();
    let mut positional_count = 0usize;
    let mut query = Vec::new();

    for field in fields {
        match field.role {
            Role::Path { .. } => {
                let strict_nonnull = match source {
                    ReaderSource::Associated => field.nullable && field.default.is_none(),
                    ReaderSource::Independent => field.nullable,
                };
                if strict_nonnull {
                    return Err(CompileError::NullablePathSegment {
                        decl,
                        name: field.name.clone(),
                    });
                }

                let name = SmolStr::new(field.declared_name());
                let (position, positional) = match slots.get(&name) {
                    Some(index) => (*index, false),
                    None => match source {
                        ReaderSource::Associated => {
                            diags.report(Diagnostic::warning(
                                Some(decl.clone()),
                                format!(
                                    "Path segment '{name}' is not found in '{base_path}'; \
                                     binding it by declaration order instead"
                                ),
                            ));
                            let position = after_templates + positional_count;
                            positional_count += 1;
                            (position, true)
                        }
                        ReaderSource::Independent => {
                            return Err(CompileError::UndefinedPathSegment {
                                decl,
                                name,
                                base_path: base_path.to_string(),
                            });
                        }
                    },
                };

                let segment = ReadSegment {
                    position,
                    name: name.clone(),
                    var: ReadVar {
                        field: field.name.clone(),
                        ty: field.ty.clone(),
                        nullable: field.nullable,
                        default: field.default.clone(),
                        adapter: field.adapter.clone(),
                        positional,
                    },
                };
                bound.insert(name, Some(segment));
            }
            Role::Query => query.push(ReadQuery {
                name: SmolStr::new(field.declared_name()),
                field: field.name.clone(),
                ty: field.ty.clone(),
                nullable: field.nullable,
                default: field.default.clone(),
                adapter: field.adapter.clone(),
            }),
            Role::None => diags.report(Diagnostic::warning(
                Some(decl.clone()),
                format!("Parameter '{}' is ignored", field.name),
            )),
        }
    }

    let mut segments = Vec::with_capacity(bound.len());
    for (name, entry) in bound {
        match entry {
            Some(segment) => segments.push(segment),
            None => return Err(CompileError::UnresolvedTemplate { decl, name }),
        }
    }

    Ok(ReaderSchema {
        source: source_name.clone(),
        segments,
        query,
        constants: constants.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::CollectingSink;
    use uriscope_api::{ScalarKind, TypeDesc};

    fn factory() -> FactoryDecl {
        FactoryDecl::new("sample::MapFactory", "content", "com.example.maps")
    }

    fn path_field(name: &str, ty: TypeDesc) -> FieldDecl {
        FieldDecl::new(name, Role::Path { encoded: false }, ty)
    }

    fn query_field(name: &str, ty: TypeDesc) -> FieldDecl {
        FieldDecl::new(name, Role::Query, ty)
    }

    #[test]
    fn builder_binds_placeholders_in_path_order() {
        let mut op = BuilderOpDecl::new("build_detail", "/maps/api/{id}/detail");
        op.fields.push(path_field("id", TypeDesc::Scalar(ScalarKind::I32)));
        op.fields.push(query_field("zoom", TypeDesc::Scalar(ScalarKind::I32)));

        let sink = CollectingSink::new();
        let schema = bind_builder(&factory(), &op, &sink).unwrap();

        assert_eq!(schema.segments.len(), 4);
        assert!(matches!(&schema.segments[0], WriteSegment::Constant { value, .. } if value == "maps"));
        assert!(matches!(&schema.segments[2], WriteSegment::Variable(var) if var.field == "id"));
        assert!(matches!(&schema.segments[3], WriteSegment::Constant { value, .. } if value == "detail"));
        assert_eq!(schema.query.len(), 1);
        assert!(sink.entries().is_empty());
    }

    #[test]
    fn template_free_path_binds_to_constants_only() {
        let op = BuilderOpDecl::new("build_ping", "/status/ping");
        let sink = CollectingSink::new();
        let schema = bind_builder(&factory(), &op, &sink).unwrap();
        assert!(schema
            .segments
            .iter()
            .all(|s| matches!(s, WriteSegment::Constant { .. })));
        assert_eq!(schema.segments.len(), 2);
    }

    #[test]
    fn builder_rejects_unbound_path_field() {
        let mut op = BuilderOpDecl::new("build_detail", "/maps/api");
        op.fields.push(path_field("id", TypeDesc::Scalar(ScalarKind::I32)));

        let sink = CollectingSink::new();
        let err = bind_builder(&factory(), &op, &sink).unwrap_err();
        assert!(matches!(err, CompileError::UnboundPathFields { ref fields, .. } if fields == "id"));
    }

    #[test]
    fn builder_rejects_leftover_placeholder() {
        let op = BuilderOpDecl::new("build_detail", "/maps/{id}");
        let sink = CollectingSink::new();
        let err = bind_builder(&factory(), &op, &sink).unwrap_err();
        assert!(matches!(err, CompileError::UnresolvedTemplate { ref name, .. } if name == "id"));
    }

    #[test]
    fn builder_rejects_nullable_path_without_default() {
        let mut op = BuilderOpDecl::new("build_detail", "/maps/{id}");
        let mut field = path_field("id", TypeDesc::Str);
        field.nullable = true;
        op.fields.push(field);

        let sink = CollectingSink::new();
        let err = bind_builder(&factory(), &op, &sink).unwrap_err();
        assert!(matches!(err, CompileError::NullablePathSegment { .. }));
    }

    #[test]
    fn roleless_field_is_dropped_with_warning() {
        let mut op = BuilderOpDecl::new("build_detail", "/maps");
        op.fields
            .push(FieldDecl::new("extra", Role::None, TypeDesc::Str));

        let sink = CollectingSink::new();
        let schema = bind_builder(&factory(), &op, &sink).unwrap();
        assert!(schema.query.is_empty());
        assert_eq!(sink.warnings().len(), 1);
        assert!(sink.warnings()[0].message.contains("'extra' is ignored"));
    }

    #[test]
    fn declared_name_override_binds_the_placeholder() {
        let mut op = BuilderOpDecl::new("build_detail", "/user/{user-id}");
        let mut field = path_field("user_id", TypeDesc::Scalar(ScalarKind::I64));
        field.rename = Some("user-id".into());
        op.fields.push(field);

        let sink = CollectingSink::new();
        let schema = bind_builder(&factory(), &op, &sink).unwrap();
        assert!(matches!(&schema.segments[1], WriteSegment::Variable(var) if var.field == "user_id"));
    }

    #[test]
    fn associated_reader_falls_back_to_positional_binding() {
        let name = SmolStr::new("sample::LegacyData");
        let fields = vec![
            path_field("first", TypeDesc::Str),
            path_field("second", TypeDesc::Str),
        ];
        let sink = CollectingSink::new();
        let schema = bind_reader(&name, "", &fields, &[], ReaderSource::Associated, &sink).unwrap();

        assert_eq!(schema.segments.len(), 2);
        assert_eq!(schema.segments[0].position, 0);
        assert!(schema.segments[0].var.positional);
        assert_eq!(schema.segments[1].position, 1);
        assert_eq!(sink.warnings().len(), 2);
    }

    #[test]
    fn positional_binding_goes_after_templated_segments() {
        let name = SmolStr::new("sample::MixedData");
        let fields = vec![
            path_field("id", TypeDesc::Scalar(ScalarKind::I32)),
            path_field("extra", TypeDesc::Str),
        ];
        let sink = CollectingSink::new();
        let schema =
            bind_reader(&name, "/user/{id}", &fields, &[], ReaderSource::Associated, &sink).unwrap();

        assert_eq!(schema.segments[0].name, "id");
        assert_eq!(schema.segments[0].position, 1);
        assert_eq!(schema.segments[1].name, "extra");
        assert_eq!(schema.segments[1].position, 2);
    }

    #[test]
    fn independent_reader_rejects_unknown_segment() {
        let name = SmolStr::new("sample::StrictData");
        let fields = vec![path_field("missing", TypeDesc::Str)];
        let sink = CollectingSink::new();
        let err = bind_reader(&name, "/user/{id}", &fields, &[], ReaderSource::Independent, &sink)
            .unwrap_err();
        assert!(matches!(err, CompileError::UndefinedPathSegment { ref name, .. } if name == "missing"));
    }

    #[test]
    fn independent_reader_rejects_nullable_path() {
        let name = SmolStr::new("sample::StrictData");
        let mut field = path_field("id", TypeDesc::Str);
        field.nullable = true;
        field.default = Some("x".to_string());
        let sink = CollectingSink::new();
        let err = bind_reader(
            &name,
            "/user/{id}",
            &[field],
            &[],
            ReaderSource::Independent,
            &sink,
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::NullablePathSegment { .. }));
    }

    #[test]
    fn reader_rejects_unresolved_template_slot() {
        let name = SmolStr::new("sample::HoleyData");
        let sink = CollectingSink::new();
        let err =
            bind_reader(&name, "/user/{id}", &[], &[], ReaderSource::Associated, &sink).unwrap_err();
        assert!(matches!(err, CompileError::UnresolvedTemplate { ref name, .. } if name == "id"));
    }
}
