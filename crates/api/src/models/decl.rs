use super::types::{AdapterRef, TypeDesc};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Role of a declared field within a locator operation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Bound to a path placeholder. `encoded` skips percent-encoding on write.
    Path { encoded: bool },
    /// Appended to / read from the query string.
    Query,
    /// No recognized role. Dropped with a warning by the binder.
    None,
}

/// One declared field of a builder operation or reader interface.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: SmolStr,
    /// Explicit name override from the declaration; falls back to `name`.
    pub rename: Option<SmolStr>,
    pub role: Role,
    pub ty: TypeDesc,
    pub nullable: bool,
    pub default: Option<String>,
    pub adapter: Option<AdapterRef>,
}

impl FieldDecl {
    pub fn new(name: impl Into<SmolStr>, role: Role, ty: TypeDesc) -> Self {
        Self {
            name: name.into(),
            rename: None,
            role,
            ty,
            nullable: false,
            default: None,
            adapter: None,
        }
    }

    pub fn declared_name(&self) -> &str {
        self.rename.as_deref().unwrap_or(&self.name)
    }
}

/// Literal query parameter attached at the declaration level. Always appended.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ConstantParam {
    pub name: SmolStr,
    pub value: ConstantValue,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Str(String),
    Bool(bool),
    Long(i64),
    Double(f64),
}

/// Matcher code request attached to a builder operation. Both forms may be
/// present on one declaration; the symbolic one wins with a warning.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct MatcherCodeDecl {
    pub symbolic: Option<SymbolicCode>,
    pub numeric: Option<NumericCode>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SymbolicCode {
    pub name: SmolStr,
    pub enabled: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NumericCode {
    pub code: i32,
    pub enabled: bool,
}

/// Request for an associated reader generated alongside a builder operation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ReaderRequest {
    /// Desired class name; derived from the operation name when empty.
    pub name: Option<SmolStr>,
}

/// One builder operation of a factory interface.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BuilderOpDecl {
    pub name: SmolStr,
    pub base_path: String,
    /// Annotation-level encoded flag for constant segments. Defaults to true.
    pub encoded: bool,
    pub fields: Vec<FieldDecl>,
    pub constants: Vec<ConstantParam>,
    pub reader: Option<ReaderRequest>,
    pub matcher_code: Option<MatcherCodeDecl>,
}

impl BuilderOpDecl {
    pub fn new(name: impl Into<SmolStr>, base_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_path: base_path.into(),
            encoded: true,
            fields: Vec::new(),
            constants: Vec::new(),
            reader: None,
            matcher_code: None,
        }
    }
}

/// Dispatcher opt-in on a factory interface.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct MatcherDecl {
    /// Desired dispatcher type name; `<Factory>Matcher` when empty.
    pub name: Option<SmolStr>,
}

/// A locator-producing factory interface.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FactoryDecl {
    pub name: SmolStr,
    pub scheme: String,
    pub authority: String,
    pub matcher: Option<MatcherDecl>,
    pub ops: Vec<BuilderOpDecl>,
}

impl FactoryDecl {
    pub fn new(
        name: impl Into<SmolStr>,
        scheme: impl Into<String>,
        authority: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            scheme: scheme.into(),
            authority: authority.into(),
            matcher: None,
            ops: Vec::new(),
        }
    }
}

/// An independent reader interface, compiled without a builder counterpart.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReaderDecl {
    pub name: SmolStr,
    pub base_path: String,
    pub fields: Vec<FieldDecl>,
    pub constants: Vec<ConstantParam>,
}

impl ReaderDecl {
    pub fn new(name: impl Into<SmolStr>, base_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_path: base_path.into(),
            fields: Vec::new(),
            constants: Vec::new(),
        }
    }
}
