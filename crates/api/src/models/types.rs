use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

/// Primitive value kinds a locator field can carry.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl ScalarKind {
    /// Whole-number kinds. Matches the wildcard classification used by the
    /// dispatcher: floats are not numeric wildcards.
    pub fn is_integer(self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }
}

/// Declared type of a locator field, as reflected by the host environment.
///
/// `Boxed` mirrors hosts that distinguish a primitive from its wrapper type.
/// The two behave identically here except for documentation fidelity.
/// `Custom` is any other named type; it is only usable together with an
/// adapter.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDesc {
    Scalar(ScalarKind),
    Boxed(ScalarKind),
    Str,
    Locator,
    Array(Box<TypeDesc>),
    Custom(SmolStr),
}

impl TypeDesc {
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Self::Scalar(k) | Self::Boxed(k) => Some(*k),
            _ => None,
        }
    }

    /// True for types the dispatcher rewrites to the numeric wildcard.
    pub fn is_integer(&self) -> bool {
        self.scalar_kind().is_some_and(ScalarKind::is_integer)
    }

    pub fn element(&self) -> Option<&TypeDesc> {
        match self {
            Self::Array(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(k) | Self::Boxed(k) => {
                let name = match k {
                    ScalarKind::Bool => "bool",
                    ScalarKind::Char => "char",
                    ScalarKind::I8 => "i8",
                    ScalarKind::I16 => "i16",
                    ScalarKind::I32 => "i32",
                    ScalarKind::I64 => "i64",
                    ScalarKind::F32 => "f32",
                    ScalarKind::F64 => "f64",
                };
                write!(f, "{name}")
            }
            Self::Str => write!(f, "str"),
            Self::Locator => write!(f, "locator"),
            Self::Array(inner) => write!(f, "[{inner}]"),
            Self::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// Reference to a user-supplied type adapter, by qualified type path.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct AdapterRef {
    pub ty: SmolStr,
}

impl AdapterRef {
    pub fn new(ty: impl Into<SmolStr>) -> Self {
        Self { ty: ty.into() }
    }

    /// Last path segment of the adapter type, used for factory accessor names.
    pub fn simple_name(&self) -> &str {
        self.ty.rsplit("::").next().unwrap_or(&self.ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_kinds_for_wildcards() {
        assert!(TypeDesc::Scalar(ScalarKind::I32).is_integer());
        assert!(TypeDesc::Boxed(ScalarKind::I64).is_integer());
        assert!(!TypeDesc::Scalar(ScalarKind::F64).is_integer());
        assert!(!TypeDesc::Str.is_integer());
    }

    #[test]
    fn adapter_simple_name() {
        assert_eq!(AdapterRef::new("sample::adapter::RectAdapter").simple_name(), "RectAdapter");
        assert_eq!(AdapterRef::new("RectAdapter").simple_name(), "RectAdapter");
    }
}
