use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::collections::BTreeMap;

pub const OPT_TYPE_ADAPTER_FACTORY: &str = "uriscope.type_adapter_factory";
pub const OPT_MODULE_NAME: &str = "uriscope.module_name";

/// Typed view of the host environment's string option map. Unknown keys are
/// ignored for forward compatibility.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Qualified name of the generated adapter factory type. When set,
    /// adapter instances are cached and constructed through the factory;
    /// when absent, a fresh adapter is constructed at every use site.
    pub type_adapter_factory: Option<SmolStr>,
    /// Overrides the name of the cross-cutting registration artifact.
    pub module_name: Option<SmolStr>,
}

impl CompilerOptions {
    pub fn from_map(map: &BTreeMap<String, String>) -> ApiResult<Self> {
        let mut options = Self::default();
        if let Some(value) = map.get(OPT_TYPE_ADAPTER_FACTORY) {
            options.type_adapter_factory = Some(validated_type_name(OPT_TYPE_ADAPTER_FACTORY, value)?);
        }
        if let Some(value) = map.get(OPT_MODULE_NAME) {
            options.module_name = Some(validated_type_name(OPT_MODULE_NAME, value)?);
        }
        Ok(options)
    }
}

/// A qualified type name: `::`-separated non-empty identifier segments.
fn validated_type_name(key: &str, value: &str) -> ApiResult<SmolStr> {
    let valid = !value.is_empty()
        && value.split("::").all(|segment| {
            let mut chars = segment.chars();
            chars
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        });
    if valid {
        Ok(SmolStr::new(value))
    } else {
        Err(ApiError::InvalidOption {
            key: key.to_string(),
            reason: format!("'{value}' is not a valid type name"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_keys() {
        let mut map = BTreeMap::new();
        map.insert(
            OPT_TYPE_ADAPTER_FACTORY.to_string(),
            "sample::UriscopeAdapterFactory".to_string(),
        );
        map.insert(OPT_MODULE_NAME.to_string(), "sample::LocatorModule".to_string());
        map.insert("uriscope.unknown".to_string(), "whatever".to_string());

        let options = CompilerOptions::from_map(&map).unwrap();
        assert_eq!(
            options.type_adapter_factory.as_deref(),
            Some("sample::UriscopeAdapterFactory")
        );
        assert_eq!(options.module_name.as_deref(), Some("sample::LocatorModule"));
    }

    #[test]
    fn rejects_malformed_type_names() {
        let mut map = BTreeMap::new();
        map.insert(OPT_MODULE_NAME.to_string(), "1bad name".to_string());
        let err = CompilerOptions::from_map(&map).unwrap_err();
        assert!(matches!(err, ApiError::InvalidOption { .. }));
    }

    #[test]
    fn empty_map_is_default() {
        let options = CompilerOptions::from_map(&BTreeMap::new()).unwrap();
        assert_eq!(options, CompilerOptions::default());
    }
}
