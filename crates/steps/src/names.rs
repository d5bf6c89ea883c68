//! Artifact naming helpers shared by the steps.

use smol_str::SmolStr;

pub const IMPL_SUFFIX: &str = "Impl";
pub const MATCHER_SUFFIX: &str = "Matcher";
pub const MATCHER_CODE_HOLDER: &str = "MatcherCode";
pub const DEFAULT_MODULE_NAME: &str = "UriscopeModule";

/// Last segment of a `::`-qualified name.
pub fn simple_name(qualified: &str) -> &str {
    qualified.rsplit("::").next().unwrap_or(qualified)
}

/// Replaces the last segment of `qualified` with `simple`, keeping the
/// enclosing module path.
pub fn sibling(qualified: &str, simple: &str) -> SmolStr {
    match qualified.rsplit_once("::") {
        Some((module, _)) => SmolStr::new(format!("{module}::{simple}")),
        None => SmolStr::new(simple),
    }
}

/// Qualified name of the generated implementation for a declaration.
pub fn impl_name(qualified: &str) -> SmolStr {
    sibling(qualified, &format!("{}{IMPL_SUFFIX}", simple_name(qualified)))
}

/// Resolves a declared name override against the declaring type: an
/// unqualified override lands next to the declaration.
pub fn resolve_override(declaring: &str, desired: &str) -> SmolStr {
    if desired.contains("::") {
        SmolStr::new(desired)
    } else {
        sibling(declaring, desired)
    }
}

/// Makes an identifier out of an arbitrary declared name: invalid
/// characters become underscores, a leading digit gets a prefix.
pub fn sanitize_ident(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else {
            out.push('_');
        }
    }
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}
