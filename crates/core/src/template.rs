use once_cell::sync::Lazy;
use regex::Regex;
use smol_str::SmolStr;

/// Anchored placeholder pattern. Partial matches like `pre{fix}` stay
/// literal; accidental braces must not abort compilation.
static PATH_TEMPLATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\{([a-zA-Z0-9_-]+)\}$").expect("placeholder pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Literal(SmolStr),
    Placeholder(SmolStr),
}

/// One non-empty component of a path template, with its position in the
/// final path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathToken {
    pub index: usize,
    pub kind: TokenKind,
}

/// Returns the placeholder name when the whole component is `{name}`.
pub fn placeholder_name(component: &str) -> Option<&str> {
    PATH_TEMPLATE_RE
        .captures(component)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Splits a path template into ordered tokens. Empty components are
/// dropped, so leading, trailing and duplicate separators are idempotent.
pub fn tokenize(base_path: &str) -> Vec<PathToken> {
    base_path
        .split('/')
        .filter(|component| !component.is_empty())
        .enumerate()
        .map(|(index, component)| {
            let kind = match placeholder_name(component) {
                Some(name) => TokenKind::Placeholder(SmolStr::new(name)),
                None => TokenKind::Literal(SmolStr::new(component)),
            };
            PathToken { index, kind }
        })
        .collect()
}
