use serde::{Deserialize, Serialize};
use std::fmt;

/// A structured resource identifier: scheme, authority, path segments and
/// query pairs. Pure value type; parsing is lenient and never fails, the
/// way platform URI types treat arbitrary input.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Locator {
    scheme: String,
    authority: String,
    segments: Vec<String>,
    query: Vec<(String, String)>,
}

impl Locator {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Lenient parse. Malformed input degrades to whatever components can
    /// be recognized; nothing is rejected.
    pub fn parse(input: &str) -> Self {
        let (scheme, rest) = match input.split_once("://") {
            Some((scheme, rest)) => (scheme.to_string(), rest),
            None => (String::new(), input),
        };

        let (before_query, query_str) = match rest.split_once('?') {
            Some((b, q)) => (b, Some(q)),
            None => (rest, None),
        };

        let (authority, path) = match before_query.split_once('/') {
            Some((a, p)) => (a.to_string(), p),
            None => (before_query.to_string(), ""),
        };

        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let query = query_str
            .unwrap_or("")
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((k, v)) => (k.to_string(), v.to_string()),
                None => (pair.to_string(), String::new()),
            })
            .collect();

        Self {
            scheme,
            authority,
            segments,
            query,
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Raw (still encoded) path segments, in order.
    pub fn raw_path_segments(&self) -> &[String] {
        &self.segments
    }

    /// Decoded path segments, in order.
    pub fn path_segments(&self) -> Vec<String> {
        self.segments.iter().map(|s| decode(s)).collect()
    }

    pub fn path(&self) -> String {
        if self.segments.is_empty() {
            String::new()
        } else {
            format!("/{}", self.segments.join("/"))
        }
    }

    /// First decoded value of the named query parameter.
    pub fn query_value(&self, name: &str) -> Option<String> {
        self.query
            .iter()
            .find(|(k, _)| decode(k) == name)
            .map(|(_, v)| decode(v))
    }

    /// All decoded values of the named query parameter, in order. Empty when
    /// the parameter does not occur at all.
    pub fn query_values(&self, name: &str) -> Vec<String> {
        self.query
            .iter()
            .filter(|(k, _)| decode(k) == name)
            .map(|(_, v)| decode(v))
            .collect()
    }

    pub(crate) fn from_parts(
        scheme: String,
        authority: String,
        segments: Vec<String>,
        query: Vec<(String, String)>,
    ) -> Self {
        Self {
            scheme,
            authority,
            segments,
            query,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.scheme.is_empty() {
            write!(f, "{}://", self.scheme)?;
        }
        write!(f, "{}", self.authority)?;
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        for (i, (k, v)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{k}={v}")?;
        }
        Ok(())
    }
}

/// Assembles a [`Locator`]. Appends collapse duplicate separators, so a
/// builder can never produce an empty path segment.
#[derive(Debug, Clone, Default)]
pub struct LocatorBuilder {
    scheme: String,
    authority: String,
    segments: Vec<String>,
    query: Vec<(String, String)>,
}

impl LocatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = authority.into();
        self
    }

    /// Appends path components, percent-encoding each one. `path` may span
    /// several components; empty components are dropped.
    pub fn append_path(&mut self, path: impl AsRef<str>) {
        for component in path.as_ref().split('/').filter(|s| !s.is_empty()) {
            self.segments.push(encode(component));
        }
    }

    /// Appends path components that are already encoded, verbatim.
    pub fn append_encoded_path(&mut self, path: impl AsRef<str>) {
        for component in path.as_ref().split('/').filter(|s| !s.is_empty()) {
            self.segments.push(component.to_string());
        }
    }

    pub fn append_query(&mut self, key: &str, value: impl AsRef<str>) {
        self.query.push((encode(key), encode(value.as_ref())));
    }

    pub fn build(self) -> Locator {
        Locator::from_parts(self.scheme, self.authority, self.segments, self.query)
    }
}

const UNRESERVED: &[u8] = b"-_.~";

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || UNRESERVED.contains(&byte)
}

pub fn encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        if is_unreserved(byte) {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

/// Decodes `%XX` escapes; malformed escapes pass through unchanged.
pub fn decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            if let Ok(byte) = u8::from_str_radix(&input[i + 1..i + 3], 16) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_locator() {
        let uri = Locator::parse("content://com.example.provider/user/42?name=John&flag=1");
        assert_eq!(uri.scheme(), "content");
        assert_eq!(uri.authority(), "com.example.provider");
        assert_eq!(uri.path_segments(), vec!["user", "42"]);
        assert_eq!(uri.query_value("name").as_deref(), Some("John"));
        assert_eq!(uri.query_value("flag").as_deref(), Some("1"));
        assert_eq!(uri.query_value("missing"), None);
    }

    #[test]
    fn parse_is_lenient() {
        assert_eq!(Locator::parse(""), Locator::empty());

        let uri = Locator::parse("no scheme at all");
        assert_eq!(uri.scheme(), "");
        assert_eq!(uri.authority(), "no scheme at all");

        let uri = Locator::parse("content://a//double//slash");
        assert_eq!(uri.path_segments(), vec!["double", "slash"]);
    }

    #[test]
    fn query_values_keeps_order_and_duplicates() {
        let uri = Locator::parse("content://a/p?tag=x&tag=y&other=1&tag=z");
        assert_eq!(uri.query_values("tag"), vec!["x", "y", "z"]);
        assert!(uri.query_values("none").is_empty());
    }

    #[test]
    fn builder_collapses_separators() {
        let mut builder = LocatorBuilder::new().scheme("content").authority("a");
        builder.append_path("/user//42/");
        builder.append_path("detail");
        let uri = builder.build();
        assert_eq!(uri.path(), "/user/42/detail");
    }

    #[test]
    fn builder_encodes_unless_preencoded() {
        let mut builder = LocatorBuilder::new().scheme("content").authority("a");
        builder.append_path("John Doe");
        builder.append_encoded_path("pre%20done");
        builder.append_query("name", "a&b");
        let uri = builder.build();
        assert_eq!(uri.path(), "/John%20Doe/pre%20done");
        assert_eq!(uri.query_value("name").as_deref(), Some("a&b"));
        assert_eq!(uri.to_string(), "content://a/John%20Doe/pre%20done?name=a%26b");
    }

    #[test]
    fn display_round_trips_through_parse() {
        let mut builder = LocatorBuilder::new().scheme("content").authority("com.example");
        builder.append_path("maps/api");
        builder.append_query("zoom", "12");
        let uri = builder.build();
        let reparsed = Locator::parse(&uri.to_string());
        assert_eq!(uri, reparsed);
    }

    #[test]
    fn decode_handles_malformed_escapes() {
        assert_eq!(decode("a%2Gb"), "a%2Gb");
        assert_eq!(decode("a%"), "a%");
        assert_eq!(decode("a%20b"), "a b");
    }
}
