//! Name derivation rules shared by the reader generators.

/// Strips a getter prefix (`get`/`is`/`has`/`are`, with or without a
/// separating underscore) and uncapitalizes the remainder. Names without a
/// recognized prefix pass through unchanged.
pub fn field_name_from_getter(method: &str) -> String {
    for prefix in ["get", "is", "has", "are"] {
        if let Some(rest) = method.strip_prefix(prefix) {
            let rest = rest.strip_prefix('_').unwrap_or(rest);
            if !rest.is_empty() {
                return uncapitalize(rest);
            }
        }
    }
    method.to_string()
}

/// Derives a reader class name from a builder operation name: a leading
/// `build` is stripped and `Data` appended, e.g. `build_contact_uri` →
/// `ContactUriData`.
pub fn reader_class_name(op: &str) -> String {
    let rest = op.strip_prefix("build").map(|r| r.strip_prefix('_').unwrap_or(r));
    let base = match rest {
        Some(r) if !r.is_empty() => r,
        _ => op,
    };
    let mut name = to_pascal_case(base);
    name.push_str("Data");
    name
}

pub fn to_pascal_case(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(capitalize)
        .collect()
}

pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn uncapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn getter_prefixes_are_stripped() {
        assert_eq!(field_name_from_getter("get_name"), "name");
        assert_eq!(field_name_from_getter("getName"), "name");
        assert_eq!(field_name_from_getter("is_enabled"), "enabled");
        assert_eq!(field_name_from_getter("has_photo"), "photo");
        assert_eq!(field_name_from_getter("name"), "name");
        // A bare prefix is not a getter.
        assert_eq!(field_name_from_getter("get"), "get");
    }

    #[test]
    fn reader_names_from_op_names() {
        assert_eq!(reader_class_name("build_contact_uri"), "ContactUriData");
        assert_eq!(reader_class_name("contact"), "ContactData");
        assert_eq!(reader_class_name("build"), "BuildData");
    }

    #[test]
    fn case_conversions() {
        assert_eq!(to_pascal_case("contact_factory"), "ContactFactory");
        assert_eq!(to_snake_case("ContactFactory"), "contact_factory");
    }
}
