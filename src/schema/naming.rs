//! Default serialized-name convention for schema fields

/// Converts an identifier to snake_case: `nestedDummy` → `nested_dummy`,
/// `HTTPServer` → `http_server`. Already snake_case input is unchanged.
pub(crate) fn to_snake_case(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(to_snake_case("name"), "name");
        assert_eq!(to_snake_case("int_arr"), "int_arr");
        assert_eq!(to_snake_case("nestedDummy"), "nested_dummy");
        assert_eq!(to_snake_case("NestedDummy"), "nested_dummy");
        assert_eq!(to_snake_case("HTTPServer"), "http_server");
        assert_eq!(to_snake_case("ID"), "id");
        assert_eq!(to_snake_case("Field2Name"), "field2_name");
    }
}
