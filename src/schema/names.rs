//! Name formatting used when turning element names into code-safe names and URIs.

/// `named thing` -> `NamedThing`
pub fn camelcase(txt: &str) -> String {
    txt.split(|c: char| c.is_whitespace() || c == '_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// `lives at` -> `lives_at`
pub fn underscore(txt: &str) -> String {
    txt.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Suffix a URI so that a local name can be appended directly.
pub fn sfx(uri: &str) -> String {
    match uri.chars().last() {
        Some('/') | Some('#') | Some('_') | Some(':') => uri.to_string(),
        _ => format!("{}/", uri),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camelcase() {
        assert_eq!(camelcase("named thing"), "NamedThing");
        assert_eq!(camelcase("wind instrument"), "WindInstrument");
        assert_eq!(camelcase("has_employment_history"), "HasEmploymentHistory");
        assert_eq!(camelcase("Person"), "Person");
        assert_eq!(camelcase("iPhone"), "IPhone");
    }

    #[test]
    fn test_underscore() {
        assert_eq!(underscore("lives at"), "lives_at");
        assert_eq!(underscore("  started at  time "), "started_at_time");
        assert_eq!(underscore("age_in_years"), "age_in_years");
    }

    #[test]
    fn test_sfx() {
        assert_eq!(sfx("https://example.org/test"), "https://example.org/test/");
        assert_eq!(sfx("https://example.org/test#"), "https://example.org/test#");
        assert_eq!(sfx("https://example.org/test/"), "https://example.org/test/");
    }
}
