//! Picking one value out of several candidates for a single-valued string field

use super::UntaggedStrategy;
use crate::model::Value;
use tracing::debug;

/// Collapse candidate values to one.
///
/// Tagged values win: the first preferred language with a match, then English, then the
/// alphabetically first language tag. Untagged values are only considered when nothing is
/// tagged; under [`UntaggedStrategy::Reject`] they are returned unchanged as a list.
pub fn select_language(values: Vec<Value>, preferred: &[String], strategy: UntaggedStrategy) -> Value {
    let tagged: Vec<(&str, &str)> = values
        .iter()
        .filter_map(|v| match v {
            Value::LangString { value, language } => Some((value.as_str(), language.as_str())),
            _ => None,
        })
        .collect();

    if !tagged.is_empty() {
        let by_language = |wanted: &str| {
            tagged
                .iter()
                .find(|(_, language)| language.eq_ignore_ascii_case(wanted))
                .map(|(text, _)| text.to_string())
        };
        let chosen = preferred
            .iter()
            .find_map(|language| by_language(language))
            .or_else(|| by_language("en"))
            .or_else(|| {
                tagged
                    .iter()
                    .min_by(|a, b| a.1.cmp(b.1))
                    .map(|(text, _)| text.to_string())
            })
            .unwrap_or_default();
        debug!("Selected {:?} from {} language-tagged values", chosen, tagged.len());
        return Value::String(chosen);
    }

    match strategy {
        UntaggedStrategy::Reject => Value::List(values),
        UntaggedStrategy::PreferAscii => {
            let untagged: Vec<&str> = values.iter().filter_map(Value::as_str).collect();
            untagged
                .iter()
                .find(|text| text.is_ascii())
                .or_else(|| untagged.first())
                .map(|text| Value::String(text.to_string()))
                .unwrap_or(Value::Null)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(value: &str, language: &str) -> Value {
        Value::LangString {
            value: value.to_string(),
            language: language.to_string(),
        }
    }

    fn prefs(languages: &[&str]) -> Vec<String> {
        languages.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_preferred_language_wins() {
        let values = vec![tagged("John Smith", "en"), tagged("Джон Сміт", "uk")];
        assert_eq!(
            select_language(values.clone(), &prefs(&["uk"]), UntaggedStrategy::Reject),
            Value::from("Джон Сміт")
        );
        assert_eq!(
            select_language(values, &prefs(&["ja", "de"]), UntaggedStrategy::Reject),
            Value::from("John Smith")
        );
    }

    #[test]
    fn test_alphabetical_fallback() {
        let values = vec![tagged("b", "fr"), tagged("a", "es")];
        assert_eq!(
            select_language(values, &prefs(&["ja"]), UntaggedStrategy::Reject),
            Value::from("a")
        );
    }

    #[test]
    fn test_tagged_values_beat_untagged() {
        let values = vec![Value::from("plain"), tagged("Hallo", "de")];
        assert_eq!(
            select_language(values, &prefs(&["en"]), UntaggedStrategy::PreferAscii),
            Value::from("Hallo")
        );
    }

    #[test]
    fn test_untagged_strategies() {
        let values = vec![Value::from("Jürgen"), Value::from("Juergen")];
        assert_eq!(
            select_language(values.clone(), &prefs(&["en"]), UntaggedStrategy::PreferAscii),
            Value::from("Juergen")
        );
        assert_eq!(
            select_language(values.clone(), &prefs(&["en"]), UntaggedStrategy::Reject),
            Value::List(values)
        );
    }
}
