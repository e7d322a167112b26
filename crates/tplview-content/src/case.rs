//! Key casing policy for content built from serializable values.

use crate::value::ContentValue;

/// How mapping keys are spelled in normalized content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyCase {
    /// Keys are kept exactly as written.
    #[default]
    Preserve,
    /// Keys are converted to camelCase (`Title` becomes `title`).
    Camel,
}

impl KeyCase {
    /// Applies the policy to every mapping key in `value`, recursively.
    pub fn apply(self, value: ContentValue) -> ContentValue {
        match self {
            KeyCase::Preserve => value,
            KeyCase::Camel => camel_keys(value),
        }
    }
}

fn camel_keys(value: ContentValue) -> ContentValue {
    match value {
        ContentValue::Mapping(map) => ContentValue::Mapping(
            map.into_iter()
                .map(|(key, value)| (to_camel_case(&key), camel_keys(value)))
                .collect(),
        ),
        ContentValue::Sequence(items) => {
            ContentValue::Sequence(items.into_iter().map(camel_keys).collect())
        }
        scalar => scalar,
    }
}

/// Lowers the leading run of upper-case characters.
///
/// When the run is followed by a lower-case character, its last capital
/// starts the next word and is kept: `URLValue` becomes `urlValue`, while
/// `ID` becomes `id` and `Title` becomes `title`.
pub fn to_camel_case(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len());

    for (i, c) in chars.iter().enumerate() {
        if !c.is_uppercase() {
            out.extend(chars[i..].iter());
            return out;
        }
        let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
        if i > 0 && next_is_lower {
            out.extend(chars[i..].iter());
            return out;
        }
        out.extend(c.to_lowercase());
    }
    out
}
