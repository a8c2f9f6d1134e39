//! Deserializers tolerant of PHP's habit of sending numbers as strings.

use serde::{Deserialize, Deserializer, de::Error as _};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Integer from a number or numeric string.
pub fn i64_from_any<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Int(v) => Ok(v),
        #[allow(clippy::cast_possible_truncation)]
        NumberOrString::Float(v) if v.fract() == 0.0 => Ok(v as i64),
        NumberOrString::Float(v) => Err(D::Error::custom(format!("expected integer, got {v}"))),
        NumberOrString::Text(s) => s
            .trim()
            .parse()
            .map_err(|e| D::Error::custom(format!("invalid integer {s:?}: {e}"))),
    }
}

/// Float from a number or numeric string.
pub fn f64_from_any<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        #[allow(clippy::cast_precision_loss)]
        NumberOrString::Int(v) => Ok(v as f64),
        NumberOrString::Float(v) => Ok(v),
        NumberOrString::Text(s) => s
            .trim()
            .parse()
            .map_err(|e| D::Error::custom(format!("invalid number {s:?}: {e}"))),
    }
}

/// Like [`i64_from_any`], with `null` as `None`.
pub fn opt_i64_from_any<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "i64_from_any")] i64);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|Wrapper(v)| v))
}

/// Ids the backend may send as numbers or strings, kept as strings.
pub fn string_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Int(v) => Ok(v.to_string()),
        NumberOrString::Float(v) => Ok(v.to_string()),
        NumberOrString::Text(s) => Ok(s),
    }
}
