use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single scalar cell value
///
/// JSON `null` deserializes to `Null`. Everywhere in the pipeline `Null` and
/// an absent field mean the same thing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Null, or a value whose string form is only whitespace
    pub fn is_blank(&self) -> bool {
        self.to_string().trim().is_empty()
    }
}

/// Largest magnitude where every integral `f64` is exact as an `i64`
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Plain string form: text as-is, `true`/`false`, and an empty string for
/// null. Integral floats drop the fraction, so `5.0` prints as `5`.
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Number(n) => match n.as_f64() {
                Some(x) if n.is_f64() && x.fract() == 0.0 && x.abs() <= MAX_EXACT_INT => {
                    write!(f, "{}", x as i64)
                }
                _ => write!(f, "{}", n),
            },
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value.into())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map(FieldValue::Number)
            .unwrap_or(FieldValue::Null)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

/// One row of map/table data with an open field set
///
/// Businesses, custom POIs, hazards and notes all flow through as records.
/// The well-known fields get typed accessors; anything else is reachable by
/// name through [`Record::get`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for tests and fixtures
    pub fn with(mut self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) {
        self.fields.insert(field.to_string(), value.into());
    }

    /// Value of a field, `None` when absent or null
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_str)
    }

    /// The free-text type tag used for category resolution
    pub fn type_tag(&self) -> Option<&str> {
        self.get_str("type")
    }

    /// Contact fields may be text or numbers, so these return the raw value
    pub fn phone(&self) -> Option<&FieldValue> {
        self.get("phone")
    }

    pub fn email(&self) -> Option<&FieldValue> {
        self.get("email")
    }

    pub fn website(&self) -> Option<&FieldValue> {
        self.get("website")
    }
}

impl AsRef<Record> for Record {
    fn as_ref(&self) -> &Record {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_business() {
        let record: Record = serde_json::from_str(
            r#"{"name": "Corner Cafe", "type": "cafe", "lat": 52.1, "phone": null, "open": true}"#,
        )
        .unwrap();

        assert_eq!(record.type_tag(), Some("cafe"));
        assert_eq!(record.get_str("name"), Some("Corner Cafe"));
        assert_eq!(record.get("lat").and_then(FieldValue::as_f64), Some(52.1));
        assert_eq!(record.get("open"), Some(&FieldValue::Bool(true)));
        assert!(record.phone().is_none());
        assert!(record.get("missing").is_none());
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(FieldValue::from("abc").to_string(), "abc");
        assert_eq!(FieldValue::from(555i64).to_string(), "555");
        assert_eq!(FieldValue::from(1.5).to_string(), "1.5");
        assert_eq!(FieldValue::from(5.0).to_string(), "5");
        assert_eq!(FieldValue::from(-12.0).to_string(), "-12");
        assert_eq!(FieldValue::from(false).to_string(), "false");
        assert_eq!(FieldValue::Null.to_string(), "");
    }

    #[test]
    fn test_blank_values() {
        let record = Record::new()
            .with("phone", "   ")
            .with("email", "a@b.c")
            .with("website", 42i64);
        assert!(record.phone().unwrap().is_blank());
        assert!(!record.email().unwrap().is_blank());
        assert!(!record.website().unwrap().is_blank());
        assert!(FieldValue::Null.is_blank());
    }

    #[test]
    fn test_float_field_from_json_prints_like_integer() {
        let record: Record = serde_json::from_str(r#"{"lat": 5.0, "lon": -0.5}"#).unwrap();
        assert_eq!(record.get("lat").unwrap().to_string(), "5");
        assert_eq!(record.get("lon").unwrap().to_string(), "-0.5");
    }

    #[test]
    fn test_non_finite_float_becomes_null() {
        assert!(FieldValue::from(f64::NAN).is_null());
    }
}
