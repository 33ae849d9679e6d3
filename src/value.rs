//! Dynamic values interpolated into a template.
//!
//! Every value handed to the parser is classified once, at the call site, into
//! one of a closed set of shapes: a primitive scalar, a key/value mapping, an
//! ordered sequence, or an opaque reference (a component, a sub-tree produced by
//! an earlier render, ...). The tokenizer branches on that shape only.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// A dynamic value.
///
/// `T` is the caller's opaque type, usually whatever their element constructor
/// returns. It is never inspected, only moved.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<T> {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    /// Key/value mapping in insertion order
    Map(Attributes<T>),
    /// Ordered sequence
    List(Vec<Value<T>>),
    /// Opaque reference passed through untouched
    Opaque(T),
}

impl<T> Value<T> {
    /// True for `Null`, `Bool`, `Number` and `Str`.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::Null | Value::Bool(_) | Value::Number(_) | Value::Str(_))
    }

    /// Whether the value produces no visible text.
    ///
    /// Zero is never empty. Otherwise falsy values (`null`, `false`, NaN) and
    /// strings that are blank after trimming are empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Number(n) if *n == 0.0 => false,
            Value::Null | Value::Bool(false) => true,
            Value::Number(n) => n.is_nan(),
            Value::Str(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// String form of a scalar. `None` for mappings, sequences and opaque values.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null => Some("null".to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(format_number(*n)),
            Value::Str(s) => Some(s.clone()),
            Value::Map(_) | Value::List(_) | Value::Opaque(_) => None,
        }
    }

    /// Name of the value's shape, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Map(_) => "mapping",
            Value::List(_) => "sequence",
            Value::Opaque(_) => "opaque value",
        }
    }

    /// Short human description: the shape plus the text of a scalar.
    pub fn describe(&self) -> String {
        match self {
            Value::Str(s) => format!("string '{}'", s),
            Value::Null => "null".to_string(),
            Value::Map(map) => format!("mapping with {} entries", map.len()),
            Value::List(items) => format!("sequence of {} items", items.len()),
            Value::Opaque(_) => "opaque value".to_string(),
            other => match other.to_text() {
                Some(text) => format!("{} {}", other.kind(), text),
                None => other.kind().to_string(),
            },
        }
    }
}

/// Print a number the way template text expects: `1` rather than `1.0`.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if n == 0.0 {
        // Covers -0.0
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        // Exponent form, with an explicit sign on positive exponents: 1e+21
        let text = format!("{:e}", n);
        match text.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => text,
        }
    } else {
        format!("{}", n)
    }
}

/// Largest integer exactly representable in an f64
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

impl<T: Serialize> Serialize for Value<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER => {
                serializer.serialize_i64(*n as i64)
            }
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Map(map) => map.serialize(serializer),
            Value::List(items) => serializer.collect_seq(items),
            Value::Opaque(inner) => inner.serialize(serializer),
        }
    }
}

impl<T> From<bool> for Value<T> {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T> From<f64> for Value<T> {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl<T> From<i32> for Value<T> {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl<T> From<i64> for Value<T> {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl<T> From<usize> for Value<T> {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl<T> From<&str> for Value<T> {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl<T> From<String> for Value<T> {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl<T> From<Attributes<T>> for Value<T> {
    fn from(map: Attributes<T>) -> Self {
        Value::Map(map)
    }
}

impl<T> From<Vec<Value<T>>> for Value<T> {
    fn from(items: Vec<Value<T>>) -> Self {
        Value::List(items)
    }
}

/// JSON has no opaque values: objects become mappings, arrays sequences.
impl<T> From<serde_json::Value> for Value<T> {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(name, value)| (name, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

/// Ordered attribute mapping.
///
/// Names are unique. Inserting an existing name replaces its value and keeps
/// its original position.
#[derive(Debug, Clone, PartialEq)]
pub struct Attributes<T> {
    entries: Vec<(String, Value<T>)>,
}

impl<T> Attributes<T> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Set `name` to `value`, returning the previous value if any.
    pub fn insert(&mut self, name: impl Into<String>, value: Value<T>) -> Option<Value<T>> {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value<T>> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value<T>)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

impl<T> Default for Attributes<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, K: Into<String>> FromIterator<(K, Value<T>)> for Attributes<T> {
    fn from_iter<I: IntoIterator<Item = (K, Value<T>)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (name, value) in iter {
            attributes.insert(name, value);
        }
        attributes
    }
}

impl<T> IntoIterator for Attributes<T> {
    type Item = (String, Value<T>);
    type IntoIter = std::vec::IntoIter<(String, Value<T>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<T: Serialize> Serialize for Attributes<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type V = Value<()>;

    #[test]
    fn test_empty_values() {
        assert!(V::Null.is_empty());
        assert!(V::Bool(false).is_empty());
        assert!(V::from("").is_empty());
        assert!(V::from("  \n ").is_empty());
        assert!(V::Number(f64::NAN).is_empty());
    }

    #[test]
    fn test_zero_is_not_empty() {
        assert!(!V::from(0).is_empty());
        assert!(!V::Number(-0.0).is_empty());
        assert!(!V::Bool(true).is_empty());
        assert!(!V::from(" x ").is_empty());
        assert!(!V::List(vec![]).is_empty());
        assert!(!Value::Opaque(()).is_empty());
    }

    #[test]
    fn test_text_of_scalars() {
        assert_eq!(V::from(1).to_text().as_deref(), Some("1"));
        assert_eq!(V::from(1.5).to_text().as_deref(), Some("1.5"));
        assert_eq!(V::Number(-0.0).to_text().as_deref(), Some("0"));
        assert_eq!(V::Number(f64::INFINITY).to_text().as_deref(), Some("Infinity"));
        assert_eq!(V::Bool(true).to_text().as_deref(), Some("true"));
        assert_eq!(V::Null.to_text().as_deref(), Some("null"));
        assert_eq!(V::List(vec![]).to_text(), None);
    }

    #[test]
    fn test_text_of_extreme_numbers() {
        assert_eq!(V::Number(1e21).to_text().as_deref(), Some("1e+21"));
        assert_eq!(V::Number(-2.5e30).to_text().as_deref(), Some("-2.5e+30"));
        assert_eq!(V::Number(1.5e-7).to_text().as_deref(), Some("1.5e-7"));
        assert_eq!(V::Number(1e20).to_text().as_deref(), Some("100000000000000000000"));
        assert_eq!(V::Number(0.000001).to_text().as_deref(), Some("0.000001"));
    }

    #[test]
    fn test_insert_keeps_position() {
        let mut attrs: Attributes<()> = Attributes::new();
        attrs.insert("class", "a".into());
        attrs.insert("id", "main".into());
        let previous = attrs.insert("class", "b".into());

        assert_eq!(previous, Some(V::from("a")));
        assert_eq!(attrs.names().collect::<Vec<_>>(), vec!["class", "id"]);
        assert_eq!(attrs.get("class"), Some(&V::from("b")));
    }

    #[test]
    fn test_from_json_keeps_key_order() {
        let json = serde_json::json!({"zeta": "1", "alpha": "2", "mid": "3"});
        let Value::Map(map) = V::from(json) else {
            panic!("Expected mapping");
        };
        assert_eq!(map.names().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_from_json_preserves_shape() {
        let json = serde_json::json!({"id": 1, "tags": ["a", null], "on": true});
        let value = V::from(json);
        let Value::Map(map) = value else {
            panic!("Expected mapping");
        };
        assert_eq!(map.get("id"), Some(&V::Number(1.0)));
        assert_eq!(
            map.get("tags"),
            Some(&V::List(vec![V::from("a"), V::Null]))
        );
        assert_eq!(map.get("on"), Some(&V::Bool(true)));
    }

    #[test]
    fn test_serialize_integral_numbers_as_integers() {
        let value: Value<String> = Value::List(vec![
            Value::from(3),
            Value::from(2.5),
            Value::Opaque("component".to_string()),
        ]);
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            serde_json::json!([3, 2.5, "component"])
        );
    }
}
