//! JSON glue: serde integration, conversion from `serde_json` data, and
//! load/dump helpers
//!
//! Trees serialize to exactly the JSON the equivalent plain data would
//! produce. Flags and classes are never emitted, and an unresolved
//! undefined reference serializes as `null`.

use std::io::{Read, Write};

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::ser::PrettyFormatter;
use serde_json::Number;

use crate::cast::cast;
use crate::error::Result;
use crate::flags::Flags;
use crate::value::{Mapping, Sequence, Value};

/// Output options for [`dump`] and [`dumps`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpOptions {
    /// Pretty-print with this many spaces per level; compact when `None`
    pub indent: Option<usize>,
}

impl DumpOptions {
    /// Compact output on a single line.
    pub fn compact() -> Self {
        Self::default()
    }

    /// Pretty output indented by `indent` spaces.
    pub fn pretty(indent: usize) -> Self {
        Self {
            indent: Some(indent),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// Load / Dump
// ═══════════════════════════════════════════════════════════════════

/// Parse JSON text into a tree whose nodes all carry `flags`.
///
/// ```
/// use sapling::{loads, Flags};
///
/// let config = loads(r#"{"server": {"port": 8080}}"#, Flags::default()).unwrap();
/// assert_eq!(config.at("server").unwrap().at("port").unwrap(), 8080);
/// ```
pub fn loads(text: &str, flags: Flags) -> Result<Value> {
    let data: serde_json::Value = serde_json::from_str(text)?;
    tracing::debug!(?flags, bytes = text.len(), "loaded tree from JSON text");
    Ok(cast(Value::from(data), flags))
}

/// Read JSON from `reader` into a tree whose nodes all carry `flags`.
pub fn load<R: Read>(reader: R, flags: Flags) -> Result<Value> {
    let data: serde_json::Value = serde_json::from_reader(reader)?;
    tracing::debug!(?flags, "loaded tree from JSON reader");
    Ok(cast(Value::from(data), flags))
}

/// Encode a tree as JSON text.
pub fn dumps(tree: &Value, options: &DumpOptions) -> Result<String> {
    let mut buffer = Vec::new();
    dump(tree, &mut buffer, options)?;
    // serde_json only ever writes UTF-8
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Write a tree as JSON to `writer`.
pub fn dump<W: Write>(tree: &Value, writer: W, options: &DumpOptions) -> Result<()> {
    match options.indent {
        Some(width) => {
            let indent = " ".repeat(width);
            let formatter = PrettyFormatter::with_indent(indent.as_bytes());
            let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
            tree.serialize(&mut serializer)?;
        }
        None => serde_json::to_writer(writer, tree)?,
    }
    tracing::debug!(indent = ?options.indent, "dumped tree as JSON");
    Ok(())
}

/// Convert a tree to plain `serde_json` data.
///
/// Non-finite floats have no JSON form and become `null`.
pub fn to_json(tree: &Value) -> serde_json::Value {
    match tree {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(n) => serde_json::Value::Number((*n).into()),
        Value::Float(n) => Number::from_f64(*n).map_or(serde_json::Value::Null, serde_json::Value::Number),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Mapping(m) => serde_json::Value::Object(
            m.iter().map(|(k, v)| (k, to_json(&v))).collect(),
        ),
        Value::Sequence(s) => serde_json::Value::Array(s.iter().map(|v| to_json(&v)).collect()),
        Value::Undefined(u) => u
            .resolve()
            .map_or(serde_json::Value::Null, |resolved| to_json(&resolved)),
    }
}

// ═══════════════════════════════════════════════════════════════════
// serde integration
// ═══════════════════════════════════════════════════════════════════

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::Mapping(m) => m.serialize(serializer),
            Value::Sequence(s) => s.serialize(serializer),
            Value::Undefined(u) => match u.resolve() {
                Some(resolved) => resolved.serialize(serializer),
                None => serializer.serialize_unit(),
            },
        }
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let items = self.items();
        let mut map = serializer.serialize_map(Some(items.len()))?;
        for (key, value) in &items {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for Sequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let items = self.to_vec();
        let mut seq = serializer.serialize_seq(Some(items.len()))?;
        for item in &items {
            seq.serialize_element(item)?;
        }
        seq.end()
    }
}

/// Deserializes into unlocked nodes.
impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

// ═══════════════════════════════════════════════════════════════════
// Conversion from serde_json data
// ═══════════════════════════════════════════════════════════════════

impl From<serde_json::Value> for Value {
    fn from(data: serde_json::Value) -> Self {
        match data {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => number(&n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Sequence(Sequence::from_values(items, Flags::default()))
            }
            serde_json::Value::Object(entries) => {
                Value::Mapping(Mapping::from_entries(entries, Flags::default()))
            }
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(data: &serde_json::Value) -> Self {
        Value::from(data.clone())
    }
}

fn number(n: &Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Int(i)
    } else if let Some(u) = n.as_u64() {
        Value::from(u)
    } else {
        Value::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

impl PartialEq<serde_json::Value> for Value {
    fn eq(&self, other: &serde_json::Value) -> bool {
        *self == Value::from(other)
    }
}

impl PartialEq<serde_json::Value> for Mapping {
    fn eq(&self, other: &serde_json::Value) -> bool {
        Value::Mapping(self.clone()) == *other
    }
}

impl PartialEq<serde_json::Value> for Sequence {
    fn eq(&self, other: &serde_json::Value) -> bool {
        Value::Sequence(self.clone()) == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_dumps_compact_matches_serde_json() {
        let data = json!({"name": "foo", "numbers": [1, 3, 5], "ratio": 0.5, "ok": true, "none": null});
        let tree = loads(&data.to_string(), Flags::default()).unwrap();
        assert_eq!(
            dumps(&tree, &DumpOptions::compact()).unwrap(),
            serde_json::to_string(&data).unwrap()
        );
    }

    #[test]
    fn test_dumps_pretty_matches_serde_json() {
        let data = json!({"a": {"b": [1, 2]}});
        let tree = Value::from(data.clone());
        assert_eq!(
            dumps(&tree, &DumpOptions::pretty(2)).unwrap(),
            serde_json::to_string_pretty(&data).unwrap()
        );
    }

    #[test]
    fn test_flags_never_emitted() {
        let tree = loads(r#"{"a": [1]}"#, Flags::new(true, true)).unwrap();
        assert!(tree.is_frozen());
        assert!(tree.at("a").unwrap().is_sealed());
        assert_eq!(to_json(&tree), json!({"a": [1]}));
    }

    #[test]
    fn test_unresolved_reference_serializes_as_null() {
        let root = Mapping::new();
        let missing = root.at("missing").unwrap();
        assert_eq!(serde_json::to_string(&missing).unwrap(), "null");
        assert_eq!(to_json(&missing), serde_json::Value::Null);
    }

    #[test]
    fn test_large_unsigned_becomes_float() {
        let tree = Value::from(json!(u64::MAX));
        assert!(matches!(tree, Value::Float(_)));
    }

    #[test]
    fn test_load_reports_invalid_json() {
        let err = loads("{not json", Flags::default()).unwrap_err();
        assert!(matches!(err, crate::error::TreeError::Json(_)));
    }

    #[test]
    fn test_deserialize_value() {
        let tree: Value = serde_json::from_str(r#"{"x": [true, null]}"#).unwrap();
        assert_eq!(tree, json!({"x": [true, null]}));
        assert!(!tree.is_frozen());
    }
}
