//! Substitution values gathered from YAML files and `key=value` pairs.
//!
//! Sources are merged in order into a single flat [`ValueTable`]:
//! - every `--file` source, in the order given
//! - every `--value` pair, in the order given
//!
//! A later source replaces an earlier source's value for the same key, so
//! inline pairs always win over file values.

use crate::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub use serde_yaml::Value;

/// Flat lookup table from key to a YAML-decoded value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueTable {
    values: BTreeMap<String, Value>,
}

impl ValueTable {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the one it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Resolve a key to its default string representation.
    ///
    /// A key bound to null is treated the same as a missing key.
    pub fn lookup(&self, key: &str) -> Option<String> {
        match self.values.get(key)? {
            Value::Null => None,
            value => Some(render(value)),
        }
    }

    /// Decode a YAML document and merge its top-level mapping into the table.
    ///
    /// Only the first document of a multi-document stream is read. An empty
    /// stream or document is an empty mapping. Scalar keys are stringified.
    pub fn merge_yaml(&mut self, path: &Path, bytes: &[u8]) -> Result<()> {
        let parse_error = |message: String| Error::Parse {
            path: path.to_path_buf(),
            message,
        };

        let document = match serde_yaml::Deserializer::from_slice(bytes).next() {
            Some(document) => {
                Value::deserialize(document).map_err(|e| parse_error(e.to_string()))?
            }
            None => Value::Null,
        };
        let mapping = match document {
            Value::Null => return Ok(()),
            Value::Mapping(mapping) => mapping,
            other => {
                return Err(parse_error(format!(
                    "expected a mapping at the top level, found {}",
                    kind(&other)
                )));
            }
        };

        for (key, value) in mapping {
            let key = scalar_key(&key).ok_or_else(|| {
                parse_error(format!("unsupported {} key {}", kind(&key), render(&key)))
            })?;
            self.values.insert(key, value);
        }

        Ok(())
    }

    /// Merge a `key=value` pair. The value is stored as a plain string.
    pub fn merge_pair(&mut self, pair: &str) -> Result<()> {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| Error::MalformedPair(pair.to_string()))?;
        self.values
            .insert(key.to_string(), Value::String(value.to_string()));
        Ok(())
    }
}

/// The ordered set of value sources for one invocation.
#[derive(Debug, Clone, Default)]
pub struct ValueSources {
    /// YAML files, merged in order.
    pub files: Vec<PathBuf>,
    /// `key=value` pairs, merged after all files.
    pub values: Vec<String>,
    /// Skip files that do not exist instead of failing.
    pub ignore_missing_files: bool,
}

impl ValueSources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    pub fn with_value(mut self, pair: impl Into<String>) -> Self {
        self.values.push(pair.into());
        self
    }

    pub fn ignore_missing_files(mut self, ignore: bool) -> Self {
        self.ignore_missing_files = ignore;
        self
    }

    /// Read every source and merge them into one table.
    pub fn resolve(&self) -> Result<ValueTable> {
        let mut table = ValueTable::new();

        for path in &self.files {
            let bytes = match std::fs::read(path) {
                Ok(bytes) => bytes,
                Err(e) if self.ignore_missing_files && e.kind() == ErrorKind::NotFound => {
                    warn!(path = %path.display(), "skipping missing file");
                    continue;
                }
                Err(source) => {
                    return Err(Error::FileRead {
                        path: path.clone(),
                        source,
                    });
                }
            };
            table.merge_yaml(path, &bytes)?;
        }

        for pair in &self.values {
            table.merge_pair(pair)?;
        }

        for (key, value) in table.iter() {
            debug!(key = %key, value = %render(value), "resolved value");
        }

        Ok(table)
    }
}

/// Format a value with its default string representation.
///
/// Scalars render bare; sequences and mappings render as compact JSON.
pub fn render(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => render_number(n),
        Value::String(s) => s.clone(),
        Value::Tagged(tagged) => render(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => to_json(value).to_string(),
    }
}

fn to_json(value: &Value) -> serde_json::Value {
    use serde_json::Value as Json;

    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Json::from(i)
            } else if let Some(u) = n.as_u64() {
                Json::from(u)
            } else {
                // NaN and infinities have no JSON form
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Json::Number)
                    .unwrap_or_else(|| Json::String(render_number(n)))
            }
        }
        Value::String(s) => Json::String(s.clone()),
        Value::Sequence(items) => Json::Array(items.iter().map(to_json).collect()),
        Value::Mapping(mapping) => Json::Object(
            mapping
                .iter()
                .map(|(k, v)| (render(k), to_json(v)))
                .collect(),
        ),
        Value::Tagged(tagged) => to_json(&tagged.value),
    }
}

/// Integers print as-is, finite floats drop a zero fraction (`1.0` => `1`),
/// and the non-finite values print as `NaN`, `+Inf` and `-Inf`.
fn render_number(n: &serde_yaml::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_nan() => "NaN".to_string(),
        Some(f) if f == f64::INFINITY => "+Inf".to_string(),
        Some(f) if f == f64::NEG_INFINITY => "-Inf".to_string(),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

fn scalar_key(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(render_number(n)),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged",
    }
}
