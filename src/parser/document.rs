// src/parser/document.rs

use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("document is neither valid JSON ({json}) nor valid YAML ({yaml})")]
    Parse { json: String, yaml: String },

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid $ref path: {pointer}")]
    Reference { pointer: String },

    #[error("Cyclic $ref detected while resolving: {pointer}")]
    CyclicReference { pointer: String },
}

pub type Result<T> = std::result::Result<T, ParserError>;

/// A parsed OpenAPI document, kept as an untyped tree.
///
/// Nothing beyond structural traversal is validated: a document without
/// `paths` or `components` simply behaves as if those mappings were empty.
#[derive(Debug, Clone)]
pub struct OpenApiDocument {
    raw: Value,
}

impl OpenApiDocument {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    /// Parse a document from a string, trying strict JSON before YAML.
    pub fn parse(content: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(content) {
            Ok(raw) => Ok(Self::new(raw)),
            Err(json_err) => match serde_yaml::from_str::<Value>(content) {
                Ok(raw) => Ok(Self::new(raw)),
                Err(yaml_err) => Err(ParserError::Parse {
                    json: json_err.to_string(),
                    yaml: yaml_err.to_string(),
                }),
            },
        }
    }

    /// Parse a document from disk. The format is picked by extension:
    /// `.json` is read as JSON, anything else as YAML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let raw = if is_json {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };

        Ok(Self::new(raw))
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The `paths` mapping, or an empty one when absent.
    pub fn paths(&self) -> &Map<String, Value> {
        self.mapping("paths")
    }

    /// The `components` mapping, or an empty one when absent.
    pub fn components(&self) -> &Map<String, Value> {
        self.mapping("components")
    }

    fn mapping(&self, key: &str) -> &Map<String, Value> {
        static EMPTY: once_cell::sync::Lazy<Map<String, Value>> =
            once_cell::sync::Lazy::new(Map::new);

        self.raw
            .get(key)
            .and_then(Value::as_object)
            .unwrap_or(&EMPTY)
    }

    /// Resolve a local pointer such as `#/components/schemas/VM`.
    ///
    /// Fails on the first segment that does not exist or holds `null`.
    /// External and relative document references are not supported.
    pub fn resolve_ref(&self, pointer: &str) -> Result<&Value> {
        let path = pointer
            .strip_prefix("#/")
            .ok_or_else(|| ParserError::Reference {
                pointer: pointer.to_string(),
            })?;

        let mut node = &self.raw;
        for segment in path.split('/') {
            let segment = decode_pointer_segment(segment);
            let next = match node {
                Value::Object(map) => map.get(&segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            };

            // an explicit `null` is as unresolvable as a missing key
            node = next.filter(|v| !v.is_null()).ok_or_else(|| ParserError::Reference {
                pointer: pointer.to_string(),
            })?;
        }

        Ok(node)
    }
}

/// Decodes a JSON Pointer segment (`~1` is `/`, `~0` is `~`).
fn decode_pointer_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}
