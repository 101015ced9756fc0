// src/parser/schema.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::document::{OpenApiDocument, ParserError, Result};

/// Expands `$ref` indirection in schema nodes against one document.
///
/// Normalization never touches the document itself; every call returns a
/// freshly built tree, so one document can back any number of concurrent
/// resolvers.
#[derive(Debug, Clone, Copy)]
pub struct SchemaResolver<'a> {
    document: &'a OpenApiDocument,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(document: &'a OpenApiDocument) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &'a OpenApiDocument {
        self.document
    }

    /// Recursively replace every reachable `$ref` with its resolved body.
    ///
    /// Descends into `array.items`, `object.properties`, `oneOf` and `anyOf`.
    /// Anything else is returned as-is. A reference that (directly or not)
    /// points back into itself fails with [`ParserError::CyclicReference`].
    pub fn normalize(&self, schema: &Value) -> Result<Value> {
        let mut in_progress = Vec::new();
        self.normalize_node(schema, &mut in_progress)
    }

    fn normalize_node(&self, schema: &Value, in_progress: &mut Vec<String>) -> Result<Value> {
        let node = match schema.as_object() {
            Some(node) if !node.is_empty() => node,
            _ => return Ok(schema.clone()),
        };

        if let Some(reference) = node.get("$ref") {
            let pointer = match reference.as_str() {
                Some(pointer) => pointer,
                None => {
                    return Err(ParserError::Reference {
                        pointer: reference.to_string(),
                    })
                }
            };

            if in_progress.iter().any(|p| p == pointer) {
                return Err(ParserError::CyclicReference {
                    pointer: pointer.to_string(),
                });
            }

            let target = self.document.resolve_ref(pointer)?;
            in_progress.push(pointer.to_string());
            let resolved = self.normalize_node(target, in_progress);
            in_progress.pop();
            return resolved;
        }

        let mut out = node.clone();

        if node.get("type").and_then(Value::as_str) == Some("array") {
            if let Some(items) = node.get("items") {
                out.insert("items".into(), self.normalize_node(items, in_progress)?);
            }
            return Ok(Value::Object(out));
        }

        if node.get("type").and_then(Value::as_str) == Some("object") {
            if let Some(properties) = node.get("properties").and_then(Value::as_object) {
                let mut resolved = Map::with_capacity(properties.len());
                for (name, sub) in properties {
                    resolved.insert(name.clone(), self.normalize_node(sub, in_progress)?);
                }
                out.insert("properties".into(), Value::Object(resolved));
            }
        }

        for key in ["oneOf", "anyOf"] {
            if let Some(variants) = node.get(key).and_then(Value::as_array) {
                let resolved = variants
                    .iter()
                    .map(|variant| self.normalize_node(variant, in_progress))
                    .collect::<Result<Vec<_>>>()?;
                out.insert(key.into(), Value::Array(resolved));
            }
        }

        Ok(Value::Object(out))
    }
}

/// Flat description of an object schema's top-level properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldsMeta {
    pub fields: Vec<String>,
    pub required: Vec<String>,
    pub uuid_fields: Vec<String>,
    pub enum_fields: Map<String, Value>,
}

/// Collect property names, required names, uuid-formatted properties and enum
/// values from a (normalized) schema. Nested properties are not inspected.
pub fn extract_fields(schema: Option<&Value>) -> FieldsMeta {
    let schema = match schema.and_then(Value::as_object) {
        Some(schema) if !schema.is_empty() => schema,
        _ => return FieldsMeta::default(),
    };

    let mut meta = FieldsMeta {
        required: schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default(),
        ..FieldsMeta::default()
    };

    let properties = match schema.get("properties").and_then(Value::as_object) {
        Some(properties) => properties,
        None => return meta,
    };

    for (name, info) in properties {
        meta.fields.push(name.clone());

        if info.get("format").and_then(Value::as_str) == Some("uuid") {
            meta.uuid_fields.push(name.clone());
        }

        if let Some(values) = info.get("enum") {
            meta.enum_fields.insert(name.clone(), values.clone());
        }
    }

    meta
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> OpenApiDocument {
        OpenApiDocument::new(json!({
            "components": {
                "schemas": {
                    "VM": {
                        "type": "object",
                        "required": ["id", "name"],
                        "properties": {
                            "id": {"type": "string", "format": "uuid"},
                            "name": {"type": "string"},
                            "disk": {"$ref": "#/components/schemas/Disk"}
                        }
                    },
                    "Disk": {
                        "type": "object",
                        "properties": {
                            "size": {"type": "integer"},
                            "kind": {"$ref": "#/components/schemas/DiskKind"}
                        }
                    },
                    "DiskKind": {"type": "string", "enum": ["SSD", "HDD"]},
                    "Alias": {"$ref": "#/components/schemas/VM"},
                    "Node": {
                        "type": "object",
                        "properties": {
                            "children": {
                                "type": "array",
                                "items": {"$ref": "#/components/schemas/Node"}
                            }
                        }
                    },
                    "Broken": {
                        "type": "object",
                        "properties": {"x": {"$ref": "#/components/schemas/Nope"}}
                    }
                }
            }
        }))
    }

    #[test]
    fn test_empty_schema_is_returned_unchanged() {
        let doc = document();
        let resolver = SchemaResolver::new(&doc);
        assert_eq!(resolver.normalize(&json!({})).unwrap(), json!({}));
        assert_eq!(resolver.normalize(&Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_ref_chain_bottoms_out() {
        let doc = document();
        let resolver = SchemaResolver::new(&doc);

        let schema = resolver
            .normalize(&json!({"$ref": "#/components/schemas/Alias"}))
            .unwrap();

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["id", "name"]));
        assert_eq!(schema["properties"]["disk"]["properties"]["size"]["type"], "integer");
        assert_eq!(
            schema["properties"]["disk"]["properties"]["kind"]["enum"],
            json!(["SSD", "HDD"])
        );
        assert!(!schema.to_string().contains("$ref"));
    }

    #[test]
    fn test_array_items_are_inlined() {
        let doc = document();
        let resolver = SchemaResolver::new(&doc);

        let schema = resolver
            .normalize(&json!({"type": "array", "items": {"$ref": "#/components/schemas/VM"}}))
            .unwrap();

        assert_eq!(schema["type"], "array");
        assert_eq!(schema["items"]["type"], "object");
        assert!(schema["items"]["properties"].get("id").is_some());
    }

    #[test]
    fn test_one_of_and_any_of() {
        let doc = document();
        let resolver = SchemaResolver::new(&doc);

        let schema = resolver
            .normalize(&json!({
                "oneOf": [{"$ref": "#/components/schemas/DiskKind"}, {"type": "null"}],
                "anyOf": [{"$ref": "#/components/schemas/Disk"}]
            }))
            .unwrap();

        assert_eq!(schema["oneOf"][0]["enum"], json!(["SSD", "HDD"]));
        assert_eq!(schema["oneOf"][1], json!({"type": "null"}));
        assert_eq!(schema["anyOf"][0]["properties"]["size"]["type"], "integer");
    }

    #[test]
    fn test_property_order_is_preserved() {
        let doc = document();
        let resolver = SchemaResolver::new(&doc);

        let schema = resolver
            .normalize(&json!({"$ref": "#/components/schemas/VM"}))
            .unwrap();
        let keys: Vec<&String> = schema["properties"].as_object().unwrap().keys().collect();
        assert_eq!(keys, ["id", "name", "disk"]);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let doc = document();
        let resolver = SchemaResolver::new(&doc);

        let input = json!({"type": "array", "items": {"$ref": "#/components/schemas/Alias"}});
        let once = resolver.normalize(&input).unwrap();
        let twice = resolver.normalize(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_document_is_not_mutated() {
        let doc = document();
        let before = doc.raw().clone();
        let resolver = SchemaResolver::new(&doc);

        resolver
            .normalize(&json!({"$ref": "#/components/schemas/VM"}))
            .unwrap();

        assert_eq!(doc.raw(), &before);
    }

    #[test]
    fn test_self_reference_is_reported() {
        let doc = document();
        let resolver = SchemaResolver::new(&doc);

        let err = resolver
            .normalize(&json!({"$ref": "#/components/schemas/Node"}))
            .unwrap_err();

        match err {
            ParserError::CyclicReference { pointer } => {
                assert_eq!(pointer, "#/components/schemas/Node")
            }
            other => panic!("expected cyclic reference, got {other:?}"),
        }
    }

    #[test]
    fn test_sibling_reuse_is_not_a_cycle() {
        let doc = document();
        let resolver = SchemaResolver::new(&doc);

        let schema = resolver
            .normalize(&json!({
                "type": "object",
                "properties": {
                    "a": {"$ref": "#/components/schemas/DiskKind"},
                    "b": {"$ref": "#/components/schemas/DiskKind"}
                }
            }))
            .unwrap();

        assert_eq!(schema["properties"]["a"], schema["properties"]["b"]);
    }

    #[test]
    fn test_missing_nested_ref_fails() {
        let doc = document();
        let resolver = SchemaResolver::new(&doc);

        let err = resolver
            .normalize(&json!({"$ref": "#/components/schemas/Broken"}))
            .unwrap_err();
        assert!(matches!(err, ParserError::Reference { .. }));
    }

    #[test]
    fn test_extract_fields_empty() {
        assert_eq!(extract_fields(None), FieldsMeta::default());
        assert_eq!(extract_fields(Some(&json!({}))), FieldsMeta::default());
    }

    #[test]
    fn test_extract_fields_top_level_only() {
        let meta = extract_fields(Some(&json!({
            "type": "object",
            "required": ["id", "ghost"],
            "properties": {
                "id": {"type": "string", "format": "uuid"},
                "status": {"type": "string", "enum": ["ACTIVE", "STOPPED"]},
                "nested": {
                    "type": "object",
                    "properties": {"inner": {"type": "string", "format": "uuid"}}
                }
            }
        })));

        assert_eq!(meta.fields, ["id", "status", "nested"]);
        assert_eq!(meta.required, ["id", "ghost"]);
        assert_eq!(meta.uuid_fields, ["id"]);
        assert_eq!(meta.enum_fields.len(), 1);
        assert_eq!(meta.enum_fields["status"], json!(["ACTIVE", "STOPPED"]));
    }
}
