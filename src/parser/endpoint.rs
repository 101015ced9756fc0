// src/parser/endpoint.rs

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Map, Value};

use super::document::{OpenApiDocument, Result};
use super::schema::SchemaResolver;

/// HTTP verbs that produce an [`Endpoint`]; every other key under a path item
/// (`options`, `parameters`, `x-*` extensions, ...) is skipped.
pub const SUPPORTED_METHODS: [&str; 5] = ["get", "post", "put", "patch", "delete"];

/// One (path, method) operation as declared in the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Endpoint {
    /// The path template (e.g., "/v3/vms/{vm_id}")
    pub path: String,

    /// Upper-cased HTTP method
    pub method: String,

    pub summary: Option<String>,

    pub operation_id: Option<String>,

    /// Raw parameter objects, in declaration order
    pub parameters: Vec<Value>,

    /// Raw `requestBody` object, if the operation declares one
    pub request_body: Option<Value>,

    /// Status code to raw response object
    pub responses: Map<String, Value>,
}

impl Endpoint {
    pub fn path_parameters(&self) -> Vec<&Value> {
        self.parameters_in("path")
    }

    pub fn query_parameters(&self) -> Vec<&Value> {
        self.parameters_in("query")
    }

    fn parameters_in(&self, location: &str) -> Vec<&Value> {
        self.parameters
            .iter()
            .filter(|param| param.get("in").and_then(Value::as_str) == Some(location))
            .collect()
    }

    /// Names of every parameter flagged `required: true`, whatever its location.
    pub fn required_parameter_names(&self) -> Vec<String> {
        self.parameters
            .iter()
            .filter(|param| param.get("required").and_then(Value::as_bool) == Some(true))
            .filter_map(|param| param.get("name").and_then(Value::as_str))
            .map(String::from)
            .collect()
    }

    pub fn declares_status(&self, status_code: &str) -> bool {
        self.responses.contains_key(status_code)
    }
}

/// Walk `paths` and build one endpoint per supported (path, verb) pair, in
/// document order.
pub fn list_endpoints(document: &OpenApiDocument) -> Vec<Endpoint> {
    let mut endpoints = Vec::new();
    let mut seen: HashSet<(&str, String)> = HashSet::new();

    for (path, path_item) in document.paths() {
        let operations = match path_item.as_object() {
            Some(operations) => operations,
            None => continue,
        };

        for (method, operation) in operations {
            if !SUPPORTED_METHODS.contains(&method.to_lowercase().as_str()) {
                continue;
            }

            let op_obj = match operation.as_object() {
                Some(op_obj) => op_obj,
                None => continue,
            };

            let method = method.to_uppercase();

            // `GET` and `get` under the same path would collide once upper-cased
            if !seen.insert((path.as_str(), method.clone())) {
                tracing::debug!(%path, %method, "skipping duplicate operation");
                continue;
            }

            endpoints.push(Endpoint {
                path: path.clone(),
                method,
                summary: op_obj
                    .get("summary")
                    .and_then(Value::as_str)
                    .map(String::from),
                operation_id: op_obj
                    .get("operationId")
                    .and_then(Value::as_str)
                    .map(String::from),
                parameters: op_obj
                    .get("parameters")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default(),
                request_body: op_obj
                    .get("requestBody")
                    .filter(|body| !body.is_null())
                    .cloned(),
                responses: op_obj
                    .get("responses")
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_default(),
            });
        }
    }

    endpoints
}

/// Find the endpoint with an exact `path` and a case-insensitively equal `method`.
pub fn find_endpoint<'e>(endpoints: &'e [Endpoint], path: &str, method: &str) -> Option<&'e Endpoint> {
    let method = method.to_uppercase();
    endpoints
        .iter()
        .find(|ep| ep.path == path && ep.method == method)
}

/// `node.content["application/json"].schema`, treating empty/null schemas as absent.
fn json_content_schema(node: &Value) -> Option<&Value> {
    let schema = node
        .get("content")?
        .get("application/json")?
        .get("schema")?;

    (!is_absent(schema)).then_some(schema)
}

fn is_absent(schema: &Value) -> bool {
    match schema {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

impl SchemaResolver<'_> {
    /// The normalized JSON schema of `responses[status_code]`, if declared.
    ///
    /// A schema whose `$ref` lands on an empty object counts as undeclared.
    pub fn response_schema(&self, endpoint: &Endpoint, status_code: &str) -> Result<Option<Value>> {
        self.normalize_declared(endpoint.responses.get(status_code))
    }

    /// The normalized JSON schema of the request body, if declared.
    pub fn request_schema(&self, endpoint: &Endpoint) -> Result<Option<Value>> {
        self.normalize_declared(endpoint.request_body.as_ref())
    }

    fn normalize_declared(&self, node: Option<&Value>) -> Result<Option<Value>> {
        let schema = match node.and_then(json_content_schema) {
            Some(schema) => self.normalize(schema)?,
            None => return Ok(None),
        };

        Ok((!is_absent(&schema)).then_some(schema))
    }

    /// Same lookup as [`Self::response_schema`], used for 4xx/5xx codes.
    pub fn error_schema(&self, endpoint: &Endpoint, status_code: &str) -> Result<Option<Value>> {
        self.response_schema(endpoint, status_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> OpenApiDocument {
        OpenApiDocument::new(json!({
            "paths": {
                "/items": {
                    "parameters": [{"name": "shared", "in": "query"}],
                    "get": {
                        "summary": "List items",
                        "operationId": "listItems",
                        "parameters": [
                            {"name": "limit", "in": "query", "schema": {"type": "integer"}},
                            {"name": "X-Trace", "in": "header", "required": true}
                        ],
                        "responses": {
                            "200": {
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": {"$ref": "#/components/schemas/Item"}
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "POST": {
                        "requestBody": {
                            "content": {
                                "application/json": {"schema": {"$ref": "#/components/schemas/Item"}}
                            }
                        },
                        "responses": {"201": {"description": "created"}}
                    },
                    "options": {"responses": {}},
                    "x-internal": true
                },
                "/items/{id}": {
                    "delete": {
                        "parameters": [{"name": "id", "in": "path", "required": true}],
                        "responses": {
                            "404": {
                                "content": {"application/json": {"schema": {}}}
                            },
                            "500": {
                                "content": {"text/plain": {"schema": {"type": "string"}}}
                            }
                        }
                    },
                    "get": {},
                    "GET": {}
                }
            },
            "components": {
                "schemas": {
                    "Item": {"type": "object", "properties": {"id": {"type": "string"}}}
                }
            }
        }))
    }

    #[test]
    fn test_list_endpoints_filters_verbs() {
        let endpoints = list_endpoints(&document());
        let pairs: Vec<(&str, &str)> = endpoints
            .iter()
            .map(|ep| (ep.path.as_str(), ep.method.as_str()))
            .collect();

        assert_eq!(
            pairs,
            [
                ("/items", "GET"),
                ("/items", "POST"),
                ("/items/{id}", "DELETE"),
                ("/items/{id}", "GET"),
            ]
        );
    }

    #[test]
    fn test_list_endpoints_defaults() {
        let endpoints = list_endpoints(&document());
        let get_one = find_endpoint(&endpoints, "/items/{id}", "get").unwrap();

        assert_eq!(get_one.summary, None);
        assert_eq!(get_one.operation_id, None);
        assert!(get_one.parameters.is_empty());
        assert!(get_one.request_body.is_none());
        assert!(get_one.responses.is_empty());

        let list = find_endpoint(&endpoints, "/items", "GET").unwrap();
        assert_eq!(list.summary.as_deref(), Some("List items"));
        assert_eq!(list.operation_id.as_deref(), Some("listItems"));
    }

    #[test]
    fn test_list_endpoints_empty_document() {
        assert!(list_endpoints(&OpenApiDocument::new(json!({}))).is_empty());
    }

    #[test]
    fn test_find_endpoint_misses() {
        let endpoints = list_endpoints(&document());
        assert!(find_endpoint(&endpoints, "/items", "PUT").is_none());
        assert!(find_endpoint(&endpoints, "/items/", "GET").is_none());
    }

    #[test]
    fn test_parameter_helpers() {
        let endpoints = list_endpoints(&document());
        let list = find_endpoint(&endpoints, "/items", "GET").unwrap();

        let query: Vec<&str> = list
            .query_parameters()
            .iter()
            .filter_map(|p| p["name"].as_str())
            .collect();
        assert_eq!(query, ["limit"]);
        assert!(list.path_parameters().is_empty());
        assert_eq!(list.required_parameter_names(), ["X-Trace"]);

        let delete = find_endpoint(&endpoints, "/items/{id}", "DELETE").unwrap();
        assert_eq!(delete.path_parameters().len(), 1);
        assert!(delete.declares_status("404"));
    }

    #[test]
    fn test_response_and_request_schemas() {
        let doc = document();
        let endpoints = list_endpoints(&doc);
        let resolver = SchemaResolver::new(&doc);

        let list = find_endpoint(&endpoints, "/items", "GET").unwrap();
        let schema = resolver.response_schema(list, "200").unwrap().unwrap();
        assert_eq!(schema["items"]["type"], "object");
        assert!(resolver.request_schema(list).unwrap().is_none());

        let create = find_endpoint(&endpoints, "/items", "POST").unwrap();
        let body = resolver.request_schema(create).unwrap().unwrap();
        assert_eq!(body["properties"]["id"]["type"], "string");
        assert!(resolver.response_schema(create, "200").unwrap().is_none());
        assert!(resolver.response_schema(create, "201").unwrap().is_none());
    }

    #[test]
    fn test_ref_to_empty_schema_is_absent() {
        let doc = OpenApiDocument::new(json!({
            "paths": {
                "/things": {
                    "post": {
                        "requestBody": {
                            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Empty"}}}
                        },
                        "responses": {
                            "200": {"content": {"application/json": {"schema": {"$ref": "#/components/schemas/Alias"}}}},
                            "404": {"content": {"application/json": {"schema": {"$ref": "#/components/schemas/Nil"}}}}
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Empty": {},
                    "Alias": {"$ref": "#/components/schemas/Empty"},
                    "Nil": null
                }
            }
        }));
        let endpoints = list_endpoints(&doc);
        let resolver = SchemaResolver::new(&doc);
        let post = find_endpoint(&endpoints, "/things", "POST").unwrap();

        assert!(resolver.request_schema(post).unwrap().is_none());
        assert!(resolver.response_schema(post, "200").unwrap().is_none());
        assert!(matches!(
            resolver.error_schema(post, "404"),
            Err(crate::parser::ParserError::Reference { .. })
        ));
    }

    #[test]
    fn test_error_schema_requires_json_content() {
        let doc = document();
        let endpoints = list_endpoints(&doc);
        let resolver = SchemaResolver::new(&doc);

        let delete = find_endpoint(&endpoints, "/items/{id}", "DELETE").unwrap();
        assert!(resolver.error_schema(delete, "404").unwrap().is_none());
        assert!(resolver.error_schema(delete, "500").unwrap().is_none());
        assert!(resolver.error_schema(delete, "400").unwrap().is_none());
    }
}
