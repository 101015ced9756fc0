use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::parser::{extract_fields, Endpoint, FieldsMeta, OpenApiDocument, Result, SchemaResolver};

/// Status codes whose response schemas are forwarded to the model as
/// exception cases.
pub const ERROR_STATUS_CODES: [&str; 5] = ["400", "401", "403", "404", "500"];

/// Whether the payload feeds an automated or a manual test prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadMode {
    #[default]
    Auto,
    Manual,
}

/// Hints about failure scenarios a generated test should cover.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NegativeCases {
    pub invalid_uuid: bool,
    pub missing_required_parameters: Vec<String>,
    pub supports_404: bool,
}

/// Everything the API test prompts need to know about one endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmPayload {
    pub mode: PayloadMode,
    pub path: String,
    pub method: String,
    pub summary: String,
    pub operation_id: String,
    pub parameters: Vec<Value>,
    pub request_schema: Option<Value>,
    pub response_schema: Option<Value>,
    pub fields_meta: FieldsMeta,
    pub uuid_path_params: Vec<String>,
    pub negative_cases: NegativeCases,
    pub error_schemas: Map<String, Value>,
    pub has_exceptions: bool,
}

/// Assemble the prompt payload for `endpoint`.
///
/// Fails only when one of the endpoint's schemas holds a `$ref` that cannot
/// be resolved.
pub fn build_payload(
    document: &OpenApiDocument,
    endpoint: &Endpoint,
    mode: PayloadMode,
) -> Result<LlmPayload> {
    let resolver = SchemaResolver::new(document);

    let response_schema = resolver.response_schema(endpoint, "200")?;
    let request_schema = resolver.request_schema(endpoint)?;
    let fields_meta = extract_fields(response_schema.as_ref());

    let uuid_path_params: Vec<String> = endpoint
        .path_parameters()
        .into_iter()
        .filter(|param| {
            param
                .get("schema")
                .and_then(|schema| schema.get("format"))
                .and_then(Value::as_str)
                == Some("uuid")
        })
        .filter_map(|param| param.get("name").and_then(Value::as_str))
        .map(String::from)
        .collect();

    let negative_cases = NegativeCases {
        invalid_uuid: !uuid_path_params.is_empty(),
        missing_required_parameters: endpoint.required_parameter_names(),
        supports_404: endpoint.declares_status("404"),
    };

    let mut error_schemas = Map::new();
    for code in ERROR_STATUS_CODES {
        if let Some(schema) = resolver.error_schema(endpoint, code)? {
            error_schemas.insert(code.to_string(), schema);
        }
    }

    Ok(LlmPayload {
        mode,
        path: endpoint.path.clone(),
        method: endpoint.method.clone(),
        summary: endpoint.summary.clone().unwrap_or_default(),
        operation_id: endpoint.operation_id.clone().unwrap_or_default(),
        parameters: endpoint.parameters.clone(),
        request_schema,
        response_schema,
        fields_meta,
        uuid_path_params,
        negative_cases,
        has_exceptions: !error_schemas.is_empty(),
        error_schemas,
    })
}
