// Reading OpenAPI documents: loading, `$ref` resolution, schema normalization
// and endpoint extraction.

pub mod document;
pub mod endpoint;
pub mod schema;

pub use document::{OpenApiDocument, ParserError, Result};
pub use endpoint::{find_endpoint, list_endpoints, Endpoint, SUPPORTED_METHODS};
pub use schema::{extract_fields, FieldsMeta, SchemaResolver};
