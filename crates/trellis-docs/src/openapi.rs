//! OpenAPI 3.0 document types and generation.
//!
//! [`OpenApiGenerator`] turns the server's endpoint descriptors into an
//! OpenAPI document: path patterns are rewritten from `:param` to
//! `{param}` form, path parameters become required string parameters,
//! query parameters are lifted from the declared query schema's
//! properties, request bodies and per-status responses carry their
//! schema documents verbatim, and declared security schemes become
//! `http` basic/bearer entries under `components.securitySchemes`.
//!
//! Schema documents stay raw [`serde_json::Value`]s throughout; the
//! generator never rewrites what an endpoint declared.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use http::StatusCode;
use trellis_core::{EndpointDescriptor, ResponseKind, SchemeKind};

use crate::error::{DocsError, DocsResult};

/// OpenAPI document root object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenApi {
    /// OpenAPI version.
    pub openapi: String,
    /// API metadata.
    pub info: Info,
    /// Available servers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<ServerEntry>,
    /// API paths and operations, in registration order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub paths: IndexMap<String, PathItem>,
    /// Reusable components.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
}

/// API metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    /// API title.
    pub title: String,
    /// API version.
    pub version: String,
    /// API description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Server information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerEntry {
    /// Server URL.
    pub url: String,
    /// Server description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Operations available on a single path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    /// GET operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// PUT operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// POST operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// DELETE operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// OPTIONS operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    /// HEAD operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    /// PATCH operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
}

/// A single API operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    /// Unique operation identifier.
    #[serde(rename = "operationId")]
    pub operation_id: String,
    /// Short summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Tags for grouping.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Path and query parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "requestBody")]
    pub request_body: Option<RequestBody>,
    /// Responses by status code.
    pub responses: IndexMap<String, ResponseObject>,
    /// Security requirements; each entry is one accepted alternative.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterIn {
    /// Query string parameter.
    Query,
    /// URL path parameter.
    Path,
}

/// An operation parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Parameter location.
    #[serde(rename = "in")]
    pub location: ParameterIn,
    /// Whether the parameter is required.
    #[serde(default)]
    pub required: bool,
    /// Parameter schema document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
}

/// Request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestBody {
    /// Whether a body must be sent.
    #[serde(default)]
    pub required: bool,
    /// Content by media type.
    pub content: IndexMap<String, MediaType>,
}

/// Media type content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaType {
    /// Schema document for this media type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
}

/// A declared response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseObject {
    /// Response description (required by OpenAPI).
    pub description: String,
    /// Response content by media type.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
}

/// Reusable components.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Components {
    /// Security schemes referenced by operations.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    #[serde(rename = "securitySchemes")]
    pub security_schemes: IndexMap<String, SecuritySchemeObject>,
}

/// A `components.securitySchemes` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecuritySchemeObject {
    /// Security scheme type; always `http` for basic/bearer.
    #[serde(rename = "type")]
    pub scheme_type: String,
    /// HTTP auth scheme name (`basic` or `bearer`).
    pub scheme: String,
}

/// One accepted security alternative: scheme name to scopes.
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

/// Generator that converts endpoint descriptors into an OpenAPI document.
///
/// # Example
///
/// ```rust
/// use trellis_docs::OpenApiGenerator;
///
/// let generator = OpenApiGenerator::new()
///     .title("Mock API")
///     .version("1.0.0");
///
/// let doc = generator.generate(&[]).unwrap();
/// assert_eq!(doc.openapi, "3.0.3");
/// assert_eq!(doc.info.title, "Mock API");
/// ```
#[derive(Debug, Clone, Default)]
pub struct OpenApiGenerator {
    title: Option<String>,
    version: Option<String>,
    description: Option<String>,
    servers: Vec<ServerEntry>,
}

impl OpenApiGenerator {
    /// Creates a generator with no metadata set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the API version.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the API description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a server entry.
    #[must_use]
    pub fn server(mut self, url: impl Into<String>, description: Option<String>) -> Self {
        self.servers.push(ServerEntry {
            url: url.into(),
            description,
        });
        self
    }

    /// Generates an OpenAPI document from the given descriptors.
    ///
    /// Descriptors are processed in order, so path and operation order in
    /// the document mirrors registration order.
    ///
    /// # Errors
    ///
    /// Returns [`DocsError::UnsupportedMethod`] if a descriptor's method
    /// has no OpenAPI operation slot.
    pub fn generate(&self, descriptors: &[EndpointDescriptor]) -> DocsResult<OpenApi> {
        let mut paths: IndexMap<String, PathItem> = IndexMap::new();
        let mut security_schemes: IndexMap<String, SecuritySchemeObject> = IndexMap::new();

        for descriptor in descriptors {
            for scheme in &descriptor.security {
                security_schemes
                    .entry(scheme.name.clone())
                    .or_insert_with(|| scheme_object(scheme.kind));
            }

            let operation = convert_operation(descriptor);
            let path_item = paths.entry(template_path(&descriptor.path)).or_default();

            match descriptor.method.as_str() {
                "get" => path_item.get = Some(operation),
                "put" => path_item.put = Some(operation),
                "post" => path_item.post = Some(operation),
                "delete" => path_item.delete = Some(operation),
                "options" => path_item.options = Some(operation),
                "head" => path_item.head = Some(operation),
                "patch" => path_item.patch = Some(operation),
                other => {
                    return Err(DocsError::UnsupportedMethod {
                        operation_id: operation.operation_id,
                        method: other.to_string(),
                    });
                }
            }
        }

        let components = if security_schemes.is_empty() {
            None
        } else {
            Some(Components { security_schemes })
        };

        Ok(OpenApi {
            openapi: "3.0.3".to_string(),
            info: Info {
                title: self.title.clone().unwrap_or_else(|| "API".to_string()),
                version: self.version.clone().unwrap_or_else(|| "0.0.0".to_string()),
                description: self.description.clone(),
            },
            servers: self.servers.clone(),
            paths,
            components,
        })
    }

    /// Generates the document as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DocsError`] if generation or serialization fails.
    pub fn generate_json(&self, descriptors: &[EndpointDescriptor]) -> DocsResult<String> {
        let doc = self.generate(descriptors)?;
        serde_json::to_string_pretty(&doc).map_err(DocsError::from)
    }
}

/// Rewrites a `:param` path pattern into `{param}` template form.
fn template_path(path: &str) -> String {
    path.split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => format!("{{{name}}}"),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn convert_operation(descriptor: &EndpointDescriptor) -> Operation {
    let mut parameters: Vec<Parameter> = descriptor
        .param_names
        .iter()
        .map(|name| Parameter {
            name: name.clone(),
            location: ParameterIn::Path,
            required: true,
            schema: Some(serde_json::json!({ "type": "string" })),
        })
        .collect();
    parameters.extend(query_parameters(descriptor.query_schema.as_ref()));

    let request_body = descriptor.body_schema.as_ref().map(|schema| {
        let mut content = IndexMap::new();
        content.insert(
            "application/json".to_string(),
            MediaType {
                schema: Some(schema.clone()),
            },
        );
        RequestBody {
            required: true,
            content,
        }
    });

    let mut responses: IndexMap<String, ResponseObject> = IndexMap::new();
    for (status, model) in &descriptor.responses {
        let ResponseKind::Json { schema } = model.kind();
        let mut content = IndexMap::new();
        content.insert(
            model.kind().content_type().to_string(),
            MediaType {
                schema: schema.clone(),
            },
        );
        responses.insert(
            status.to_string(),
            ResponseObject {
                description: status_description(*status),
                content,
            },
        );
    }
    if responses.is_empty() {
        responses.insert(
            "200".to_string(),
            ResponseObject {
                description: "Successful response".to_string(),
                content: IndexMap::new(),
            },
        );
    }

    // Each declared scheme is an independent alternative, in evaluation
    // order, matching the first-match dispatch semantics.
    let security = descriptor
        .security
        .iter()
        .map(|scheme| {
            let mut requirement = SecurityRequirement::new();
            requirement.insert(scheme.name.clone(), Vec::new());
            requirement
        })
        .collect();

    Operation {
        operation_id: operation_id(descriptor),
        summary: match descriptor.meta.description() {
            "" => None,
            description => Some(description.to_string()),
        },
        tags: descriptor
            .meta
            .group_name()
            .map(|group| vec![group.to_string()])
            .unwrap_or_default(),
        parameters,
        request_body,
        responses,
        security,
    }
}

fn operation_id(descriptor: &EndpointDescriptor) -> String {
    if !descriptor.meta.name().is_empty() {
        return descriptor.meta.name().to_string();
    }
    // Unnamed endpoints get a stable identifier from method and path.
    let slug: String = descriptor
        .path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| format!("_{}", segment.trim_start_matches(':')))
        .collect();
    format!("{}{slug}", descriptor.method)
}

/// Lifts query parameters out of the declared query schema's properties.
fn query_parameters(schema: Option<&Value>) -> Vec<Parameter> {
    let Some(schema) = schema else {
        return Vec::new();
    };
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    schema
        .get("properties")
        .and_then(Value::as_object)
        .map(|properties| {
            properties
                .iter()
                .map(|(name, property)| Parameter {
                    name: name.clone(),
                    location: ParameterIn::Query,
                    required: required.contains(&name.as_str()),
                    schema: Some(property.clone()),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn scheme_object(kind: SchemeKind) -> SecuritySchemeObject {
    SecuritySchemeObject {
        scheme_type: "http".to_string(),
        scheme: kind.as_str().to_string(),
    }
}

fn status_description(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("Response")
        .to_string()
}
