//! OpenAPI document model and the default [`DocumentConverter`].
//!
//! The converter only produces enough of OpenAPI 3.0 for ApiPost's importer:
//! paths, operations, tags, parameters, request body and a `200` response.
//! Schema correctness of the embedded bodies is the caller's concern.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::contract::{Api, ApiParameter, DocumentConverter};

pub const OPENAPI_VERSION: &str = "3.0.1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    pub openapi: String,
    pub info: Info,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    /// path -> lower-case method -> operation
    pub paths: BTreeMap<String, BTreeMap<String, Operation>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ApiParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<serde_json::Value>,
    pub responses: BTreeMap<String, serde_json::Value>,
}

impl OpenApiDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            openapi: OPENAPI_VERSION.to_string(),
            info: Info {
                title: title.into(),
                version: "1.0.0".to_string(),
            },
            tags: Vec::new(),
            paths: BTreeMap::new(),
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.info.title = title.into();
    }

    /// Number of operations across all paths.
    pub fn operation_count(&self) -> usize {
        self.paths.values().map(BTreeMap::len).sum()
    }
}

/// Converts APIs one-to-one into OpenAPI operations.
#[derive(Debug, Clone, Default)]
pub struct OpenApiConverter;

impl OpenApiConverter {
    pub fn new() -> Self {
        Self
    }

    fn operation(api: &Api) -> Operation {
        let request_body = api.request_body.as_ref().map(|schema| {
            json!({
                "content": { "application/json": { "schema": schema } }
            })
        });

        let ok_response = match &api.response {
            Some(schema) => json!({
                "description": "OK",
                "content": { "application/json": { "schema": schema } }
            }),
            None => json!({ "description": "OK" }),
        };

        Operation {
            summary: api.summary.clone().or_else(|| Some(api.name.clone())),
            description: api.description.clone(),
            tags: api.category.iter().cloned().collect(),
            parameters: api.parameters.clone(),
            request_body,
            responses: BTreeMap::from([("200".to_string(), ok_response)]),
        }
    }
}

impl DocumentConverter for OpenApiConverter {
    fn convert(&self, chunk: &[Api]) -> OpenApiDocument {
        let mut document = OpenApiDocument::new("");
        let mut tags = BTreeSet::new();

        for api in chunk {
            if let Some(category) = &api.category {
                tags.insert(category.clone());
            }
            let method = api.method.to_ascii_lowercase();
            let operations = document.paths.entry(api.path.clone()).or_default();
            if operations
                .insert(method.clone(), Self::operation(api))
                .is_some()
            {
                warn!(path = %api.path, method = %method, "Duplicate operation in chunk, keeping the last one");
            }
        }

        document.tags = tags.into_iter().map(|name| Tag { name }).collect();
        debug!(
            apis = chunk.len(),
            operations = document.operation_count(),
            "Converted chunk to OpenAPI document"
        );
        document
    }
}
