//! Response model.
//!
//! Controllers return a [`Response`]: a status plus a [`Document`]. The
//! document derives `Serialize` so the embedding transport can encode it;
//! the engine itself never produces bytes.

use heron_core::{ErrorData, ErrorResponse, Resource, ResourceIdentifier, StatusCode};
use serde::Serialize;

/// The primary data of a response document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PrimaryData {
    /// An absent to-one target, encoded as `null`.
    Null,
    /// A single resource.
    Resource(Resource),
    /// A resource collection.
    Resources(Vec<Resource>),
    /// A single linkage.
    Identifier(ResourceIdentifier),
    /// A linkage list.
    Identifiers(Vec<ResourceIdentifier>),
}

impl PrimaryData {
    /// Wraps an optional to-one target.
    #[must_use]
    pub fn optional(resource: Option<Resource>) -> Self {
        resource.map_or(Self::Null, Self::Resource)
    }

    /// Returns the single resource, if that is what this is.
    #[must_use]
    pub fn as_resource(&self) -> Option<&Resource> {
        match self {
            Self::Resource(resource) => Some(resource),
            _ => None,
        }
    }

    /// Returns the resource collection, if that is what this is.
    #[must_use]
    pub fn as_resources(&self) -> Option<&[Resource]> {
        match self {
            Self::Resources(resources) => Some(resources),
            _ => None,
        }
    }

    /// Returns the single linkage, if that is what this is.
    #[must_use]
    pub fn as_identifier(&self) -> Option<&ResourceIdentifier> {
        match self {
            Self::Identifier(identifier) => Some(identifier),
            _ => None,
        }
    }

    /// Returns the linkage list, if that is what this is.
    #[must_use]
    pub fn as_identifiers(&self) -> Option<&[ResourceIdentifier]> {
        match self {
            Self::Identifiers(identifiers) => Some(identifiers),
            _ => None,
        }
    }

    /// Returns `true` for `null` data.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// A response document: primary data or errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    /// Primary data; absent for empty (204) responses and error documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PrimaryData>,
    /// Error objects.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorData>,
}

/// A controller result.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// The response status.
    pub status: StatusCode,
    /// The response document.
    pub document: Document,
}

impl Response {
    /// 200 OK with data.
    #[must_use]
    pub fn ok(data: PrimaryData) -> Self {
        Self::with_data(StatusCode::OK, data)
    }

    /// 201 Created with the created resource.
    #[must_use]
    pub fn created(resource: Resource) -> Self {
        Self::with_data(StatusCode::CREATED, PrimaryData::Resource(resource))
    }

    /// 204 No Content.
    #[must_use]
    pub fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            document: Document::default(),
        }
    }

    fn with_data(status: StatusCode, data: PrimaryData) -> Self {
        Self {
            status,
            document: Document {
                data: Some(data),
                errors: Vec::new(),
            },
        }
    }

    /// Returns the primary data.
    #[must_use]
    pub fn data(&self) -> Option<&PrimaryData> {
        self.document.data.as_ref()
    }

    /// Returns the error objects.
    #[must_use]
    pub fn errors(&self) -> &[ErrorData] {
        &self.document.errors
    }

    /// Returns `true` for 2xx responses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

impl From<ErrorResponse> for Response {
    fn from(error: ErrorResponse) -> Self {
        Self {
            status: error.status,
            document: Document {
                data: None,
                errors: error.errors,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heron_core::ResourceId;
    use serde_json::json;

    #[test]
    fn test_null_data_serializes_as_null() {
        let response = Response::ok(PrimaryData::optional(None));
        assert_eq!(
            serde_json::to_value(&response.document).unwrap(),
            json!({ "data": null })
        );
    }

    #[test]
    fn test_no_content_has_empty_document() {
        let response = Response::no_content();
        assert_eq!(response.status, StatusCode::NO_CONTENT);
        assert_eq!(serde_json::to_value(&response.document).unwrap(), json!({}));
    }

    #[test]
    fn test_linkage_document() {
        let response = Response::ok(PrimaryData::Identifiers(vec![ResourceIdentifier::new(
            "users", "u1",
        )]));
        assert_eq!(
            serde_json::to_value(&response.document).unwrap(),
            json!({ "data": [{ "type": "users", "id": "u1" }] })
        );
    }

    #[test]
    fn test_created_resource() {
        let task = Resource::new("tasks")
            .with_id(ResourceId::Integer(1))
            .with_attribute("name", "x");
        let response = Response::created(task.clone());

        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.data().and_then(PrimaryData::as_resource), Some(&task));
        assert_eq!(
            serde_json::to_value(&response.document).unwrap(),
            json!({ "data": { "type": "tasks", "id": "1", "attributes": { "name": "x" } } })
        );
    }

    #[test]
    fn test_from_error_response() {
        let error = ErrorResponse::single(
            StatusCode::NOT_FOUND,
            ErrorData::builder().status("404").build(),
        );
        let response = Response::from(error);
        assert!(!response.is_success());
        assert_eq!(response.errors().len(), 1);
        assert!(response.data().is_none());
    }
}
