//! Request body model.
//!
//! The external serialization layer decodes request documents into a
//! [`RequestBody`]. Resource endpoints carry full [`DataBody`] values; relationship
//! endpoints carry identifiers only (a `DataBody` with type and id, or `null`).

use crate::{HeronError, ResourceIdentifier};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Relationship linkage inside a resource body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Linkage {
    /// A to-many linkage (possibly empty).
    ToMany(Vec<ResourceIdentifier>),
    /// A to-one linkage; `None` clears the relation.
    ToOne(Option<ResourceIdentifier>),
}

/// A resource object in a request document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataBody {
    /// The declared resource type.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// The id, if the client supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Attribute values.
    #[serde(default)]
    pub attributes: Map<String, Value>,
    /// Relationship linkage keyed by relationship name.
    #[serde(default)]
    pub relationships: BTreeMap<String, Linkage>,
}

impl DataBody {
    /// Creates a body of the given type with no id.
    #[must_use]
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            ..Self::default()
        }
    }

    /// Creates an identifier-only body.
    #[must_use]
    pub fn identifier(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::new(resource_type).with_id(id)
    }

    /// Sets the id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Sets a relationship linkage.
    #[must_use]
    pub fn with_relationship(mut self, name: impl Into<String>, linkage: Linkage) -> Self {
        self.relationships.insert(name.into(), linkage);
        self
    }

    /// Converts an identifier-only body into a [`ResourceIdentifier`].
    pub fn to_identifier(&self) -> Result<ResourceIdentifier, HeronError> {
        let id = self.id.as_ref().ok_or_else(|| {
            HeronError::bad_request(format!(
                "linkage of type {} is missing an id",
                self.resource_type
            ))
        })?;
        Ok(ResourceIdentifier::new(self.resource_type.clone(), id.clone()))
    }
}

/// The primary data of a request document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryBody {
    /// An array of resource objects.
    Many(Vec<DataBody>),
    /// A single resource object.
    One(DataBody),
}

/// A decoded request document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// The primary data; `None` for a `null` or missing `data` member.
    #[serde(default)]
    pub data: Option<PrimaryBody>,
}

impl RequestBody {
    /// Creates a document with a single resource object.
    #[must_use]
    pub fn one(data: DataBody) -> Self {
        Self {
            data: Some(PrimaryBody::One(data)),
        }
    }

    /// Creates a document with an array of resource objects.
    #[must_use]
    pub fn many(data: Vec<DataBody>) -> Self {
        Self {
            data: Some(PrimaryBody::Many(data)),
        }
    }

    /// Creates a document with `null` primary data.
    #[must_use]
    pub fn null() -> Self {
        Self { data: None }
    }

    /// Returns the single resource object, or a bad request error.
    pub fn single(&self) -> Result<&DataBody, HeronError> {
        match &self.data {
            Some(PrimaryBody::One(data)) => Ok(data),
            Some(PrimaryBody::Many(_)) => Err(HeronError::bad_request(
                "expected a single resource object, got an array",
            )),
            None => Err(HeronError::bad_request("request document has no data")),
        }
    }

    /// Interprets the primary data as to-one linkage.
    pub fn to_one_linkage(&self) -> Result<Option<ResourceIdentifier>, HeronError> {
        match &self.data {
            None => Ok(None),
            Some(PrimaryBody::One(data)) => data.to_identifier().map(Some),
            Some(PrimaryBody::Many(_)) => Err(HeronError::bad_request(
                "to-one relationship expects a single identifier or null",
            )),
        }
    }

    /// Interprets the primary data as to-many linkage.
    pub fn to_many_linkage(&self) -> Result<Vec<ResourceIdentifier>, HeronError> {
        match &self.data {
            Some(PrimaryBody::Many(data)) => data.iter().map(DataBody::to_identifier).collect(),
            _ => Err(HeronError::bad_request(
                "to-many relationship expects an array of identifiers",
            )),
        }
    }
}
