//! Resource values.
//!
//! Repositories exchange [`Resource`] values with the engine. A resource is a
//! type name, an optional [`ResourceId`] and a map of attributes. Identifiers
//! travel through paths and bodies as strings and are coerced with
//! [`IdType::parse`] once the owning resource type is known.

use crate::HeronError;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// The value type of a resource's identifier field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdType {
    /// Signed 64-bit integer ids.
    #[default]
    Integer,
    /// Opaque string ids.
    String,
    /// UUID ids.
    Uuid,
}

impl IdType {
    /// Coerces a raw identifier into a typed [`ResourceId`].
    ///
    /// # Example
    ///
    /// ```
    /// use heron_core::{IdType, ResourceId};
    ///
    /// assert_eq!(IdType::Integer.parse("42").unwrap(), ResourceId::Integer(42));
    /// assert!(IdType::Integer.parse("forty-two").is_err());
    /// ```
    pub fn parse(&self, raw: &str) -> Result<ResourceId, HeronError> {
        let invalid = || HeronError::InvalidId {
            value: raw.to_string(),
            expected: self.to_string(),
        };

        match self {
            Self::Integer => raw.parse().map(ResourceId::Integer).map_err(|_| invalid()),
            Self::String if raw.is_empty() => Err(invalid()),
            Self::String => Ok(ResourceId::String(raw.to_string())),
            Self::Uuid => Uuid::parse_str(raw)
                .map(ResourceId::Uuid)
                .map_err(|_| invalid()),
        }
    }

    /// Coerces every identifier in order.
    pub fn parse_all<'a>(
        &self,
        raw: impl IntoIterator<Item = &'a str>,
    ) -> Result<Vec<ResourceId>, HeronError> {
        raw.into_iter().map(|id| self.parse(id)).collect()
    }
}

impl fmt::Display for IdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Integer => "integer",
            Self::String => "string",
            Self::Uuid => "uuid",
        })
    }
}

/// A typed resource identifier.
///
/// Serializes as a string, as the protocol requires.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceId {
    /// An integer id.
    Integer(i64),
    /// A string id.
    String(String),
    /// A UUID id.
    Uuid(Uuid),
}

impl ResourceId {
    /// Returns the id type of this value.
    #[must_use]
    pub const fn id_type(&self) -> IdType {
        match self {
            Self::Integer(_) => IdType::Integer,
            Self::String(_) => IdType::String,
            Self::Uuid(_) => IdType::Uuid,
        }
    }

    /// Returns the integer value, if this is an integer id.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(value),
            Self::Uuid(value) => write!(f, "{value}"),
        }
    }
}

impl Serialize for ResourceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<i64> for ResourceId {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for ResourceId {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<Uuid> for ResourceId {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

/// A resource type and id pair, as used in relationship linkage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    /// The resource type name.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// The resource id, as a string.
    pub id: String,
}

impl ResourceIdentifier {
    /// Creates a new identifier.
    #[must_use]
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }
}

/// A domain object as seen by the engine.
///
/// # Example
///
/// ```
/// use heron_core::{Resource, ResourceId};
///
/// let task = Resource::new("tasks")
///     .with_attribute("name", "write docs")
///     .with_id(ResourceId::Integer(1));
///
/// assert_eq!(task.attribute("name").and_then(|v| v.as_str()), Some("write docs"));
/// assert_eq!(task.identifier().unwrap().id, "1");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    /// The resource type name.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// The id, absent before the resource is first saved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ResourceId>,
    /// Attribute values keyed by field name.
    pub attributes: Map<String, Value>,
}

impl Resource {
    /// Creates an unsaved resource with no attributes.
    #[must_use]
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: None,
            attributes: Map::new(),
        }
    }

    /// Sets the id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<ResourceId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Returns an attribute value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Overwrites attributes with every entry of `attributes`.
    pub fn merge_attributes(&mut self, attributes: &Map<String, Value>) {
        for (name, value) in attributes {
            self.attributes.insert(name.clone(), value.clone());
        }
    }

    /// Returns the linkage identifier, if the resource has an id.
    #[must_use]
    pub fn identifier(&self) -> Option<ResourceIdentifier> {
        self.id
            .as_ref()
            .map(|id| ResourceIdentifier::new(self.resource_type.clone(), id.to_string()))
    }
}
