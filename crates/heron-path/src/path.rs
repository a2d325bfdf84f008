//! Parsed request paths.

use smallvec::SmallVec;
use std::fmt;

/// Id list of a resource path. Most paths carry zero or one id.
pub type PathIds = SmallVec<[String; 2]>;

/// The discriminant of a [`JsonPath`], handy for logging and controller tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    /// `/{type}` or `/{type}/{ids}`
    Resource,
    /// `/{type}/{id}/{field}`
    Field,
    /// `/{type}/{id}/relationships/{name}`
    Relationships,
    /// `/{type}/{id}/links/{name}`
    Links,
}

impl PathKind {
    /// Returns a short label for logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Resource => "resource",
            Self::Field => "field",
            Self::Relationships => "relationships",
            Self::Links => "links",
        }
    }
}

/// A validated request path.
///
/// Built once per request by [`PathBuilder`](crate::PathBuilder) and never
/// modified. Ids are kept as strings; coercion to the resource's id type
/// happens in the repository adapters.
///
/// # Example
///
/// ```rust
/// use heron_path::JsonPath;
///
/// let path = JsonPath::relationships("tasks", "1", "project");
/// assert_eq!(path.resource_type(), "tasks");
/// assert_eq!(path.single_id(), Some("1"));
/// assert_eq!(path.element_name(), Some("project"));
/// assert_eq!(path.to_string(), "/tasks/1/relationships/project");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JsonPath {
    /// A resource collection, a single resource or a set of resources.
    ResourcePath {
        /// The resource type.
        resource_type: String,
        /// The addressed ids, empty for the whole collection.
        ids: PathIds,
    },
    /// The resource(s) a relationship field points to.
    FieldPath {
        /// The source resource type.
        resource_type: String,
        /// The source id.
        id: String,
        /// The relationship field name.
        field: String,
    },
    /// The linkage of a relationship.
    RelationshipsPath {
        /// The source resource type.
        resource_type: String,
        /// The source id.
        id: String,
        /// The relationship name.
        relationship: String,
    },
    /// The links of a relationship.
    LinksPath {
        /// The source resource type.
        resource_type: String,
        /// The source id.
        id: String,
        /// The relationship name.
        relationship: String,
    },
}

impl JsonPath {
    /// Creates a resource path with the given ids.
    #[must_use]
    pub fn resource<I, S>(resource_type: impl Into<String>, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ResourcePath {
            resource_type: resource_type.into(),
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a collection path.
    #[must_use]
    pub fn collection(resource_type: impl Into<String>) -> Self {
        Self::ResourcePath {
            resource_type: resource_type.into(),
            ids: PathIds::new(),
        }
    }

    /// Creates a field path.
    #[must_use]
    pub fn field(
        resource_type: impl Into<String>,
        id: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self::FieldPath {
            resource_type: resource_type.into(),
            id: id.into(),
            field: field.into(),
        }
    }

    /// Creates a relationships path.
    #[must_use]
    pub fn relationships(
        resource_type: impl Into<String>,
        id: impl Into<String>,
        relationship: impl Into<String>,
    ) -> Self {
        Self::RelationshipsPath {
            resource_type: resource_type.into(),
            id: id.into(),
            relationship: relationship.into(),
        }
    }

    /// Creates a links path.
    #[must_use]
    pub fn links(
        resource_type: impl Into<String>,
        id: impl Into<String>,
        relationship: impl Into<String>,
    ) -> Self {
        Self::LinksPath {
            resource_type: resource_type.into(),
            id: id.into(),
            relationship: relationship.into(),
        }
    }

    /// Returns the path kind.
    #[must_use]
    pub const fn kind(&self) -> PathKind {
        match self {
            Self::ResourcePath { .. } => PathKind::Resource,
            Self::FieldPath { .. } => PathKind::Field,
            Self::RelationshipsPath { .. } => PathKind::Relationships,
            Self::LinksPath { .. } => PathKind::Links,
        }
    }

    /// Returns the (source) resource type.
    #[must_use]
    pub fn resource_type(&self) -> &str {
        match self {
            Self::ResourcePath { resource_type, .. }
            | Self::FieldPath { resource_type, .. }
            | Self::RelationshipsPath { resource_type, .. }
            | Self::LinksPath { resource_type, .. } => resource_type,
        }
    }

    /// Returns every id in the path.
    #[must_use]
    pub fn ids(&self) -> &[String] {
        match self {
            Self::ResourcePath { ids, .. } => ids,
            Self::FieldPath { id, .. }
            | Self::RelationshipsPath { id, .. }
            | Self::LinksPath { id, .. } => std::slice::from_ref(id),
        }
    }

    /// Returns the id when the path addresses exactly one resource.
    #[must_use]
    pub fn single_id(&self) -> Option<&str> {
        match self.ids() {
            [id] => Some(id),
            _ => None,
        }
    }

    /// Returns the field or relationship name, if any.
    #[must_use]
    pub fn element_name(&self) -> Option<&str> {
        match self {
            Self::ResourcePath { .. } => None,
            Self::FieldPath { field, .. } => Some(field),
            Self::RelationshipsPath { relationship, .. } | Self::LinksPath { relationship, .. } => {
                Some(relationship)
            }
        }
    }

    /// Returns `true` for resource paths that address zero or several ids.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        matches!(self, Self::ResourcePath { ids, .. } if ids.len() != 1)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResourcePath { resource_type, ids } if ids.is_empty() => {
                write!(f, "/{resource_type}")
            }
            Self::ResourcePath { resource_type, ids } => {
                write!(f, "/{resource_type}/{}", ids.join(","))
            }
            Self::FieldPath {
                resource_type,
                id,
                field,
            } => write!(f, "/{resource_type}/{id}/{field}"),
            Self::RelationshipsPath {
                resource_type,
                id,
                relationship,
            } => write!(f, "/{resource_type}/{id}/relationships/{relationship}"),
            Self::LinksPath {
                resource_type,
                id,
                relationship,
            } => write!(f, "/{resource_type}/{id}/links/{relationship}"),
        }
    }
}
