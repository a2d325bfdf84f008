//! Path parser.
//!
//! [`PathBuilder`] turns a slash-delimited path into a [`JsonPath`], checking
//! resource types and relationship names against a [`PathSchema`]:
//!
//! ```text
//! /{type}                               ResourcePath (collection)
//! /{type}/{id}[,{id}...]                ResourcePath
//! /{type}/{id}/{field}                  FieldPath
//! /{type}/{id}/relationships/{name}     RelationshipsPath
//! /{type}/{id}/links/{name}             LinksPath
//! ```

use crate::path::{JsonPath, PathIds};
use heron_core::{HeronError, HeronResult};
use tracing::trace;

const RELATIONSHIPS_SEGMENT: &str = "relationships";
const LINKS_SEGMENT: &str = "links";
const ID_SEPARATOR: char = ',';

/// The registry view the parser validates against.
pub trait PathSchema {
    /// Fails with [`HeronError::UnknownResourceType`] if the type is not registered.
    fn check_type(&self, resource_type: &str) -> HeronResult<()>;

    /// Fails with [`HeronError::UnknownRelationship`] if the type does not
    /// declare the relationship, or [`HeronError::UnknownResourceType`] if its
    /// target type is not registered.
    fn check_relationship(&self, resource_type: &str, relationship: &str) -> HeronResult<()>;
}

impl<T: PathSchema + ?Sized> PathSchema for &T {
    fn check_type(&self, resource_type: &str) -> HeronResult<()> {
        (**self).check_type(resource_type)
    }

    fn check_relationship(&self, resource_type: &str, relationship: &str) -> HeronResult<()> {
        (**self).check_relationship(resource_type, relationship)
    }
}

/// Stateless path parser bound to a schema.
///
/// # Example
///
/// ```rust
/// use heron_core::{HeronError, HeronResult};
/// use heron_path::{JsonPath, PathBuilder, PathSchema};
///
/// struct OnlyTasks;
///
/// impl PathSchema for OnlyTasks {
///     fn check_type(&self, resource_type: &str) -> HeronResult<()> {
///         if resource_type == "tasks" {
///             Ok(())
///         } else {
///             Err(HeronError::unknown_resource_type(resource_type))
///         }
///     }
///
///     fn check_relationship(&self, resource_type: &str, name: &str) -> HeronResult<()> {
///         Err(HeronError::unknown_relationship(resource_type, name))
///     }
/// }
///
/// let builder = PathBuilder::new(&OnlyTasks);
/// assert_eq!(
///     builder.build("/tasks/1/").unwrap(),
///     JsonPath::resource("tasks", ["1"])
/// );
/// assert!(builder.build("/projects").is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PathBuilder<S> {
    schema: S,
}

impl<S: PathSchema> PathBuilder<S> {
    /// Creates a parser over the given schema.
    pub const fn new(schema: S) -> Self {
        Self { schema }
    }

    /// Parses a path. The base prefix must already be stripped.
    pub fn build(&self, path: &str) -> HeronResult<JsonPath> {
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return Err(HeronError::malformed_path(path, "path has no resource type"));
        }

        let segments: Vec<&str> = trimmed.split('/').collect();

        // The type is checked before anything else so an unknown type always wins.
        let resource_type = segments[0];
        self.schema.check_type(resource_type)?;

        if segments.iter().any(|s| s.is_empty()) {
            return Err(HeronError::malformed_path(path, "empty path segment"));
        }

        let parsed = match segments.as_slice() {
            [_] => JsonPath::collection(resource_type),
            [_, ids] => JsonPath::ResourcePath {
                resource_type: resource_type.to_string(),
                ids: parse_ids(path, ids)?,
            },
            [_, ids, rest @ ..] => {
                let id = single_id(path, ids)?;
                self.build_nested(path, resource_type, id, rest)?
            }
            [] => return Err(HeronError::malformed_path(path, "path has no resource type")),
        };

        trace!(path = %path, kind = parsed.kind().as_str(), "parsed path");
        Ok(parsed)
    }

    fn build_nested(
        &self,
        path: &str,
        resource_type: &str,
        id: String,
        rest: &[&str],
    ) -> HeronResult<JsonPath> {
        match rest {
            [RELATIONSHIPS_SEGMENT, name] => {
                self.schema.check_relationship(resource_type, name)?;
                Ok(JsonPath::relationships(resource_type, id, *name))
            }
            [LINKS_SEGMENT, name] => {
                self.schema.check_relationship(resource_type, name)?;
                Ok(JsonPath::links(resource_type, id, *name))
            }
            [RELATIONSHIPS_SEGMENT] | [LINKS_SEGMENT] => Err(HeronError::malformed_path(
                path,
                "missing relationship name",
            )),
            [field] => {
                self.schema.check_relationship(resource_type, field)?;
                Ok(JsonPath::field(resource_type, id, *field))
            }
            _ => Err(HeronError::malformed_path(path, "too many path segments")),
        }
    }
}

fn parse_ids(path: &str, segment: &str) -> HeronResult<PathIds> {
    segment
        .split(ID_SEPARATOR)
        .map(|token| {
            if is_identifier(token) {
                Ok(token.to_string())
            } else {
                Err(HeronError::malformed_path(
                    path,
                    format!("'{token}' is not a valid identifier"),
                ))
            }
        })
        .collect()
}

fn single_id(path: &str, segment: &str) -> HeronResult<String> {
    let mut ids = parse_ids(path, segment)?;
    if ids.len() != 1 {
        return Err(HeronError::malformed_path(
            path,
            "relationship and field paths address exactly one id",
        ));
    }
    Ok(ids.remove(0))
}

fn is_identifier(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~' | ':'))
}
