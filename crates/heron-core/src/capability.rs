//! Capability tags.
//!
//! A [`Capability`] names the single operation a repository method implements.
//! Adapters look methods up by tag, so each handler declares at most one method
//! per tag.

use std::fmt;

/// The operation a repository method implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// Load a single resource by id.
    FindOne,
    /// Load a collection of resources.
    FindAll,
    /// Create or update a resource.
    Save,
    /// Delete a resource by id.
    Delete,
    /// Replace (or clear) a to-one relation.
    SetRelation,
    /// Replace a to-many relation.
    SetRelations,
    /// Union targets into a to-many relation.
    AddRelations,
    /// Subtract targets from a to-many relation.
    RemoveRelations,
    /// Resolve the target of a to-one relation.
    FindOneTarget,
    /// Resolve the targets of a to-many relation.
    FindManyTargets,
}

impl Capability {
    /// Capabilities served by a resource repository.
    pub const RESOURCE: [Self; 4] = [Self::FindOne, Self::FindAll, Self::Save, Self::Delete];

    /// Capabilities served by a relationship repository.
    pub const RELATIONSHIP: [Self; 6] = [
        Self::SetRelation,
        Self::SetRelations,
        Self::AddRelations,
        Self::RemoveRelations,
        Self::FindOneTarget,
        Self::FindManyTargets,
    ];

    /// Returns the kebab-case tag name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FindOne => "find-one",
            Self::FindAll => "find-all",
            Self::Save => "save",
            Self::Delete => "delete",
            Self::SetRelation => "set-one-relation",
            Self::SetRelations => "set-many-relations",
            Self::AddRelations => "add-many-relations",
            Self::RemoveRelations => "remove-many-relations",
            Self::FindOneTarget => "find-one-target",
            Self::FindManyTargets => "find-many-targets",
        }
    }

    /// Returns `true` for the six relationship capabilities.
    #[must_use]
    pub const fn is_relationship(&self) -> bool {
        !matches!(
            self,
            Self::FindOne | Self::FindAll | Self::Save | Self::Delete
        )
    }

    /// Returns `true` for read operations, which receive the request parameters.
    #[must_use]
    pub const fn carries_params(&self) -> bool {
        matches!(
            self,
            Self::FindOne | Self::FindAll | Self::FindOneTarget | Self::FindManyTargets
        )
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_covers_all_tags() {
        assert!(Capability::RESOURCE.iter().all(|c| !c.is_relationship()));
        assert!(Capability::RELATIONSHIP.iter().all(Capability::is_relationship));
        assert_eq!(Capability::RESOURCE.len() + Capability::RELATIONSHIP.len(), 10);
    }

    #[test]
    fn test_display_uses_tag_name() {
        assert_eq!(Capability::SetRelation.to_string(), "set-one-relation");
        assert_eq!(Capability::FindManyTargets.to_string(), "find-many-targets");
    }

    #[test]
    fn test_reads_carry_params() {
        assert!(Capability::FindAll.carries_params());
        assert!(Capability::FindOneTarget.carries_params());
        assert!(!Capability::Save.carries_params());
        assert!(!Capability::SetRelation.carries_params());
    }
}
