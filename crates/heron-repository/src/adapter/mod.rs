//! Repository adapters.
//!
//! Adapters give controllers a typed API over capability-tagged repository
//! methods. They coerce raw path and body ids to the owning type's id type,
//! assemble the fixed argument prefix and check the shape of returned values.

mod relationship;
mod resource;

pub use relationship::RelationshipRepositoryAdapter;
pub use resource::ResourceRepositoryAdapter;
