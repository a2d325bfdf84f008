//! Capability discovery and invocation.

use crate::method::{Arg, Repository, RepositoryMethod, Returned};
use crate::parameters::{check_declaration, ParametersFactory};
use dashmap::DashMap;
use heron_core::{Capability, HeronError, HeronResult, RequestContext};
use heron_telemetry::metrics::record_repository_invocation;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

/// The declared methods of one repository plus a per-capability lookup cache.
///
/// The declaration table is read once, when the table is built. Each
/// capability is then looked up on first use and the result (found or absent)
/// is kept for the table's lifetime. Two threads racing on the first lookup
/// compute the same answer, so the race is harmless.
pub struct MethodTable {
    name: String,
    declared: Vec<Arc<RepositoryMethod>>,
    cache: DashMap<Capability, Option<Arc<RepositoryMethod>>>,
}

impl MethodTable {
    /// Reads the method declarations of a repository.
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        let name = repository.name().to_string();
        let declared: Vec<_> = repository.methods().into_iter().map(Arc::new).collect();
        debug!(
            repository = %name,
            methods = declared.len(),
            "read repository method declarations"
        );
        Self {
            name,
            declared,
            cache: DashMap::new(),
        }
    }

    /// A table without methods, for types registered without a repository.
    #[must_use]
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared: Vec::new(),
            cache: DashMap::new(),
        }
    }

    /// Returns the repository name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared capabilities, in declaration order.
    #[must_use]
    pub fn capabilities(&self) -> Vec<Capability> {
        self.declared.iter().map(|m| m.capability()).collect()
    }

    /// Returns `true` if a method with the tag is declared.
    #[must_use]
    pub fn declares(&self, capability: Capability) -> bool {
        self.declared.iter().any(|m| m.capability() == capability)
    }

    /// Finds the method for a capability.
    ///
    /// Fails with [`HeronError::CapabilityNotDeclared`] when no method carries
    /// the tag, and [`HeronError::InvalidHandlerMethodShape`] when several do.
    pub fn lookup(&self, capability: Capability) -> HeronResult<Arc<RepositoryMethod>> {
        let cached = self.cache.get(&capability).map(|entry| entry.value().clone());
        let found = match cached {
            Some(found) => found,
            None => {
                let found = self.scan(capability)?;
                debug!(
                    repository = %self.name,
                    capability = %capability,
                    found = found.is_some(),
                    "discovered repository method"
                );
                self.cache.insert(capability, found.clone());
                found
            }
        };

        found.ok_or_else(|| HeronError::CapabilityNotDeclared {
            capability,
            repository: self.name.clone(),
        })
    }

    fn scan(&self, capability: Capability) -> HeronResult<Option<Arc<RepositoryMethod>>> {
        let mut matches = self
            .declared
            .iter()
            .filter(|m| m.capability() == capability);
        let first = matches.next().cloned();
        if matches.next().is_some() {
            return Err(HeronError::invalid_method_shape(
                capability,
                &self.name,
                "more than one method declares this capability",
            ));
        }
        Ok(first)
    }

    /// Checks every declaration eagerly: no duplicate tags and a well-formed
    /// prefix for each method.
    pub fn verify(&self) -> Vec<HeronError> {
        let mut problems = Vec::new();
        let mut seen = Vec::new();
        for method in &self.declared {
            let capability = method.capability();
            if seen.contains(&capability) {
                problems.push(HeronError::invalid_method_shape(
                    capability,
                    &self.name,
                    "more than one method declares this capability",
                ));
                continue;
            }
            seen.push(capability);
            if let Err(problem) = check_declaration(method.params(), capability, &self.name) {
                problems.push(problem);
            }
        }
        problems
    }

    /// Looks up, assembles arguments for, and calls the method for a capability.
    ///
    /// Errors raised by the method itself are returned unchanged.
    pub fn invoke(
        &self,
        capability: Capability,
        prefix: Vec<Arg>,
        context: &RequestContext,
        factory: &ParametersFactory,
    ) -> HeronResult<Returned> {
        let result = self.lookup(capability).and_then(|method| {
            let args = factory.build(prefix, method.params(), context, capability, &self.name)?;
            method.invoke(args)
        });

        let outcome = match &result {
            Ok(_) => "ok",
            Err(err) => err.category().label(),
        };
        record_repository_invocation(capability.as_str(), outcome);

        if let Err(err @ HeronError::InvocationFault { .. }) = &result {
            error!(
                repository = %self.name,
                capability = %capability,
                request_id = %context.request_id(),
                error = %err,
                "repository invocation fault"
            );
        }
        result
    }

    /// Builds the fault raised when a method returns the wrong shape.
    pub(crate) fn wrong_shape(
        &self,
        capability: Capability,
        returned: &Returned,
        expected: &str,
    ) -> HeronError {
        error!(
            repository = %self.name,
            capability = %capability,
            returned = returned.shape(),
            "repository method returned the wrong shape"
        );
        HeronError::invocation_fault(
            capability,
            &self.name,
            format!("returned {}, expected {expected}", returned.shape()),
        )
    }
}

impl fmt::Debug for MethodTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodTable")
            .field("name", &self.name)
            .field("capabilities", &self.capabilities())
            .finish()
    }
}
