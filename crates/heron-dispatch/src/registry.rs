//! Controller selection.
//!
//! The registry offers a parsed path to every controller and expects
//! exactly one to accept it. Zero means the verb is not allowed on the
//! path; more than one means two controllers overlap, which is a
//! configuration error caught by [`ControllerRegistry::verify_disjoint`].

use crate::controller::{default_controllers, Controller};
use heron_core::{HeronError, HeronResult, Method};
use heron_path::JsonPath;
use heron_repository::ResourceRegistry;
use std::fmt;
use std::sync::Arc;

const PROBE_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PATCH,
    Method::DELETE,
    Method::PUT,
];

/// An ordered set of controllers.
#[derive(Clone)]
pub struct ControllerRegistry {
    controllers: Vec<Arc<dyn Controller>>,
}

impl ControllerRegistry {
    /// Creates a registry holding the nine standard controllers.
    #[must_use]
    pub fn new(registry: &Arc<ResourceRegistry>) -> Self {
        Self::with_controllers(default_controllers(registry))
    }

    /// Creates a registry from an explicit controller list.
    #[must_use]
    pub fn with_controllers(controllers: Vec<Arc<dyn Controller>>) -> Self {
        Self { controllers }
    }

    /// Appends a controller.
    pub fn push(&mut self, controller: Arc<dyn Controller>) {
        self.controllers.push(controller);
    }

    /// Returns the controller names in order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.controllers.iter().map(|c| c.name()).collect()
    }

    /// Returns the number of controllers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    /// Returns `true` if there are no controllers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// Selects the single controller serving the path with this verb.
    pub fn find(&self, path: &JsonPath, method: &Method) -> HeronResult<Arc<dyn Controller>> {
        let mut applicable = self
            .controllers
            .iter()
            .filter(|controller| controller.is_applicable(path, method));

        match (applicable.next(), applicable.next()) {
            (Some(controller), None) => Ok(controller.clone()),
            (None, _) => Err(HeronError::MethodNotAllowed {
                method: method.to_string(),
                path: path.to_string(),
            }),
            (Some(first), Some(second)) => {
                let controllers = [first, second]
                    .into_iter()
                    .chain(applicable)
                    .map(|controller| controller.name().to_string())
                    .collect();
                Err(HeronError::AmbiguousController {
                    method: method.to_string(),
                    path: path.to_string(),
                    controllers,
                })
            }
        }
    }

    /// Checks that no two controllers accept the same path shape and verb.
    ///
    /// Every path kind is probed with a to-one and a to-many element where
    /// that matters, and with zero, one and several ids for resource paths.
    pub fn verify_disjoint(&self) -> HeronResult<()> {
        for path in probe_paths() {
            for method in &PROBE_METHODS {
                match self.find(&path, method) {
                    Ok(_) | Err(HeronError::MethodNotAllowed { .. }) => {}
                    Err(err) => return Err(err),
                }
            }
        }
        Ok(())
    }
}

fn probe_paths() -> [JsonPath; 6] {
    [
        JsonPath::collection("probe"),
        JsonPath::resource("probe", ["1"]),
        JsonPath::resource("probe", ["1", "2"]),
        JsonPath::field("probe", "1", "field"),
        JsonPath::relationships("probe", "1", "field"),
        JsonPath::links("probe", "1", "field"),
    ]
}

impl fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerRegistry")
            .field("controllers", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Response;
    use heron_core::{RequestBody, RequestContext};

    struct CatchAll;

    impl Controller for CatchAll {
        fn name(&self) -> &'static str {
            "CatchAll"
        }

        fn is_applicable(&self, _path: &JsonPath, _method: &Method) -> bool {
            true
        }

        fn handle(
            &self,
            _path: &JsonPath,
            _context: &RequestContext,
            _body: Option<&RequestBody>,
        ) -> HeronResult<Response> {
            Ok(Response::no_content())
        }
    }

    fn standard() -> ControllerRegistry {
        ControllerRegistry::new(&Arc::new(ResourceRegistry::new()))
    }

    #[test]
    fn test_standard_set_is_disjoint() {
        let controllers = standard();
        assert_eq!(controllers.len(), 9);
        assert!(controllers.verify_disjoint().is_ok());
    }

    #[test]
    fn test_find_selects_by_kind_and_verb() {
        let controllers = standard();
        let cases = [
            (JsonPath::collection("tasks"), Method::GET, "ResourceGet"),
            (JsonPath::collection("tasks"), Method::POST, "ResourcePost"),
            (JsonPath::resource("tasks", ["1"]), Method::PATCH, "ResourcePatch"),
            (JsonPath::resource("tasks", ["1", "2"]), Method::DELETE, "ResourceDelete"),
            (JsonPath::field("tasks", "1", "project"), Method::GET, "FieldResourceGet"),
            (
                JsonPath::links("tasks", "1", "project"),
                Method::GET,
                "RelationshipsResourceGet",
            ),
            (
                JsonPath::relationships("tasks", "1", "assignees"),
                Method::DELETE,
                "RelationshipsResourceDelete",
            ),
        ];

        for (path, method, expected) in cases {
            assert_eq!(controllers.find(&path, &method).unwrap().name(), expected);
        }
    }

    #[test]
    fn test_no_controller_is_method_not_allowed() {
        let err = standard()
            .find(&JsonPath::resource("tasks", ["1"]), &Method::PUT)
            .err()
            .unwrap();
        assert!(matches!(err, HeronError::MethodNotAllowed { .. }));
        assert_eq!(err.status_code(), 405);
    }

    #[test]
    fn test_overlap_is_ambiguous() {
        let mut controllers = standard();
        controllers.push(Arc::new(CatchAll));

        match controllers.find(&JsonPath::collection("tasks"), &Method::GET).err() {
            Some(HeronError::AmbiguousController { controllers, .. }) => {
                assert_eq!(controllers, vec!["ResourceGet", "CatchAll"]);
            }
            other => panic!("expected ambiguity, got {other:?}"),
        }
        assert!(controllers.verify_disjoint().is_err());
    }

    #[test]
    fn test_debug_lists_names() {
        let debug = format!("{:?}", standard());
        assert!(debug.contains("FieldResourceGet"));
    }
}
