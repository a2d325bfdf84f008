//! Property tests for the path parser.

use heron_core::{HeronError, HeronResult};
use heron_path::{JsonPath, PathBuilder, PathSchema};
use proptest::prelude::*;

struct Schema;

impl PathSchema for Schema {
    fn check_type(&self, resource_type: &str) -> HeronResult<()> {
        match resource_type {
            "tasks" | "projects" => Ok(()),
            other => Err(HeronError::unknown_resource_type(other)),
        }
    }

    fn check_relationship(&self, resource_type: &str, relationship: &str) -> HeronResult<()> {
        match relationship {
            "project" | "tasks" => Ok(()),
            _ => Err(HeronError::unknown_relationship(resource_type, relationship)),
        }
    }
}

fn registered_type() -> impl Strategy<Value = String> {
    prop_oneof![Just("tasks".to_string()), Just("projects".to_string())]
}

fn identifier() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_.~:-]{1,12}"
}

proptest! {
    #[test]
    fn test_registered_type_without_id_is_collection(resource_type in registered_type()) {
        let path = PathBuilder::new(&Schema).build(&format!("/{resource_type}")).unwrap();
        prop_assert!(path.ids().is_empty());
        prop_assert_eq!(path, JsonPath::collection(resource_type));
    }

    #[test]
    fn test_single_id_is_preserved(resource_type in registered_type(), id in identifier()) {
        let path = PathBuilder::new(&Schema)
            .build(&format!("/{resource_type}/{id}"))
            .unwrap();
        prop_assert_eq!(path.single_id(), Some(id.as_str()));
    }

    #[test]
    fn test_id_list_keeps_order(
        resource_type in registered_type(),
        ids in proptest::collection::vec(identifier(), 1..6),
    ) {
        let raw = format!("/{resource_type}/{}", ids.join(","));
        let path = PathBuilder::new(&Schema).build(&raw).unwrap();
        prop_assert_eq!(path.ids(), ids.as_slice());
        prop_assert_eq!(path.to_string(), raw);
    }

    #[test]
    fn test_unregistered_type_always_fails(
        resource_type in "[a-z]{1,10}".prop_filter("registered", |t| t != "tasks" && t != "projects"),
        tail in proptest::collection::vec("[A-Za-z0-9,/]{0,8}", 0..5),
    ) {
        let raw = format!("/{resource_type}/{}", tail.join("/"));
        let err = PathBuilder::new(&Schema).build(&raw).unwrap_err();
        let is_unknown_type = matches!(err, HeronError::UnknownResourceType { .. });
        prop_assert!(is_unknown_type, "{} -> {:?}", raw, err);
    }

    #[test]
    fn test_relationship_paths_round_trip_through_display(
        resource_type in registered_type(),
        id in identifier(),
        relationship in prop_oneof![Just("project"), Just("tasks")],
        links in any::<bool>(),
    ) {
        let expected = if links {
            JsonPath::links(resource_type, id, relationship)
        } else {
            JsonPath::relationships(resource_type, id, relationship)
        };
        let parsed = PathBuilder::new(&Schema).build(&expected.to_string()).unwrap();
        prop_assert_eq!(parsed, expected);
    }
}
