use relbench::relation_translator::{parse_relation_key, JoinMode, PathEntry, RelationPath};
use test_case::test_case;

#[test_case("catalogs.subItems", &["catalogs", "subItems"] ; "dotted")]
#[test_case("left@catalogs.subItems", &["catalogs", "subItems"] ; "prefixed first hop")]
#[test_case("catalogs.catalogs", &["catalogs", "catalogs"] ; "duplicates kept")]
#[test_case("users", &["users"] ; "single hop")]
fn test_dotted_paths(path: &str, expected: &[&str]) {
    let names: Vec<String> = RelationPath::from(path)
        .parse()
        .into_iter()
        .map(|spec| spec.name)
        .collect();
    assert_eq!(names, expected);
}

#[test]
fn test_prefix_handling_is_lenient() {
    assert_eq!(parse_relation_key("left@catalogs", None).join_mode, JoinMode::Left);
    assert_eq!(parse_relation_key("LEFT@catalogs", None).join_mode, JoinMode::Inner);
    assert_eq!(parse_relation_key("inner@catalogs", None).join_mode, JoinMode::Inner);
    assert_eq!(parse_relation_key("inner@catalogs", None).name, "catalogs");
}

#[test]
fn test_path_from_entries() {
    let path: RelationPath = vec![
        PathEntry::Name("catalogs".to_string()),
        PathEntry::Filtered {
            key: "left@subItems".to_string(),
            filter: None,
        },
    ]
    .into_iter()
    .collect();

    let specs = path.parse();
    assert_eq!(specs.len(), 2);
    assert_eq!(specs[0].join_mode, JoinMode::Inner);
    assert_eq!(specs[1].name, "subItems");
    assert_eq!(specs[1].join_mode, JoinMode::Left);
}
