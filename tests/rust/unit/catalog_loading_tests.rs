use relbench::model_catalog::{ModelCatalog, ModelCatalogError, RelationKind};
use relbench::relation_translator::{ModelQuery, TranslateError};
use std::io::Write;

const BLOG: &str = r#"
name: blog
models:
  - name: Post
    soft_deletes: true
    relations:
      author: { kind: belongs_to, related: Author }
      comments: { kind: has_many, related: Comment }
      tags: { kind: belongs_to_many, related: Tag }
      attachments: { kind: morph_many }
  - name: Author
  - name: Comment
    global_scopes:
      - name: approved
        conditions:
          - { column: approved, value: true }
  - name: Tag
"#;

fn write_catalog(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write");
    file
}

#[test]
fn test_catalog_file_drives_translation() {
    let file = write_catalog(BLOG);
    let catalog = ModelCatalog::from_yaml_file(file.path()).expect("loads");
    assert_eq!(catalog.name, "blog");

    let post = catalog.model("Post").expect("Post");
    assert_eq!(post.relation("tags").map(|r| r.kind()), Some(RelationKind::BelongsToMany));

    let mut query = ModelQuery::new(&catalog, "Post").expect("Post");
    assert!(query.join_relation("author.left@comments").is_err());
    query.join_relation("comments").expect("comments");
    query.join_relation("tags").expect("tags");

    assert_eq!(
        query.query().joined_tables(),
        vec!["comments", "post_tag", "tags"]
    );
    let comments = query.query().find_join("comments").expect("joined");
    assert_eq!(comments.joining_on.len(), 2);
}

#[test]
fn test_unsupported_relation_from_file() {
    let file = write_catalog(BLOG);
    let catalog = ModelCatalog::from_yaml_file(file.path()).expect("loads");

    let mut query = ModelQuery::new(&catalog, "Post").expect("Post");
    let err = query.where_has("attachments").map(|_| ()).unwrap_err();
    assert_eq!(
        err,
        TranslateError::UnsupportedRelationKind {
            model: "Post".to_string(),
            relation: "attachments".to_string(),
            kind: "morph_many".to_string(),
        }
    );
}

#[test]
fn test_invalid_catalog_file() {
    let file = write_catalog(
        "models:\n  - name: Post\n    relations:\n      tags: { kind: belongs_to_many, related: Tag }\n",
    );
    assert!(matches!(
        ModelCatalog::from_yaml_file(file.path()),
        Err(ModelCatalogError::InvalidConfig { .. })
    ));
}
