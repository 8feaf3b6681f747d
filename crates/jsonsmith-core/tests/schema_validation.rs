use jsonsmith_core::{IssueSeverity, Node, NodePath, Schema, Walk, walk};

#[test]
fn declared_references_pass() {
    let schema = Schema::from_yaml_str(
        "files: [names]\nroot:\n  name: {type: string, from: names}\n",
    )
    .expect("decode schema");
    let warnings = schema.validate().expect("valid schema");
    assert!(warnings.is_empty());
}

#[test]
fn undeclared_references_are_all_reported() {
    let source = r#"
files: [names]
root:
  name: {type: string, from: names}
  city: {type: string, from: cities}
  tags:
    type: array
    elements: {type: string, from: tags}
"#;
    let schema = Schema::from_yaml_str(source).expect("decode schema");
    let report = schema.validate().expect_err("dangling references");

    assert_eq!(report.errors.len(), 2);
    assert!(report.errors.iter().all(|issue| issue.code == "file_undeclared"));

    let paths: Vec<String> = report.errors.iter().map(|i| i.path.to_string()).collect();
    assert!(paths.contains(&"$.city".to_string()));
    assert!(paths.contains(&"$.tags[*]".to_string()));

    let message = report.to_string();
    assert!(message.contains("cities"), "{message}");
    assert!(message.contains("tags"), "{message}");
}

#[test]
fn unused_and_duplicate_files() {
    let schema = Schema::from_yaml_str("files: [a, b]\nroot:\n  x: {type: string, from: a}\n")
        .expect("decode schema");
    let warnings = schema.validate().expect("valid schema");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].severity, IssueSeverity::Warning);
    assert_eq!(warnings[0].code, "file_unused");

    let schema = Schema::from_yaml_str("files: [a, a]\nroot:\n  x: {type: string, from: a}\n")
        .expect("decode schema");
    let report = schema.validate().expect_err("duplicate file");
    assert_eq!(report.errors[0].code, "file_duplicate");
}

#[test]
fn walk_visits_children_unless_skipped() {
    let node = Node::from_yaml_str(
        r#"
type: object
fields:
  a: bool
  list:
    type: array
    elements:
      type: object
      fields:
        b: int
"#,
    )
    .expect("decode node");

    let mut visited = Vec::new();
    walk(&node, &mut |path: &NodePath, _node: &Node| {
        visited.push(path.to_string());
        Walk::Descend
    });
    assert_eq!(visited, vec!["$", "$.a", "$.list", "$.list[*]", "$.list[*].b"]);

    let mut visited = Vec::new();
    walk(&node, &mut |path: &NodePath, node: &Node| {
        visited.push(path.to_string());
        if matches!(node, Node::Array(_)) {
            Walk::Skip
        } else {
            Walk::Descend
        }
    });
    assert_eq!(visited, vec!["$", "$.a", "$.list"]);
}
