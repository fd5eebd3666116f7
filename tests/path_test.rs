//! Integration tests for issue paths reported by nested shapes.

use verdict::{ApplyOptions, IntoShape, IssuePath, PathSegment, Shape, ShapeLike, Value};

fn paths_of(shape: &dyn ShapeLike, input: &Value) -> Vec<String> {
    let issues = shape
        .parse_with(input, &ApplyOptions::verbose())
        .unwrap_err();
    issues
        .issues()
        .unwrap()
        .iter()
        .map(|i| i.path.to_string())
        .collect()
}

#[test]
fn test_path_builders() {
    let path = IssuePath::root().push_field("users").push_index(0).push_field("email");
    assert_eq!(path.to_string(), "users[0].email");
    assert_eq!(path.len(), 3);
    assert_eq!(path.first(), Some(&PathSegment::field("users")));
    assert_eq!(path.parent().unwrap().to_string(), "users[0]");
}

#[test]
fn test_child_issue_is_prefixed_with_its_key() {
    let child = Shape::number().min(0.0);
    let alone = child.parse(&Value::from(-1)).unwrap_err();
    assert!(alone.issues().unwrap().first().path.is_root());

    let parent = Shape::object().field("balance", child);
    let input = Value::object([("balance", -1)]);
    assert_eq!(paths_of(&parent, &input), vec!["balance"]);
}

#[test]
fn test_deeply_nested_paths() {
    let shape = Shape::object().field(
        "orders",
        Shape::array(
            Shape::object().field(
                "lines",
                Shape::map(Shape::string(), Shape::number().positive()),
            ),
        ),
    );

    let input = Value::object([(
        "orders",
        Value::Array(vec![
            Value::object([("lines", Value::Map(vec![]))]),
            Value::object([(
                "lines",
                Value::Map(vec![
                    (Value::from("a"), Value::from(1)),
                    (Value::from("b"), Value::from(0)),
                ]),
            )]),
        ]),
    )]);

    assert_eq!(paths_of(&shape, &input), vec!["orders[1].lines[\"b\"]"]);
}

#[test]
fn test_paths_follow_visit_order() {
    let shape = Shape::tuple(vec![
        Shape::string().into_shape(),
        Shape::object()
            .field("x", Shape::number())
            .field("y", Shape::number())
            .into_shape(),
    ]);
    let input = Value::Array(vec![
        Value::from(1),
        Value::object([("y", Value::Null), ("x", Value::Null)]),
    ]);

    assert_eq!(paths_of(&shape, &input), vec!["[0]", "[1].x", "[1].y"]);
}
