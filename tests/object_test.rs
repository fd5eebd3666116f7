//! Integration tests for object and record shapes.

use verdict::{codes, ApplyOptions, KeyMode, Shape, ShapeLike, Value};

fn user() -> verdict::ObjectShape {
    Shape::object()
        .field("name", Shape::string().min_len(1))
        .field("age", Shape::number().integer().non_negative())
        .optional("email", Shape::string())
}

#[test]
fn test_valid_user() {
    let input = Value::object([("name", Value::from("Ada")), ("age", Value::from(36))]);
    assert_eq!(user().parse(&input).unwrap(), input);
}

#[test]
fn test_all_field_issues_in_verbose_mode() {
    let input = Value::object([
        ("name", Value::from("")),
        ("age", Value::Number(-1.5)),
        ("email", Value::from(3)),
    ]);

    let error = user()
        .parse_with(&input, &ApplyOptions::verbose())
        .unwrap_err();
    let found: Vec<_> = error
        .issues()
        .unwrap()
        .iter()
        .map(|i| (i.path.to_string(), i.code.clone()))
        .collect();

    assert_eq!(
        found,
        vec![
            ("name".to_string(), codes::MIN_LENGTH.to_string()),
            ("age".to_string(), codes::INTEGER.to_string()),
            ("age".to_string(), codes::NON_NEGATIVE.to_string()),
            ("email".to_string(), codes::INVALID_UNION.to_string()),
        ]
    );
}

#[test]
fn test_key_modes() {
    let input = Value::object([
        ("name", Value::from("Ada")),
        ("age", Value::from(36)),
        ("admin", Value::Bool(true)),
    ]);

    assert_eq!(user().key_mode(), KeyMode::Preserve);
    assert_eq!(user().parse(&input).unwrap(), input);

    let stripped = user().strip().parse(&input).unwrap();
    assert!(stripped.as_object().unwrap().get("admin").is_none());

    let error = user().exact().parse(&input).unwrap_err();
    let issue = error.issues().unwrap().first();
    assert_eq!(issue.code, codes::UNKNOWN_KEY);
    assert_eq!(issue.path.to_string(), "admin");
}

#[test]
fn test_later_key_mode_wins() {
    let input = Value::object([("name", Value::from("Ada")), ("age", Value::from(1)), ("x", Value::Null)]);
    assert!(user().exact().preserve().parse(&input).is_ok());
    assert!(user().rest(Shape::null()).parse(&input).is_ok());
    assert!(user().rest(Shape::string()).parse(&input).is_err());
}

#[test]
fn test_object_output_is_copied_only_when_changed() {
    let shape = Shape::object().field("n", Shape::number().coerce());
    let input = Value::object([("n", "5")]);

    let output = shape.parse(&input).unwrap();
    assert_eq!(output, Value::object([("n", 5)]));
    assert_eq!(input, Value::object([("n", "5")]));
}

#[test]
fn test_rejects_non_objects() {
    for input in [Value::Null, Value::Array(vec![]), Value::from("{}"), Value::boxed(1)] {
        let error = user().parse(&input).unwrap_err();
        assert_eq!(error.issues().unwrap().first().code, codes::INVALID_TYPE);
    }
}

#[test]
fn test_record_of_numbers() {
    let shape = Shape::record(Shape::string().pattern("^[a-z]+$").unwrap(), Shape::number());

    assert!(shape
        .parse(&Value::object([("a", 1), ("b", 2)]))
        .is_ok());

    let error = shape
        .parse_with(
            &Value::object([("A", Value::from(1)), ("b", Value::from("x"))]),
            &ApplyOptions::verbose(),
        )
        .unwrap_err();
    let paths: Vec<_> = error
        .issues()
        .unwrap()
        .iter()
        .map(|i| i.path.to_string())
        .collect();
    assert_eq!(paths, vec!["A", "b"]);
}

#[test]
fn test_object_from_json() {
    let json = serde_json::json!({ "name": "Ada", "age": 36, "email": null });
    let input = Value::from(json);

    let error = user().parse(&input).unwrap_err();
    assert_eq!(error.issues().unwrap().first().path.to_string(), "email");

    let nullable = Shape::object().field("email", Shape::nullable(Shape::string()));
    assert!(nullable.parse(&input).is_ok());
}
