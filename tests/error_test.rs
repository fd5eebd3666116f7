//! Integration tests for issues and the error types.

use std::error::Error;

use stillwater::prelude::*;
use stillwater::Validation;
use verdict::{
    codes, ApplyOptions, Issue, IssueParam, Issues, OperationError, ParseError, PathSegment,
    Shape, ShapeError, ShapeLike, Value,
};

#[derive(Debug)]
struct Misconfigured;

impl std::fmt::Display for Misconfigured {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "lookup table missing")
    }
}

impl Error for Misconfigured {}

#[test]
fn test_issue_full_context() {
    let issue = Issue::new(codes::MIN_LENGTH, Value::from("ab"), "too short")
        .with_param(IssueParam::Value(Value::from(3)))
        .with_meta(Value::from("signup"))
        .prefixed(PathSegment::field("password"));

    assert_eq!(issue.path.to_string(), "password");
    assert_eq!(issue.param, Some(IssueParam::Value(Value::from(3))));
    assert_eq!(issue.meta, Some(Value::from("signup")));
    assert_eq!(issue.to_string(), "password: too short [min_length]");
}

#[test]
fn test_issues_combine_via_semigroup() {
    let a = Issues::single(Issue::new("a", Value::Null, "first"));
    let b = Issues::single(Issue::new("b", Value::Null, "second"));

    let combined = a.combine(b);
    let found: Vec<_> = combined.iter().map(|i| i.code.as_str()).collect();
    assert_eq!(found, vec!["a", "b"]);
    assert!(!combined.is_empty());
}

#[test]
fn test_parse_error_wraps_every_issue() {
    let shape = Shape::object()
        .field("a", Shape::string())
        .field("b", Shape::string());
    let input = Value::empty_object();

    let error = shape
        .parse_with(&input, &ApplyOptions::verbose())
        .unwrap_err();
    assert!(matches!(error, ParseError::Invalid(_)));
    assert_eq!(error.issues().unwrap().len(), 2);
    assert!(error.to_string().starts_with("Validation failed with 2 issue(s):"));
}

#[test]
fn test_try_parse_returns_discriminated_result() {
    let shape = Shape::string();
    match shape.try_parse(&Value::from(1)).unwrap() {
        Validation::Failure(issues) => assert_eq!(issues.first().code, codes::INVALID_TYPE),
        Validation::Success(v) => panic!("expected failure, got {:?}", v),
    }
    assert!(shape.is_valid(&Value::from("x")).unwrap());
    assert!(!shape.is_valid(&Value::from(1)).unwrap());
}

#[test]
fn test_callback_issues_are_merged() {
    let shape = Shape::string().check(|value, _| {
        Err(OperationError::Issues(vec![Issue::new(
            "taken",
            value.clone(),
            "username is taken",
        )]))
    });

    let error = shape.parse(&Value::from("root")).unwrap_err();
    assert_eq!(error.issues().unwrap().first().code, "taken");
}

#[test]
fn test_callback_defect_propagates() {
    let shape = Shape::object().field(
        "code",
        Shape::string().check(|_, _| Err(OperationError::defect(Misconfigured))),
    );

    let input = Value::object([("code", "x")]);
    match shape.try_parse(&input) {
        Err(ShapeError::Defect(error)) => assert_eq!(error.to_string(), "lookup table missing"),
        other => panic!("expected defect, got {:?}", other),
    }
    assert!(matches!(
        shape.parse(&input),
        Err(ParseError::Shape(ShapeError::Defect(_)))
    ));
}

#[test]
fn test_callback_delegates_to_another_shape() {
    let inner = Shape::number().min(10.0);
    let shape = Shape::unknown().check(move |value, options| {
        inner.parse_with(value, options)?;
        Ok(Vec::new())
    });

    let error = shape.parse(&Value::from(3)).unwrap_err();
    assert_eq!(error.issues().unwrap().first().code, codes::MIN_VALUE);
}

#[test]
fn test_issue_codes_can_be_filtered() {
    let shape = Shape::array(Shape::number()).min_len(3);
    let input = Value::Array(vec![Value::from("a"), Value::from(2)]);

    let error = shape
        .parse_with(&input, &ApplyOptions::verbose())
        .unwrap_err();
    let issues = error.issues().unwrap();
    assert_eq!(issues.with_code(codes::MIN_LENGTH).len(), 1);
    assert_eq!(
        issues
            .at_path(&verdict::IssuePath::root().push_index(0))
            .len(),
        1
    );
}
