//! End-to-end tests for the operation pipeline and aggregation modes.

use stillwater::Validation;
use verdict::{
    codes, ApplyOptions, Issue, IssueParam, Issues, Operation, Shape, ShapeLike, Value,
};

fn unwrap_failure(shape: &dyn ShapeLike, input: Value, options: ApplyOptions) -> Issues {
    match shape.try_parse_with(&input, &options).unwrap() {
        Validation::Failure(issues) => issues,
        Validation::Success(v) => panic!("expected failure, got {:?}", v),
    }
}

fn codes_of(issues: &Issues) -> Vec<&str> {
    issues.iter().map(|i| i.code.as_str()).collect()
}

#[test]
fn test_min_then_multiple_of_early_return() {
    let shape = Shape::number().min(2.0).multiple_of(3.0);

    let issues = unwrap_failure(&shape, Value::from(1), ApplyOptions::default());
    assert_eq!(codes_of(&issues), vec![codes::MIN_VALUE]);
    assert_eq!(issues.first().param, Some(IssueParam::Value(Value::from(2))));
}

#[test]
fn test_min_then_multiple_of_verbose() {
    let shape = Shape::number().min(2.0).multiple_of(3.0);

    let issues = unwrap_failure(&shape, Value::from(1), ApplyOptions::verbose());
    assert_eq!(codes_of(&issues), vec![codes::MIN_VALUE, codes::MULTIPLE_OF]);
}

#[test]
fn test_operations_never_see_structurally_invalid_input() {
    let shape = Shape::number().refine(|v| v.as_f64().is_some(), "unreachable");

    let issues = unwrap_failure(&shape, Value::from("x"), ApplyOptions::verbose());
    assert_eq!(codes_of(&issues), vec![codes::INVALID_TYPE]);
}

#[test]
fn test_unsafe_operation_runs_after_issue() {
    let shape = Shape::number()
        .min(10.0)
        .add_operation(
            Operation::check(|value, _, _| {
                Ok(vec![Issue::new("audit", value.clone(), "always reported")])
            })
            .with_unsafe(true),
        )
        .refine(|_| false, "safe and skipped");

    let issues = unwrap_failure(&shape, Value::from(1), ApplyOptions::default());
    assert_eq!(codes_of(&issues), vec![codes::MIN_VALUE, "audit"]);
}

#[test]
fn test_keyed_operation_replaced_in_place() {
    let shape = Shape::number().min(5.0).max(100.0).min(1.0);
    let keys: Vec<_> = shape
        .core()
        .pipeline()
        .operations()
        .iter()
        .map(|op| op.key())
        .collect();
    assert_eq!(keys, vec![Some("min"), Some("max")]);
    assert!(shape.parse(&Value::from(2)).is_ok());
}

#[test]
fn test_builders_do_not_mutate_source() {
    let base = Shape::number().min(0.0);
    let strict = base.clone().max(10.0);

    assert!(base.parse(&Value::from(50)).is_ok());
    assert!(strict.parse(&Value::from(50)).is_err());
    assert_eq!(base.core().pipeline().len(), 1);
}

#[test]
fn test_alters_chain_in_order() {
    let shape = Shape::string()
        .alter(|v| Value::from(format!("{}!", v.as_str().unwrap_or(""))))
        .alter(|v| Value::from(v.as_str().unwrap_or("").to_uppercase()));

    assert_eq!(shape.parse(&Value::from("hi")).unwrap(), Value::from("HI!"));
}

#[test]
fn test_error_overrides_last_operation_message() {
    let shape = Shape::string().min_len(8).error("password too short");
    let issues = unwrap_failure(&shape, Value::from("abc"), ApplyOptions::default());
    assert_eq!(issues.first().message, "password too short");
    assert_eq!(issues.first().code, codes::MIN_LENGTH);
}

#[test]
fn test_shape_reused_across_calls() {
    let shape = Shape::number().integer();
    for i in 0..100 {
        assert!(shape.parse(&Value::from(i)).is_ok());
        assert!(shape.parse(&Value::Number(i as f64 + 0.5)).is_err());
    }
}

#[test]
fn test_early_return_one_issue_per_branch() {
    let shape = Shape::object()
        .field("a", Shape::number().min(5.0).max(1.0))
        .field("b", Shape::number());
    let input = Value::object([("a", Value::from(3)), ("b", Value::from("x"))]);

    let issues = unwrap_failure(&shape, input.clone(), ApplyOptions::default());
    assert_eq!(issues.len(), 1);

    let issues = unwrap_failure(&shape, input, ApplyOptions::verbose());
    assert_eq!(
        codes_of(&issues),
        vec![codes::MIN_VALUE, codes::MAX_VALUE, codes::INVALID_TYPE]
    );
}
