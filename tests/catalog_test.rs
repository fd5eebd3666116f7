//! Integration tests for the leaf shapes.

use chrono::{TimeZone, Utc};
use verdict::{codes, Shape, ShapeLike, Value};

fn first_code(shape: &dyn ShapeLike, input: &Value) -> String {
    let error = shape.parse(input).unwrap_err();
    error.issues().unwrap().first().code.clone()
}

#[test]
fn test_string_constraints() {
    let shape = Shape::string().min_len(2).max_len(4);
    assert!(shape.parse(&Value::from("abc")).is_ok());
    assert_eq!(first_code(&shape, &Value::from("a")), codes::MIN_LENGTH);
    assert_eq!(first_code(&shape, &Value::from("abcde")), codes::MAX_LENGTH);
    assert_eq!(first_code(&shape, &Value::Null), codes::INVALID_TYPE);
}

#[test]
fn test_number_constraints() {
    let shape = Shape::number().gt(0.0).lt(1.0);
    assert!(shape.parse(&Value::Number(0.5)).is_ok());
    assert_eq!(first_code(&shape, &Value::from(0)), codes::GREATER_THAN);
    assert_eq!(first_code(&shape, &Value::from(1)), codes::LESS_THAN);
}

#[test]
fn test_boolean() {
    let shape = Shape::boolean();
    assert!(shape.parse(&Value::Bool(false)).is_ok());
    assert_eq!(first_code(&shape, &Value::from(0)), codes::INVALID_TYPE);
}

#[test]
fn test_bigint_bounds() {
    let shape = Shape::bigint().min(0).max(1 << 70);
    assert!(shape.parse(&Value::BigInt(1 << 64)).is_ok());
    assert_eq!(first_code(&shape, &Value::BigInt(-1)), codes::MIN_VALUE);
    assert_eq!(first_code(&shape, &Value::from(1)), codes::INVALID_TYPE);
}

#[test]
fn test_date_bounds() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let shape = Shape::date().min(start);

    assert!(shape
        .parse(&Value::Date(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()))
        .is_ok());
    assert_eq!(
        first_code(
            &shape,
            &Value::Date(Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap())
        ),
        codes::MIN_VALUE
    );
}

#[test]
fn test_literals() {
    assert!(Shape::literal("on").parse(&Value::from("on")).is_ok());
    assert_eq!(
        first_code(&Shape::literal("on"), &Value::from("off")),
        codes::INVALID_LITERAL
    );
    assert!(Shape::literal(f64::NAN).parse(&Value::Number(f64::NAN)).is_ok());
    assert!(Shape::null().parse(&Value::Null).is_ok());
    assert_eq!(
        first_code(&Shape::undefined(), &Value::Null),
        codes::INVALID_TYPE
    );
}

#[test]
fn test_unknown_and_never() {
    assert!(Shape::unknown().parse(&Value::Undefined).is_ok());
    assert_eq!(first_code(&Shape::never(), &Value::Null), codes::NEVER);
}
