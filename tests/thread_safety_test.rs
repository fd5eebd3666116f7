//! Tests for sharing shapes across threads.

use std::sync::Arc;
use std::thread;

use verdict::{codes, ApplyOptions, IntoShape, Shape, ShapeLike, Value};

fn user(i: i32) -> Value {
    Value::object([
        ("name", Value::from(format!("User{}", i))),
        ("age", Value::from(20 + i)),
    ])
}

#[test]
fn test_concurrent_validation() {
    let shape = Arc::new(
        Shape::object()
            .field("name", Shape::string().min_len(1))
            .field("age", Shape::number().integer().positive()),
    );

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let shape = Arc::clone(&shape);
            thread::spawn(move || {
                assert_eq!(shape.parse(&user(i)).unwrap(), user(i));
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_first_use_compiles_once_consistently() {
    // Nothing has been applied yet, so every thread races to build the
    // cached pipeline and union lookup.
    let shape = Arc::new(
        Shape::union([
            Shape::number().min(0.0).multiple_of(2.0).into_shape(),
            Shape::string().min_len(2).into_shape(),
        ])
        .refine(|v| v != &Value::from(4), "four is reserved"),
    );

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let shape = Arc::clone(&shape);
            thread::spawn(move || {
                let input = Value::from(i);
                let result = shape.parse_with(&input, &ApplyOptions::verbose());
                match i {
                    4 => {
                        let error = result.unwrap_err();
                        let issues = error.issues().unwrap();
                        assert_eq!(issues.first().code, codes::REFINE);
                    }
                    i if i % 2 == 0 => assert_eq!(result.unwrap(), input),
                    _ => {
                        let error = result.unwrap_err();
                        let issues = error.issues().unwrap();
                        assert_eq!(issues.first().code, codes::INVALID_UNION);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_shared_child_across_parents_and_threads() {
    let email = Shape::string()
        .pattern(r"^[^@]+@[^@]+$")
        .unwrap()
        .into_shape();
    let single = Arc::new(Shape::object().field("email", email.clone()));
    let many = Arc::new(Shape::array(email));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let single = Arc::clone(&single);
            let many = Arc::clone(&many);
            thread::spawn(move || {
                let address = Value::from(format!("u{}@example.com", i));
                assert!(single
                    .is_valid(&Value::object([("email", address.clone())]))
                    .unwrap());
                assert!(many.is_valid(&Value::Array(vec![address])).unwrap());
                assert!(!many
                    .is_valid(&Value::Array(vec![Value::from("nope")]))
                    .unwrap());
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
