//! Behavioral suite: every type form, at the root and inside a pattern.
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use shapedef::Normalizer;

const TYPE_NAME: &str = "MyType";

/// `None` in `expected` means the value must be rejected.
fn assert_normalizations(source: &str, cases: &[(Value, Option<Value>)]) {
    let mut normalizer = Normalizer::new();
    normalizer.add_definitions_from_source(source).unwrap();

    for (structure, expected) in cases {
        let result = normalizer.normalize(structure, TYPE_NAME).unwrap().into_value();
        assert_eq!(&result, expected, "source: {source}, input: {structure}");
    }
}

fn def(body: &str) -> String {
    format!("type {TYPE_NAME} = {body}")
}

mod type_definitions {
    use super::*;

    #[test]
    fn array_type() {
        assert_normalizations(&def("array"), &[
            (json!(true), None),
            (json!(false), None),
            (json!(10), None),
            (json!(""), None),
            (json!([]), Some(json!([]))),
            (json!([1, 2, 3]), Some(json!([1, 2, 3]))),
            (json!({}), None),
        ]);
    }

    #[test]
    fn boolean_type() {
        assert_normalizations(&def("boolean"), &[
            (json!(true), Some(json!(true))),
            (json!(false), Some(json!(false))),
            (json!(10), None),
            (json!(""), None),
            (json!([]), None),
            (json!({}), None),
        ]);
    }

    #[test]
    fn boolean_true_value() {
        assert_normalizations(&def("true"), &[
            (json!(true), Some(json!(true))),
            (json!(false), None),
            (json!(10), None),
            (json!(""), None),
            (json!([]), None),
            (json!({}), None),
        ]);
    }

    #[test]
    fn boolean_false_value() {
        assert_normalizations(&def("false"), &[
            (json!(true), None),
            (json!(false), Some(json!(false))),
            (json!(10), None),
            (json!(""), None),
            (json!([]), None),
            (json!({}), None),
        ]);
    }

    #[test]
    fn enumeration_values() {
        assert_normalizations(&def(r#"enumeration { one two "and three" }"#), &[
            (json!(true), None),
            (json!(false), None),
            (json!(10), None),
            (json!(""), None),
            (json!("one"), Some(json!("one"))),
            (json!("two"), Some(json!("two"))),
            (json!("and three"), Some(json!("and three"))),
            (json!("four"), None),
            (json!([]), None),
            (json!({}), None),
        ]);
    }

    #[test]
    fn number_values() {
        assert_normalizations(&def("10"), &[
            (json!(true), None),
            (json!(false), None),
            (json!(10), Some(json!(10))),
            (json!(11), None),
            (json!(""), None),
            (json!([]), None),
            (json!({}), None),
        ]);
    }

    #[test]
    fn number_type() {
        assert_normalizations(&def("number"), &[
            (json!(true), None),
            (json!(false), None),
            (json!(10), Some(json!(10))),
            (json!(11), Some(json!(11))),
            (json!(""), None),
            (json!([]), None),
            (json!({}), None),
        ]);
    }

    #[test]
    fn object_property_existence() {
        assert_normalizations(&def("{ cx cy }"), &[
            (json!(true), None),
            (json!(false), None),
            (json!(10), None),
            (json!(""), None),
            (json!([]), None),
            (json!({}), None),
            (json!({"cx": 10, "cy": 20}), Some(json!({"cx": 10, "cy": 20}))),
            (json!({"cx": 10}), None),
            (json!({"cy": 10}), None),
            (json!({"cx": 10, "cy": 10, "radius": 5}), Some(json!({"cx": 10, "cy": 10}))),
        ]);
    }

    #[test]
    fn object_property_type() {
        assert_normalizations(&def("{ cx: number cy: number }"), &[
            (json!({"cx": 10, "cy": 20}), Some(json!({"cx": 10, "cy": 20}))),
            (json!({"cx": 10, "cy": "20"}), None),
            (json!({"cx": "10", "cy": 20}), None),
            (json!({"cx": "10", "cy": "20"}), None),
        ]);
    }

    #[test]
    fn object_type() {
        assert_normalizations(&def("object"), &[
            (json!(true), None),
            (json!(false), None),
            (json!(10), None),
            (json!(""), None),
            (json!([]), Some(json!([]))),
            (json!({}), Some(json!({}))),
            (json!({"cx": 10, "cy": 20}), Some(json!({"cx": 10, "cy": 20}))),
        ]);
    }

    #[test]
    fn string_values() {
        assert_normalizations(&def(r#""TEST""#), &[
            (json!(true), None),
            (json!(false), None),
            (json!(10), None),
            (json!(""), None),
            (json!("TEST"), Some(json!("TEST"))),
            (json!([]), None),
            (json!({}), None),
        ]);
    }

    #[test]
    fn string_type() {
        assert_normalizations(&def("string"), &[
            (json!(true), None),
            (json!(false), None),
            (json!(10), None),
            (json!(""), Some(json!(""))),
            (json!("TEST"), Some(json!("TEST"))),
            (json!([]), None),
            (json!({}), None),
        ]);
    }
}

mod type_patterns {
    use super::*;

    /// Wrap each case's input and expected value in `{ points: ... }`.
    fn points(cases: &[(Value, Option<Value>)]) -> Vec<(Value, Option<Value>)> {
        cases
            .iter()
            .map(|(input, expected)| {
                (json!({ "points": input }), expected.as_ref().map(|v| json!({ "points": v })))
            })
            .collect()
    }

    #[test]
    fn array_type_pattern() {
        assert_normalizations(&def("{ points: array }"), &points(&[
            (json!(true), None),
            (json!(false), None),
            (json!(10), None),
            (json!(""), None),
            (json!([]), Some(json!([]))),
            (json!({}), None),
        ]));
    }

    #[test]
    fn boolean_type_pattern() {
        assert_normalizations(&def("{ points: boolean }"), &points(&[
            (json!(true), Some(json!(true))),
            (json!(false), Some(json!(false))),
            (json!(10), None),
            (json!(""), None),
            (json!([]), None),
            (json!({}), None),
        ]));
    }

    #[test]
    fn boolean_true_pattern() {
        assert_normalizations(&def("{ points: true }"), &points(&[
            (json!(true), Some(json!(true))),
            (json!(false), None),
            (json!(10), None),
            (json!(""), None),
            (json!([]), None),
            (json!({}), None),
        ]));
    }

    #[test]
    fn boolean_false_pattern() {
        assert_normalizations(&def("{ points: false }"), &points(&[
            (json!(true), None),
            (json!(false), Some(json!(false))),
            (json!(10), None),
            (json!(""), None),
            (json!([]), None),
            (json!({}), None),
        ]));
    }

    #[test]
    fn number_type_pattern() {
        assert_normalizations(&def("{ points: number }"), &points(&[
            (json!(true), None),
            (json!(false), None),
            (json!(10), Some(json!(10))),
            (json!(""), None),
            (json!([]), None),
            (json!({}), None),
        ]));
    }

    #[test]
    fn object_type_pattern() {
        assert_normalizations(&def("{ points: object }"), &points(&[
            (json!(true), None),
            (json!(false), None),
            (json!(10), None),
            (json!(""), None),
            (json!([]), Some(json!([]))),
            (json!({}), Some(json!({}))),
        ]));
    }

    #[test]
    fn string_type_pattern() {
        assert_normalizations(&def("{ points: string }"), &points(&[
            (json!(true), None),
            (json!(false), None),
            (json!(10), None),
            (json!(""), Some(json!(""))),
            (json!([]), None),
            (json!({}), None),
        ]));
    }

    #[test]
    fn nested_pattern_prunes_at_every_level() {
        assert_normalizations(&def("{ center: { x: number y: number } label }"), &[
            (
                json!({"center": {"x": 1, "y": 2, "z": 3}, "label": [1], "extra": true}),
                Some(json!({"center": {"x": 1, "y": 2}, "label": [1]})),
            ),
            (json!({"center": {"x": 1}, "label": "a"}), None),
            (json!({"center": [1, 2], "label": "a"}), None),
        ]);
    }
}

mod registry {
    use super::*;
    use pretty_assertions::assert_eq;
    use shapedef::Error;

    #[test]
    fn unknown_type_name_is_an_error() {
        let normalizer = Normalizer::from_source("type A = string").unwrap();
        assert_eq!(
            normalizer.normalize(&json!("x"), "B"),
            Err(Error::TypeNotFound("B".into()))
        );
    }

    #[test]
    fn definitions_accumulate_over_calls() {
        let mut normalizer = Normalizer::new();
        normalizer.add_definitions_from_source("type A = string").unwrap();
        normalizer.add_definitions_from_source("type B = { a: number }").unwrap();
        assert!(normalizer.normalize(&json!("x"), "A").unwrap().is_normalized());
        assert!(normalizer.normalize(&json!({"a": 1}), "B").unwrap().is_normalized());
    }

    #[test]
    fn input_is_left_untouched() {
        let normalizer = Normalizer::from_source("type T = { a }").unwrap();
        let input = json!({"a": 1, "b": 2});
        let before = input.clone();
        let _ = normalizer.normalize(&input, "T").unwrap();
        assert_eq!(input, before);
    }
}
