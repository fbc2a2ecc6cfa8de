use field_accessor::{
    analyzer::ParseError, type_checker::TypeCheckError, AccessorDescriptor, CompileError, EvalError, ExpressionError,
    Object, TypeHandle, Value, ValueKind,
};
use pretty_assertions::assert_eq;

use crate::{ann, context, person, ADDRESS, PERSON, REGISTRY};

fn compiled(expression: &str, strict: bool) -> AccessorDescriptor {
    let mut descriptor = AccessorDescriptor::new(PERSON, expression, strict);
    descriptor.compile(&context()).unwrap();
    descriptor
}

#[test]
fn test_simple_field() {
    let descriptor = compiled("name", true);
    assert_eq!(descriptor.result_kind(), Some(ValueKind::Text));
    assert_eq!(
        descriptor.evaluate(&Value::from(person("Ann", 30))),
        Ok(Value::from("Ann"))
    );
}

#[test]
fn test_arithmetic() {
    let descriptor = compiled("age + 1", true);
    assert_eq!(descriptor.result_kind(), Some(ValueKind::Integer));
    assert_eq!(
        descriptor.evaluate(&Value::from(person("Ann", 30))),
        Ok(Value::Integer(31))
    );
}

#[test]
fn test_null_intermediate() {
    let descriptor = compiled("address.city", true);
    assert_eq!(descriptor.result_kind(), Some(ValueKind::Text));
    assert_eq!(
        descriptor.evaluate(&Value::from(person("Bob", 40))),
        Err(EvalError::NullDereference {
            member: "city".to_string()
        })
    );
    assert_eq!(descriptor.evaluate(&ann()), Ok(Value::from("Kyoto")));
}

#[test]
fn test_unknown_type() {
    let mut descriptor = AccessorDescriptor::new("com.none.NoSuchType", "name", true);
    assert_eq!(
        descriptor.compile(&context()),
        Err(CompileError::TypeNotFound {
            name: "com.none.NoSuchType".to_string()
        })
    );
    assert!(!descriptor.is_compiled());
    assert_eq!(
        descriptor,
        AccessorDescriptor::new("com.none.NoSuchType", "name", true)
    );
}

#[test]
fn test_uncompiled_evaluate() {
    let descriptor = AccessorDescriptor::new(PERSON, "name", true);
    for instance in [Value::Null, ann(), Value::Integer(1), Value::from("x")] {
        assert_eq!(descriptor.evaluate(&instance), Err(EvalError::NotCompiled));
    }
}

#[test]
fn test_recompile_is_idempotent() {
    let mut descriptor = AccessorDescriptor::new(PERSON, "tags.size() * 2", true);
    descriptor.compile(&context()).unwrap();
    let first = (
        descriptor.result_kind(),
        descriptor.result_type().cloned(),
        descriptor.evaluate(&ann()),
    );
    descriptor.compile(&context()).unwrap();
    let second = (
        descriptor.result_kind(),
        descriptor.result_type().cloned(),
        descriptor.evaluate(&ann()),
    );
    assert_eq!(first, second);
    assert_eq!(first.2, Ok(Value::Integer(4)));
}

#[test]
fn test_failed_compile_is_contained() {
    let mut descriptor = AccessorDescriptor::new(PERSON, "age +", true);
    assert!(matches!(
        descriptor.compile(&context()),
        Err(CompileError::Expression(ExpressionError::Parse(_)))
    ));
    assert_eq!(descriptor.evaluate(&ann()), Err(EvalError::NotCompiled));
}

#[test]
fn test_short_type_name_through_imports() {
    let mut descriptor = AccessorDescriptor::new("Person", "initials()", true);
    descriptor.compile(&context()).unwrap();
    assert_eq!(descriptor.evaluate(&ann()), Ok(Value::from("AL")));
}

#[test]
fn test_instance_of_wrong_type() {
    let descriptor = compiled("name", true);
    assert!(matches!(
        descriptor.evaluate(&Value::from(Object::new(ADDRESS))),
        Err(EvalError::TypeMismatch { .. })
    ));
    assert!(matches!(
        descriptor.evaluate(&Value::Null),
        Err(EvalError::TypeMismatch { .. })
    ));
}

#[test]
fn test_field_values_of_the_wrong_type() {
    let descriptor = compiled("age + 1", true);
    assert_eq!(descriptor.result_kind(), Some(ValueKind::Integer));
    let instance = Value::from(Object::new(PERSON).with("age", "x"));
    assert_eq!(
        descriptor.evaluate(&instance),
        Err(EvalError::TypeMismatch {
            expected: "Integer".to_string(),
            found: "Text".to_string()
        })
    );

    let descriptor = compiled("name", true);
    assert_eq!(descriptor.result_kind(), Some(ValueKind::Text));
    let instance = Value::from(Object::new(PERSON).with("name", 5));
    assert_eq!(
        descriptor.evaluate(&instance),
        Err(EvalError::TypeMismatch {
            expected: "Text".to_string(),
            found: "Integer".to_string()
        })
    );

    let descriptor = compiled("height", true);
    assert_eq!(descriptor.result_kind(), Some(ValueKind::Float));
    let instance = Value::from(person("Ann", 30).with("height", 2));
    assert_eq!(descriptor.evaluate(&instance), Ok(Value::Float(2.0)));
}

#[test]
fn test_deeply_nested_expression() {
    let expression = format!("{}age{}", "(".repeat(300), ")".repeat(300));
    let mut descriptor = AccessorDescriptor::new(PERSON, expression, true);
    assert!(matches!(
        descriptor.compile(&context()),
        Err(CompileError::Expression(ExpressionError::Parse(
            ParseError::TooDeep { .. }
        )))
    ));
    assert!(!descriptor.is_compiled());

    let chain = vec!["age"; 500].join(" + ");
    let mut descriptor = AccessorDescriptor::new(PERSON, chain, true);
    assert!(matches!(
        descriptor.compile(&context()),
        Err(CompileError::Expression(ExpressionError::Parse(
            ParseError::TooDeep { .. }
        )))
    ));

    let descriptor = compiled("((((age))) + (1))", true);
    assert_eq!(descriptor.evaluate(&ann()), Ok(Value::Integer(31)));
}

#[test]
fn test_strict_and_lenient_typing() {
    let mut strict = AccessorDescriptor::new(PERSON, "address.street", true);
    assert!(matches!(
        strict.compile(&context()),
        Err(CompileError::Expression(ExpressionError::TypeCheck(
            TypeCheckError::UnknownMember { .. }
        )))
    ));

    let lenient = compiled("address.street", false);
    assert_eq!(lenient.result_kind(), Some(ValueKind::Object));
    assert_eq!(
        lenient.evaluate(&ann()),
        Err(EvalError::UnknownProperty {
            type_name: ADDRESS.to_string(),
            property: "street".to_string()
        })
    );

    let lenient = compiled("extra.level > 2", false);
    let instance = Value::from(person("Cy", 20).with("extra", Object::new(ADDRESS)));
    assert!(matches!(
        lenient.evaluate(&instance),
        Err(EvalError::UnknownProperty { .. })
    ));
}

#[test]
fn test_expression_features() {
    let instance = Value::from(
        person("Ann Lee", 30)
            .with("height", 1.5)
            .with("address", Object::new(ADDRESS).with("city", "Kyoto"))
            .with("tags", vec!["admin", "ops"])
            .with("scores", Value::Map(Default::default())),
    );
    let cases = [
        ("age >= 18 ? 'adult' : 'minor'", Value::from("adult")),
        ("name.toUpperCase()", Value::from("ANN LEE")),
        ("tags[0] + '/' + tags[1]", Value::from("admin/ops")),
        ("tags.contains('ops') && !tags.isEmpty()", Value::Boolean(true)),
        ("height * 100", Value::Float(150.0)),
        ("address.zip == null", Value::Boolean(true)),
        ("scores.size()", Value::Integer(0)),
        ("scores.missing", Value::Null),
    ];
    for (expression, expected) in cases {
        let descriptor = compiled(expression, true);
        assert_eq!(descriptor.evaluate(&instance), Ok(expected), "{}", expression);
    }
}

#[test]
fn test_class_literals() {
    let descriptor = compiled("Person.Role.class", true);
    assert_eq!(descriptor.result_kind(), Some(ValueKind::ClassLiteral));
    assert_eq!(
        descriptor.evaluate(&ann()),
        Ok(Value::Class(TypeHandle::object("com.acme.Person$Role")))
    );
}

#[test]
fn test_instances_from_json() {
    let descriptor = compiled("address.city.length()", true);
    let json = serde_json::json!({"name": "Dee", "age": 51, "address": {"city": "Osaka"}});
    let ty = TypeHandle::object(PERSON);
    let instance = Value::from_json(&json, &ty, &**REGISTRY).unwrap();
    assert_eq!(descriptor.evaluate(&instance), Ok(Value::Integer(5)));
}
