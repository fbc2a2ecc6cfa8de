use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use field_accessor::{
    compiler::{MockCompiledExpression, MockExpressionCompiler},
    context::MockTypeResolver,
    tokenizer::token::{Span, TokenizerError},
    AccessorDescriptor, CompilationContext, CompileError, CompiledExpression, EvalError,
    ExpressionError, TypeHandle, TypeNotFoundError, TypeResolver, Value, ValueKind, ValueKindClassifier,
};

use crate::{ann, context, PERSON, REGISTRY};

/// Treats every result as text.
struct TextClassifier {
    calls: AtomicUsize,
}

impl ValueKindClassifier for TextClassifier {
    fn classify(&self, _ty: &TypeHandle) -> ValueKind {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ValueKind::Text
    }
}

#[test]
fn test_custom_classifier() {
    let classifier = Arc::new(TextClassifier {
        calls: AtomicUsize::new(0),
    });
    let context = context().with_classifier(classifier.clone());

    let mut descriptor = AccessorDescriptor::new(PERSON, "age", true);
    descriptor.compile(&context).unwrap();
    assert_eq!(descriptor.result_kind(), Some(ValueKind::Text));
    assert_eq!(descriptor.result_type(), Some(&TypeHandle::Integer));
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);

    descriptor.compile(&context).unwrap();
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_compiler_failure_discards_previous_artifact() {
    let mut descriptor = AccessorDescriptor::new(PERSON, "name", true);
    descriptor.compile(&context()).unwrap();
    assert_eq!(descriptor.evaluate(&ann()), Ok(Value::from("Ann Lee")));

    let mut compiler = MockExpressionCompiler::new();
    compiler.expect_compile().times(1).returning(|_, _| {
        Err(ExpressionError::Tokenize(TokenizerError::ParseError {
            message: "broken".to_string(),
            found: "?".to_string(),
            span: Span {
                start: 0,
                end: 1,
                line: 1,
                column: 1,
            },
        }))
    });
    let failing = context().with_compiler(Arc::new(compiler));

    assert!(matches!(
        descriptor.compile(&failing),
        Err(CompileError::Expression(ExpressionError::Tokenize(_)))
    ));
    assert_eq!(descriptor.evaluate(&ann()), Err(EvalError::NotCompiled));
}

#[test]
fn test_artifact_errors_pass_through() {
    let mut compiler = MockExpressionCompiler::new();
    compiler.expect_compile().returning(|_, _| {
        let mut artifact = MockCompiledExpression::new();
        artifact.expect_result_type().return_const(TypeHandle::Integer);
        artifact
            .expect_execute()
            .returning(|_| Err(EvalError::DivisionByZero));
        Ok(Arc::new(artifact) as Arc<dyn CompiledExpression>)
    });
    let context = context().with_compiler(Arc::new(compiler));

    let mut descriptor = AccessorDescriptor::new(PERSON, "1 / 0", true);
    descriptor.compile(&context).unwrap();
    assert_eq!(descriptor.result_kind(), Some(ValueKind::Integer));
    assert_eq!(descriptor.evaluate(&ann()), Err(EvalError::DivisionByZero));
    assert_eq!(descriptor.evaluate(&ann()), Err(EvalError::DivisionByZero));
}

#[test]
fn test_resolver_decides_the_input_type() {
    let mut resolver = MockTypeResolver::new();
    resolver
        .expect_resolve()
        .returning(|name| match name {
            "Alias" => Ok(TypeHandle::object(PERSON)),
            other => Err(TypeNotFoundError::new(other)),
        });
    resolver
        .expect_definition()
        .returning(|name| REGISTRY.definition(name));
    let context = CompilationContext::new(Arc::new(resolver));

    let mut descriptor = AccessorDescriptor::new("Alias", "address.city", true);
    descriptor.compile(&context).unwrap();
    assert_eq!(descriptor.evaluate(&ann()), Ok(Value::from("Kyoto")));

    let mut descriptor = AccessorDescriptor::new(PERSON, "name", true);
    assert_eq!(
        descriptor.compile(&context),
        Err(CompileError::TypeNotFound {
            name: PERSON.to_string()
        })
    );
}
