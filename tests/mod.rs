mod accessor_tests;

use std::sync::Arc;

use field_accessor::{
    CompilationContext, MethodDef, Object, ParserConfiguration, TypeDef, TypeHandle, TypeRegistry,
    Value,
};
use lazy_static::lazy_static;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[ctor::ctor]
fn init_tests() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

pub const PERSON: &str = "com.acme.Person";
pub const ADDRESS: &str = "com.acme.Address";

lazy_static! {
    pub static ref REGISTRY: Arc<TypeRegistry> = {
        let registry = TypeRegistry::new();
        registry.register(
            TypeDef::new(PERSON)
                .with_field("name", TypeHandle::Text)
                .with_field("age", TypeHandle::Integer)
                .with_field("height", TypeHandle::Float)
                .with_field("address", TypeHandle::object(ADDRESS))
                .with_field("tags", TypeHandle::list(TypeHandle::Text))
                .with_field("scores", TypeHandle::map(TypeHandle::Integer))
                .with_field("extra", TypeHandle::Any)
                .with_method(MethodDef::new(
                    "initials",
                    vec![],
                    TypeHandle::Text,
                    |person, _| match person.get("name") {
                        Some(Value::Text(name)) => Ok(Value::Text(
                            name.split_whitespace()
                                .filter_map(|part| part.chars().next())
                                .collect(),
                        )),
                        _ => Ok(Value::Null),
                    },
                )),
        );
        registry.register(
            TypeDef::new(ADDRESS)
                .with_field("city", TypeHandle::Text)
                .with_field("zip", TypeHandle::Text),
        );
        registry.register(TypeDef::new("com.acme.Person$Role").with_field("title", TypeHandle::Text));
        Arc::new(registry)
    };
}

pub fn context() -> CompilationContext {
    let mut parser_config = ParserConfiguration::default();
    parser_config.add_import(PERSON);
    CompilationContext::new(REGISTRY.clone()).with_parser_config(parser_config)
}

pub fn person(name: &str, age: i64) -> Object {
    Object::new(PERSON).with("name", name).with("age", age)
}

pub fn ann() -> Value {
    Value::from(
        person("Ann Lee", 30)
            .with("height", 1.62)
            .with("address", Object::new(ADDRESS).with("city", "Kyoto"))
            .with("tags", vec!["admin", "ops"]),
    )
}
