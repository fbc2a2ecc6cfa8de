//! # Static Type Model
//!
//! [`TypeHandle`] is the statically known type of an expression or a field. Object types are
//! referenced by their fully qualified name; their members live in a [`TypeDef`] that a
//! [`TypeResolver`](crate::context::TypeResolver) hands out on demand, which keeps handles cheap to
//! compare and lets definitions refer to each other recursively.
//!
//! Type references can be written as strings (`Integer`, `List<Text>`, `com.acme.Address`) and
//! are parsed with nom; this is also their serde representation.

use std::{fmt, str::FromStr, sync::Arc};

use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, multispace0},
    combinator::{all_consuming, map_res, opt, recognize},
    error::{context, VerboseError},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded},
    IResult,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum_macros::EnumString;
use thiserror::Error;

use crate::eval::EvalResult;
use crate::value::{Object, Value};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeHandle {
    Boolean,
    Integer,
    Float,
    Text,
    List(Box<TypeHandle>),
    /// Text-keyed map
    Map(Box<TypeHandle>),
    /// Fully qualified object type name
    Object(String),
    /// Type of a class literal (`Person.class`)
    Class,
    Any,
    Null,
}

/// Names accepted for the non-object types, including the usual host-language spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
enum BuiltinType {
    #[strum(serialize = "Boolean", serialize = "boolean", serialize = "bool")]
    Boolean,
    #[strum(serialize = "Integer", serialize = "Int", serialize = "int", serialize = "long")]
    Integer,
    #[strum(serialize = "Float", serialize = "Double", serialize = "float", serialize = "double")]
    Float,
    #[strum(serialize = "Text", serialize = "String", serialize = "string")]
    Text,
    #[strum(serialize = "Class")]
    Class,
    #[strum(serialize = "Any", serialize = "Object")]
    Any,
    #[strum(serialize = "Null")]
    Null,
    #[strum(serialize = "List")]
    List,
    #[strum(serialize = "Map")]
    Map,
}

impl BuiltinType {
    fn handle(self) -> TypeHandle {
        match self {
            BuiltinType::Boolean => TypeHandle::Boolean,
            BuiltinType::Integer => TypeHandle::Integer,
            BuiltinType::Float => TypeHandle::Float,
            BuiltinType::Text => TypeHandle::Text,
            BuiltinType::Class => TypeHandle::Class,
            BuiltinType::Any => TypeHandle::Any,
            BuiltinType::Null => TypeHandle::Null,
            BuiltinType::List => TypeHandle::List(Box::new(TypeHandle::Any)),
            BuiltinType::Map => TypeHandle::Map(Box::new(TypeHandle::Any)),
        }
    }
}

impl TypeHandle {
    pub fn object(name: impl Into<String>) -> Self {
        TypeHandle::Object(name.into())
    }

    pub fn list(element: TypeHandle) -> Self {
        TypeHandle::List(Box::new(element))
    }

    pub fn map(value: TypeHandle) -> Self {
        TypeHandle::Map(Box::new(value))
    }

    /// Resolves a built-in type name (`Integer`, `String`, `List`, ...).
    pub fn builtin(name: &str) -> Option<TypeHandle> {
        BuiltinType::from_str(name).ok().map(BuiltinType::handle)
    }

    pub fn object_name(&self) -> Option<&str> {
        match self {
            TypeHandle::Object(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, TypeHandle::Integer | TypeHandle::Float)
    }

    pub fn is_any(&self) -> bool {
        matches!(self, TypeHandle::Any)
    }

    /// Types whose values may be `null`.
    pub fn is_nullable(&self) -> bool {
        !matches!(
            self,
            TypeHandle::Boolean | TypeHandle::Integer | TypeHandle::Float
        )
    }

    /// Whether a value statically typed `other` may be used where `self` is expected.
    pub fn is_assignable_from(&self, other: &TypeHandle) -> bool {
        match (self, other) {
            (TypeHandle::Any, _) => true,
            (expected, TypeHandle::Null) => expected.is_nullable(),
            (TypeHandle::Float, TypeHandle::Integer) => true,
            (TypeHandle::List(expected), TypeHandle::List(found))
            | (TypeHandle::Map(expected), TypeHandle::Map(found)) => {
                expected.is_assignable_from(found)
            }
            (expected, found) => expected == found,
        }
    }

    /// Common type of two branches; `Any` when they have nothing in common.
    pub fn unify(&self, other: &TypeHandle) -> TypeHandle {
        match (self, other) {
            (a, b) if a == b => a.clone(),
            (TypeHandle::Null, t) | (t, TypeHandle::Null) if t.is_nullable() => t.clone(),
            (a, b) if a.is_numeric() && b.is_numeric() => TypeHandle::Float,
            _ => TypeHandle::Any,
        }
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeHandle::Boolean => write!(f, "Boolean"),
            TypeHandle::Integer => write!(f, "Integer"),
            TypeHandle::Float => write!(f, "Float"),
            TypeHandle::Text => write!(f, "Text"),
            TypeHandle::List(element) => write!(f, "List<{}>", element),
            TypeHandle::Map(value) => write!(f, "Map<{}>", value),
            TypeHandle::Object(name) => write!(f, "{}", name),
            TypeHandle::Class => write!(f, "Class"),
            TypeHandle::Any => write!(f, "Any"),
            TypeHandle::Null => write!(f, "Null"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid type reference '{input}': {message}")]
pub struct TypeParseError {
    pub input: String,
    pub message: String,
}

impl FromStr for TypeHandle {
    type Err = TypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        all_consuming(delimited(multispace0, parse_type_ref, multispace0))(s)
            .map(|(_, ty)| ty)
            .map_err(|e| TypeParseError {
                input: s.to_string(),
                message: match e {
                    nom::Err::Incomplete(_) => "incomplete type reference".to_string(),
                    nom::Err::Error(e) | nom::Err::Failure(e) => nom::error::convert_error(s, e),
                },
            })
    }
}

impl Serialize for TypeHandle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypeHandle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

type ParserResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

fn parse_segment(input: &str) -> ParserResult<&str> {
    recognize(pair(
        take_while1(|c: char| c.is_alphabetic() || c == '_'),
        take_while(|c: char| c.is_alphanumeric() || c == '_'),
    ))(input)
}

fn parse_qualified_name(input: &str) -> ParserResult<&str> {
    context(
        "qualified name",
        recognize(pair(
            parse_segment,
            many0(pair(alt((char('.'), char('$'))), parse_segment)),
        )),
    )(input)
}

fn parse_type_arguments(input: &str) -> ParserResult<Vec<TypeHandle>> {
    context(
        "type arguments",
        delimited(
            preceded(multispace0, char('<')),
            separated_list1(
                preceded(multispace0, char(',')),
                preceded(multispace0, parse_type_ref),
            ),
            preceded(multispace0, char('>')),
        ),
    )(input)
}

fn parse_type_ref(input: &str) -> ParserResult<TypeHandle> {
    context(
        "type reference",
        map_res(
            pair(parse_qualified_name, opt(parse_type_arguments)),
            |(name, arguments)| build_type(name, arguments),
        ),
    )(input)
}

fn build_type(name: &str, arguments: Option<Vec<TypeHandle>>) -> Result<TypeHandle, String> {
    let builtin = BuiltinType::from_str(name).ok();
    match (builtin, arguments) {
        (Some(builtin), None) => Ok(builtin.handle()),
        (None, None) => Ok(TypeHandle::Object(name.to_string())),
        (Some(BuiltinType::List), Some(mut args)) if args.len() == 1 => {
            Ok(TypeHandle::list(args.remove(0)))
        }
        (Some(BuiltinType::Map), Some(mut args)) if args.len() == 1 => {
            Ok(TypeHandle::map(args.remove(0)))
        }
        (Some(BuiltinType::Map), Some(mut args))
            if args.len() == 2 && args[0] == TypeHandle::Text =>
        {
            Ok(TypeHandle::map(args.remove(1)))
        }
        (_, Some(args)) => Err(format!(
            "{} does not take {} type argument(s)",
            name,
            args.len()
        )),
    }
}

pub type NativeMethod = Arc<dyn Fn(&Object, &[Value]) -> EvalResult<Value> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeHandle,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: TypeHandle) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A method implemented natively by the host and callable from expressions.
#[derive(Clone)]
pub struct MethodDef {
    name: String,
    params: Vec<TypeHandle>,
    returns: TypeHandle,
    body: NativeMethod,
}

impl MethodDef {
    pub fn new<F>(name: impl Into<String>, params: Vec<TypeHandle>, returns: TypeHandle, body: F) -> Self
    where
        F: Fn(&Object, &[Value]) -> EvalResult<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            params,
            returns,
            body: Arc::new(body),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[TypeHandle] {
        &self.params
    }

    pub fn returns(&self) -> &TypeHandle {
        &self.returns
    }

    pub fn invoke(&self, receiver: &Object, args: &[Value]) -> EvalResult<Value> {
        (self.body)(receiver, args)
    }
}

impl fmt::Debug for MethodDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDef")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .finish()
    }
}

/// Member layout of an object type.
#[derive(Debug, Clone)]
pub struct TypeDef {
    name: String,
    fields: Vec<FieldDef>,
    methods: Vec<MethodDef>,
}

impl TypeDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, ty: TypeHandle) -> Self {
        self.fields.push(FieldDef::new(name, ty));
        self
    }

    pub fn with_method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> TypeHandle {
        TypeHandle::Object(self.name.clone())
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&MethodDef> {
        self.methods.iter().find(|m| m.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_builtin_types() {
        assert_eq!("Integer".parse::<TypeHandle>().unwrap(), TypeHandle::Integer);
        assert_eq!("int".parse::<TypeHandle>().unwrap(), TypeHandle::Integer);
        assert_eq!("String".parse::<TypeHandle>().unwrap(), TypeHandle::Text);
        assert_eq!("double".parse::<TypeHandle>().unwrap(), TypeHandle::Float);
        assert_eq!("List".parse::<TypeHandle>().unwrap(), TypeHandle::list(TypeHandle::Any));
    }

    #[test]
    fn test_parse_generic_and_object_types() {
        assert_eq!(
            " List< Map<String, Integer> > ".parse::<TypeHandle>().unwrap(),
            TypeHandle::list(TypeHandle::map(TypeHandle::Integer))
        );
        assert_eq!(
            "com.acme.Person$Address".parse::<TypeHandle>().unwrap(),
            TypeHandle::object("com.acme.Person$Address")
        );
    }

    #[test]
    fn test_parse_invalid_types() {
        assert!("List<Text, Text>".parse::<TypeHandle>().is_err());
        assert!("Map<Integer, Text>".parse::<TypeHandle>().is_err());
        assert!("Integer<Text>".parse::<TypeHandle>().is_err());
        assert!("com..acme".parse::<TypeHandle>().is_err());
        assert!("".parse::<TypeHandle>().is_err());
    }

    #[test]
    fn test_display_parses_back() {
        let ty = TypeHandle::map(TypeHandle::list(TypeHandle::object("com.acme.Person")));
        assert_eq!(ty.to_string(), "Map<List<com.acme.Person>>");
        assert_eq!(ty.to_string().parse::<TypeHandle>().unwrap(), ty);
    }

    #[test]
    fn test_assignability() {
        assert!(TypeHandle::Float.is_assignable_from(&TypeHandle::Integer));
        assert!(!TypeHandle::Integer.is_assignable_from(&TypeHandle::Float));
        assert!(TypeHandle::Text.is_assignable_from(&TypeHandle::Null));
        assert!(!TypeHandle::Boolean.is_assignable_from(&TypeHandle::Null));
        assert!(TypeHandle::Any.is_assignable_from(&TypeHandle::object("x.Y")));
        assert!(TypeHandle::list(TypeHandle::Float)
            .is_assignable_from(&TypeHandle::list(TypeHandle::Integer)));
    }

    #[test]
    fn test_unify() {
        assert_eq!(TypeHandle::Integer.unify(&TypeHandle::Float), TypeHandle::Float);
        assert_eq!(TypeHandle::Null.unify(&TypeHandle::Text), TypeHandle::Text);
        assert_eq!(TypeHandle::Null.unify(&TypeHandle::Integer), TypeHandle::Any);
        assert_eq!(TypeHandle::Text.unify(&TypeHandle::Boolean), TypeHandle::Any);
    }

    #[test]
    fn test_field_def_serde() {
        let field: FieldDef =
            serde_json::from_str(r#"{"name": "tags", "type": "List<String>"}"#).unwrap();
        assert_eq!(field, FieldDef::new("tags", TypeHandle::list(TypeHandle::Text)));
    }
}
