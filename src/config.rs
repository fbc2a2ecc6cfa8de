use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs::File, io::BufReader, path::Path};

use crate::{
    types::{FieldDef, TypeDef},
    Error, InternalResult,
};

/// Compiler feature toggles for one compilation.
///
/// Built fresh for every compile call and passed by value; there is no process-wide copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompilerOptions {
    /// `size()` means `this.size()`.
    #[serde(default)]
    pub allow_bare_method_calls: bool,
    /// `map.key` reads the entry `key` of a map.
    #[serde(default)]
    pub allow_override_all_property_handling: bool,
    /// `a.Outer.Inner` may name the nested type `a.Outer$Inner`.
    #[serde(default)]
    pub allow_resolve_inner_classes_via_dot_notation: bool,
    /// `Person.class` is a class literal.
    #[serde(default)]
    pub support_java_style_class_literals: bool,
    /// Reject anything that cannot be checked statically.
    #[serde(default)]
    pub strong_typing: bool,
}

impl CompilerOptions {
    /// The option set accessor descriptors compile with.
    pub fn for_accessor(strong_typing: bool) -> Self {
        Self {
            allow_bare_method_calls: true,
            allow_override_all_property_handling: true,
            allow_resolve_inner_classes_via_dot_notation: true,
            support_java_style_class_literals: true,
            strong_typing,
        }
    }
}

/// Parser settings shared by every expression compiled in a context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParserConfiguration {
    /// Short name → fully qualified type name
    #[serde(default)]
    imports: HashMap<String, String>,
}

impl ParserConfiguration {
    /// Imports `qualified` under its simple name (the part after the last `.` or `$`).
    pub fn add_import(&mut self, qualified: &str) {
        let short = qualified
            .rsplit(['.', '$'])
            .next()
            .unwrap_or(qualified)
            .to_string();
        self.add_import_as(&short, qualified);
    }

    pub fn add_import_as(&mut self, short: &str, qualified: &str) {
        self.imports.insert(short.to_string(), qualified.to_string());
    }

    pub fn import(&self, short: &str) -> Option<&str> {
        self.imports.get(short).map(String::as_str)
    }

    pub fn imports(&self) -> &HashMap<String, String> {
        &self.imports
    }

    /// Expands an imported leading segment: `Person.Address` → `com.acme.Person.Address`.
    pub fn qualify(&self, name: &str) -> String {
        let (head, rest) = match name.find('.') {
            Some(pos) => name.split_at(pos),
            None => (name, ""),
        };
        match self.import(head) {
            Some(qualified) => format!("{}{}", qualified, rest),
            None => name.to_string(),
        }
    }
}

/// Serializable form of an object type, as found in configuration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl From<TypeDefinition> for TypeDef {
    fn from(definition: TypeDefinition) -> Self {
        definition
            .fields
            .into_iter()
            .fold(TypeDef::new(definition.name), |ty, field| {
                ty.with_field(field.name, field.ty)
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilerConfig {
    #[serde(default)]
    pub parser: ParserConfiguration,

    #[serde(default)]
    pub types: Vec<TypeDefinition>,
}

impl CompilerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> InternalResult<Self> {
        from_file(path)
    }

    pub fn from_json(content: &str) -> InternalResult<Self> {
        serde_json::from_str(content).map_err(Error::from)
    }
}

pub fn from_file<P: AsRef<Path>>(path: P) -> InternalResult<CompilerConfig> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let config = serde_json::from_reader(reader)?;
    Ok(config)
}
