//! Ordered record schemas
//!
//! A schema is an ordered list of uniquely named, typed fields. Iteration
//! order is declaration order and is relied upon by the join-key search.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::constant::Constant;

/// Declared type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldType {
    /// 64-bit signed integer
    Int,
    /// String with a maximum length in characters
    Varchar { length: usize },
}

impl FieldType {
    /// Returns true if the constant is a legal value for this type
    pub fn accepts(&self, value: &Constant) -> bool {
        match (self, value) {
            (FieldType::Int, Constant::Int(_)) => true,
            (FieldType::Varchar { length }, Constant::Str(s)) => s.chars().count() <= *length,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Int => "int",
            FieldType::Varchar { .. } => "varchar",
        }
    }
}

/// A named, typed field declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(flatten)]
    pub field_type: FieldType,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// Ordered set of fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldDef>,
}

impl Schema {
    /// Creates an empty schema
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Creates a schema from field declarations, in order.
    ///
    /// Returns the first duplicated name on failure.
    pub fn from_defs(defs: impl IntoIterator<Item = FieldDef>) -> Result<Self, String> {
        let mut schema = Schema::new();
        for def in defs {
            if schema.has_field(&def.name) {
                return Err(def.name);
            }
            schema.fields.push(def);
        }
        Ok(schema)
    }

    /// Appends an integer field
    pub fn add_int_field(&mut self, name: impl Into<String>) {
        self.fields.push(FieldDef::new(name, FieldType::Int));
    }

    /// Appends a string field
    pub fn add_string_field(&mut self, name: impl Into<String>, length: usize) {
        self.fields
            .push(FieldDef::new(name, FieldType::Varchar { length }));
    }

    /// Concatenates two schemas (left fields first).
    ///
    /// Returns the first name present in both on failure.
    pub fn concat(left: &Schema, right: &Schema) -> Result<Schema, String> {
        Schema::from_defs(left.fields.iter().chain(right.fields.iter()).cloned())
    }

    /// Returns a copy with every field renamed to `<table>.<field>`
    pub fn qualified(&self, table: &str) -> Schema {
        Schema {
            fields: self
                .fields
                .iter()
                .map(|f| FieldDef::new(format!("{}.{}", table, f.name), f.field_type))
                .collect(),
        }
    }

    /// Field names in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Field declarations in declaration order
    pub fn field_defs(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Position of the named field
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.field_type)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.fields().collect();
        write!(f, "[{}]", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_order_preserved() {
        let mut schema = Schema::new();
        schema.add_int_field("zeta");
        schema.add_string_field("alpha", 10);
        schema.add_int_field("mid");

        let names: Vec<&str> = schema.fields().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(schema.index_of("mid"), Some(2));
    }

    #[test]
    fn test_qualified_names() {
        let mut schema = Schema::new();
        schema.add_int_field("x");
        let q = schema.qualified("a");

        assert!(q.has_field("a.x"));
        assert!(!q.has_field("x"));
    }

    #[test]
    fn test_concat_rejects_duplicates() {
        let mut left = Schema::new();
        left.add_int_field("a.x");
        let mut right = Schema::new();
        right.add_int_field("a.x");

        assert_eq!(Schema::concat(&left, &right), Err("a.x".to_string()));
    }

    #[test]
    fn test_field_type_accepts() {
        let vc = FieldType::Varchar { length: 3 };
        assert!(vc.accepts(&Constant::string("abc")));
        assert!(!vc.accepts(&Constant::string("abcd")));
        assert!(!vc.accepts(&Constant::int(1)));
        assert!(FieldType::Int.accepts(&Constant::int(1)));
    }

    #[test]
    fn test_field_def_json() {
        let def: FieldDef =
            serde_json::from_str(r#"{"name":"title","type":"varchar","length":20}"#).unwrap();
        assert_eq!(def.field_type, FieldType::Varchar { length: 20 });

        let def: FieldDef = serde_json::from_str(r#"{"name":"id","type":"int"}"#).unwrap();
        assert_eq!(def.field_type, FieldType::Int);
    }
}
