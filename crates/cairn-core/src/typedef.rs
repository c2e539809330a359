//! Type definitions for the open type system
//!
//! The repository reports its own category codes; these convert into the
//! closed set of shapes the catalog understands with exhaustive matches.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Shape of a type definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeDefCategory {
    Entity,
    Relationship,
    Classification,
}

/// Category codes as a repository reports them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepositoryTypeDefCategory {
    #[serde(rename = "ENTITY_DEF")]
    EntityDef,
    #[serde(rename = "RELATIONSHIP_DEF")]
    RelationshipDef,
    #[serde(rename = "CLASSIFICATION_DEF")]
    ClassificationDef,
    #[serde(rename = "UNKNOWN_DEF")]
    Unknown,
}

impl TryFrom<RepositoryTypeDefCategory> for TypeDefCategory {
    type Error = Error;

    fn try_from(category: RepositoryTypeDefCategory) -> Result<Self> {
        match category {
            RepositoryTypeDefCategory::EntityDef => Ok(Self::Entity),
            RepositoryTypeDefCategory::RelationshipDef => Ok(Self::Relationship),
            RepositoryTypeDefCategory::ClassificationDef => Ok(Self::Classification),
            RepositoryTypeDefCategory::Unknown => Err(Error::invalid_parameter(
                "typeDefCategory",
                "repository returned an unknown type category",
            )),
        }
    }
}

impl From<TypeDefCategory> for RepositoryTypeDefCategory {
    fn from(category: TypeDefCategory) -> Self {
        match category {
            TypeDefCategory::Entity => Self::EntityDef,
            TypeDefCategory::Relationship => Self::RelationshipDef,
            TypeDefCategory::Classification => Self::ClassificationDef,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Boolean,
    Integer,
    Float,
    String,
    Date,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Array,
    Map,
}

/// Type of a single attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "category")]
pub enum AttributeType {
    Primitive { kind: PrimitiveKind },
    Collection { kind: CollectionKind },
    Enum { values: Vec<String> },
}

impl AttributeType {
    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self::Primitive { kind }
    }

    /// Whether a value's shape fits this attribute type
    pub fn accepts(&self, value: &serde_json::Value) -> bool {
        match self {
            Self::Enum { values } => value
                .as_str()
                .map(|s| values.iter().any(|v| v == s))
                .unwrap_or(false),
            Self::Primitive {
                kind: PrimitiveKind::Date,
            } => value.is_string() || value.is_i64(),
            Self::Primitive {
                kind: PrimitiveKind::Float,
            } => value.is_number(),
            other => classify_value(value) == *other,
        }
    }
}

/// Category of a property value
pub fn classify_value(value: &serde_json::Value) -> AttributeType {
    use serde_json::Value;

    match value {
        Value::Bool(_) => AttributeType::primitive(PrimitiveKind::Boolean),
        Value::Number(n) if n.is_f64() => AttributeType::primitive(PrimitiveKind::Float),
        Value::Number(_) => AttributeType::primitive(PrimitiveKind::Integer),
        Value::String(_) => AttributeType::primitive(PrimitiveKind::String),
        Value::Array(_) => AttributeType::Collection {
            kind: CollectionKind::Array,
        },
        Value::Object(_) => AttributeType::Collection {
            kind: CollectionKind::Map,
        },
        Value::Null => AttributeType::primitive(PrimitiveKind::Unknown),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDef {
    pub name: String,
    pub attribute_type: AttributeType,
}

/// A named type in the open type system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDef {
    pub name: String,
    pub category: TypeDefCategory,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub super_type: Option<String>,

    #[serde(default)]
    pub attributes: Vec<AttributeDef>,
}

impl TypeDef {
    pub fn new(name: impl Into<String>, category: TypeDefCategory) -> Self {
        Self {
            name: name.into(),
            category,
            super_type: None,
            attributes: Vec::new(),
        }
    }

    pub fn entity(name: impl Into<String>) -> Self {
        Self::new(name, TypeDefCategory::Entity)
    }

    pub fn relationship(name: impl Into<String>) -> Self {
        Self::new(name, TypeDefCategory::Relationship)
    }

    pub fn classification(name: impl Into<String>) -> Self {
        Self::new(name, TypeDefCategory::Classification)
    }

    pub fn with_super_type(mut self, super_type: impl Into<String>) -> Self {
        self.super_type = Some(super_type.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, attribute_type: AttributeType) -> Self {
        self.attributes.push(AttributeDef {
            name: name.into(),
            attribute_type,
        });
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_conversion() {
        assert_eq!(
            TypeDefCategory::try_from(RepositoryTypeDefCategory::EntityDef).unwrap(),
            TypeDefCategory::Entity
        );
        assert_eq!(
            TypeDefCategory::try_from(RepositoryTypeDefCategory::ClassificationDef).unwrap(),
            TypeDefCategory::Classification
        );
        assert!(TypeDefCategory::try_from(RepositoryTypeDefCategory::Unknown).is_err());
        assert_eq!(
            RepositoryTypeDefCategory::from(TypeDefCategory::Relationship),
            RepositoryTypeDefCategory::RelationshipDef
        );
    }

    #[test]
    fn test_classify_value() {
        assert_eq!(classify_value(&json!(true)), AttributeType::primitive(PrimitiveKind::Boolean));
        assert_eq!(classify_value(&json!(3)), AttributeType::primitive(PrimitiveKind::Integer));
        assert_eq!(classify_value(&json!(3.5)), AttributeType::primitive(PrimitiveKind::Float));
        assert_eq!(
            classify_value(&json!({"k": "v"})),
            AttributeType::Collection {
                kind: CollectionKind::Map
            }
        );
    }

    #[test]
    fn test_attribute_accepts() {
        let status = AttributeType::Enum {
            values: vec!["ACTIVE".to_string(), "DRAFT".to_string()],
        };
        assert!(status.accepts(&json!("ACTIVE")));
        assert!(!status.accepts(&json!("GONE")));
        assert!(!status.accepts(&json!(1)));

        let float = AttributeType::primitive(PrimitiveKind::Float);
        assert!(float.accepts(&json!(2)));
        assert!(AttributeType::primitive(PrimitiveKind::String).accepts(&json!("x")));
    }

    #[test]
    fn test_typedef_builder() {
        let def = TypeDef::entity("DataFile")
            .with_super_type("Asset")
            .with_attribute("pathName", AttributeType::primitive(PrimitiveKind::String));

        assert_eq!(def.category, TypeDefCategory::Entity);
        assert_eq!(def.super_type.as_deref(), Some("Asset"));
        assert!(def.attribute("pathName").is_some());
        assert!(def.attribute("owner").is_none());
    }
}
