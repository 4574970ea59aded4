//! Entity and method descriptors
//!
//! Produced by the metadata extractor and handed to the engine read-only.
//! Field order is significant: every placeholder that lists fields emits
//! them in declaration order.

use serde::{Deserialize, Serialize};

use crate::dialect::SemanticType;
use crate::naming::to_snake_case;

/// One mapped field of an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub semantic_type: SemanticType,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default)]
    pub is_nullable: bool,
}

impl FieldDescriptor {
    /// Create a new non-key, non-nullable field
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            semantic_type,
            is_primary_key: false,
            is_nullable: false,
        }
    }

    /// Mark field as primary key
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    /// Mark field as nullable
    pub fn nullable(mut self) -> Self {
        self.is_nullable = true;
        self
    }

    /// SQL column name (snake_case of the member name)
    pub fn column_name(&self) -> String {
        to_snake_case(&self.name)
    }

    /// Whether `name` refers to this field, either by member name
    /// (case-insensitive) or by column name
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name) || self.column_name() == to_snake_case(name)
    }
}

/// Ordered field metadata of a mapped record type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

impl EntityDescriptor {
    /// Create an entity without fields
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Parse an entity descriptor from the metadata extractor's JSON output
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Find a field by member or column name
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.matches(name))
    }

    /// Primary key fields in declaration order
    pub fn primary_keys(&self) -> Vec<&FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_primary_key).collect()
    }
}

/// One parameter of the calling method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    pub semantic_type: SemanticType,
}

impl ParameterDescriptor {
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            semantic_type,
        }
    }
}

/// Ordered parameter metadata of the method a template belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<ParameterDescriptor>,
}

impl MethodDescriptor {
    /// Create a method without parameters
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
        }
    }

    /// Append a parameter
    pub fn with_parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Parse a method descriptor from the metadata extractor's JSON output
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Find a parameter by exact name
    pub fn parameter(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.parameters.iter().find(|p| p.name == name)
    }
}
