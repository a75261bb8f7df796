use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::IdGenerator;

/// Entity model snapshot consumed by the generator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct EntityModel {
    /// Classes in declaration order.
    pub classes: Vec<Class>,
}

/// A class (entity) of the model.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Class {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Key generation strategy overriding the configured default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_generator: Option<IdGenerator>,
    /// Table name used instead of the class name under verbatim naming.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    /// Laziness overriding the mapping-wide default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lazy: Option<bool>,
}

/// A typed, flagged attribute of a class.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Attribute {
    pub name: String,
    /// Scalar type name, or the name of another class for associations.
    pub type_name: String,
    #[serde(default)]
    pub identity: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub not_null: bool,
    /// Explicit many-to-one target class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub association: Option<String>,
    /// Column name used instead of the attribute name under verbatim naming.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Transient attributes are neither persisted nor mapped.
    #[serde(default)]
    pub transient: bool,
}

impl Class {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            id_generator: None,
            table: None,
            lazy: None,
        }
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Identity attributes in declaration order.
    pub fn identity_attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes
            .iter()
            .filter(|attribute| attribute.identity && !attribute.transient)
    }

    /// Persisted non-identity attributes in declaration order.
    pub fn value_attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes
            .iter()
            .filter(|attribute| !attribute.identity && !attribute.transient)
    }
}

impl Attribute {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            identity: false,
            unique: false,
            not_null: false,
            association: None,
            column: None,
            transient: false,
        }
    }

    pub fn identity(mut self) -> Self {
        self.identity = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    pub fn references(mut self, target: impl Into<String>) -> Self {
        self.association = Some(target.into());
        self
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }
}

impl EntityModel {
    pub fn new(classes: Vec<Class>) -> Self {
        Self { classes }
    }

    /// Look up a class by exact name.
    pub fn class(&self, name: &str) -> Option<&Class> {
        self.classes.iter().find(|class| class.name == name)
    }

    /// Build a name index for repeated lookups.
    pub fn index(&self) -> ModelIndex<'_> {
        let mut classes = BTreeMap::new();
        for class in &self.classes {
            classes.entry(class.name.as_str()).or_insert(class);
        }
        ModelIndex { classes }
    }
}

/// Read-only name lookups into an [`EntityModel`].
#[derive(Debug, Clone)]
pub struct ModelIndex<'a> {
    classes: BTreeMap<&'a str, &'a Class>,
}

impl<'a> ModelIndex<'a> {
    pub fn class(&self, name: &str) -> Option<&'a Class> {
        self.classes.get(name).copied()
    }

    /// Target class name when the attribute is an association.
    ///
    /// An explicit `association` always wins; otherwise the attribute is an
    /// association when its type names a class of the model.
    pub fn association_target<'b>(&self, attribute: &'b Attribute) -> Option<&'b str> {
        match &attribute.association {
            Some(target) => Some(target.as_str()),
            None if self.classes.contains_key(attribute.type_name.as_str()) => {
                Some(attribute.type_name.as_str())
            }
            None => None,
        }
    }

    /// Whether a class produces a table.
    ///
    /// Scalar attributes and identity attributes count; plain associations
    /// alone do not.
    pub fn is_persistent(&self, class: &Class) -> bool {
        class.attributes.iter().any(|attribute| {
            !attribute.transient
                && (attribute.identity || self.association_target(attribute).is_none())
        })
    }
}
