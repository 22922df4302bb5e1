//! Persisted representation of configuration objects
//!
//! Documents keep part ids so that references held by other tools survive a
//! save/load cycle. Property values written before template value statuses
//! existed carry no status and read as `DEFINED`.

use crate::error::PersistError;
use chrono::NaiveDate;
use pcfg_model::{
    Cardinality, ConfigurationObject, Generation, Link, PartId, PropertyValue,
    PropertyValueContent, QualifiedName, TemplateValueStatus, ValueContainer,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_true() -> bool {
    true
}

fn is_defined(status: &TemplateValueStatus) -> bool {
    *status == TemplateValueStatus::Defined
}

/// Encoding of a document file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// `.json`
    #[default]
    Json,
    /// `.yaml` or `.yml`
    Yaml,
}

impl DocumentFormat {
    /// Format named by the file extension
    ///
    /// # Errors
    /// Returns error for other extensions
    pub fn from_path(path: &Path) -> Result<Self, PersistError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => Err(PersistError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Check if a path carries a document extension
    #[must_use]
    pub fn is_document(path: &Path) -> bool {
        Self::from_path(path).is_ok()
    }

    /// File extension written for this format
    #[inline]
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }

    /// Decode a value
    ///
    /// # Errors
    /// Returns error if the text is not valid in this format
    pub fn decode<T: DeserializeOwned>(self, text: &str) -> Result<T, PersistError> {
        Ok(match self {
            Self::Json => serde_json::from_str(text)?,
            Self::Yaml => serde_yaml::from_str(text)?,
        })
    }

    /// Encode a value
    ///
    /// # Errors
    /// Returns error if the value cannot be represented
    pub fn encode<T: Serialize>(self, value: &T) -> Result<String, PersistError> {
        Ok(match self {
            Self::Json => {
                let mut text = serde_json::to_string_pretty(value)?;
                text.push('\n');
                text
            }
            Self::Yaml => serde_yaml::to_string(value)?,
        })
    }
}

/// A stored property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueElement {
    /// Part id
    pub part_id: PartId,
    /// Property name
    pub property: String,
    /// Kind tag and kind-specific fields
    #[serde(flatten)]
    pub content: PropertyValueContent,
    /// Template value status, `DEFINED` when absent
    #[serde(default, skip_serializing_if = "is_defined")]
    pub template_value_status: TemplateValueStatus,
}

/// A stored link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkElement {
    /// Part id
    pub part_id: PartId,
    /// Association name
    pub association: String,
    /// Target object
    pub target: QualifiedName,
    /// Cardinality
    #[serde(default)]
    pub cardinality: Cardinality,
    /// Template value status, `DEFINED` when absent
    #[serde(default, skip_serializing_if = "is_defined")]
    pub template_value_status: TemplateValueStatus,
}

/// A stored generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationElement {
    /// Part id
    pub part_id: PartId,
    /// First valid day
    #[serde(default)]
    pub valid_from: Option<NaiveDate>,
    /// Property values
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<ValueElement>,
    /// Links
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<LinkElement>,
}

/// A stored configuration object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationDocument {
    /// Object name
    pub name: QualifiedName,
    /// Product type
    #[serde(rename = "type")]
    pub type_name: QualifiedName,
    /// Template reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<QualifiedName>,
    /// Whether the object acts as template
    #[serde(default)]
    pub is_template: bool,
    /// Whether the object is time-sliced
    #[serde(default = "default_true")]
    pub changing_over_time: bool,
    /// Last valid day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<NaiveDate>,
    /// Values of the object container
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<ValueElement>,
    /// Links of the object container
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<LinkElement>,
    /// Generations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generations: Vec<GenerationElement>,
}

impl ConfigurationDocument {
    /// Snapshot an object
    #[must_use]
    pub fn from_object(object: &ConfigurationObject) -> Self {
        Self {
            name: object.name().clone(),
            type_name: object.type_name().clone(),
            template: object.template().cloned(),
            is_template: object.is_template(),
            changing_over_time: object.is_changing_over_time(),
            valid_to: object.valid_to(),
            values: value_elements(object.container()),
            links: link_elements(object.container()),
            generations: object
                .generations()
                .iter()
                .map(|g| GenerationElement {
                    part_id: g.id().clone(),
                    valid_from: g.valid_from(),
                    values: value_elements(g.container()),
                    links: link_elements(g.container()),
                })
                .collect(),
        }
    }

    /// Build the object
    ///
    /// # Errors
    /// Returns error if a container holds two values of the same kind for
    /// one property
    pub fn into_object(self) -> Result<ConfigurationObject, PersistError> {
        let mut object = ConfigurationObject::new(self.name, self.type_name)
            .with_changing_over_time(self.changing_over_time);
        if let Some(template) = self.template {
            object = object.with_template(template);
        }
        if self.is_template {
            object = object.as_template();
        }
        if let Some(valid_to) = self.valid_to {
            object = object.with_valid_to(valid_to);
        }
        for value in self.values {
            object = object.with_value(value.into_value())?;
        }
        for link in self.links {
            object = object.with_link(link.into_link());
        }
        for element in self.generations {
            let mut generation = Generation::with_id(element.part_id, element.valid_from);
            for value in element.values {
                generation = generation.with_value(value.into_value())?;
            }
            for link in element.links {
                generation = generation.with_link(link.into_link());
            }
            object = object.with_generation(generation);
        }
        Ok(object)
    }
}

impl ValueElement {
    fn into_value(self) -> PropertyValue {
        PropertyValue::with_id(self.part_id, self.property, self.content)
            .with_status(self.template_value_status)
    }
}

impl LinkElement {
    fn into_link(self) -> Link {
        Link::with_id(self.part_id, self.association, self.target)
            .with_cardinality(self.cardinality)
            .with_status(self.template_value_status)
    }
}

fn value_elements(container: &ValueContainer) -> Vec<ValueElement> {
    container
        .values()
        .iter()
        .map(|v| ValueElement {
            part_id: v.id().clone(),
            property: v.property().to_string(),
            content: v.content().clone(),
            template_value_status: v.status(),
        })
        .collect()
}

fn link_elements(container: &ValueContainer) -> Vec<LinkElement> {
    container
        .links()
        .iter()
        .map(|l| LinkElement {
            part_id: l.id().clone(),
            association: l.association().to_string(),
            target: l.target().clone(),
            cardinality: l.cardinality(),
            template_value_status: l.status(),
        })
        .collect()
}
