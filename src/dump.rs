//! Type dumps
//!
//! Serializable summaries of resolved types, for inspection and for
//! comparing registry output in tests. Child types are rendered by name
//! only, so a cyclic type dumps in finite space.

use serde::{Deserialize, Serialize};

use crate::types::{AttributeType, Binding, PropertyDescriptor, TypeTag};

/// Summary of one resolved type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TypeSummary {
    /// Type name (qualified format: {namespace}localName)
    pub name: String,

    /// Kind of record
    pub kind: TypeTag,

    /// Value binding
    pub binding: Binding,

    /// Whether instances carry an identifier
    pub identified: bool,

    /// Whether the type is abstract
    #[serde(rename = "abstract")]
    pub abstract_type: bool,

    /// Whether the record is an unbuilt placeholder
    pub lazy: bool,

    /// Super type name
    pub super_type: Option<String>,

    /// Restrictions as `name=value`
    pub restrictions: Vec<String>,

    /// Child descriptors
    pub descriptors: Vec<DescriptorSummary>,

    /// Name of the default geometry descriptor
    pub default_geometry: Option<String>,

    /// CRS identifier
    pub crs: Option<String>,
}

/// Summary of one descriptor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DescriptorSummary {
    /// Descriptor name (qualified format)
    pub name: String,

    /// Type name
    #[serde(rename = "type")]
    pub type_name: String,

    /// Whether the type was a forward reference
    pub proxy: bool,

    /// Minimum occurrences
    pub min_occurs: u32,

    /// Maximum occurrences (None means unbounded)
    pub max_occurs: Option<u32>,

    /// Whether the property is nillable
    pub nillable: bool,

    /// Whether the property is a geometry
    pub geometry: bool,

    /// Default value
    pub default: Option<String>,

    /// Names of the substitutable alternatives
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub substitution_group: Vec<String>,
}

impl TypeSummary {
    /// Summarize a resolved type
    pub fn of(ty: &AttributeType) -> Self {
        Self {
            name: ty.name.to_string(),
            kind: ty.tag(),
            binding: ty.binding,
            identified: ty.identified,
            abstract_type: ty.abstract_type,
            lazy: ty.lazy,
            super_type: ty.super_type.as_ref().map(|s| s.name().to_string()),
            restrictions: ty
                .restrictions
                .iter()
                .map(|f| format!("{}={}", f.name, f.value))
                .collect(),
            descriptors: ty
                .descriptors()
                .unwrap_or_default()
                .iter()
                .map(|d| DescriptorSummary::of(d))
                .collect(),
            default_geometry: ty.default_geometry().map(|d| d.name.to_string()),
            crs: ty.crs().map(|c| c.to_string()),
        }
    }

    /// Render as pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl DescriptorSummary {
    /// Summarize a descriptor
    pub fn of(descriptor: &PropertyDescriptor) -> Self {
        Self {
            name: descriptor.name.to_string(),
            type_name: descriptor.type_ref.name().to_string(),
            proxy: descriptor.type_ref.is_proxy(),
            min_occurs: descriptor.occurs.min,
            max_occurs: descriptor.occurs.max,
            nillable: descriptor.nillable,
            geometry: descriptor.is_geometry(),
            default: descriptor.default_value.clone(),
            substitution_group: descriptor
                .substitution_group()
                .unwrap_or_default()
                .iter()
                .map(|d| d.name.to_string())
                .collect(),
        }
    }
}
