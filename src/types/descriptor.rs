//! Property descriptors
//!
//! A descriptor binds a name to a type together with occurrence bounds,
//! nillability and an optional default value.

use std::sync::Arc;

use crate::namespaces::QName;
use crate::schema::{Occurs, Particle};

use super::attribute::{TypeTag, UserData};
use super::proxy::TypeRef;

/// Named, typed property of a complex type (or a top-level element)
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    /// Property name
    pub name: QName,
    /// Property type (possibly a proxy while the type was under construction)
    pub type_ref: TypeRef,
    /// Occurrence bounds
    pub occurs: Occurs,
    /// Whether the property may be nil
    pub nillable: bool,
    /// Default value
    pub default_value: Option<String>,
    /// Metadata (originating element, substitution group)
    pub user_data: UserData,
}

impl PropertyDescriptor {
    /// Create a descriptor
    pub fn new(name: QName, type_ref: TypeRef, occurs: Occurs) -> Self {
        Self {
            name,
            type_ref,
            occurs,
            nillable: false,
            default_value: None,
            user_data: UserData::new(),
        }
    }

    /// Set nillability
    pub fn nillable(mut self, nillable: bool) -> Self {
        self.nillable = nillable;
        self
    }

    /// Set the default value
    pub fn with_default(mut self, default_value: Option<String>) -> Self {
        self.default_value = default_value;
        self
    }

    /// Check if this is a geometry descriptor
    pub fn is_geometry(&self) -> bool {
        self.type_ref.tag() == TypeTag::Geometry
    }

    /// Descriptors substitutable for this one, once computed
    pub fn substitution_group(&self) -> Option<Vec<Arc<PropertyDescriptor>>> {
        self.user_data.substitution_group()
    }
}

impl Particle for PropertyDescriptor {
    fn occurs(&self) -> Occurs {
        self.occurs
    }
}
