//! Type definitions
//!
//! Read-only view of XSD simple and complex type definitions. Base types
//! are held as shared definitions the way an XSD object model exposes
//! them; a base may also be a stub carrying only its name, which a
//! [`SchemaIndex`](super::SchemaIndex) resolves against its own globals.
//!
//! Reference: https://www.w3.org/TR/xmlschema11-1/#Complex_Type_Definitions

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::namespaces::QName;

use super::elements::ElementParticle;
use super::particles::Occurs;

/// Derivation method for types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DerivationMethod {
    /// Type derived by restriction
    #[default]
    Restriction,
    /// Type derived by extension
    Extension,
}

impl std::fmt::Display for DerivationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Restriction => write!(f, "restriction"),
            Self::Extension => write!(f, "extension"),
        }
    }
}

/// Content type label for types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentTypeLabel {
    /// No content (empty element)
    Empty,
    /// Simple content (text only)
    Simple,
    /// Mixed content (text and elements)
    Mixed,
    /// Element-only content
    ElementOnly,
}

impl std::fmt::Display for ContentTypeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Simple => write!(f, "simple"),
            Self::Mixed => write!(f, "mixed"),
            Self::ElementOnly => write!(f, "element-only"),
        }
    }
}

/// A constraining facet of a simple type, carried into the resolved
/// record's restriction list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Facet {
    /// Facet name (e.g. `maxLength`, `enumeration`)
    pub name: String,
    /// Lexical facet value
    pub value: String,
}

impl Facet {
    /// Create a facet
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Attribute use declared on a complex type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeUse {
    /// Attribute name
    pub name: QName,
    /// Attribute simple type, if declared
    pub type_name: Option<QName>,
    /// Whether use="required"
    pub required: bool,
    /// Default value
    pub default: Option<String>,
}

impl AttributeUse {
    /// Create an optional attribute use
    pub fn new(name: QName) -> Self {
        Self {
            name,
            type_name: None,
            required: false,
            default: None,
        }
    }

    /// Set the attribute type
    pub fn with_type(mut self, type_name: QName) -> Self {
        self.type_name = Some(type_name);
        self
    }

    /// Mark the attribute as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// XSD type definition, simple or complex
#[derive(Debug, Clone)]
pub struct TypeDefinition {
    /// Type name (None for anonymous types)
    pub name: Option<QName>,

    /// Base type definition
    pub base: Option<Arc<TypeDefinition>>,

    /// Whether this is a complex type
    pub complex: bool,

    /// Whether the type is abstract
    pub abstract_type: bool,

    /// Content type
    pub content: ContentTypeLabel,

    /// Derivation method from the base type
    pub derivation: DerivationMethod,

    /// Element particles declared by this type (not inherited ones)
    pub particles: Vec<ElementParticle>,

    /// Attribute uses declared by this type (not inherited ones)
    pub attributes: Vec<AttributeUse>,

    /// Constraining facets (simple types)
    pub facets: Vec<Facet>,
}

impl TypeDefinition {
    fn with_kind(name: Option<QName>, complex: bool) -> Self {
        Self {
            name,
            base: None,
            complex,
            abstract_type: false,
            content: if complex {
                ContentTypeLabel::ElementOnly
            } else {
                ContentTypeLabel::Simple
            },
            derivation: DerivationMethod::default(),
            particles: Vec::new(),
            attributes: Vec::new(),
            facets: Vec::new(),
        }
    }

    /// Create a named simple type
    pub fn simple(name: QName) -> Self {
        Self::with_kind(Some(name), false)
    }

    /// Create a named complex type
    pub fn complex(name: QName) -> Self {
        Self::with_kind(Some(name), true)
    }

    /// Create an anonymous simple type
    pub fn anonymous_simple() -> Self {
        Self::with_kind(None, false)
    }

    /// Create an anonymous complex type
    pub fn anonymous_complex() -> Self {
        Self::with_kind(None, true)
    }

    /// Shared definition stub for an XSD built-in, usable as a base type
    pub fn builtin(local_name: &str) -> Arc<Self> {
        Arc::new(Self::simple(QName::xs(local_name)))
    }

    /// Derive by extension from `base`
    pub fn extending(mut self, base: Arc<TypeDefinition>) -> Self {
        self.base = Some(base);
        self.derivation = DerivationMethod::Extension;
        self
    }

    /// Derive by restriction from `base`
    pub fn restricting(mut self, base: Arc<TypeDefinition>) -> Self {
        self.base = Some(base);
        self.derivation = DerivationMethod::Restriction;
        self
    }

    /// Append an element particle
    pub fn with_element(mut self, particle: ElementParticle) -> Self {
        self.particles.push(particle);
        self
    }

    /// Append an attribute use
    pub fn with_attribute(mut self, attribute: AttributeUse) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Append a constraining facet
    pub fn with_facet(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.facets.push(Facet::new(name, value));
        self
    }

    /// Allow mixed text content
    pub fn mixed(mut self) -> Self {
        self.content = ContentTypeLabel::Mixed;
        self
    }

    /// Mark the type abstract
    pub fn abstract_type(mut self) -> Self {
        self.abstract_type = true;
        self
    }

    /// Check if the type is anonymous
    pub fn is_anonymous(&self) -> bool {
        self.name.is_none()
    }

    /// Target namespace of the type
    pub fn target_namespace(&self) -> Option<&str> {
        self.name.as_ref().and_then(|n| n.namespace())
    }

    /// Name of the base type, if the base is a named type
    pub fn base_name(&self) -> Option<&QName> {
        self.base.as_ref().and_then(|b| b.name.as_ref())
    }

    /// Check if this type is `name` or derives from it
    pub fn derives_from(&self, name: &QName) -> bool {
        let mut current = Some(self);
        while let Some(def) = current {
            if def.name.as_ref() == Some(name) {
                return true;
            }
            current = def.base.as_deref();
        }
        false
    }

    /// Child element particles, in content-model order.
    ///
    /// With `include_inherited`, particles of complex base types come first
    /// for types derived by extension; a restriction restates its content
    /// model, so only its own particles count.
    pub fn element_particles(&self, include_inherited: bool) -> Vec<ElementParticle> {
        let mut particles = Vec::new();
        if include_inherited && self.derivation == DerivationMethod::Extension {
            if let Some(base) = self.base.as_deref().filter(|b| b.complex) {
                particles.extend(base.element_particles(true));
            }
        }
        particles.extend(self.particles.iter().cloned());
        particles
    }

    /// Attribute uses including inherited ones; redeclarations replace the
    /// inherited use of the same name
    pub fn attribute_uses(&self) -> Vec<AttributeUse> {
        let mut uses = match self.base.as_deref().filter(|b| b.complex) {
            Some(base) => base.attribute_uses(),
            None => Vec::new(),
        };
        for attribute in &self.attributes {
            match uses.iter_mut().find(|u| u.name == attribute.name) {
                Some(existing) => *existing = attribute.clone(),
                None => uses.push(attribute.clone()),
            }
        }
        uses
    }

    /// Occurrence bounds of the child element named `element`, or the
    /// XSD default (1, 1) when it is not a direct or inherited child
    pub fn occurs_of(&self, element: &QName) -> Occurs {
        self.element_particles(true)
            .iter()
            .find(|p| &p.element.name == element)
            .map(|p| p.occurs)
            .unwrap_or_default()
    }
}
