//! Element declarations
//!
//! Read-only view of XSD element declarations as the resolver consumes
//! them: a name, a (possibly inline) type, nillability and substitution
//! group membership.
//!
//! Reference: https://www.w3.org/TR/xmlschema11-1/#Element_Declarations

use std::sync::Arc;

use crate::namespaces::QName;

use super::definitions::TypeDefinition;
use super::particles::{Occurs, Particle};

/// The scope of an element declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElementScope {
    /// Global element declaration
    #[default]
    Global,
    /// Local element declaration (within a complex type or group)
    Local,
}

impl std::fmt::Display for ElementScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// How an element declaration names its type
#[derive(Debug, Clone)]
pub enum ElementTypeRef {
    /// Reference to a globally defined type
    Named(QName),
    /// Type defined inline in the element
    Anonymous(Arc<TypeDefinition>),
    /// No usable type (malformed schema, or an unresolved `ref=` stub)
    Missing,
}

impl ElementTypeRef {
    /// Name of the referenced global type, if any
    pub fn type_name(&self) -> Option<&QName> {
        match self {
            ElementTypeRef::Named(name) => Some(name),
            _ => None,
        }
    }

    /// Check if the type is defined inline
    pub fn is_anonymous(&self) -> bool {
        matches!(self, ElementTypeRef::Anonymous(_))
    }
}

/// XSD Element declaration
#[derive(Debug, Clone)]
pub struct ElementDeclaration {
    /// Element name
    pub name: QName,

    /// Element type
    pub type_ref: ElementTypeRef,

    /// Whether this element is nillable
    pub nillable: bool,

    /// Whether this element is abstract
    pub abstract_element: bool,

    /// Default value (for simple content)
    pub default: Option<String>,

    /// Substitution group head element name
    pub substitution_group: Option<QName>,

    /// Reference to another element (for ref= usage)
    pub ref_element: Option<QName>,

    /// Element scope (global or local)
    pub scope: ElementScope,
}

impl ElementDeclaration {
    /// Create a new element with a given name and type
    pub fn new(name: QName, type_ref: ElementTypeRef) -> Self {
        Self {
            name,
            type_ref,
            nillable: false,
            abstract_element: false,
            default: None,
            substitution_group: None,
            ref_element: None,
            scope: ElementScope::default(),
        }
    }

    /// Create an element typed by a global type
    pub fn typed(name: QName, type_name: QName) -> Self {
        Self::new(name, ElementTypeRef::Named(type_name))
    }

    /// Create an element with an inline (anonymous) type
    pub fn anonymous(name: QName, definition: TypeDefinition) -> Self {
        Self::new(name, ElementTypeRef::Anonymous(Arc::new(definition)))
    }

    /// Create an element reference (`ref="..."`)
    ///
    /// The reference carries the target's name; its type is only known once
    /// it is resolved against a schema index.
    pub fn reference(target: QName) -> Self {
        Self {
            ref_element: Some(target.clone()),
            scope: ElementScope::Local,
            ..Self::new(target, ElementTypeRef::Missing)
        }
    }

    /// Mark the element as nillable
    pub fn nillable(mut self) -> Self {
        self.nillable = true;
        self
    }

    /// Mark the element as abstract
    pub fn abstract_element(mut self) -> Self {
        self.abstract_element = true;
        self
    }

    /// Declare membership in the substitution group headed by `head`
    pub fn substitutes(mut self, head: QName) -> Self {
        self.substitution_group = Some(head);
        self
    }

    /// Set the default value
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Mark the declaration as local to a complex type
    pub fn local(mut self) -> Self {
        self.scope = ElementScope::Local;
        self
    }

    /// Check if this declaration is a reference to a global element
    pub fn is_reference(&self) -> bool {
        self.ref_element.is_some()
    }

    /// Check if this is a global declaration
    pub fn is_global(&self) -> bool {
        self.scope == ElementScope::Global
    }
}

/// An element appearing in a complex type's content model
#[derive(Debug, Clone)]
pub struct ElementParticle {
    /// The element declaration (may be a reference)
    pub element: Arc<ElementDeclaration>,
    /// Occurrence bounds inside the container
    pub occurs: Occurs,
}

impl ElementParticle {
    /// Create a particle with default (1, 1) occurrence
    pub fn new(element: ElementDeclaration) -> Self {
        Self {
            element: Arc::new(element),
            occurs: Occurs::once(),
        }
    }

    /// Create a particle from a shared declaration
    pub fn shared(element: Arc<ElementDeclaration>) -> Self {
        Self {
            element,
            occurs: Occurs::once(),
        }
    }

    /// Set the occurrence bounds
    pub fn with_occurs(mut self, occurs: Occurs) -> Self {
        self.occurs = occurs;
        self
    }
}

impl Particle for ElementParticle {
    fn occurs(&self) -> Occurs {
        self.occurs
    }
}
