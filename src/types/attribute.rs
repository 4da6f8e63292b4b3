//! Resolved attribute types
//!
//! An [`AttributeType`] is the output of resolution: a named type with a
//! binding, an optional super type, and for complex and feature types an
//! ordered list of child descriptors. Records are immutable once shared;
//! only their [`UserData`] map accepts late additions.

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::crs::Crs;
use crate::namespaces::QName;
use crate::schema::{ElementDeclaration, Facet, TypeDefinition};

use super::binding::Binding;
use super::descriptor::PropertyDescriptor;
use super::proxy::TypeRef;

/// User data key for the originating type definition
pub const TYPE_DEFINITION_KEY: &str = "typeDefinition";
/// User data key for the originating element declaration
pub const ELEMENT_DECLARATION_KEY: &str = "elementDeclaration";
/// User data key for a descriptor's substitution group alternatives
pub const SUBSTITUTION_GROUP_KEY: &str = "substitutionGroup";

/// Kind of a resolved type, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    /// Leaf type
    Simple,
    /// Structured type with child descriptors
    Complex,
    /// Complex type representing a feature
    Feature,
    /// CRS-aware geometry type
    Geometry,
}

impl TypeTag {
    /// Check if a record of kind `self` can stand where `expected` is wanted
    pub fn satisfies(self, expected: TypeTag) -> bool {
        self == expected || (self == TypeTag::Feature && expected == TypeTag::Complex)
    }

    /// Check if records of this kind carry child descriptors
    pub fn has_descriptors(self) -> bool {
        matches!(self, TypeTag::Complex | TypeTag::Feature)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Simple => write!(f, "simple"),
            TypeTag::Complex => write!(f, "complex"),
            TypeTag::Feature => write!(f, "feature"),
            TypeTag::Geometry => write!(f, "geometry"),
        }
    }
}

/// Kind-specific payload of a resolved type
#[derive(Debug, Clone)]
pub enum TypeKind {
    /// Leaf type
    Simple,
    /// Structured type
    Complex {
        /// Child descriptors in content-model order
        descriptors: Vec<Arc<PropertyDescriptor>>,
    },
    /// Feature type
    Feature {
        /// Child descriptors in content-model order
        descriptors: Vec<Arc<PropertyDescriptor>>,
        /// First geometry descriptor among the children
        default_geometry: Option<Arc<PropertyDescriptor>>,
        /// CRS the feature type was resolved with
        crs: Option<Crs>,
    },
    /// Geometry type
    Geometry {
        /// Coordinate reference system of the geometry
        crs: Option<Crs>,
    },
}

impl TypeKind {
    /// Tag of this kind
    pub fn tag(&self) -> TypeTag {
        match self {
            TypeKind::Simple => TypeTag::Simple,
            TypeKind::Complex { .. } => TypeTag::Complex,
            TypeKind::Feature { .. } => TypeTag::Feature,
            TypeKind::Geometry { .. } => TypeTag::Geometry,
        }
    }
}

/// Value stored in a record's user data map
#[derive(Debug, Clone)]
pub enum UserValue {
    /// Originating type definition
    TypeDefinition(Arc<TypeDefinition>),
    /// Originating element declaration
    ElementDeclaration(Arc<ElementDeclaration>),
    /// Descriptors substitutable for the owning descriptor
    SubstitutionGroup(Vec<Arc<PropertyDescriptor>>),
    /// Free-form text
    Text(String),
}

/// Free-form metadata attached to types and descriptors.
///
/// Interior mutability lets substitution groups be recorded on descriptors
/// that are already shared by a registered type.
#[derive(Default)]
pub struct UserData {
    entries: RwLock<IndexMap<String, UserValue>>,
}

impl UserData {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous one
    pub fn insert(&self, key: impl Into<String>, value: UserValue) -> Option<UserValue> {
        self.entries.write().insert(key.into(), value)
    }

    /// Remove a value
    pub fn remove(&self, key: &str) -> Option<UserValue> {
        self.entries.write().shift_remove(key)
    }

    /// Get a copy of a value
    pub fn get(&self, key: &str) -> Option<UserValue> {
        self.entries.read().get(key).cloned()
    }

    /// Check if a key is present
    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the map is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Originating type definition, if stashed
    pub fn type_definition(&self) -> Option<Arc<TypeDefinition>> {
        match self.get(TYPE_DEFINITION_KEY) {
            Some(UserValue::TypeDefinition(def)) => Some(def),
            _ => None,
        }
    }

    /// Originating element declaration, if stashed
    pub fn element_declaration(&self) -> Option<Arc<ElementDeclaration>> {
        match self.get(ELEMENT_DECLARATION_KEY) {
            Some(UserValue::ElementDeclaration(decl)) => Some(decl),
            _ => None,
        }
    }

    /// Substitution group alternatives, if computed
    pub fn substitution_group(&self) -> Option<Vec<Arc<PropertyDescriptor>>> {
        match self.get(SUBSTITUTION_GROUP_KEY) {
            Some(UserValue::SubstitutionGroup(group)) => Some(group),
            _ => None,
        }
    }
}

impl Clone for UserData {
    fn clone(&self) -> Self {
        Self {
            entries: RwLock::new(self.entries.read().clone()),
        }
    }
}

impl fmt::Debug for UserData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.read().keys()).finish()
    }
}

/// Resolved attribute type.
///
/// Links to other types may be proxies into the cache of the registry that
/// built this record. That registry must outlive any traversal of the
/// graph; afterwards proxies fail with
/// [`Error::CacheReleased`](crate::Error::CacheReleased).
#[derive(Debug, Clone)]
pub struct AttributeType {
    /// Type name (synthesized from the owning element for anonymous types)
    pub name: QName,

    /// Runtime value class
    pub binding: Binding,

    /// Whether instances carry an identifier
    pub identified: bool,

    /// Whether the type is abstract
    pub abstract_type: bool,

    /// Restrictions (facets) on the value space
    pub restrictions: Vec<Facet>,

    /// Super type, owned by the registry cache
    pub super_type: Option<TypeRef>,

    /// Kind-specific payload
    pub kind: TypeKind,

    /// Placeholder registered without full detail, rebuilt on first real use
    pub lazy: bool,

    /// Metadata
    pub user_data: UserData,
}

impl AttributeType {
    /// Create a simple type
    pub fn simple(name: QName, binding: Binding) -> Self {
        Self {
            name,
            binding,
            identified: false,
            abstract_type: false,
            restrictions: Vec::new(),
            super_type: None,
            kind: TypeKind::Simple,
            lazy: false,
            user_data: UserData::new(),
        }
    }

    /// Create a complex type
    pub fn complex(name: QName, descriptors: Vec<Arc<PropertyDescriptor>>) -> Self {
        Self {
            kind: TypeKind::Complex { descriptors },
            ..Self::simple(name, Binding::Collection)
        }
    }

    /// Create a feature type; the default geometry is its first geometry
    /// descriptor
    pub fn feature(name: QName, descriptors: Vec<Arc<PropertyDescriptor>>, crs: Option<Crs>) -> Self {
        let default_geometry = descriptors.iter().find(|d| d.is_geometry()).cloned();
        Self {
            identified: true,
            kind: TypeKind::Feature {
                descriptors,
                default_geometry,
                crs,
            },
            ..Self::simple(name, Binding::Feature)
        }
    }

    /// Create a geometry type
    pub fn geometry(name: QName, binding: Binding, crs: Option<Crs>) -> Self {
        Self {
            kind: TypeKind::Geometry { crs },
            ..Self::simple(name, binding)
        }
    }

    /// Placeholder for a foundation type whose detail is resolved later
    pub fn lazy_placeholder(name: QName, binding: Binding) -> Self {
        Self {
            lazy: true,
            ..Self::simple(name, binding)
        }
    }

    /// Geometry wrapper of `base` carrying `crs`, falling back to the CRS
    /// `base` already has
    pub fn geometry_of(base: &AttributeType, crs: Option<Crs>) -> Self {
        let crs = crs.or_else(|| base.crs().cloned());
        Self {
            kind: TypeKind::Geometry { crs },
            lazy: false,
            ..base.clone()
        }
    }

    /// Set the super type
    pub fn with_super(mut self, super_type: TypeRef) -> Self {
        self.super_type = Some(super_type);
        self
    }

    /// Set the identifiable flag
    pub fn identified(mut self, identified: bool) -> Self {
        self.identified = identified;
        self
    }

    /// Set the abstract flag
    pub fn abstract_type(mut self, abstract_type: bool) -> Self {
        self.abstract_type = abstract_type;
        self
    }

    /// Set the restriction list
    pub fn with_restrictions(mut self, restrictions: Vec<Facet>) -> Self {
        self.restrictions = restrictions;
        self
    }

    /// Kind tag
    pub fn tag(&self) -> TypeTag {
        self.kind.tag()
    }

    /// Child descriptors for complex and feature types
    pub fn descriptors(&self) -> Option<&[Arc<PropertyDescriptor>]> {
        match &self.kind {
            TypeKind::Complex { descriptors } | TypeKind::Feature { descriptors, .. } => {
                Some(descriptors)
            }
            _ => None,
        }
    }

    /// Child descriptor by exact name
    pub fn descriptor(&self, name: &QName) -> Option<&Arc<PropertyDescriptor>> {
        self.descriptors()?.iter().find(|d| &d.name == name)
    }

    /// Coordinate reference system of feature and geometry types
    pub fn crs(&self) -> Option<&Crs> {
        match &self.kind {
            TypeKind::Feature { crs, .. } | TypeKind::Geometry { crs } => crs.as_ref(),
            _ => None,
        }
    }

    /// Default geometry descriptor of a feature type
    pub fn default_geometry(&self) -> Option<&Arc<PropertyDescriptor>> {
        match &self.kind {
            TypeKind::Feature {
                default_geometry, ..
            } => default_geometry.as_ref(),
            _ => None,
        }
    }

    /// Check if this is a complex (or feature) type
    pub fn is_complex(&self) -> bool {
        self.tag().has_descriptors()
    }

    /// Check if this is a feature type
    pub fn is_feature(&self) -> bool {
        self.tag() == TypeTag::Feature
    }

    /// Check if this is a geometry type
    pub fn is_geometry(&self) -> bool {
        self.tag() == TypeTag::Geometry
    }
}
