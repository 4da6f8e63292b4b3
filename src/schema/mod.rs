//! Schema index seam
//!
//! The resolver never parses XSD itself. It consumes an already-built XSD
//! object model through the [`SchemaIndex`] trait:
//! - global element and type lookup by qualified name
//! - child element and attribute use enumeration
//! - occurrence bounds of an element inside its container
//! - substitution group membership and element reference resolution
//!
//! [`MemorySchemaIndex`] is an in-memory implementation, and
//! [`SchemaIndexes`] combines several indexes so the first one that knows a
//! name answers for it.

pub mod builtins;
pub mod definitions;
pub mod elements;
pub mod index;
pub mod particles;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::namespaces::QName;

pub use builtins::{get_builtin_type, is_builtin, BuiltinType, TypeCategory, BUILTIN_TYPES};
pub use definitions::{AttributeUse, ContentTypeLabel, DerivationMethod, Facet, TypeDefinition};
pub use elements::{ElementDeclaration, ElementParticle, ElementScope, ElementTypeRef};
pub use index::{MemorySchemaIndex, MemorySchemaIndexBuilder};
pub use particles::{Occurs, Particle};

/// Read-only query interface over a parsed schema
pub trait SchemaIndex: fmt::Debug + Send + Sync {
    /// Look up a global element declaration
    fn find_element(&self, name: &QName) -> Option<Arc<ElementDeclaration>>;

    /// Look up a global type definition
    fn find_type(&self, name: &QName) -> Option<Arc<TypeDefinition>>;

    /// All global type definitions
    fn type_definitions(&self) -> Vec<Arc<TypeDefinition>>;

    /// Elements substitutable for `element`, excluding itself
    fn substitution_group(&self, element: &ElementDeclaration) -> Vec<Arc<ElementDeclaration>>;

    /// Child element particles of `definition` in content-model order.
    ///
    /// With `include_inherited`, extension bases contribute their particles
    /// first. A named base is looked up in this index and the embedded
    /// definition is used only when the index does not know it.
    fn child_elements(&self, definition: &TypeDefinition, include_inherited: bool) -> Vec<ElementParticle> {
        let mut visited = HashSet::new();
        collect_particles(self, definition, include_inherited, &mut visited)
    }

    /// Attribute uses of `definition`, inherited ones included
    fn attribute_uses(&self, definition: &TypeDefinition) -> Vec<AttributeUse> {
        definition.attribute_uses()
    }

    /// minOccurs of `element` inside `container`; 1 if it is not a child
    fn min_occurs(&self, container: &TypeDefinition, element: &ElementDeclaration) -> u32 {
        occurs_in(self, container, element).min
    }

    /// maxOccurs of `element` inside `container`; None means unbounded
    fn max_occurs(&self, container: &TypeDefinition, element: &ElementDeclaration) -> Option<u32> {
        occurs_in(self, container, element).max
    }

    /// Check if `element` is nillable
    fn is_nillable(&self, element: &ElementDeclaration) -> bool {
        element.nillable
    }

    /// Global declaration an element reference points to
    fn resolve_reference(&self, element: &ElementDeclaration) -> Option<Arc<ElementDeclaration>> {
        element
            .ref_element
            .as_ref()
            .and_then(|target| self.find_element(target))
    }

    /// Release held schema resources
    fn dispose(&self) {}
}

fn collect_particles<I: SchemaIndex + ?Sized>(
    index: &I,
    definition: &TypeDefinition,
    include_inherited: bool,
    visited: &mut HashSet<QName>,
) -> Vec<ElementParticle> {
    if let Some(name) = &definition.name {
        if !visited.insert(name.clone()) {
            return Vec::new();
        }
    }

    let mut particles = Vec::new();
    if include_inherited && definition.derivation == DerivationMethod::Extension {
        let base = match definition.base_name() {
            Some(name) => index.find_type(name).or_else(|| definition.base.clone()),
            None => definition.base.clone(),
        };
        if let Some(base) = base.filter(|b| b.complex) {
            particles.extend(collect_particles(index, &base, true, visited));
        }
    }
    particles.extend(definition.particles.iter().cloned());
    particles
}

fn occurs_in<I: SchemaIndex + ?Sized>(
    index: &I,
    container: &TypeDefinition,
    element: &ElementDeclaration,
) -> Occurs {
    index
        .child_elements(container, true)
        .iter()
        .find(|p| p.element.name == element.name)
        .map(|p| p.occurs)
        .unwrap_or_default()
}

/// Ordered list of indexes consulted together
#[derive(Debug, Clone, Default)]
pub struct SchemaIndexes {
    indexes: Vec<Arc<dyn SchemaIndex>>,
}

impl SchemaIndexes {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an index; earlier indexes win lookups
    pub fn push(&mut self, index: Arc<dyn SchemaIndex>) {
        self.indexes.push(index);
    }

    /// Remove the most recently added index
    pub fn pop(&mut self) -> Option<Arc<dyn SchemaIndex>> {
        self.indexes.pop()
    }

    /// Number of indexes
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    /// Check if no index has been added
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    /// Dispose and drop every index
    pub fn dispose_all(&mut self) {
        for index in self.indexes.drain(..) {
            index.dispose();
        }
    }

    /// Index declaring the global type `definition`, or the first index
    /// for anonymous and unknown definitions
    fn owner_of_type(&self, definition: &TypeDefinition) -> Option<&Arc<dyn SchemaIndex>> {
        definition
            .name
            .as_ref()
            .and_then(|name| self.indexes.iter().find(|i| i.find_type(name).is_some()))
            .or_else(|| self.indexes.first())
    }

    /// Index declaring the global element `element`, or the first index
    /// for local and unknown elements
    fn owner_of_element(&self, element: &ElementDeclaration) -> Option<&Arc<dyn SchemaIndex>> {
        self.indexes
            .iter()
            .find(|i| i.find_element(&element.name).is_some())
            .or_else(|| self.indexes.first())
    }
}

impl SchemaIndex for SchemaIndexes {
    fn find_element(&self, name: &QName) -> Option<Arc<ElementDeclaration>> {
        self.indexes.iter().find_map(|i| i.find_element(name))
    }

    fn find_type(&self, name: &QName) -> Option<Arc<TypeDefinition>> {
        self.indexes.iter().find_map(|i| i.find_type(name))
    }

    fn type_definitions(&self) -> Vec<Arc<TypeDefinition>> {
        self.indexes.iter().flat_map(|i| i.type_definitions()).collect()
    }

    fn substitution_group(&self, element: &ElementDeclaration) -> Vec<Arc<ElementDeclaration>> {
        let mut seen = HashSet::new();
        self.indexes
            .iter()
            .flat_map(|i| i.substitution_group(element))
            .filter(|member| seen.insert(member.name.clone()))
            .collect()
    }

    fn child_elements(&self, definition: &TypeDefinition, include_inherited: bool) -> Vec<ElementParticle> {
        match self.owner_of_type(definition) {
            Some(owner) => owner.child_elements(definition, include_inherited),
            None => collect_particles(self, definition, include_inherited, &mut HashSet::new()),
        }
    }

    fn attribute_uses(&self, definition: &TypeDefinition) -> Vec<AttributeUse> {
        match self.owner_of_type(definition) {
            Some(owner) => owner.attribute_uses(definition),
            None => definition.attribute_uses(),
        }
    }

    fn min_occurs(&self, container: &TypeDefinition, element: &ElementDeclaration) -> u32 {
        match self.owner_of_type(container) {
            Some(owner) => owner.min_occurs(container, element),
            None => occurs_in(self, container, element).min,
        }
    }

    fn max_occurs(&self, container: &TypeDefinition, element: &ElementDeclaration) -> Option<u32> {
        match self.owner_of_type(container) {
            Some(owner) => owner.max_occurs(container, element),
            None => occurs_in(self, container, element).max,
        }
    }

    fn is_nillable(&self, element: &ElementDeclaration) -> bool {
        match self.owner_of_element(element) {
            Some(owner) => owner.is_nillable(element),
            None => element.nillable,
        }
    }

    fn resolve_reference(&self, element: &ElementDeclaration) -> Option<Arc<ElementDeclaration>> {
        self.indexes.iter().find_map(|i| i.resolve_reference(element))
    }

    fn dispose(&self) {
        for index in &self.indexes {
            index.dispose();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_with(element: &str, type_name: &str) -> Arc<dyn SchemaIndex> {
        Arc::new(
            MemorySchemaIndex::builder()
                .element(ElementDeclaration::typed(QName::local(element), QName::local(type_name)))
                .type_definition(TypeDefinition::simple(QName::local(type_name)))
                .build(),
        )
    }

    #[test]
    fn test_first_index_wins() {
        let mut indexes = SchemaIndexes::new();
        indexes.push(index_with("road", "RoadType"));
        indexes.push(index_with("road", "OtherRoadType"));

        let road = indexes.find_element(&QName::local("road")).unwrap();
        assert_eq!(road.type_ref.type_name(), Some(&QName::local("RoadType")));
        assert_eq!(indexes.type_definitions().len(), 2);
    }

    #[test]
    fn test_resolve_reference() {
        let mut indexes = SchemaIndexes::new();
        indexes.push(index_with("road", "RoadType"));

        let reference = ElementDeclaration::reference(QName::local("road"));
        let target = indexes.resolve_reference(&reference).unwrap();
        assert_eq!(target.name, QName::local("road"));
        assert!(indexes
            .resolve_reference(&ElementDeclaration::reference(QName::local("rail")))
            .is_none());
    }

    #[test]
    fn test_substitution_group_union() {
        let head = ElementDeclaration::typed(QName::local("Shape"), QName::local("T"));
        let member = |name: &str| {
            ElementDeclaration::typed(QName::local(name), QName::local("T")).substitutes(QName::local("Shape"))
        };
        let mut indexes = SchemaIndexes::new();
        indexes.push(Arc::new(MemorySchemaIndex::builder().element(member("Circle")).build()));
        indexes.push(Arc::new(
            MemorySchemaIndex::builder()
                .element(member("Circle"))
                .element(member("Square"))
                .build(),
        ));

        let names: Vec<_> = indexes
            .substitution_group(&head)
            .iter()
            .map(|e| e.name.local_name.clone())
            .collect();
        assert_eq!(names, vec!["Circle", "Square"]);
    }

    #[test]
    fn test_cyclic_extension_terminates() {
        let looped = TypeDefinition::complex(QName::local("Loop"))
            .extending(Arc::new(TypeDefinition::complex(QName::local("Loop"))))
            .with_element(ElementParticle::new(ElementDeclaration::typed(
                QName::local("x"),
                QName::xs("string"),
            )));
        let index = MemorySchemaIndex::builder().type_definition(looped).build();
        let def = index.find_type(&QName::local("Loop")).unwrap();
        assert_eq!(index.child_elements(&def, true).len(), 1);
    }

    /// Index with its own occurrence and nillability answers
    #[derive(Debug)]
    struct FixedOccursIndex(MemorySchemaIndex);

    impl SchemaIndex for FixedOccursIndex {
        fn find_element(&self, name: &QName) -> Option<Arc<ElementDeclaration>> {
            self.0.find_element(name)
        }

        fn find_type(&self, name: &QName) -> Option<Arc<TypeDefinition>> {
            self.0.find_type(name)
        }

        fn type_definitions(&self) -> Vec<Arc<TypeDefinition>> {
            self.0.type_definitions()
        }

        fn substitution_group(&self, element: &ElementDeclaration) -> Vec<Arc<ElementDeclaration>> {
            self.0.substitution_group(element)
        }

        fn min_occurs(&self, _container: &TypeDefinition, _element: &ElementDeclaration) -> u32 {
            7
        }

        fn max_occurs(&self, _container: &TypeDefinition, _element: &ElementDeclaration) -> Option<u32> {
            Some(9)
        }

        fn is_nillable(&self, _element: &ElementDeclaration) -> bool {
            true
        }
    }

    #[test]
    fn test_overridden_queries_reach_owner() {
        let child = ElementDeclaration::typed(QName::local("c"), QName::xs("string")).local();
        let fixed = FixedOccursIndex(
            MemorySchemaIndex::builder()
                .type_definition(TypeDefinition::complex(QName::local("T")).with_element(ElementParticle::new(child.clone())))
                .build(),
        );

        let mut indexes = SchemaIndexes::new();
        indexes.push(index_with("road", "RoadType"));
        indexes.push(Arc::new(fixed));

        let container = indexes.find_type(&QName::local("T")).unwrap();
        assert_eq!(indexes.min_occurs(&container, &child), 7);
        assert_eq!(indexes.max_occurs(&container, &child), Some(9));
        assert_eq!(indexes.child_elements(&container, true).len(), 1);

        // types owned by the plain index keep the default answers
        let road = TypeDefinition::simple(QName::local("RoadType"));
        assert_eq!(indexes.min_occurs(&road, &child), 1);
        assert!(!indexes.is_nillable(&child));
    }

    #[test]
    fn test_empty_list_uses_defaults() {
        let child = ElementDeclaration::typed(QName::local("c"), QName::xs("string")).local();
        let container = TypeDefinition::complex(QName::local("T"))
            .with_element(ElementParticle::new(child.clone()).with_occurs(Occurs::optional()));

        let indexes = SchemaIndexes::new();
        assert_eq!(indexes.child_elements(&container, true).len(), 1);
        assert_eq!(indexes.min_occurs(&container, &child), 0);
        assert_eq!(indexes.max_occurs(&container, &child), Some(1));
        assert!(!indexes.is_nillable(&child));
    }

    #[test]
    fn test_dispose_all() {
        let mut indexes = SchemaIndexes::new();
        let index = Arc::new(
            MemorySchemaIndex::builder()
                .type_definition(TypeDefinition::simple(QName::local("T")))
                .build(),
        );
        indexes.push(index.clone());
        indexes.dispose_all();
        assert!(indexes.is_empty());
        assert!(index.is_empty());
    }
}
