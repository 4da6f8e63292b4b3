//! In-memory schema index
//!
//! [`MemorySchemaIndex`] holds the global element and type declarations of
//! one schema (or a set of schemas sharing a lifetime) and answers the
//! [`SchemaIndex`] queries against them. It is assembled through
//! [`MemorySchemaIndexBuilder`].

use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::namespaces::QName;

use super::definitions::TypeDefinition;
use super::elements::ElementDeclaration;
use super::SchemaIndex;

/// Type map - maps QNames to global type definitions
pub type TypeDefinitionMap = IndexMap<QName, Arc<TypeDefinition>>;
/// Element map - maps QNames to global element declarations
pub type ElementMap = IndexMap<QName, Arc<ElementDeclaration>>;
/// Substitution group map - maps head element QNames to substitute elements
pub type SubstitutionGroupMap = HashMap<QName, Vec<Arc<ElementDeclaration>>>;

#[derive(Debug, Default)]
struct GlobalMaps {
    types: TypeDefinitionMap,
    elements: ElementMap,
    substitution_groups: SubstitutionGroupMap,
}

impl GlobalMaps {
    fn clear(&mut self) {
        self.types.clear();
        self.elements.clear();
        self.substitution_groups.clear();
    }
}

/// Read-only index over global declarations
#[derive(Debug, Default)]
pub struct MemorySchemaIndex {
    target_namespace: Option<String>,
    maps: RwLock<GlobalMaps>,
}

impl MemorySchemaIndex {
    /// Start assembling an index
    pub fn builder() -> MemorySchemaIndexBuilder {
        MemorySchemaIndexBuilder::default()
    }

    /// Target namespace of the indexed schema
    pub fn target_namespace(&self) -> Option<&str> {
        self.target_namespace.as_deref()
    }

    /// Look up a global type definition
    pub fn lookup_type(&self, name: &QName) -> Option<Arc<TypeDefinition>> {
        self.maps.read().types.get(name).cloned()
    }

    /// Look up a global element declaration
    pub fn lookup_element(&self, name: &QName) -> Option<Arc<ElementDeclaration>> {
        self.maps.read().elements.get(name).cloned()
    }

    /// Direct members of the substitution group headed by `head`
    pub fn direct_substitutes(&self, head: &QName) -> Vec<Arc<ElementDeclaration>> {
        self.maps
            .read()
            .substitution_groups
            .get(head)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of global type definitions
    pub fn type_count(&self) -> usize {
        self.maps.read().types.len()
    }

    /// Number of global element declarations
    pub fn element_count(&self) -> usize {
        self.maps.read().elements.len()
    }

    /// Check if the index holds nothing (never filled or disposed)
    pub fn is_empty(&self) -> bool {
        let maps = self.maps.read();
        maps.types.is_empty() && maps.elements.is_empty()
    }
}

impl SchemaIndex for MemorySchemaIndex {
    fn find_element(&self, name: &QName) -> Option<Arc<ElementDeclaration>> {
        self.lookup_element(name)
    }

    fn find_type(&self, name: &QName) -> Option<Arc<TypeDefinition>> {
        self.lookup_type(name)
    }

    fn type_definitions(&self) -> Vec<Arc<TypeDefinition>> {
        self.maps.read().types.values().cloned().collect()
    }

    /// Members of the substitution group headed by `element`, including
    /// members of nested groups
    fn substitution_group(&self, element: &ElementDeclaration) -> Vec<Arc<ElementDeclaration>> {
        let maps = self.maps.read();
        let mut members = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(element.name.clone());

        let mut pending = vec![element.name.clone()];
        while let Some(head) = pending.pop() {
            let Some(direct) = maps.substitution_groups.get(&head) else {
                continue;
            };
            for member in direct {
                if visited.insert(member.name.clone()) {
                    pending.push(member.name.clone());
                    members.push(member.clone());
                }
            }
        }
        members
    }

    fn dispose(&self) {
        self.maps.write().clear();
    }
}

/// Builder for [`MemorySchemaIndex`]
#[derive(Debug, Default)]
pub struct MemorySchemaIndexBuilder {
    target_namespace: Option<String>,
    maps: GlobalMaps,
}

impl MemorySchemaIndexBuilder {
    /// Set the target namespace
    pub fn target_namespace(mut self, ns: impl Into<String>) -> Self {
        self.target_namespace = Some(ns.into());
        self
    }

    /// Register a global type definition; anonymous definitions are ignored
    pub fn type_definition(mut self, definition: TypeDefinition) -> Self {
        match definition.name.clone() {
            Some(name) => {
                self.maps.types.insert(name, Arc::new(definition));
            }
            None => log::warn!("ignoring anonymous global type definition"),
        }
        self
    }

    /// Register a shared global type definition
    pub fn shared_type(mut self, definition: Arc<TypeDefinition>) -> Self {
        match definition.name.clone() {
            Some(name) => {
                self.maps.types.insert(name, definition);
            }
            None => log::warn!("ignoring anonymous global type definition"),
        }
        self
    }

    /// Register a global element declaration and record its substitution
    /// group membership
    pub fn element(mut self, element: ElementDeclaration) -> Self {
        let element = Arc::new(element);
        if let Some(head) = element.substitution_group.clone() {
            if head != element.name {
                self.maps
                    .substitution_groups
                    .entry(head)
                    .or_default()
                    .push(element.clone());
            }
        }
        self.maps.elements.insert(element.name.clone(), element);
        self
    }

    /// Finish the index
    pub fn build(self) -> MemorySchemaIndex {
        log::debug!(
            "indexed {} types and {} elements for namespace {:?}",
            self.maps.types.len(),
            self.maps.elements.len(),
            self.target_namespace
        );
        MemorySchemaIndex {
            target_namespace: self.target_namespace,
            maps: RwLock::new(self.maps),
        }
    }
}
