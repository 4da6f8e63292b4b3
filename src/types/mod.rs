//! Resolved type records
//!
//! This module contains the output side of resolution:
//! - [`AttributeType`] records tagged by [`TypeKind`]
//! - [`PropertyDescriptor`]s binding names to types
//! - [`TypeRef`] links, either resolved or a [`ProxyType`] forward reference
//! - [`TypeCache`] maps shared between a registry and its proxies
//!
//! The free functions at the bottom answer descriptor lookups that span
//! super types and substitution groups.

pub mod attribute;
pub mod binding;
pub mod cache;
pub mod descriptor;
pub mod proxy;

use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;

use crate::namespaces::QName;

pub use attribute::{
    AttributeType, TypeKind, TypeTag, UserData, UserValue, ELEMENT_DECLARATION_KEY,
    SUBSTITUTION_GROUP_KEY, TYPE_DEFINITION_KEY,
};
pub use binding::{Binding, GeometryKind};
pub use cache::{TypeCache, TypeMap, WeakTypeCache};
pub use descriptor::PropertyDescriptor;
pub use proxy::{ProxyType, TypeRef};

/// All descriptors of `ty`, super type descriptors first.
///
/// A descriptor redeclared lower in the hierarchy replaces the inherited one
/// in place. Super types that cannot be resolved (a dangling proxy) end the
/// walk.
pub fn all_descriptors(ty: &AttributeType) -> Vec<Arc<PropertyDescriptor>> {
    let mut chain = vec![ty.descriptors().map(<[_]>::to_vec).unwrap_or_default()];
    let mut seen: HashSet<QName> = HashSet::new();
    seen.insert(ty.name.clone());

    let mut next = ty.super_type.clone();
    while let Some(link) = next {
        if !seen.insert(link.name().clone()) {
            break;
        }
        let Ok(parent) = link.resolve() else { break };
        chain.push(parent.descriptors().map(<[_]>::to_vec).unwrap_or_default());
        next = parent.super_type.clone();
    }

    let mut merged: IndexMap<QName, Arc<PropertyDescriptor>> = IndexMap::new();
    for level in chain.into_iter().rev() {
        for descriptor in level {
            merged.insert(descriptor.name.clone(), descriptor);
        }
    }
    merged.into_values().collect()
}

/// Find a descriptor by qualified name on `ty` or its super types, then
/// among the substitution group alternatives of those descriptors
pub fn find_descriptor(ty: &AttributeType, name: &QName) -> Option<Arc<PropertyDescriptor>> {
    let descriptors = all_descriptors(ty);
    if let Some(found) = descriptors.iter().find(|d| &d.name == name) {
        return Some(found.clone());
    }
    descriptors
        .iter()
        .filter_map(|d| d.substitution_group())
        .flatten()
        .find(|alt| &alt.name == name)
}

/// Find a descriptor by local name only, ignoring namespaces
pub fn find_descriptor_local(ty: &AttributeType, local_name: &str) -> Option<Arc<PropertyDescriptor>> {
    let descriptors = all_descriptors(ty);
    if let Some(found) = descriptors.iter().find(|d| d.name.local_name == local_name) {
        return Some(found.clone());
    }
    descriptors
        .iter()
        .filter_map(|d| d.substitution_group())
        .flatten()
        .find(|alt| alt.name.local_name == local_name)
}
