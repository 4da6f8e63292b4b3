//! Type construction
//!
//! Depth-first construction of attribute types from schema definitions.
//! Every type being built is pushed on the in-progress stack; meeting it
//! again on the way down yields a proxy instead of recursing, so cyclic
//! schemas terminate. Proxies look their target up by name when used,
//! which by then finds the finished record.

use once_cell::sync::Lazy;
use std::sync::Arc;

use crate::crs::Crs;
use crate::error::{Error, Result};
use crate::names;
use crate::namespaces::QName;
use crate::schema::{ElementDeclaration, ElementTypeRef, Occurs, SchemaIndex, TypeDefinition};
use crate::types::{
    AttributeType, Binding, GeometryKind, PropertyDescriptor, ProxyType, TypeRef, TypeTag, UserValue,
    ELEMENT_DECLARATION_KEY, SUBSTITUTION_GROUP_KEY, TYPE_DEFINITION_KEY,
};

use super::policy::RegistryPolicy;
use super::TypeRegistry;

/// Shared type of the descriptors synthesized for attribute uses
static XML_ATTRIBUTE_TYPE: Lazy<Arc<AttributeType>> =
    Lazy::new(|| Arc::new(AttributeType::simple(QName::local("@attribute"), Binding::String)));

impl<P: RegistryPolicy> TypeRegistry<P> {
    /// Cached type, or a fresh build from `hint` or the indexed definition.
    /// Lazy placeholders are rebuilt when a definition is available.
    pub(crate) fn resolve_type(
        &mut self,
        name: &QName,
        hint: Option<&Arc<TypeDefinition>>,
        crs: Option<&Crs>,
    ) -> Result<TypeRef> {
        let cached = self.types.get(name);
        if let Some(ty) = cached.as_ref().filter(|t| !t.lazy) {
            log::trace!("type cache hit for {}", name);
            return Ok(TypeRef::Resolved(ty.clone()));
        }

        let definition = self.indexes.find_type(name).or_else(|| hint.cloned());
        match (definition, cached) {
            (Some(definition), _) => self.build_type(name, &definition, crs, false),
            (None, Some(placeholder)) => {
                log::debug!("no definition to flesh out lazy type {}", name);
                Ok(TypeRef::Resolved(placeholder))
            }
            (None, None) => Err(Error::NotFound(name.clone())),
        }
    }

    /// Build `definition` under `name` and register the result, or return a
    /// proxy if `name` is already under construction
    pub(crate) fn build_type(
        &mut self,
        name: &QName,
        definition: &Arc<TypeDefinition>,
        crs: Option<&Crs>,
        anonymous: bool,
    ) -> Result<TypeRef> {
        if self.processing.contains(name) {
            log::debug!("recursion found for type {}", name);
            let cache = if anonymous {
                &self.anonymous_types
            } else {
                &self.types
            };
            let expected = self.expected_tag(definition);
            return Ok(TypeRef::Proxy(ProxyType::new(name.clone(), expected, cache)));
        }

        self.processing.push(name.clone())?;
        let assembled = self.assemble_type(name, definition, crs);
        self.processing.pop(name);

        let ty = Arc::new(assembled?);
        self.register(ty.clone(), anonymous);
        Ok(TypeRef::Resolved(ty))
    }

    fn expected_tag(&self, definition: &TypeDefinition) -> TypeTag {
        if !definition.complex {
            TypeTag::Simple
        } else if self.policy.is_feature_type(definition) {
            TypeTag::Feature
        } else if self.policy.is_geometry_type(definition) {
            TypeTag::Geometry
        } else {
            TypeTag::Complex
        }
    }

    fn assemble_type(
        &mut self,
        name: &QName,
        definition: &Arc<TypeDefinition>,
        crs: Option<&Crs>,
    ) -> Result<AttributeType> {
        let super_type = match definition.base_name().cloned() {
            Some(base_name) => Some(self.resolve_type(&base_name, definition.base.as_ref(), None)?),
            None => {
                if definition.base.is_some() {
                    log::debug!("anonymous base of {} is not a super type", name);
                }
                None
            }
        };

        let mut ty = match self.expected_tag(definition) {
            TypeTag::Simple => AttributeType::simple(
                name.clone(),
                self.policy.binding_of(definition).unwrap_or_default(),
            )
            .with_restrictions(definition.facets.clone()),
            TypeTag::Geometry => AttributeType::geometry(
                name.clone(),
                self.policy
                    .binding_of(definition)
                    .unwrap_or(Binding::Geometry(GeometryKind::Geometry)),
                crs.cloned(),
            ),
            TypeTag::Feature => {
                let descriptors = self.child_descriptors(definition, crs)?;
                AttributeType::feature(name.clone(), descriptors, crs.cloned())
            }
            TypeTag::Complex => {
                let descriptors = self.child_descriptors(definition, crs)?;
                AttributeType::complex(name.clone(), descriptors)
                    .identified(self.policy.is_identifiable(definition))
            }
        };

        ty = ty.abstract_type(definition.abstract_type);
        if let Some(super_type) = super_type {
            ty = ty.with_super(super_type);
        }
        ty.user_data
            .insert(TYPE_DEFINITION_KEY, UserValue::TypeDefinition(definition.clone()));
        Ok(ty)
    }

    fn child_descriptors(
        &mut self,
        definition: &Arc<TypeDefinition>,
        crs: Option<&Crs>,
    ) -> Result<Vec<Arc<PropertyDescriptor>>> {
        let particles = self.indexes.child_elements(definition, true);
        let mut descriptors = Vec::with_capacity(particles.len());
        for particle in &particles {
            descriptors.push(self.create_descriptor(Some(definition), &particle.element, crs)?);
        }

        if self.config.include_attributes {
            for attribute in self.indexes.attribute_uses(definition) {
                let name = names::attribute_descriptor_name(&attribute.name);
                let occurs = Occurs::new(u32::from(attribute.required), Some(1));
                let descriptor =
                    PropertyDescriptor::new(name, TypeRef::Resolved(XML_ATTRIBUTE_TYPE.clone()), occurs)
                        .with_default(attribute.default.clone());
                descriptors.push(Arc::new(descriptor));
            }
        }

        for (particle, descriptor) in particles.iter().zip(&descriptors) {
            self.set_substitution_group(&particle.element, descriptor, crs)?;
        }
        Ok(descriptors)
    }

    /// Global declaration behind an element reference, or the element itself
    fn resolve_element(&self, element: &Arc<ElementDeclaration>) -> Result<Arc<ElementDeclaration>> {
        match &element.ref_element {
            Some(target) => self
                .indexes
                .resolve_reference(element)
                .ok_or_else(|| Error::NotFound(target.clone())),
            None => Ok(element.clone()),
        }
    }

    /// Type of an element that is not a reference. Inline types are built
    /// under the element's name into the anonymous cache.
    pub(crate) fn get_type_of_element(
        &mut self,
        element: &ElementDeclaration,
        crs: Option<&Crs>,
    ) -> Result<TypeRef> {
        match &element.type_ref {
            ElementTypeRef::Anonymous(definition) => {
                self.build_type(&element.name, definition, crs, true)
            }
            ElementTypeRef::Named(type_name) => self.resolve_type(type_name, None, crs),
            ElementTypeRef::Missing => Err(Error::MissingTypeDefinition(element.name.clone())),
        }
    }

    /// Descriptor for `element` inside `container`. Without a container the
    /// element may occur any number of times, including none.
    fn create_descriptor(
        &mut self,
        container: Option<&Arc<TypeDefinition>>,
        element: &Arc<ElementDeclaration>,
        crs: Option<&Crs>,
    ) -> Result<Arc<PropertyDescriptor>> {
        let resolved = self.resolve_element(element)?;
        let type_ref = self.get_type_of_element(&resolved, crs)?;

        let occurs = match container {
            Some(container) => Occurs::new(
                self.indexes.min_occurs(container, element),
                self.indexes.max_occurs(container, element),
            ),
            None => Occurs::zero_or_more(),
        };
        let nillable = self.indexes.is_nillable(&resolved);

        let descriptor = make_descriptor(resolved.name.clone(), type_ref, occurs, nillable, crs)
            .with_default(resolved.default.clone());
        descriptor
            .user_data
            .insert(ELEMENT_DECLARATION_KEY, UserValue::ElementDeclaration(resolved));
        Ok(Arc::new(descriptor))
    }

    pub(crate) fn build_top_level_descriptor(
        &mut self,
        name: &QName,
        crs: Option<&Crs>,
    ) -> Result<Arc<PropertyDescriptor>> {
        let element = self
            .indexes
            .find_element(name)
            .ok_or_else(|| Error::NotFound(name.clone()))?;
        let descriptor = self.create_descriptor(None, &element, crs)?;
        self.set_substitution_group(&element, &descriptor, crs)?;
        Ok(descriptor)
    }

    /// Record on `descriptor` the descriptors of every element that may
    /// substitute for `element`, then do the same inside the element's own
    /// named type. Runs at most once per descriptor.
    pub(crate) fn set_substitution_group(
        &mut self,
        element: &Arc<ElementDeclaration>,
        descriptor: &Arc<PropertyDescriptor>,
        crs: Option<&Crs>,
    ) -> Result<()> {
        if descriptor.user_data.contains(SUBSTITUTION_GROUP_KEY) {
            return Ok(());
        }
        // Marker first: member types may lead back to this descriptor.
        descriptor
            .user_data
            .insert(SUBSTITUTION_GROUP_KEY, UserValue::SubstitutionGroup(Vec::new()));

        let group = match self.substitution_descriptors(element, descriptor, crs) {
            Ok(group) => group,
            Err(err) => {
                descriptor.user_data.remove(SUBSTITUTION_GROUP_KEY);
                return Err(err);
            }
        };
        if !group.is_empty() {
            log::debug!(
                "substitution group of {} has {} members",
                descriptor.name,
                group.len()
            );
        }
        descriptor
            .user_data
            .insert(SUBSTITUTION_GROUP_KEY, UserValue::SubstitutionGroup(group));

        let resolved = self.resolve_element(element)?;
        if let ElementTypeRef::Named(type_name) = &resolved.type_ref {
            self.propagate_substitution_groups(type_name, crs)?;
        }
        Ok(())
    }

    fn substitution_descriptors(
        &mut self,
        element: &Arc<ElementDeclaration>,
        descriptor: &PropertyDescriptor,
        crs: Option<&Crs>,
    ) -> Result<Vec<Arc<PropertyDescriptor>>> {
        let resolved = self.resolve_element(element)?;
        let members = self.indexes.substitution_group(&resolved);

        let mut group = Vec::with_capacity(members.len());
        for member in members {
            if member.name == resolved.name {
                continue;
            }
            let type_ref = self.get_type_of_element(&member, crs)?;
            let alternative = make_descriptor(
                member.name.clone(),
                type_ref,
                descriptor.occurs,
                descriptor.nillable,
                crs,
            )
            .with_default(member.default.clone());
            alternative
                .user_data
                .insert(ELEMENT_DECLARATION_KEY, UserValue::ElementDeclaration(member));
            group.push(Arc::new(alternative));
        }
        Ok(group)
    }

    /// Make sure the children of the complex type `type_name` have their
    /// substitution groups. Types under construction are skipped and not
    /// revisited later.
    fn propagate_substitution_groups(&mut self, type_name: &QName, crs: Option<&Crs>) -> Result<()> {
        if self.processing.contains(type_name) {
            return Ok(());
        }

        let cached = self.types.get(type_name).filter(|t| !t.lazy);
        let Some(ty) = cached else {
            if let Some(definition) = self.indexes.find_type(type_name).filter(|d| d.complex) {
                self.build_type(type_name, &definition, crs, false)?;
            }
            return Ok(());
        };

        let (Some(definition), Some(descriptors)) = (
            ty.user_data.type_definition(),
            ty.descriptors().map(<[_]>::to_vec),
        ) else {
            return Ok(());
        };
        let particles = self.indexes.child_elements(&definition, true);
        for descriptor in descriptors {
            if let Some(particle) = particles.iter().find(|p| p.element.name == descriptor.name) {
                self.set_substitution_group(&particle.element, &descriptor, crs)?;
            }
        }
        Ok(())
    }
}

/// Descriptor whose type is wrapped as a CRS-aware geometry when its binding
/// is a geometry
fn make_descriptor(
    name: QName,
    type_ref: TypeRef,
    occurs: Occurs,
    nillable: bool,
    crs: Option<&Crs>,
) -> PropertyDescriptor {
    let type_ref = match type_ref {
        TypeRef::Resolved(ty) if ty.binding.is_geometry() && !(ty.is_geometry() && crs.is_none()) => {
            TypeRef::resolved(AttributeType::geometry_of(&ty, crs.cloned()))
        }
        other => other,
    };
    PropertyDescriptor::new(name, type_ref, occurs).nillable(nillable)
}
