//! Type registry
//!
//! A [`TypeRegistry`] is one resolution session: it owns the schema
//! indexes it was given, a named and an anonymous type cache, a descriptor
//! cache for top-level elements, and the in-progress stack guarding against
//! cyclic definitions. Types are built on first request and cached.
//!
//! A registry is single-threaded; run independent registries on separate
//! threads instead. The only state they share is the
//! [`FoundationTypeCache`].
//!
//! Schema indexes stay owned by the caller. Dropping a registry only
//! releases its handles to them; [`TypeRegistry::dispose`] is the one
//! place that calls [`SchemaIndex::dispose`].
//!
//! The registry must outlive any use of the type graph it produced.
//! Cyclic links are proxies holding a weak handle to the registry's type
//! cache, and they fail with [`Error::CacheReleased`] once the registry is
//! dropped.
//!
//! [`Error::CacheReleased`]: crate::Error::CacheReleased

mod builder;
pub mod foundation;
pub mod policy;
pub mod stack;

use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

use crate::config::RegistryConfig;
use crate::crs::Crs;
use crate::error::Result;
use crate::namespaces::{NamespaceContext, QName};
use crate::schema::{SchemaIndex, SchemaIndexes};
use crate::types::{AttributeType, PropertyDescriptor, TypeCache};

pub use foundation::{Configuration, FoundationSchema, FoundationTypeCache, FoundationTypes};
pub use policy::{DefaultPolicy, RegistryPolicy};
pub use stack::InProgressStack;

/// Lazily resolving registry of attribute types.
///
/// Keep the registry alive while records it returned are traversed:
/// proxies inside those records resolve through its cache and return
/// [`Error::CacheReleased`](crate::Error::CacheReleased) after it is gone.
pub struct TypeRegistry<P: RegistryPolicy = DefaultPolicy> {
    policy: P,
    config: RegistryConfig,
    namespaces: NamespaceContext,
    indexes: SchemaIndexes,
    types: TypeCache,
    anonymous_types: TypeCache,
    descriptors: IndexMap<QName, Arc<PropertyDescriptor>>,
    processing: InProgressStack,
    disposed: bool,
}

impl<P: RegistryPolicy> TypeRegistry<P> {
    /// Create a registry with the default configuration and the
    /// process-wide foundation cache
    pub fn new(policy: P) -> Result<Self> {
        Self::with_config(policy, RegistryConfig::default(), FoundationTypeCache::global())
    }

    /// Create a registry drawing its foundation types from `foundation`
    pub fn with_config(policy: P, config: RegistryConfig, foundation: &FoundationTypeCache) -> Result<Self> {
        let mut registry = Self {
            policy,
            config,
            namespaces: NamespaceContext::new(),
            indexes: SchemaIndexes::new(),
            types: TypeCache::new(),
            anonymous_types: TypeCache::new(),
            descriptors: IndexMap::new(),
            processing: InProgressStack::new(),
            disposed: false,
        };

        if registry.config.foundation {
            let shared = foundation.get_or_build::<P, _>(|| registry.bootstrap_foundation())?;
            registry.import_foundation(&shared);
        }
        Ok(registry)
    }

    /// Set the prefix mappings used by [`TypeRegistry::resolve_name`]
    pub fn with_namespaces(mut self, namespaces: NamespaceContext) -> Self {
        self.namespaces = namespaces;
        self
    }

    /// The policy
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// The configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// The prefix mappings
    pub fn namespaces(&self) -> &NamespaceContext {
        &self.namespaces
    }

    /// Append a schema index; earlier indexes win lookups
    pub fn add_schema(&mut self, index: Arc<dyn SchemaIndex>) {
        if self.disposed {
            log::warn!("schema added to a disposed registry");
        }
        self.indexes.push(index);
    }

    /// Number of schema indexes
    pub fn schema_count(&self) -> usize {
        self.indexes.len()
    }

    /// Resolve a `prefix:local` name against the configured prefixes
    pub fn resolve_name(&self, prefixed_name: &str) -> Result<QName> {
        self.namespaces.resolve(prefixed_name)
    }

    /// Get the type named `name`, building it on first request
    pub fn get_attribute_type(&mut self, name: &QName) -> Result<Arc<AttributeType>> {
        self.get_attribute_type_with(name, None)
    }

    /// Get the type named `name`, building it with `crs` on first request
    pub fn get_attribute_type_with(&mut self, name: &QName, crs: Option<&Crs>) -> Result<Arc<AttributeType>> {
        self.resolve_type(name, None, crs)?.resolve()
    }

    /// Get the descriptor of the top-level element `name`
    pub fn get_attribute_descriptor(
        &mut self,
        name: &QName,
        crs: Option<&Crs>,
    ) -> Result<Arc<PropertyDescriptor>> {
        if let Some(descriptor) = self.descriptors.get(name) {
            log::trace!("descriptor cache hit for {}", name);
            return Ok(descriptor.clone());
        }
        let descriptor = self.build_top_level_descriptor(name, crs)?;
        self.descriptors.insert(name.clone(), descriptor.clone());
        Ok(descriptor)
    }

    /// Insert a type into the named or anonymous cache. An existing entry
    /// is replaced.
    pub fn register(&self, ty: Arc<AttributeType>, anonymous: bool) {
        let name = ty.name.clone();
        let cache = if anonymous {
            &self.anonymous_types
        } else {
            &self.types
        };
        match cache.insert(name.clone(), ty) {
            Some(old) if !anonymous && !old.lazy => {
                log::warn!("type {} registered twice, keeping the newer one", name)
            }
            Some(_) => log::debug!("replaced {} type {}", cache_label(anonymous), name),
            None => log::debug!("registered {} type {}", cache_label(anonymous), name),
        }
    }

    /// Cached named type, without building
    pub fn named_type(&self, name: &QName) -> Option<Arc<AttributeType>> {
        self.types.get(name)
    }

    /// Cached anonymous type, by the name of the element that declares it
    pub fn anonymous_type(&self, name: &QName) -> Option<Arc<AttributeType>> {
        self.anonymous_types.get(name)
    }

    /// Cached top-level element descriptor, without building
    pub fn descriptor(&self, name: &QName) -> Option<Arc<PropertyDescriptor>> {
        self.descriptors.get(name).cloned()
    }

    /// Names in the named cache, in registration order
    pub fn named_types(&self) -> Vec<QName> {
        self.types.names()
    }

    /// Names in the anonymous cache, in registration order
    pub fn anonymous_types(&self) -> Vec<QName> {
        self.anonymous_types.names()
    }

    /// Names of the cached top-level element descriptors
    pub fn descriptor_names(&self) -> Vec<QName> {
        self.descriptors.keys().cloned().collect()
    }

    /// Number of named types
    pub fn named_type_count(&self) -> usize {
        self.types.len()
    }

    /// Number of anonymous types
    pub fn anonymous_type_count(&self) -> usize {
        self.anonymous_types.len()
    }

    /// Number of cached top-level element descriptors
    pub fn descriptor_count(&self) -> usize {
        self.descriptors.len()
    }

    /// Check if `name` is under construction
    pub fn is_building(&self, name: &QName) -> bool {
        self.processing.contains(name)
    }

    /// Check if [`TypeRegistry::dispose`] has run
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Dispose every schema index. Built types stay usable; further
    /// lookups of unbuilt names fail with `NotFound`.
    ///
    /// Dropping the registry leaves its indexes undisposed.
    pub fn dispose(&mut self) {
        if self.disposed {
            log::warn!("registry disposed twice");
            return;
        }
        log::debug!("disposing {} schema indexes", self.indexes.len());
        self.indexes.dispose_all();
        self.disposed = true;
    }
}

fn cache_label(anonymous: bool) -> &'static str {
    if anonymous {
        "anonymous"
    } else {
        "named"
    }
}

impl<P: RegistryPolicy> fmt::Debug for TypeRegistry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("config", &self.config)
            .field("schemas", &self.indexes.len())
            .field("types", &self.types.len())
            .field("anonymous_types", &self.anonymous_types.len())
            .field("descriptors", &self.descriptors.len())
            .field("disposed", &self.disposed)
            .finish()
    }
}
