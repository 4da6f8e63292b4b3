//! Foundation types
//!
//! Every registry starts from the same foundation: the XSD built-ins plus
//! whatever schemas its policy declares. Building that set is expensive,
//! so the result is computed once per policy type and shared through a
//! [`FoundationTypeCache`]. Registries copy the shared entries into their
//! own caches, so foundation records are reference-equal across registries
//! while each registry still owns its map.

use once_cell::sync::{Lazy, OnceCell};
use parking_lot::Mutex;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::mem;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::Result;
use crate::namespaces::QName;
use crate::schema::{SchemaIndex, BUILTIN_TYPES};
use crate::types::{AttributeType, Binding, TypeCache, TypeRef};

use super::policy::RegistryPolicy;
use super::TypeRegistry;

static GLOBAL: Lazy<FoundationTypeCache> = Lazy::new(FoundationTypeCache::new);

/// Bundle of pre-built types imported as-is
#[derive(Debug, Clone, Default)]
pub struct FoundationSchema {
    /// Namespace the types live in
    pub namespace: Option<String>,
    /// Types in registration order
    pub types: Vec<Arc<AttributeType>>,
}

impl FoundationSchema {
    /// Create a bundle
    pub fn new(namespace: Option<&str>, types: Vec<Arc<AttributeType>>) -> Self {
        Self {
            namespace: namespace.map(String::from),
            types,
        }
    }

    /// The XSD built-in types, each linked to its base
    pub fn xs() -> Self {
        let mut built: HashMap<&'static str, Arc<AttributeType>> = HashMap::new();
        let mut types = Vec::with_capacity(BUILTIN_TYPES.len());

        for builtin in BUILTIN_TYPES.iter() {
            let mut ty = if builtin.is_complex() {
                AttributeType {
                    binding: Binding::Any,
                    ..AttributeType::complex(builtin.qname(), Vec::new())
                }
            } else {
                AttributeType::simple(builtin.qname(), builtin.binding)
            };
            if let Some(base) = builtin.base_type.and_then(|b| built.get(b)) {
                ty = ty.with_super(TypeRef::Resolved(base.clone()));
            }
            let ty = Arc::new(ty);
            built.insert(builtin.name, ty.clone());
            types.push(ty);
        }

        Self::new(Some(crate::XSD_NAMESPACE), types)
    }

    /// Number of types in the bundle
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the bundle is empty
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Schema whose every named type definition is built into the foundation
#[derive(Debug, Clone)]
pub struct Configuration {
    /// Label used in logs
    pub name: String,
    /// Index supplying the definitions; disposed once the build is done
    pub index: Arc<dyn SchemaIndex>,
}

impl Configuration {
    /// Create a configuration
    pub fn new(name: impl Into<String>, index: Arc<dyn SchemaIndex>) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }
}

/// Shared result of a foundation build
#[derive(Debug, Default)]
pub struct FoundationTypes {
    types: TypeCache,
    anonymous: TypeCache,
}

impl FoundationTypes {
    /// Look up a named foundation type
    pub fn get(&self, name: &QName) -> Option<Arc<AttributeType>> {
        self.types.get(name)
    }

    /// Named foundation types
    pub fn types(&self) -> &TypeCache {
        &self.types
    }

    /// Anonymous types created while building the foundation
    pub fn anonymous(&self) -> &TypeCache {
        &self.anonymous
    }

    /// Number of named foundation types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if no foundation type exists
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Foundation builds keyed by policy type.
///
/// Concurrent first use with the same policy type builds once; the other
/// callers block until the build finishes and then share its result.
/// Failed builds leave the slot empty so a later call retries.
#[derive(Default)]
pub struct FoundationTypeCache {
    cells: Mutex<HashMap<TypeId, Arc<OnceCell<Arc<FoundationTypes>>>>>,
    builds: AtomicUsize,
}

impl FoundationTypeCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache
    pub fn global() -> &'static FoundationTypeCache {
        &GLOBAL
    }

    fn cell<P: RegistryPolicy>(&self) -> Arc<OnceCell<Arc<FoundationTypes>>> {
        self.cells
            .lock()
            .entry(TypeId::of::<P>())
            .or_default()
            .clone()
    }

    /// Get the foundation for `P`, running `build` if it does not exist yet
    pub fn get_or_build<P, F>(&self, build: F) -> Result<Arc<FoundationTypes>>
    where
        P: RegistryPolicy,
        F: FnOnce() -> Result<FoundationTypes>,
    {
        let cell = self.cell::<P>();
        let foundation = cell.get_or_try_init(|| {
            let foundation = build()?;
            self.builds.fetch_add(1, Ordering::SeqCst);
            Ok::<_, crate::Error>(Arc::new(foundation))
        })?;
        Ok(foundation.clone())
    }

    /// Get the foundation for `P` if it has been built
    pub fn get<P: RegistryPolicy>(&self) -> Option<Arc<FoundationTypes>> {
        self.cells
            .lock()
            .get(&TypeId::of::<P>())
            .and_then(|cell| cell.get().cloned())
    }

    /// Check if the foundation for `P` has been built
    pub fn contains<P: RegistryPolicy>(&self) -> bool {
        self.get::<P>().is_some()
    }

    /// Number of successful builds so far
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for FoundationTypeCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FoundationTypeCache")
            .field("policies", &self.cells.lock().len())
            .field("builds", &self.build_count())
            .finish()
    }
}

impl<P: RegistryPolicy> TypeRegistry<P> {
    /// Build the foundation into this registry's caches, then move those
    /// caches out. Proxies created on the way keep pointing at the moved
    /// caches, which the returned value keeps alive.
    pub(crate) fn bootstrap_foundation(&mut self) -> Result<FoundationTypes> {
        let mut schemas = vec![FoundationSchema::xs()];
        schemas.extend(self.policy.builtin_schemas());
        for schema in schemas {
            log::debug!(
                "importing {} foundation types from {:?}",
                schema.len(),
                schema.namespace
            );
            for ty in schema.types {
                self.register(ty, false);
            }
        }

        for configuration in self.policy.builtin_configurations() {
            log::debug!("building foundation configuration '{}'", configuration.name);
            self.indexes.push(configuration.index.clone());
            let built = self.build_configuration(configuration.index.as_ref());
            self.indexes.pop();
            configuration.index.dispose();
            built?;
        }

        Ok(FoundationTypes {
            types: mem::take(&mut self.types),
            anonymous: mem::take(&mut self.anonymous_types),
        })
    }

    fn build_configuration(&mut self, index: &dyn SchemaIndex) -> Result<()> {
        for definition in index.type_definitions() {
            let Some(name) = definition.name.clone() else {
                continue;
            };
            if self.types.get(&name).map(|t| !t.lazy).unwrap_or(false) {
                continue;
            }
            self.build_type(&name, &definition, None, false)?;
        }
        Ok(())
    }

    /// Copy shared foundation entries into this registry's caches
    pub(crate) fn import_foundation(&mut self, foundation: &FoundationTypes) {
        self.types.extend(foundation.types.snapshot());
        self.anonymous_types.extend(foundation.anonymous.snapshot());
        log::debug!(
            "registry starts with {} foundation types",
            foundation.types.len()
        );
    }
}
