//! Shared name to type caches
//!
//! The registry owns its caches; proxies hold only a weak handle so a
//! cyclic type graph never keeps its own cache alive.

use indexmap::IndexMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::namespaces::QName;

use super::attribute::AttributeType;

/// Type map - maps QNames to resolved types, in registration order
pub type TypeMap = IndexMap<QName, Arc<AttributeType>>;

/// Shared handle to a type map
#[derive(Clone, Default)]
pub struct TypeCache {
    inner: Arc<RwLock<TypeMap>>,
}

impl TypeCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a type
    pub fn get(&self, name: &QName) -> Option<Arc<AttributeType>> {
        self.inner.read().get(name).cloned()
    }

    /// Check if a name is registered
    pub fn contains(&self, name: &QName) -> bool {
        self.inner.read().contains_key(name)
    }

    /// Insert a type, returning the value it replaced
    pub fn insert(&self, name: QName, ty: Arc<AttributeType>) -> Option<Arc<AttributeType>> {
        self.inner.write().insert(name, ty)
    }

    /// Bulk insert
    pub fn extend<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (QName, Arc<AttributeType>)>,
    {
        self.inner.write().extend(entries);
    }

    /// Copy of the current entries
    pub fn snapshot(&self) -> TypeMap {
        self.inner.read().clone()
    }

    /// Registered names in insertion order
    pub fn names(&self) -> Vec<QName> {
        self.inner.read().keys().cloned().collect()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Weak handle for proxies
    pub fn downgrade(&self) -> WeakTypeCache {
        WeakTypeCache {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Check if both handles point to the same cache
    pub fn ptr_eq(&self, other: &TypeCache) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for TypeCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeCache").field("len", &self.len()).finish()
    }
}

/// Weak handle to a type map
#[derive(Clone, Default)]
pub struct WeakTypeCache {
    inner: Weak<RwLock<TypeMap>>,
}

impl WeakTypeCache {
    /// Upgrade to a strong handle if the cache is still alive
    pub fn upgrade(&self) -> Option<TypeCache> {
        self.inner.upgrade().map(|inner| TypeCache { inner })
    }
}

impl fmt::Debug for WeakTypeCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WeakTypeCache")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Binding;

    #[test]
    fn test_insert_overwrites() {
        let cache = TypeCache::new();
        let name = QName::local("T");
        let first = Arc::new(AttributeType::simple(name.clone(), Binding::String));
        let second = Arc::new(AttributeType::simple(name.clone(), Binding::Integer));

        assert!(cache.insert(name.clone(), first.clone()).is_none());
        let old = cache.insert(name.clone(), second.clone());
        assert!(old.map(|o| Arc::ptr_eq(&o, &first)).unwrap_or(false));
        assert!(Arc::ptr_eq(&cache.get(&name).unwrap(), &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_weak_handle() {
        let cache = TypeCache::new();
        let weak = cache.downgrade();
        assert!(weak.upgrade().map(|c| c.ptr_eq(&cache)).unwrap_or(false));
        drop(cache);
        assert!(weak.upgrade().is_none());
    }
}
