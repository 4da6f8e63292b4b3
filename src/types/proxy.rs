//! Forward references to types under construction
//!
//! When a type (transitively) contains itself, the inner occurrence is
//! resolved to a [`ProxyType`]: a name, the kind the caller expects, and a
//! weak handle to the cache the real record will be registered in. Every
//! access looks the name up again, so a proxy dereferenced after the outer
//! build completes sees the finished record.

use std::fmt;
use std::sync::Arc;

use crate::crs::Crs;
use crate::error::{Error, Result};
use crate::namespaces::QName;

use super::attribute::{AttributeType, TypeTag};
use super::binding::Binding;
use super::cache::{TypeCache, WeakTypeCache};
use super::descriptor::PropertyDescriptor;

/// Stand-in for a type still under construction
#[derive(Clone)]
pub struct ProxyType {
    name: QName,
    expected: TypeTag,
    cache: WeakTypeCache,
}

impl ProxyType {
    /// Create a proxy resolving `name` in `cache`. Never fails.
    pub fn new(name: QName, expected: TypeTag, cache: &TypeCache) -> Self {
        Self {
            name,
            expected,
            cache: cache.downgrade(),
        }
    }

    /// Name of the proxied type
    pub fn name(&self) -> &QName {
        &self.name
    }

    /// Kind the proxy was created for
    pub fn expected(&self) -> TypeTag {
        self.expected
    }

    /// Look up the real record
    pub fn resolve(&self) -> Result<Arc<AttributeType>> {
        let cache = self
            .cache
            .upgrade()
            .ok_or_else(|| Error::CacheReleased(self.name.clone()))?;
        let subject = cache
            .get(&self.name)
            .ok_or_else(|| Error::NotFound(self.name.clone()))?;
        if !subject.tag().satisfies(self.expected) {
            return Err(Error::TypeMismatch {
                name: self.name.clone(),
                expected: self.expected,
                found: subject.tag(),
            });
        }
        Ok(subject)
    }
}

impl fmt::Debug for ProxyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyType")
            .field("name", &self.name.to_string())
            .field("expected", &self.expected)
            .finish()
    }
}

/// Reference from one record to another type
#[derive(Debug, Clone)]
pub enum TypeRef {
    /// Finished record
    Resolved(Arc<AttributeType>),
    /// Forward reference
    Proxy(ProxyType),
}

impl TypeRef {
    /// Wrap a freshly built record
    pub fn resolved(ty: AttributeType) -> Self {
        TypeRef::Resolved(Arc::new(ty))
    }

    /// Name of the referenced type
    pub fn name(&self) -> &QName {
        match self {
            TypeRef::Resolved(ty) => &ty.name,
            TypeRef::Proxy(proxy) => proxy.name(),
        }
    }

    /// Kind of the referenced type (the expected kind for proxies)
    pub fn tag(&self) -> TypeTag {
        match self {
            TypeRef::Resolved(ty) => ty.tag(),
            TypeRef::Proxy(proxy) => proxy.expected(),
        }
    }

    /// Check if this is a forward reference
    pub fn is_proxy(&self) -> bool {
        matches!(self, TypeRef::Proxy(_))
    }

    /// Get the referenced record
    pub fn resolve(&self) -> Result<Arc<AttributeType>> {
        match self {
            TypeRef::Resolved(ty) => Ok(ty.clone()),
            TypeRef::Proxy(proxy) => proxy.resolve(),
        }
    }

    /// Check if this refers to exactly the record `ty`
    pub fn points_to(&self, ty: &Arc<AttributeType>) -> bool {
        self.resolve().map(|r| Arc::ptr_eq(&r, ty)).unwrap_or(false)
    }

    /// Binding of the referenced type
    pub fn binding(&self) -> Result<Binding> {
        Ok(self.resolve()?.binding)
    }

    /// Super type of the referenced type
    pub fn super_type(&self) -> Result<Option<TypeRef>> {
        Ok(self.resolve()?.super_type.clone())
    }

    /// Child descriptors; fails fast if the type has none
    pub fn descriptors(&self) -> Result<Vec<Arc<PropertyDescriptor>>> {
        let subject = self.resolve()?;
        match subject.descriptors() {
            Some(descriptors) => Ok(descriptors.to_vec()),
            None => Err(Error::TypeMismatch {
                name: subject.name.clone(),
                expected: TypeTag::Complex,
                found: subject.tag(),
            }),
        }
    }

    /// CRS of the referenced feature or geometry type
    pub fn crs(&self) -> Result<Option<Crs>> {
        Ok(self.resolve()?.crs().cloned())
    }

    /// Default geometry of the referenced feature type; fails fast if it is
    /// not a feature type
    pub fn default_geometry(&self) -> Result<Option<Arc<PropertyDescriptor>>> {
        let subject = self.resolve()?;
        if !subject.is_feature() {
            return Err(Error::TypeMismatch {
                name: subject.name.clone(),
                expected: TypeTag::Feature,
                found: subject.tag(),
            });
        }
        Ok(subject.default_geometry().cloned())
    }
}

impl From<Arc<AttributeType>> for TypeRef {
    fn from(ty: Arc<AttributeType>) -> Self {
        TypeRef::Resolved(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_resolves_after_registration() {
        let cache = TypeCache::new();
        let name = QName::local("TreeNode");
        let proxy = TypeRef::Proxy(ProxyType::new(name.clone(), TypeTag::Complex, &cache));

        assert_eq!(proxy.resolve().unwrap_err(), Error::NotFound(name.clone()));

        let real = Arc::new(AttributeType::complex(name.clone(), Vec::new()));
        cache.insert(name.clone(), real.clone());
        assert!(proxy.points_to(&real));
        assert_eq!(proxy.descriptors().unwrap().len(), 0);
        assert_eq!(proxy.binding().unwrap(), Binding::Collection);
    }

    #[test]
    fn test_proxy_sees_last_write() {
        let cache = TypeCache::new();
        let name = QName::local("T");
        let proxy = ProxyType::new(name.clone(), TypeTag::Simple, &cache);
        cache.insert(name.clone(), Arc::new(AttributeType::simple(name.clone(), Binding::String)));
        let newer = Arc::new(AttributeType::simple(name.clone(), Binding::Integer));
        cache.insert(name.clone(), newer.clone());
        assert!(Arc::ptr_eq(&proxy.resolve().unwrap(), &newer));
    }

    #[test]
    fn test_proxy_kind_mismatch() {
        let cache = TypeCache::new();
        let name = QName::local("Leaf");
        cache.insert(name.clone(), Arc::new(AttributeType::simple(name.clone(), Binding::String)));

        let proxy = ProxyType::new(name.clone(), TypeTag::Feature, &cache);
        assert_eq!(
            proxy.resolve().unwrap_err(),
            Error::TypeMismatch {
                name: name.clone(),
                expected: TypeTag::Feature,
                found: TypeTag::Simple,
            }
        );
    }

    #[test]
    fn test_feature_satisfies_complex_proxy() {
        let cache = TypeCache::new();
        let name = QName::local("Road");
        cache.insert(name.clone(), Arc::new(AttributeType::feature(name.clone(), Vec::new(), None)));
        let proxy = TypeRef::Proxy(ProxyType::new(name, TypeTag::Complex, &cache));
        assert!(proxy.resolve().is_ok());
        assert!(proxy.default_geometry().unwrap().is_none());
    }

    #[test]
    fn test_descriptors_of_simple_fails_fast() {
        let simple = TypeRef::resolved(AttributeType::simple(QName::xs("string"), Binding::String));
        assert!(matches!(simple.descriptors(), Err(Error::TypeMismatch { .. })));
        assert!(matches!(simple.default_geometry(), Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn test_proxy_after_cache_released() {
        let cache = TypeCache::new();
        let proxy = ProxyType::new(QName::local("Gone"), TypeTag::Complex, &cache);
        drop(cache);
        assert_eq!(
            proxy.resolve().unwrap_err(),
            Error::CacheReleased(QName::local("Gone"))
        );
    }
}
