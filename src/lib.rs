//! # xsd-featuretypes
//!
//! Lazy resolution of XML Schema (XSD) type and element declarations into
//! feature type records.
//!
//! ## Features
//!
//! - On-demand construction of simple, complex, feature and geometry types
//! - Cyclic schemas resolved through forward-reference proxies
//! - Separate caches for named and anonymous (inline) types
//! - Substitution group alternatives recorded on descriptors
//! - Foundation types (XSD built-ins and policy schemas) built once per
//!   policy type and shared between registries
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use xsd_featuretypes::{DefaultPolicy, MemorySchemaIndex, QName, TypeRegistry};
//!
//! let mut registry = TypeRegistry::new(DefaultPolicy)?;
//! registry.add_schema(Arc::new(index));
//!
//! let tree = registry.get_attribute_type(&QName::local("TreeNode"))?;
//! let root = registry.get_attribute_descriptor(&QName::local("root"), None)?;
//! registry.dispose();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod error;
pub mod config;

// Utilities
pub mod namespaces;
pub mod names;
pub mod crs;

// Schema input
pub mod schema;

// Resolution output and engine
pub mod types;
pub mod registry;

// Inspection support
pub mod dump;

// Re-exports for convenience
pub use config::RegistryConfig;
pub use crs::Crs;
pub use error::{Error, Result};
pub use namespaces::{NamespaceContext, QName};
pub use registry::{
    Configuration, DefaultPolicy, FoundationSchema, FoundationTypeCache, RegistryPolicy, TypeRegistry,
};
pub use schema::{MemorySchemaIndex, SchemaIndex};
pub use types::{AttributeType, Binding, PropertyDescriptor, TypeKind, TypeRef, TypeTag};

/// Version of the xsd-featuretypes library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// XSD namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// XML namespace
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
