//! Registry configuration
//!
//! This module defines the options a [`TypeRegistry`](crate::registry::TypeRegistry)
//! is created with. The structure is plain data so it can be embedded in a
//! caller's own (serde) configuration.

use serde::{Deserialize, Serialize};

/// Options for a type resolution session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Append one `@name` descriptor per attribute use to complex types
    pub include_attributes: bool,

    /// Seed the registry with foundation types (XSD built-ins plus the
    /// policy's schemas and configurations)
    pub foundation: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            include_attributes: false,
            foundation: true,
        }
    }
}

impl RegistryConfig {
    /// Create a new RegistryConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration that skips the foundation bootstrap entirely.
    ///
    /// Only named types reachable from the added schema indexes will resolve,
    /// so built-in base types such as `xs:string` must then be declared there.
    pub fn isolated() -> Self {
        Self {
            include_attributes: false,
            foundation: false,
        }
    }

    /// Enable or disable attribute descriptors
    pub fn with_include_attributes(mut self, include: bool) -> Self {
        self.include_attributes = include;
        self
    }

    /// Enable or disable the foundation bootstrap
    pub fn with_foundation(mut self, foundation: bool) -> Self {
        self.foundation = foundation;
        self
    }
}
