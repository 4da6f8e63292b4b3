//! Registry policy
//!
//! A [`RegistryPolicy`] decides how schema definitions map onto record
//! kinds (feature, geometry, identifiable) and which foundation schemas are
//! bootstrapped into every registry using it. The policy's type is the key
//! under which the foundation types are shared, so two registries using
//! the same policy type see the same foundation records.

use crate::schema::TypeDefinition;
use crate::types::Binding;

use super::foundation::{Configuration, FoundationSchema};

/// Hooks consulted while building types
pub trait RegistryPolicy: Send + Sync + 'static {
    /// Check if a complex definition represents a feature
    fn is_feature_type(&self, _definition: &TypeDefinition) -> bool {
        false
    }

    /// Check if a complex definition represents a geometry
    fn is_geometry_type(&self, _definition: &TypeDefinition) -> bool {
        false
    }

    /// Check if instances of a complex definition carry an identifier
    fn is_identifiable(&self, _definition: &TypeDefinition) -> bool {
        false
    }

    /// Binding for a definition; the string binding is used for simple
    /// types and a generic geometry for geometry types when this is None
    fn binding_of(&self, _definition: &TypeDefinition) -> Option<Binding> {
        None
    }

    /// Pre-built schemas imported into the foundation types
    fn builtin_schemas(&self) -> Vec<FoundationSchema> {
        Vec::new()
    }

    /// Schemas whose every named type is built into the foundation types
    fn builtin_configurations(&self) -> Vec<Configuration> {
        Vec::new()
    }
}

/// Policy with no features, no geometries and no extra foundation schemas
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPolicy;

impl RegistryPolicy for DefaultPolicy {}
