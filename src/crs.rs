//! Coordinate reference system handle
//!
//! The registry never interprets a CRS; it only carries the value from the
//! caller into geometry types and descriptors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque coordinate reference system, identified by its authority code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Crs {
    /// Authority code, e.g. `EPSG:4326`
    pub identifier: String,
}

impl Crs {
    /// Create a CRS from its identifier
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }

    /// Shortcut for an EPSG code
    pub fn epsg(code: u32) -> Self {
        Self::new(format!("EPSG:{}", code))
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier)
    }
}
