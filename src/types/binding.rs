//! Value bindings
//!
//! A binding names the runtime value class instances of a type take. The
//! registry only needs two questions answered about it: is it a geometry,
//! and is one binding assignable to another.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Geometry value classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    /// Any geometry
    Geometry,
    /// Point
    Point,
    /// LineString / Curve
    LineString,
    /// Polygon / Surface
    Polygon,
    /// MultiPoint
    MultiPoint,
    /// MultiLineString / MultiCurve
    MultiLineString,
    /// MultiPolygon / MultiSurface
    MultiPolygon,
    /// Heterogeneous collection
    GeometryCollection,
}

/// Runtime value class of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Binding {
    /// Untyped value (anyType, anySimpleType)
    Any,
    /// Text
    String,
    /// Boolean
    Boolean,
    /// Arbitrary precision decimal
    Decimal,
    /// Integer
    Integer,
    /// Single precision float
    Float,
    /// Double precision float
    Double,
    /// Duration
    Duration,
    /// Date and time
    DateTime,
    /// Calendar date (and partial dates)
    Date,
    /// Time of day
    Time,
    /// Binary content
    Binary,
    /// URI
    Uri,
    /// Qualified name
    QName,
    /// Geometry of the given kind
    Geometry(GeometryKind),
    /// Collection of properties (complex content)
    Collection,
    /// Feature
    Feature,
}

impl Binding {
    /// Check if this binding is a geometry value class
    pub fn is_geometry(&self) -> bool {
        matches!(self, Binding::Geometry(_))
    }

    /// Check if values of this binding can be used where `other` is expected
    pub fn is_assignable_to(&self, other: &Binding) -> bool {
        match (self, other) {
            (a, b) if a == b => true,
            (_, Binding::Any) => true,
            (Binding::Geometry(_), Binding::Geometry(GeometryKind::Geometry)) => true,
            (Binding::Integer, Binding::Decimal) => true,
            (Binding::Feature, Binding::Collection) => true,
            _ => false,
        }
    }
}

impl Default for Binding {
    fn default() -> Self {
        Binding::String
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Geometry(kind) => write!(f, "Geometry({:?})", kind),
            other => write!(f, "{:?}", other),
        }
    }
}
