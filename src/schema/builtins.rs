//! XSD built-in types
//!
//! This module defines the built-in primitive and derived types of XML
//! Schema together with the value binding each resolves to. The table is
//! ordered so every base type precedes the types derived from it.

use crate::namespaces::QName;
use crate::types::Binding;

// =============================================================================
// Type Names
// =============================================================================

/// XSD anyType type name
pub const XSD_ANY_TYPE: &str = "anyType";
/// XSD anySimpleType type name
pub const XSD_ANY_SIMPLE_TYPE: &str = "anySimpleType";

/// XSD string type name
pub const XSD_STRING: &str = "string";
/// XSD normalizedString type name
pub const XSD_NORMALIZED_STRING: &str = "normalizedString";
/// XSD token type name
pub const XSD_TOKEN: &str = "token";
/// XSD language type name
pub const XSD_LANGUAGE: &str = "language";
/// XSD Name type name
pub const XSD_NAME: &str = "Name";
/// XSD NCName type name
pub const XSD_NCNAME: &str = "NCName";
/// XSD ID type name
pub const XSD_ID: &str = "ID";
/// XSD IDREF type name
pub const XSD_IDREF: &str = "IDREF";
/// XSD ENTITY type name
pub const XSD_ENTITY: &str = "ENTITY";
/// XSD NMTOKEN type name
pub const XSD_NMTOKEN: &str = "NMTOKEN";

/// XSD boolean type name
pub const XSD_BOOLEAN: &str = "boolean";

/// XSD decimal type name
pub const XSD_DECIMAL: &str = "decimal";
/// XSD integer type name
pub const XSD_INTEGER: &str = "integer";
/// XSD long type name
pub const XSD_LONG: &str = "long";
/// XSD int type name
pub const XSD_INT: &str = "int";
/// XSD short type name
pub const XSD_SHORT: &str = "short";
/// XSD byte type name
pub const XSD_BYTE: &str = "byte";
/// XSD nonNegativeInteger type name
pub const XSD_NON_NEGATIVE_INTEGER: &str = "nonNegativeInteger";
/// XSD positiveInteger type name
pub const XSD_POSITIVE_INTEGER: &str = "positiveInteger";
/// XSD unsignedLong type name
pub const XSD_UNSIGNED_LONG: &str = "unsignedLong";
/// XSD unsignedInt type name
pub const XSD_UNSIGNED_INT: &str = "unsignedInt";
/// XSD unsignedShort type name
pub const XSD_UNSIGNED_SHORT: &str = "unsignedShort";
/// XSD unsignedByte type name
pub const XSD_UNSIGNED_BYTE: &str = "unsignedByte";
/// XSD nonPositiveInteger type name
pub const XSD_NON_POSITIVE_INTEGER: &str = "nonPositiveInteger";
/// XSD negativeInteger type name
pub const XSD_NEGATIVE_INTEGER: &str = "negativeInteger";

/// XSD float type name
pub const XSD_FLOAT: &str = "float";
/// XSD double type name
pub const XSD_DOUBLE: &str = "double";

/// XSD duration type name
pub const XSD_DURATION: &str = "duration";
/// XSD dateTime type name
pub const XSD_DATETIME: &str = "dateTime";
/// XSD time type name
pub const XSD_TIME: &str = "time";
/// XSD date type name
pub const XSD_DATE: &str = "date";
/// XSD gYearMonth type name
pub const XSD_GYEAR_MONTH: &str = "gYearMonth";
/// XSD gYear type name
pub const XSD_GYEAR: &str = "gYear";
/// XSD gMonthDay type name
pub const XSD_GMONTH_DAY: &str = "gMonthDay";
/// XSD gDay type name
pub const XSD_GDAY: &str = "gDay";
/// XSD gMonth type name
pub const XSD_GMONTH: &str = "gMonth";

/// XSD hexBinary type name
pub const XSD_HEX_BINARY: &str = "hexBinary";
/// XSD base64Binary type name
pub const XSD_BASE64_BINARY: &str = "base64Binary";

/// XSD anyURI type name
pub const XSD_ANY_URI: &str = "anyURI";
/// XSD QName type name
pub const XSD_QNAME: &str = "QName";
/// XSD NOTATION type name
pub const XSD_NOTATION: &str = "NOTATION";

// =============================================================================
// Built-in Type Definition
// =============================================================================

/// Category of XSD type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    /// Primitive type (defined directly by XML Schema Part 2)
    Primitive,
    /// Derived type (derived from another type)
    Derived,
    /// Special type (anyType, anySimpleType)
    Special,
}

/// Definition of a built-in XSD type
#[derive(Debug, Clone)]
pub struct BuiltinType {
    /// Type name (local name without namespace)
    pub name: &'static str,
    /// Type category
    pub category: TypeCategory,
    /// Base type name (for derived types)
    pub base_type: Option<&'static str>,
    /// Value binding
    pub binding: Binding,
}

impl BuiltinType {
    const fn new(
        name: &'static str,
        category: TypeCategory,
        base_type: Option<&'static str>,
        binding: Binding,
    ) -> Self {
        Self {
            name,
            category,
            base_type,
            binding,
        }
    }

    /// Qualified name in the XSD namespace
    pub fn qname(&self) -> QName {
        QName::xs(self.name)
    }

    /// Qualified name of the base type
    pub fn base_qname(&self) -> Option<QName> {
        self.base_type.map(QName::xs)
    }

    /// Check if this is the complex root of the hierarchy
    pub fn is_complex(&self) -> bool {
        self.name == XSD_ANY_TYPE
    }
}

// =============================================================================
// Built-in Type Registry
// =============================================================================

lazy_static::lazy_static! {
    /// Registry of all built-in XSD types, bases first
    pub static ref BUILTIN_TYPES: Vec<BuiltinType> = {
        use Binding::*;
        use TypeCategory::*;
        vec![
            // Special types
            BuiltinType::new(XSD_ANY_TYPE, Special, None, Any),
            BuiltinType::new(XSD_ANY_SIMPLE_TYPE, Special, Some(XSD_ANY_TYPE), Any),

            // String types
            BuiltinType::new(XSD_STRING, Primitive, Some(XSD_ANY_SIMPLE_TYPE), String),
            BuiltinType::new(XSD_NORMALIZED_STRING, Derived, Some(XSD_STRING), String),
            BuiltinType::new(XSD_TOKEN, Derived, Some(XSD_NORMALIZED_STRING), String),
            BuiltinType::new(XSD_LANGUAGE, Derived, Some(XSD_TOKEN), String),
            BuiltinType::new(XSD_NAME, Derived, Some(XSD_TOKEN), String),
            BuiltinType::new(XSD_NMTOKEN, Derived, Some(XSD_TOKEN), String),
            BuiltinType::new(XSD_NCNAME, Derived, Some(XSD_NAME), String),
            BuiltinType::new(XSD_ID, Derived, Some(XSD_NCNAME), String),
            BuiltinType::new(XSD_IDREF, Derived, Some(XSD_NCNAME), String),
            BuiltinType::new(XSD_ENTITY, Derived, Some(XSD_NCNAME), String),

            BuiltinType::new(XSD_BOOLEAN, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Boolean),

            // Numeric types
            BuiltinType::new(XSD_DECIMAL, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Decimal),
            BuiltinType::new(XSD_INTEGER, Derived, Some(XSD_DECIMAL), Integer),
            BuiltinType::new(XSD_LONG, Derived, Some(XSD_INTEGER), Integer),
            BuiltinType::new(XSD_INT, Derived, Some(XSD_LONG), Integer),
            BuiltinType::new(XSD_SHORT, Derived, Some(XSD_INT), Integer),
            BuiltinType::new(XSD_BYTE, Derived, Some(XSD_SHORT), Integer),
            BuiltinType::new(XSD_NON_NEGATIVE_INTEGER, Derived, Some(XSD_INTEGER), Integer),
            BuiltinType::new(XSD_POSITIVE_INTEGER, Derived, Some(XSD_NON_NEGATIVE_INTEGER), Integer),
            BuiltinType::new(XSD_UNSIGNED_LONG, Derived, Some(XSD_NON_NEGATIVE_INTEGER), Integer),
            BuiltinType::new(XSD_UNSIGNED_INT, Derived, Some(XSD_UNSIGNED_LONG), Integer),
            BuiltinType::new(XSD_UNSIGNED_SHORT, Derived, Some(XSD_UNSIGNED_INT), Integer),
            BuiltinType::new(XSD_UNSIGNED_BYTE, Derived, Some(XSD_UNSIGNED_SHORT), Integer),
            BuiltinType::new(XSD_NON_POSITIVE_INTEGER, Derived, Some(XSD_INTEGER), Integer),
            BuiltinType::new(XSD_NEGATIVE_INTEGER, Derived, Some(XSD_NON_POSITIVE_INTEGER), Integer),
            BuiltinType::new(XSD_FLOAT, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Float),
            BuiltinType::new(XSD_DOUBLE, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Double),

            // Binary types
            BuiltinType::new(XSD_HEX_BINARY, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Binary),
            BuiltinType::new(XSD_BASE64_BINARY, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Binary),

            // Other types
            BuiltinType::new(XSD_ANY_URI, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Uri),
            BuiltinType::new(XSD_QNAME, Primitive, Some(XSD_ANY_SIMPLE_TYPE), QName),
            BuiltinType::new(XSD_NOTATION, Primitive, Some(XSD_ANY_SIMPLE_TYPE), QName),

            // Date/time types
            BuiltinType::new(XSD_DURATION, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Duration),
            BuiltinType::new(XSD_DATETIME, Primitive, Some(XSD_ANY_SIMPLE_TYPE), DateTime),
            BuiltinType::new(XSD_TIME, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Time),
            BuiltinType::new(XSD_DATE, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Date),
            BuiltinType::new(XSD_GYEAR_MONTH, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Date),
            BuiltinType::new(XSD_GYEAR, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Date),
            BuiltinType::new(XSD_GMONTH_DAY, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Date),
            BuiltinType::new(XSD_GDAY, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Date),
            BuiltinType::new(XSD_GMONTH, Primitive, Some(XSD_ANY_SIMPLE_TYPE), Date),
        ]
    };
}

/// Get a built-in type by local name
pub fn get_builtin_type(name: &str) -> Option<&'static BuiltinType> {
    BUILTIN_TYPES.iter().find(|t| t.name == name)
}

/// Check if a qualified name denotes an XSD built-in
pub fn is_builtin(name: &QName) -> bool {
    name.namespace() == Some(crate::XSD_NAMESPACE) && get_builtin_type(&name.local_name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_builtin_type() {
        let string_type = get_builtin_type(XSD_STRING).unwrap();
        assert_eq!(string_type.category, TypeCategory::Primitive);
        assert_eq!(string_type.binding, Binding::String);

        let token_type = get_builtin_type(XSD_TOKEN).unwrap();
        assert_eq!(token_type.category, TypeCategory::Derived);
        assert_eq!(token_type.base_qname(), Some(QName::xs(XSD_NORMALIZED_STRING)));

        assert!(get_builtin_type(XSD_ANY_TYPE).unwrap().is_complex());
        assert!(get_builtin_type("unknownType").is_none());
    }

    #[test]
    fn test_bases_precede_derived() {
        for (index, builtin) in BUILTIN_TYPES.iter().enumerate() {
            if let Some(base) = builtin.base_type {
                let base_index = BUILTIN_TYPES.iter().position(|t| t.name == base);
                assert!(
                    base_index.map(|b| b < index).unwrap_or(false),
                    "{} listed before its base {}",
                    builtin.name,
                    base
                );
            }
        }
    }

    #[test]
    fn test_is_builtin() {
        assert!(is_builtin(&QName::xs("integer")));
        assert!(!is_builtin(&QName::local("integer")));
        assert!(!is_builtin(&QName::xs("Integer")));
    }
}
