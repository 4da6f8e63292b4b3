//! Name helpers
//!
//! Parsing of the `prefix:local` strings callers use to name types and
//! elements, and the naming rule for descriptors synthesized from
//! attribute uses.

use crate::error::{Error, Result};
use crate::namespaces::QName;
use once_cell::sync::Lazy;
use regex::Regex;

// Simplified NCName: no colons, letter or underscore first
static NCNAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{2FF}\u{370}-\u{37D}][A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{2FF}\u{370}-\u{37D}\-\.0-9\u{B7}]*$")
        .expect("NCName pattern is valid")
});

/// Marker put in front of the local name of attribute descriptors
pub const ATTRIBUTE_MARKER: char = '@';

/// Check if a string is a valid NCName (non-colonized name)
pub fn is_valid_ncname(name: &str) -> bool {
    NCNAME.is_match(name)
}

/// Split `prefix:local` into its parts, validating both.
///
/// A name without a colon has no prefix.
pub fn parse_prefixed(name: &str) -> Result<(Option<&str>, &str)> {
    let (prefix, local) = match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    };
    let valid = prefix.map_or(true, is_valid_ncname) && is_valid_ncname(local);
    if !valid {
        return Err(Error::Name(format!("Invalid QName: '{}'", name)));
    }
    Ok((prefix, local))
}

/// Name of the descriptor standing for attribute `name`: same namespace,
/// local name prefixed with [`ATTRIBUTE_MARKER`]
pub fn attribute_descriptor_name(name: &QName) -> QName {
    QName::new(
        name.namespace(),
        format!("{}{}", ATTRIBUTE_MARKER, name.local_name),
    )
}

/// Check if a descriptor name was synthesized from an attribute use
pub fn is_attribute_descriptor(name: &QName) -> bool {
    name.local_name.starts_with(ATTRIBUTE_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_ncname() {
        assert!(is_valid_ncname("TreeNode"));
        assert!(is_valid_ncname("my-element"));
        assert!(is_valid_ncname("_element"));
        assert!(is_valid_ncname("element1.2"));

        assert!(!is_valid_ncname(""));
        assert!(!is_valid_ncname("123element"));
        assert!(!is_valid_ncname("gml:Point"));
    }

    #[test]
    fn test_parse_prefixed() {
        assert_eq!(parse_prefixed("TreeNode").unwrap(), (None, "TreeNode"));
        assert_eq!(
            parse_prefixed("gml:PointPropertyType").unwrap(),
            (Some("gml"), "PointPropertyType")
        );

        for bad in ["", ":Type", "gml:", "a:b:c", "1x:Type"] {
            assert!(matches!(parse_prefixed(bad), Err(Error::Name(_))), "{}", bad);
        }
    }

    #[test]
    fn test_attribute_descriptor_name() {
        let id = QName::namespaced("http://www.opengis.net/gml", "id");
        let name = attribute_descriptor_name(&id);
        assert_eq!(name, QName::namespaced("http://www.opengis.net/gml", "@id"));
        assert!(is_attribute_descriptor(&name));
        assert!(!is_attribute_descriptor(&id));
    }
}
