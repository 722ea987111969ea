//! Input checks applied before any remote call.

use uuid::{Uuid, Variant, Version};

/// True for the canonical hyphenated form of a version-4, RFC 4122 UUID.
pub fn is_uuid_v4(value: &str) -> bool {
    // Uuid::parse_str also accepts simple, braced and urn forms
    if value.len() != 36 {
        return false;
    }
    Uuid::parse_str(value)
        .map(|id| id.get_version() == Some(Version::Random) && id.get_variant() == Variant::RFC4122)
        .unwrap_or(false)
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// True when none of the values are blank.
pub fn all_present(values: &[&str]) -> bool {
    values.iter().all(|v| !is_blank(v))
}
