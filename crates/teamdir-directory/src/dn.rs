//! DN and filter string helpers.
//!
//! Filter escaping follows RFC 4515. DN parsing here is deliberately
//! minimal: the import jobs only need the value of the first RDN when
//! its attribute matches the configured user primary key.

/// Escape special characters in LDAP filter values (RFC 4515).
#[must_use]
pub fn escape_filter_value(value: &str) -> String {
    value
        .replace('\\', "\\5c")
        .replace('*', "\\2a")
        .replace('(', "\\28")
        .replace(')', "\\29")
        .replace('\0', "\\00")
}

/// Extract the value of the first RDN of `dn` when its attribute equals
/// `attribute` (ASCII case-insensitive, per RFC 4512 attribute naming).
///
/// Returns `None` when the DN is empty, the first RDN uses a different
/// attribute, or the RDN is malformed.
#[must_use]
pub fn rdn_value(dn: &str, attribute: &str) -> Option<String> {
    let first = dn.split(',').next()?.trim();
    let (attr, value) = first.split_once('=')?;
    if !attr.trim().eq_ignore_ascii_case(attribute) {
        return None;
    }
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
