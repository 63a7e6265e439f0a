//! The declared manifest field tree and unknown-key rejection.
//!
//! The schema is closed-world: every key a manifest may contain is declared
//! here, and one recursive walk rejects anything else with its dotted path.
//! Additive schema evolution means adding a declaration to this tree (and a
//! field to the typed structs), never silently accepting new keys.

use crate::manifest::ManifestError;
use toml::{Table, Value};

/// One declared field: its key and, for table-valued fields, the fields
/// allowed inside it.
pub(crate) struct FieldDecl {
    key: &'static str,
    children: Option<&'static [FieldDecl]>,
}

const MEMORY_FIELDS: &[FieldDecl] = &[FieldDecl {
    key: "max_bytes",
    children: None,
}];

const FILES_READ_FIELDS: &[FieldDecl] = &[FieldDecl {
    key: "paths",
    children: None,
}];

const FILES_FIELDS: &[FieldDecl] = &[FieldDecl {
    key: "read",
    children: Some(FILES_READ_FIELDS),
}];

const NETWORK_CONNECT_FIELDS: &[FieldDecl] = &[FieldDecl {
    key: "hosts",
    children: None,
}];

const NETWORK_FIELDS: &[FieldDecl] = &[FieldDecl {
    key: "connect",
    children: Some(NETWORK_CONNECT_FIELDS),
}];

const CAPABILITIES_FIELDS: &[FieldDecl] = &[
    FieldDecl {
        key: "memory",
        children: Some(MEMORY_FIELDS),
    },
    FieldDecl {
        key: "files",
        children: Some(FILES_FIELDS),
    },
    FieldDecl {
        key: "network",
        children: Some(NETWORK_FIELDS),
    },
];

/// Allowed keys at the document root.
pub(crate) const MANIFEST_FIELDS: &[FieldDecl] = &[
    FieldDecl {
        key: "name",
        children: None,
    },
    FieldDecl {
        key: "version",
        children: None,
    },
    FieldDecl {
        key: "capabilities",
        children: Some(CAPABILITIES_FIELDS),
    },
];

/// Reject any key not declared in `allowed`, recursing into nested tables.
///
/// `prefix` is the dotted path of `table` itself (empty at the root); the
/// returned error names the full path of the offending key, e.g.
/// `capabilities.files.bogus`.
pub(crate) fn reject_unknown_keys(
    table: &Table,
    allowed: &[FieldDecl],
    prefix: &str,
) -> Result<(), ManifestError> {
    for (key, value) in table {
        let Some(decl) = allowed.iter().find(|d| d.key == key.as_str()) else {
            return Err(ManifestError::UnknownField {
                path: join_path(prefix, key),
            });
        };
        if let (Some(children), Value::Table(nested)) = (decl.children, value) {
            reject_unknown_keys(nested, children, &join_path(prefix, key))?;
        }
    }
    Ok(())
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}.{key}")
    }
}
