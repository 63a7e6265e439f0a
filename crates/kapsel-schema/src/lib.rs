//! Manifest parsing and strict schema validation for Kapsel packages.
//!
//! This crate defines the schema layer of the KPKG container format: the
//! typed [`Manifest`] with its capability grants, a closed-world field tree
//! that rejects unknown keys at every nesting level, and the
//! [`parse_manifest`] entry point that takes completely untrusted bytes and
//! returns either a fully validated manifest or a single typed error.
//! Capability *enforcement* is not here; this layer only guarantees that a
//! declaration is well-formed before anything else looks at it.

pub mod capabilities;
mod fields;
pub mod manifest;

pub use capabilities::{
    Capabilities, FilesReadSection, FilesSection, MemorySection, NetworkConnectSection,
    NetworkSection,
};
pub use manifest::{
    parse_manifest, parse_manifest_file, parse_manifest_str, Manifest, ManifestError,
};
