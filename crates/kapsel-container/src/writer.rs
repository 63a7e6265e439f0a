//! Container composition: the writer half of the fixed layout.
//!
//! Packages are always composed canonically: manifest region immediately
//! after the header, binary region immediately after the manifest, no gap
//! and no trailer. The reader tolerates gaps and trailers; the writer never
//! produces them.

use crate::header::{Header, FORMAT_VERSION, HEADER_LEN};
use crate::ContainerError;
use kapsel_schema::Manifest;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Compose a container from raw manifest bytes and a binary payload.
///
/// The manifest bytes are embedded as-is, which lets test and fuzz
/// harnesses build containers around intentionally malformed manifests.
pub fn compose_package_bytes(manifest: &[u8], binary: &[u8]) -> Vec<u8> {
    let header = Header {
        version: FORMAT_VERSION,
        manifest_size: manifest.len() as u32,
        binary_size: binary.len() as u64,
        binary_offset: (HEADER_LEN + manifest.len()) as u64,
        manifest_offset: HEADER_LEN as u64,
    };

    let mut out = Vec::with_capacity(HEADER_LEN + manifest.len() + binary.len());
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(manifest);
    out.extend_from_slice(binary);
    out
}

/// Compose a container from a validated manifest and a binary payload.
pub fn compose_package(manifest: &Manifest, binary: &[u8]) -> Result<Vec<u8>, ContainerError> {
    let toml = manifest.to_toml_string()?;
    Ok(compose_package_bytes(toml.as_bytes(), binary))
}

/// Compose and write a `.kpkg` file.
pub fn write_package_file(
    path: impl AsRef<Path>,
    manifest: &Manifest,
    binary: &[u8],
) -> Result<(), ContainerError> {
    let path = path.as_ref();
    let data = compose_package(manifest, binary)?;
    fs::write(path, &data)?;
    debug!("wrote {} byte package to {}", data.len(), path.display());
    Ok(())
}
