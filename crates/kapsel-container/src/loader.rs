//! Whole-container loading.
//!
//! Composes the header parser and the manifest validator: locate and slice
//! the manifest region, validate it, slice the binary region, and hand back
//! an assembled package. The binary region is never interpreted here.

use crate::header::Header;
use crate::{parse_header, ContainerError};
use kapsel_schema::{parse_manifest, Manifest};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// A fully validated package, borrowing the binary region from the source
/// buffer.
///
/// Construction is all-or-nothing: every field has passed its validator by
/// the time a `Package` exists, and nothing is re-validated or mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package<'a> {
    pub header: Header,
    pub manifest: Manifest,
    pub binary: &'a [u8],
}

/// An owning package loaded from disk.
///
/// Only the binary region is copied out of the file buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFile {
    pub header: Header,
    pub manifest: Manifest,
    pub binary: Vec<u8>,
}

/// Load and validate a whole container from an in-memory buffer.
///
/// Header errors propagate unchanged; manifest errors come back tagged as
/// [`ContainerError::Manifest`] so callers can tell a framing failure from a
/// content failure. Fails fast on the first violated invariant; there is no
/// partially-loaded package.
pub fn load_package(buf: &[u8]) -> Result<Package<'_>, ContainerError> {
    let header = parse_header(buf)?;
    let manifest = parse_manifest(&buf[header.manifest_range()])?;
    let binary = &buf[header.binary_range()];

    debug!(
        "loaded package '{}' v{} ({} byte binary)",
        manifest.name,
        manifest.version,
        binary.len()
    );
    Ok(Package {
        header,
        manifest,
        binary,
    })
}

/// Read a `.kpkg` file and validate it end to end.
pub fn load_package_file(path: impl AsRef<Path>) -> Result<PackageFile, ContainerError> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    let package = load_package(&data)?;

    info!(
        "loaded package '{}' v{} from {}",
        package.manifest.name,
        package.manifest.version,
        path.display()
    );
    Ok(PackageFile {
        binary: package.binary.to_vec(),
        header: package.header,
        manifest: package.manifest,
    })
}
