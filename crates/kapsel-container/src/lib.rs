//! KPKG container framing, loading, and composition for Kapsel.
//!
//! A `.kpkg` container is a fixed 40-byte header followed by a TOML manifest
//! region and an opaque binary region. This crate is the framing layer:
//! [`parse_header`] validates the header and its declared regions against the
//! actual buffer, [`load_package`] composes header and manifest validation
//! into an assembled [`Package`], and the writer half composes containers for
//! packaging and test harnesses. Everything in the parse path runs on
//! completely untrusted input, so every bound is checked before a single
//! region byte is read.

pub mod header;
pub mod loader;
pub mod writer;

pub use header::{parse_header, Header, LayoutViolation, FORMAT_VERSION, HEADER_LEN, MAGIC};
pub use loader::{load_package, load_package_file, Package, PackageFile};
pub use writer::{compose_package, compose_package_bytes, write_package_file};

use kapsel_schema::ManifestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("container I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("truncated container: {len} bytes, the fixed header is {} bytes", HEADER_LEN)]
    Truncated { len: usize },
    #[error("invalid container magic: found {found:?}, expected {:?}", MAGIC)]
    InvalidMagic { found: [u8; 4] },
    #[error("malformed container layout: {0}")]
    MalformedLayout(#[from] LayoutViolation),
    #[error("manifest validation failed: {0}")]
    Manifest(#[from] ManifestError),
}
