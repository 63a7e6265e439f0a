//! Fixed-layout KPKG header parsing and validation.

use crate::ContainerError;
use std::ops::Range;
use thiserror::Error;
use tracing::debug;

/// Magic bytes identifying a KPKG container.
pub const MAGIC: [u8; 4] = *b"KPKG";

/// Fixed total header length in bytes.
///
/// The header is zero-padded to this length no matter which fields are in
/// use. Reader and writer share this constant, so a future field addition
/// must extend the layout explicitly instead of silently shifting offsets.
pub const HEADER_LEN: usize = 40;

/// Header version stamped by the writer half.
///
/// The parser accepts any version value; gating on it is caller policy.
pub const FORMAT_VERSION: u16 = 1;

/// The decoded container header.
///
/// Wire layout, all integers little-endian, tightly packed in declaration
/// order and zero-padded to [`HEADER_LEN`]:
/// magic(4) | version(u16) | manifest_size(u32) | binary_size(u64) |
/// binary_offset(u64) | manifest_offset(u64).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub version: u16,
    pub manifest_size: u32,
    pub binary_size: u64,
    pub binary_offset: u64,
    pub manifest_offset: u64,
}

/// A violated offset/size invariant in a container header.
///
/// One variant per cross-check of the declared regions against the actual
/// buffer; all checks must hold before any region byte is read.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutViolation {
    #[error("manifest region overlaps the header: manifest_offset {offset} < {}", HEADER_LEN)]
    ManifestOverlapsHeader { offset: u64 },
    #[error(
        "manifest region out of bounds: offset {offset} + size {size} exceeds container length {len}"
    )]
    ManifestOutOfBounds { offset: u64, size: u64, len: u64 },
    #[error("binary region overlaps the manifest: binary_offset {offset} < manifest end {manifest_end}")]
    BinaryOverlapsManifest { offset: u64, manifest_end: u64 },
    #[error(
        "binary region out of bounds: offset {offset} + size {size} exceeds container length {len}"
    )]
    BinaryOutOfBounds { offset: u64, size: u64, len: u64 },
}

/// Parse and validate the fixed 40-byte container header.
///
/// Validation order is fixed: length, magic, then the region cross-checks.
/// A non-KPKG buffer is rejected before any other field is interpreted, and
/// every claimed region is bounds-checked against `buf.len()` before the
/// caller reads a single region byte, so an oversized size claim fails here
/// without any allocation. Trailing bytes beyond the binary region are
/// permitted and ignored.
pub fn parse_header(buf: &[u8]) -> Result<Header, ContainerError> {
    if buf.len() < HEADER_LEN {
        return Err(ContainerError::Truncated { len: buf.len() });
    }
    if buf[0..4] != MAGIC {
        return Err(ContainerError::InvalidMagic {
            found: le_bytes(buf, 0),
        });
    }

    let header = Header {
        version: u16::from_le_bytes(le_bytes(buf, 4)),
        manifest_size: u32::from_le_bytes(le_bytes(buf, 6)),
        binary_size: u64::from_le_bytes(le_bytes(buf, 10)),
        binary_offset: u64::from_le_bytes(le_bytes(buf, 18)),
        manifest_offset: u64::from_le_bytes(le_bytes(buf, 26)),
    };
    header.validate(buf.len() as u64)?;

    debug!(
        "parsed container header v{} ({} byte manifest, {} byte binary)",
        header.version, header.manifest_size, header.binary_size
    );
    Ok(header)
}

impl Header {
    /// Cross-check the declared regions against a container of `len` bytes.
    ///
    /// All arithmetic is overflow-checked: a claim whose end wraps past
    /// `u64::MAX` is out of bounds a fortiori, never a wrap-around.
    fn validate(&self, len: u64) -> Result<(), LayoutViolation> {
        if self.manifest_offset < HEADER_LEN as u64 {
            return Err(LayoutViolation::ManifestOverlapsHeader {
                offset: self.manifest_offset,
            });
        }
        let manifest_end = self
            .manifest_offset
            .checked_add(u64::from(self.manifest_size))
            .filter(|end| *end <= len)
            .ok_or(LayoutViolation::ManifestOutOfBounds {
                offset: self.manifest_offset,
                size: u64::from(self.manifest_size),
                len,
            })?;
        if self.binary_offset < manifest_end {
            return Err(LayoutViolation::BinaryOverlapsManifest {
                offset: self.binary_offset,
                manifest_end,
            });
        }
        self.binary_offset
            .checked_add(self.binary_size)
            .filter(|end| *end <= len)
            .ok_or(LayoutViolation::BinaryOutOfBounds {
                offset: self.binary_offset,
                size: self.binary_size,
                len,
            })?;
        Ok(())
    }

    /// Byte range of the manifest region within the source buffer.
    ///
    /// Only meaningful for a header validated against that buffer.
    pub fn manifest_range(&self) -> Range<usize> {
        let start = self.manifest_offset as usize;
        start..start + self.manifest_size as usize
    }

    /// Byte range of the binary region within the source buffer.
    ///
    /// Only meaningful for a header validated against that buffer.
    pub fn binary_range(&self) -> Range<usize> {
        let start = self.binary_offset as usize;
        start..start + self.binary_size as usize
    }

    /// Encode to the fixed 40-byte wire layout.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..4].copy_from_slice(&MAGIC);
        out[4..6].copy_from_slice(&self.version.to_le_bytes());
        out[6..10].copy_from_slice(&self.manifest_size.to_le_bytes());
        out[10..18].copy_from_slice(&self.binary_size.to_le_bytes());
        out[18..26].copy_from_slice(&self.binary_offset.to_le_bytes());
        out[26..34].copy_from_slice(&self.manifest_offset.to_le_bytes());
        out
    }
}

fn le_bytes<const N: usize>(buf: &[u8], at: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[at..at + N]);
    out
}
