//! Capability grant sections of a package manifest.
//!
//! Three sections are recognized: a memory ceiling, readable file paths, and
//! connectable network hosts. Every section is optional; an absent section
//! grants nothing. Values are validated syntactically only: a well-formed
//! but semantically odd entry (say, a host string with no port) is accepted
//! here and left to the enforcing runtime to refuse.

use serde::{Deserialize, Serialize};

/// The optional `[capabilities]` table of a manifest.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Capabilities {
    #[serde(default)]
    pub memory: Option<MemorySection>,
    #[serde(default)]
    pub files: Option<FilesSection>,
    #[serde(default)]
    pub network: Option<NetworkSection>,
}

/// `[capabilities.memory]`: ceiling on the packaged binary's memory use.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct MemorySection {
    pub max_bytes: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct FilesSection {
    #[serde(default)]
    pub read: Option<FilesReadSection>,
}

/// `[capabilities.files.read]`: paths the binary may read, in declaration order.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct FilesReadSection {
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct NetworkSection {
    #[serde(default)]
    pub connect: Option<NetworkConnectSection>,
}

/// `[capabilities.network.connect]`: `host:port` targets the binary may
/// connect to, in declaration order.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct NetworkConnectSection {
    pub hosts: Vec<String>,
}

impl Capabilities {
    /// True when no section grants anything.
    pub fn is_empty(&self) -> bool {
        self.memory.is_none()
            && self.files.as_ref().is_none_or(|f| f.read.is_none())
            && self.network.as_ref().is_none_or(|n| n.connect.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capabilities_grant_nothing() {
        assert!(Capabilities::default().is_empty());
    }

    #[test]
    fn bare_section_tables_still_grant_nothing() {
        let caps = Capabilities {
            memory: None,
            files: Some(FilesSection { read: None }),
            network: Some(NetworkSection { connect: None }),
        };
        assert!(caps.is_empty());
    }

    #[test]
    fn any_grant_makes_capabilities_non_empty() {
        let caps = Capabilities {
            memory: Some(MemorySection { max_bytes: 4096 }),
            files: None,
            network: None,
        };
        assert!(!caps.is_empty());
    }
}
