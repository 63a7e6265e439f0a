use crate::capabilities::Capabilities;
use crate::fields::{reject_unknown_keys, MANIFEST_FIELDS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Fields that must be present in every manifest.
const REQUIRED_FIELDS: [&str; 2] = ["name", "version"];

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest file: {0}")]
    Io(#[from] std::io::Error),
    #[error("manifest is empty")]
    Empty,
    #[error("manifest is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("manifest syntax error: {0}")]
    Syntax(toml::de::Error),
    #[error("unknown manifest field '{path}'")]
    UnknownField { path: String },
    #[error("missing required manifest field '{field}'")]
    MissingField { field: &'static str },
    #[error("manifest field '{field}' must not be empty")]
    EmptyField { field: &'static str },
    #[error("manifest field has the wrong type: {0}")]
    Type(toml::de::Error),
    #[error("failed to serialize manifest: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// A fully validated package manifest.
///
/// Constructed only by the parse functions below; by the time a `Manifest`
/// exists, every key has been recognized, both required fields are
/// non-empty, and every capability value has the declared type.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Manifest {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub capabilities: Capabilities,
}

impl Manifest {
    /// Declared memory ceiling, if any.
    pub fn memory_limit(&self) -> Option<u64> {
        self.capabilities.memory.as_ref().map(|m| m.max_bytes)
    }

    /// Paths the package is allowed to read, in declaration order.
    pub fn read_paths(&self) -> &[String] {
        self.capabilities
            .files
            .as_ref()
            .and_then(|f| f.read.as_ref())
            .map(|r| r.paths.as_slice())
            .unwrap_or_default()
    }

    /// `host:port` targets the package is allowed to connect to.
    pub fn connect_hosts(&self) -> &[String] {
        self.capabilities
            .network
            .as_ref()
            .and_then(|n| n.connect.as_ref())
            .map(|c| c.hosts.as_slice())
            .unwrap_or_default()
    }

    /// Render the manifest back to TOML.
    pub fn to_toml_string(&self) -> Result<String, ManifestError> {
        Ok(toml::to_string(self)?)
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match toml::to_string(self) {
            Ok(s) => f.write_str(&s),
            Err(_) => Err(fmt::Error),
        }
    }
}

/// Parse and validate manifest bytes.
///
/// This is the untrusted-input entry point: arbitrary bytes in (including
/// zero-length input), a validated [`Manifest`] or a single [`ManifestError`]
/// out. The emptiness guard runs first so that an empty region fails as an
/// empty manifest, not as a vacuously valid document.
pub fn parse_manifest(bytes: &[u8]) -> Result<Manifest, ManifestError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ManifestError::Empty);
    }
    let text = std::str::from_utf8(bytes)?;
    parse_manifest_str(text)
}

/// Parse and validate a manifest from already-decoded text.
pub fn parse_manifest_str(input: &str) -> Result<Manifest, ManifestError> {
    if input.trim().is_empty() {
        return Err(ManifestError::Empty);
    }

    let table: toml::Table = input.parse().map_err(ManifestError::Syntax)?;

    reject_unknown_keys(&table, MANIFEST_FIELDS, "")?;
    for field in REQUIRED_FIELDS {
        if !table.contains_key(field) {
            return Err(ManifestError::MissingField { field });
        }
    }

    let manifest: Manifest = toml::Value::Table(table)
        .try_into()
        .map_err(ManifestError::Type)?;

    if manifest.name.trim().is_empty() {
        return Err(ManifestError::EmptyField { field: "name" });
    }
    if manifest.version.trim().is_empty() {
        return Err(ManifestError::EmptyField { field: "version" });
    }

    Ok(manifest)
}

/// Read and validate a manifest file.
pub fn parse_manifest_file(path: impl AsRef<Path>) -> Result<Manifest, ManifestError> {
    let bytes = fs::read(path)?;
    parse_manifest(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_manifest() {
        let manifest = parse_manifest(b"name = \"demo\"\nversion = \"0.1.0\"\n").unwrap();
        assert_eq!(manifest.name, "demo");
        assert_eq!(manifest.version, "0.1.0");
        assert!(manifest.capabilities.is_empty());
    }

    #[test]
    fn parses_full_manifest() {
        let input = r#"
name = "myapp"
version = "0.1.0"

[capabilities.memory]
max_bytes = 8388608

[capabilities.files.read]
paths = ["/etc/config", "/var/data"]

[capabilities.network.connect]
hosts = ["api.example.com:443"]
"#;
        let manifest = parse_manifest_str(input).unwrap();
        assert_eq!(manifest.memory_limit(), Some(8_388_608));
        assert_eq!(manifest.read_paths(), ["/etc/config", "/var/data"]);
        assert_eq!(manifest.connect_hosts(), ["api.example.com:443"]);
    }

    #[test]
    fn absent_capabilities_grant_nothing() {
        let manifest = parse_manifest_str("name = \"demo\"\nversion = \"0.1.0\"\n").unwrap();
        assert_eq!(manifest.memory_limit(), None);
        assert!(manifest.read_paths().is_empty());
        assert!(manifest.connect_hosts().is_empty());
    }

    #[test]
    fn empty_input_is_empty_not_syntax() {
        assert!(matches!(parse_manifest(b""), Err(ManifestError::Empty)));
    }

    #[test]
    fn whitespace_only_input_is_empty_not_syntax() {
        assert!(matches!(
            parse_manifest(b"  \n\t  \n"),
            Err(ManifestError::Empty)
        ));
    }

    #[test]
    fn rejects_non_utf8_bytes() {
        assert!(matches!(
            parse_manifest(b"\xff\xfe\xfa\x00\xff"),
            Err(ManifestError::Encoding(_))
        ));
    }

    #[test]
    fn unterminated_string_is_a_syntax_error() {
        assert!(matches!(
            parse_manifest(b"name = \"demo\nversion = \"0.1.0\"\n"),
            Err(ManifestError::Syntax(_))
        ));
    }

    #[test]
    fn rejects_unknown_top_level_field() {
        let err = parse_manifest_str("extra = true\nname = \"demo\"\nversion = \"0.1.0\"\n")
            .unwrap_err();
        assert!(matches!(err, ManifestError::UnknownField { ref path } if path == "extra"));
    }

    #[test]
    fn rejects_unknown_field_under_capabilities() {
        let err = parse_manifest_str(
            "name = \"demo\"\nversion = \"0.1.0\"\n[capabilities]\ntime = true\n",
        )
        .unwrap_err();
        assert!(
            matches!(err, ManifestError::UnknownField { ref path } if path == "capabilities.time")
        );
    }

    #[test]
    fn rejects_unknown_field_under_files() {
        let err = parse_manifest_str(
            "name = \"demo\"\nversion = \"0.1.0\"\n[capabilities.files]\nbogus = 123\n",
        )
        .unwrap_err();
        assert!(
            matches!(err, ManifestError::UnknownField { ref path } if path == "capabilities.files.bogus")
        );
    }

    #[test]
    fn rejects_unknown_field_under_network() {
        let err = parse_manifest_str(
            "name = \"demo\"\nversion = \"0.1.0\"\n[capabilities.network]\nlisten = true\n",
        )
        .unwrap_err();
        assert!(
            matches!(err, ManifestError::UnknownField { ref path } if path == "capabilities.network.listen")
        );
    }

    #[test]
    fn missing_name_and_version_are_reported_as_missing() {
        let err = parse_manifest_str("version = \"0.1.0\"\n").unwrap_err();
        assert!(matches!(err, ManifestError::MissingField { field: "name" }));

        let err = parse_manifest_str("name = \"demo\"\n").unwrap_err();
        assert!(matches!(err, ManifestError::MissingField { field: "version" }));
    }

    #[test]
    fn blank_name_and_version_are_rejected() {
        let err = parse_manifest_str("name = \"\"\nversion = \"0.1.0\"\n").unwrap_err();
        assert!(matches!(err, ManifestError::EmptyField { field: "name" }));

        let err = parse_manifest_str("name = \"demo\"\nversion = \"   \"\n").unwrap_err();
        assert!(matches!(err, ManifestError::EmptyField { field: "version" }));
    }

    #[test]
    fn negative_max_bytes_is_a_type_error() {
        let err = parse_manifest_str(
            "name = \"demo\"\nversion = \"0.1.0\"\n[capabilities.memory]\nmax_bytes = -1\n",
        )
        .unwrap_err();
        assert!(matches!(err, ManifestError::Type(_)), "got: {err}");
    }

    #[test]
    fn non_integer_max_bytes_is_a_type_error() {
        let err = parse_manifest_str(
            "name = \"demo\"\nversion = \"0.1.0\"\n[capabilities.memory]\nmax_bytes = \"lots\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, ManifestError::Type(_)), "got: {err}");
    }

    #[test]
    fn non_string_path_element_is_a_type_error() {
        let err = parse_manifest_str(
            "name = \"demo\"\nversion = \"0.1.0\"\n[capabilities.files.read]\npaths = [1, 2]\n",
        )
        .unwrap_err();
        assert!(matches!(err, ManifestError::Type(_)), "got: {err}");
    }

    #[test]
    fn odd_but_well_typed_host_strings_are_accepted() {
        // Syntactic validation only; the enforcing runtime gets to refuse these.
        let manifest = parse_manifest_str(
            "name = \"demo\"\nversion = \"0.1.0\"\n[capabilities.network.connect]\nhosts = [\"not a host\"]\n",
        )
        .unwrap();
        assert_eq!(manifest.connect_hosts(), ["not a host"]);
    }

    #[test]
    fn display_renders_parseable_toml() {
        let input = r#"
name = "myapp"
version = "0.1.0"

[capabilities.memory]
max_bytes = 1024
"#;
        let manifest = parse_manifest_str(input).unwrap();
        let rendered = manifest.to_string();
        assert!(rendered.contains("name = \"myapp\""));
        assert!(rendered.contains("[capabilities.memory]"));
        let reparsed = parse_manifest_str(&rendered).unwrap();
        assert_eq!(reparsed, manifest);
    }

    #[test]
    fn parse_manifest_file_roundtrips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.kpkg.toml");
        fs::write(&path, "name = \"demo\"\nversion = \"0.1.0\"\n").unwrap();
        let manifest = parse_manifest_file(&path).unwrap();
        assert_eq!(manifest.name, "demo");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = parse_manifest_file("/nonexistent/app.kpkg.toml").unwrap_err();
        assert!(matches!(err, ManifestError::Io(_)));
    }
}
