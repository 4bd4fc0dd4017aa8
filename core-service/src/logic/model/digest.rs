//! Artifact Digests
//!
//! SHA-256 of every loaded artifact, reported in model metadata and checked
//! against an optional `checksums.json` manifest before any model is loaded.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::logic::error::ConfigurationError;

/// Hex SHA-256 of a file, streamed
pub fn sha256_file(path: &Path) -> Result<String, ConfigurationError> {
    let unreadable = |source| ConfigurationError::Unreadable {
        path: path.to_path_buf(),
        source,
    };

    let mut file = std::fs::File::open(path).map_err(unreadable)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];

    loop {
        let n = file.read(&mut buf).map_err(unreadable)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// `{"<file name>": "<sha256 hex>"}`
#[derive(Debug, Clone, Default)]
pub struct ChecksumManifest {
    entries: BTreeMap<String, String>,
}

impl ChecksumManifest {
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let entries: BTreeMap<String, String> = serde_json::from_str(&raw)
            .map_err(|e| ConfigurationError::malformed(path, format!("expected a file->sha256 object: {}", e)))?;

        let entries = entries
            .into_iter()
            .map(|(name, digest)| (name, digest.trim().to_ascii_lowercase()))
            .collect();

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Verify `artifact` when the manifest lists it by file name.
    /// Returns the actual digest either way.
    pub fn verify(&self, artifact: &Path) -> Result<String, ConfigurationError> {
        let actual = sha256_file(artifact)?;

        let expected = artifact
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| self.entries.get(n));

        match expected {
            Some(expected) if *expected != actual => Err(ConfigurationError::ChecksumMismatch {
                path: artifact.to_path_buf(),
                expected: expected.clone(),
                actual,
            }),
            Some(_) => {
                log::debug!("Checksum verified: {}", artifact.display());
                Ok(actual)
            }
            None => Ok(actual),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // sha256("abc")
    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn test_sha256_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("artifact.bin");
        std::fs::write(&path, b"abc").unwrap();

        assert_eq!(sha256_file(&path).unwrap(), ABC_SHA256);
    }

    #[test]
    fn test_manifest_verifies_listed_files() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("threshold.json");
        std::fs::write(&artifact, b"abc").unwrap();

        let manifest_path = dir.path().join("checksums.json");
        std::fs::write(
            &manifest_path,
            format!(r#"{{"threshold.json": "{}"}}"#, ABC_SHA256.to_uppercase()),
        )
        .unwrap();

        let manifest = ChecksumManifest::load(&manifest_path).unwrap();
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.verify(&artifact).unwrap(), ABC_SHA256);

        std::fs::write(&artifact, b"abd").unwrap();
        assert!(matches!(
            manifest.verify(&artifact),
            Err(ConfigurationError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_unlisted_files_pass() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("feature_names.json");
        std::fs::write(&artifact, b"[]").unwrap();

        let manifest = ChecksumManifest::default();
        assert!(manifest.verify(&artifact).is_ok());
    }
}
