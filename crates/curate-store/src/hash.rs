//! Content hashing and identifier derivation.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::entity::EntityId;
use crate::error::{Result, StoreError};

/// Prefix of identifiers minted by the local store.
pub const LOCAL_ID_PREFIX: &str = "local-";

const LOCAL_ID_HEX_LEN: usize = 12;

/// Computes the SHA-256 of a file with buffered reads.
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let io_error = |source| StoreError::Io {
        operation: "read",
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(io_error)?;

    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = reader.read(&mut buffer).map_err(io_error)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Identifier for `name` under `parent`.
///
/// Storing the same name in the same folder again yields the same id, so a
/// re-run replaces the earlier version instead of adding a sibling.
pub fn local_entity_id(parent: &EntityId, name: &str) -> EntityId {
    let digest = Sha256::digest(format!("{parent}/{name}").as_bytes());
    let hex = hex::encode(digest);
    EntityId::new(format!("{LOCAL_ID_PREFIX}{}", &hex[..LOCAL_ID_HEX_LEN]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_compute_file_hash() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"hello world").unwrap();
        assert_eq!(
            compute_file_hash(temp_file.path()).unwrap(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_local_entity_id_is_stable() {
        let parent = EntityId::new("syn123");
        let first = local_entity_id(&parent, "DFCI_release.csv");
        assert_eq!(first, local_entity_id(&parent, "DFCI_release.csv"));
        assert_ne!(first, local_entity_id(&parent, "MSK_release.csv"));
        assert!(first.as_str().starts_with(LOCAL_ID_PREFIX));
        assert_eq!(first.as_str().len(), LOCAL_ID_PREFIX.len() + 12);
    }
}
