use std::fs;
use std::path::{Component, Path, PathBuf};

use log::warn;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::constants::UPLOADED_PDF_PREFIX;
use crate::documents::documents_errors::DocumentError;
use crate::errors::Result;

/// Key-addressed blob storage for uploaded PDFs.
///
/// Deleting a missing key is non-fatal; replacing a document must write the
/// new blob before the database reference is updated, and remove the old blob
/// only after that update committed.
pub trait DocumentStoreTrait: Send + Sync {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;
    fn get(&self, key: &str) -> Result<Vec<u8>>;
    fn delete(&self, key: &str) -> Result<()>;
}

/// Stores documents under `<root>/uploaded-pdfs/<key>` on the local disk.
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsDocumentStore { root: root.into() }
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        // Reject path traversal in client-supplied keys.
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(DocumentError::InvalidKey(key.to_string()).into());
        }
        Ok(self.root.join(UPLOADED_PDF_PREFIX).join(relative))
    }
}

impl DocumentStoreTrait for FsDocumentStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bytes)?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.resolve(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(DocumentError::NotFound(key.to_string()).into())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Document '{}' was already absent while deleting", key);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Builds the storage key for an uploaded PDF: the slugified original file
/// stem plus a random hash, e.g. `koopakte-jansen_3f9a...e1.pdf`.
pub fn generate_document_key(original_filename: Option<&str>) -> String {
    let hash = random_hash();
    match original_filename.and_then(|n| n.strip_suffix(".pdf").or(Some(n))) {
        Some(stem) if !stem.trim().is_empty() => format!("{}_{}.pdf", slugify(stem), hash),
        _ => format!("{}.pdf", hash),
    }
}

fn random_hash() -> String {
    let mut random_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut random_bytes);
    let digest = Sha256::digest(random_bytes);
    hex::encode(digest)
}

fn slugify(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut last_dash = true;
    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    out.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn delete_of_absent_key_is_ok() {
        let dir = TempDir::new().unwrap();
        let store = FsDocumentStore::new(dir.path());
        assert!(store.delete("nope.pdf").is_ok());
    }

    #[test]
    fn put_then_get_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = FsDocumentStore::new(dir.path());
        store.put("a.pdf", b"%PDF-1.7").unwrap();
        assert_eq!(store.get("a.pdf").unwrap(), b"%PDF-1.7");
    }

    #[test]
    fn get_of_absent_key_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = FsDocumentStore::new(dir.path());
        match store.get("missing.pdf") {
            Err(crate::Error::Document(DocumentError::NotFound(_))) => {}
            other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn traversal_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let store = FsDocumentStore::new(dir.path());
        assert!(store.get("../etc/passwd").is_err());
    }

    #[test]
    fn document_keys_are_slugified() {
        let key = generate_document_key(Some("Koopakte Jansen.pdf"));
        assert!(key.starts_with("koopakte-jansen_"));
        assert!(key.ends_with(".pdf"));

        let bare = generate_document_key(None);
        assert!(bare.ends_with(".pdf"));
    }
}
