use crate::error::{Result, VcsError};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use sha1::{Digest, Sha1};
use std::fmt;
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Every persisted object lives under `.vcs/objects/<kind>/<digest>`, where
/// `<digest>` is the SHA-1 of the *uncompressed* content rendered as 40
/// lowercase hex characters, and the file body is the zlib-compressed content.
///
/// The digest doubles as the integrity check: re-hashing the decompressed
/// bytes must reproduce the filename. Objects are written once and never
/// mutated; identical content maps to the same digest and is stored exactly
/// once no matter how many paths or commits reference it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
}

impl ObjectKind {
    pub fn dir_name(self) -> &'static str {
        match self {
            ObjectKind::Blob => "blobs",
            ObjectKind::Tree => "trees",
            ObjectKind::Commit => "commits",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectKind::Blob => "blob",
            ObjectKind::Tree => "tree",
            ObjectKind::Commit => "commit",
        };
        f.write_str(name)
    }
}

/// SHA-1 of `data`, lowercase hex.
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

pub fn compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Inflates into a growable buffer, so the output size is exact regardless
/// of how compressible the input was. Truncated or garbage input surfaces
/// as an error, never as silently short output.
pub fn decompress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

pub struct ObjectStore {
    objects_dir: PathBuf,
}

impl ObjectStore {
    pub fn new(vcs_dir: &Path) -> Self {
        ObjectStore {
            objects_dir: vcs_dir.join("objects"),
        }
    }

    fn object_path(&self, kind: ObjectKind, digest: &str) -> PathBuf {
        self.objects_dir.join(kind.dir_name()).join(digest)
    }

    /// Computes the digest of `data` and persists the compressed bytes unless
    /// an object with that digest already exists. Returns the digest either
    /// way. The object file appears atomically via a tempfile rename, so a
    /// crash mid-write never leaves a half-written object at its final path.
    pub fn write(&self, kind: ObjectKind, data: &[u8]) -> Result<String> {
        let digest = content_hash(data);
        let path = self.object_path(kind, &digest);
        if !path.exists() {
            let compressed = compress(data)?;
            let mut tmp = NamedTempFile::new_in(self.objects_dir.join(kind.dir_name()))?;
            tmp.write_all(&compressed)?;
            tmp.persist(&path).map_err(|e| VcsError::Io(e.error))?;
        }
        Ok(digest)
    }

    /// Loads and decompresses one object. A missing file reports
    /// `ObjectMissing`; a decompression failure reports `ObjectCorrupt`.
    pub fn read(&self, kind: ObjectKind, digest: &str) -> Result<Vec<u8>> {
        let path = self.object_path(kind, digest);
        let mut file = File::open(&path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                VcsError::ObjectMissing {
                    kind,
                    digest: digest.to_string(),
                }
            } else {
                VcsError::Io(e)
            }
        })?;
        let mut compressed = Vec::new();
        file.read_to_end(&mut compressed)?;
        decompress(&compressed).map_err(|_| VcsError::ObjectCorrupt {
            kind,
            digest: digest.to_string(),
        })
    }

    /// Digests of every stored object of `kind`, in directory order.
    pub fn list(&self, kind: ObjectKind) -> Result<Vec<String>> {
        let mut digests = Vec::new();
        for entry in fs::read_dir(self.objects_dir.join(kind.dir_name()))? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Ok(name) = entry.file_name().into_string() {
                    digests.push(name);
                }
            }
        }
        Ok(digests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(tmp: &TempDir) -> ObjectStore {
        for dir in ["blobs", "trees", "commits"] {
            fs::create_dir_all(tmp.path().join("objects").join(dir)).unwrap();
        }
        ObjectStore::new(tmp.path())
    }

    #[test]
    fn compress_round_trip() {
        for data in [
            &b""[..],
            &b"hello world\n"[..],
            &[0u8; 1 << 20][..], // large and highly compressible
        ] {
            assert_eq!(decompress(&compress(data).unwrap()).unwrap(), data);
        }
    }

    #[test]
    fn hash_is_deterministic_and_distinguishes_content() {
        assert_eq!(content_hash(b"abc"), content_hash(b"abc"));
        assert_ne!(content_hash(b"abc"), content_hash(b"abd"));
        assert_eq!(content_hash(b"abc").len(), 40);
    }

    #[test]
    fn write_then_read_returns_original_bytes() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let digest = store.write(ObjectKind::Blob, b"some content").unwrap();
        assert_eq!(store.read(ObjectKind::Blob, &digest).unwrap(), b"some content");
    }

    #[test]
    fn write_is_idempotent_and_deduplicates() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let d1 = store.write(ObjectKind::Blob, b"same").unwrap();
        let d2 = store.write(ObjectKind::Blob, b"same").unwrap();
        assert_eq!(d1, d2);
        assert_eq!(store.list(ObjectKind::Blob).unwrap().len(), 1);
    }

    #[test]
    fn read_missing_object_reports_object_missing() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let err = store.read(ObjectKind::Commit, "0000000000000000000000000000000000000000");
        assert!(matches!(err, Err(VcsError::ObjectMissing { .. })));
    }

    #[test]
    fn read_corrupt_object_reports_object_corrupt() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let digest = store.write(ObjectKind::Blob, b"clean").unwrap();
        let path = tmp.path().join("objects/blobs").join(&digest);
        fs::write(&path, b"not zlib data").unwrap();
        let err = store.read(ObjectKind::Blob, &digest);
        assert!(matches!(err, Err(VcsError::ObjectCorrupt { .. })));
    }
}
