//! On-disk HTTP response cache
//!
//! Each successful response body is stored under a file named after the
//! SHA-256 of its request signature, next to a small JSON sidecar describing
//! the request. Entries never expire; the whole cache is wiped on request.

use chrono::Local;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{ParserError, Result};

/// Metadata kept alongside a cached body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub method: String,
    pub url: String,
    pub status: u16,
    pub stored_at: String,
}

pub struct ResponseCache {
    dir: PathBuf,
}

impl ResponseCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache key for a request: hex SHA-256 of `"<METHOD> <url>"`.
    pub fn key(method: &str, url: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(method.as_bytes());
        hasher.update(b" ");
        hasher.update(url.as_bytes());
        hasher
            .finalize()
            .iter()
            .map(|byte| format!("{:02x}", byte))
            .collect()
    }

    pub fn get(&self, method: &str, url: &str) -> Result<Option<Vec<u8>>> {
        let path = self.body_path(&Self::key(method, url));
        match fs::read(&path) {
            Ok(body) => {
                log::debug!("Cache hit: {} {}", method, url);
                Ok(Some(body))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ParserError::io(&path, e)),
        }
    }

    pub fn put(&self, method: &str, url: &str, status: u16, body: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| ParserError::io(&self.dir, e))?;

        let key = Self::key(method, url);
        let entry = CacheEntry {
            method: method.to_string(),
            url: url.to_string(),
            status,
            stored_at: Local::now().to_rfc3339(),
        };
        let meta = serde_json::to_vec_pretty(&entry)
            .map_err(|e| ParserError::io(self.meta_path(&key), e.into()))?;

        // The body is renamed into place only once fully written, so an
        // interrupted put never leaves a readable `.bin`.
        write_atomic(&self.body_path(&key), body)?;
        write_atomic(&self.meta_path(&key), &meta)
    }

    /// Metadata of every stored entry, in no particular order.
    pub fn entries(&self) -> Result<Vec<CacheEntry>> {
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ParserError::io(&self.dir, e)),
        };

        let mut entries = Vec::new();
        for item in read_dir {
            let path = item.map_err(|e| ParserError::io(&self.dir, e))?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let raw = fs::read(&path).map_err(|e| ParserError::io(&path, e))?;
                match serde_json::from_slice::<CacheEntry>(&raw) {
                    Ok(entry) => entries.push(entry),
                    Err(e) => log::warn!("Ignoring unreadable cache entry {}: {}", path.display(), e),
                }
            }
        }
        Ok(entries)
    }

    /// Removes every cached response.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => {
                log::info!("Response cache cleared: {}", self.dir.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ParserError::io(&self.dir, e)),
        }
    }

    fn body_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.bin", key))
    }

    fn meta_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    if let Err(e) = fs::write(&tmp_path, contents) {
        let _ = fs::remove_file(&tmp_path);
        return Err(ParserError::io(&tmp_path, e));
    }
    fs::rename(&tmp_path, path).map_err(|e| ParserError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_stable_and_method_sensitive() {
        let a = ResponseCache::key("GET", "https://peps.python.org/");
        let b = ResponseCache::key("GET", "https://peps.python.org/");
        let c = ResponseCache::key("HEAD", "https://peps.python.org/");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_put_get_and_clear() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(tmp.path().join("http_cache"));
        let url = "https://docs.python.org/3/";

        assert!(cache.get("GET", url).unwrap().is_none());

        cache.put("GET", url, 200, b"<html>cached</html>").unwrap();
        assert_eq!(cache.get("GET", url).unwrap().unwrap(), b"<html>cached</html>");

        let entries = cache.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].url, url);
        assert_eq!(entries[0].status, 200);

        cache.clear().unwrap();
        assert!(cache.get("GET", url).unwrap().is_none());
        assert!(cache.entries().unwrap().is_empty());
    }

    #[test]
    fn test_interrupted_put_is_not_a_hit() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(tmp.path().join("http_cache"));
        let url = "https://docs.python.org/3/archives/python-3.13-docs-pdf-a4.zip";

        // A write that died halfway leaves only the temporary file behind.
        fs::create_dir_all(cache.dir.as_path()).unwrap();
        let key = ResponseCache::key("GET", url);
        let partial = cache.dir.join(format!("{}.bin.tmp", key));
        fs::write(&partial, b"PK\x03").unwrap();

        assert!(cache.get("GET", url).unwrap().is_none());
        assert!(cache.entries().unwrap().is_empty());

        // A later complete put replaces the leftover and is served.
        cache.put("GET", url, 200, b"PK\x03\x04full").unwrap();
        assert_eq!(cache.get("GET", url).unwrap().unwrap(), b"PK\x03\x04full");
        assert!(!partial.exists());
    }

    #[test]
    fn test_clear_missing_dir_is_ok() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(tmp.path().join("never_created"));
        assert!(cache.clear().is_ok());
    }
}
