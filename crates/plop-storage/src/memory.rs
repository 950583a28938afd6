//! In-memory backend for tests and embedding.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;

use crate::backend::{Backend, BackendError, ObjectReader, PutOptions};

#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    content_type: String,
    content_encoding: String,
    cache_control: String,
}

/// HashMap-backed [`Backend`] holding bodies and their declared metadata.
///
/// Intended for tests. All objects live behind a `RwLock`; bodies are
/// cloned on read. [`tamper`](MemoryBackend::tamper) exists so corruption
/// scenarios can flip ciphertext bits in place.
pub struct MemoryBackend {
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Sorted list of all keys.
    pub fn keys(&self) -> Vec<String> {
        let map = self.objects.read().expect("lock poisoned");
        let mut keys: Vec<String> = map.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Declared (content-type, content-encoding, cache-control) for a
    /// key, for assertions in tests.
    pub fn metadata(&self, key: &str) -> Option<(String, String, String)> {
        let map = self.objects.read().expect("lock poisoned");
        map.get(key).map(|obj| {
            (
                obj.content_type.clone(),
                obj.content_encoding.clone(),
                obj.cache_control.clone(),
            )
        })
    }

    /// Mutate a stored body in place. Returns `false` if the key is
    /// absent.
    pub fn tamper<F: FnOnce(&mut Vec<u8>)>(&self, key: &str, f: F) -> bool {
        let mut map = self.objects.write().expect("lock poisoned");
        match map.get_mut(key) {
            Some(obj) => {
                f(&mut obj.data);
                true
            }
            None => false,
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("object_count", &self.len())
            .finish()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn put(&self, key: &str, data: Bytes, opts: &PutOptions) -> Result<(), BackendError> {
        let mut map = self.objects.write().expect("lock poisoned");
        map.insert(
            key.to_string(),
            StoredObject {
                data: data.to_vec(),
                content_type: opts.content_type.clone(),
                content_encoding: opts.content_encoding.clone(),
                cache_control: opts.cache_control.clone(),
            },
        );
        Ok(())
    }

    async fn open(&self, key: &str) -> Result<ObjectReader, BackendError> {
        let map = self.objects.read().expect("lock poisoned");
        let obj = map.get(key).ok_or_else(|| BackendError::NotFound {
            key: key.to_string(),
        })?;
        let data = Bytes::from(obj.data.clone());
        Ok(ObjectReader::new(
            obj.content_type.clone(),
            data.len() as u64,
            async move { Ok(data) },
        ))
    }

    async fn list(&self) -> Result<Vec<String>, BackendError> {
        Ok(self.keys())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> PutOptions {
        PutOptions {
            content_type: "application/test".into(),
            content_encoding: "identity".into(),
            cache_control: "no-store".into(),
        }
    }

    #[tokio::test]
    async fn put_then_open_and_read() {
        let backend = MemoryBackend::new();
        backend
            .put("key", Bytes::from_static(b"body"), &opts())
            .await
            .unwrap();

        let reader = backend.open("key").await.unwrap();
        assert_eq!(reader.content_type(), "application/test");
        assert_eq!(reader.size(), 4);
        assert_eq!(reader.read_all().await.unwrap().as_ref(), b"body");
    }

    #[tokio::test]
    async fn open_missing_is_not_found() {
        let backend = MemoryBackend::new();
        let err = backend.open("nope").await.unwrap_err();
        assert!(matches!(err, BackendError::NotFound { key } if key == "nope"));
    }

    #[tokio::test]
    async fn put_same_key_is_idempotent() {
        let backend = MemoryBackend::new();
        backend
            .put("k", Bytes::from_static(b"same"), &opts())
            .await
            .unwrap();
        backend
            .put("k", Bytes::from_static(b"same"), &opts())
            .await
            .unwrap();
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test]
    async fn list_is_sorted() {
        let backend = MemoryBackend::new();
        for key in ["bbb", "aaa", "ccc"] {
            backend
                .put(key, Bytes::from_static(b"x"), &opts())
                .await
                .unwrap();
        }
        assert_eq!(backend.list().await.unwrap(), vec!["aaa", "bbb", "ccc"]);
    }

    #[tokio::test]
    async fn metadata_is_recorded() {
        let backend = MemoryBackend::new();
        backend
            .put("k", Bytes::from_static(b"x"), &opts())
            .await
            .unwrap();
        let (ct, ce, cc) = backend.metadata("k").unwrap();
        assert_eq!(ct, "application/test");
        assert_eq!(ce, "identity");
        assert_eq!(cc, "no-store");
        assert!(backend.metadata("missing").is_none());
    }

    #[tokio::test]
    async fn tamper_mutates_stored_body() {
        let backend = MemoryBackend::new();
        backend
            .put("k", Bytes::from_static(b"\x00\x01"), &opts())
            .await
            .unwrap();

        assert!(backend.tamper("k", |data| data[0] ^= 0xFF));
        assert!(!backend.tamper("missing", |_| ()));

        let body = backend.open("k").await.unwrap().read_all().await.unwrap();
        assert_eq!(body.as_ref(), b"\xFF\x01");
    }

    #[tokio::test]
    async fn reader_metadata_precedes_body() {
        let backend = MemoryBackend::new();
        backend
            .put("k", Bytes::from_static(b"0123456789"), &opts())
            .await
            .unwrap();

        // content-type and size are usable without consuming the body
        let reader = backend.open("k").await.unwrap();
        let declared = (reader.content_type().to_string(), reader.size());
        assert_eq!(declared, ("application/test".to_string(), 10));
        drop(reader);
    }

    #[tokio::test]
    async fn concurrent_reads_are_safe() {
        use std::sync::Arc;

        let backend = Arc::new(MemoryBackend::new());
        backend
            .put("shared", Bytes::from_static(b"data"), &opts())
            .await
            .unwrap();

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let backend = Arc::clone(&backend);
                tokio::spawn(async move {
                    backend
                        .open("shared")
                        .await
                        .unwrap()
                        .read_all()
                        .await
                        .unwrap()
                })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap().as_ref(), b"data");
        }
    }
}
