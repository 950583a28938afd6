//! Write path: stream bytes through the chunker into sealed objects.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::debug;

use plop_chunks::Chunker;
use plop_core::{PlopError, PlopResult};
use plop_crypto::{
    derive_sharing_secret, names, KeySchedule, CACHE_CONTROL_V0, CONTENT_ENCODING_V0,
    CONTENT_TYPE_V0, PREFIX_BLOB, PREFIX_EXTENTS,
};
use plop_storage::{Backend, PutOptions};

use crate::extent::append_extent;
use crate::handle::Handle;

/// A convergent content-addressed store over a blob backend.
///
/// Safe to share across tasks: derived secrets and the AEAD instance are
/// immutable after construction, and the backend adapter is required to
/// tolerate concurrent use. Concurrent writers cannot corrupt each other;
/// the worst case is a redundant upload of an identical object.
pub struct Store {
    backend: Arc<dyn Backend>,
    keys: KeySchedule,
}

impl Store {
    /// Derive the key schedule from the passphrase and bind the backend.
    /// Runs the (deliberately slow) Argon2id derivation, so construct
    /// once and share.
    pub fn new(backend: Arc<dyn Backend>, passphrase: &SecretString) -> PlopResult<Store> {
        let sharing = derive_sharing_secret(passphrase)?;
        let keys = KeySchedule::derive(&sharing)?;
        Ok(Store { backend, keys })
    }

    fn put_options() -> PutOptions {
        PutOptions {
            content_type: CONTENT_TYPE_V0.to_string(),
            content_encoding: CONTENT_ENCODING_V0.to_string(),
            cache_control: CACHE_CONTROL_V0.to_string(),
        }
    }

    /// Seal and upload one object; returns its plaintext hash.
    pub(crate) async fn save_object(
        &self,
        prefix: &'static [u8; 32],
        plaintext: &[u8],
    ) -> PlopResult<[u8; 32]> {
        let sealed = self.keys.seal(prefix, plaintext)?;
        let backend_key = self.keys.box_name(&sealed.hash);
        debug!(key = %backend_key, bytes = plaintext.len(), "save object");
        self.backend
            .put(&backend_key, sealed.ciphertext.into(), &Self::put_options())
            .await?;
        Ok(sealed.hash)
    }

    /// Fetch and open the object a plaintext hash addresses. The declared
    /// content-type and size are checked before the body is downloaded.
    pub(crate) async fn load_object(
        &self,
        prefix: &'static [u8; 32],
        hash: &[u8; 32],
    ) -> PlopResult<Vec<u8>> {
        let backend_key = self.keys.box_name(hash);
        let reader = self.backend.open(&backend_key).await?;
        if reader.content_type() != CONTENT_TYPE_V0 {
            return Err(PlopError::UnexpectedContentType {
                content_type: reader.content_type().to_string(),
            });
        }
        let size = reader.size();
        if usize::try_from(size).is_err() {
            return Err(PlopError::Backend(format!("object is too large: {size}")));
        }
        debug!(key = %backend_key, bytes = size, "load object");
        let data = reader.read_all().await?;
        self.keys.open(prefix, hash, &data)
    }

    /// Begin a streaming write. Bytes fed to the writer are chunked,
    /// sealed, and uploaded in input order; [`Writer::commit`] seals the
    /// extent list and returns the root key.
    pub fn create(&self) -> Writer<'_> {
        Writer {
            store: self,
            chunker: Chunker::new(self.keys.polynomial()),
            extents: Vec::new(),
            offset: 0,
        }
    }

    /// Store a whole buffer and return its root key.
    pub async fn put(&self, data: &[u8]) -> PlopResult<String> {
        let mut writer = self.create();
        writer.write(data).await?;
        writer.commit().await
    }

    /// Open the file a root key refers to.
    pub async fn open(&self, key: &str) -> PlopResult<Handle<'_>> {
        Handle::open(self, key).await
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

/// Streaming writer returned by [`Store::create`].
pub struct Writer<'s> {
    store: &'s Store,
    chunker: Chunker,
    extents: Vec<u8>,
    offset: u64,
}

impl Writer<'_> {
    /// Feed input bytes. Chunks completed by this call upload
    /// immediately.
    pub async fn write(&mut self, data: &[u8]) -> PlopResult<()> {
        for chunk in self.chunker.push(data) {
            self.save_chunk(&chunk).await?;
        }
        Ok(())
    }

    async fn save_chunk(&mut self, chunk: &[u8]) -> PlopResult<()> {
        let hash = self.store.save_object(PREFIX_BLOB, chunk).await?;
        self.offset += chunk.len() as u64;
        append_extent(&mut self.extents, self.offset, &hash);
        Ok(())
    }

    /// Upload the final chunk and the extent list; returns the root key.
    /// Zero bytes written still produces a canonical empty extents
    /// object, so the empty file has a well-defined root key.
    pub async fn commit(mut self) -> PlopResult<String> {
        if let Some(chunk) = self.chunker.finish() {
            self.save_chunk(&chunk).await?;
        }
        let hash = self
            .store
            .save_object(PREFIX_EXTENTS, &self.extents)
            .await?;
        Ok(names::encode(&hash))
    }

    /// Discard pending state. Chunks already uploaded stay behind: they
    /// are content-addressed, unreferenced, and may legitimately be
    /// referenced by future writes.
    pub fn abort(self) {}
}
