//! Read path: extent lookup and random access over sealed chunks.

use std::sync::{Arc, Mutex};

use plop_core::{PlopError, PlopResult};
use plop_crypto::{names, PREFIX_BLOB, PREFIX_EXTENTS};

use crate::extent::{parse_extents, Extent};
use crate::store::Store;

/// An open file: the parsed extent list plus a one-chunk read cache.
///
/// The cache holds content-addressed plaintext, which is immutable, so
/// sequential reads skip refetching the chunk they are walking through
/// without any change in observable behavior.
pub struct Handle<'s> {
    store: &'s Store,
    extents: Vec<Extent>,
    cache: Mutex<Option<(usize, Arc<Vec<u8>>)>>,
}

impl<'s> Handle<'s> {
    pub(crate) async fn open(store: &'s Store, key: &str) -> PlopResult<Handle<'s>> {
        let root = names::decode_key(key)?;
        let payload = store.load_object(PREFIX_EXTENTS, &root).await?;
        let extents = parse_extents(&payload)?;
        Ok(Handle {
            store,
            extents,
            cache: Mutex::new(None),
        })
    }

    /// Logical file size: the last extent's end offset.
    pub fn size(&self) -> u64 {
        self.extents.last().map_or(0, |extent| extent.end)
    }

    async fn chunk(&self, index: usize) -> PlopResult<Arc<Vec<u8>>> {
        if let Some((cached_index, data)) = &*self.cache.lock().expect("lock poisoned") {
            if *cached_index == index {
                return Ok(Arc::clone(data));
            }
        }
        let data = Arc::new(
            self.store
                .load_object(PREFIX_BLOB, &self.extents[index].hash)
                .await?,
        );
        *self.cache.lock().expect("lock poisoned") = Some((index, Arc::clone(&data)));
        Ok(data)
    }

    /// Fill `buf` starting at logical offset `offset`. Returns the number
    /// of bytes copied; `Ok(0)` means `offset` is at or past end of file
    /// (or `buf` is empty).
    pub async fn read_at(&self, buf: &mut [u8], offset: u64) -> PlopResult<usize> {
        let size = self.size();
        if offset >= size || buf.is_empty() {
            return Ok(0);
        }

        // first extent whose end offset is past the requested offset
        let mut index = self.extents.partition_point(|extent| extent.end <= offset);
        let mut offset = offset;
        let mut copied = 0;

        while copied < buf.len() && index < self.extents.len() {
            let start = if index == 0 {
                0
            } else {
                self.extents[index - 1].end
            };
            let chunk = self.chunk(index).await?;
            let within = (offset - start) as usize;
            if within >= chunk.len() {
                return Err(PlopError::CorruptBlob {
                    reason: format!(
                        "extent {index} shorter than declared: {} <= {within}",
                        chunk.len()
                    ),
                });
            }
            let n = (chunk.len() - within).min(buf.len() - copied);
            buf[copied..copied + n].copy_from_slice(&chunk[within..within + n]);
            copied += n;
            offset += n as u64;
            index += 1;
        }
        Ok(copied)
    }

    /// Read the whole file into memory.
    pub async fn read_all(&self) -> PlopResult<Vec<u8>> {
        let mut out = Vec::new();
        for index in 0..self.extents.len() {
            let chunk = self.chunk(index).await?;
            out.extend_from_slice(&chunk);
        }
        Ok(out)
    }

    /// Sequential reader over the file, starting at offset 0.
    pub fn reader(&self) -> SequentialReader<'_, 's> {
        SequentialReader {
            handle: self,
            pos: 0,
        }
    }
}

impl std::fmt::Debug for Handle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle")
            .field("extents", &self.extents.len())
            .field("size", &self.size())
            .finish()
    }
}

/// Cursor over a [`Handle`]; repeated `read` calls walk the file in
/// order, hitting the handle's chunk cache.
pub struct SequentialReader<'h, 's> {
    handle: &'h Handle<'s>,
    pos: u64,
}

impl SequentialReader<'_, '_> {
    /// Read the next bytes into `buf`; `Ok(0)` at end of file.
    pub async fn read(&mut self, buf: &mut [u8]) -> PlopResult<usize> {
        let n = self.handle.read_at(buf, self.pos).await?;
        self.pos += n as u64;
        Ok(n)
    }

    /// Current position in the file.
    pub fn position(&self) -> u64 {
        self.pos
    }
}
