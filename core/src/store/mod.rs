//! Offline passage store: TOC held in RAM, entry table and text blob read
//! on demand through persistent file handles.

extern crate alloc;

pub mod codec;
pub mod format;

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec;
use core::fmt;

use crate::fs::{File, Volume};
use crate::slot::{Slot, SlotLookup};

pub use codec::CodecError;
pub use format::{PassageRecord, SLOT_COUNT, TOC_FILE_SIZE, TocRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// The volume could not be mounted.
    StorageUnavailable,
    /// A required file is absent, unreadable, or the TOC is short.
    DataMissing(&'static str),
    /// A lookup was attempted before a successful load.
    NotReady,
    /// The entry table ended before the requested record.
    CorruptEntry,
    /// The text blob ended before the requested compressed range.
    CorruptText,
    /// The codec rejected the compressed range.
    DecodeFailure(CodecError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::StorageUnavailable => write!(f, "storage unavailable"),
            StoreError::DataMissing(path) => write!(f, "data missing: {path}"),
            StoreError::NotReady => write!(f, "store not loaded"),
            StoreError::CorruptEntry => write!(f, "entry table truncated"),
            StoreError::CorruptText => write!(f, "text blob truncated"),
            StoreError::DecodeFailure(err) => write!(f, "decode failed: {err}"),
        }
    }
}

/// Locations of the three pack files on the volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    pub toc: String,
    pub entries: String,
    pub texts: String,
}

impl Default for StorePaths {
    fn default() -> Self {
        Self::under("data")
    }
}

impl StorePaths {
    pub fn under(root: &str) -> Self {
        let root = root.trim_end_matches('/');
        let join = |name: &str| {
            if root.is_empty() {
                String::from(name)
            } else {
                alloc::format!("{root}/{name}")
            }
        };
        Self {
            toc: join("toc.bin"),
            entries: join("entries.bin"),
            texts: join("texts.bin"),
        }
    }
}

struct Loaded<F> {
    toc: Box<[TocRecord]>,
    entries: F,
    texts: F,
}

pub struct PassageStore<V: Volume> {
    volume: V,
    paths: StorePaths,
    loaded: Option<Loaded<V::File>>,
}

impl<V: Volume> PassageStore<V> {
    pub fn new(volume: V, paths: StorePaths) -> Self {
        Self {
            volume,
            paths,
            loaded: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.loaded.is_some()
    }

    /// Mounts the volume, checks the three files and reads the whole TOC.
    /// The entry table and text blob stay open for the store's lifetime.
    pub fn load(&mut self) -> Result<(), StoreError> {
        self.loaded = None;
        self.volume
            .mount()
            .map_err(|_| StoreError::StorageUnavailable)?;

        for path in [&self.paths.toc, &self.paths.entries, &self.paths.texts] {
            if !self.volume.exists(path).unwrap_or(false) {
                log::warn!("passage store: {} not found", path);
                return Err(StoreError::DataMissing(file_label(&self.paths, path)));
            }
        }

        let toc = self.read_toc()?;
        let entries = self
            .volume
            .open_file(&self.paths.entries)
            .map_err(|_| StoreError::DataMissing("entries"))?;
        let texts = self
            .volume
            .open_file(&self.paths.texts)
            .map_err(|_| StoreError::DataMissing("texts"))?;

        let filled = toc.iter().filter(|r| !r.is_empty()).count();
        log::info!(
            "passage store loaded: {}/{} slots filled, {} entry bytes, {} text bytes",
            filled,
            SLOT_COUNT,
            entries.size(),
            texts.size()
        );
        self.loaded = Some(Loaded {
            toc,
            entries,
            texts,
        });
        Ok(())
    }

    fn read_toc(&mut self) -> Result<Box<[TocRecord]>, StoreError> {
        let mut file = self
            .volume
            .open_file(&self.paths.toc)
            .map_err(|_| StoreError::DataMissing("toc"))?;
        let mut raw = vec![0u8; TOC_FILE_SIZE];
        let read = file
            .read_at(0, &mut raw)
            .map_err(|_| StoreError::DataMissing("toc"))?;
        if read != TOC_FILE_SIZE {
            log::warn!("passage store: toc short read ({} of {})", read, TOC_FILE_SIZE);
            return Err(StoreError::DataMissing("toc"));
        }
        Ok(raw
            .chunks_exact(TocRecord::SIZE)
            .map(|chunk| {
                let mut record = [0u8; TocRecord::SIZE];
                record.copy_from_slice(chunk);
                TocRecord::decode(&record)
            })
            .collect())
    }

    pub fn toc_record(&self, slot: Slot) -> Result<TocRecord, StoreError> {
        let loaded = self.loaded.as_ref().ok_or(StoreError::NotReady)?;
        Ok(loaded.toc[slot.index()])
    }

    /// Returns the first record for `slot`, or `None` when the slot is empty.
    pub fn lookup(&mut self, slot: Slot) -> Result<Option<PassageRecord>, StoreError> {
        let loaded = self.loaded.as_mut().ok_or(StoreError::NotReady)?;
        let toc = loaded.toc[slot.index()];
        if toc.is_empty() {
            return Ok(None);
        }
        let offset = toc.first_entry as u64 * PassageRecord::SIZE as u64;
        let mut raw = [0u8; PassageRecord::SIZE];
        let read = loaded
            .entries
            .read_at(offset, &mut raw)
            .map_err(|_| StoreError::CorruptEntry)?;
        if read != PassageRecord::SIZE {
            return Err(StoreError::CorruptEntry);
        }
        Ok(Some(PassageRecord::decode(&raw)))
    }

    /// Reads and inflates the text of `record`. The compressed buffer is
    /// dropped before returning.
    pub fn decode(&mut self, record: &PassageRecord) -> Result<String, StoreError> {
        let loaded = self.loaded.as_mut().ok_or(StoreError::NotReady)?;
        let mut compressed = vec![0u8; record.compressed_len as usize];
        let read = loaded
            .texts
            .read_at(record.text_offset as u64, &mut compressed)
            .map_err(|_| StoreError::CorruptText)?;
        if read != compressed.len() {
            return Err(StoreError::CorruptText);
        }
        codec::inflate(&compressed, record.decoded_len as usize).map_err(StoreError::DecodeFailure)
    }
}

impl<V: Volume> SlotLookup for PassageStore<V> {
    fn lookup(&mut self, slot: Slot) -> Result<Option<PassageRecord>, StoreError> {
        PassageStore::lookup(self, slot)
    }
}

fn file_label(paths: &StorePaths, path: &str) -> &'static str {
    if path == paths.toc {
        "toc"
    } else if path == paths.entries {
        "entries"
    } else {
        "texts"
    }
}
