//! Offline writer for the three pack files. Runs on the build host, never on
//! the device.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use crate::slot::Slot;
use crate::store::codec;
use crate::store::{PassageRecord, SLOT_COUNT, TocRecord};

pub const DEFAULT_LEVEL: u8 = 9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackEntry {
    pub book_id: u16,
    pub chapter: u16,
    pub verse: u16,
    pub text: String,
}

/// Byte images of `toc.bin`, `entries.bin` and `texts.bin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackFiles {
    pub toc: Vec<u8>,
    pub entries: Vec<u8>,
    pub texts: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackError {
    /// More entries than a u32 index can address.
    TooManyEntries,
    /// A text or its compressed form does not fit a u16 length.
    TextTooLong { slot: usize },
    /// The text blob outgrew a u32 offset.
    BlobTooLarge,
}

impl core::fmt::Display for PackError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PackError::TooManyEntries => write!(f, "too many entries for the entry table"),
            PackError::TextTooLong { slot } => write!(f, "text in slot {slot} exceeds 65535 bytes"),
            PackError::BlobTooLarge => write!(f, "text blob exceeds 4 GiB"),
        }
    }
}

/// Collects entries per slot; the first entry pushed for a slot is the one
/// the device shows.
pub struct PackBuilder {
    slots: Vec<Vec<PackEntry>>,
    level: u8,
}

impl Default for PackBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PackBuilder {
    pub fn new() -> Self {
        Self::with_level(DEFAULT_LEVEL)
    }

    pub fn with_level(level: u8) -> Self {
        Self {
            slots: (0..SLOT_COUNT).map(|_| Vec::new()).collect(),
            level,
        }
    }

    pub fn push(&mut self, slot: Slot, book_id: u16, chapter: u16, verse: u16, text: &str) {
        self.slots[slot.index()].push(PackEntry {
            book_id,
            chapter,
            verse,
            text: String::from(text),
        });
    }

    pub fn filled_slots(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_empty()).count()
    }

    /// Lays entries out contiguously in slot order and compresses every text.
    pub fn try_finish(&self) -> Result<PackFiles, PackError> {
        let mut toc = Vec::with_capacity(SLOT_COUNT * TocRecord::SIZE);
        let mut entries = Vec::new();
        let mut texts = Vec::new();
        let mut entry_count: usize = 0;

        for (slot, slot_entries) in self.slots.iter().enumerate() {
            let first_entry = u32::try_from(entry_count).map_err(|_| PackError::TooManyEntries)?;
            let count = u16::try_from(slot_entries.len()).map_err(|_| PackError::TooManyEntries)?;
            toc.extend_from_slice(&TocRecord { first_entry, count }.encode());

            for entry in slot_entries {
                let compressed = codec::deflate(&entry.text, self.level);
                let record = PassageRecord {
                    book_id: entry.book_id,
                    chapter: entry.chapter,
                    verse: entry.verse,
                    text_offset: u32::try_from(texts.len()).map_err(|_| PackError::BlobTooLarge)?,
                    compressed_len: u16::try_from(compressed.len())
                        .map_err(|_| PackError::TextTooLong { slot })?,
                    decoded_len: u16::try_from(entry.text.len())
                        .map_err(|_| PackError::TextTooLong { slot })?,
                };
                texts.extend_from_slice(&compressed);
                entries.extend_from_slice(&record.encode());
                entry_count += 1;
            }
        }

        Ok(PackFiles { toc, entries, texts })
    }

    /// Like [`try_finish`](Self::try_finish) for packs known to be small.
    #[cfg(test)]
    pub fn finish(&self) -> PackFiles {
        self.try_finish().expect("pack within format limits")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::map_to_slot;
    use crate::store::TOC_FILE_SIZE;

    #[test]
    fn toc_covers_every_slot() {
        let files = PackBuilder::new().finish();
        assert_eq!(files.toc.len(), TOC_FILE_SIZE);
        assert!(files.entries.is_empty());
        assert!(files.texts.is_empty());
    }

    #[test]
    fn entries_are_contiguous_per_slot() {
        let mut builder = PackBuilder::new();
        builder.push(map_to_slot(2, 2), 19, 2, 2, "second slot, first entry");
        builder.push(map_to_slot(1, 1), 1, 1, 1, "first slot");
        builder.push(map_to_slot(2, 2), 20, 2, 2, "second slot, second entry");
        let files = builder.finish();
        assert_eq!(builder.filled_slots(), 2);
        assert_eq!(files.entries.len(), 3 * PassageRecord::SIZE);

        let toc_at = |slot: Slot| {
            let start = slot.index() * TocRecord::SIZE;
            let mut raw = [0u8; TocRecord::SIZE];
            raw.copy_from_slice(&files.toc[start..start + TocRecord::SIZE]);
            TocRecord::decode(&raw)
        };
        assert_eq!(toc_at(map_to_slot(1, 1)), TocRecord { first_entry: 0, count: 1 });
        assert_eq!(toc_at(map_to_slot(2, 2)), TocRecord { first_entry: 1, count: 2 });
        assert_eq!(toc_at(map_to_slot(5, 5)), TocRecord { first_entry: 3, count: 0 });

        let mut raw = [0u8; PassageRecord::SIZE];
        raw.copy_from_slice(&files.entries[PassageRecord::SIZE..2 * PassageRecord::SIZE]);
        let record = PassageRecord::decode(&raw);
        assert_eq!(record.book_id, 19);
        let blob = &files.texts
            [record.text_offset as usize..(record.text_offset + record.compressed_len as u32) as usize];
        assert_eq!(
            codec::inflate(blob, record.decoded_len as usize).unwrap(),
            "second slot, first entry"
        );
    }
}
