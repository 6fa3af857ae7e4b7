//! On-disk records of the passage pack.
//!
//! Three files, built offline and regenerated together:
//!
//! ```text
//! toc.bin      SLOT_COUNT x TocRecord      (6 bytes, little-endian)
//!              [0..4] first_entry u32, [4..6] count u16
//! entries.bin  N x PassageRecord           (14 bytes, little-endian, packed)
//!              [0..2] book_id u16, [2..4] chapter u16, [4..6] verse u16,
//!              [6..10] text_offset u32, [10..12] compressed_len u16,
//!              [12..14] decoded_len u16
//! texts.bin    concatenated compressed blobs addressed by text_offset
//! ```

/// Number of (hour, minute) buckets: hours 1..=23 times minutes 1..=59.
pub const SLOT_COUNT: usize = 23 * 59;

pub const TOC_FILE_SIZE: usize = SLOT_COUNT * TocRecord::SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TocRecord {
    pub first_entry: u32,
    pub count: u16,
}

impl TocRecord {
    pub const SIZE: usize = 6;

    pub fn decode(buf: &[u8; Self::SIZE]) -> Self {
        Self {
            first_entry: u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
            count: u16::from_le_bytes([buf[4], buf[5]]),
        }
    }

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..4].copy_from_slice(&self.first_entry.to_le_bytes());
        buf[4..6].copy_from_slice(&self.count.to_le_bytes());
        buf
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassageRecord {
    pub book_id: u16,
    pub chapter: u16,
    pub verse: u16,
    pub text_offset: u32,
    pub compressed_len: u16,
    pub decoded_len: u16,
}

impl PassageRecord {
    pub const SIZE: usize = 14;

    pub fn decode(buf: &[u8; Self::SIZE]) -> Self {
        Self {
            book_id: u16::from_le_bytes([buf[0], buf[1]]),
            chapter: u16::from_le_bytes([buf[2], buf[3]]),
            verse: u16::from_le_bytes([buf[4], buf[5]]),
            text_offset: u32::from_le_bytes([buf[6], buf[7], buf[8], buf[9]]),
            compressed_len: u16::from_le_bytes([buf[10], buf[11]]),
            decoded_len: u16::from_le_bytes([buf[12], buf[13]]),
        }
    }

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..2].copy_from_slice(&self.book_id.to_le_bytes());
        buf[2..4].copy_from_slice(&self.chapter.to_le_bytes());
        buf[4..6].copy_from_slice(&self.verse.to_le_bytes());
        buf[6..10].copy_from_slice(&self.text_offset.to_le_bytes());
        buf[10..12].copy_from_slice(&self.compressed_len.to_le_bytes());
        buf[12..14].copy_from_slice(&self.decoded_len.to_le_bytes());
        buf
    }

    pub fn reference(&self) -> crate::books::Reference {
        crate::books::Reference {
            book_id: self.book_id,
            chapter: self.chapter,
            verse: self.verse,
        }
    }
}
