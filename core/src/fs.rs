extern crate alloc;

use core::result::Result;

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use embedded_io::{ErrorKind, ErrorType, Read, Seek, SeekFrom};

/// A storage medium holding the passage files (SD card, flash partition,
/// host directory).
pub trait Volume: ErrorType {
    type File: File<Error = Self::Error>;

    fn mount(&mut self) -> Result<(), Self::Error>;
    fn exists(&self, path: &str) -> Result<bool, Self::Error>;
    fn open_file(&self, path: &str) -> Result<Self::File, Self::Error>;
}

pub trait File: Read + Seek {
    fn size(&self) -> usize;

    /// Reads up to `buf.len()` bytes starting at `offset` and returns how
    /// many were read. A short count means the file ended first.
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.seek(SeekFrom::Start(offset))?;
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.read(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemError {
    NotMounted,
    NotFound,
    InvalidSeek,
}

impl embedded_io::Error for MemError {
    fn kind(&self) -> ErrorKind {
        match self {
            MemError::NotMounted => ErrorKind::Other,
            MemError::NotFound => ErrorKind::NotFound,
            MemError::InvalidSeek => ErrorKind::InvalidInput,
        }
    }
}

/// RAM-backed volume. Useful for tests and for data baked into flash.
#[derive(Default)]
pub struct MemVolume {
    files: BTreeMap<String, Rc<[u8]>>,
    mounted: bool,
    unmountable: bool,
}

impl MemVolume {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &str, data: Vec<u8>) {
        self.files.insert(String::from(path), Rc::from(data));
    }

    pub fn remove(&mut self, path: &str) {
        self.files.remove(path);
    }

    /// Makes every subsequent `mount` fail, as with a missing card.
    pub fn set_unmountable(&mut self, unmountable: bool) {
        self.unmountable = unmountable;
    }
}

impl ErrorType for MemVolume {
    type Error = MemError;
}

impl Volume for MemVolume {
    type File = MemFile;

    fn mount(&mut self) -> Result<(), Self::Error> {
        if self.unmountable {
            return Err(MemError::NotMounted);
        }
        self.mounted = true;
        Ok(())
    }

    fn exists(&self, path: &str) -> Result<bool, Self::Error> {
        if !self.mounted {
            return Err(MemError::NotMounted);
        }
        Ok(self.files.contains_key(path))
    }

    fn open_file(&self, path: &str) -> Result<Self::File, Self::Error> {
        if !self.mounted {
            return Err(MemError::NotMounted);
        }
        let data = self.files.get(path).ok_or(MemError::NotFound)?;
        Ok(MemFile {
            data: Rc::clone(data),
            pos: 0,
        })
    }
}

pub struct MemFile {
    data: Rc<[u8]>,
    pos: usize,
}

impl ErrorType for MemFile {
    type Error = MemError;
}

impl Read for MemFile {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let remaining = self.data.get(self.pos..).unwrap_or(&[]);
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.pos += n;
        Ok(n)
    }
}

impl Seek for MemFile {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, Self::Error> {
        let target = match pos {
            SeekFrom::Start(offset) => offset as i64,
            SeekFrom::End(delta) => self.data.len() as i64 + delta,
            SeekFrom::Current(delta) => self.pos as i64 + delta,
        };
        if target < 0 {
            return Err(MemError::InvalidSeek);
        }
        self.pos = target as usize;
        Ok(target as u64)
    }
}

impl File for MemFile {
    fn size(&self) -> usize {
        self.data.len()
    }
}
