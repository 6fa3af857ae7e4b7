use std::fs;
use std::io::{self, Read as _, Seek as _};
use std::path::{Path, PathBuf};

use embedded_io::{ErrorType, Read, Seek, SeekFrom};
use verseclock_core::fs::{File, Volume};

/// Host directory standing in for the device's storage card.
pub struct HostVolume {
    root: PathBuf,
}

impl HostVolume {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl ErrorType for HostVolume {
    type Error = io::Error;
}

impl Volume for HostVolume {
    type File = HostFile;

    fn mount(&mut self) -> Result<(), Self::Error> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a directory", self.root.display()),
            ))
        }
    }

    fn exists(&self, path: &str) -> Result<bool, Self::Error> {
        Ok(self.resolve(path).is_file())
    }

    fn open_file(&self, path: &str) -> Result<Self::File, Self::Error> {
        let file = fs::File::open(self.resolve(path))?;
        let size = file.metadata()?.len() as usize;
        Ok(HostFile { file, size })
    }
}

pub struct HostFile {
    file: fs::File,
    size: usize,
}

impl ErrorType for HostFile {
    type Error = io::Error;
}

impl Read for HostFile {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.file.read(buf)
    }
}

impl Seek for HostFile {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, Self::Error> {
        let pos = match pos {
            SeekFrom::Start(offset) => io::SeekFrom::Start(offset),
            SeekFrom::End(delta) => io::SeekFrom::End(delta),
            SeekFrom::Current(delta) => io::SeekFrom::Current(delta),
        };
        self.file.seek(pos)
    }
}

impl File for HostFile {
    fn size(&self) -> usize {
        self.size
    }
}
