//! Raw mmap handle: a fixed-capacity file mapped read/write for the life of
//! the process, mirroring the reference `setup_mmap` lifecycle.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use memmap2::MmapMut;

use crate::error::{HnswError, Result};

pub const MMAP_FILE_NAME: &str = "hnsw_index.bin";

/// Fixed capacity of the persisted image: 250 MiB.
pub const MAX_MMAP_LENGTH: usize = 250 * 1024 * 1024;

/// A memory-mapped backing file for the persisted graph image.
///
/// The file is created (or reused) at its full fixed capacity up front, so
/// every write after setup is a plain memory copy with no further syscalls.
pub struct MmapStore {
    path: PathBuf,
    mmap: MmapMut,
}

impl MmapStore {
    /// Open (creating if necessary) the backing file under `dir` and map it
    /// at its fixed capacity.
    pub fn setup(dir: impl AsRef<Path>) -> Result<Self> {
        let path = dir.as_ref().join(MMAP_FILE_NAME);
        eprintln!("mmap: opening {}", path.display());

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)
            .map_err(|source| HnswError::MmapFailure { operation: "open", source })?;

        let metadata = file
            .metadata()
            .map_err(|source| HnswError::MmapFailure { operation: "fstat", source })?;

        if metadata.len() == 0 {
            eprintln!("mmap: extending to {MAX_MMAP_LENGTH} bytes");
            file.set_len(MAX_MMAP_LENGTH as u64)
                .map_err(|source| HnswError::MmapFailure { operation: "ftruncate", source })?;
        }

        let mmap = unsafe { MmapMut::map_mut(&file) }
            .map_err(|source| HnswError::MmapFailure { operation: "mmap", source })?;
        eprintln!("mmap: mapped {}", path.display());

        Ok(Self { path, mmap })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.mmap[..]
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.mmap[..]
    }

    /// Flush the mapping to disk. Called after every full write of the
    /// graph image so a crash afterward can't lose it.
    pub fn flush(&self) -> Result<()> {
        self.mmap
            .flush()
            .map_err(|source| HnswError::MmapFailure { operation: "msync", source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn setup_creates_file_at_full_capacity() {
        let dir = TempDir::new().unwrap();
        let store = MmapStore::setup(dir.path()).unwrap();
        assert_eq!(store.as_slice().len(), MAX_MMAP_LENGTH);
        let meta = std::fs::metadata(store.path()).unwrap();
        assert_eq!(meta.len() as usize, MAX_MMAP_LENGTH);
    }

    #[test]
    fn setup_reuses_existing_file_without_truncating_again() {
        let dir = TempDir::new().unwrap();
        {
            let mut store = MmapStore::setup(dir.path()).unwrap();
            store.as_mut_slice()[0] = 42;
            store.flush().unwrap();
        }
        let store = MmapStore::setup(dir.path()).unwrap();
        assert_eq!(store.as_slice()[0], 42);
    }
}
