//! Fixture File: `.sdpb` binaries via memory-mapped I/O
//!
//! File fixture di-mmap read-only, sehingga zero-copy decode
//! meminjam langsung dari page cache tanpa copy ke user space.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use tracing::trace;

use crate::error::Result;

/// Ekstensi standar fixture binary
pub const FIXTURE_EXTENSION: &str = "sdpb";

/// Fixture binary yang di-mmap read-only
#[derive(Debug)]
pub struct FixtureFile {
    // None untuk file kosong: mapping panjang 0 tidak portable
    mmap: Option<Mmap>,
    path: PathBuf,
}

impl FixtureFile {
    /// Buka dan map file fixture
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let len = file.metadata()?.len();

        let mmap = if len == 0 {
            None
        } else {
            // SAFETY: Mapping read-only; fixture tidak dimodifikasi selama dipakai
            Some(unsafe { Mmap::map(&file)? })
        };

        trace!(path = %path.display(), len, "mapped fixture");
        Ok(Self { mmap, path })
    }

    /// Isi file sebagai wire buffer (zero-copy)
    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Tulis fixture binary, membuat parent directory bila perlu
pub fn write_fixture<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, bytes)?;
    trace!(path = %path.display(), len = bytes.len(), "wrote fixture");
    Ok(())
}

/// Path fixture standar: `<dir>/<name>.sdpb`
pub fn fixture_path<P: AsRef<Path>>(dir: P, name: &str) -> PathBuf {
    dir.as_ref().join(name).with_extension(FIXTURE_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_write_then_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture_path(dir.path().join("nested"), "point");
        write_fixture(&path, b"\x01\x02\x03").unwrap();

        let fixture = FixtureFile::open(&path).unwrap();
        assert_eq!(fixture.as_bytes(), b"\x01\x02\x03");
        assert_eq!(fixture.len(), 3);
        assert!(fixture.path().ends_with("point.sdpb"));
    }

    #[test]
    fn test_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture_path(dir.path(), "empty");
        write_fixture(&path, &[]).unwrap();

        let fixture = FixtureFile::open(&path).unwrap();
        assert!(fixture.is_empty());
        assert!(fixture.as_bytes().is_empty());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FixtureFile::open(dir.path().join("missing.sdpb")).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
