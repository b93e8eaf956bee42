use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tempfile::NamedTempFile;

/// A single named document that is read once and rewritten whole.
#[async_trait]
pub trait BlobStorage: Send + Sync + 'static {
    /// `Ok(None)` when nothing has been written yet.
    async fn read(&self) -> io::Result<Option<String>>;

    async fn write(&self, contents: String) -> io::Result<()>;
}

/// Blob kept in a file. Writes go to a sibling temp file that is renamed over
/// the target, so readers never observe a half-written document.
pub struct FileBlobStorage {
    path: PathBuf,
}

impl FileBlobStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl BlobStorage for FileBlobStorage {
    async fn read(&self) -> io::Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn write(&self, contents: String) -> io::Result<()> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            std::fs::create_dir_all(&dir)?;

            let mut tmp = NamedTempFile::new_in(&dir)?;
            tmp.write_all(contents.as_bytes())?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(io::Error::other)?
    }
}

/// Blob held in memory. Writes can be made to fail for tests.
#[derive(Default)]
pub struct MemoryBlobStorage {
    contents: Mutex<Option<String>>,
    fail_writes: AtomicBool,
}

impl MemoryBlobStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().clone()
    }
}

#[async_trait]
impl BlobStorage for MemoryBlobStorage {
    async fn read(&self) -> io::Result<Option<String>> {
        Ok(self.contents.lock().clone())
    }

    async fn write(&self, contents: String) -> io::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::other("blob storage is read-only"));
        }
        *self.contents.lock() = Some(contents);
        Ok(())
    }
}
