//! Filesystem-backed resource store.
//!
//! A `ResourceStore` owns one flat directory. Entries are addressed by a
//! store-relative file name; the store never creates nested directories
//! below its root.
//!
//! Two write primitives are offered:
//! - [`ResourceStore::write_once_append`] for cache entries (create or append)
//! - [`ResourceStore::create_new`] for downloads (create-exclusive, so the
//!   filesystem itself arbitrates between concurrent writers)
//!
//! Each write runs as a single job on the blocking pool. Dropping the
//! returned future detaches the caller but never interrupts the job, so a
//! cancelled write leaves either no entry or a complete one.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tokio::fs::{self, DirBuilder};

use crate::Error;

/// Permission bits for directories created by the store.
#[cfg(unix)]
const DIR_MODE: u32 = 0o755;

/// A directory of flat files addressed by name.
#[derive(Debug, Clone)]
pub struct ResourceStore {
    root: PathBuf,
}

impl ResourceStore {
    /// Wrap an existing directory without touching the filesystem.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the root directory if needed and return a store over it.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let root = root.into();
        Self::create_if_absent(&root).await?;
        Ok(Self { root })
    }

    /// Create `dir` (and missing parents) with mode 0755. Existing directories are left alone.
    pub async fn create_if_absent(dir: &Path) -> Result<(), Error> {
        let mut builder = DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(DIR_MODE);

        builder.create(dir).await.map_err(|e| Error::store_io(dir, e))?;
        tracing::debug!(path = %dir.display(), "store directory ready");
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute-or-relative path of an entry inside this store.
    pub fn entry_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Whether a regular file named `name` exists. Errors count as absent.
    pub async fn exists(&self, name: &str) -> bool {
        match fs::metadata(self.entry_path(name)).await {
            Ok(meta) => meta.is_file(),
            Err(_) => false,
        }
    }

    /// Read an entry in full.
    pub async fn read(&self, name: &str) -> Result<Vec<u8>, Error> {
        let path = self.entry_path(name);
        fs::read(&path).await.map_err(|e| Error::from_io(&path, e))
    }

    /// Append `bytes` to an entry, creating it when missing.
    ///
    /// Not atomic across concurrent writers to the same entry; callers
    /// serialize per entry.
    pub async fn write_once_append(&self, name: &str, bytes: &[u8]) -> Result<(), Error> {
        let path = self.entry_path(name);
        let bytes = bytes.to_vec();
        run_detached(path, move |path| {
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            file.write_all(&bytes)?;
            file.flush()
        })
        .await
        .map_err(|(path, e)| Error::store_io(&path, e))
    }

    /// Create an entry exclusively and write `bytes` into it.
    ///
    /// Returns [`Error::AlreadyExists`] when the name is taken. A write
    /// failure after creation leaves the partial file in place and returns
    /// [`Error::StoreIo`].
    pub async fn create_new(&self, name: &str, bytes: &[u8]) -> Result<u64, Error> {
        let path = self.entry_path(name);
        let len = bytes.len() as u64;
        let bytes = bytes.to_vec();
        run_detached(path, move |path| {
            let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
            file.write_all(&bytes)?;
            file.sync_all()
        })
        .await
        .map_err(|(path, e)| Error::from_io(&path, e))?;
        Ok(len)
    }
}

/// Run `job` on the blocking pool and wait for it. The job keeps running if
/// this future is dropped.
async fn run_detached<F>(path: PathBuf, job: F) -> Result<(), (PathBuf, io::Error)>
where
    F: FnOnce(&Path) -> io::Result<()> + Send + 'static,
{
    let job_path = path.clone();
    match tokio::task::spawn_blocking(move || job(&job_path)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err((path, e)),
        Err(e) => Err((path, io::Error::other(e))),
    }
}
