//! Write targets of a transfer.
//!
//! A transfer writes either to a temporary file next to its cache slot or
//! to a growable buffer. The temporary file only becomes visible under the
//! slot's name through an atomic rename; every other way out of a
//! transfer removes it, including a dropped future or a panic.

use crate::error::{Error, Result};

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, warn};

/// Suffix appended to the cache slot's file name while downloading.
pub const TEMP_SUFFIX: &str = ".temp";

const BUFFER_SIZE: usize = 8 * 1024;

/// Path of the temporary file used while downloading into `target`.
pub fn temp_path(target: &Path) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

pub(crate) enum Sink {
    File(TempFile),
    Memory(Vec<u8>),
}

impl Sink {
    pub(crate) fn memory(capacity_hint: u64) -> Self {
        // The announced length is untrusted; cap the preallocation.
        let capacity = capacity_hint.min(1024 * 1024) as usize;
        Sink::Memory(Vec::with_capacity(capacity))
    }

    pub(crate) async fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        match self {
            Sink::File(file) => file.write_all(buf).await,
            Sink::Memory(data) => {
                data.extend_from_slice(buf);
                Ok(())
            }
        }
    }

    pub(crate) async fn close(&mut self) -> Result<()> {
        match self {
            Sink::File(file) => file.close().await,
            Sink::Memory(_) => Ok(()),
        }
    }

    /// Throws away everything written so far.
    pub(crate) async fn discard(self) {
        if let Sink::File(file) = self {
            file.discard().await;
        }
    }
}

/// A temporary file owned by one transfer.
pub(crate) struct TempFile {
    target: PathBuf,
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    armed: bool,
}

impl TempFile {
    /// Creates (or truncates) the temporary file for `target`.
    pub(crate) async fn create(target: &Path) -> Result<Self> {
        let path = temp_path(target);
        debug!("Creating temporary file {:?}", &path);
        let file = File::create(&path).await.map_err(|source| Error::Sink {
            path: path.clone(),
            source,
        })?;

        Ok(Self {
            writer: Some(BufWriter::with_capacity(BUFFER_SIZE, file)),
            target: target.to_path_buf(),
            path,
            armed: true,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    async fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(Error::Internal(format!("{:?} is already closed", self.path)));
        };
        writer.write_all(buf).await.map_err(|source| Error::Sink {
            path: self.path.clone(),
            source,
        })
    }

    /// Flushes buffered bytes and closes the file handle.
    async fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.shutdown().await.map_err(|source| Error::Sink {
                path: self.path.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Atomically moves the file onto its cache slot and returns the
    /// slot's path.
    ///
    /// On failure the temporary file is removed and the slot is left as
    /// it was.
    pub(crate) async fn commit(mut self) -> Result<PathBuf> {
        if let Err(e) = self.close().await {
            self.discard().await;
            return Err(e);
        }
        match fs::rename(&self.path, &self.target).await {
            Ok(()) => {
                self.armed = false;
                debug!("Committed {:?}", &self.target);
                Ok(self.target.clone())
            }
            Err(source) => {
                let path = self.target.clone();
                self.discard().await;
                Err(Error::Commit { path, source })
            }
        }
    }

    pub(crate) async fn discard(mut self) {
        self.writer.take();
        self.armed = false;
        if let Err(e) = fs::remove_file(&self.path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove temporary file {:?}: {}", &self.path, e);
            }
        }
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.writer.take();
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove temporary file {:?}: {}", &self.path, e);
            }
        }
    }
}
