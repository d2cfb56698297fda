use std::fs;

use camino::{Utf8Path, Utf8PathBuf};

use crate::domain::DataId;
use crate::error::ReslinkError;

#[derive(Debug, Clone)]
pub struct LinkTree {
    data_root: Utf8PathBuf,
}

impl LinkTree {
    pub fn new(data_root: &str) -> Self {
        Self {
            data_root: Utf8PathBuf::from(data_root),
        }
    }

    pub fn data_root(&self) -> &Utf8Path {
        &self.data_root
    }

    pub fn source_path(&self, id: DataId, file_name: &str) -> Utf8PathBuf {
        self.data_root.join(id.to_string()).join(file_name)
    }

    /// Local visibility of the source file is the sole signal for choosing
    /// local over remote link creation.
    pub fn is_local(&self, path: &Utf8Path) -> bool {
        path.as_std_path().is_file()
    }

    /// Replaces whatever entry (including a dangling link) already occupies
    /// the destination.
    pub fn create_local_link(source: &Utf8Path, dest: &Utf8Path) -> Result<(), ReslinkError> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent.as_std_path())
                .map_err(|err| ReslinkError::Filesystem(err.to_string()))?;
        }

        if fs::symlink_metadata(dest.as_std_path()).is_ok() {
            fs::remove_file(dest.as_std_path())
                .map_err(|err| ReslinkError::Filesystem(err.to_string()))?;
        }

        symlink(source, dest).map_err(|err| ReslinkError::Filesystem(err.to_string()))
    }
}

#[cfg(unix)]
fn symlink(source: &Utf8Path, dest: &Utf8Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(source.as_std_path(), dest.as_std_path())
}

#[cfg(windows)]
fn symlink(source: &Utf8Path, dest: &Utf8Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_file(source.as_std_path(), dest.as_std_path())
}
