//! Idempotent symlink creation

use crate::error::SymlinkError;
use std::fs;
use std::io;
use std::path::Path;

/// Create a symlink at `link` pointing to `target`, unless `link` already exists.
///
/// `target` is stored verbatim, so a relative target resolves against the
/// link's own directory. An existing file, directory or symlink at `link`
/// yields [`SymlinkError::AlreadyExists`] and is left untouched.
pub fn ensure_symlink(link: &Path, target: &Path) -> Result<(), SymlinkError> {
    match fs::metadata(link) {
        Ok(_) => return Err(SymlinkError::AlreadyExists(link.to_path_buf())),
        Err(err) if err.kind() != io::ErrorKind::NotFound => {
            return Err(SymlinkError::Metadata(err));
        }
        Err(_) => {}
    }

    create_symlink(target, link).map_err(SymlinkError::Create)
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}
