//! Line-oriented changelog file access.
//!
//! The processing functions never touch the filesystem; callers use these
//! helpers (or their own I/O layer) to load a document and write the result.

use crate::error::{Error, Result};
use crate::render::changelog_template;
use std::fs;
use std::path::Path;

/// Default changelog file name.
pub const DEFAULT_CHANGELOG_PATH: &str = "CHANGELOG.md";

/// Read a changelog as a sequence of lines.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::io_with_source(
            format!("Failed to read changelog: {}", path.display()),
            Some(path.to_path_buf()),
            e,
        )
    })?;
    Ok(content.lines().map(str::to_string).collect())
}

/// Write lines to a changelog, newline-terminated.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the file
/// cannot be written.
pub fn write_lines<S: AsRef<str>>(path: &Path, lines: &[S]) -> Result<()> {
    let mut content = String::new();
    for line in lines {
        content.push_str(line.as_ref());
        content.push('\n');
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| {
            Error::io_with_source(
                format!("Failed to create directory: {}", parent.display()),
                Some(parent.to_path_buf()),
                e,
            )
        })?;
    }

    fs::write(path, content).map_err(|e| {
        Error::io_with_source(
            format!("Failed to write changelog: {}", path.display()),
            Some(path.to_path_buf()),
            e,
        )
    })
}

/// Create a new changelog from the bootstrap template.
///
/// # Errors
///
/// Returns an error if the file already exists or cannot be written.
pub fn write_template(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(Error::io(
            format!("Changelog already exists: {}", path.display()),
            Some(path.to_path_buf()),
        ));
    }
    write_lines(path, &changelog_template())
}
