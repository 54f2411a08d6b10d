//! Writing the finished article to disk.

use crate::Error;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{is_separator, Path, PathBuf};

pub const DEFAULT_OUTPUT: &str = "generated_article.md";

/// Give extension-less paths a `.md` extension.
///
/// A path naming a directory, or ending in a separator, is rejected rather
/// than turned into a sibling file.
pub fn resolve_output_path(path: &Path) -> Result<PathBuf, Error> {
    let names_directory = path.as_os_str().to_string_lossy().ends_with(is_separator);
    if names_directory || path.is_dir() || path.file_name().is_none() {
        return Err(Error::io(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "output path is a directory"),
        ));
    }

    if path.extension().is_some() {
        Ok(path.to_path_buf())
    } else {
        Ok(path.with_extension("md"))
    }
}

/// Write `text` to `path`, truncating any existing file.
///
/// The file is opened for writing in place, so a write-protected target is
/// an error and keeps its contents. The parent directory must already exist.
pub fn write_article(path: &Path, text: &str) -> Result<(), Error> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|e| Error::io(path, e))?;

    file.write_all(text.as_bytes())
        .and_then(|()| file.sync_all())
        .map_err(|e| Error::io(path, e))?;

    tracing::debug!(path = %path.display(), bytes = text.len(), "article written");
    Ok(())
}
