use std::{fs::File, path::Path};

use anyhow::Context;
use tempfile::NamedTempFile;

use crate::error::Error;

/// Writes through a temporary file next to `path` and renames it into place
/// once `write` succeeds.
pub fn write_atomically<F>(path: &Path, write: F) -> Result<(), Error>
where
    F: FnOnce(&mut File) -> anyhow::Result<()>,
{
    let to_write_error = |source: anyhow::Error| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(directory)
        .context("Failed to create temporary output file")
        .map_err(to_write_error)?;

    write(file.as_file_mut()).map_err(to_write_error)?;

    file.as_file_mut()
        .sync_all()
        .context("Failed to flush output file")
        .map_err(to_write_error)?;

    file.persist(path)
        .map_err(|e| e.error)
        .context("Failed to move output file into place")
        .map_err(to_write_error)?;

    Ok(())
}

pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }

    Ok(())
}
