//! Output files.
//!
//! Files are first staged into temporary files next to their
//! destinations. [`commit`] renames them into place only after every file
//! was staged, and removes the ones already renamed if a later rename
//! fails, so a failed run leaves no output behind.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};
use tempfile::NamedTempFile;

/// Errors writing an output file.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("failed to write {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// A complete file waiting to be renamed to its destination. Dropping it
/// deletes the temporary file.
#[derive(Debug)]
pub struct Staged {
    file: NamedTempFile,
    path: PathBuf,
}

/// Stage `image` as PNG for `path`.
pub fn stage_png(path: &Path, image: &RgbaImage) -> Result<Staged, OutputError> {
    let mut file = create_temp(path)?;
    image
        .write_to(file.as_file_mut(), ImageFormat::Png)
        .map_err(|source| OutputError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Staged {
        file,
        path: path.to_path_buf(),
    })
}

/// Stage `text` for `path`.
pub fn stage_text(path: &Path, text: &str) -> Result<Staged, OutputError> {
    let mut file = create_temp(path)?;
    write_all(file.as_file_mut(), text.as_bytes()).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Staged {
        file,
        path: path.to_path_buf(),
    })
}

/// Rename every staged file into place, in order.
///
/// On failure the files renamed so far are removed again and the
/// remaining temporary files are dropped.
pub fn commit(staged: Vec<Staged>) -> Result<(), OutputError> {
    let mut written: Vec<PathBuf> = Vec::with_capacity(staged.len());
    for Staged { file, path } in staged {
        if let Err(err) = file.persist(&path) {
            for done in &written {
                if let Err(e) = std::fs::remove_file(done) {
                    tracing::warn!(path = %done.display(), "failed to remove output file: {e}");
                }
            }
            return Err(OutputError::Io {
                path,
                source: err.error,
            });
        }
        tracing::debug!(path = %path.display(), "wrote output file");
        written.push(path);
    }
    Ok(())
}

fn write_all(file: &mut File, bytes: &[u8]) -> io::Result<()> {
    file.write_all(bytes)?;
    file.flush()
}

fn create_temp(path: &Path) -> Result<NamedTempFile, OutputError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    NamedTempFile::new_in(dir).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })
}
