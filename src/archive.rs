//! ZIP extraction into the install destination.

use anyhow::Result;
use log::{debug, info};
use std::io::Read;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

use crate::error::FetchError;
use crate::runtime::Runtime;

/// Outcome of a completed install, returned to the caller and not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallResult {
    /// Absolute path of the directory the archive was extracted into.
    pub output_path: PathBuf,
    /// Number of archive entries written under `output_path`.
    pub extracted_entry_count: usize,
}

/// Extracts every entry of the archive into `output_dir`, preserving the
/// archive's internal relative paths. The directory (and missing parents)
/// is created if absent; existing files at the same paths are overwritten.
#[tracing::instrument(skip(runtime))]
pub fn unpack<R: Runtime>(
    runtime: &R,
    archive_path: &Path,
    output_dir: &Path,
) -> Result<InstallResult> {
    debug!("extracting {:?} to {:?}", archive_path, output_dir);

    let mut reader = runtime.open(archive_path).map_err(|e| {
        FetchError::ExtractionFailed(format!("cannot open {}: {}", archive_path.display(), e))
    })?;

    // The zip reader needs Seek, which the Runtime's reader does not offer,
    // so the archive is buffered in memory first. FFI bundles are a few MB.
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer).map_err(|e| {
        FetchError::ExtractionFailed(format!("cannot read {}: {}", archive_path.display(), e))
    })?;

    let mut archive = ZipArchive::new(std::io::Cursor::new(buffer))
        .map_err(|e| FetchError::ExtractionFailed(format!("not a valid ZIP archive: {}", e)))?;

    runtime.create_dir_all(output_dir).map_err(|e| {
        FetchError::ExtractionFailed(format!("cannot create {}: {}", output_dir.display(), e))
    })?;

    let mut extracted_entry_count = 0;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| FetchError::ExtractionFailed(format!("bad entry {}: {}", i, e)))?;

        let entry_path = match entry.enclosed_name() {
            Some(path) => path.to_path_buf(),
            None => {
                debug!("skipping entry with non-local path: {}", entry.name());
                continue;
            }
        };

        let full_path = output_dir.join(&entry_path);

        if entry.is_dir() {
            runtime.create_dir_all(&full_path).map_err(|e| {
                FetchError::ExtractionFailed(format!("cannot create {}: {}", full_path.display(), e))
            })?;
        } else {
            if let Some(parent) = full_path.parent() {
                runtime.create_dir_all(parent).map_err(|e| {
                    FetchError::ExtractionFailed(format!(
                        "cannot create {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }

            let mut dest_file = runtime.create_file(&full_path).map_err(|e| {
                FetchError::ExtractionFailed(format!("cannot write {}: {}", full_path.display(), e))
            })?;
            std::io::copy(&mut entry, &mut dest_file).map_err(|e| {
                FetchError::ExtractionFailed(format!("cannot write {}: {}", full_path.display(), e))
            })?;

            // Keep executable bits from the archive metadata (Unix only)
            #[cfg(unix)]
            if let Some(mode) = entry.unix_mode()
                && let Err(e) = runtime.set_permissions(&full_path, mode)
            {
                debug!("failed to set permissions on {:?}: {}", full_path, e);
            }
        }

        extracted_entry_count += 1;
    }

    let output_path = runtime.canonicalize(output_dir)?;
    info!("extracted {} entries to {:?}", extracted_entry_count, output_path);

    Ok(InstallResult {
        output_path,
        extracted_entry_count,
    })
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use anyhow::Result;
    use std::io::Write;
    use zip::CompressionMethod;
    use zip::ZipWriter;
    use zip::write::FileOptions;

    /// Builds an in-memory ZIP archive from (path, contents) pairs.
    pub fn zip_bytes(files: &[(&str, &str)]) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options: FileOptions<()> =
            FileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, content) in files {
            zip.start_file(*name, options)?;
            zip.write_all(content.as_bytes())?;
        }

        Ok(zip.finish()?.into_inner())
    }
}
