//! Zip archive extraction.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use thiserror::Error;
use zip::ZipArchive;

/// Error from extracting one archive.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("zip: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("i/o: {0}")]
    Io(#[from] io::Error),
}

/// Extracts `archive_path` into `dest`, preserving the archive's internal
/// relative paths. `dest` must already exist; it is resolved to an absolute
/// path before use. Entries whose names escape `dest` are skipped.
///
/// Existing files are truncated and overwritten.
pub fn extract_zip(archive_path: &Path, dest: &Path) -> Result<(), ExtractError> {
    let dest = dest.canonicalize()?;
    tracing::info!(
        "extracting '{}' to '{}'",
        archive_path.display(),
        dest.display()
    );

    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let out_path = match entry.enclosed_name() {
            Some(rel) => dest.join(rel),
            None => {
                tracing::warn!(
                    "skipping entry '{}' with unsafe path in '{}'",
                    entry.name(),
                    archive_path.display()
                );
                continue;
            }
        };

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
        } else {
            if let Some(parent) = out_path.parent() {
                if !parent.exists() {
                    fs::create_dir_all(parent)?;
                }
            }
            let mut out_file = File::create(&out_path)?;
            io::copy(&mut entry, &mut out_file)?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&out_path, fs::Permissions::from_mode(mode))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut cursor = io::Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            for (name, body) in entries {
                writer
                    .start_file(*name, SimpleFileOptions::default())
                    .unwrap();
                writer.write_all(body).unwrap();
            }
            writer.finish().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn extracts_nested_paths() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("data.zip");
        fs::write(
            &archive_path,
            build_zip(&[("AD.txt", b"andorra"), ("sub/dir/BE.txt", b"belgium")]),
        )
        .unwrap();

        extract_zip(&archive_path, dir.path()).unwrap();

        assert_eq!(fs::read(dir.path().join("AD.txt")).unwrap(), b"andorra");
        assert_eq!(
            fs::read(dir.path().join("sub/dir/BE.txt")).unwrap(),
            b"belgium"
        );
    }

    #[test]
    fn overwrites_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("AD.txt"), b"stale").unwrap();
        let archive_path = dir.path().join("data.zip");
        fs::write(&archive_path, build_zip(&[("AD.txt", b"fresh")])).unwrap();

        extract_zip(&archive_path, dir.path()).unwrap();

        assert_eq!(fs::read(dir.path().join("AD.txt")).unwrap(), b"fresh");
    }

    #[test]
    fn corrupt_archive_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("broken.zip");
        fs::write(&archive_path, b"this is not a zip file").unwrap();

        let err = extract_zip(&archive_path, dir.path());
        assert!(matches!(err, Err(ExtractError::Zip(_))));
    }

    #[test]
    fn missing_archive_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_zip(&dir.path().join("absent.zip"), dir.path());
        assert!(matches!(err, Err(ExtractError::Io(_))));
    }
}
