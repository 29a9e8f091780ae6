use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

pub fn get_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
}

pub fn get_mime_type(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_or_octet_stream()
        .to_string()
}

/// Nome file senza estensione ("report.pdf" -> "report")
pub fn base_name(filename: &str) -> &str {
    filename
        .rsplit_once('.')
        .map(|(base, _)| base)
        .unwrap_or(filename)
}

pub fn validate_file_size(size: u64, max_size_mb: u64) -> Result<()> {
    let max_bytes = max_size_mb * 1024 * 1024;
    if size > max_bytes {
        return Err(AppError::FileTooLarge(max_size_mb));
    }
    Ok(())
}

/// Percorso di destinazione libero: se `filename` esiste già nella directory
/// viene aggiunto un suffisso numerico ("report.zip" -> "report_1.zip")
pub fn unique_destination(dir: &Path, filename: &str) -> PathBuf {
    let candidate = dir.join(filename);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = match filename.rsplit_once('.') {
        Some((s, e)) => (s, Some(e)),
        None => (filename, None),
    };

    for i in 1u32.. {
        let name = match ext {
            Some(e) => format!("{}_{}.{}", stem, i, e),
            None => format!("{}_{}", stem, i),
        };
        let candidate = dir.join(name);
        if !candidate.exists() {
            return candidate;
        }
    }

    unreachable!()
}

/// Scrittura atomica: file temporaneo nella stessa directory, poi rename
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| AppError::IoError(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("report.pdf"), "report");
        assert_eq!(base_name("archive.tar.gz"), "archive.tar");
        assert_eq!(base_name("senza_estensione"), "senza_estensione");
    }

    #[test]
    fn test_get_extension() {
        assert_eq!(get_extension("report.PDF"), Some("pdf".to_string()));
        assert_eq!(get_extension("foto.jpeg"), Some("jpeg".to_string()));
        assert_eq!(get_extension("senza_estensione"), None);
    }

    #[test]
    fn test_unique_destination_suffixes() {
        let dir = tempfile::tempdir().unwrap();
        let first = unique_destination(dir.path(), "out.zip");
        assert_eq!(first, dir.path().join("out.zip"));

        std::fs::write(&first, b"x").unwrap();
        let second = unique_destination(dir.path(), "out.zip");
        assert_eq!(second, dir.path().join("out_1.zip"));

        std::fs::write(&second, b"x").unwrap();
        let third = unique_destination(dir.path(), "out.zip");
        assert_eq!(third, dir.path().join("out_2.zip"));
    }

    #[test]
    fn test_write_atomic_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested").join("out.bin");
        write_atomic(&dest, b"contenuto").unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"contenuto");
    }
}
