//! Download e salvataggio dei risultati di conversione.

use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use reqwest::StatusCode;
use zip::ZipArchive;

use crate::error::{AppError, Result};
use crate::utils::{is_archive_mime, resolve_filename, unique_destination, write_atomic};

use super::{header_string, ConvertClient, JobHandle};

/// Risultato di conversione scaricato in memoria
#[derive(Debug, Clone)]
pub struct Artifact {
    pub bytes: Bytes,
    pub filename: String,
    pub content_type: Option<String>,
}

impl Artifact {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Il risultato è un archivio di più file (PDF multi-pagina)
    pub fn is_zip(&self) -> bool {
        self.content_type
            .as_deref()
            .map(is_archive_mime)
            .unwrap_or(false)
            || self.filename.to_lowercase().ends_with(".zip")
    }

    /// Salva il risultato nella directory indicata, senza sovrascrivere
    /// file esistenti
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        let dest = unique_destination(dir, &self.filename);
        write_atomic(&dest, &self.bytes)?;
        tracing::info!(
            "Risultato salvato in {} ({} byte)",
            dest.display(),
            self.bytes.len()
        );
        Ok(dest)
    }

    /// Estrae i file contenuti nell'archivio ZIP nella directory indicata.
    /// Le voci con percorsi assoluti o traversal vengono ignorate.
    pub fn unpack_zip(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut archive = ZipArchive::new(Cursor::new(self.bytes.as_ref()))?;
        let mut extracted = Vec::new();

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if entry.is_dir() {
                continue;
            }

            let Some(relative) = entry.enclosed_name() else {
                tracing::warn!("Voce ZIP con percorso non valido ignorata: {}", entry.name());
                continue;
            };

            // La dimensione dichiarata nell'header non è affidabile
            // prima della lettura, quindi niente preallocazione
            let mut data = Vec::new();
            entry.read_to_end(&mut data)?;

            let dest = dir.join(relative);
            write_atomic(&dest, &data)?;
            extracted.push(dest);
        }

        tracing::info!("Estratti {} file da {}", extracted.len(), self.filename);
        Ok(extracted)
    }
}

impl ConvertClient {
    /// Scarica il risultato di un job completato.
    ///
    /// Usa l'URL comunicato dal server nello snapshot quando presente,
    /// altrimenti la rotta `GET /download/{id}`.
    pub async fn download(&self, handle: &JobHandle) -> Result<Artifact> {
        let url = match handle.job.download_url.as_deref() {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
                url.to_string()
            }
            Some(path) => format!("{}{}", handle.base_url, path),
            None => format!("{}/download/{}", handle.base_url, handle.job.id),
        };

        let response = self.http.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::ResultUnavailable(handle.job.id.clone()));
        }
        if !response.status().is_success() {
            return Err(self.api_error(response).await);
        }

        let content_disposition = header_string(&response, reqwest::header::CONTENT_DISPOSITION);
        let content_type = header_string(&response, reqwest::header::CONTENT_TYPE);
        let bytes = response.bytes().await?;

        let filename = resolve_filename(
            content_disposition.as_deref(),
            content_type.as_deref(),
            &handle.original_name,
            &handle.expected_ext,
        );

        tracing::info!(
            "Download completato per job {}: {} ({} byte)",
            handle.job.id,
            filename,
            bytes.len()
        );

        Ok(Artifact {
            bytes,
            filename,
            content_type,
        })
    }

    /// Download automatico al completamento: si attiva al massimo una
    /// volta per handle, le chiamate successive restituiscono None
    pub async fn download_once(&self, handle: &JobHandle) -> Result<Option<Artifact>> {
        if !handle.claim_download() {
            tracing::debug!("Download già eseguito per job {}", handle.job.id);
            return Ok(None);
        }

        self.download(handle).await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn make_zip(entries: &[(&str, &[u8])]) -> Bytes {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut buffer);
            let options = SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Deflated);
            for (name, data) in entries {
                zip.start_file(name.to_string(), options).unwrap();
                zip.write_all(data).unwrap();
            }
            zip.finish().unwrap();
        }
        Bytes::from(buffer.into_inner())
    }

    #[test]
    fn test_is_zip_from_content_type() {
        let artifact = Artifact {
            bytes: Bytes::new(),
            filename: "report_images".to_string(),
            content_type: Some("application/zip".to_string()),
        };
        assert!(artifact.is_zip());

        let artifact = Artifact {
            bytes: Bytes::new(),
            filename: "report.docx".to_string(),
            content_type: Some(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
                    .to_string(),
            ),
        };
        assert!(!artifact.is_zip());
    }

    #[test]
    fn test_is_zip_from_filename() {
        let artifact = Artifact {
            bytes: Bytes::new(),
            filename: "report_images.zip".to_string(),
            content_type: None,
        };
        assert!(artifact.is_zip());
    }

    #[test]
    fn test_unpack_zip() {
        let bytes = make_zip(&[
            ("report/page_001.jpg", b"primo"),
            ("report/page_002.jpg", b"secondo"),
        ]);
        let artifact = Artifact {
            bytes,
            filename: "report_images.zip".to_string(),
            content_type: Some("application/zip".to_string()),
        };

        let dir = tempfile::tempdir().unwrap();
        let extracted = artifact.unpack_zip(dir.path()).unwrap();

        assert_eq!(extracted.len(), 2);
        assert_eq!(
            std::fs::read(dir.path().join("report/page_001.jpg")).unwrap(),
            b"primo"
        );
        assert_eq!(
            std::fs::read(dir.path().join("report/page_002.jpg")).unwrap(),
            b"secondo"
        );
    }

    #[test]
    fn test_unpack_zip_skips_traversal() {
        let bytes = make_zip(&[("../fuori.txt", b"no"), ("dentro.txt", b"ok")]);
        let artifact = Artifact {
            bytes,
            filename: "archivio.zip".to_string(),
            content_type: Some("application/zip".to_string()),
        };

        let dir = tempfile::tempdir().unwrap();
        let extracted = artifact.unpack_zip(dir.path()).unwrap();

        assert_eq!(extracted.len(), 1);
        assert!(dir.path().join("dentro.txt").exists());
        assert!(!dir.path().parent().unwrap().join("fuori.txt").exists());
    }

    #[test]
    fn test_save_to_avoids_overwrite() {
        let artifact = Artifact {
            bytes: Bytes::from_static(b"contenuto"),
            filename: "out.pdf".to_string(),
            content_type: Some("application/pdf".to_string()),
        };

        let dir = tempfile::tempdir().unwrap();
        let first = artifact.save_to(dir.path()).unwrap();
        let second = artifact.save_to(dir.path()).unwrap();

        assert_eq!(first, dir.path().join("out.pdf"));
        assert_eq!(second, dir.path().join("out_1.pdf"));
    }
}
