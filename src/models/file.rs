use std::io::Cursor;
use std::path::Path;

use bytes::Bytes;

use crate::error::{AppError, Result};
use crate::utils::{
    base_name, get_content_type, get_mime_type, validate_extension, validate_file_size,
};

use super::tool::ToolSpec;

/// File di input validato e pronto per l'invio.
///
/// La validazione avviene prima della lettura dei contenuti: estensione
/// fuori dalla lista ammessa o dimensione oltre il limite dello strumento
/// fermano l'intake senza caricare il file in memoria.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub data: Bytes,
    pub extension: String,
    /// Dimensioni in pixel, solo per input immagine riconosciuti
    pub dimensions: Option<(u32, u32)>,
}

impl UploadedFile {
    /// Carica un file dal disco applicando il limite `max_mb` sui metadati,
    /// prima di leggerne i contenuti.
    pub async fn from_path(path: &Path, tool: &ToolSpec, max_mb: u64) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AppError::BadRequest(format!("percorso non valido: {}", path.display())))?
            .to_string();

        let extension = validate_extension(&name, tool.allowed_inputs)?;

        let meta = tokio::fs::metadata(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::NotFound(path.display().to_string())
            } else {
                AppError::IoError(e)
            }
        })?;
        validate_file_size(meta.len(), max_mb)?;

        let data = Bytes::from(tokio::fs::read(path).await?);
        let dimensions = probe_dimensions(&extension, &data);

        Ok(Self {
            name,
            data,
            extension,
            dimensions,
        })
    }

    pub fn from_bytes(
        name: impl Into<String>,
        data: Bytes,
        tool: &ToolSpec,
        max_mb: u64,
    ) -> Result<Self> {
        let name = name.into();
        let extension = validate_extension(&name, tool.allowed_inputs)?;
        validate_file_size(data.len() as u64, max_mb)?;

        let dimensions = probe_dimensions(&extension, &data);

        Ok(Self {
            name,
            data,
            extension,
            dimensions,
        })
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn base_name(&self) -> &str {
        base_name(&self.name)
    }

    /// MIME type per la parte multipart, dedotto dal nome del file
    pub fn content_type(&self) -> String {
        get_mime_type(&self.name)
    }
}

/// Legge larghezza e altezza dall'header dell'immagine.
/// Qualsiasi fallimento di lettura o formato restituisce None.
fn probe_dimensions(extension: &str, data: &[u8]) -> Option<(u32, u32)> {
    if !get_content_type(extension).starts_with("image/") {
        return None;
    }

    image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::find_tool;

    // PNG 1x1 trasparente, completo di IHDR/IDAT/IEND
    const PNG_1X1: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x62, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    #[test]
    fn test_from_bytes_rejects_extension() {
        let tool = find_tool("pdf-to-docx").unwrap();
        let err = UploadedFile::from_bytes("foto.png", Bytes::from_static(PNG_1X1), tool, 50)
            .unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_from_bytes_rejects_oversize() {
        let tool = find_tool("pdf-to-docx").unwrap();
        let data = Bytes::from(vec![0u8; 1024 * 1024 + 1]);
        let err = UploadedFile::from_bytes("grande.pdf", data, tool, 1).unwrap_err();
        assert!(matches!(err, AppError::FileTooLarge(1)));
    }

    #[test]
    fn test_probe_dimensions_png() {
        let tool = find_tool("image-convert").unwrap();
        let file =
            UploadedFile::from_bytes("pixel.png", Bytes::from_static(PNG_1X1), tool, 25).unwrap();
        assert_eq!(file.dimensions, Some((1, 1)));
        assert_eq!(file.content_type(), "image/png");
    }

    #[test]
    fn test_probe_skipped_for_documents() {
        let tool = find_tool("pdf-to-docx").unwrap();
        let file = UploadedFile::from_bytes("doc.pdf", Bytes::from_static(b"%PDF-1.4"), tool, 50)
            .unwrap();
        assert_eq!(file.dimensions, None);
        assert_eq!(file.base_name(), "doc");
    }

    #[tokio::test]
    async fn test_from_path_missing_file() {
        let tool = find_tool("pdf-to-docx").unwrap();
        let err = UploadedFile::from_path(Path::new("/inesistente/doc.pdf"), tool, 50)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, b"%PDF-1.4 contenuto").unwrap();

        let tool = find_tool("pdf-to-docx").unwrap();
        let file = UploadedFile::from_path(&path, tool, 50).await.unwrap();
        assert_eq!(file.name, "doc.pdf");
        assert_eq!(file.extension, "pdf");
        assert_eq!(file.size(), 18);
    }
}
