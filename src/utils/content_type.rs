//! Content-type utilities for uploads and download inference

/// Get the MIME content-type for a file extension
///
/// # Arguments
/// * `format` - The file format extension (e.g., "png", "pdf", "docx")
///
/// # Returns
/// The corresponding MIME type string
pub fn get_content_type(format: &str) -> &'static str {
    match format.to_lowercase().as_str() {
        // Immagini
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tiff" | "tif" => "image/tiff",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",

        // Documenti
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "json" => "application/json",

        // Archivi
        "zip" => "application/zip",
        "tar" => "application/x-tar",
        "gz" => "application/gzip",

        // Default
        _ => "application/octet-stream",
    }
}

/// True when the content-type denotes an archive (multi-file conversion results)
pub fn is_archive_mime(mime: &str) -> bool {
    matches!(
        mime.split(';').next().unwrap_or("").trim(),
        "application/zip" | "application/x-zip-compressed" | "application/x-tar" | "application/gzip"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_office_types() {
        assert_eq!(
            get_content_type("docx"),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
        assert_eq!(
            get_content_type("pptx"),
            "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        );
        assert_eq!(
            get_content_type("xlsx"),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(get_content_type("PNG"), "image/png");
        assert_eq!(get_content_type("Pdf"), "application/pdf");
    }

    #[test]
    fn test_unknown_type() {
        assert_eq!(get_content_type("xyz"), "application/octet-stream");
    }

    #[test]
    fn test_is_archive_mime() {
        assert!(is_archive_mime("application/zip"));
        assert!(is_archive_mime("application/zip; charset=binary"));
        assert!(is_archive_mime("application/x-zip-compressed"));
        assert!(!is_archive_mime("application/pdf"));
        assert!(!is_archive_mime("image/png"));
    }
}
