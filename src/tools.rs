//! Registro degli strumenti di conversione supportati.
//!
//! Ogni strumento è un servizio remoto indipendente con lo stesso
//! contratto HTTP; qui sono descritti vincoli di intake, opzioni
//! accettate e base URL predefinito.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::tool::{BatchLimits, QualityVocab, StatusVocabulary, ToolSpec};

// Estensioni di input per famiglia
const PDF_INPUT: &[&str] = &["pdf"];
const IMAGE_INPUT: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "webp", "tiff", "ico", "avif", "heic",
];

const DOCUMENT_DEFAULTS: ToolSpec = ToolSpec {
    slug: "",
    label: "",
    default_base: "",
    allowed_inputs: &[],
    max_file_mb: 100,
    batch: None,
    output_ext: "",
    multi_page_zip: false,
    quality_vocab: QualityVocab::None,
    status_vocab: StatusVocabulary::COMMON,
    supports_scale: false,
    supports_pages: false,
    supports_dpi: false,
    supports_format: false,
    force_async: false,
};

const RASTER_DEFAULTS: ToolSpec = ToolSpec {
    quality_vocab: QualityVocab::Levels,
    ..DOCUMENT_DEFAULTS
};

pub static TOOLS: &[ToolSpec] = &[
    ToolSpec {
        slug: "pdf-to-docx",
        label: "PDF in Word",
        default_base: "https://pdf-to-docx.convoglia.dev",
        allowed_inputs: PDF_INPUT,
        output_ext: "docx",
        ..DOCUMENT_DEFAULTS
    },
    ToolSpec {
        slug: "docx-to-pdf",
        label: "Word in PDF",
        default_base: "https://docx-to-pdf.convoglia.dev",
        allowed_inputs: &["docx", "doc"],
        output_ext: "pdf",
        ..DOCUMENT_DEFAULTS
    },
    ToolSpec {
        slug: "pdf-to-pptx",
        label: "PDF in PowerPoint",
        default_base: "https://pdf-to-pptx.convoglia.dev",
        allowed_inputs: PDF_INPUT,
        output_ext: "pptx",
        ..DOCUMENT_DEFAULTS
    },
    ToolSpec {
        slug: "pptx-to-pdf",
        label: "PowerPoint in PDF",
        default_base: "https://pptx-to-pdf.convoglia.dev",
        allowed_inputs: &["pptx", "ppt"],
        output_ext: "pdf",
        ..DOCUMENT_DEFAULTS
    },
    // L'estrazione tabelle è lenta anche su file piccoli: solo rotta asincrona
    ToolSpec {
        slug: "pdf-to-xlsx",
        label: "PDF in Excel",
        default_base: "https://pdf-to-xlsx.convoglia.dev",
        allowed_inputs: PDF_INPUT,
        output_ext: "xlsx",
        force_async: true,
        ..DOCUMENT_DEFAULTS
    },
    ToolSpec {
        slug: "xlsx-to-pdf",
        label: "Excel in PDF",
        default_base: "https://xlsx-to-pdf.convoglia.dev",
        allowed_inputs: &["xlsx", "xls"],
        output_ext: "pdf",
        ..DOCUMENT_DEFAULTS
    },
    ToolSpec {
        slug: "pdf-to-jpg",
        label: "PDF in JPG",
        default_base: "https://pdf-to-jpg.convoglia.dev",
        allowed_inputs: PDF_INPUT,
        output_ext: "jpg",
        multi_page_zip: true,
        supports_scale: true,
        supports_pages: true,
        supports_dpi: true,
        ..RASTER_DEFAULTS
    },
    ToolSpec {
        slug: "pdf-to-png",
        label: "PDF in PNG",
        default_base: "https://pdf-to-png.convoglia.dev",
        allowed_inputs: PDF_INPUT,
        output_ext: "png",
        multi_page_zip: true,
        supports_scale: true,
        supports_pages: true,
        supports_dpi: true,
        ..RASTER_DEFAULTS
    },
    ToolSpec {
        slug: "jpg-to-pdf",
        label: "JPG in PDF",
        default_base: "https://jpg-to-pdf.convoglia.dev",
        allowed_inputs: &["jpg", "jpeg", "png"],
        batch: Some(BatchLimits {
            max_files: 100,
            max_total_mb: 500,
        }),
        output_ext: "pdf",
        ..RASTER_DEFAULTS
    },
    ToolSpec {
        slug: "image-convert",
        label: "Convertitore immagini",
        default_base: "https://image-convert.convoglia.dev",
        allowed_inputs: IMAGE_INPUT,
        output_ext: "png",
        supports_format: true,
        ..RASTER_DEFAULTS
    },
    ToolSpec {
        slug: "heic-to-jpg",
        label: "HEIC in JPG",
        default_base: "https://heic-to-jpg.convoglia.dev",
        allowed_inputs: &["heic", "heif"],
        output_ext: "jpg",
        ..RASTER_DEFAULTS
    },
    ToolSpec {
        slug: "webp-to-png",
        label: "WebP in PNG",
        default_base: "https://webp-to-png.convoglia.dev",
        allowed_inputs: &["webp"],
        output_ext: "png",
        ..RASTER_DEFAULTS
    },
    ToolSpec {
        slug: "compress-pdf",
        label: "Comprimi PDF",
        default_base: "https://compress-pdf.convoglia.dev",
        allowed_inputs: PDF_INPUT,
        output_ext: "pdf",
        quality_vocab: QualityVocab::Speed,
        ..DOCUMENT_DEFAULTS
    },
];

pub fn find_tool(slug: &str) -> Result<&'static ToolSpec> {
    TOOLS
        .iter()
        .find(|tool| tool.slug == slug)
        .ok_or_else(|| AppError::UnknownTool(slug.to_string()))
}

/// Base URL effettivo di uno strumento: override per singolo tool,
/// poi override globale, infine il default del registro.
pub fn resolve_base_url(tool: &ToolSpec, config: &Config) -> String {
    let url = config
        .tool_urls
        .get(tool.slug)
        .map(String::as_str)
        .or(config.base_url.as_deref())
        .unwrap_or(tool.default_base);

    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_tool() {
        assert_eq!(find_tool("pdf-to-jpg").unwrap().output_ext, "jpg");
        assert!(matches!(
            find_tool("pdf-to-gif"),
            Err(AppError::UnknownTool(_))
        ));
    }

    #[test]
    fn test_registry_slugs_unique() {
        for (i, tool) in TOOLS.iter().enumerate() {
            assert!(!tool.slug.is_empty());
            assert!(!tool.allowed_inputs.is_empty());
            assert!(!tool.output_ext.is_empty());
            assert!(
                TOOLS.iter().skip(i + 1).all(|other| other.slug != tool.slug),
                "slug duplicato: {}",
                tool.slug
            );
        }
    }

    #[test]
    fn test_intake_limits() {
        for tool in TOOLS {
            assert_eq!(tool.max_file_mb, 100, "limite inatteso per {}", tool.slug);
            assert!(tool.status_vocab.success.contains(&"done"));
        }

        let batch = find_tool("jpg-to-pdf").unwrap().batch.unwrap();
        assert_eq!(batch.max_files, 100);
        assert_eq!(batch.max_total_mb, 500);
    }

    #[test]
    fn test_resolve_base_url_precedence() {
        let tool = find_tool("pdf-to-jpg").unwrap();
        let mut config = Config::default();

        assert_eq!(
            resolve_base_url(tool, &config),
            "https://pdf-to-jpg.convoglia.dev"
        );

        config.base_url = Some("http://localhost:4000/".to_string());
        assert_eq!(resolve_base_url(tool, &config), "http://localhost:4000");

        config
            .tool_urls
            .insert("pdf-to-jpg".to_string(), "http://localhost:5000".to_string());
        assert_eq!(resolve_base_url(tool, &config), "http://localhost:5000");
    }
}
