use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

use super::tool::{QualityVocab, ToolSpec};

/// Livello di qualità richiesto al convertitore
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Low,
    Medium,
    High,
    /// Compressione rapida, qualità inferiore
    Fast,
    /// Compressione accurata
    Standard,
}

impl Quality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Low => "low",
            Quality::Medium => "medium",
            Quality::High => "high",
            Quality::Fast => "fast",
            Quality::Standard => "standard",
        }
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Quality {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Quality::Low),
            "medium" => Ok(Quality::Medium),
            "high" => Ok(Quality::High),
            "fast" => Ok(Quality::Fast),
            "standard" => Ok(Quality::Standard),
            other => Err(AppError::BadRequest(format!(
                "qualità non riconosciuta: {}",
                other
            ))),
        }
    }
}

/// Opzioni di conversione inviate come campi testo del multipart.
///
/// Non tutti gli strumenti accettano tutte le opzioni: `validate_for`
/// verifica la combinazione prima dell'invio.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<Quality>,
    /// Fattore di scala per l'output raster (0.2 - 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
    /// Formato di destinazione per gli strumenti generici
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
    /// Selezione pagine, es. "1-3,7"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_range: Option<String>,
    /// Sfondo trasparente (solo output PNG)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transparent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dpi: Option<u32>,
}

impl ConversionOptions {
    pub const SCALE_MIN: f32 = 0.2;
    pub const SCALE_MAX: f32 = 2.0;

    /// Controlla che le opzioni scelte siano accettate dallo strumento
    pub fn validate_for(&self, tool: &ToolSpec) -> Result<()> {
        if let Some(quality) = self.quality {
            let accepted = match tool.quality_vocab {
                QualityVocab::Levels => {
                    matches!(quality, Quality::Low | Quality::Medium | Quality::High)
                }
                QualityVocab::Speed => matches!(quality, Quality::Fast | Quality::Standard),
                QualityVocab::None => false,
            };
            if !accepted {
                return Err(AppError::BadRequest(format!(
                    "qualità '{}' non supportata da {}",
                    quality, tool.slug
                )));
            }
        }

        if let Some(scale) = self.scale {
            if !tool.supports_scale {
                return Err(AppError::BadRequest(format!(
                    "{} non supporta il parametro scale",
                    tool.slug
                )));
            }
            if !(Self::SCALE_MIN..=Self::SCALE_MAX).contains(&scale) {
                return Err(AppError::BadRequest(format!(
                    "scale fuori intervallo: {} (ammesso {} - {})",
                    scale,
                    Self::SCALE_MIN,
                    Self::SCALE_MAX
                )));
            }
        }

        if let Some(range) = &self.page_range {
            if !tool.supports_pages {
                return Err(AppError::BadRequest(format!(
                    "{} non supporta la selezione pagine",
                    tool.slug
                )));
            }
            if !is_valid_page_range(range) {
                return Err(AppError::BadRequest(format!(
                    "selezione pagine non valida: {}",
                    range
                )));
            }
        }

        if self.output_format.is_some() && !tool.supports_format {
            return Err(AppError::BadRequest(format!(
                "{} non supporta la scelta del formato di output",
                tool.slug
            )));
        }

        if self.dpi.is_some() && !tool.supports_dpi {
            return Err(AppError::BadRequest(format!(
                "{} non supporta il parametro dpi",
                tool.slug
            )));
        }

        if self.transparent.is_some() && tool.output_ext != "png" {
            return Err(AppError::BadRequest(
                "lo sfondo trasparente è disponibile solo per output PNG".to_string(),
            ));
        }

        Ok(())
    }

    /// Campi testo da allegare al form multipart
    pub fn to_form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();

        if let Some(quality) = self.quality {
            fields.push(("quality", quality.as_str().to_string()));
        }
        if let Some(scale) = self.scale {
            fields.push(("scale", scale.to_string()));
        }
        if let Some(format) = &self.output_format {
            fields.push(("format", format.clone()));
        }
        if let Some(range) = &self.page_range {
            fields.push(("pages", range.clone()));
        }
        if let Some(transparent) = self.transparent {
            fields.push(("transparent", transparent.to_string()));
        }
        if let Some(dpi) = self.dpi {
            fields.push(("dpi", dpi.to_string()));
        }

        fields
    }
}

/// Valida una selezione pagine nella forma "1", "1-3" o "1-3,7,9-12"
fn is_valid_page_range(range: &str) -> bool {
    match Regex::new(r"^\d+(-\d+)?(,\d+(-\d+)?)*$") {
        Ok(re) => re.is_match(range),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::find_tool;

    #[test]
    fn test_quality_vocab_levels() {
        let tool = find_tool("pdf-to-jpg").unwrap();
        let ok = ConversionOptions {
            quality: Some(Quality::High),
            ..Default::default()
        };
        assert!(ok.validate_for(tool).is_ok());

        let ko = ConversionOptions {
            quality: Some(Quality::Fast),
            ..Default::default()
        };
        assert!(ko.validate_for(tool).is_err());
    }

    #[test]
    fn test_quality_vocab_speed() {
        let tool = find_tool("compress-pdf").unwrap();
        let ok = ConversionOptions {
            quality: Some(Quality::Fast),
            ..Default::default()
        };
        assert!(ok.validate_for(tool).is_ok());

        let ko = ConversionOptions {
            quality: Some(Quality::Medium),
            ..Default::default()
        };
        assert!(ko.validate_for(tool).is_err());
    }

    #[test]
    fn test_scale_bounds() {
        let tool = find_tool("pdf-to-jpg").unwrap();

        let ok = ConversionOptions {
            scale: Some(1.5),
            ..Default::default()
        };
        assert!(ok.validate_for(tool).is_ok());

        let ko = ConversionOptions {
            scale: Some(2.5),
            ..Default::default()
        };
        assert!(ko.validate_for(tool).is_err());
    }

    #[test]
    fn test_page_range_syntax() {
        assert!(is_valid_page_range("1"));
        assert!(is_valid_page_range("1-3"));
        assert!(is_valid_page_range("1-3,7,9-12"));
        assert!(!is_valid_page_range(""));
        assert!(!is_valid_page_range("1-"));
        assert!(!is_valid_page_range("a-b"));
        assert!(!is_valid_page_range("1,,3"));
    }

    #[test]
    fn test_form_fields_scale_display() {
        let opts = ConversionOptions {
            scale: Some(1.5),
            ..Default::default()
        };
        let fields = opts.to_form_fields();
        assert_eq!(fields, vec![("scale", "1.5".to_string())]);

        let opts = ConversionOptions {
            scale: Some(2.0),
            ..Default::default()
        };
        assert_eq!(opts.to_form_fields(), vec![("scale", "2".to_string())]);
    }

    #[test]
    fn test_transparent_requires_png_output() {
        let jpg = find_tool("pdf-to-jpg").unwrap();
        let png = find_tool("pdf-to-png").unwrap();
        let opts = ConversionOptions {
            transparent: Some(true),
            ..Default::default()
        };

        assert!(opts.validate_for(jpg).is_err());
        assert!(opts.validate_for(png).is_ok());
    }
}
