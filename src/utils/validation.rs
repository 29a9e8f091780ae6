use crate::error::{AppError, Result};
use crate::models::tool::BatchLimits;

use super::file::get_extension;

/// Verifica che l'estensione del file sia tra quelle ammesse dallo strumento.
///
/// # Arguments
/// * `filename` - Nome del file da validare
/// * `allowed` - Estensioni accettate (minuscole, senza punto)
///
/// # Returns
/// L'estensione normalizzata in minuscolo, o un errore se assente o non ammessa
pub fn validate_extension(filename: &str, allowed: &[&str]) -> Result<String> {
    let ext = get_extension(filename)
        .ok_or_else(|| AppError::UnsupportedFormat("file senza estensione".to_string()))?;

    if !allowed.contains(&ext.as_str()) {
        return Err(AppError::UnsupportedFormat(format!(
            "{} (ammessi: {})",
            ext,
            allowed.join(", ")
        )));
    }

    Ok(ext)
}

/// Verifica i limiti di un invio multiplo: numero di file e dimensione totale.
pub fn validate_batch(count: usize, total_bytes: u64, limits: &BatchLimits) -> Result<()> {
    if count > limits.max_files {
        return Err(AppError::TooManyFiles(limits.max_files));
    }

    let max_total = limits.max_total_mb * 1024 * 1024;
    if total_bytes > max_total {
        return Err(AppError::BatchTooLarge(limits.max_total_mb));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_extension() {
        let ext = validate_extension("report.PDF", &["pdf", "docx"]).unwrap();
        assert_eq!(ext, "pdf");
    }

    #[test]
    fn test_missing_extension() {
        let err = validate_extension("senza_estensione", &["pdf"]).unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_extension_not_allowed() {
        let err = validate_extension("foto.gif", &["jpg", "png"]).unwrap_err();
        match err {
            AppError::UnsupportedFormat(msg) => {
                assert!(msg.contains("gif"));
                assert!(msg.contains("jpg, png"));
            }
            other => panic!("errore inatteso: {:?}", other),
        }
    }

    #[test]
    fn test_batch_limits() {
        let limits = BatchLimits {
            max_files: 3,
            max_total_mb: 1,
        };

        assert!(validate_batch(3, 1024, &limits).is_ok());
        assert!(matches!(
            validate_batch(4, 1024, &limits),
            Err(AppError::TooManyFiles(3))
        ));
        assert!(matches!(
            validate_batch(2, 2 * 1024 * 1024, &limits),
            Err(AppError::BatchTooLarge(1))
        ));
    }
}
