use serde::Deserialize;

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Estrae un messaggio leggibile da una risposta di errore del server.
///
/// Ordine di risoluzione: campo `error` (o `message`) del body JSON,
/// poi il body testuale grezzo se non era JSON, infine un messaggio
/// generico con lo status HTTP.
pub fn resolve_error_message(status: u16, body: &[u8]) -> String {
    let generic = format!("Richiesta fallita ({})", status);

    if let Ok(parsed) = serde_json::from_slice::<ErrorBody>(body) {
        // Body JSON: il testo grezzo non è un messaggio presentabile
        return match parsed.error.or(parsed.message) {
            Some(msg) if !msg.trim().is_empty() => msg.trim().to_string(),
            _ => generic,
        };
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if !text.is_empty() && text.len() <= 512 {
        return text.to_string();
    }

    generic
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_field() {
        let body = br#"{"error": "Formato non supportato"}"#;
        assert_eq!(resolve_error_message(400, body), "Formato non supportato");
    }

    #[test]
    fn test_json_message_field() {
        let body = br#"{"message": "File troppo grande"}"#;
        assert_eq!(resolve_error_message(413, body), "File troppo grande");
    }

    #[test]
    fn test_raw_text_body() {
        let body = b"errore interno del convertitore";
        assert_eq!(
            resolve_error_message(500, body),
            "errore interno del convertitore"
        );
    }

    #[test]
    fn test_generic_fallback() {
        assert_eq!(resolve_error_message(502, b""), "Richiesta fallita (502)");
        assert_eq!(
            resolve_error_message(500, br#"{"error": ""}"#),
            "Richiesta fallita (500)"
        );
    }
}
