use super::content_type::is_archive_mime;
use super::file::base_name;

/// Determina il nome del file di output a partire dalle intestazioni della
/// risposta di download.
///
/// # Arguments
/// * `content_disposition` - Valore dell'header Content-Disposition, se presente
/// * `content_type` - Valore dell'header Content-Type, se presente
/// * `original_name` - Nome del file inviato in conversione
/// * `expected_ext` - Estensione attesa per il formato di destinazione
///
/// # Returns
/// Il nome indicato dal server quando disponibile, altrimenti un nome
/// derivato dall'originale con l'estensione attesa
pub fn resolve_filename(
    content_disposition: Option<&str>,
    content_type: Option<&str>,
    original_name: &str,
    expected_ext: &str,
) -> String {
    if let Some(header) = content_disposition {
        if let Some(name) = parse_content_disposition(header) {
            return name;
        }
    }

    let ext = if content_type.map(is_archive_mime).unwrap_or(false) {
        "zip"
    } else {
        expected_ext
    };

    format!("{}.{}", base_name(original_name), ext)
}

/// Estrae il nome file da un header Content-Disposition.
/// La forma estesa `filename*=UTF-8''...` (RFC 5987) ha precedenza su
/// `filename="..."`.
pub fn parse_content_disposition(header: &str) -> Option<String> {
    let mut plain: Option<String> = None;

    for part in header.split(';') {
        let part = part.trim();
        if let Some(value) = part.strip_prefix("filename*=") {
            let value = value.trim_matches('"');
            let encoded = value
                .strip_prefix("UTF-8''")
                .or_else(|| value.strip_prefix("utf-8''"))
                .unwrap_or(value);
            if let Ok(decoded) = urlencoding::decode(encoded) {
                let name = sanitize(&decoded);
                if !name.is_empty() {
                    return Some(name);
                }
            }
        } else if let Some(value) = part.strip_prefix("filename=") {
            let name = sanitize(value.trim_matches('"'));
            if !name.is_empty() {
                plain = Some(name);
            }
        }
    }

    plain
}

/// Rimuove eventuali componenti di percorso dal nome ricevuto dal server
fn sanitize(name: &str) -> String {
    name.rsplit(['/', '\\'])
        .next()
        .unwrap_or(name)
        .trim()
        .to_string()
}
