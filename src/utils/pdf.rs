use regex_lite::Regex;

/// Dimensione media stimata di una pagina PDF, usata come ripiego
/// quando il conteggio degli oggetti pagina non è possibile
const FALLBACK_PAGE_BYTES: usize = 48 * 1024;

/// Stima il numero di pagine di un documento PDF contando gli oggetti
/// `/Type /Page` nel flusso non compresso. Per documenti con object
/// stream compressi il conteggio può fallire: in quel caso si ripiega
/// su una stima basata sulla dimensione.
pub fn estimate_page_count(data: &[u8]) -> u32 {
    let text = String::from_utf8_lossy(data);

    let pages = match Regex::new(r"/Type\s*/Page") {
        Ok(re) => re.find_iter(&text).count(),
        Err(_) => 0,
    };
    let trees = match Regex::new(r"/Type\s*/Pages") {
        Ok(re) => re.find_iter(&text).count(),
        Err(_) => 0,
    };

    // /Type /Pages viene catturato anche dal primo pattern
    let count = pages.saturating_sub(trees);
    if count > 0 {
        return count as u32;
    }

    (data.len() / FALLBACK_PAGE_BYTES) as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_page_objects() {
        let pdf = b"%PDF-1.4\n1 0 obj << /Type /Pages /Kids [2 0 R 3 0 R] >> endobj\n2 0 obj << /Type /Page >> endobj\n3 0 obj << /Type /Page >> endobj\n";
        assert_eq!(estimate_page_count(pdf), 2);
    }

    #[test]
    fn test_whitespace_between_tokens() {
        let pdf = b"<< /Type  /Page >> << /Type\n/Page >>";
        assert_eq!(estimate_page_count(pdf), 2);
    }

    #[test]
    fn test_fallback_on_size() {
        // Nessun marcatore: stima dalla dimensione
        let small = vec![0u8; 1024];
        assert_eq!(estimate_page_count(&small), 1);

        let large = vec![0u8; 48 * 1024 * 5 + 1];
        assert_eq!(estimate_page_count(&large), 6);
    }
}
