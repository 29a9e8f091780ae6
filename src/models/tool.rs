/// Vocabolario di qualità accettato da uno strumento
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityVocab {
    /// low, medium, high
    Levels,
    /// fast, standard (compressione)
    Speed,
    /// Lo strumento non accetta il parametro quality
    None,
}

/// Limiti per l'invio multiplo di file in una singola richiesta
#[derive(Debug, Clone, Copy)]
pub struct BatchLimits {
    pub max_files: usize,
    pub max_total_mb: u64,
}

/// Descrizione statica di uno strumento di conversione remoto.
///
/// Ogni strumento espone le stesse rotte (`/convert`, `/convert-async`,
/// `/job/{id}`, `/download/{id}`) su un proprio servizio; qui sono
/// registrati i vincoli di intake e le opzioni supportate.
#[derive(Debug)]
pub struct ToolSpec {
    /// Identificatore usato nella CLI e nella risoluzione dell'URL
    pub slug: &'static str,
    /// Nome leggibile per l'output a terminale
    pub label: &'static str,
    /// Base URL predefinito del servizio
    pub default_base: &'static str,
    /// Estensioni di input accettate (minuscole, senza punto)
    pub allowed_inputs: &'static [&'static str],
    /// Dimensione massima del singolo file in MB
    pub max_file_mb: u64,
    /// Limiti batch, se lo strumento accetta più file per richiesta
    pub batch: Option<BatchLimits>,
    /// Estensione del risultato prodotto
    pub output_ext: &'static str,
    /// Documenti multi-pagina producono un archivio ZIP
    pub multi_page_zip: bool,
    /// Vocabolario del parametro quality
    pub quality_vocab: QualityVocab,
    /// Vocabolario degli stati riportati dal backend dello strumento
    pub status_vocab: StatusVocabulary,
    pub supports_scale: bool,
    pub supports_pages: bool,
    pub supports_dpi: bool,
    /// Lo strumento accetta la scelta del formato di output
    pub supports_format: bool,
    /// Lo strumento non espone la rotta sincrona
    pub force_async: bool,
}

impl ToolSpec {
    /// Soglia di dimensione oltre la quale si usa sempre la rotta asincrona
    pub const SYNC_MAX_MB: u64 = 10;
    /// Soglia di pagine stimate oltre la quale si usa la rotta asincrona
    pub const SYNC_MAX_PAGES: u32 = 20;
}

/// Varianti di stato riportate dai diversi servizi di conversione.
/// I backend non sono uniformi: alcuni rispondono "done", altri
/// "completed" o "success"; qui sono raccolte le forme note.
#[derive(Debug, Clone, Copy)]
pub struct StatusVocabulary {
    pub success: &'static [&'static str],
    pub failure: &'static [&'static str],
    pub pending: &'static [&'static str],
    pub processing: &'static [&'static str],
}

impl StatusVocabulary {
    /// Unione delle forme osservate sui vari backend
    pub const COMMON: Self = Self {
        success: &["done", "completed", "success", "finished"],
        failure: &["error", "failed"],
        pending: &["pending", "queued"],
        processing: &["processing", "running", "in_progress"],
    };
}

impl Default for StatusVocabulary {
    fn default() -> Self {
        Self::COMMON
    }
}
