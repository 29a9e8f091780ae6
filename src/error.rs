use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("File non trovato: {0}")]
    NotFound(String),

    #[error("Formato non supportato: {0}")]
    UnsupportedFormat(String),

    #[error("File troppo grande: massimo {0} MB")]
    FileTooLarge(u64),

    #[error("Troppi file nel batch: massimo {0}")]
    TooManyFiles(usize),

    #[error("Batch troppo grande: massimo {0} MB totali")]
    BatchTooLarge(u64),

    #[error("Tool sconosciuto: {0}")]
    UnknownTool(String),

    #[error("Errore di I/O: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Errore di rete: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Errore API ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Job non trovato: {0}")]
    JobNotFound(String),

    #[error("Job fallito: {0}")]
    JobFailed(String),

    #[error("Timeout di polling dopo {0} secondi")]
    PollTimeout(u64),

    #[error("Job annullato")]
    Cancelled,

    #[error("Risultato non disponibile: {0}")]
    ResultUnavailable(String),

    #[error("Archivio non valido: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Richiesta non valida: {0}")]
    BadRequest(String),

    #[error("Errore interno: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
