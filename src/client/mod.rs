//! Client HTTP verso i servizi di conversione.
//!
//! Il flusso completo è: intake del file, invio multipart (sincrono o
//! asincrono), polling dello stato e download del risultato. Gli
//! osservatori ricevono gli aggiornamenti tramite un broadcast channel.

mod download;
mod poll;
mod submit;

pub use download::Artifact;
pub use submit::{SubmitMode, Submission};

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio_stream::wrappers::BroadcastStream;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{ConversionJob, JobStatus, JobUpdate, ToolSpec, UploadedFile};
use crate::tools;
use crate::utils::resolve_error_message;

/// Capacità del broadcast channel per gli aggiornamenti di un job
const UPDATE_CHANNEL_CAPACITY: usize = 100;

/// Client condiviso per tutti gli strumenti di conversione
#[derive(Clone)]
pub struct ConvertClient {
    http: reqwest::Client,
    config: Config,
}

impl ConvertClient {
    pub fn new(config: Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| AppError::Internal(format!("Errore client HTTP: {}", e)))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Limite di dimensione effettivo per uno strumento, con eventuale
    /// override dalla configurazione
    pub fn max_file_mb(&self, tool: &ToolSpec) -> u64 {
        self.config.max_file_size_mb.unwrap_or(tool.max_file_mb)
    }

    /// Valida e carica un file di input per lo strumento indicato
    pub async fn load(&self, path: &Path, tool: &'static ToolSpec) -> Result<UploadedFile> {
        UploadedFile::from_path(path, tool, self.max_file_mb(tool)).await
    }

    pub(crate) fn base_url(&self, tool: &ToolSpec) -> String {
        tools::resolve_base_url(tool, &self.config)
    }

    /// Converte una risposta di errore HTTP in AppError, estraendo il
    /// messaggio dal body quando possibile
    pub(crate) async fn api_error(&self, response: reqwest::Response) -> AppError {
        let status = response.status().as_u16();
        let body = response.bytes().await.unwrap_or_default();
        AppError::Api {
            status,
            message: resolve_error_message(status, &body),
        }
    }

    /// Ricostruisce un handle per un job già creato in una sessione
    /// precedente, ad esempio per riprenderne il monitoraggio
    pub fn attach(&self, tool: &'static ToolSpec, job_id: &str) -> JobHandle {
        JobHandle::new(
            job_id.to_string(),
            tool,
            self.base_url(tool),
            format!("{}.{}", job_id, tool.output_ext),
            tool.output_ext.to_string(),
        )
    }
}

/// Legge un header di risposta come stringa, se presente e valido
pub(crate) fn header_string(
    response: &reqwest::Response,
    name: reqwest::header::HeaderName,
) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Permette di annullare il polling di un job da un altro task
#[derive(Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        // Ignora errore se il polling è già terminato
        let _ = self.tx.send(true);
    }
}

/// Riferimento locale a un job asincrono in corso sul server.
///
/// Lo stato in `job` viene aggiornato a ogni tick di polling; gli
/// osservatori possono seguire gli aggiornamenti con `subscribe`.
#[derive(Debug)]
pub struct JobHandle {
    pub job: ConversionJob,
    pub(crate) tool: &'static ToolSpec,
    pub(crate) base_url: String,
    /// Nome del file originale, per derivare il nome del risultato
    pub(crate) original_name: String,
    /// Estensione attesa del risultato
    pub(crate) expected_ext: String,
    updates: broadcast::Sender<JobUpdate>,
    cancel_tx: Arc<watch::Sender<bool>>,
    pub(crate) cancel_rx: watch::Receiver<bool>,
    downloaded: AtomicBool,
}

impl JobHandle {
    pub(crate) fn new(
        job_id: String,
        tool: &'static ToolSpec,
        base_url: String,
        original_name: String,
        expected_ext: String,
    ) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        let (cancel_tx, cancel_rx) = watch::channel(false);

        Self {
            job: ConversionJob::new(job_id, tool.slug.to_string()),
            tool,
            base_url,
            original_name,
            expected_ext,
            updates,
            cancel_tx: Arc::new(cancel_tx),
            cancel_rx,
            downloaded: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &str {
        &self.job.id
    }

    pub fn tool(&self) -> &'static ToolSpec {
        self.tool
    }

    pub fn status(&self) -> JobStatus {
        self.job.status
    }

    /// Stream degli aggiornamenti di avanzamento
    pub fn subscribe(&self) -> BroadcastStream<JobUpdate> {
        BroadcastStream::new(self.updates.subscribe())
    }

    pub fn canceller(&self) -> CancelHandle {
        CancelHandle {
            tx: self.cancel_tx.clone(),
        }
    }

    /// Pubblica lo stato corrente agli osservatori
    pub(crate) fn broadcast(&self) {
        // Ignora errore se nessun receiver è in ascolto
        let _ = self.updates.send(self.job.to_update());
    }

    /// Marca il download automatico come consumato.
    /// Restituisce true solo alla prima chiamata.
    pub(crate) fn claim_download(&self) -> bool {
        !self.downloaded.swap(true, Ordering::SeqCst)
    }
}
