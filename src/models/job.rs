use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::response::JobStatusResponse;
use super::tool::StatusVocabulary;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
            JobStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl JobStatus {
    /// Normalizza lo stato riportato dal server secondo il vocabolario
    /// dello strumento. Restituisce None per i token sconosciuti, che
    /// vengono trattati come lavorazione in corso.
    pub fn from_remote(raw: &str, vocab: &StatusVocabulary) -> Option<Self> {
        let token = raw.trim().to_lowercase();
        if vocab.success.contains(&token.as_str()) {
            Some(JobStatus::Completed)
        } else if vocab.failure.contains(&token.as_str()) {
            Some(JobStatus::Failed)
        } else if vocab.pending.contains(&token.as_str()) {
            Some(JobStatus::Pending)
        } else if vocab.processing.contains(&token.as_str()) {
            Some(JobStatus::Processing)
        } else {
            None
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}

/// Aggiornamento di avanzamento inviato agli osservatori del job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobUpdate {
    pub job_id: String,
    pub status: JobStatus,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl JobUpdate {
    pub fn new(job_id: String, status: JobStatus, progress: u8, message: Option<String>) -> Self {
        Self {
            job_id,
            status,
            progress,
            message,
            timestamp: Utc::now(),
        }
    }
}

/// Stato locale di un job di conversione remoto
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionJob {
    /// Identificatore assegnato dal server alla creazione
    pub id: String,
    pub tool_slug: String,
    pub status: JobStatus,
    pub progress: u8,
    pub message: Option<String>,
    pub error: Option<String>,
    /// URL di download comunicato dal server, se presente
    pub download_url: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl ConversionJob {
    pub fn new(id: String, tool_slug: String) -> Self {
        Self {
            id,
            tool_slug,
            status: JobStatus::Pending,
            progress: 0,
            message: None,
            error: None,
            download_url: None,
            submitted_at: Utc::now(),
        }
    }

    /// Applica uno snapshot di polling allo stato locale.
    ///
    /// Il progresso viene limitato a 100, il messaggio aggiornato a ogni
    /// tick indipendentemente dallo stato e l'errore conservato esattamente
    /// come riportato dal server.
    pub fn apply(&mut self, snapshot: &JobStatusResponse, vocab: &StatusVocabulary) {
        if let Some(status) = JobStatus::from_remote(&snapshot.status, vocab) {
            self.status = status;
        } else {
            tracing::warn!(
                "Stato sconosciuto '{}' per job {}, il polling continua",
                snapshot.status,
                self.id
            );
            self.status = JobStatus::Processing;
        }

        if let Some(progress) = snapshot.progress {
            self.progress = progress.min(100);
        }
        if self.status == JobStatus::Completed {
            self.progress = 100;
        }

        if let Some(message) = &snapshot.message {
            self.message = Some(message.clone());
        }
        if let Some(error) = &snapshot.error {
            self.error = Some(error.clone());
        }
        if let Some(url) = &snapshot.download_url {
            self.download_url = Some(url.clone());
        }
    }

    /// Crea un JobUpdate dallo stato corrente
    pub fn to_update(&self) -> JobUpdate {
        JobUpdate::new(
            self.id.clone(),
            self.status,
            self.progress,
            self.message.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(status: &str) -> JobStatusResponse {
        JobStatusResponse {
            status: status.to_string(),
            progress: None,
            message: None,
            error: None,
            download_url: None,
        }
    }

    #[test]
    fn test_from_remote_vocabulary() {
        let vocab = StatusVocabulary::default();
        assert_eq!(
            JobStatus::from_remote("done", &vocab),
            Some(JobStatus::Completed)
        );
        assert_eq!(
            JobStatus::from_remote("SUCCESS", &vocab),
            Some(JobStatus::Completed)
        );
        assert_eq!(
            JobStatus::from_remote("failed", &vocab),
            Some(JobStatus::Failed)
        );
        assert_eq!(
            JobStatus::from_remote("queued", &vocab),
            Some(JobStatus::Pending)
        );
        assert_eq!(
            JobStatus::from_remote("in_progress", &vocab),
            Some(JobStatus::Processing)
        );
        assert_eq!(JobStatus::from_remote("sconosciuto", &vocab), None);
    }

    #[test]
    fn test_apply_clamps_progress() {
        let vocab = StatusVocabulary::default();
        let mut job = ConversionJob::new("abc".to_string(), "pdf-to-jpg".to_string());

        let mut snap = snapshot("processing");
        snap.progress = Some(250);
        job.apply(&snap, &vocab);
        assert_eq!(job.progress, 100);
        assert_eq!(job.status, JobStatus::Processing);
    }

    #[test]
    fn test_apply_stores_error_verbatim() {
        let vocab = StatusVocabulary::default();
        let mut job = ConversionJob::new("abc".to_string(), "pdf-to-jpg".to_string());

        let mut snap = snapshot("error");
        snap.error = Some("Pagina 3 corrotta".to_string());
        job.apply(&snap, &vocab);
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("Pagina 3 corrotta"));
    }

    #[test]
    fn test_unknown_status_treated_as_processing() {
        let vocab = StatusVocabulary::default();
        let mut job = ConversionJob::new("abc".to_string(), "pdf-to-jpg".to_string());

        job.apply(&snapshot("warming_up"), &vocab);
        assert_eq!(job.status, JobStatus::Processing);
        assert!(!job.status.is_terminal());
    }

    #[test]
    fn test_completed_forces_full_progress() {
        let vocab = StatusVocabulary::default();
        let mut job = ConversionJob::new("abc".to_string(), "pdf-to-jpg".to_string());

        let mut snap = snapshot("done");
        snap.progress = Some(80);
        job.apply(&snap, &vocab);
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.progress, 100);
    }

    #[test]
    fn test_message_updates_every_tick() {
        let vocab = StatusVocabulary::default();
        let mut job = ConversionJob::new("abc".to_string(), "pdf-to-jpg".to_string());

        let mut snap = snapshot("processing");
        snap.message = Some("Pagina 1 di 4".to_string());
        job.apply(&snap, &vocab);
        assert_eq!(job.message.as_deref(), Some("Pagina 1 di 4"));

        let mut snap = snapshot("done");
        snap.message = Some("Conversione completata".to_string());
        job.apply(&snap, &vocab);
        assert_eq!(job.message.as_deref(), Some("Conversione completata"));
    }
}
