//! Polling dello stato dei job asincroni.
//!
//! Il polling procede a intervallo fisso con un unico tempo massimo
//! complessivo: allo scadere il job viene considerato in timeout anche
//! se il server continua a rispondere. Gli errori transitori di rete e
//! le risposte 5xx non interrompono il ciclo.

use reqwest::StatusCode;
use tokio::time::MissedTickBehavior;

use crate::error::{AppError, Result};
use crate::models::{ConversionJob, JobStatus, JobStatusResponse, ToolSpec};

use super::{Artifact, ConvertClient, JobHandle};

impl ConvertClient {
    /// Interroga una sola volta `GET /job/{id}` e restituisce lo snapshot
    pub async fn poll_once(&self, base_url: &str, job_id: &str) -> Result<JobStatusResponse> {
        let url = format!("{}/job/{}", base_url, job_id);

        let response = self
            .http
            .get(&url)
            .timeout(self.config.request_timeout())
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::JobNotFound(job_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(self.api_error(response).await);
        }

        Ok(response.json().await?)
    }

    /// Stato corrente di un job, senza attesa
    pub async fn status(&self, tool: &'static ToolSpec, job_id: &str) -> Result<ConversionJob> {
        let base_url = self.base_url(tool);
        let snapshot = self.poll_once(&base_url, job_id).await?;

        let mut job = ConversionJob::new(job_id.to_string(), tool.slug.to_string());
        job.apply(&snapshot, &tool.status_vocab);
        Ok(job)
    }

    /// Attende il completamento del job interrogando il server a
    /// intervallo fisso, poi scarica il risultato.
    ///
    /// Ritorna errore su fallimento del job, annullamento o allo scadere
    /// del tempo massimo di polling. Gli aggiornamenti intermedi vengono
    /// pubblicati agli osservatori dell'handle.
    pub async fn wait(&self, handle: &mut JobHandle) -> Result<Artifact> {
        let deadline = tokio::time::Instant::now() + self.config.poll_timeout();
        let mut ticker = tokio::time::interval(self.config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cancel_rx = handle.cancel_rx.clone();

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = cancel_rx.changed() => {
                    return Err(cancel_job(handle));
                }
            }

            if tokio::time::Instant::now() >= deadline {
                tracing::warn!(
                    "Timeout di polling per job {} dopo {} secondi",
                    handle.job.id,
                    self.config.poll_timeout_secs
                );
                return Err(AppError::PollTimeout(self.config.poll_timeout_secs));
            }

            // L'annullamento scarta anche la richiesta in volo: una
            // risposta arrivata dopo non deve più toccare il job
            let polled = tokio::select! {
                result = self.poll_once(&handle.base_url, &handle.job.id) => Some(result),
                _ = cancel_rx.changed() => None,
            };
            let Some(polled) = polled else {
                return Err(cancel_job(handle));
            };

            match polled {
                Ok(snapshot) => {
                    handle.job.apply(&snapshot, &handle.tool.status_vocab);
                    handle.broadcast();

                    match handle.job.status {
                        JobStatus::Completed => {
                            let downloaded = tokio::select! {
                                result = self.download_once(handle) => Some(result),
                                _ = cancel_rx.changed() => None,
                            };
                            let Some(downloaded) = downloaded else {
                                return Err(cancel_job(handle));
                            };
                            return match downloaded? {
                                Some(artifact) => Ok(artifact),
                                None => Err(AppError::ResultUnavailable(
                                    "risultato già scaricato".to_string(),
                                )),
                            };
                        }
                        JobStatus::Failed => {
                            let message = handle
                                .job
                                .error
                                .clone()
                                .unwrap_or_else(|| "errore sconosciuto".to_string());
                            return Err(AppError::JobFailed(message));
                        }
                        _ => {}
                    }
                }
                Err(AppError::Network(e)) => {
                    tracing::warn!(
                        "Errore di rete durante il polling di {}: {}",
                        handle.job.id,
                        e
                    );
                }
                Err(AppError::Api { status, .. }) if status >= 500 => {
                    tracing::warn!(
                        "Il server ha risposto {} per job {}, si riprova",
                        status,
                        handle.job.id
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Chiude il ciclo di attesa su annullamento e avvisa gli osservatori
fn cancel_job(handle: &mut JobHandle) -> AppError {
    tracing::info!("Polling annullato per job {}", handle.job.id);
    handle.job.status = JobStatus::Cancelled;
    handle.broadcast();
    AppError::Cancelled
}
