//! Invio dei file ai servizi di conversione.

use reqwest::multipart::{Form, Part};

use crate::error::{AppError, Result};
use crate::models::{ConversionOptions, JobCreatedResponse, ToolSpec, UploadedFile};
use crate::utils::{estimate_page_count, resolve_filename, validate_batch};

use super::{header_string, Artifact, ConvertClient, JobHandle};

/// Scelta della rotta di invio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitMode {
    /// Sincrono per file piccoli, asincrono oltre soglia
    #[default]
    Auto,
    Sync,
    Async,
}

/// Esito di un invio: risultato immediato dalla rotta sincrona oppure
/// handle da monitorare per la rotta asincrona
#[derive(Debug)]
pub enum Submission {
    Immediate(Artifact),
    Queued(JobHandle),
}

impl ConvertClient {
    /// Invia un file in conversione.
    ///
    /// In modalità `Auto` la rotta sincrona viene usata per file fino a
    /// 10 MB e, per i PDF, fino a 20 pagine stimate; oltre queste soglie
    /// il job passa dalla coda asincrona.
    pub async fn submit(
        &self,
        tool: &'static ToolSpec,
        file: &UploadedFile,
        options: &ConversionOptions,
        mode: SubmitMode,
    ) -> Result<Submission> {
        options.validate_for(tool)?;

        let go_async = match mode {
            SubmitMode::Async => true,
            SubmitMode::Sync => {
                if tool.force_async {
                    return Err(AppError::BadRequest(format!(
                        "{} supporta solo la conversione asincrona",
                        tool.slug
                    )));
                }
                false
            }
            SubmitMode::Auto => self.should_queue(tool, file),
        };

        let form = build_form(file, options)?;
        let expected_ext = expected_extension(tool, options);

        if go_async {
            let handle = self
                .submit_async(tool, form, file.name.clone(), expected_ext)
                .await?;
            Ok(Submission::Queued(handle))
        } else {
            let artifact = self
                .submit_sync(tool, form, &file.name, &expected_ext)
                .await?;
            Ok(Submission::Immediate(artifact))
        }
    }

    /// Invia più file in una singola richiesta, per gli strumenti che
    /// accettano l'invio multiplo
    pub async fn submit_batch(
        &self,
        tool: &'static ToolSpec,
        files: &[UploadedFile],
        options: &ConversionOptions,
    ) -> Result<Submission> {
        options.validate_for(tool)?;

        let limits = tool.batch.ok_or_else(|| {
            AppError::BadRequest(format!("{} non supporta l'invio multiplo", tool.slug))
        })?;

        let total: u64 = files.iter().map(|f| f.size()).sum();
        validate_batch(files.len(), total, &limits)?;

        let mut form = Form::new();
        for file in files {
            form = form.part("files", file_part(file)?);
        }
        for (name, value) in options.to_form_fields() {
            form = form.text(name, value);
        }

        // L'invio multiplo passa sempre dalla coda asincrona
        let first_name = files
            .first()
            .map(|f| f.name.clone())
            .ok_or_else(|| AppError::BadRequest("nessun file da inviare".to_string()))?;
        let expected_ext = expected_extension(tool, options);

        let handle = self.submit_async(tool, form, first_name, expected_ext).await?;
        Ok(Submission::Queued(handle))
    }

    /// Decide la rotta in modalità automatica
    fn should_queue(&self, tool: &ToolSpec, file: &UploadedFile) -> bool {
        if tool.force_async {
            return true;
        }

        if file.size() > ToolSpec::SYNC_MAX_MB * 1024 * 1024 {
            return true;
        }

        if file.extension == "pdf" {
            let pages = estimate_page_count(&file.data);
            if pages > ToolSpec::SYNC_MAX_PAGES {
                tracing::debug!(
                    "PDF con circa {} pagine, si usa la rotta asincrona",
                    pages
                );
                return true;
            }
        }

        false
    }

    /// POST /convert: la risposta contiene direttamente il risultato
    async fn submit_sync(
        &self,
        tool: &'static ToolSpec,
        form: Form,
        original_name: &str,
        expected_ext: &str,
    ) -> Result<Artifact> {
        let url = format!("{}/convert", self.base_url(tool));
        tracing::info!("Conversione sincrona di {} con {}", original_name, tool.slug);

        let response = self.http.post(&url).multipart(form).send().await?;
        if !response.status().is_success() {
            return Err(self.api_error(response).await);
        }

        let content_disposition = header_string(&response, reqwest::header::CONTENT_DISPOSITION);
        let content_type = header_string(&response, reqwest::header::CONTENT_TYPE);
        let bytes = response.bytes().await?;

        let filename = resolve_filename(
            content_disposition.as_deref(),
            content_type.as_deref(),
            original_name,
            expected_ext,
        );

        tracing::info!("Risultato ricevuto: {} ({} byte)", filename, bytes.len());

        Ok(Artifact {
            bytes,
            filename,
            content_type,
        })
    }

    /// POST /convert-async: la risposta contiene l'id del job in coda
    async fn submit_async(
        &self,
        tool: &'static ToolSpec,
        form: Form,
        original_name: String,
        expected_ext: String,
    ) -> Result<JobHandle> {
        let base_url = self.base_url(tool);
        let url = format!("{}/convert-async", base_url);
        tracing::info!(
            "Conversione asincrona di {} con {}",
            original_name,
            tool.slug
        );

        let response = self.http.post(&url).multipart(form).send().await?;
        if !response.status().is_success() {
            return Err(self.api_error(response).await);
        }

        let created: JobCreatedResponse = response.json().await?;
        tracing::info!("Job {} creato su {}", created.job_id, tool.slug);

        Ok(JobHandle::new(
            created.job_id,
            tool,
            base_url,
            original_name,
            expected_ext,
        ))
    }
}

/// Estensione attesa del risultato: il formato scelto nelle opzioni
/// vince sul default dello strumento
fn expected_extension(tool: &ToolSpec, options: &ConversionOptions) -> String {
    options
        .output_format
        .clone()
        .unwrap_or_else(|| tool.output_ext.to_string())
}

fn file_part(file: &UploadedFile) -> Result<Part> {
    let part = Part::bytes(file.data.to_vec())
        .file_name(file.name.clone())
        .mime_str(&file.content_type())?;
    Ok(part)
}

fn build_form(file: &UploadedFile, options: &ConversionOptions) -> Result<Form> {
    let mut form = Form::new().part("file", file_part(file)?);
    for (name, value) in options.to_form_fields() {
        form = form.text(name, value);
    }
    Ok(form)
}
