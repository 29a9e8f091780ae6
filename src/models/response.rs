use serde::{Deserialize, Serialize};

/// Risposta di `POST /convert-async`
#[derive(Debug, Clone, Deserialize)]
pub struct JobCreatedResponse {
    #[serde(alias = "jobId", alias = "id")]
    pub job_id: String,
}

/// Snapshot di `GET /job/{id}`.
///
/// I campi oltre a `status` sono facoltativi: i servizi più vecchi
/// riportano solo lo stato.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub status: String,
    #[serde(default, deserialize_with = "de_progress")]
    pub progress: Option<u8>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, alias = "downloadUrl", alias = "url")]
    pub download_url: Option<String>,
}

/// Accetta il progresso come intero o decimale e lo riporta in 0-100
fn de_progress<'de, D>(deserializer: D) -> std::result::Result<Option<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw.map(|v| v.clamp(0.0, 100.0) as u8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_created_aliases() {
        let snake: JobCreatedResponse = serde_json::from_str(r#"{"job_id": "abc"}"#).unwrap();
        assert_eq!(snake.job_id, "abc");

        let camel: JobCreatedResponse = serde_json::from_str(r#"{"jobId": "abc"}"#).unwrap();
        assert_eq!(camel.job_id, "abc");

        let bare: JobCreatedResponse = serde_json::from_str(r#"{"id": "abc"}"#).unwrap();
        assert_eq!(bare.job_id, "abc");
    }

    #[test]
    fn test_status_only_snapshot() {
        let snap: JobStatusResponse = serde_json::from_str(r#"{"status": "processing"}"#).unwrap();
        assert_eq!(snap.status, "processing");
        assert_eq!(snap.progress, None);
        assert_eq!(snap.download_url, None);
    }

    #[test]
    fn test_progress_clamped_on_deserialize() {
        let snap: JobStatusResponse =
            serde_json::from_str(r#"{"status": "processing", "progress": 250}"#).unwrap();
        assert_eq!(snap.progress, Some(100));

        let snap: JobStatusResponse =
            serde_json::from_str(r#"{"status": "processing", "progress": 45.5}"#).unwrap();
        assert_eq!(snap.progress, Some(45));
    }

    #[test]
    fn test_download_url_aliases() {
        let snap: JobStatusResponse =
            serde_json::from_str(r#"{"status": "done", "downloadUrl": "/download/abc"}"#).unwrap();
        assert_eq!(snap.download_url.as_deref(), Some("/download/abc"));
    }
}
