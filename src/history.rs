//! Registro locale delle conversioni eseguite.
//!
//! Ogni esecuzione viene accodata come riga JSON in un file di storico,
//! una conversione per riga. Le righe illeggibili vengono ignorate in
//! lettura per non bloccare lo storico su un file parzialmente corrotto.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: Uuid,
    pub tool: String,
    pub input_name: String,
    pub input_size: u64,
    /// Rotta usata: sync, async o batch
    pub mode: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl HistoryRecord {
    pub fn new(tool: &str, input_name: &str, input_size: u64, mode: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            tool: tool.to_string(),
            input_name: input_name.to_string(),
            input_size,
            mode: mode.to_string(),
            status: "pending".to_string(),
            output_name: None,
            error: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn complete(&mut self, output_name: &str) {
        self.status = "completed".to_string();
        self.output_name = Some(output_name.to_string());
        self.finished_at = Some(Utc::now());
    }

    pub fn fail(&mut self, error: &str) {
        self.status = "failed".to_string();
        self.error = Some(error.to_string());
        self.finished_at = Some(Utc::now());
    }
}

pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Accoda una conversione allo storico
    pub fn append(&self, record: &HistoryRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let line = serde_json::to_string(record)
            .map_err(|e| crate::error::AppError::Internal(format!("Errore storico: {}", e)))?;
        writeln!(file, "{}", line)?;

        Ok(())
    }

    /// Le ultime `limit` conversioni, dalla più recente
    pub fn list(&self, limit: usize) -> Result<Vec<HistoryRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let mut records = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<HistoryRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("Riga dello storico ignorata: {}", e);
                }
            }
        }

        let skip = records.len().saturating_sub(limit);
        let mut recent: Vec<HistoryRecord> = records.into_iter().skip(skip).collect();
        recent.reverse();
        Ok(recent)
    }
}
