//! Client per i servizi di conversione file.
//!
//! La libreria copre l'intero flusso di un job di conversione: intake e
//! validazione del file, invio multipart sulla rotta sincrona o
//! asincrona, polling dello stato a intervallo fisso e download del
//! risultato con risoluzione del nome dal Content-Disposition.
//!
//! ```rust,no_run
//! use convoglia::{Config, ConvertClient, ConversionOptions, SubmitMode, Submission};
//!
//! #[tokio::main]
//! async fn main() -> convoglia::Result<()> {
//!     let client = ConvertClient::new(Config::from_env())?;
//!     let tool = convoglia::tools::find_tool("pdf-to-jpg")?;
//!
//!     let file = client.load("report.pdf".as_ref(), tool).await?;
//!     let options = ConversionOptions::default();
//!
//!     match client.submit(tool, &file, &options, SubmitMode::Auto).await? {
//!         Submission::Immediate(artifact) => {
//!             artifact.save_to(".".as_ref())?;
//!         }
//!         Submission::Queued(mut handle) => {
//!             let artifact = client.wait(&mut handle).await?;
//!             artifact.save_to(".".as_ref())?;
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod history;
pub mod models;
pub mod tools;
pub mod utils;

pub use client::{Artifact, CancelHandle, ConvertClient, JobHandle, SubmitMode, Submission};
pub use config::Config;
pub use error::{AppError, Result};
pub use history::{HistoryRecord, HistoryStore};
pub use models::{ConversionJob, ConversionOptions, JobStatus, JobUpdate, Quality, UploadedFile};
