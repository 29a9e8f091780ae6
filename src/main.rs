//! CLI per l'invio, il monitoraggio e il download di job di conversione.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use convoglia::models::ToolSpec;
use convoglia::tools::{self, find_tool};
use convoglia::{
    Artifact, Config, ConversionOptions, ConvertClient, HistoryRecord, HistoryStore, JobHandle,
    Quality, SubmitMode, Submission, UploadedFile,
};

/// Invii concorrenti quando il batch viene spezzato in job singoli
const BATCH_CONCURRENCY: usize = 4;

#[derive(Parser)]
#[command(
    name = "convoglia",
    version,
    about = "Invia file ai servizi di conversione e scarica i risultati",
    arg_required_else_help = true
)]
struct Cli {
    /// Log dettagliati (livello debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Mostra solo gli errori
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Converti un file
    Convert {
        /// File di input
        file: PathBuf,

        /// Strumento da usare (vedi `convoglia tools`)
        #[arg(short, long)]
        tool: String,

        /// Qualità dell'output
        #[arg(long, value_enum)]
        quality: Option<QualityArg>,

        /// Fattore di scala (0.2 - 2.0)
        #[arg(long)]
        scale: Option<f32>,

        /// Formato di output, per gli strumenti che lo supportano
        #[arg(long)]
        format: Option<String>,

        /// Pagine da convertire, es. "1-3,7"
        #[arg(long)]
        pages: Option<String>,

        /// Sfondo trasparente (solo output PNG)
        #[arg(long)]
        transparent: bool,

        /// Risoluzione di rendering
        #[arg(long)]
        dpi: Option<u32>,

        /// Rotta di invio
        #[arg(long, value_enum, default_value = "auto")]
        mode: ModeArg,

        /// Directory di destinazione del risultato
        #[arg(short, long, env = "CONVOGLIA_OUTPUT_DIR")]
        output_dir: Option<PathBuf>,

        /// Estrai il contenuto se il risultato è un archivio ZIP
        #[arg(long)]
        extract: bool,

        /// Disabilita la barra di avanzamento
        #[arg(long)]
        no_progress: bool,
    },

    /// Converti più file con lo stesso strumento
    Batch {
        /// File di input
        files: Vec<PathBuf>,

        #[arg(short, long)]
        tool: String,

        #[arg(long, value_enum)]
        quality: Option<QualityArg>,

        #[arg(long)]
        format: Option<String>,

        #[arg(short, long, env = "CONVOGLIA_OUTPUT_DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Elenca gli strumenti disponibili
    Tools,

    /// Stato corrente di un job
    Status {
        job_id: String,

        #[arg(short, long)]
        tool: String,
    },

    /// Scarica il risultato di un job completato
    Download {
        job_id: String,

        #[arg(short, long)]
        tool: String,

        #[arg(short, long, env = "CONVOGLIA_OUTPUT_DIR")]
        output_dir: Option<PathBuf>,

        #[arg(long)]
        extract: bool,
    },

    /// Ultime conversioni eseguite
    History {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
}

#[derive(ValueEnum, Clone, Copy)]
enum QualityArg {
    Low,
    Medium,
    High,
    Fast,
    Standard,
}

impl From<QualityArg> for Quality {
    fn from(value: QualityArg) -> Self {
        match value {
            QualityArg::Low => Quality::Low,
            QualityArg::Medium => Quality::Medium,
            QualityArg::High => Quality::High,
            QualityArg::Fast => Quality::Fast,
            QualityArg::Standard => Quality::Standard,
        }
    }
}

#[derive(ValueEnum, Clone, Copy)]
enum ModeArg {
    Auto,
    Sync,
    Async,
}

impl From<ModeArg> for SubmitMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Auto => SubmitMode::Auto,
            ModeArg::Sync => SubmitMode::Sync,
            ModeArg::Async => SubmitMode::Async,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Carica variabili da .env
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Inizializza logging su stderr, la barra di avanzamento usa stdout
    let default_filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "convoglia=debug"
    } else {
        "convoglia=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = Config::from_env();
    let history = HistoryStore::new(config.history_path.clone());
    let client = ConvertClient::new(config)?;

    match cli.command {
        Command::Convert {
            file,
            tool,
            quality,
            scale,
            format,
            pages,
            transparent,
            dpi,
            mode,
            output_dir,
            extract,
            no_progress,
        } => {
            let tool = find_tool(&tool)?;
            let options = ConversionOptions {
                quality: quality.map(Quality::from),
                scale,
                output_format: format,
                page_range: pages,
                transparent: transparent.then_some(true),
                dpi,
            };
            let show_progress = !cli.quiet && !no_progress;

            run_convert(
                &client,
                &history,
                tool,
                &file,
                &options,
                mode.into(),
                output_dir,
                extract,
                show_progress,
            )
            .await
        }
        Command::Batch {
            files,
            tool,
            quality,
            format,
            output_dir,
        } => {
            let tool = find_tool(&tool)?;
            let options = ConversionOptions {
                quality: quality.map(Quality::from),
                output_format: format,
                ..Default::default()
            };
            run_batch(&client, &history, tool, &files, &options, output_dir).await
        }
        Command::Tools => {
            print_tools();
            Ok(())
        }
        Command::Status { job_id, tool } => {
            let tool = find_tool(&tool)?;
            let job = client.status(tool, &job_id).await?;

            println!("Job:        {}", job.id);
            println!("Strumento:  {}", job.tool_slug);
            println!("Stato:      {}", job.status);
            println!("Progresso:  {}%", job.progress);
            if let Some(message) = &job.message {
                println!("Messaggio:  {}", message);
            }
            if let Some(error) = &job.error {
                println!("Errore:     {}", error);
            }
            Ok(())
        }
        Command::Download {
            job_id,
            tool,
            output_dir,
            extract,
        } => {
            let tool = find_tool(&tool)?;
            let handle = client.attach(tool, &job_id);
            let artifact = client.download(&handle).await?;
            let dir = output_dir.unwrap_or_else(|| client.config().output_dir.clone());

            save_artifact(&artifact, &dir, extract)?;
            Ok(())
        }
        Command::History { limit } => {
            let records = history.list(limit)?;
            if records.is_empty() {
                println!("Nessuna conversione nello storico");
                return Ok(());
            }

            for record in records {
                let outcome = match record.status.as_str() {
                    "completed" => record.output_name.unwrap_or_default(),
                    _ => record.error.unwrap_or_else(|| record.status.clone()),
                };
                println!(
                    "{}  {:<14} {:<6} {:<9} {} -> {}",
                    record.started_at.format("%Y-%m-%d %H:%M:%S"),
                    record.tool,
                    record.mode,
                    record.status,
                    record.input_name,
                    outcome
                );
            }
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_convert(
    client: &ConvertClient,
    history: &HistoryStore,
    tool: &'static ToolSpec,
    file: &Path,
    options: &ConversionOptions,
    mode: SubmitMode,
    output_dir: Option<PathBuf>,
    extract: bool,
    show_progress: bool,
) -> Result<()> {
    let input = client.load(file, tool).await?;
    let dir = output_dir.unwrap_or_else(|| client.config().output_dir.clone());

    let mut record = HistoryRecord::new(tool.slug, &input.name, input.size(), "auto");

    if let Some((width, height)) = input.dimensions {
        tracing::debug!("Immagine di input {}x{} pixel", width, height);
    }

    let result = match client.submit(tool, &input, options, mode).await {
        Ok(Submission::Immediate(artifact)) => {
            record.mode = "sync".to_string();
            Ok(artifact)
        }
        Ok(Submission::Queued(mut handle)) => {
            record.mode = "async".to_string();
            println!("Job {} in coda su {}", handle.id(), tool.label);
            watch_job(client, &mut handle, show_progress).await
        }
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(artifact) => {
            let saved = save_artifact(&artifact, &dir, extract)?;
            record.complete(&artifact.filename);
            history.append(&record)?;
            println!("Completato: {}", saved.display());
            Ok(())
        }
        Err(e) => {
            record.fail(&e.to_string());
            history.append(&record)?;
            Err(e)
        }
    }
}

/// Attende il completamento mostrando gli aggiornamenti di avanzamento.
/// Ctrl-C annulla il polling.
async fn watch_job(
    client: &ConvertClient,
    handle: &mut JobHandle,
    show_progress: bool,
) -> Result<Artifact> {
    let canceller = handle.canceller();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            canceller.cancel();
        }
    });

    let bar_task = if show_progress {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} [{bar:40.green/238}] {pos:>3}% {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.enable_steady_tick(std::time::Duration::from_millis(120));

        let mut updates = handle.subscribe();
        let observer = bar.clone();
        Some((
            bar,
            tokio::spawn(async move {
                while let Some(update) = updates.next().await {
                    // Ignora gli aggiornamenti persi per lag del canale
                    let Ok(update) = update else { continue };
                    observer.set_position(update.progress as u64);
                    if let Some(message) = update.message {
                        observer.set_message(message);
                    }
                }
            }),
        ))
    } else {
        None
    };

    let result = client.wait(handle).await;

    if let Some((bar, task)) = bar_task {
        bar.finish_and_clear();
        task.abort();
    }

    Ok(result?)
}

async fn run_batch(
    client: &ConvertClient,
    history: &HistoryStore,
    tool: &'static ToolSpec,
    files: &[PathBuf],
    options: &ConversionOptions,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    if files.is_empty() {
        anyhow::bail!("Nessun file da convertire");
    }

    let dir = output_dir.unwrap_or_else(|| client.config().output_dir.clone());

    // Strumenti con invio multiplo: una sola richiesta e un solo job
    if tool.batch.is_some() && files.len() > 1 {
        let mut inputs = Vec::with_capacity(files.len());
        for path in files {
            inputs.push(client.load(path, tool).await?);
        }
        let total: u64 = inputs.iter().map(UploadedFile::size).sum();
        let mut record = HistoryRecord::new(
            tool.slug,
            &format!("{} file", inputs.len()),
            total,
            "batch",
        );

        let result = match client.submit_batch(tool, &inputs, options).await {
            Ok(Submission::Immediate(artifact)) => Ok(artifact),
            Ok(Submission::Queued(mut handle)) => {
                println!("Job {} in coda su {}", handle.id(), tool.label);
                watch_job(client, &mut handle, true).await
            }
            Err(e) => Err(e.into()),
        };

        return match result {
            Ok(artifact) => {
                let saved = save_artifact(&artifact, &dir, false)?;
                record.complete(&artifact.filename);
                history.append(&record)?;
                println!("Completato: {}", saved.display());
                Ok(())
            }
            Err(e) => {
                record.fail(&e.to_string());
                history.append(&record)?;
                Err(e)
            }
        };
    }

    // Altrimenti: un job per file, con concorrenza limitata
    let bar = ProgressBar::new(files.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("[{bar:40.green/238}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let outcomes: Vec<(String, Result<PathBuf>)> = futures::stream::iter(files)
        .map(|path| {
            let client = client.clone();
            let dir = dir.clone();
            let options = options.clone();
            let bar = bar.clone();
            async move {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                let outcome = convert_one(&client, tool, path, &options, &dir).await;
                bar.inc(1);
                (name, outcome)
            }
        })
        .buffer_unordered(BATCH_CONCURRENCY)
        .collect()
        .await;

    bar.finish_and_clear();

    let mut converted = 0usize;
    let mut failed = 0usize;
    for (name, outcome) in &outcomes {
        match outcome {
            Ok(path) => {
                converted += 1;
                println!("  ok  {} -> {}", name, path.display());
            }
            Err(e) => {
                failed += 1;
                println!("  err {} ({})", name, e);
            }
        }

        let mut record = HistoryRecord::new(tool.slug, name, 0, "batch");
        match outcome {
            Ok(path) => record.complete(&path.display().to_string()),
            Err(e) => record.fail(&e.to_string()),
        }
        history.append(&record)?;
    }

    println!("Batch completato: {} convertiti, {} falliti", converted, failed);
    if converted == 0 {
        anyhow::bail!("Nessun file convertito");
    }
    Ok(())
}

/// Converte un singolo file del batch, senza barra di avanzamento
async fn convert_one(
    client: &ConvertClient,
    tool: &'static ToolSpec,
    path: &Path,
    options: &ConversionOptions,
    dir: &Path,
) -> Result<PathBuf> {
    let input = client.load(path, tool).await?;

    let artifact = match client.submit(tool, &input, options, SubmitMode::Auto).await? {
        Submission::Immediate(artifact) => artifact,
        Submission::Queued(mut handle) => client.wait(&mut handle).await?,
    };

    artifact.save_to(dir).map_err(Into::into)
}

fn save_artifact(artifact: &Artifact, dir: &Path, extract: bool) -> Result<PathBuf> {
    if extract {
        if artifact.is_zip() {
            let extracted = artifact.unpack_zip(dir)?;
            println!("Estratti {} file in {}", extracted.len(), dir.display());
            return Ok(dir.to_path_buf());
        }
        tracing::warn!("Il risultato non è un archivio, salvataggio normale");
    }

    artifact
        .save_to(dir)
        .with_context(|| format!("Impossibile salvare in {}", dir.display()))
}

fn print_tools() {
    println!(
        "{:<16} {:<24} {:<28} {:>7}  {}",
        "SLUG", "NOME", "INPUT", "MAX MB", "OUTPUT"
    );
    for tool in tools::TOOLS {
        let mut notes = Vec::new();
        if tool.multi_page_zip {
            notes.push("zip multi-pagina");
        }
        if tool.batch.is_some() {
            notes.push("invio multiplo");
        }
        if tool.force_async {
            notes.push("solo async");
        }

        println!(
            "{:<16} {:<24} {:<28} {:>7}  {}{}",
            tool.slug,
            tool.label,
            tool.allowed_inputs.join(", "),
            tool.max_file_mb,
            tool.output_ext,
            if notes.is_empty() {
                String::new()
            } else {
                format!("  ({})", notes.join(", "))
            }
        );
    }
}
