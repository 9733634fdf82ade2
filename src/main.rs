//! # debtguard
//!
//! Terminal front end: ingest a repository URL or pasted context, review and
//! sign the generated contract, then chat under it.

#![deny(unsafe_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::broadcast;
use tracing::Level;

use debtguard_core::events::SessionEvent;
use debtguard_core::input::InputSpec;
use debtguard_core::phase::Phase;
use debtguard_engine::{EngineError, Session, Workflow};
use debtguard_settings::{load_settings, load_settings_from_path, DebtguardSettings};
use debtguard_telemetry::{init_telemetry, parse_level, TelemetryConfig};

/// Contract-governed AI pair programming.
#[derive(Parser, Debug)]
#[command(name = "debtguard", version, about = "Contract-governed AI pair programming")]
struct Cli {
    /// Repository URL to extract context from.
    #[arg(long, conflicts_with_all = ["text", "text_file"])]
    url: Option<String>,

    /// Project context as literal text.
    #[arg(long, conflicts_with = "text_file")]
    text: Option<String>,

    /// Read project context from a file.
    #[arg(long)]
    text_file: Option<PathBuf>,

    /// Settings file (defaults to `~/.debtguard/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Sign the contract without asking.
    #[arg(long)]
    yes: bool,
}

impl Cli {
    async fn input(&self) -> Result<Option<InputSpec>> {
        if let Some(url) = &self.url {
            return Ok(Some(InputSpec::Url(url.clone())));
        }
        if let Some(text) = &self.text {
            return Ok(Some(InputSpec::Text(text.clone())));
        }
        if let Some(path) = &self.text_file {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            return Ok(Some(InputSpec::Text(text)));
        }
        Ok(None)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Quit,
    Compact,
    ShowContract,
    Edit(&'a str),
    Message(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        match trimmed {
            "/salir" => Self::Quit,
            "/compactar" => Self::Compact,
            "/contrato" => Self::ShowContract,
            _ => match trimmed.strip_prefix("/editar") {
                Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => {
                    Self::Edit(rest.trim())
                }
                _ => Self::Message(line),
            },
        }
    }
}

fn telemetry_config(settings: &DebtguardSettings) -> TelemetryConfig {
    TelemetryConfig {
        log_level: parse_level(&settings.logging.level).unwrap_or(Level::WARN),
        json: settings.logging.json,
        ..TelemetryConfig::default()
    }
    .with_module_level("hyper_util", Level::WARN)
}

/// Stage labels and alerts go to stderr as they happen.
fn spawn_event_reporter(mut events: broadcast::Receiver<SessionEvent>) {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(SessionEvent::SynthesisStage { stage, .. }) => eprintln!("… {}", stage.label()),
                Ok(SessionEvent::Alert { message, .. }) => eprintln!("\n[!] {message}\n"),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

fn prompt(label: &str) -> Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{label}")?;
    stdout.flush().context("failed to flush stdout")
}

async fn read_line<R>(lines: &mut Lines<R>, label: &str) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    prompt(label)?;
    lines.next_line().await.context("failed to read stdin")
}

/// Replaces the contract with a file's contents. Failures are reported and
/// leave the session as it was.
async fn edit_from_file(workflow: &Workflow, session: &mut Session, path: &str) -> bool {
    if path.is_empty() {
        eprintln!("Uso: /editar <archivo>");
        return false;
    }
    let text = match tokio::fs::read_to_string(Path::new(path)).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(path, error = %e, "contract edit failed");
            eprintln!("\n[!] No se pudo leer {path}: {e}\n");
            return false;
        }
    };
    if let Err(e) = workflow.edit_contract(session, text) {
        eprintln!("\n[!] {e}\n");
        return false;
    }
    println!("Contrato actualizado ({} caracteres).", session.contract().as_str().chars().count());
    true
}

fn print_contract(session: &Session) {
    println!("\n{}\n", session.contract());
}

/// Ingest phase. Input given on the command line gets one attempt; input
/// typed at the prompt is asked for again after each failure. Returns false
/// when stdin closes first.
async fn ingest_loop<R>(
    workflow: &Workflow,
    session: &mut Session,
    lines: &mut Lines<R>,
    mut input: Option<InputSpec>,
) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    let interactive = input.is_none();
    loop {
        let spec = match input.take() {
            Some(spec) => spec,
            None => {
                let Some(url) = read_line(lines, "URL del repositorio: ").await? else {
                    return Ok(false);
                };
                InputSpec::Url(url.trim().to_string())
            }
        };
        match workflow.ingest(session, spec).await {
            Ok(()) => return Ok(true),
            Err(e) => {
                tracing::warn!(kind = e.error_kind(), error = %e, "ingest failed");
                if !interactive || session.phase() != Phase::Ingest {
                    bail!("{e}");
                }
                eprintln!("\n[!] {e}\n");
            }
        }
    }
}

/// Contract phase: show, optionally edit, then sign. Returns false if the
/// user quits.
async fn review_contract<R>(
    workflow: &Workflow,
    session: &mut Session,
    lines: &mut Lines<R>,
    auto_sign: bool,
) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    print_contract(session);
    if !auto_sign {
        loop {
            let Some(line) =
                read_line(lines, "¿Firmar contrato? [s] firmar, /editar <archivo>, /salir: ").await?
            else {
                return Ok(false);
            };
            match Command::parse(&line) {
                Command::Quit => return Ok(false),
                Command::ShowContract => print_contract(session),
                Command::Edit(path) => {
                    edit_from_file(workflow, session, path).await;
                }
                Command::Message(answer) if matches!(answer.trim(), "s" | "si" | "sí") => break,
                _ => {}
            }
        }
    }
    workflow.sign_contract(session)?;
    println!("Contrato firmado. Escribe tu petición (/compactar, /contrato, /editar <archivo>, /salir).");
    Ok(true)
}

async fn chat_loop<R>(workflow: &Workflow, session: &mut Session, lines: &mut Lines<R>) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    while let Some(line) = read_line(lines, "\nTú: ").await? {
        match Command::parse(&line) {
            Command::Quit => break,
            Command::ShowContract => print_contract(session),
            Command::Edit(path) => {
                edit_from_file(workflow, session, path).await;
            }
            Command::Compact => match workflow.compact(session).await {
                Ok(true) => {
                    if let Some(turn) = session.log().last() {
                        println!("\n{}", turn.content());
                    }
                }
                Ok(false) => println!("Nada que compactar."),
                // Already reported through the alert event.
                Err(EngineError::Compaction(_)) => {}
                Err(e) => return Err(e.into()),
            },
            Command::Message(text) => {
                if workflow.send_message(session, text).await? {
                    if let Some(turn) = session.log().last() {
                        println!("\nIA: {}", turn.content());
                    }
                }
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => load_settings_from_path(path),
        None => load_settings(),
    }
    .context("failed to load settings")?;
    let _telemetry = init_telemetry(&telemetry_config(&settings));

    let workflow = Workflow::from_settings(&settings).context("failed to build workflow")?;
    spawn_event_reporter(workflow.subscribe());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut session = Session::new();
    tracing::info!(session_id = %session.id(), "session started");

    let input = cli.input().await?;
    if !ingest_loop(&workflow, &mut session, &mut lines, input).await? {
        return Ok(());
    }

    if !review_contract(&workflow, &mut session, &mut lines, cli.yes).await? {
        return Ok(());
    }
    chat_loop(&workflow, &mut session, &mut lines).await
}
