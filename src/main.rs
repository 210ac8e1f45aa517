//! TruthLens CLI — Binary Entrypoint
//! Drives the client library end to end: submit a claim, URL, image, or
//! audio file for analysis, then browse, replay, or clear the local history.
//!
//! Configuration comes from `config/client.json` (optional) plus env vars:
//! `TRUTHLENS_API_BASE` (backend base URL), `TRUTHLENS_STATE_DIR` (where the
//! history/theme files live, default `state`).

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use truthlens_client::{
    looks_like_url, AnalysisKind, AnalysisOutcome, AnalysisReport, ApiClient, AudioUpload,
    ClientConfig, FileStorage, History, HistoryFilter, ImageInput, KvStorage, Session,
    SubmitOutcome, TracingNotifier,
};

const ENV_STATE_DIR: &str = "TRUTHLENS_STATE_DIR";
const ENV_CONFIG_PATH: &str = "TRUTHLENS_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config/client.json";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("truthlens_client=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

fn load_config() -> ClientConfig {
    let path =
        std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    match ClientConfig::load_from_file(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::debug!(error = %e, path, "no usable config file; using defaults + env");
            ClientConfig::from_env()
        }
    }
}

fn print_usage() {
    eprintln!(
        r#"Usage: truthlens <command> [args]

Commands:
  verify <claim-or-url>                fact-check a claim or article URL
  phishing <url>                       scan a link for phishing
  image <path-or-url>                  check an image for AI generation
  audio <path>                         check an audio file for AI synthesis
  history [--kind k] [--contains s]    list past analyses
  replay <id>                          re-show a past analysis
  clear                                wipe the history
  trending                             show the trending feed
  health                               probe the backend
  theme [dark|light]                   show or set the theme"#
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op elsewhere.
    let _ = dotenvy::dotenv();
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        print_usage();
        return Ok(());
    };

    let state_dir = std::env::var(ENV_STATE_DIR).unwrap_or_else(|_| "state".to_string());
    let storage: Arc<dyn KvStorage> = Arc::new(FileStorage::new(&state_dir));
    let history = Arc::new(History::load(storage.clone()));
    let client = Arc::new(ApiClient::new(&load_config()));
    let session = Session::new(client.clone(), history.clone(), Arc::new(TracingNotifier));

    match command {
        "verify" => {
            let input = joined_arg(&args[1..], "a claim or URL")?;
            finish(session.submit_verify(&input).await)
        }
        "phishing" => {
            let url = joined_arg(&args[1..], "a URL")?;
            finish(session.submit_phishing(&url).await)
        }
        "image" => {
            let arg = joined_arg(&args[1..], "an image path or URL")?;
            let input = if looks_like_url(&arg) {
                ImageInput::Remote { url: arg }
            } else {
                ImageInput::Upload {
                    file_name: file_name_of(&arg),
                    bytes: std::fs::read(&arg).with_context(|| format!("reading {arg}"))?,
                }
            };
            finish(session.submit_image(input).await)
        }
        "audio" => {
            let arg = joined_arg(&args[1..], "an audio path")?;
            let upload = AudioUpload {
                file_name: file_name_of(&arg),
                bytes: std::fs::read(&arg).with_context(|| format!("reading {arg}"))?,
            };
            finish(session.submit_audio(upload).await)
        }
        "history" => {
            let filter = parse_filter(&args[1..])?;
            let entries = history.list(&filter);
            if entries.is_empty() {
                println!("no analyses yet");
            }
            for e in entries {
                println!(
                    "{}  {:<8} {:<16} {:>7}  {}  {}",
                    e.id,
                    e.kind,
                    e.verdict.as_deref().unwrap_or("-"),
                    e.score.map(|s| format!("{s:.0}/100")).unwrap_or_else(|| "-".into()),
                    e.timestamp,
                    e.input
                );
            }
            Ok(())
        }
        "replay" => {
            let id: u64 = joined_arg(&args[1..], "an entry id")?
                .parse()
                .context("entry id must be a number")?;
            let Some(entry) = history.find(id) else {
                bail!("no history entry with id {id}");
            };
            match session.replay(&entry) {
                Some(outcome) => {
                    print_outcome(&outcome);
                    Ok(())
                }
                None => bail!("stored payload for entry {id} is unreadable"),
            }
        }
        "clear" => {
            history.clear();
            println!("history cleared");
            Ok(())
        }
        "trending" => {
            for a in client.trending().await? {
                println!(
                    "{}: {} ({})",
                    a.source.as_deref().unwrap_or("?"),
                    a.title.as_deref().unwrap_or("(untitled)"),
                    a.link.as_deref().unwrap_or("-")
                );
            }
            Ok(())
        }
        "health" => {
            let payload = client.health().await?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
            Ok(())
        }
        "theme" => {
            match args.get(1) {
                None => println!("{}", truthlens_client::theme::load(storage.as_ref()).as_str()),
                Some(value) => {
                    let Some(theme) = truthlens_client::theme::Theme::parse(value) else {
                        bail!("unknown theme '{value}' (expected dark or light)");
                    };
                    truthlens_client::theme::save(storage.as_ref(), theme);
                    println!("theme set to {}", theme.as_str());
                }
            }
            Ok(())
        }
        other => {
            print_usage();
            bail!("unknown command '{other}'");
        }
    }
}

fn joined_arg(rest: &[String], what: &str) -> Result<String> {
    let joined = rest.join(" ");
    if joined.trim().is_empty() {
        bail!("expected {what}");
    }
    Ok(joined.trim().to_string())
}

fn file_name_of(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

fn parse_filter(rest: &[String]) -> Result<HistoryFilter> {
    let mut filter = HistoryFilter::default();
    let mut it = rest.iter();
    while let Some(flag) = it.next() {
        match flag.as_str() {
            "--kind" => {
                let value = it.next().context("--kind needs a value")?;
                filter.kind = Some(
                    AnalysisKind::parse(value)
                        .with_context(|| format!("unknown kind '{value}'"))?,
                );
            }
            "--contains" => {
                filter.contains = Some(it.next().context("--contains needs a value")?.clone());
            }
            other => bail!("unknown flag '{other}'"),
        }
    }
    Ok(filter)
}

fn finish(outcome: SubmitOutcome) -> Result<()> {
    match outcome {
        SubmitOutcome::Completed(outcome) => {
            print_outcome(&outcome);
            Ok(())
        }
        SubmitOutcome::Rejected(msg) | SubmitOutcome::Failed(msg) => bail!("{msg}"),
        // A single-command CLI never races its own submits.
        SubmitOutcome::Superseded => Ok(()),
    }
}

fn print_outcome(outcome: &AnalysisOutcome) {
    println!(
        "[{}] {}  {}",
        outcome.kind,
        outcome.normalized.verdict.as_deref().unwrap_or("(no verdict)"),
        outcome
            .normalized
            .score
            .map(|s| format!("{s:.0}/100"))
            .unwrap_or_else(|| "-".into()),
    );
    match &outcome.report {
        AnalysisReport::Text(r) => {
            if let Some(explanation) = &r.explanation {
                println!("{explanation}");
            }
            for s in &r.sources {
                println!("  source: {}", s.link.as_deref().unwrap_or("-"));
            }
        }
        AnalysisReport::Url(r) => {
            if let Some(article) = &r.article {
                println!("{}", article.title.as_deref().unwrap_or("(untitled)"));
            }
            if let Some(bias) = &r.bias_detected {
                println!("bias: {bias}");
            }
            for flag in &r.red_flags {
                println!("  red flag: {flag}");
            }
        }
        AnalysisReport::Phishing(r) => {
            for signal in &r.signals {
                println!("  signal: {signal}");
            }
            if let Some(ai) = &r.ai_analysis {
                if let Some(rec) = &ai.recommendation {
                    println!("{rec}");
                }
            }
        }
        AnalysisReport::Image(r) => {
            for signal in &r.signals {
                println!("  signal: {signal}");
            }
            if let Some(ai) = &r.ai_analysis {
                if let Some(explanation) = &ai.explanation {
                    println!("{explanation}");
                }
            }
        }
        AnalysisReport::Audio(r) => {
            if let Some(transcript) = &r.transcript {
                println!("transcript: {transcript}");
            }
            if let Some(explanation) = &r.explanation {
                println!("{explanation}");
            }
        }
    }
}
