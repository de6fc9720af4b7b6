use anyhow::Result;
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use signsh::cli::{Cli, Commands};
use signsh::config::Config;
use signsh::error::SignshError;
use signsh::landmarks::ReplayDetector;
use signsh::pipeline::{Pipeline, PipelineHandle, PipelineOptions};
use signsh::speech::{languages, EspeakSynthesizer, SpeechSynthesizer, Translator};
use signsh::store::GestureDataset;
use signsh::transcript::TranscriptLedger;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            replay,
            language,
            dataset,
            window,
            json,
            save_transcript,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(language) = language {
                config.speech.target_language = language;
            }
            if let Some(window_ms) = window {
                config.pipeline.window_ms = window_ms;
            }
            config.validate()?;
            run_replay(
                config,
                replay,
                dataset,
                cli.quiet,
                cli.verbose,
                json,
                save_transcript,
            )
            .await?;
        }
        #[cfg(feature = "remote")]
        Commands::Dataset { action } => {
            let config = load_config(cli.config.as_deref())?;
            handle_dataset_command(action, &config).await?;
        }
        Commands::Languages => {
            let config = load_config(cli.config.as_deref())?;
            list_target_languages(&config);
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "signsh", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/signsh/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        if !path.exists() {
            return Err(SignshError::ConfigFileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }
        Config::load(path)?
    } else {
        // Try default path, fall back to defaults
        let default_path = Config::default_path();
        Config::load_or_default(&default_path)
    };

    // Apply environment variable overrides
    Ok(config.with_env_overrides())
}

/// Replay a landmark recording through the full recognition pipeline.
async fn run_replay(
    config: Config,
    replay: PathBuf,
    dataset_file: Option<PathBuf>,
    quiet: bool,
    verbose: u8,
    json: bool,
    save_transcript: bool,
) -> Result<()> {
    let target_lang = config.speech.target_language.clone();
    if !languages::is_supported(&target_lang) {
        eprintln!(
            "Warning: unsupported language '{}', labels will be spoken untranslated",
            target_lang
        );
    }

    let dataset = load_dataset(&config, dataset_file.as_deref()).await?;
    if dataset.is_empty() {
        eprintln!("The gesture dataset is empty; record examples before running.");
        std::process::exit(1);
    }

    let mut options = PipelineOptions::from_config(&config);

    let renderer = if quiet {
        None
    } else {
        let (tx, rx) = crossbeam_channel::bounded(64);
        options.event_tx = Some(tx);
        // The sender drops when the session ends, which ends this thread.
        Some(std::thread::spawn(move || {
            for event in rx.iter() {
                if json {
                    if let Ok(line) = event.to_json() {
                        println!("{}", line);
                    }
                } else {
                    signsh::output::render_event(&event);
                }
            }
        }))
    };

    #[cfg(feature = "remote")]
    let translator: Arc<dyn Translator> = Arc::new(signsh::speech::HttpTranslator::new());
    #[cfg(not(feature = "remote"))]
    let translator: Arc<dyn Translator> = Arc::new(signsh::speech::PassthroughTranslator);

    let synthesizer: Arc<dyn SpeechSynthesizer> = Arc::new(EspeakSynthesizer::new());

    if verbose > 0 {
        eprintln!(
            "Dataset: {} gestures, {} examples",
            dataset.total_gestures(),
            dataset.total_examples()
        );
        eprintln!(
            "Engines: {} translation, {} speech",
            translator.name(),
            synthesizer.name()
        );
        eprintln!(
            "Window: {}, threshold: {}, k: {}",
            humantime::format_duration(options.window),
            options.confidence_threshold,
            options.k_neighbors
        );
    }
    if !quiet && !json {
        eprintln!("Replaying {}", replay.display());
    }

    let detector = ReplayDetector::new(&replay);
    let handle = Pipeline::new(options)
        .start(Box::new(detector), dataset, translator, synthesizer)
        .await?;
    let ledger = handle.ledger();

    // A replay session normally ends when the recording runs out; Ctrl+C
    // cuts it short.
    let interrupted = tokio::select! {
        _ = wait_until_stopped(&handle) => false,
        result = tokio::signal::ctrl_c() => {
            result.map_err(|e| SignshError::Other(format!("Failed to wait for Ctrl+C: {}", e)))?;
            true
        }
    };

    let transcript_text = if interrupted {
        if !quiet {
            eprintln!("\nShutting down...");
        }
        handle.stop().await
    } else {
        handle.join().await
    };

    if let Some(renderer) = renderer {
        let _ = renderer.join();
    }

    // In JSON mode the final transcript already arrived in the Stopped
    // event; repeating it would corrupt the stream.
    if !json {
        match &transcript_text {
            Some(text) => println!("{}", text),
            None => {
                if !quiet {
                    eprintln!("Nothing was recognized.");
                }
            }
        }
    }

    if save_transcript {
        if transcript_text.is_some() {
            let path = save_transcript_file(&ledger, &target_lang).await?;
            if !quiet {
                eprintln!("Transcript saved to {}", path.display().green());
            }
        } else if !quiet {
            eprintln!("Transcript is empty, nothing to save.");
        }
    }

    Ok(())
}

/// Resolves once the pipeline loop has wound down on its own.
async fn wait_until_stopped(handle: &PipelineHandle) {
    while handle.is_running() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Load the gesture dataset from a local export file or the backend.
async fn load_dataset(config: &Config, file: Option<&Path>) -> Result<GestureDataset> {
    if let Some(path) = file {
        let text = std::fs::read_to_string(path)?;
        return Ok(signsh::store::import_dataset(&text)?);
    }
    fetch_dataset(config).await
}

#[cfg(feature = "remote")]
async fn fetch_dataset(config: &Config) -> Result<GestureDataset> {
    use signsh::store::DatasetBackend;
    Ok(backend_from_config(config).fetch().await?)
}

#[cfg(not(feature = "remote"))]
async fn fetch_dataset(_config: &Config) -> Result<GestureDataset> {
    anyhow::bail!("No dataset source: pass --dataset <file> (this build has no remote backend)")
}

#[cfg(feature = "remote")]
fn backend_from_config(config: &Config) -> signsh::store::HttpBackend {
    signsh::store::HttpBackend::new(&config.backend.url).with_timeout(config.backend.timeout())
}

/// Grammar-correct the transcript and write it next to the working
/// directory, returning the path.
async fn save_transcript_file(ledger: &Arc<Mutex<TranscriptLedger>>, lang: &str) -> Result<PathBuf> {
    #[cfg(feature = "remote")]
    let corrector = signsh::grammar::HttpCorrector::new();
    #[cfg(not(feature = "remote"))]
    let corrector = signsh::grammar::PassthroughCorrector;

    let text = ledger.lock().await.export_with(&corrector, lang).await;
    let path = PathBuf::from(signsh::transcript::export_filename(SystemTime::now()));
    tokio::fs::write(&path, format!("{}\n", text)).await?;
    Ok(path)
}

/// Handle dataset backend commands.
#[cfg(feature = "remote")]
async fn handle_dataset_command(action: signsh::cli::DatasetAction, config: &Config) -> Result<()> {
    use signsh::cli::DatasetAction;
    use signsh::store::{DatasetBackend, MergeDecision};
    use std::collections::BTreeMap;

    let backend = backend_from_config(config);

    match action {
        DatasetAction::Stats => {
            let stats = backend.stats().await?;
            if stats.gestures.is_empty() {
                println!("The dataset is empty.");
                return Ok(());
            }
            println!(
                "Stored gestures ({} labels, {} examples):",
                stats.total_gestures, stats.total_examples
            );
            for gesture in &stats.gestures {
                println!("  {} ({} examples)", gesture.label.green(), gesture.count);
            }
        }
        DatasetAction::Export { output } => {
            let dataset = backend.fetch().await?;
            if dataset.is_empty() {
                eprintln!("The dataset is empty; nothing to export.");
                std::process::exit(1);
            }
            let now = SystemTime::now();
            let export = signsh::store::export_dataset(&dataset, now);
            let path =
                output.unwrap_or_else(|| PathBuf::from(signsh::store::export_filename(now)));
            std::fs::write(&path, export.to_json_pretty()?)?;
            println!(
                "Exported {} gestures ({} examples) to {}",
                export.metadata.total_gestures,
                export.metadata.total_examples,
                path.display()
            );
        }
        DatasetAction::Import { file, replace } => {
            let text = std::fs::read_to_string(&file)?;
            let candidate = signsh::store::import_dataset(&text)?;
            let report = backend.check_conflicts(&candidate).await?;

            if report.has_conflicts && !replace {
                eprintln!("Import conflicts with stored labels:");
                for conflict in &report.conflicts {
                    eprintln!(
                        "  {} ({} stored, {} incoming)",
                        conflict.label.yellow(),
                        conflict.existing_count,
                        conflict.incoming_count
                    );
                }
                eprintln!("Conflicting labels are kept as stored; re-run with --replace to overwrite them.");
            }

            let decisions: BTreeMap<String, MergeDecision> = if replace {
                report
                    .conflicts
                    .iter()
                    .map(|c| (c.label.clone(), MergeDecision::Replace))
                    .collect()
            } else {
                BTreeMap::new()
            };
            let outcome = backend.merge(&candidate, &decisions).await?;
            println!(
                "Imported: {} added, {} replaced, {} rejected",
                outcome.added, outcome.replaced, outcome.rejected
            );
        }
        DatasetAction::Delete { label } => {
            backend.delete_label(&label).await?;
            println!("Deleted '{}'", label);
        }
        DatasetAction::Clear { yes } => {
            if !yes && !confirm("This deletes every stored gesture. Continue?")? {
                println!("Aborted.");
                return Ok(());
            }
            backend.clear().await?;
            println!("Dataset cleared");
        }
    }
    Ok(())
}

/// Ask a yes/no question on the terminal, defaulting to no.
#[cfg(feature = "remote")]
fn confirm(prompt: &str) -> Result<bool> {
    use std::io::Write;
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

/// List supported target languages, marking the configured one.
fn list_target_languages(config: &Config) {
    let current = config.speech.target_language.as_str();
    println!("Target languages (current: {}):", current.green());
    for lang in languages::list_languages() {
        if lang.code == current {
            println!("  {} {}  {}", "●".green(), lang.code, lang.name);
        } else {
            println!("  ○ {}  {}", lang.code, lang.name);
        }
    }
}
