//! Freiform-Editier-Engine: headless Replay.
//!
//! Spielt ein JSON-Skript aus `EditorIntent`s gegen einen In-Memory-Speicher
//! ab und gibt die Objekte am Ende als JSON aus.
//!
//! Aufruf: `freeform-replay <skript.json> [optionen.toml]`

use anyhow::Context;
use freeform_edit::app::CommandOutcome;
use freeform_edit::{
    EditController, EditSession, EditorIntent, EngineOptions, HostBridge, LoggingHost,
    SceneObjects,
};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    // Logger initialisieren
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!(
        "Freiform-Editier-Engine v{} startet...",
        env!("CARGO_PKG_VERSION")
    );

    let mut args = std::env::args().skip(1);
    let script_path = PathBuf::from(
        args.next()
            .context("Aufruf: freeform-replay <skript.json> [optionen.toml]")?,
    );
    let options_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(EngineOptions::config_path);

    let options = EngineOptions::load_from_file(&options_path);
    let script = std::fs::read_to_string(&script_path)
        .with_context(|| format!("Skript nicht lesbar: {}", script_path.display()))?;
    let intents: Vec<EditorIntent> = serde_json::from_str(&script)
        .with_context(|| format!("Skript fehlerhaft: {}", script_path.display()))?;

    let mut session = EditSession::with_options(options);
    let mut controller = EditController::new();
    let mut store = SceneObjects::new();
    let mut callbacks = LoggingHost;

    for (step, intent) in intents.into_iter().enumerate() {
        let mut host = HostBridge::new(&mut callbacks, &mut store);
        controller
            .handle_intent(&mut session, &mut host, intent)
            .with_context(|| format!("Abbruch in Schritt {}", step + 1))?;
    }

    let log = &session.command_log;
    for record in log.rejections() {
        if let CommandOutcome::Rejected(err) = &record.outcome {
            eprintln!("#{} {:?}: {}", record.sequence + 1, record.command, err);
        }
    }
    log::info!(
        "Replay beendet: {} Commands ({} abgewiesen), {} Objekte",
        log.total(),
        log.rejected_total(),
        store.len()
    );
    println!("{}", store.to_json()?);
    Ok(())
}
