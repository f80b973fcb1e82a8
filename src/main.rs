//! AURA - Voice-Activated Desktop Assistant
//!
//! Continuous wake word listening, one-shot command capture, intent
//! routing, and spoken responses, coordinated by a single event-driven
//! orchestrator.

use anyhow::Result;
use aura::asr;
use aura::config::Config;
use aura::handlers::HandlerRegistry;
use aura::intent::{self, IntentKind};
use aura::orchestrator::{Notification, Orchestrator, Session};
use aura::tts;
use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Audio input device index
    #[arg(short, long)]
    device: Option<usize>,

    /// Skip the spoken startup greeting
    #[arg(long)]
    no_greeting: bool,

    /// Answer one typed command and exit, without touching the microphone
    #[arg(short, long)]
    text: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("🎙️ AURA v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load()?;
    if args.no_greeting {
        config.startup_greeting = false;
    }

    // One-shot text mode: route and answer a single command
    if let Some(command) = args.text {
        let (events_tx, _events_rx) = tokio::sync::mpsc::unbounded_channel();
        let registry = HandlerRegistry::new(&config, events_tx);
        let intent = intent::route(&command);
        info!("🧭 Routed '{}' as {}", command, intent.kind.name());
        // Volume and exit never reach the registry; when the assistant
        // runs they belong to the session, so answer them here.
        let response = match intent.kind {
            IntentKind::Volume => {
                let mut session = Session::new(&config);
                let reply = session.adjust_volume(intent.argument.as_deref().unwrap_or(&command));
                config.volume = session.volume();
                if let Err(e) = config.save() {
                    warn!("⚠️ Could not save configuration: {}", e);
                }
                reply
            }
            IntentKind::Exit => "Shutting down AURA. Goodbye!".to_string(),
            _ => registry.dispatch(&intent).await,
        };
        println!("{response}");
        return Ok(());
    }

    let factory = asr::create_factory(&config, args.device);
    let voice = tts::create_voice(&config)?;

    let orchestrator = Orchestrator::new(config, factory, voice);
    let handle = orchestrator.handle();
    let mut notifications = orchestrator.subscribe();

    // Surface observable activity; a GUI front-end would subscribe the
    // same way instead of reading logs
    tokio::spawn(async move {
        loop {
            match notifications.recv().await {
                Ok(Notification::Status(status)) => info!("🚦 {}", status),
                Ok(Notification::Level(level)) => debug!("🎚️ Input level: {:.2}", level),
                Ok(_) => {}
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Ctrl-C asks the orchestrator for an orderly stop
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("🛑 Interrupt received");
            handle.shutdown();
        }
    });

    orchestrator.run().await?;

    info!("👋 Goodbye");
    Ok(())
}
