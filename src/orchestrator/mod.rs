//! Voice interaction orchestrator
//!
//! Owns the session, the workers, and the channel between them. The
//! control task reacts to worker events one at a time: each event is
//! applied to the session, and the resulting actions are carried out
//! against the real workers. The session decides, the driver executes.

pub mod events;
pub mod session;

pub use events::{Action, AssistantEvent, Notification, SpeechRequest};
pub use session::{MicOwner, Phase, Session};

use crate::asr::RecognizerFactory;
use crate::audio::PhraseWindow;
use crate::config::Config;
use crate::error::{AuraError, AuraResult};
use crate::handlers::HandlerRegistry;
use crate::tts::Voice;
use crate::workers::{CommandWorker, SpeechSynthesizer, WakeWordWorker, Worker};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

/// How long a command capture waits for speech to begin
const COMMAND_SPEECH_TIMEOUT: Duration = Duration::from_secs(5);

/// Capacity of the notification broadcast; slow observers lose old
/// entries rather than stalling the control task
const NOTIFY_CAPACITY: usize = 64;

pub struct Orchestrator {
    config: Config,
    session: Session,
    registry: HandlerRegistry,
    factory: Arc<dyn RecognizerFactory>,
    synthesizer: SpeechSynthesizer,
    wake: Option<WakeWordWorker>,
    command: Option<CommandWorker>,
    events_tx: UnboundedSender<AssistantEvent>,
    events_rx: UnboundedReceiver<AssistantEvent>,
    notifications: broadcast::Sender<Notification>,
}

impl Orchestrator {
    pub fn new(
        config: Config,
        factory: Arc<dyn RecognizerFactory>,
        voice: Box<dyn Voice>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (notifications, _) = broadcast::channel(NOTIFY_CAPACITY);

        let registry = HandlerRegistry::new(&config, events_tx.clone());
        let synthesizer = SpeechSynthesizer::new(voice, events_tx.clone());
        let session = Session::new(&config);

        Self {
            config,
            session,
            registry,
            factory,
            synthesizer,
            wake: None,
            command: None,
            events_tx,
            events_rx,
            notifications,
        }
    }

    /// Control surface for signals arriving from outside the event loop
    pub fn handle(&self) -> Handle {
        Handle {
            events: self.events_tx.clone(),
        }
    }

    /// Observe status labels, transcripts, responses, and level samples
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run the event loop until shutdown
    pub async fn run(mut self) -> AuraResult<()> {
        if self.config.enable_wake_word {
            self.start_wake_worker();
        }

        if self.config.startup_greeting {
            let request = self
                .session
                .speech_request("AURA Voice Assistant is ready. Say 'Hey AURA' to activate.".to_string());
            self.say(request);
        } else if self.config.always_listen {
            // Nothing spoken at startup, so kick the capture loop off directly
            let _ = self.events_tx.send(AssistantEvent::Activate);
        }

        info!("✅ Assistant ready");
        self.notify(Notification::Status("Ready"));

        while let Some(event) = self.events_rx.recv().await {
            if self.process(event).await {
                break;
            }
        }

        self.shutdown();
        Ok(())
    }

    /// Apply one event; true means the loop should exit
    async fn process(&mut self, event: AssistantEvent) -> bool {
        // The driver keeps its own copy of the settings for worker
        // construction; the session applies the rest.
        if let AssistantEvent::SettingsApplied(config) = &event {
            if config.gaming_mode != self.config.gaming_mode {
                let mode = if config.gaming_mode { "Gaming" } else { "Normal" };
                info!("🖥️ Mode changed to: {}", mode);
            }
            self.config = config.clone();
        }

        let actions = self.session.apply(event);
        let mut quit = false;
        for action in actions {
            quit = self.execute(action).await || quit;
        }

        // Voice volume changes are persisted, same as a settings edit
        if self.session.volume() != self.config.volume {
            self.config.volume = self.session.volume();
            if let Err(e) = self.config.save() {
                warn!("⚠️ Could not save configuration: {}", e);
            }
        }

        quit
    }

    async fn execute(&mut self, action: Action) -> bool {
        match action {
            Action::PauseWake => {
                if let Some(worker) = &self.wake {
                    worker.pause();
                }
            }
            Action::ResumeWake => self.resume_wake(),
            Action::RestartWake => self.restart_wake(),
            Action::StartCommandCapture => self.start_command_capture(),
            Action::Dispatch(intent) => {
                let response = self.registry.dispatch(&intent).await;
                info!("💬 Response: {}", response);
                self.notify(Notification::Response(response.clone()));
                let request = self.session.speech_request(response);
                self.say(request);
            }
            Action::Speak(request) => self.say(request),
            Action::Notify(notification) => self.notify(notification),
            Action::Quit => return true,
        }
        false
    }

    fn say(&mut self, request: SpeechRequest) {
        let text = request.text.clone();
        match self.synthesizer.speak(request) {
            Ok(()) => {}
            Err(AuraError::SynthesizerBusy) => {
                debug!("🗣️ Synthesizer busy; holding phrase for later");
                self.session.queue_announcement(text);
            }
            Err(e) => {
                error!("❌ Speech request failed: {}", e);
                // Keep the state machine moving as if the phrase ran
                let _ = self.events_tx.send(AssistantEvent::SpeechError(e.to_string()));
                let _ = self.events_tx.send(AssistantEvent::SpeechFinished);
            }
        }
    }

    fn notify(&self, notification: Notification) {
        // No receivers is fine; notifications are fire-and-forget
        let _ = self.notifications.send(notification);
    }

    fn start_wake_worker(&mut self) {
        info!(
            "👂 Starting wake word detection ({} phrases)",
            self.config.wake_phrases.len()
        );
        // Mid-interaction the microphone belongs to the command capture
        // or the playback window; a worker built now starts paused, and
        // the speech-finish transition decides when it listens again.
        let worker = if self.session.phase() == Phase::Idle {
            WakeWordWorker::spawn(
                Arc::clone(&self.factory),
                &self.config.wake_phrases,
                self.events_tx.clone(),
            )
        } else {
            WakeWordWorker::spawn_paused(
                Arc::clone(&self.factory),
                &self.config.wake_phrases,
                self.events_tx.clone(),
            )
        };
        self.wake = Some(worker);
    }

    fn resume_wake(&self) {
        match &self.wake {
            Some(worker) if worker.is_alive() => worker.resume(),
            Some(_) => {
                warn!("⚠️ Wake word worker is no longer running; wake detection stays off")
            }
            None => {}
        }
    }

    /// Reconcile the wake word worker with the current settings
    fn restart_wake(&mut self) {
        if let Some(mut worker) = self.wake.take() {
            worker.stop();
        }
        if self.config.enable_wake_word {
            self.start_wake_worker();
        } else {
            info!("🔇 Wake word detection disabled");
        }
    }

    fn start_command_capture(&mut self) {
        // Reap the previous one-shot worker before starting the next
        if let Some(mut finished) = self.command.take() {
            finished.stop();
        }

        let window = PhraseWindow::new(
            COMMAND_SPEECH_TIMEOUT,
            Duration::from_secs(self.config.command_timeout),
        );
        self.command = Some(CommandWorker::spawn(
            Arc::clone(&self.factory),
            window,
            self.events_tx.clone(),
        ));
    }

    fn shutdown(&mut self) {
        info!("👋 Shutting down");
        if let Some(mut worker) = self.wake.take() {
            worker.stop();
        }
        if let Some(mut worker) = self.command.take() {
            worker.stop();
        }
        self.synthesizer.stop();
        info!("✅ All workers stopped");
    }
}

/// Cloneable control surface: activation, settings, and shutdown
/// signals from outside the event loop (CLI, signal handler)
#[derive(Clone)]
pub struct Handle {
    events: UnboundedSender<AssistantEvent>,
}

impl Handle {
    /// Behave as if the wake phrase was just heard
    pub fn activate(&self) {
        let _ = self.events.send(AssistantEvent::Activate);
    }

    pub fn apply_settings(&self, config: Config) {
        let _ = self.events.send(AssistantEvent::SettingsApplied(config));
    }

    pub fn clear_history(&self) {
        let _ = self.events.send(AssistantEvent::ClearHistory);
    }

    pub fn shutdown(&self) {
        let _ = self.events.send(AssistantEvent::ShutdownRequested);
    }
}
