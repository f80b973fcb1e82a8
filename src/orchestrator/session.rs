//! Session state and the transition function
//!
//! The session is mutated only by the orchestrator's control task.
//! `apply` is a pure transition: it takes one event and returns the
//! actions the driver should carry out, so every state-machine path
//! can be tested without a single worker running.
//!
//! Microphone discipline lives here: at most one capturing worker at a
//! time, and the wake word worker stays paused from the moment speech
//! playback starts until it finishes, so the assistant never hears its
//! own voice.

use crate::asr::RecognitionResult;
use crate::config::{Config, MAX_VOLUME};
use crate::intent::{self, IntentKind};
use crate::orchestrator::events::{Action, AssistantEvent, Notification, SpeechRequest};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::VecDeque;
use tracing::{debug, error, info, warn};

lazy_static! {
    static ref VOLUME_RE: Regex = Regex::new(r"volume\s+(?:to\s+)?(\d+)(?:\s+percent)?").unwrap();
}

/// Where the assistant is in one interaction cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Listening,
    Capturing,
    Processing,
    Speaking,
}

impl Phase {
    /// Status label shown on the notification surface
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Idle => "Ready",
            Phase::Listening | Phase::Capturing => "Listening...",
            Phase::Processing => "Processing...",
            Phase::Speaking => "Speaking...",
        }
    }
}

/// Which worker currently holds microphone access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MicOwner {
    WakeWord,
    Command,
}

pub struct Session {
    phase: Phase,
    mic_owner: Option<MicOwner>,
    always_listen: bool,
    wake_enabled: bool,
    volume: u8,
    history: Vec<String>,
    pending_say: VecDeque<String>,
    pending_shutdown: bool,
    wake_fault_reported: bool,
}

impl Session {
    pub fn new(config: &Config) -> Self {
        Self {
            phase: Phase::Idle,
            mic_owner: if config.enable_wake_word {
                Some(MicOwner::WakeWord)
            } else {
                None
            },
            always_listen: config.always_listen,
            wake_enabled: config.enable_wake_word,
            volume: config.volume.min(MAX_VOLUME),
            history: Vec::new(),
            pending_say: VecDeque::new(),
            pending_shutdown: false,
            wake_fault_reported: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mic_owner(&self) -> Option<MicOwner> {
        self.mic_owner
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn is_shutting_down(&self) -> bool {
        self.pending_shutdown
    }

    /// Apply one event and return the actions the driver must execute
    pub fn apply(&mut self, event: AssistantEvent) -> Vec<Action> {
        match event {
            AssistantEvent::WakeDetected | AssistantEvent::Activate => self.begin_capture(),
            AssistantEvent::WakeFault(msg) => self.on_wake_fault(msg),
            AssistantEvent::CaptureStarted => {
                if self.phase == Phase::Listening {
                    self.phase = Phase::Capturing;
                }
                Vec::new()
            }
            AssistantEvent::CommandOutcome(outcome) => self.on_command_outcome(outcome),
            AssistantEvent::Level(sample) => {
                vec![Action::Notify(Notification::Level(sample.value))]
            }
            AssistantEvent::SpeechStarted => {
                let mut actions = vec![Action::PauseWake];
                self.set_phase(Phase::Speaking, &mut actions);
                actions
            }
            AssistantEvent::SpeechError(msg) => {
                error!("❌ Speech failure: {}", msg);
                vec![Action::Notify(Notification::Status("Error"))]
            }
            AssistantEvent::SpeechFinished => self.on_speech_finished(),
            AssistantEvent::TimerElapsed(message) => self.announce(message),
            AssistantEvent::SettingsApplied(config) => self.on_settings(config),
            AssistantEvent::ClearHistory => {
                self.history.clear();
                info!("📝 Command history cleared");
                Vec::new()
            }
            AssistantEvent::ShutdownRequested => vec![Action::Quit],
        }
    }

    /// Speak `text` when idle, otherwise hold it until the current
    /// interaction has finished.
    pub fn queue_announcement(&mut self, text: String) {
        self.pending_say.push_back(text);
    }

    /// Build the actions for a handler response that should be spoken now
    pub fn respond(&mut self, text: String) -> Vec<Action> {
        vec![
            Action::Notify(Notification::Response(text.clone())),
            Action::Speak(self.speech_request(text)),
        ]
    }

    /// Build a speech request at the session's current volume
    pub fn speech_request(&self, text: String) -> SpeechRequest {
        SpeechRequest::new(text, self.volume as f32 / 100.0)
    }

    fn set_phase(&mut self, phase: Phase, actions: &mut Vec<Action>) {
        let label_changed = phase.label() != self.phase.label();
        self.phase = phase;
        if label_changed {
            actions.push(Action::Notify(Notification::Status(phase.label())));
        }
    }

    fn begin_capture(&mut self) -> Vec<Action> {
        if self.phase != Phase::Idle {
            debug!("🎯 Activation ignored while {}", self.phase.label());
            return Vec::new();
        }
        if self.mic_owner == Some(MicOwner::Command) {
            debug_assert!(false, "capture requested while a capture is running");
            warn!("⚠️ Refusing to start a capture while the microphone is busy");
            return Vec::new();
        }

        // Wake word listening hands the microphone over to the command
        // capture; it is paused before the capture starts.
        self.mic_owner = Some(MicOwner::Command);
        let mut actions = vec![Action::PauseWake];
        self.set_phase(Phase::Listening, &mut actions);
        actions.push(Action::Notify(Notification::Response(
            "I'm listening. What can I do for you?".to_string(),
        )));
        actions.push(Action::StartCommandCapture);
        actions
    }

    fn on_command_outcome(&mut self, outcome: RecognitionResult) -> Vec<Action> {
        if self.phase != Phase::Listening && self.phase != Phase::Capturing {
            debug!("📝 Stale command outcome ignored while {}", self.phase.label());
            return Vec::new();
        }
        self.mic_owner = None;

        match outcome {
            RecognitionResult::Recognized(text) => {
                info!("📝 Command received: {}", text);
                self.history.push(text.clone());

                let mut actions = vec![Action::Notify(Notification::Transcript(text.clone()))];
                self.set_phase(Phase::Processing, &mut actions);

                let intent = intent::route(&text);
                info!("🧭 Routed '{}' as {}", text, intent.kind.name());
                match intent.kind {
                    // Volume changes mutate session state, so they are
                    // handled on the control task instead of dispatched.
                    IntentKind::Volume => {
                        let argument = intent.argument.unwrap_or(text);
                        let response = self.adjust_volume(&argument);
                        actions.extend(self.respond(response));
                    }
                    IntentKind::Exit => {
                        self.pending_shutdown = true;
                        actions.extend(self.respond("Shutting down AURA. Goodbye!".to_string()));
                    }
                    _ => actions.push(Action::Dispatch(intent)),
                }
                actions
            }
            RecognitionResult::Unrecognized => {
                info!("🤷 Speech not understood");
                if self.always_listen {
                    // Hands-free mode treats silence as normal and goes
                    // straight back to capture instead of apologizing
                    // on every quiet window.
                    self.phase = Phase::Idle;
                    return self.begin_capture();
                }
                self.respond("Sorry, I didn't catch that".to_string())
            }
            RecognitionResult::ServiceError(msg) => {
                warn!("⚠️ Recognition service error: {}", msg);
                self.respond(format!(
                    "Sorry, speech recognition service is unavailable: {msg}"
                ))
            }
        }
    }

    fn on_speech_finished(&mut self) -> Vec<Action> {
        if let Some(next) = self.pending_say.pop_front() {
            // Stay in Speaking; the wake word worker remains paused
            // across back-to-back phrases.
            return vec![Action::Speak(self.speech_request(next))];
        }
        if self.pending_shutdown {
            return vec![Action::Quit];
        }

        if self.always_listen {
            // Straight back to capture without a fresh wake phrase
            self.phase = Phase::Idle;
            self.mic_owner = None;
            return self.begin_capture();
        }

        self.mic_owner = if self.wake_enabled {
            Some(MicOwner::WakeWord)
        } else {
            None
        };
        let mut actions = vec![Action::ResumeWake];
        self.set_phase(Phase::Idle, &mut actions);
        actions
    }

    fn on_wake_fault(&mut self, msg: String) -> Vec<Action> {
        error!("❌ Wake word fault: {}", msg);
        let mut actions = vec![Action::Notify(Notification::Status("Error"))];
        if !self.wake_fault_reported {
            self.wake_fault_reported = true;
            actions.extend(self.announce("I'm having trouble accessing the microphone.".to_string()));
        }
        actions
    }

    fn on_settings(&mut self, config: Config) -> Vec<Action> {
        info!("🛠️ Settings applied");
        self.volume = config.volume.min(MAX_VOLUME);
        self.always_listen = config.always_listen;
        self.wake_enabled = config.enable_wake_word;
        self.wake_fault_reported = false;
        if self.phase == Phase::Idle {
            self.mic_owner = if self.wake_enabled {
                Some(MicOwner::WakeWord)
            } else {
                None
            };
        }
        vec![Action::RestartWake]
    }

    fn announce(&mut self, text: String) -> Vec<Action> {
        if self.phase == Phase::Idle {
            vec![Action::Speak(self.speech_request(text))]
        } else {
            debug!("💬 Deferring announcement while {}", self.phase.label());
            self.pending_say.push_back(text);
            Vec::new()
        }
    }

    /// Apply a spoken volume command and return the confirmation
    /// sentence. Also the volume path for one-shot text mode, which
    /// has no running interaction to route through.
    pub fn adjust_volume(&mut self, command: &str) -> String {
        let command = command.to_lowercase();

        if let Some(caps) = VOLUME_RE.captures(&command) {
            if let Ok(level) = caps[1].parse::<i64>() {
                self.volume = level.clamp(0, MAX_VOLUME as i64) as u8;
                return format!("Volume set to {} percent.", self.volume);
            }
        }

        if command.contains("up") || command.contains("increase") {
            self.volume = (self.volume + 10).min(MAX_VOLUME);
            format!("Volume increased to {} percent.", self.volume)
        } else if command.contains("down") || command.contains("decrease") || command.contains("lower")
        {
            self.volume = self.volume.saturating_sub(10);
            format!("Volume decreased to {} percent.", self.volume)
        } else if command.contains("mute") {
            self.volume = 0;
            "Volume muted.".to_string()
        } else {
            format!(
                "Current volume is {} percent. You can say 'volume up', 'volume down', or 'volume to 50' to adjust it.",
                self.volume
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::events::AudioLevel;

    fn session() -> Session {
        Session::new(&Config::default())
    }

    fn always_listen_session() -> Session {
        let config = Config {
            always_listen: true,
            ..Config::default()
        };
        Session::new(&config)
    }

    fn spoken_texts(actions: &[Action]) -> Vec<String> {
        actions
            .iter()
            .filter_map(|a| match a {
                Action::Speak(req) => Some(req.text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Drive the session to the middle of a command capture
    fn to_capturing(session: &mut Session) {
        session.apply(AssistantEvent::WakeDetected);
        session.apply(AssistantEvent::CaptureStarted);
        assert_eq!(session.phase(), Phase::Capturing);
    }

    /// Drive the session all the way to Speaking
    fn to_speaking(session: &mut Session, command: &str) {
        to_capturing(session);
        session.apply(AssistantEvent::CommandOutcome(RecognitionResult::Recognized(
            command.to_string(),
        )));
        session.apply(AssistantEvent::SpeechStarted);
        assert_eq!(session.phase(), Phase::Speaking);
    }

    #[test]
    fn test_wake_detection_starts_capture() {
        let mut s = session();
        let actions = s.apply(AssistantEvent::WakeDetected);

        assert!(actions.contains(&Action::PauseWake));
        assert!(actions.contains(&Action::StartCommandCapture));
        assert_eq!(s.phase(), Phase::Listening);
        assert_eq!(s.mic_owner(), Some(MicOwner::Command));
    }

    #[test]
    fn test_stale_wake_detection_is_ignored() {
        let mut s = session();
        to_capturing(&mut s);

        let actions = s.apply(AssistantEvent::WakeDetected);
        assert!(actions.is_empty());
        assert_eq!(s.phase(), Phase::Capturing);
    }

    #[test]
    fn test_recognized_command_is_dispatched() {
        let mut s = session();
        to_capturing(&mut s);

        let actions = s.apply(AssistantEvent::CommandOutcome(
            RecognitionResult::Recognized("what time is it".to_string()),
        ));

        assert_eq!(s.phase(), Phase::Processing);
        assert_eq!(s.history(), &["what time is it".to_string()]);
        assert!(actions.iter().any(|a| matches!(
            a,
            Action::Dispatch(intent) if intent.kind == IntentKind::Time
        )));
    }

    #[test]
    fn test_speech_finished_resumes_wake_listening() {
        let mut s = session();
        to_speaking(&mut s, "what time is it");

        let actions = s.apply(AssistantEvent::SpeechFinished);
        assert!(actions.contains(&Action::ResumeWake));
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.mic_owner(), Some(MicOwner::WakeWord));
    }

    #[test]
    fn test_always_listen_recaptures_after_speech() {
        let mut s = always_listen_session();
        to_speaking(&mut s, "what time is it");

        let actions = s.apply(AssistantEvent::SpeechFinished);
        assert!(actions.contains(&Action::StartCommandCapture));
        assert_eq!(s.phase(), Phase::Listening);
    }

    #[test]
    fn test_unrecognized_speaks_apology() {
        let mut s = session();
        to_capturing(&mut s);

        let actions = s.apply(AssistantEvent::CommandOutcome(RecognitionResult::Unrecognized));
        assert_eq!(spoken_texts(&actions), vec!["Sorry, I didn't catch that"]);
    }

    #[test]
    fn test_always_listen_recaptures_quietly_on_silence() {
        let mut s = always_listen_session();
        to_capturing(&mut s);

        let actions = s.apply(AssistantEvent::CommandOutcome(RecognitionResult::Unrecognized));
        assert!(spoken_texts(&actions).is_empty());
        assert!(actions.contains(&Action::StartCommandCapture));
        assert_eq!(s.phase(), Phase::Listening);
    }

    #[test]
    fn test_service_error_speaks_apology() {
        let mut s = session();
        to_capturing(&mut s);

        let actions = s.apply(AssistantEvent::CommandOutcome(
            RecognitionResult::ServiceError("connection refused".to_string()),
        ));
        let spoken = spoken_texts(&actions);
        assert_eq!(spoken.len(), 1);
        assert!(spoken[0].contains("speech recognition service is unavailable"));
    }

    #[test]
    fn test_volume_set_clamps_high_values() {
        let mut s = session();
        to_capturing(&mut s);

        let actions = s.apply(AssistantEvent::CommandOutcome(
            RecognitionResult::Recognized("set volume to 150".to_string()),
        ));

        assert_eq!(s.volume(), 100);
        assert_eq!(spoken_texts(&actions), vec!["Volume set to 100 percent."]);
    }

    #[test]
    fn test_volume_decrease_stops_at_zero() {
        let mut s = session();
        to_capturing(&mut s);
        s.apply(AssistantEvent::CommandOutcome(RecognitionResult::Recognized(
            "volume to 5".to_string(),
        )));
        assert_eq!(s.volume(), 5);

        // Finish the first interaction, then turn it down past zero
        s.apply(AssistantEvent::SpeechStarted);
        s.apply(AssistantEvent::SpeechFinished);
        to_capturing(&mut s);
        let actions = s.apply(AssistantEvent::CommandOutcome(
            RecognitionResult::Recognized("volume down".to_string()),
        ));

        assert_eq!(s.volume(), 0);
        assert_eq!(spoken_texts(&actions), vec!["Volume decreased to 0 percent."]);
    }

    #[test]
    fn test_volume_mute() {
        let mut s = session();
        to_capturing(&mut s);

        let actions = s.apply(AssistantEvent::CommandOutcome(
            RecognitionResult::Recognized("mute the volume".to_string()),
        ));
        assert_eq!(s.volume(), 0);
        assert_eq!(spoken_texts(&actions), vec!["Volume muted."]);
    }

    #[test]
    fn test_adjust_volume_answers_without_an_interaction() {
        // One-shot text mode calls this directly, with no capture running
        let mut s = session();
        assert_eq!(s.adjust_volume("volume up"), "Volume increased to 80 percent.");
        assert_eq!(s.adjust_volume("volume to 45"), "Volume set to 45 percent.");
        assert_eq!(s.volume(), 45);
    }

    #[test]
    fn test_exit_command_quits_after_goodbye() {
        let mut s = session();
        to_capturing(&mut s);

        let actions = s.apply(AssistantEvent::CommandOutcome(RecognitionResult::Recognized(
            "exit".to_string(),
        )));
        assert_eq!(spoken_texts(&actions), vec!["Shutting down AURA. Goodbye!"]);
        assert!(s.is_shutting_down());

        s.apply(AssistantEvent::SpeechStarted);
        let actions = s.apply(AssistantEvent::SpeechFinished);
        assert_eq!(actions, vec![Action::Quit]);
    }

    #[test]
    fn test_announcement_deferred_until_speech_finishes() {
        let mut s = session();
        to_speaking(&mut s, "set a timer for 1 second");

        // Fires while the response is still being spoken
        let actions = s.apply(AssistantEvent::TimerElapsed(
            "Your 1 second timer is complete!".to_string(),
        ));
        assert!(spoken_texts(&actions).is_empty());

        let actions = s.apply(AssistantEvent::SpeechFinished);
        assert_eq!(
            spoken_texts(&actions),
            vec!["Your 1 second timer is complete!"]
        );
        assert_eq!(s.phase(), Phase::Speaking);
    }

    #[test]
    fn test_announcement_spoken_directly_when_idle() {
        let mut s = session();
        let actions = s.apply(AssistantEvent::TimerElapsed(
            "Your 5 minutes timer is complete!".to_string(),
        ));
        assert_eq!(
            spoken_texts(&actions),
            vec!["Your 5 minutes timer is complete!"]
        );
    }

    #[test]
    fn test_speech_start_pauses_wake_and_finish_restores_idle() {
        let mut s = session();
        let actions = s.apply(AssistantEvent::SpeechStarted);
        assert!(actions.contains(&Action::PauseWake));
        assert_eq!(s.phase(), Phase::Speaking);

        let actions = s.apply(AssistantEvent::SpeechFinished);
        assert!(actions.contains(&Action::ResumeWake));
        assert_eq!(s.phase(), Phase::Idle);
    }

    #[test]
    fn test_wake_fault_reported_once() {
        let mut s = session();
        let first = s.apply(AssistantEvent::WakeFault("device gone".to_string()));
        assert_eq!(first.len(), 2);
        assert!(!spoken_texts(&first).is_empty());

        let second = s.apply(AssistantEvent::WakeFault("device gone".to_string()));
        assert_eq!(second, vec![Action::Notify(Notification::Status("Error"))]);
    }

    #[test]
    fn test_level_samples_are_forwarded() {
        let mut s = session();
        let actions = s.apply(AssistantEvent::Level(AudioLevel::now(0.42)));
        assert_eq!(actions, vec![Action::Notify(Notification::Level(0.42))]);
    }

    #[test]
    fn test_clear_history_empties_history() {
        let mut s = session();
        to_capturing(&mut s);
        s.apply(AssistantEvent::CommandOutcome(RecognitionResult::Recognized(
            "tell me a joke".to_string(),
        )));
        assert_eq!(s.history().len(), 1);

        let actions = s.apply(AssistantEvent::ClearHistory);
        assert!(actions.is_empty());
        assert!(s.history().is_empty());
    }

    #[test]
    fn test_settings_apply_updates_session() {
        let mut s = session();
        let config = Config {
            volume: 55,
            always_listen: true,
            enable_wake_word: false,
            ..Config::default()
        };

        let actions = s.apply(AssistantEvent::SettingsApplied(config));
        assert_eq!(actions, vec![Action::RestartWake]);
        assert_eq!(s.volume(), 55);
        assert_eq!(s.mic_owner(), None);
    }
}
