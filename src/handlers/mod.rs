//! Intent handlers
//!
//! Each handler turns a routed intent into one spoken sentence. The
//! contract is strict: a handler may hit the network or launch a
//! process, but every failure comes back as a user-facing sentence,
//! never as an error the orchestrator has to interpret.

use crate::config::Config;
use crate::intent::{Intent, IntentKind};
use crate::orchestrator::events::AssistantEvent;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

pub mod apps;
pub mod basic;
pub mod system;
pub mod timer;
pub mod web;

#[async_trait]
pub trait Handler: Send + Sync {
    /// Produce the spoken response for one routed command
    async fn handle(&self, argument: Option<&str>) -> String;
}

pub struct HandlerRegistry {
    handlers: HashMap<IntentKind, Box<dyn Handler>>,
}

impl HandlerRegistry {
    /// Wire up the full handler set from the configuration
    pub fn new(config: &Config, events: UnboundedSender<AssistantEvent>) -> Self {
        let mut handlers: HashMap<IntentKind, Box<dyn Handler>> = HashMap::new();

        handlers.insert(IntentKind::Time, Box::new(basic::TimeHandler));
        handlers.insert(IntentKind::Date, Box::new(basic::DateHandler));
        handlers.insert(IntentKind::Joke, Box::new(basic::JokeHandler));
        handlers.insert(IntentKind::Help, Box::new(basic::HelpHandler));
        handlers.insert(IntentKind::Identity, Box::new(basic::IdentityHandler));
        handlers.insert(IntentKind::Calculate, Box::new(basic::CalculateHandler));
        handlers.insert(IntentKind::Fallback, Box::new(basic::FallbackHandler));

        handlers.insert(
            IntentKind::Weather,
            Box::new(web::WeatherHandler::new(&config.openweather_api_key)),
        );
        handlers.insert(IntentKind::Search, Box::new(web::SearchHandler));
        handlers.insert(
            IntentKind::Knowledge,
            Box::new(web::KnowledgeHandler::new(&config.wolfram_alpha_key)),
        );

        handlers.insert(IntentKind::OpenApp, Box::new(apps::OpenAppHandler::discover()));

        handlers.insert(IntentKind::SystemStatus, Box::new(system::SystemStatusHandler));
        handlers.insert(IntentKind::Brightness, Box::new(system::BrightnessHandler));
        handlers.insert(IntentKind::Shutdown, Box::new(system::ShutdownHandler));
        handlers.insert(IntentKind::Restart, Box::new(system::RestartHandler));
        handlers.insert(IntentKind::Settings, Box::new(system::SettingsHandler));

        handlers.insert(
            IntentKind::Timer,
            Box::new(timer::TimerHandler::new(events, config.volume)),
        );

        Self { handlers }
    }

    /// Run the handler selected by the router and return its response
    pub async fn dispatch(&self, intent: &Intent) -> String {
        debug!("🎯 Dispatching {} handler", intent.kind.name());
        match self.handlers.get(&intent.kind) {
            Some(handler) => handler.handle(intent.argument.as_deref()).await,
            None => {
                warn!("⚠️ No handler registered for {}", intent.kind.name());
                "I'm not sure how to help with that. Try asking for help to see what commands I support."
                    .to_string()
            }
        }
    }
}
