//! Intent Router
//!
//! Ordered first-match routing of recognized text to handler intents.
//! The priority order is a contract: earlier predicates win ties, so
//! "what is 2 + 2" resolves to Calculate and "what is the weather"
//! resolves to Weather before either can reach Knowledge.

use lazy_static::lazy_static;
use regex::Regex;

/// Handler tags in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentKind {
    Time,
    Date,
    Weather,
    OpenApp,
    Search,
    Joke,
    SystemStatus,
    Timer,
    Volume,
    Help,
    Identity,
    Calculate,
    Brightness,
    Shutdown,
    Restart,
    Settings,
    Knowledge,
    Exit,
    Fallback,
}

impl IntentKind {
    /// Short label for status lines and logs
    pub fn name(&self) -> &'static str {
        match self {
            IntentKind::Time => "time",
            IntentKind::Date => "date",
            IntentKind::Weather => "weather",
            IntentKind::OpenApp => "open",
            IntentKind::Search => "search",
            IntentKind::Joke => "joke",
            IntentKind::SystemStatus => "system-status",
            IntentKind::Timer => "timer",
            IntentKind::Volume => "volume",
            IntentKind::Help => "help",
            IntentKind::Identity => "identity",
            IntentKind::Calculate => "calculate",
            IntentKind::Brightness => "brightness",
            IntentKind::Shutdown => "shutdown",
            IntentKind::Restart => "restart",
            IntentKind::Settings => "settings",
            IntentKind::Knowledge => "knowledge",
            IntentKind::Exit => "exit",
            IntentKind::Fallback => "fallback",
        }
    }
}

/// A routed command: the selected handler plus any extracted argument
#[derive(Debug, Clone, PartialEq)]
pub struct Intent {
    pub kind: IntentKind,
    pub argument: Option<String>,
}

impl Intent {
    fn new(kind: IntentKind, argument: Option<String>) -> Self {
        Self { kind, argument }
    }
}

const TIME_KEYWORDS: &[&str] = &["what time", "current time"];
const DATE_KEYWORDS: &[&str] = &["what date", "today's date", "what day"];
const OPEN_VERBS: &[&str] = &["open", "launch", "start", "run"];
const STATUS_KEYWORDS: &[&str] = &["system", "status", "resources"];
const KNOWLEDGE_KEYWORDS: &[&str] = &["wolfram", "what is", "what's", "how much", "how many"];
const EXIT_KEYWORDS: &[&str] = &["exit", "quit", "close"];

lazy_static! {
    static ref WEATHER_RE: Regex =
        Regex::new(r"(?i)(?:weather|forecast)\s+(?:in|for|at)\s+(.+?)\s*\??\s*$").unwrap();
    static ref OPEN_RE: Regex =
        Regex::new(r"(?i)\b(?:open|launch|start|run)\s+(.+?)\s*[.?]?\s*$").unwrap();
    static ref SEARCH_RE: Regex =
        Regex::new(r"(?i)\b(?:search|look up|find)\s+(?:for\s+)?(.+?)\s*\??\s*$").unwrap();
    static ref CALC_RE: Regex =
        Regex::new(r"(\d+(?:\.\d+)?)\s*([+\-*/x×])\s*(\d+(?:\.\d+)?)").unwrap();
    static ref KNOWLEDGE_RE: Regex =
        Regex::new(r"(?i)(?:wolfram|what is|what's|how much|how many)\s+(.+?)\s*\??\s*$").unwrap();
}

/// Route free text to an intent, first match wins
pub fn route(text: &str) -> Intent {
    let lower = text.to_lowercase();

    if contains_any(&lower, TIME_KEYWORDS) {
        return Intent::new(IntentKind::Time, None);
    }

    if contains_any(&lower, DATE_KEYWORDS) {
        return Intent::new(IntentKind::Date, None);
    }

    if lower.contains("weather") || lower.contains("forecast") {
        return Intent::new(IntentKind::Weather, extract(&WEATHER_RE, text));
    }

    // Word-bounded so "restart" cannot match "start" and shadow the
    // restart predicate further down the list.
    if OPEN_VERBS.iter().any(|v| has_word(&lower, v)) {
        return Intent::new(IntentKind::OpenApp, extract(&OPEN_RE, text));
    }

    if has_word(&lower, "search") || lower.contains("look up") || has_word(&lower, "find") {
        return Intent::new(IntentKind::Search, extract(&SEARCH_RE, text));
    }

    if lower.contains("joke") {
        return Intent::new(IntentKind::Joke, None);
    }

    if contains_any(&lower, STATUS_KEYWORDS) {
        return Intent::new(IntentKind::SystemStatus, None);
    }

    if lower.contains("timer") || lower.contains("countdown") {
        return Intent::new(IntentKind::Timer, Some(text.to_string()));
    }

    if lower.contains("volume") || lower.contains("mute") {
        return Intent::new(IntentKind::Volume, Some(text.to_string()));
    }

    if lower.contains("help") {
        return Intent::new(IntentKind::Help, None);
    }

    if lower.contains("who are you") {
        return Intent::new(IntentKind::Identity, None);
    }

    if lower.contains("calculate") || CALC_RE.is_match(&lower) {
        let expr = CALC_RE.find(text).map(|m| m.as_str().to_string());
        return Intent::new(IntentKind::Calculate, expr);
    }

    if lower.contains("brightness") {
        return Intent::new(IntentKind::Brightness, Some(text.to_string()));
    }

    if lower.contains("shutdown") || lower.contains("shut down") {
        return Intent::new(IntentKind::Shutdown, None);
    }

    if lower.contains("restart") || lower.contains("reboot") {
        return Intent::new(IntentKind::Restart, None);
    }

    if lower.contains("settings") {
        return Intent::new(IntentKind::Settings, None);
    }

    if contains_any(&lower, KNOWLEDGE_KEYWORDS) {
        let query = extract(&KNOWLEDGE_RE, text).or_else(|| Some(text.to_string()));
        return Intent::new(IntentKind::Knowledge, query);
    }

    if contains_any(&lower, EXIT_KEYWORDS) {
        return Intent::new(IntentKind::Exit, None);
    }

    Intent::new(IntentKind::Fallback, Some(text.to_string()))
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| text.contains(kw))
}

fn has_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .any(|token| token == word)
}

fn extract(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}
