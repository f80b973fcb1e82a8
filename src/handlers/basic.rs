//! Local handlers with no side effects: time, date, jokes, help,
//! identity, arithmetic, and the fallback response.

use crate::handlers::Handler;
use async_trait::async_trait;
use chrono::Local;
use lazy_static::lazy_static;
use rand::seq::SliceRandom;
use regex::Regex;

const CALCULATION_FAILED: &str = "I'm not sure how to perform that calculation.";

const JOKES: &[&str] = &[
    "Why don't scientists trust atoms? Because they make up everything!",
    "Why did the scarecrow win an award? Because he was outstanding in his field!",
    "I told my wife she was drawing her eyebrows too high. She looked surprised.",
    "What's the best thing about Switzerland? I don't know, but the flag is a big plus.",
    "Did you hear about the mathematician who's afraid of negative numbers? He'll stop at nothing to avoid them.",
    "Why do we tell actors to 'break a leg?' Because every play has a cast.",
    "Parallel lines have so much in common. It's a shame they'll never meet.",
    "I'm reading a book about anti-gravity. It's impossible to put down!",
    "I told my computer I needed a break, and now it won't stop sending me vacation ads.",
];

lazy_static! {
    static ref EXPR_RE: Regex =
        Regex::new(r"(-?\d+(?:\.\d+)?)\s*([+\-*/x×])\s*(-?\d+(?:\.\d+)?)").unwrap();
}

pub struct TimeHandler;

#[async_trait]
impl Handler for TimeHandler {
    async fn handle(&self, _argument: Option<&str>) -> String {
        format!("The current time is {}.", Local::now().format("%I:%M %p"))
    }
}

pub struct DateHandler;

#[async_trait]
impl Handler for DateHandler {
    async fn handle(&self, _argument: Option<&str>) -> String {
        format!("Today is {}.", Local::now().format("%A, %B %d, %Y"))
    }
}

pub struct JokeHandler;

#[async_trait]
impl Handler for JokeHandler {
    async fn handle(&self, _argument: Option<&str>) -> String {
        JOKES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(JOKES[0])
            .to_string()
    }
}

pub struct HelpHandler;

#[async_trait]
impl Handler for HelpHandler {
    async fn handle(&self, _argument: Option<&str>) -> String {
        "Here are some things you can say: 'what time is it', 'what's the weather', \
         'open Chrome', 'search for cats', 'tell me a joke', 'set a timer for 5 minutes', \
         or 'system status'."
            .to_string()
    }
}

pub struct IdentityHandler;

#[async_trait]
impl Handler for IdentityHandler {
    async fn handle(&self, _argument: Option<&str>) -> String {
        "I am AURA, your voice-activated assistant. I can help you with various tasks \
         like telling the time, opening applications, searching the web, and more!"
            .to_string()
    }
}

pub struct CalculateHandler;

#[async_trait]
impl Handler for CalculateHandler {
    async fn handle(&self, argument: Option<&str>) -> String {
        let Some(expression) = argument else {
            return CALCULATION_FAILED.to_string();
        };
        let Some(caps) = EXPR_RE.captures(expression) else {
            return CALCULATION_FAILED.to_string();
        };

        let (Ok(lhs), Ok(rhs)) = (caps[1].parse::<f64>(), caps[3].parse::<f64>()) else {
            return CALCULATION_FAILED.to_string();
        };

        let result = match &caps[2] {
            "+" => lhs + rhs,
            "-" => lhs - rhs,
            "*" | "x" | "×" => lhs * rhs,
            "/" => {
                if rhs == 0.0 {
                    return "I can't divide by zero.".to_string();
                }
                lhs / rhs
            }
            _ => return CALCULATION_FAILED.to_string(),
        };

        format!("The result is {result}.")
    }
}

pub struct FallbackHandler;

#[async_trait]
impl Handler for FallbackHandler {
    async fn handle(&self, _argument: Option<&str>) -> String {
        "I'm not sure how to help with that. Try asking for help to see what commands I support."
            .to_string()
    }
}
