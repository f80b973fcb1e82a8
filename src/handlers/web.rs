//! Handlers that talk to the outside world: weather lookups, web
//! searches, and Wolfram Alpha knowledge queries.

use crate::handlers::Handler;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::process::Command;
use std::time::Duration;
use tracing::{debug, warn};

const OPENWEATHER_URL: &str = "http://api.openweathermap.org/data/2.5/weather";
const WOLFRAM_URL: &str = "https://api.wolframalpha.com/v1/conversational";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    weather: Vec<WeatherCondition>,
    main: WeatherMain,
}

#[derive(Debug, Deserialize)]
struct WeatherCondition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct WeatherMain {
    temp: f64,
}

pub struct WeatherHandler {
    client: Client,
    api_key: String,
}

impl WeatherHandler {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
        }
    }

    async fn fetch(&self, location: &str) -> Result<WeatherResponse> {
        let response = self
            .client
            .get(OPENWEATHER_URL)
            .timeout(REQUEST_TIMEOUT)
            .query(&[
                ("q", location),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<WeatherResponse>()
            .await?;
        Ok(response)
    }
}

#[async_trait]
impl Handler for WeatherHandler {
    async fn handle(&self, argument: Option<&str>) -> String {
        let location = argument.unwrap_or("your location");

        if self.api_key.is_empty() {
            return "I need an OpenWeatherMap API key to check the weather. \
                    You can add one in the configuration file."
                .to_string();
        }

        match self.fetch(location).await {
            Ok(data) => {
                let description = data
                    .weather
                    .first()
                    .map(|c| c.description.as_str())
                    .unwrap_or("unknown conditions");
                format!(
                    "The weather in {} is {} with a temperature of {}°C.",
                    location, description, data.main.temp
                )
            }
            Err(e) => {
                warn!("⚠️ Weather lookup failed: {}", e);
                format!("Sorry, I couldn't fetch the weather data for {location}.")
            }
        }
    }
}

pub struct SearchHandler;

#[async_trait]
impl Handler for SearchHandler {
    async fn handle(&self, argument: Option<&str>) -> String {
        let Some(query) = argument else {
            return "What would you like me to search for?".to_string();
        };

        let search_url = format!(
            "https://www.google.com/search?q={}",
            urlencoding::encode(query)
        );
        debug!("🔍 Opening search: {}", search_url);

        match Command::new("xdg-open").arg(&search_url).spawn() {
            Ok(_) => format!("Searching for '{query}'."),
            Err(e) => {
                warn!("⚠️ Error performing search: {}", e);
                "I had trouble opening the search.".to_string()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct WolframReply {
    result: Option<String>,
}

pub struct KnowledgeHandler {
    client: Client,
    api_key: String,
}

impl KnowledgeHandler {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl Handler for KnowledgeHandler {
    async fn handle(&self, argument: Option<&str>) -> String {
        let Some(query) = argument else {
            return "I'm not sure how to answer that question.".to_string();
        };

        if self.api_key.is_empty() {
            return "I need a Wolfram Alpha API key to answer that. \
                    You can add one in the configuration file."
                .to_string();
        }

        let response = self
            .client
            .get(WOLFRAM_URL)
            .timeout(REQUEST_TIMEOUT)
            .query(&[("appid", self.api_key.as_str()), ("i", query)])
            .send()
            .await;

        match response {
            Ok(r) if r.status().is_success() => {
                let answer = r
                    .json::<WolframReply>()
                    .await
                    .ok()
                    .and_then(|reply| reply.result)
                    .unwrap_or_else(|| {
                        "I couldn't find a specific answer for that query.".to_string()
                    });
                format!("The answer is: {answer}")
            }
            Ok(r) => format!(
                "Failed to fetch data from Wolfram Alpha. Status code: {}",
                r.status().as_u16()
            ),
            Err(e) => {
                warn!("⚠️ Knowledge query failed: {}", e);
                "Sorry, I couldn't fetch the answer for that query.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_weather_without_api_key() {
        let handler = WeatherHandler::new("");
        let response = handler.handle(Some("Boston")).await;
        assert!(response.contains("OpenWeatherMap API key"));
    }

    #[tokio::test]
    async fn test_knowledge_without_api_key() {
        let handler = KnowledgeHandler::new("");
        let response = handler.handle(Some("the speed of light")).await;
        assert!(response.contains("Wolfram Alpha API key"));
    }

    #[tokio::test]
    async fn test_knowledge_without_query() {
        let handler = KnowledgeHandler::new("DEMO-KEY");
        let response = handler.handle(None).await;
        assert_eq!(response, "I'm not sure how to answer that question.");
    }

    #[test]
    fn test_weather_response_parsing() {
        let json = r#"{
            "weather": [{"description": "light rain", "id": 500}],
            "main": {"temp": 12.3, "humidity": 81}
        }"#;
        let parsed: WeatherResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.weather[0].description, "light rain");
        assert_eq!(parsed.main.temp, 12.3);
    }
}
