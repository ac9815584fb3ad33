//! Language-model suggestions over an OpenAI-compatible chat completions API.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use spend_forecast::{SuggestionError, SuggestionPrompt, SuggestionSource, TemplateSuggestions};
use tracing::{debug, warn};

use crate::config::SuggestionSettings;

const SYSTEM_MESSAGE: &str = "You are a smart financial assistant helping the user understand \
    and improve their finances. Reply with text only, no styling.";

const MAX_TOKENS: u32 = 200;
const TEMPERATURE: f32 = 0.7;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Blocking chat-completions client.
///
/// Must be created, used and dropped outside of an async context.
pub struct ChatSuggestions {
    client: Client,
    settings: SuggestionSettings,
}

impl ChatSuggestions {
    /// Creates a client that gives up after the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: SuggestionSettings) -> Result<Self, SuggestionError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| SuggestionError::Request(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client, settings })
    }
}

impl SuggestionSource for ChatSuggestions {
    fn suggest(&self, prompt: &SuggestionPrompt) -> Result<String, SuggestionError> {
        let user_message = prompt.render();
        let request = ChatRequest {
            model: &self.settings.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_MESSAGE,
                },
                ChatMessage {
                    role: "user",
                    content: &user_message,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        debug!(category = %prompt.category, model = %self.settings.model, "Requesting suggestion");

        let response = self
            .client
            .post(&self.settings.endpoint)
            .bearer_auth(&self.settings.api_key)
            .json(&request)
            .send()
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SuggestionError::Status(status.as_u16()));
        }

        let body: ChatResponse = response.json().map_err(request_error)?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(SuggestionError::EmptyResponse)
    }
}

fn request_error(err: reqwest::Error) -> SuggestionError {
    if err.is_timeout() {
        SuggestionError::Timeout
    } else {
        SuggestionError::Request(err.to_string())
    }
}

/// Runs `f` with the configured suggestion source.
///
/// Uses the chat client when settings are present, and the built-in
/// templates otherwise or when the client cannot be created. Call from a
/// blocking context.
pub fn with_suggestions<T>(
    settings: Option<&SuggestionSettings>,
    f: impl FnOnce(&dyn SuggestionSource) -> T,
) -> T {
    match settings {
        Some(settings) => match ChatSuggestions::new(settings.clone()) {
            Ok(chat) => f(&chat),
            Err(err) => {
                warn!(error = %err, "Falling back to template suggestions");
                f(&TemplateSuggestions)
            }
        },
        None => f(&TemplateSuggestions),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use spend_forecast::Trend;
    use std::time::Duration;

    fn prompt() -> SuggestionPrompt {
        SuggestionPrompt {
            category: "Food".to_string(),
            predicted: Decimal::new(20000, 2),
            monthly_avg: Decimal::new(11500, 2),
            difference: Decimal::new(8500, 2),
            trend: Trend::Up,
        }
    }

    fn unreachable_settings() -> SuggestionSettings {
        SuggestionSettings {
            // Discard port, nothing listens there
            endpoint: "http://127.0.0.1:9/v1/chat/completions".to_string(),
            api_key: "sk-test".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            timeout: Duration::from_secs(2),
        }
    }

    #[test]
    fn test_unreachable_endpoint_is_an_error() {
        let chat = ChatSuggestions::new(unreachable_settings()).unwrap();
        let err = chat.suggest(&prompt()).unwrap_err();
        assert!(matches!(
            err,
            SuggestionError::Request(_) | SuggestionError::Timeout
        ));
    }

    #[test]
    fn test_templates_without_settings() {
        let text = with_suggestions(None, |source| source.suggest(&prompt())).unwrap();
        assert_eq!(
            text,
            "Your spending on Food is projected to increase. Consider reducing unnecessary expenses."
        );
    }

    #[test]
    fn test_request_body_shape() {
        let request = ChatRequest {
            model: "gpt-3.5-turbo",
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_MESSAGE,
                },
                ChatMessage {
                    role: "user",
                    content: "hello",
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "hello");
        assert_eq!(json["max_tokens"], 200);
    }

    #[test]
    fn test_reply_parsing() {
        let body: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"  Cook at home.  "}}]}"#,
        )
        .unwrap();
        assert_eq!(
            body.choices[0].message.content.as_deref().map(str::trim),
            Some("Cook at home.")
        );

        let empty: ChatResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.choices.is_empty());
    }
}
