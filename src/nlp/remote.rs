//! Remote chat-completion classifier (Azure OpenAI deployment).

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{config::RemoteSettings, error::ClassifierError, nlp::label::Label};

/// Hard bound on a single remote classification call.
pub const REMOTE_TIMEOUT: Duration = Duration::from_secs(15);

/// Confidence assigned to any non-`none` remote label; the endpoint returns no probabilities.
pub const REMOTE_CONFIDENCE: f64 = 0.95;

const SYSTEM_PROMPT: &str = "You are a classification assistant for construction site reports.\n\
Classify the following sentence into exactly one of these labels:\n\
risk, delay, material_shortage, none.\n\n\
Return only the label word with no explanation.\n";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize, Default)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize, Default)]
struct Choice {
    #[serde(default)]
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize, Default)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for the remote label endpoint.
#[derive(Debug, Clone)]
pub struct RemoteClassifier {
    client: Client,
    settings: RemoteSettings,
}

impl RemoteClassifier {
    pub fn new(settings: RemoteSettings) -> Result<Self, ClassifierError> {
        Self::with_timeout(settings, REMOTE_TIMEOUT)
    }

    /// Same as [`RemoteClassifier::new`] with a custom per-call bound.
    pub fn with_timeout(settings: RemoteSettings, timeout: Duration) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .user_agent(concat!("site-report-nlp/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { client, settings })
    }

    pub fn is_configured(&self) -> bool {
        self.settings.is_configured()
    }

    /// Ask the deployment for exactly one label for `sentence`.
    pub async fn classify(&self, sentence: &str) -> Result<Label, ClassifierError> {
        let (Some(endpoint), Some(api_key), Some(deployment)) = (
            self.settings.endpoint.as_deref(),
            self.settings.api_key.as_deref(),
            self.settings.deployment.as_deref(),
        ) else {
            return Err(ClassifierError::RemoteConfigMissing);
        };

        let url = format!("{endpoint}/openai/deployments/{deployment}/chat/completions");
        let payload = ChatRequest {
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: sentence.trim(),
                },
            ],
            temperature: 0.0,
            max_tokens: 1,
        };

        let resp = self
            .client
            .post(&url)
            .query(&[("api-version", self.settings.api_version.as_str())])
            .header("api-key", api_key)
            .json(&payload)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClassifierError::RemoteStatus(status));
        }
        let body: ChatResponse = resp.json().await?;
        let Some(choice) = body.choices.into_iter().next() else {
            return Err(ClassifierError::RemoteMalformed("no choices in response".into()));
        };
        let content = choice.message.content.unwrap_or_default();
        let label = normalize_label(&content);
        debug!(raw = %content, %label, "remote classification");
        Ok(label)
    }
}

/// Map a raw model reply onto the label set.
///
/// Substring matching is a heuristic: a reply that merely mentions "material" is read
/// as a shortage even if the model meant something else.
pub fn normalize_label(raw: &str) -> Label {
    let content = raw.trim().to_lowercase();
    if let Ok(label) = content.parse::<Label>() {
        return label;
    }
    if content.contains("delay") {
        Label::Delay
    } else if content.contains("risk") {
        Label::Risk
    } else if content.contains("shortage") || content.contains("material") {
        Label::MaterialShortage
    } else {
        Label::None
    }
}

/// Fixed confidence for a remote label.
pub fn remote_confidence(label: Label) -> f64 {
    if label.is_actionable() {
        REMOTE_CONFIDENCE
    } else {
        0.0
    }
}
