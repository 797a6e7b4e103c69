use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Request body for one chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: ChatRequestMessage,
    pub location_hint: LocationHint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequestMessage {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationHint {
    pub time_zone: String,
}

impl ChatRequest {
    pub fn new(text: impl Into<String>, time_zone: impl Into<String>) -> Self {
        Self {
            message: ChatRequestMessage { text: text.into() },
            location_hint: LocationHint {
                time_zone: time_zone.into(),
            },
        }
    }
}

/// Body returned by `POST {base}/conversations`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub conversation_id: Option<String>,
}

impl CreateConversationResponse {
    /// First non-blank of `id` and `conversationId`.
    pub fn session_id(&self) -> Option<&str> {
        first_non_blank(self.id.as_deref(), self.conversation_id.as_deref())
    }
}

/// Body returned by `POST {base}/conversations/{id}/chat`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub conversation_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub messages: Vec<ResponseMessage>,
}

impl ChatResponse {
    /// Session id echoed by the server, if any. May differ from the one sent.
    pub fn session_id(&self) -> Option<&str> {
        first_non_blank(self.id.as_deref(), self.conversation_id.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMessage {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: Option<String>,
    #[serde(default)]
    pub content: Option<MessageContent>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_date_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub attributions: Vec<ResponseAttribution>,
}

impl ResponseMessage {
    /// Non-blank remote identifier.
    pub fn remote_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// Resolve the message body to one text value.
    ///
    /// A non-blank `text` wins; otherwise string `content` is used verbatim and
    /// list `content` joins each part's text with newlines, skipping blank
    /// parts. Any other shape yields an empty string.
    pub fn canonical_text(&self) -> String {
        if let Some(text) = self.text.as_deref().filter(|text| !text.trim().is_empty()) {
            return text.to_owned();
        }

        match &self.content {
            Some(MessageContent::Text(text)) => text.clone(),
            Some(MessageContent::Parts(parts)) => parts
                .iter()
                .filter_map(ContentPart::text)
                .filter(|text| !text.trim().is_empty())
                .collect::<Vec<_>>()
                .join("\n"),
            Some(MessageContent::Other(_)) | None => String::new(),
        }
    }
}

/// `content` field union: a plain string, a list of typed parts, or anything
/// else the server happens to send.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
    Other(Value),
}

impl MessageContent {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            Value::Array(items) => Self::Parts(
                items
                    .into_iter()
                    .filter_map(ContentPart::from_value)
                    .collect(),
            ),
            other => Self::Other(other),
        }
    }
}

impl<'de> Deserialize<'de> for MessageContent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: Option<String>,
}

impl ContentPart {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(Self {
                text: Some(text),
                ..Self::default()
            }),
            Value::Object(_) => serde_json::from_value(value).ok(),
            _ => None,
        }
    }

    /// First present of `text`, `value`, `content`.
    pub fn text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .or(self.value.as_deref())
            .or(self.content.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseAttribution {
    #[serde(default, deserialize_with = "lenient_string")]
    pub provider_display_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub see_more_web_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub attribution_source: Option<String>,
}

fn first_non_blank<'a>(first: Option<&'a str>, second: Option<&'a str>) -> Option<&'a str> {
    first
        .filter(|value| !value.trim().is_empty())
        .or_else(|| second.filter(|value| !value.trim().is_empty()))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(value)) => Some(value),
        Some(Value::Number(value)) => Some(value.to_string()),
        _ => None,
    })
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}
