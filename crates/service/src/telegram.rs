use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,
}

impl Update {
    /// `(user id, chat id, text)` for plain text messages. The user falls
    /// back to the chat for channel posts without a sender.
    pub fn text_message(&self) -> Option<(i64, i64, &str)> {
        let message = self.message.as_ref()?;
        let text = message.text.as_deref()?;
        let user = message.from.as_ref().map(|u| u.id).unwrap_or(message.chat.id);
        Some((user, message.chat.id, text))
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// Minimal Bot API client: long polling and plain text replies.
#[derive(Clone)]
pub struct TelegramApi {
    http: Client,
    base_url: String,
}

impl TelegramApi {
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base_url(token, API_BASE)
    }

    pub fn with_base_url(token: &str, base: &str) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(anyhow!("telegram token is empty"));
        }
        let http = Client::builder()
            .timeout(Duration::from_secs(90))
            .build()
            .context("failed to build telegram http client")?;
        Ok(Self {
            http,
            base_url: format!("{}/bot{}", base.trim_end_matches('/'), token.trim()),
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, payload: &Value) -> Result<T> {
        let response = self
            .http
            .post(format!("{}/{method}", self.base_url))
            .json(payload)
            .send()
            .await
            .with_context(|| format!("telegram {method} request failed"))?
            .json::<ApiResponse<T>>()
            .await
            .with_context(|| format!("failed to decode telegram {method} response"))?;
        if !response.ok {
            return Err(anyhow!(
                "telegram {method} rejected: {}",
                response.description.unwrap_or_default()
            ));
        }
        response
            .result
            .ok_or_else(|| anyhow!("telegram {method} returned no result"))
    }

    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message"],
            }),
        )
        .await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let _: Value = self
            .call("sendMessage", &send_message_payload(chat_id, text))
            .await?;
        Ok(())
    }

    /// Long polling is refused while a webhook is registered.
    pub async fn delete_webhook(&self) -> Result<()> {
        let _: Value = self.call("deleteWebhook", &json!({})).await?;
        Ok(())
    }
}

pub fn send_message_payload(chat_id: i64, text: &str) -> Value {
    json!({ "chat_id": chat_id, "text": text })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text_update() {
        let raw = r#"{
            "update_id": 10,
            "message": {
                "message_id": 7,
                "from": {"id": 42, "is_bot": false, "first_name": "Аня"},
                "chat": {"id": 1042, "type": "private"},
                "date": 1700000000,
                "text": "/start"
            }
        }"#;
        let update: Update = serde_json::from_str(raw).unwrap();
        assert_eq!(update.text_message(), Some((42, 1042, "/start")));
    }

    #[test]
    fn non_text_updates_are_ignored() {
        let raw = r#"{"update_id": 11, "message": {"message_id": 8, "chat": {"id": 5}}}"#;
        let update: Update = serde_json::from_str(raw).unwrap();
        assert_eq!(update.text_message(), None);
        let edited: Update = serde_json::from_str(r#"{"update_id": 12}"#).unwrap();
        assert!(edited.message.is_none());
    }

    #[test]
    fn sender_defaults_to_chat() {
        let raw = r#"{"update_id": 1, "message": {"message_id": 1, "chat": {"id": -100}, "text": "ai"}}"#;
        let update: Update = serde_json::from_str(raw).unwrap();
        assert_eq!(update.text_message(), Some((-100, -100, "ai")));
    }

    #[test]
    fn empty_token_is_rejected() {
        assert!(TelegramApi::new("  ").is_err());
    }

    #[test]
    fn decodes_api_envelope() {
        let ok: ApiResponse<Vec<Update>> =
            serde_json::from_str(r#"{"ok": true, "result": []}"#).unwrap();
        assert!(ok.ok && ok.result.unwrap().is_empty());
        let err: ApiResponse<Value> =
            serde_json::from_str(r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#)
                .unwrap();
        assert_eq!(err.description.as_deref(), Some("Unauthorized"));
    }
}
