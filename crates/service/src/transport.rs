use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::task;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::bot::Bot;
use crate::telegram::{send_message_payload, TelegramApi, Update};

const POLL_TIMEOUT_SECS: u64 = 30;
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);
pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

#[derive(Clone)]
struct WebhookState {
    bot: Arc<Bot>,
    secret: Arc<str>,
}

/// Runs the blocking bot logic for one update. Returns the chat to answer
/// and the reply, if any.
pub async fn process_update(bot: Arc<Bot>, update: Update) -> Result<Option<(i64, String)>> {
    let Some((user_id, chat_id, text)) = update.text_message() else {
        return Ok(None);
    };
    let text = text.to_string();
    let reply = task::spawn_blocking(move || bot.reply(user_id, &text)).await?;
    Ok(reply.map(|reply| (chat_id, reply)))
}

/// Long polling loop; stops on Ctrl-C.
pub async fn run_polling(bot: Arc<Bot>, api: TelegramApi) -> Result<()> {
    api.delete_webhook().await?;
    info!("polling telegram for updates");
    let mut offset = 0i64;
    loop {
        let updates = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                return Ok(());
            }
            result = api.get_updates(offset, POLL_TIMEOUT_SECS) => result,
        };
        let updates = match updates {
            Ok(updates) => updates,
            Err(err) => {
                warn!("getUpdates failed: {err:#}");
                sleep(POLL_RETRY_DELAY).await;
                continue;
            }
        };
        for update in updates {
            offset = offset.max(update.update_id + 1);
            match process_update(bot.clone(), update).await {
                Ok(Some((chat_id, reply))) => {
                    if let Err(err) = api.send_message(chat_id, &reply).await {
                        warn!(chat_id, "sendMessage failed: {err:#}");
                    }
                }
                Ok(None) => {}
                Err(err) => error!("update handling failed: {err:#}"),
            }
        }
    }
}

/// Webhook requests must carry `secret` in the secret-token header that
/// Telegram sends when the webhook is registered with `secret_token`.
pub fn webhook_router(bot: Arc<Bot>, secret: &str) -> Router {
    let state = WebhookState {
        bot,
        secret: Arc::from(secret),
    };
    Router::new()
        .route("/health", get(health))
        .route("/telegram/webhook", post(handle_webhook))
        .with_state(state)
}

/// Serves the webhook endpoint on `bind` until Ctrl-C.
pub async fn run_webhook(bot: Arc<Bot>, bind: &str, secret: &str) -> Result<()> {
    let addr: SocketAddr = bind.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening" = %addr);
    axum::serve(listener, webhook_router(bot, secret))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

/// Answers inline: Telegram executes a method returned in the webhook
/// response body, so no extra sendMessage call is made.
async fn handle_webhook(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    Json(update): Json<Update>,
) -> Result<Json<Value>, AppError> {
    let presented = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
    if presented != Some(&*state.secret) {
        return Err(AppError::Unauthorized);
    }
    let reply = process_update(state.bot, update).await?;
    Ok(Json(match reply {
        Some((chat_id, text)) => {
            let mut payload = send_message_payload(chat_id, &text);
            payload["method"] = json!("sendMessage");
            payload
        }
        None => json!({}),
    }))
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("missing or wrong webhook secret")]
    Unauthorized,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthorized => {
                warn!("webhook request rejected");
                (StatusCode::UNAUTHORIZED, "unauthorized").into_response()
            }
            AppError::Internal(err) => {
                error!("internal_error" = %err);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
            }
        }
    }
}
