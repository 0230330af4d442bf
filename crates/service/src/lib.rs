//! Telegram front end: per-user dialog sessions over the shared QA service,
//! served by long polling or an axum webhook.

mod bot;
mod telegram;
mod transport;

use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::task;

use advisor_core::AdvisorConfig;

pub use bot::{Bot, Command, DataSync, WebSync, SYNC_FAILED};
pub use telegram::{Chat, Message, TelegramApi, Update, User};
pub use transport::{
    process_update, run_polling, run_webhook, webhook_router, AppError, SECRET_HEADER,
};

/// Opens the repository and serves the bot: on the webhook when
/// `webhook_bind` is set, by long polling otherwise.
pub async fn serve(config: AdvisorConfig) -> Result<()> {
    let token = config.telegram_token.clone();
    let bind = config.webhook_bind.clone();
    let secret = config.webhook_secret.clone();
    if bind.is_some() && secret.is_none() {
        return Err(anyhow!("WEBHOOK_SECRET is required in webhook mode"));
    }
    let bot = Arc::new(task::spawn_blocking(move || Bot::open(config)).await??);
    match (bind, secret) {
        (Some(bind), Some(secret)) => run_webhook(bot, &bind, &secret).await,
        _ => {
            let token = token.ok_or_else(|| anyhow!("TELEGRAM_TOKEN is not set"))?;
            run_polling(bot, TelegramApi::new(&token)?).await
        }
    }
}
