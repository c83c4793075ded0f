//! Channel publisher backed by a Discord incoming webhook.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::warn;

use super::backend::{ChannelPublisher, PaperPost};

const COLOR_GREEN: u32 = 0x00AA55;
const COLOR_ORANGE: u32 = 0xFFA500;
const COLOR_RED: u32 = 0xFF0000;

pub struct DiscordWebhook {
    webhook_url: String,
    http: reqwest::Client,
}

impl DiscordWebhook {
    pub fn new(webhook_url: String) -> Self {
        Self {
            webhook_url,
            http: reqwest::Client::new(),
        }
    }

    async fn post(&self, payload: serde_json::Value) -> anyhow::Result<()> {
        let resp = self
            .http
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Channel webhook returned non-success");
            anyhow::bail!("Channel webhook returned {status}");
        }

        Ok(())
    }
}

#[async_trait]
impl ChannelPublisher for DiscordWebhook {
    async fn publish_paper(&self, post: &PaperPost) -> anyhow::Result<()> {
        let payload = json!({
            "content": "🌟 **Paper of the Week** 🌟\n*Here is this week's scientific article, selected for you!*",
            "embeds": [{
                "title": format!("📄 Paper of the Week - {}", post.title),
                "description": post.summary,
                "url": post.url,
                "color": COLOR_GREEN,
                "fields": [
                    { "name": "🔗 Source", "value": format!("[Read the full article]({})", post.url), "inline": true },
                    { "name": "📊 Topic", "value": post.topic, "inline": false },
                ],
                "footer": { "text": "Paper of the Week • Published automatically every Monday" },
                "timestamp": Utc::now().to_rfc3339(),
            }],
        });

        self.post(payload).await
    }

    async fn publish_no_article(&self) -> anyhow::Result<()> {
        let payload = json!({
            "embeds": [{
                "title": "📄 Paper of the Week",
                "description": "No valid scientific article could be found this week from our trusted sources. We will try again next week!",
                "color": COLOR_ORANGE,
                "footer": { "text": "Paper of the Week • Next attempt next Monday" },
                "timestamp": Utc::now().to_rfc3339(),
            }],
        });

        self.post(payload).await
    }

    async fn publish_failure(&self) -> anyhow::Result<()> {
        let payload = json!({
            "embeds": [{
                "title": "❌ Paper of the Week error",
                "description": "Something went wrong during the automatic publication. The moderators have been notified.",
                "color": COLOR_RED,
                "timestamp": Utc::now().to_rfc3339(),
            }],
        });

        self.post(payload).await
    }
}
