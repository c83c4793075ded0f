//! Fire-and-forget publication events for downstream automation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::publish::PaperPost;

const EVENT_WEEKLY_PAPER_PUBLISHED: &str = "weekly_paper_published";

/// How much of the summary rides along in the event payload.
const SUMMARY_LIMIT: usize = 500;

#[derive(Debug, Clone, Serialize)]
pub struct PaperPublished {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: String,
    pub url: String,
    pub summary: String,
    pub timestamp: DateTime<Utc>,
}

impl PaperPublished {
    pub fn from_post(post: &PaperPost) -> Self {
        Self {
            kind: EVENT_WEEKLY_PAPER_PUBLISHED,
            title: post.title.clone(),
            url: post.url.clone(),
            summary: post.summary.chars().take(SUMMARY_LIMIT).collect(),
            timestamp: Utc::now(),
        }
    }
}

/// Outbound webhook for publication events. Callers log and drop the
/// result; a dead webhook must never block publication.
pub struct EventWebhook {
    webhook_url: String,
    http: reqwest::Client,
}

impl EventWebhook {
    pub fn new(webhook_url: String) -> Self {
        Self {
            webhook_url,
            http: reqwest::Client::new(),
        }
    }

    pub async fn notify(&self, event: &PaperPublished) -> anyhow::Result<()> {
        let resp = self
            .http
            .post(&self.webhook_url)
            .json(event)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Event webhook returned non-success");
            anyhow::bail!("Event webhook returned {status}");
        }

        debug!(kind = event.kind, "Event webhook notification sent");
        Ok(())
    }
}
