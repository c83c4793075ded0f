use async_trait::async_trait;
use tracing::info;

use super::backend::{ChannelPublisher, PaperPost};

/// Publisher that drops everything. Used when no channel webhook is
/// configured (dry runs).
pub struct NoopPublisher;

#[async_trait]
impl ChannelPublisher for NoopPublisher {
    async fn publish_paper(&self, post: &PaperPost) -> anyhow::Result<()> {
        info!(title = %post.title, url = %post.url, "Publishing disabled, dropping announcement");
        Ok(())
    }

    async fn publish_no_article(&self) -> anyhow::Result<()> {
        info!("Publishing disabled, dropping no-article notice");
        Ok(())
    }

    async fn publish_failure(&self) -> anyhow::Result<()> {
        info!("Publishing disabled, dropping failure notice");
        Ok(())
    }
}
