use async_trait::async_trait;

/// A formatted weekly paper announcement.
#[derive(Debug, Clone, PartialEq)]
pub struct PaperPost {
    pub title: String,
    pub url: String,
    pub summary: String,
    pub topic: String,
}

/// Where announcements land. One implementation per chat surface.
#[async_trait]
pub trait ChannelPublisher: Send + Sync {
    /// Post the selected paper of the week.
    async fn publish_paper(&self, post: &PaperPost) -> anyhow::Result<()>;

    /// Post the informational "no article this week" notice.
    async fn publish_no_article(&self) -> anyhow::Result<()>;

    /// Post the best-effort "publication failed" notice.
    async fn publish_failure(&self) -> anyhow::Result<()>;
}
