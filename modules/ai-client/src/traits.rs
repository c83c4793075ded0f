use anyhow::Result;
use async_trait::async_trait;

/// Article discovery and source vetting, backed by a search-capable model.
/// Both operations return free-form text; callers own any parsing.
#[async_trait]
pub trait ArticleSearch: Send + Sync {
    /// Recent articles for a topic: titles, URLs, brief descriptions.
    async fn search_articles(&self, topic: &str) -> Result<String>;

    /// Credibility assessment (and summary, when credible) for a URL.
    async fn validate_article(&self, url: &str) -> Result<String>;
}

/// Summary and title generation over article text.
#[async_trait]
pub trait Summarize: Send + Sync {
    async fn summarize_article(&self, content: &str, url: Option<&str>) -> Result<String>;

    async fn generate_title(&self, summary: &str) -> Result<String>;
}
