//! The weekly selection pipeline.
//!
//! One run per schedule fire: pick a topic, search, extract and filter URLs
//! against the trusted-source registry, summarize the first valid candidate,
//! publish, notify. Failures collapse at the outer boundary; the next
//! opportunity is the next scheduled trigger.

use std::sync::Arc;

use tracing::{error, info, warn};

use ai_client::{ArticleSearch, Summarize};
use paperweek_sources::{SourceRegistry, SourceStore};

use crate::extract::{self, Candidate};
use crate::notify::{EventWebhook, PaperPublished};
use crate::publish::{ChannelPublisher, PaperPost};
use crate::topics;

/// Used when title generation fails; the run still publishes.
pub const DEFAULT_TITLE: &str = "Weekly Scientific Paper Summary";

/// Terminal state of one weekly run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Published { title: String, url: String },
    NoValidArticle,
    Failed,
}

pub struct WeeklyPaperJob<S: SourceStore> {
    registry: SourceRegistry<S>,
    searcher: Arc<dyn ArticleSearch>,
    summarizer: Arc<dyn Summarize>,
    publisher: Arc<dyn ChannelPublisher>,
    events: Option<EventWebhook>,
}

impl<S: SourceStore> WeeklyPaperJob<S> {
    pub fn new(
        registry: SourceRegistry<S>,
        searcher: Arc<dyn ArticleSearch>,
        summarizer: Arc<dyn Summarize>,
        publisher: Arc<dyn ChannelPublisher>,
    ) -> Self {
        Self {
            registry,
            searcher,
            summarizer,
            publisher,
            events: None,
        }
    }

    /// Enable publication events on a webhook.
    pub fn with_events(mut self, events: EventWebhook) -> Self {
        self.events = Some(events);
        self
    }

    /// One full pipeline run. Never returns an error: any failure inside
    /// the run collapses to [`RunOutcome::Failed`] after a best-effort
    /// failure notice to the channel.
    pub async fn run(&self) -> RunOutcome {
        info!("Starting weekly paper publication");

        match self.run_inner().await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "Weekly paper run failed");
                if let Err(e) = self.publisher.publish_failure().await {
                    error!(error = %e, "Failed to post the failure notice");
                }
                RunOutcome::Failed
            }
        }
    }

    async fn run_inner(&self) -> anyhow::Result<RunOutcome> {
        let topic = topics::pick_topic();
        info!(topic, "Searching for the weekly paper");

        let search_text = self.searcher.search_articles(topic).await?;

        let candidates = self.filter_candidates(&search_text).await;

        // No ranking beyond the search engine's ordering, filtered.
        let Some(article) = candidates.into_iter().next() else {
            warn!("No valid article found for the weekly paper");
            self.publisher.publish_no_article().await?;
            return Ok(RunOutcome::NoValidArticle);
        };

        let summary = self
            .summarizer
            .summarize_article(
                &format!("Article from {}: {}", article.url, article.description),
                Some(&article.url),
            )
            .await?;

        let title = match self.summarizer.generate_title(&summary).await {
            Ok(title) => title,
            Err(e) => {
                warn!(error = %e, "Title generation failed, using the default");
                DEFAULT_TITLE.to_string()
            }
        };

        let post = PaperPost {
            title,
            url: article.url,
            summary,
            topic: topic.to_string(),
        };
        self.publisher.publish_paper(&post).await?;

        if let Some(events) = &self.events {
            if let Err(e) = events.notify(&PaperPublished::from_post(&post)).await {
                warn!(error = %e, "Event webhook notification failed");
            }
        }

        info!(title = %post.title, url = %post.url, "Weekly paper published");
        Ok(RunOutcome::Published {
            title: post.title,
            url: post.url,
        })
    }

    /// Keep, in extraction order, the URLs whose host is a trusted source.
    async fn filter_candidates(&self, search_text: &str) -> Vec<Candidate> {
        let mut kept = Vec::new();
        for url in extract::extract_urls(search_text) {
            if self.registry.is_valid(&url).await {
                kept.push(Candidate {
                    url: extract::clean_url(&url),
                    description: extract::describe(search_text, &url),
                });
            }
        }
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::Utc;

    use paperweek_sources::{MemoryStore, SourceList};

    struct FixedSearcher(String);

    #[async_trait]
    impl ArticleSearch for FixedSearcher {
        async fn search_articles(&self, _topic: &str) -> anyhow::Result<String> {
            Ok(self.0.clone())
        }

        async fn validate_article(&self, _url: &str) -> anyhow::Result<String> {
            unimplemented!("not used by the pipeline")
        }
    }

    struct FailingSearcher;

    #[async_trait]
    impl ArticleSearch for FailingSearcher {
        async fn search_articles(&self, _topic: &str) -> anyhow::Result<String> {
            Err(anyhow!("search service is down"))
        }

        async fn validate_article(&self, _url: &str) -> anyhow::Result<String> {
            unimplemented!("not used by the pipeline")
        }
    }

    struct FixedSummarizer {
        summarize_calls: AtomicUsize,
        title_fails: bool,
    }

    impl FixedSummarizer {
        fn new(title_fails: bool) -> Self {
            Self {
                summarize_calls: AtomicUsize::new(0),
                title_fails,
            }
        }
    }

    #[async_trait]
    impl Summarize for FixedSummarizer {
        async fn summarize_article(
            &self,
            _content: &str,
            _url: Option<&str>,
        ) -> anyhow::Result<String> {
            self.summarize_calls.fetch_add(1, Ordering::SeqCst);
            Ok("A fixed summary.".to_string())
        }

        async fn generate_title(&self, _summary: &str) -> anyhow::Result<String> {
            if self.title_fails {
                Err(anyhow!("title service is down"))
            } else {
                Ok("Fixed Title".to_string())
            }
        }
    }

    #[derive(Default)]
    struct RecordingPublisher {
        papers: Mutex<Vec<PaperPost>>,
        notices: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl ChannelPublisher for RecordingPublisher {
        async fn publish_paper(&self, post: &PaperPost) -> anyhow::Result<()> {
            self.papers.lock().unwrap().push(post.clone());
            Ok(())
        }

        async fn publish_no_article(&self) -> anyhow::Result<()> {
            self.notices.lock().unwrap().push("no_article");
            Ok(())
        }

        async fn publish_failure(&self) -> anyhow::Result<()> {
            self.notices.lock().unwrap().push("failure");
            Ok(())
        }
    }

    fn registry_with(domains: &[&str]) -> SourceRegistry<MemoryStore> {
        SourceRegistry::new(MemoryStore::preloaded(SourceList {
            domains: domains.iter().map(|d| d.to_string()).collect(),
            last_updated: Utc::now(),
            added_by: "tester".to_string(),
        }))
    }

    fn job(
        domains: &[&str],
        searcher: Arc<dyn ArticleSearch>,
        summarizer: Arc<FixedSummarizer>,
    ) -> (WeeklyPaperJob<MemoryStore>, Arc<RecordingPublisher>) {
        let publisher = Arc::new(RecordingPublisher::default());
        let job = WeeklyPaperJob::new(
            registry_with(domains),
            searcher,
            summarizer,
            publisher.clone(),
        );
        (job, publisher)
    }

    const SEARCH_TEXT: &str = "\
1. An untrusted opinion piece\nhttps://someblog.net/story\n\
2. A solid fusion result\nRead it at https://www.nature.com/articles/fusion.\n\
3. Another unknown site\nhttps://random.example/post\n";

    #[tokio::test]
    async fn the_first_trusted_candidate_wins() {
        let summarizer = Arc::new(FixedSummarizer::new(false));
        let (job, publisher) = job(
            &["nature.com"],
            Arc::new(FixedSearcher(SEARCH_TEXT.to_string())),
            summarizer.clone(),
        );

        let outcome = job.run().await;

        assert_eq!(
            outcome,
            RunOutcome::Published {
                title: "Fixed Title".to_string(),
                url: "https://www.nature.com/articles/fusion".to_string(),
            }
        );

        let papers = publisher.papers.lock().unwrap();
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].summary, "A fixed summary.");
        assert_eq!(summarizer.summarize_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn no_trusted_url_means_no_article_and_no_summarization() {
        let summarizer = Arc::new(FixedSummarizer::new(false));
        let (job, publisher) = job(
            &["cell.com"],
            Arc::new(FixedSearcher(SEARCH_TEXT.to_string())),
            summarizer.clone(),
        );

        let outcome = job.run().await;

        assert_eq!(outcome, RunOutcome::NoValidArticle);
        assert_eq!(summarizer.summarize_calls.load(Ordering::SeqCst), 0);
        assert!(publisher.papers.lock().unwrap().is_empty());
        assert_eq!(*publisher.notices.lock().unwrap(), vec!["no_article"]);
    }

    #[tokio::test]
    async fn search_failure_posts_the_failure_notice() {
        let summarizer = Arc::new(FixedSummarizer::new(false));
        let (job, publisher) = job(&["nature.com"], Arc::new(FailingSearcher), summarizer);

        let outcome = job.run().await;

        assert_eq!(outcome, RunOutcome::Failed);
        assert_eq!(*publisher.notices.lock().unwrap(), vec!["failure"]);
    }

    #[tokio::test]
    async fn title_failure_falls_back_without_failing_the_run() {
        let summarizer = Arc::new(FixedSummarizer::new(true));
        let (job, publisher) = job(
            &["nature.com"],
            Arc::new(FixedSearcher(SEARCH_TEXT.to_string())),
            summarizer,
        );

        let outcome = job.run().await;

        match outcome {
            RunOutcome::Published { title, .. } => assert_eq!(title, DEFAULT_TITLE),
            other => panic!("expected a publication, got {other:?}"),
        }
        assert_eq!(publisher.papers.lock().unwrap()[0].title, DEFAULT_TITLE);
    }

    #[tokio::test]
    async fn candidate_descriptions_come_from_the_surrounding_lines() {
        let summarizer = Arc::new(FixedSummarizer::new(false));
        let (job, publisher) = job(
            &["nature.com"],
            Arc::new(FixedSearcher(SEARCH_TEXT.to_string())),
            summarizer,
        );

        job.run().await;

        let papers = publisher.papers.lock().unwrap();
        // Description derivation is covered in extract.rs; here we only care
        // that the chosen candidate carried its cleaned URL into the post.
        assert_eq!(papers[0].url, "https://www.nature.com/articles/fusion");
    }
}
