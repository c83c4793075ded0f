//! Moderation command bodies: learn, qualify, summarize, and source admin.
//!
//! These back the interactive surface; the chat transport itself lives
//! elsewhere and only renders the outcomes returned here.

use anyhow::Result;
use tracing::{info, warn};
use url::Url;

use ai_client::{ArticleSearch, Summarize};
use paperweek_common::PaperweekError;
use paperweek_sources::{
    looks_like_domain, normalize_domain, ReliabilityScorer, SourceRegistry, SourceStore,
};

use crate::pipeline::DEFAULT_TITLE;

/// Outcome of the auto-learn flow.
#[derive(Debug, Clone, PartialEq)]
pub enum LearnOutcome {
    /// The URL's host is already covered by the registry.
    AlreadyTrusted { domain: String },
    /// The heuristic accepted the AI assessment; the domain was added.
    Added { domain: String, assessment: String },
    /// The heuristic rejected the AI assessment; nothing changed.
    Rejected { domain: String, assessment: String },
}

/// Validate a URL's source with the search collaborator and add its domain
/// to the registry when the reliability heuristic accepts the assessment.
pub async fn learn_source<S: SourceStore>(
    registry: &SourceRegistry<S>,
    searcher: &dyn ArticleSearch,
    scorer: &ReliabilityScorer,
    url: &str,
    actor: &str,
) -> Result<LearnOutcome> {
    let domain = host_of(url)?;

    if registry.is_valid(url).await {
        return Ok(LearnOutcome::AlreadyTrusted { domain });
    }

    let assessment = searcher.validate_article(url).await?;

    if scorer.is_reliable(&assessment, &domain) {
        registry.add(&domain, actor).await;
        info!(domain = %domain, actor, "Source learned and added");
        Ok(LearnOutcome::Added { domain, assessment })
    } else {
        info!(domain = %domain, "Source rejected by the reliability heuristic");
        Ok(LearnOutcome::Rejected { domain, assessment })
    }
}

/// Outcome of the manual qualification flow.
#[derive(Debug, Clone, PartialEq)]
pub enum QualifyOutcome {
    /// Trusted source: summarized directly.
    Qualified { title: String, summary: String },
    /// Unknown source: the AI assessment is returned for manual review.
    Unvetted { assessment: String },
}

pub async fn qualify_article<S: SourceStore>(
    registry: &SourceRegistry<S>,
    searcher: &dyn ArticleSearch,
    summarizer: &dyn Summarize,
    url: &str,
) -> Result<QualifyOutcome> {
    if !registry.is_valid(url).await {
        let assessment = searcher.validate_article(url).await?;
        return Ok(QualifyOutcome::Unvetted { assessment });
    }

    let summary = summarizer
        .summarize_article(&format!("Please summarize the article at: {url}"), None)
        .await?;
    let title = title_or_default(summarizer, &summary).await;

    Ok(QualifyOutcome::Qualified { title, summary })
}

/// Outcome of the user-facing summarize flow.
#[derive(Debug, Clone, PartialEq)]
pub enum SummarizeOutcome {
    /// Host not in the allow-list; no AI call is made.
    Untrusted,
    Summarized { title: String, summary: String },
}

pub async fn summarize_url<S: SourceStore>(
    registry: &SourceRegistry<S>,
    summarizer: &dyn Summarize,
    url: &str,
) -> Result<SummarizeOutcome> {
    if !registry.is_valid(url).await {
        return Ok(SummarizeOutcome::Untrusted);
    }

    let summary = summarizer
        .summarize_article(&format!("Please summarize the article at: {url}"), Some(url))
        .await?;
    let title = title_or_default(summarizer, &summary).await;

    Ok(SummarizeOutcome::Summarized { title, summary })
}

/// Normalize and format-check a user-supplied domain, then add it.
pub async fn add_source<S: SourceStore>(
    registry: &SourceRegistry<S>,
    domain: &str,
    actor: &str,
) -> Result<bool> {
    let domain = normalize_domain(domain);
    if !looks_like_domain(&domain) {
        return Err(PaperweekError::Validation(format!("malformed domain: {domain}")).into());
    }
    Ok(registry.add(&domain, actor).await)
}

pub async fn remove_source<S: SourceStore>(
    registry: &SourceRegistry<S>,
    domain: &str,
) -> Result<bool> {
    let domain = normalize_domain(domain);
    Ok(registry.remove(&domain).await)
}

async fn title_or_default(summarizer: &dyn Summarize, summary: &str) -> String {
    match summarizer.generate_title(summary).await {
        Ok(title) => title,
        Err(e) => {
            warn!(error = %e, "Title generation failed, using the default");
            DEFAULT_TITLE.to_string()
        }
    }
}

fn host_of(url: &str) -> Result<String> {
    let parsed = Url::parse(url)
        .map_err(|_| PaperweekError::Validation(format!("not a valid URL: {url}")))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| PaperweekError::Validation(format!("URL has no host: {url}")))?;
    Ok(host.to_lowercase())
}
