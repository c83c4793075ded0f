//! Article search and source vetting via the Perplexity online-search API.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::traits::ArticleSearch;
use crate::types::{ChatRequest, ChatResponse, WireMessage};

const PERPLEXITY_API_URL: &str = "https://api.perplexity.ai";
const MODEL: &str = "llama-3.1-sonar-small-128k-online";

const SEARCH_PREAMBLE: &str = "You are a scientific article search assistant. Return only \
    the most relevant recent scientific articles with their titles, URLs, and brief \
    descriptions. Focus on peer-reviewed research papers.";

const VALIDATE_PREAMBLE: &str = "You are a scientific article validator and summarizer. \
    Analyze the given URL and provide: 1) Whether it's a legitimate scientific source, \
    2) A detailed summary if valid, 3) Key findings and implications.";

pub struct PerplexityClient {
    api_key: Option<String>,
    http: reqwest::Client,
    base_url: String,
}

impl PerplexityClient {
    /// A missing key is not an error here; calls fail with a clear message
    /// the first time the client is actually used.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            http: reqwest::Client::new(),
            base_url: PERPLEXITY_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| anyhow!("Perplexity API key not configured"))
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        debug!(model = %request.model, "Perplexity chat request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.api_key()?)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!("Perplexity API error ({}): {}", status, error_text));
        }

        let chat_response: ChatResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("No response from Perplexity"))
    }
}

#[async_trait]
impl ArticleSearch for PerplexityClient {
    async fn search_articles(&self, topic: &str) -> Result<String> {
        let request = ChatRequest {
            model: MODEL.to_string(),
            messages: vec![
                WireMessage::system(SEARCH_PREAMBLE),
                WireMessage::user(format!(
                    "Find the most interesting and recent scientific articles for this \
                     week related to: {topic}. Please provide 3-5 articles with titles, \
                     URLs, and brief descriptions."
                )),
            ],
            temperature: 0.1,
            max_tokens: 1000,
        };

        let results = self.chat(&request).await?;
        debug!(topic, "Article search completed");
        Ok(results)
    }

    async fn validate_article(&self, url: &str) -> Result<String> {
        let request = ChatRequest {
            model: MODEL.to_string(),
            messages: vec![
                WireMessage::system(VALIDATE_PREAMBLE),
                WireMessage::user(format!(
                    "Please analyze this article: {url}. Is it from a credible scientific \
                     source? If yes, provide a comprehensive summary including methodology, \
                     key findings, and implications."
                )),
            ],
            temperature: 0.1,
            max_tokens: 1500,
        };

        let assessment = self.chat(&request).await?;
        debug!(url, "Article validation completed");
        Ok(assessment)
    }
}
