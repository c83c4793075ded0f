//! Summarization and title generation via the OpenAI chat API.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::traits::Summarize;
use crate::types::{ChatRequest, ChatResponse, WireMessage};

const OPENAI_API_URL: &str = "https://api.openai.com/v1";
const MODEL: &str = "gpt-3.5-turbo";

const SUMMARIZE_PREAMBLE: &str = "You are a scientific article summarizer. Create clear, \
    concise summaries that highlight key findings, methodology, and implications for the \
    scientific community. Format your response for chat with proper sections.";

const TITLE_PREAMBLE: &str = "Generate a compelling, informative title for a scientific \
    article summary. The title should be engaging but accurate.";

pub struct OpenAiClient {
    api_key: Option<String>,
    http: reqwest::Client,
    base_url: String,
}

impl OpenAiClient {
    /// A missing key is not an error here; calls fail with a clear message
    /// the first time the client is actually used.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            http: reqwest::Client::new(),
            base_url: OPENAI_API_URL.to_string(),
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
            .ok_or_else(|| anyhow!("OpenAI API key not configured"))
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        debug!(model = %request.model, "OpenAI chat request");

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
            return Err(anyhow!("OpenAI API error ({}): {}", status, error_text));
        }

        let chat_response: ChatResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("No response from OpenAI"))
    }
}

#[async_trait]
impl Summarize for OpenAiClient {
    async fn summarize_article(&self, content: &str, url: Option<&str>) -> Result<String> {
        let url_line = url.map(|u| format!("URL: {u}")).unwrap_or_default();
        let prompt = format!(
            "Please summarize this scientific article:\n\n{content}\n\n{url_line}\n\n\
             Provide a structured summary with:\n\
             1. Main findings\n\
             2. Methodology\n\
             3. Implications\n\
             4. Key takeaways"
        );

        let request = ChatRequest {
            model: MODEL.to_string(),
            messages: vec![
                WireMessage::system(SUMMARIZE_PREAMBLE),
                WireMessage::user(prompt),
            ],
            temperature: 0.3,
            max_tokens: 1000,
        };

        let summary = self.chat(&request).await?;
        debug!(url = url.unwrap_or_default(), "Article summarized");
        Ok(summary)
    }

    async fn generate_title(&self, summary: &str) -> Result<String> {
        let excerpt: String = summary.chars().take(500).collect();
        let request = ChatRequest {
            model: MODEL.to_string(),
            messages: vec![
                WireMessage::system(TITLE_PREAMBLE),
                WireMessage::user(format!(
                    "Create a title for this article summary: {excerpt}..."
                )),
            ],
            temperature: 0.5,
            max_tokens: 100,
        };

        let title = self.chat(&request).await?;
        Ok(title.replace('"', ""))
    }
}
