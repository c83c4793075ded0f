pub mod error;
pub mod types;

pub use error::{LaunchError, Result};
pub use types::{Launch, LaunchDetail};

use tracing::debug;

use types::{ApiLaunch, UpcomingResponse};

const BASE_URL: &str = "https://lldev.thespacedevs.com/2.2.0";

pub struct LaunchClient {
    http: reqwest::Client,
    base_url: String,
}

impl LaunchClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Upcoming launches ordered by scheduled launch time ascending.
    /// `limit` is passed through as-is; callers own any bounds.
    pub async fn upcoming(&self, limit: u32) -> Result<Vec<Launch>> {
        let url = format!("{}/launch/upcoming", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("limit", limit.to_string()), ("ordering", "net".to_string())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(LaunchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = resp.text().await?;
        let page: UpcomingResponse = serde_json::from_str(&body)?;
        let launches: Vec<Launch> = page.results.into_iter().map(ApiLaunch::normalize).collect();

        debug!(count = launches.len(), "Fetched upcoming launches");
        Ok(launches)
    }

    /// Detail view for one launch by its upstream id.
    pub async fn launch_details(&self, id: &str) -> Result<LaunchDetail> {
        let url = format!("{}/launch/{}", self.base_url, id);
        let resp = self.http.get(&url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(LaunchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = resp.text().await?;
        let launch: ApiLaunch = serde_json::from_str(&body)?;
        Ok(launch.normalize_detail())
    }
}

impl Default for LaunchClient {
    fn default() -> Self {
        Self::new()
    }
}
