//! Upstream payload shapes and their normalized projections.

use chrono::{DateTime, Utc};
use serde::Deserialize;

const UNKNOWN: &str = "Unknown";
const UNKNOWN_LOCATION: &str = "Unknown location";
const UNKNOWN_ROCKET: &str = "Unknown rocket";
const NO_DESCRIPTION: &str = "No description available";

/// One upcoming launch, flattened from the upstream nested shape. Absent
/// nested fields are replaced with fixed sentinel strings.
#[derive(Debug, Clone, PartialEq)]
pub struct Launch {
    pub name: String,
    pub date: DateTime<Utc>,
    pub agency: String,
    pub mission: String,
    pub location: String,
    pub url: String,
    pub image: Option<String>,
    pub status: String,
}

/// Detail view of a single launch.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchDetail {
    pub name: String,
    pub date: DateTime<Utc>,
    pub agency: String,
    pub mission: String,
    pub location: String,
    pub rocket: String,
    pub url: String,
    pub image: Option<String>,
    pub status: String,
    pub webcast_live: bool,
    pub probability: Option<i32>,
}

// --- Upstream wire shapes (subset read) ---

#[derive(Debug, Deserialize)]
pub(crate) struct UpcomingResponse {
    pub results: Vec<ApiLaunch>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiLaunch {
    pub name: String,
    pub net: DateTime<Utc>,
    #[serde(default)]
    pub launch_service_provider: Option<ApiNamed>,
    #[serde(default)]
    pub mission: Option<ApiMission>,
    #[serde(default)]
    pub pad: Option<ApiPad>,
    #[serde(default)]
    pub rocket: Option<ApiRocket>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub status: Option<ApiNamed>,
    #[serde(default)]
    pub webcast_live: Option<bool>,
    #[serde(default)]
    pub probability: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiNamed {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiMission {
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiPad {
    #[serde(default)]
    pub location: Option<ApiNamed>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiRocket {
    #[serde(default)]
    pub configuration: Option<ApiNamed>,
}

impl ApiLaunch {
    pub fn normalize(self) -> Launch {
        Launch {
            name: self.name,
            date: self.net,
            agency: named_or(self.launch_service_provider, UNKNOWN),
            mission: self
                .mission
                .and_then(|m| m.description)
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            location: self
                .pad
                .and_then(|p| p.location)
                .and_then(|l| l.name)
                .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
            url: self.url.unwrap_or_default(),
            image: self.image,
            status: named_or(self.status, UNKNOWN),
        }
    }

    pub fn normalize_detail(self) -> LaunchDetail {
        LaunchDetail {
            name: self.name,
            date: self.net,
            agency: named_or(self.launch_service_provider, UNKNOWN),
            mission: self
                .mission
                .and_then(|m| m.description)
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            location: self
                .pad
                .and_then(|p| p.location)
                .and_then(|l| l.name)
                .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
            rocket: self
                .rocket
                .and_then(|r| r.configuration)
                .and_then(|c| c.name)
                .unwrap_or_else(|| UNKNOWN_ROCKET.to_string()),
            url: self.url.unwrap_or_default(),
            image: self.image,
            status: named_or(self.status, UNKNOWN),
            webcast_live: self.webcast_live.unwrap_or(false),
            probability: self.probability,
        }
    }
}

fn named_or(named: Option<ApiNamed>, fallback: &str) -> String {
    named
        .and_then(|n| n.name)
        .unwrap_or_else(|| fallback.to_string())
}
