//! Endpoint configuration
//!
//! The facade takes an explicit config at construction; there are no
//! ambient lookups inside its methods.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Where the conference REST service lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Base URL of the REST API, without a trailing slash.
    pub rest_base_url: String,

    /// Id of the conference event whose schedule is served.
    pub event_id: String,
}

impl ScheduleConfig {
    pub fn new(rest_base_url: impl Into<String>, event_id: impl Into<String>) -> Self {
        let rest_base_url: String = rest_base_url.into();
        Self {
            rest_base_url: rest_base_url.trim_end_matches('/').to_string(),
            event_id: event_id.into(),
        }
    }

    /// Load the configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ScheduleConfig = toml::from_str(&content)?;
        Ok(Self::new(config.rest_base_url, config.event_id))
    }

    /// The schedule endpoint; also the base for per-user favourites.
    pub fn schedule_url(&self) -> String {
        format!("{}/events/{}/schedule", self.rest_base_url, self.event_id)
    }

    /// The MySchedule activation endpoint.
    pub fn activation_url(&self) -> String {
        format!("{}/events/users/activate", self.rest_base_url)
    }

    /// The MySchedule validation endpoint.
    pub fn validation_url(&self) -> String {
        format!("{}/events/users/validate", self.rest_base_url)
    }

    /// The presentation search endpoint.
    pub fn search_url(&self) -> String {
        format!(
            "{}/events/{}/presentations/search",
            self.rest_base_url, self.event_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_endpoint_urls() {
        let config = ScheduleConfig::new("http://rest.example.com/api/", "1");
        assert_eq!(
            config.schedule_url(),
            "http://rest.example.com/api/events/1/schedule"
        );
        assert_eq!(
            config.activation_url(),
            "http://rest.example.com/api/events/users/activate"
        );
        assert_eq!(
            config.validation_url(),
            "http://rest.example.com/api/events/users/validate"
        );
        assert_eq!(
            config.search_url(),
            "http://rest.example.com/api/events/1/presentations/search"
        );
    }

    #[test]
    fn parses_toml() {
        let toml = r#"
rest_base_url = "http://rest.example.com/api"
event_id = "conf2026"
"#;
        let config: ScheduleConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.event_id, "conf2026");
    }
}
