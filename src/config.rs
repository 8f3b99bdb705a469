use std::path::Path;
use std::time::Duration;

use custom_debug::Debug;
use schemars::JsonSchema;
use serde::Deserialize;
use url::Url;

use crate::asset::BackgroundRef;
use crate::compose::DEFAULT_FETCH_TIMEOUT;
use crate::error::{ConfigError, ProfileError};
use crate::export::{POSTIMAGES_ENDPOINT, POSTIMAGES_TOKEN_URL};
use crate::profile::{builtin, LayoutProfile};

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Extra profiles; one named like a built-in replaces it.
    #[serde(default)]
    pub profiles: Vec<LayoutProfile>,
    /// Overrides the background of every profile.
    #[serde(default)]
    pub background: Option<BackgroundRef>,
    #[serde(default)]
    pub fetch_timeout_secs: Option<u64>,
    #[serde(default)]
    pub upload: UploadConfig,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct UploadConfig {
    /// Defaults to postimages.org's anonymous upload endpoint.
    #[debug(with = "opt_url_fmt")]
    #[serde(default)]
    pub endpoint: Option<Url>,
    #[debug(with = "opt_url_fmt")]
    #[serde(default)]
    pub token_url: Option<Url>,
}

fn opt_url_fmt(url: &Option<Url>, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    match url {
        Some(url) => write!(f, "{url}"),
        None => write!(f, "default"),
    }
}

impl UploadConfig {
    pub fn endpoint(&self) -> Result<Url, url::ParseError> {
        self.endpoint
            .clone()
            .map_or_else(|| Url::parse(POSTIMAGES_ENDPOINT), Ok)
    }

    pub fn token_url(&self) -> Result<Url, url::ParseError> {
        self.token_url
            .clone()
            .map_or_else(|| Url::parse(POSTIMAGES_TOKEN_URL), Ok)
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&text)?;
        for profile in &config.profiles {
            profile.validate()?;
        }
        tracing::debug!(path = %path.display(), profiles = config.profiles.len(), "loaded config");
        Ok(config)
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout_secs
            .map_or(DEFAULT_FETCH_TIMEOUT, Duration::from_secs)
    }

    /// Built-in profiles overlaid with the configured ones.
    pub fn profiles(&self) -> Vec<LayoutProfile> {
        let mut profiles = builtin::all();
        for custom in &self.profiles {
            match profiles.iter_mut().find(|p| p.name == custom.name) {
                Some(existing) => *existing = custom.clone(),
                None => profiles.push(custom.clone()),
            }
        }
        if let Some(background) = &self.background {
            for profile in &mut profiles {
                profile.background = Some(background.clone());
            }
        }
        profiles
    }

    pub fn profile(&self, name: &str) -> Result<LayoutProfile, ProfileError> {
        self.profiles()
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ProfileError::Unknown(name.to_string()))
    }
}
