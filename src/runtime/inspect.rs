//! Typed view over `docker inspect` / `nerdctl inspect` JSON.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerDetails {
    pub id: String,
    #[serde(default)]
    pub network_settings: NetworkSettings,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkSettings {
    #[serde(default, rename = "IPAddress")]
    pub ip_address: String,
    #[serde(default)]
    pub networks: Option<BTreeMap<String, EndpointSettings>>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct EndpointSettings {
    #[serde(default, rename = "IPAddress")]
    pub ip_address: String,
}

impl ContainerDetails {
    /// Parses the array printed by `inspect` and returns its single element.
    pub fn from_inspect_json(json: &str) -> Result<Self> {
        let mut details: Vec<ContainerDetails> =
            serde_json::from_str(json).context("Failed to parse inspect output")?;
        if details.len() != 1 {
            return Err(anyhow!(
                "Expected exactly one container in inspect output, got {}",
                details.len()
            ));
        }
        Ok(details.remove(0))
    }

    /// Address of the container on its network.
    ///
    /// Newer engines leave the top-level field empty and only fill the
    /// per-network entry, so fall back to the first non-empty one.
    pub fn ip_address(&self) -> Option<&str> {
        let settings = &self.network_settings;
        if !settings.ip_address.is_empty() {
            return Some(&settings.ip_address);
        }

        settings
            .networks
            .as_ref()?
            .values()
            .map(|endpoint| endpoint.ip_address.as_str())
            .find(|ip| !ip.is_empty())
    }
}
