//! Flow file: the inverters and the controls querying them.

use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Deserializer};
use serde_with::{DurationSeconds, serde_as};

use crate::{prelude::*, registry::Endpoint};

#[must_use]
#[serde_as]
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FlowConfig {
    /// HTTP request timeout for the inverter calls.
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(rename = "timeout-secs", default = "FlowConfig::default_timeout")]
    pub timeout: Duration,

    #[serde(default)]
    pub inverters: Vec<InverterConfig>,

    #[serde(default)]
    pub controls: Vec<ControlConfig>,
}

impl FlowConfig {
    const fn default_timeout() -> Duration {
        Duration::from_secs(10)
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse `{}`", path.display()))?;
        info!(n_inverters = config.inverters.len(), n_controls = config.controls.len(), "loaded");
        Ok(config)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct InverterConfig {
    pub id: String,

    #[serde(default)]
    pub name: String,

    pub host: String,

    #[serde(default = "InverterConfig::default_port")]
    pub port: i32,

    #[serde(default = "InverterConfig::default_api_version")]
    pub api_version: u32,
}

impl InverterConfig {
    const fn default_port() -> i32 {
        80
    }

    const fn default_api_version() -> u32 {
        1
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::builder()
            .host(self.host.clone())
            .port(self.port)
            .api_version(self.api_version)
            .build()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ControlConfig {
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// ID of the inverter entry, may be left out or point nowhere.
    #[serde(default)]
    pub inverter: Option<String>,

    /// Either a number or a string, passed to the device as is.
    #[serde(default, deserialize_with = "deserialize_device_id")]
    pub device_id: String,

    pub query: String,
}

fn deserialize_device_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum DeviceId {
        Number(i64),
        Text(String),
    }

    Ok(match DeviceId::deserialize(deserializer)? {
        DeviceId::Number(number) => number.to_string(),
        DeviceId::Text(text) => text,
    })
}
