//! Fronius Solar API client.
//!
//! The API is served by the inverter's data manager on the local network, without authentication.

mod envelope;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;

pub use self::envelope::{Envelope, Verdict};
use crate::{
    api::{QueryKind, QueryOptions, SolarApi},
    prelude::*,
};

pub struct Api {
    client: Client,
}

impl Api {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().user_agent("fronius-flow").timeout(timeout).build()?;
        Ok(Self { client })
    }

    #[instrument(skip_all, level = Level::DEBUG, fields(host = %options.host, path = path))]
    async fn get<Q: Serialize + Sync>(
        &self,
        options: &QueryOptions,
        path: &str,
        query: &Q,
    ) -> Result<Value> {
        let url = build_url(options, path)?;
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("failed to call `{path}`"))?
            .error_for_status()
            .with_context(|| format!("`{path}` failed"))?
            .json::<Value>()
            .await
            .with_context(|| format!("failed to deserialize `{path}` response JSON"))?;
        debug!(?response, "call succeeded");
        Ok(response)
    }
}

#[async_trait]
impl SolarApi for Api {
    async fn get_inverter_realtime_data(&self, options: &QueryOptions) -> Result<Value> {
        let path = solar_api_path(options.api_version, QueryKind::Inverter, "cgi")?;
        let query = DeviceScopeRequest {
            device_id: &options.device_id,
            data_collection: Some("CommonInverterData"),
            ..DeviceScopeRequest::default()
        };
        self.get(options, &path, &query).await
    }

    /// The components listing belongs to the web interface and is not versioned.
    async fn get_components_data(&self, options: &QueryOptions) -> Result<Value> {
        #[derive(Serialize)]
        struct GetComponentsRequest {
            print: &'static str,
        }

        self.get(options, "components/5/0/", &GetComponentsRequest { print: "names" }).await
    }

    async fn get_power_flow_realtime_data(&self, options: &QueryOptions) -> Result<Value> {
        let path = solar_api_path(options.api_version, QueryKind::PowerFlow, "fcgi")?;
        self.get(options, &path, &()).await
    }

    async fn get_storage_realtime_data(&self, options: &QueryOptions) -> Result<Value> {
        let path = solar_api_path(options.api_version, QueryKind::Storage, "cgi")?;
        let query =
            DeviceScopeRequest { device_id: &options.device_id, ..DeviceScopeRequest::default() };
        self.get(options, &path, &query).await
    }

    async fn get_meter_realtime_data(&self, options: &QueryOptions) -> Result<Value> {
        let path = solar_api_path(options.api_version, QueryKind::PowerMeter, "cgi")?;
        let query =
            DeviceScopeRequest { device_id: &options.device_id, ..DeviceScopeRequest::default() };
        self.get(options, &path, &query).await
    }
}

#[derive(Serialize)]
struct DeviceScopeRequest<'a> {
    #[serde(rename = "Scope")]
    scope: &'static str,

    #[serde(rename = "DeviceId")]
    device_id: &'a str,

    #[serde(rename = "DataCollection", skip_serializing_if = "Option::is_none")]
    data_collection: Option<&'static str>,
}

impl Default for DeviceScopeRequest<'_> {
    fn default() -> Self {
        Self { scope: "Device", device_id: "", data_collection: None }
    }
}

fn build_url(options: &QueryOptions, path: &str) -> Result<Url> {
    ensure!(!options.host.is_empty(), "the inverter host is empty");
    let port = u16::try_from(options.port)
        .ok()
        .filter(|port| *port != 0)
        .with_context(|| format!("invalid port number {}", options.port))?;
    let base_url = Url::parse(&format!("http://{}:{port}/", options.host))
        .with_context(|| format!("`{}` is an invalid host", options.host))?;
    base_url.join(path).with_context(|| format!("`{path}` is an invalid path"))
}

/// Version 0 lives at the API root, later versions under their own prefix.
fn solar_api_path(api_version: u32, kind: QueryKind, extension: &str) -> Result<String> {
    let operation = kind.operation();
    match api_version {
        0 => Ok(format!("solar_api/{operation}.{extension}")),
        1 => Ok(format!("solar_api/v1/{operation}.{extension}")),
        _ => bail!("unsupported Solar API version {api_version}"),
    }
}
