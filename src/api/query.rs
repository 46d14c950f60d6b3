use std::{fmt, str::FromStr};

use async_trait::async_trait;
use bon::Builder;
use itertools::Itertools;
use serde_json::Value;

use crate::prelude::*;

/// Addressing options passed to every remote operation.
#[must_use]
#[derive(Clone, Debug, Eq, PartialEq, Builder)]
pub struct QueryOptions {
    #[builder(into)]
    pub host: String,

    /// Not range-checked here: an invalid port only fails in the transport.
    pub port: i32,

    #[builder(into)]
    pub device_id: String,

    pub api_version: u32,
}

/// Remote operations of the Solar API, one per [`QueryKind`].
///
/// Every operation resolves to the raw response JSON. Validating the envelope is up to the caller.
#[async_trait]
pub trait SolarApi: Send + Sync {
    async fn get_inverter_realtime_data(&self, options: &QueryOptions) -> Result<Value>;

    async fn get_components_data(&self, options: &QueryOptions) -> Result<Value>;

    async fn get_power_flow_realtime_data(&self, options: &QueryOptions) -> Result<Value>;

    async fn get_storage_realtime_data(&self, options: &QueryOptions) -> Result<Value>;

    async fn get_meter_realtime_data(&self, options: &QueryOptions) -> Result<Value>;
}

#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum QueryKind {
    Inverter,
    Components,
    PowerFlow,
    Storage,
    PowerMeter,
}

impl QueryKind {
    pub const ALL: [Self; 5] =
        [Self::Inverter, Self::Components, Self::PowerFlow, Self::Storage, Self::PowerMeter];

    /// Configuration key of the query kind.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Inverter => "inverter",
            Self::Components => "components",
            Self::PowerFlow => "powerflow",
            Self::Storage => "storage",
            Self::PowerMeter => "powermeter",
        }
    }

    /// Name of the remote operation serving the query kind.
    pub const fn operation(self) -> &'static str {
        match self {
            Self::Inverter => "GetInverterRealtimeData",
            Self::Components => "GetComponentsData",
            Self::PowerFlow => "GetPowerFlowRealtimeData",
            Self::Storage => "GetStorageRealtimeData",
            Self::PowerMeter => "GetMeterRealtimeData",
        }
    }

    /// Invoke the matching remote operation exactly once.
    pub async fn call(self, api: &dyn SolarApi, options: &QueryOptions) -> Result<Value> {
        match self {
            Self::Inverter => api.get_inverter_realtime_data(options).await,
            Self::Components => api.get_components_data(options).await,
            Self::PowerFlow => api.get_power_flow_realtime_data(options).await,
            Self::Storage => api.get_storage_realtime_data(options).await,
            Self::PowerMeter => api.get_meter_realtime_data(options).await,
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for QueryKind {
    type Err = Error;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|kind| kind.key() == key).with_context(|| {
            format!("unknown query kind `{key}`, expected one of: {}", Self::ALL.iter().join(", "))
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testing::FakeApi;

    #[test]
    fn parse_known_keys_ok() -> Result {
        for kind in QueryKind::ALL {
            assert_eq!(kind.key().parse::<QueryKind>()?, kind);
        }
        Ok(())
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert!("Inverter".parse::<QueryKind>().is_err());
        assert!("power-flow".parse::<QueryKind>().is_err());
        assert!("".parse::<QueryKind>().is_err());
    }

    #[test]
    fn unknown_key_error_lists_supported_kinds() {
        let error = "unknown".parse::<QueryKind>().unwrap_err().to_string();
        assert!(error.contains("`unknown`"));
        assert!(error.contains("inverter, components, powerflow, storage, powermeter"));
    }

    #[test]
    fn operations_are_distinct() {
        let operations = QueryKind::ALL.map(QueryKind::operation);
        assert_eq!(operations.iter().unique().count(), QueryKind::ALL.len());
        assert_eq!(QueryKind::PowerMeter.operation(), "GetMeterRealtimeData");
    }

    #[tokio::test]
    async fn call_dispatches_to_matching_operation() -> Result {
        let options = QueryOptions::builder()
            .host("localhost")
            .port(80)
            .device_id("1")
            .api_version(1)
            .build();
        for kind in QueryKind::ALL {
            let api = FakeApi::default().resolves(json!({ "kind": kind.key() }));
            let response = kind.call(&api, &options).await?;
            assert_eq!(response, json!({ "kind": kind.key() }));
            assert_eq!(api.calls(), vec![(kind, options.clone())]);
        }
        Ok(())
    }
}
