use std::sync::Arc;

use itertools::Itertools;

use crate::{
    api::SolarApi,
    config::FlowConfig,
    dispatcher::Dispatcher,
    host::Host,
    prelude::*,
    registry::Registry,
};

/// Controls wired to their inverters.
pub struct Flow {
    dispatchers: Vec<Arc<Dispatcher>>,
}

impl Flow {
    pub fn new(config: &FlowConfig, api: &Arc<dyn SolarApi>, host: &Arc<dyn Host>) -> Result<Self> {
        let mut registry = Registry::default();
        for inverter in &config.inverters {
            registry.insert(&inverter.id, inverter.endpoint())?;
        }

        if let Some(id) = config.controls.iter().map(|control| &control.id).duplicates().next() {
            bail!("control `{id}` is defined more than once");
        }
        let dispatchers = config
            .controls
            .iter()
            .map(|control| {
                Dispatcher::builder()
                    .id(&control.id)
                    .name(&control.name)
                    .device_id(&control.device_id)
                    .query(&control.query)
                    .maybe_endpoint(registry.resolve(control.inverter.as_deref()))
                    .api(Arc::clone(api))
                    .host(Arc::clone(host))
                    .build()
            })
            .collect();
        Ok(Self { dispatchers })
    }

    pub fn dispatchers(&self) -> &[Arc<Dispatcher>] {
        &self.dispatchers
    }

    pub fn dispatcher(&self, id: &str) -> Result<&Arc<Dispatcher>> {
        self.dispatchers
            .iter()
            .find(|dispatcher| dispatcher.id() == id)
            .with_context(|| format!("there is no control `{id}`"))
    }
}
