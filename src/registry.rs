use std::{
    collections::{HashMap, hash_map::Entry},
    sync::Arc,
};

use bon::Builder;

use crate::prelude::*;

/// Connection parameters of a single inverter.
///
/// The values are taken as configured: an empty host or an out-of-range port only fails once the
/// transport tries to use them.
#[must_use]
#[derive(Clone, Debug, Eq, PartialEq, Builder)]
pub struct Endpoint {
    #[builder(into)]
    pub host: String,

    pub port: i32,

    pub api_version: u32,
}

/// Inverter endpoints by their configuration ID.
#[derive(Default)]
pub struct Registry(HashMap<String, Arc<Endpoint>>);

impl Registry {
    pub fn insert(&mut self, id: impl Into<String>, endpoint: Endpoint) -> Result {
        match self.0.entry(id.into()) {
            Entry::Occupied(entry) => bail!("inverter `{}` is defined more than once", entry.key()),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(endpoint));
                Ok(())
            }
        }
    }

    /// Look the endpoint up. The caller gets a shared reference, never a copy.
    #[must_use]
    pub fn resolve(&self, reference: Option<&str>) -> Option<Arc<Endpoint>> {
        self.0.get(reference?).cloned()
    }
}
