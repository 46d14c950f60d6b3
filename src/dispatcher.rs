use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::{
    api::{
        QueryKind,
        QueryOptions,
        SolarApi,
        fronius::{Envelope, Verdict},
    },
    host::{Fill, Host, Message, Shape, Status, StatusText},
    prelude::*,
    registry::Endpoint,
};

enum State {
    /// The inverter reference did not resolve, nothing will ever be called.
    Unconfigured,

    Ready(Arc<Endpoint>),
}

/// Queries one inverter on every incoming message.
pub struct Dispatcher {
    id: String,
    name: String,
    device_id: String,
    query: String,
    state: State,
    api: Arc<dyn SolarApi>,
    host: Arc<dyn Host>,
}

#[bon::bon]
impl Dispatcher {
    #[builder]
    pub fn new(
        #[builder(into)] id: String,
        #[builder(into, default)] name: String,
        #[builder(into, default)] device_id: String,
        #[builder(into)] query: String,
        endpoint: Option<Arc<Endpoint>>,
        api: Arc<dyn SolarApi>,
        host: Arc<dyn Host>,
    ) -> Arc<Self> {
        let state = endpoint.map_or(State::Unconfigured, State::Ready);
        let this = Self { id, name, device_id, query, state, api, host };
        if !this.is_configured() {
            this.set_status(Fill::Red, Shape::Ring, "Missing inverter config");
        }
        Arc::new(this)
    }
}

impl Dispatcher {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub const fn is_configured(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    /// Handle the message in a separate task.
    ///
    /// Triggers are not queued: outcomes are reported in the order the calls settle. Dropping the
    /// handle does not cancel the call.
    pub fn trigger(self: &Arc<Self>, message: Message) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.handle(message).await })
    }

    /// Query the inverter and either forward the message with the fresh payload,
    /// or report what went wrong.
    #[instrument(skip_all, fields(control_id = %self.id, query = %self.query))]
    pub async fn handle(&self, mut message: Message) {
        let State::Ready(endpoint) = &self.state else {
            debug!("no inverter configured, ignoring");
            return;
        };

        let kind = match self.query.parse::<QueryKind>() {
            Ok(kind) => kind,
            Err(error) => {
                debug!("{error:#}");
                self.set_status(
                    Fill::Orange,
                    Shape::Dot,
                    format!("could not process query of {}", self.query),
                );
                return;
            }
        };

        let options = self.options(endpoint);
        debug!(operation = kind.operation(), "calling…");
        let envelope =
            match kind.call(self.api.as_ref(), &options).await.and_then(Envelope::try_from) {
                Ok(envelope) => envelope,
                Err(error) => {
                    self.set_status(Fill::Red, Shape::Dot, error);
                    return;
                }
            };

        match envelope.into_verdict() {
            Verdict::Accepted(payload) => {
                message.set_payload(payload);
                self.host.send(&self.id, message);
            }
            Verdict::Rejected { code, user_message } => {
                debug!(%code, "the inverter rejected the query");
                self.set_status(Fill::Orange, Shape::Dot, user_message.unwrap_or_default());
            }
        }
    }

    fn options(&self, endpoint: &Endpoint) -> QueryOptions {
        QueryOptions::builder()
            .host(endpoint.host.clone())
            .port(endpoint.port)
            .device_id(self.device_id.clone())
            .api_version(endpoint.api_version)
            .build()
    }

    fn set_status(&self, fill: Fill, shape: Shape, text: impl Into<StatusText>) {
        let status = Status::builder().fill(fill).shape(shape).text(text).build();
        debug!(control_id = %self.id, %status.fill, %status.shape, %status.text, "status");
        self.host.status(&self.id, status);
    }
}
