//! Fakes for the remote API and the hosting runtime.

use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::{
    api::{QueryKind, QueryOptions, SolarApi},
    host::{Host, Message, Status},
    prelude::*,
};

enum Response {
    Ready(Result<Value>),
    Pending(oneshot::Receiver<Result<Value>>),
}

/// Replays queued responses in call order and records the calls.
#[derive(Default)]
pub struct FakeApi {
    responses: Mutex<VecDeque<Response>>,
    calls: Mutex<Vec<(QueryKind, QueryOptions)>>,
}

impl FakeApi {
    pub fn resolves(self, response: Value) -> Self {
        self.responses.lock().unwrap().push_back(Response::Ready(Ok(response)));
        self
    }

    pub fn rejects(self, error: Error) -> Self {
        self.responses.lock().unwrap().push_back(Response::Ready(Err(error)));
        self
    }

    /// Queue a response that is only settled through the returned sender.
    pub fn pending(&self) -> oneshot::Sender<Result<Value>> {
        let (sender, receiver) = oneshot::channel();
        self.responses.lock().unwrap().push_back(Response::Pending(receiver));
        sender
    }

    pub fn calls(&self) -> Vec<(QueryKind, QueryOptions)> {
        self.calls.lock().unwrap().clone()
    }

    async fn respond(&self, kind: QueryKind, options: &QueryOptions) -> Result<Value> {
        self.calls.lock().unwrap().push((kind, options.clone()));
        let response = self.responses.lock().unwrap().pop_front();
        match response {
            Some(Response::Ready(response)) => response,
            Some(Response::Pending(receiver)) => receiver.await?,
            None => bail!("no response queued for `{}`", kind.operation()),
        }
    }
}

#[async_trait]
impl SolarApi for FakeApi {
    async fn get_inverter_realtime_data(&self, options: &QueryOptions) -> Result<Value> {
        self.respond(QueryKind::Inverter, options).await
    }

    async fn get_components_data(&self, options: &QueryOptions) -> Result<Value> {
        self.respond(QueryKind::Components, options).await
    }

    async fn get_power_flow_realtime_data(&self, options: &QueryOptions) -> Result<Value> {
        self.respond(QueryKind::PowerFlow, options).await
    }

    async fn get_storage_realtime_data(&self, options: &QueryOptions) -> Result<Value> {
        self.respond(QueryKind::Storage, options).await
    }

    async fn get_meter_realtime_data(&self, options: &QueryOptions) -> Result<Value> {
        self.respond(QueryKind::PowerMeter, options).await
    }
}

/// Records everything the controls emit.
#[derive(Default)]
pub struct RecordingHost {
    statuses: Mutex<Vec<(String, Status)>>,
    messages: Mutex<Vec<(String, Message)>>,
}

impl RecordingHost {
    pub fn statuses(&self) -> Vec<(String, Status)> {
        self.statuses.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().unwrap().iter().map(|(_, message)| message.clone()).collect()
    }
}

impl Host for RecordingHost {
    fn status(&self, control_id: &str, status: Status) {
        self.statuses.lock().unwrap().push((control_id.to_owned(), status));
    }

    fn send(&self, control_id: &str, message: Message) {
        self.messages.lock().unwrap().push((control_id.to_owned(), message));
    }
}
