//! Hosting runtime side of a control: the status indicator and the outgoing wire.

use std::{str::FromStr, sync::Arc};

use bon::Builder;
use derive_more::{Deref, DerefMut, Display, From, Into};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::prelude::*;

/// Accepts what the controls emit.
pub trait Host: Send + Sync {
    /// Update the status indicator of the control.
    fn status(&self, control_id: &str, status: Status);

    /// Forward the message to whatever is wired to the control.
    fn send(&self, control_id: &str, message: Message);
}

#[derive(Copy, Clone, Debug, Display, Eq, PartialEq)]
pub enum Fill {
    #[display("red")]
    Red,

    #[display("orange")]
    Orange,
}

#[derive(Copy, Clone, Debug, Default, Display, Eq, PartialEq)]
pub enum Shape {
    #[default]
    #[display("dot")]
    Dot,

    /// Hollow marker, reserved for configuration errors.
    #[display("ring")]
    Ring,
}

#[derive(Clone, Debug, Display, From)]
pub enum StatusText {
    #[display("{_0}")]
    Message(String),

    /// The error itself so that consumers could inspect its chain.
    #[display("{_0:#}")]
    Error(Arc<Error>),
}

impl From<&str> for StatusText {
    fn from(message: &str) -> Self {
        Self::Message(message.to_owned())
    }
}

impl From<Error> for StatusText {
    fn from(error: Error) -> Self {
        Self::Error(Arc::new(error))
    }
}

#[must_use]
#[derive(Clone, Debug, Builder)]
pub struct Status {
    pub fill: Fill,

    #[builder(default)]
    pub shape: Shape,

    #[builder(into)]
    pub text: StatusText,
}

/// Flow message: an arbitrary JSON object travelling along the wires.
#[must_use]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Deref, DerefMut, From, Into)]
#[serde(transparent)]
pub struct Message(Map<String, Value>);

impl Message {
    pub fn set_payload(&mut self, payload: Value) {
        self.0.insert("payload".to_owned(), payload);
    }
}

impl TryFrom<Value> for Message {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(properties) => Ok(Self(properties)),
            _ => bail!("a message must be a JSON object"),
        }
    }
}

impl FromStr for Message {
    type Err = Error;

    fn from_str(json: &str) -> Result<Self> {
        serde_json::from_str::<Value>(json)
            .with_context(|| format!("`{json}` is not valid JSON"))?
            .try_into()
    }
}

/// Logs statuses and prints forwarded messages as JSON lines.
pub struct ConsoleHost;

impl Host for ConsoleHost {
    fn status(&self, control_id: &str, status: Status) {
        let Status { fill, shape, text } = status;
        match fill {
            Fill::Red => error!(control_id, %shape, "{text}"),
            Fill::Orange => warn!(control_id, %shape, "{text}"),
        }
    }

    fn send(&self, control_id: &str, message: Message) {
        match serde_json::to_string(&message) {
            Ok(json) => println!("{json}"),
            Err(error) => error!(control_id, "failed to serialize the message: {error:#}"),
        }
    }
}
