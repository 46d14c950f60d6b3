use serde_json::{Map, Value};

use crate::prelude::*;

/// Solar API response with a structurally sound head.
///
/// The status code is kept as raw JSON: the device is trusted only when it is a number equal to
/// zero, a string `"0"` does not count.
pub struct Envelope(Value);

/// Outcome of a well-formed envelope.
#[must_use]
#[derive(Debug, PartialEq)]
pub enum Verdict {
    /// The device reported success, holds `Body.Data`.
    Accepted(Value),

    /// The device reported an error.
    Rejected { code: Value, user_message: Option<String> },
}

impl Envelope {
    pub fn into_verdict(self) -> Verdict {
        if is_valid_head(&self.0) {
            return Verdict::Accepted(extract_payload(&self.0));
        }
        let status = &self.0["Head"]["Status"];
        Verdict::Rejected {
            code: status["Code"].clone(),
            user_message: status["UserMessage"].as_str().map(str::to_owned),
        }
    }
}

impl TryFrom<Value> for Envelope {
    type Error = Error;

    fn try_from(response: Value) -> Result<Self> {
        ensure!(
            response.pointer("/Head/Status").is_some_and(Value::is_object),
            "the response is not a Solar API envelope: `Head.Status` is missing",
        );
        Ok(Self(response))
    }
}

/// Check the envelope head of an arbitrary response.
pub fn is_valid_head(response: &Value) -> bool {
    response.pointer("/Head/Status/Code").is_some_and(is_zero)
}

/// Extract `Body.Data` of an arbitrary response, or an empty object when there is none.
pub fn extract_payload(response: &Value) -> Value {
    payload_or_empty(response.pointer("/Body/Data").cloned())
}

fn is_zero(code: &Value) -> bool {
    code.as_f64() == Some(0.0)
}

fn payload_or_empty(data: Option<Value>) -> Value {
    match data {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(data) => data,
    }
}
