use serde::{Deserialize, Serialize};

/// Body returned by every time endpoint.
///
/// `T` is a `String` for the ISO routes and an `i64` for the timestamp route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeResponse<T> {
    pub time: T,
}

pub const STATUS_POLL_COMMAND: &str = "getChannel1Status";

/// MQTT command asking the gateway for the channel 1 sensor status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusPoll {
    pub command: String,
    pub id: String,
}

impl StatusPoll {
    pub fn for_device(guid: &str) -> Self {
        Self {
            command: STATUS_POLL_COMMAND.to_string(),
            id: guid.to_string(),
        }
    }
}
