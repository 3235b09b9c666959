pub mod json_lines;

use serde::{Deserialize, Serialize};

use crate::errors::ChannelError;

/// An event delivered by the watch, e.g. `{"payload": {"hello_msg": "b"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct InboundEvent {
    pub payload: EventPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EventPayload {
    /// Opaque request string forwarded as the request path.
    pub hello_msg: String,
}

impl InboundEvent {
    pub fn new(hello_msg: impl Into<String>) -> Self {
        Self {
            payload: EventPayload {
                hello_msg: hello_msg.into(),
            },
        }
    }

    pub fn hello_msg(&self) -> &str {
        &self.payload.hello_msg
    }
}

/// The reply sent back to the watch. Serializes as `{"0": text}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OutboundMessage {
    #[serde(rename = "0")]
    pub text: String,
}

impl OutboundMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// The messaging link between the relay and the watch.
///
/// `Relay::run` drives a channel from a single task, so the returned futures
/// carry no `Send` bound.
#[allow(async_fn_in_trait)]
pub trait DeviceChannel {
    /// Waits for the next event. `Ok(None)` means the device hung up.
    ///
    /// A `ChannelError::MalformedEvent` applies to one event only; the channel
    /// stays usable afterwards.
    async fn next_event(&self) -> Result<Option<InboundEvent>, ChannelError>;

    /// Delivers one reply to the device.
    async fn send(&self, message: &OutboundMessage) -> Result<(), ChannelError>;
}
