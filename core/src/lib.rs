pub mod channel;
pub mod command;
pub mod config;
pub mod errors;
pub mod outcome;
pub mod relay;
pub mod telemetry;
pub mod upstream;

pub use channel::{DeviceChannel, InboundEvent, OutboundMessage};
pub use config::RelayConfig;
pub use errors::{RelayError, Result};
pub use outcome::RelayOutcome;
pub use relay::Relay;
