use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::stream::{self, TryStreamExt};
use tracing::{debug, error, info, warn};

use crate::channel::{DeviceChannel, InboundEvent, OutboundMessage};
use crate::command::Command;
use crate::config::RelayConfig;
use crate::errors::{self, ChannelError, RelayError};
use crate::outcome::{interpret_body, RelayOutcome};
use crate::telemetry::RelayMetrics;
use crate::upstream::UpstreamClient;

/// The relay forwards watch events to the upstream server and replies once per event.
pub struct Relay {
    upstream: UpstreamClient,
    metrics: Mutex<RelayMetrics>,
}

impl Relay {
    pub fn new(config: &RelayConfig) -> errors::Result<Self> {
        config.validate()?;
        let upstream = UpstreamClient::new(&config.upstream)?;
        info!("Relaying device events to {}", upstream.base_url());

        Ok(Self {
            upstream,
            metrics: Mutex::new(RelayMetrics::default()),
        })
    }

    /// Sends one request for `payload` and classifies what came back.
    /// Never fails: every error becomes an outcome with its own reply text.
    pub async fn dispatch(&self, payload: &str) -> RelayOutcome {
        let command = Command::from_payload(payload);

        let outcome = match self.upstream.fetch(payload).await {
            Ok(body) => interpret_body(&body).unwrap_or_else(|e| {
                warn!(%command, "Discarding upstream response: {}", e);
                e.outcome()
            }),
            Err(e) => {
                warn!(%command, "Upstream request failed: {}", e);
                e.outcome()
            }
        };

        if command.is_alarm_tripped(outcome.reply_text()) {
            warn!("WatchDog alarm reported as tripped");
        }
        debug!(%command, outcome = outcome.kind(), "Dispatched payload");

        self.lock_metrics().record(&outcome);
        outcome
    }

    /// Relays one event and returns the reply without sending it anywhere.
    pub async fn reply_for(&self, event: &InboundEvent) -> OutboundMessage {
        let outcome = self.dispatch(event.hello_msg()).await;
        OutboundMessage::new(outcome.reply_text())
    }

    /// Relays one event and sends exactly one reply over `channel`.
    pub async fn handle_event<C: DeviceChannel>(
        &self,
        channel: &C,
        event: InboundEvent,
    ) -> errors::Result<OutboundMessage> {
        let reply = self.reply_for(&event).await;

        if let Err(e) = channel.send(&reply).await {
            match e {
                ChannelError::Closed => info!("Device hung up before the reply was sent"),
                _ => error!("Failed to send reply to device: {}", e),
            }
            self.lock_metrics().failed_sends += 1;
            return Err(e.into());
        }

        Ok(reply)
    }

    /// Serves events from `channel` until it closes. Events are handled
    /// concurrently; replies go out in completion order.
    ///
    /// Malformed events are skipped. A receive or send failure stops the loop.
    pub async fn run<C: DeviceChannel>(&self, channel: &C) -> errors::Result<()> {
        let events = stream::unfold(Some(channel), |state| async move {
            let channel = state?;
            loop {
                match channel.next_event().await {
                    Ok(Some(event)) => return Some((Ok(event), Some(channel))),
                    Ok(None) => return None,
                    Err(ChannelError::MalformedEvent { reason }) => {
                        warn!("Skipping malformed device event: {}", reason);
                    }
                    Err(e) => return Some((Err(RelayError::from(e)), None)),
                }
            }
        });

        let result = events
            .try_for_each_concurrent(None, |event| async move {
                self.handle_event(channel, event).await.map(|_| ())
            })
            .await;

        match result {
            Err(e) if e.is_channel_closed() => {
                info!("Device channel closed");
                Ok(())
            }
            other => other,
        }
    }

    pub fn metrics(&self) -> RelayMetrics {
        self.lock_metrics().clone()
    }

    // Counters stay valid even if a holder panicked.
    fn lock_metrics(&self) -> MutexGuard<'_, RelayMetrics> {
        self.metrics.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UpstreamConfig;

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = RelayConfig {
            upstream: UpstreamConfig {
                port: 0,
                ..UpstreamConfig::default()
            },
        };
        assert!(matches!(Relay::new(&config), Err(RelayError::Config(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_server_error() {
        // Bind then drop to get a local port with nothing listening.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let config = RelayConfig {
            upstream: UpstreamConfig {
                host: "127.0.0.1".to_string(),
                port,
                ..UpstreamConfig::default()
            },
        };
        let relay = Relay::new(&config).unwrap();

        let reply = relay.reply_for(&InboundEvent::new("b")).await;
        assert_eq!(reply, OutboundMessage::new("Server Error!!!"));
        assert_eq!(relay.metrics().server_errors, 1);
    }

    #[test]
    fn test_metrics_survive_poisoned_lock() {
        let relay = Relay::new(&RelayConfig::default()).unwrap();
        relay.lock_metrics().failed_sends = 2;

        std::thread::scope(|scope| {
            let _ = scope
                .spawn(|| {
                    let _guard = relay.lock_metrics();
                    panic!("poison the metrics lock");
                })
                .join();
        });

        assert!(relay.metrics.is_poisoned());
        relay.lock_metrics().record(&RelayOutcome::Unnamed);
        let metrics = relay.metrics();
        assert_eq!(metrics.failed_sends, 2);
        assert_eq!(metrics.unnamed_replies, 1);
    }
}
