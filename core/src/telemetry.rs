use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::outcome::RelayOutcome;

/// Logs go to stderr; stdout may be the device channel.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relay_core=info,runner_container=info,bootstrap=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct RelayMetrics {
    pub total_events: usize,
    pub named_replies: usize,
    pub unnamed_replies: usize,
    pub empty_replies: usize,
    pub server_errors: usize,
    pub bad_responses: usize,
    pub failed_sends: usize,
    pub last_reply_at: Option<DateTime<Utc>>,
}

impl RelayMetrics {
    pub fn record(&mut self, outcome: &RelayOutcome) {
        self.total_events += 1;
        match outcome {
            RelayOutcome::Named(_) => self.named_replies += 1,
            RelayOutcome::Unnamed => self.unnamed_replies += 1,
            RelayOutcome::NoResponse => self.empty_replies += 1,
            RelayOutcome::ServerError => self.server_errors += 1,
            RelayOutcome::BadResponse => self.bad_responses += 1,
        }
        self.last_reply_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts_each_outcome() {
        let mut metrics = RelayMetrics::default();
        metrics.record(&RelayOutcome::Named("Alarm Reset".to_string()));
        metrics.record(&RelayOutcome::ServerError);
        metrics.record(&RelayOutcome::ServerError);

        assert_eq!(metrics.total_events, 3);
        assert_eq!(metrics.named_replies, 1);
        assert_eq!(metrics.server_errors, 2);
        assert_eq!(metrics.bad_responses, 0);
        assert!(metrics.last_reply_at.is_some());
    }
}
