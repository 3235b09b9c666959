use std::fmt;

/// Commands the WatchDog watch face sends. The server only looks at the first
/// character of the request path, so a payload is classified the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ToggleUnit,
    LatestReading,
    Statistics,
    AlertMessage,
    ResetAlarm,
    ToggleStandby,
    AlarmStatus,
    Unknown,
}

impl Command {
    pub fn from_payload(payload: &str) -> Self {
        match payload.chars().next() {
            Some('a') => Command::ToggleUnit,
            Some('b') => Command::LatestReading,
            Some('d') => Command::Statistics,
            Some('m') => Command::AlertMessage,
            Some('r') => Command::ResetAlarm,
            Some('s') => Command::ToggleStandby,
            Some('t') => Command::AlarmStatus,
            _ => Command::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Command::ToggleUnit => "toggle_unit",
            Command::LatestReading => "latest_reading",
            Command::Statistics => "statistics",
            Command::AlertMessage => "alert_message",
            Command::ResetAlarm => "reset_alarm",
            Command::ToggleStandby => "toggle_standby",
            Command::AlarmStatus => "alarm_status",
            Command::Unknown => "unknown",
        }
    }

    /// Alarm status replies are polled every other second; only a tripped
    /// alarm is worth more than a debug line.
    pub fn is_alarm_tripped(&self, reply: &str) -> bool {
        *self == Command::AlarmStatus && reply == "tripped"
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
