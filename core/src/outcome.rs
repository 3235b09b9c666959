use serde_json::Value;

use crate::errors::UpstreamError;

pub const NO_RESPONSE: &str = "no response";
pub const NO_NAME: &str = "noname";
pub const SERVER_ERROR: &str = "Server Error!!!";
pub const BAD_RESPONSE: &str = "Bad Response!!!";

/// Result of relaying one payload to the upstream server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// The response carried a usable `name`.
    Named(String),
    /// The response was a JSON value without a usable `name`.
    Unnamed,
    /// The body was empty or parsed to a falsy JSON value.
    NoResponse,
    /// The request never produced a response.
    ServerError,
    /// The body was not JSON.
    BadResponse,
}

impl RelayOutcome {
    pub fn reply_text(&self) -> &str {
        match self {
            RelayOutcome::Named(name) => name,
            RelayOutcome::Unnamed => NO_NAME,
            RelayOutcome::NoResponse => NO_RESPONSE,
            RelayOutcome::ServerError => SERVER_ERROR,
            RelayOutcome::BadResponse => BAD_RESPONSE,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RelayOutcome::Named(_) => "named",
            RelayOutcome::Unnamed => "unnamed",
            RelayOutcome::NoResponse => "no_response",
            RelayOutcome::ServerError => "server_error",
            RelayOutcome::BadResponse => "bad_response",
        }
    }
}

/// Interprets a response body the way the watch app always has: JSON with an
/// optional `name`, where null, false, 0 and "" count as absent.
pub fn interpret_body(body: &str) -> Result<RelayOutcome, UpstreamError> {
    if body.trim().is_empty() {
        return Ok(RelayOutcome::NoResponse);
    }

    let value: Value = serde_json::from_str(body).map_err(|e| UpstreamError::MalformedBody {
        reason: e.to_string(),
    })?;

    if !is_truthy(&value) {
        return Ok(RelayOutcome::NoResponse);
    }

    match value.get("name") {
        Some(name) if is_truthy(name) => Ok(RelayOutcome::Named(display_text(name))),
        _ => Ok(RelayOutcome::Unnamed),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_forwarded() {
        let outcome = interpret_body(r#"{"name": "Alice"}"#).unwrap();
        assert_eq!(outcome, RelayOutcome::Named("Alice".to_string()));
        assert_eq!(outcome.reply_text(), "Alice");
    }

    #[test]
    fn test_server_style_body_with_newlines() {
        let body = "{\n\"name\":\"H: 21.5 L: 19.0 AVG: 20.2\"\n}\n";
        assert_eq!(
            interpret_body(body).unwrap().reply_text(),
            "H: 21.5 L: 19.0 AVG: 20.2"
        );
    }

    #[test]
    fn test_missing_or_falsy_name_is_unnamed() {
        for body in [r#"{}"#, r#"{"name": ""}"#, r#"{"name": null}"#, r#"{"name": 0}"#, "[1, 2]", r#""hello""#] {
            assert_eq!(interpret_body(body).unwrap(), RelayOutcome::Unnamed, "body: {body}");
        }
    }

    #[test]
    fn test_empty_and_falsy_bodies_are_no_response() {
        for body in ["", "   \n", "null", "false", "0", r#""""#] {
            assert_eq!(interpret_body(body).unwrap(), RelayOutcome::NoResponse, "body: {body:?}");
        }
    }

    #[test]
    fn test_non_string_name_is_rendered() {
        assert_eq!(
            interpret_body(r#"{"name": 42}"#).unwrap().reply_text(),
            "42"
        );
        assert_eq!(
            interpret_body(r#"{"name": true}"#).unwrap().reply_text(),
            "true"
        );
    }

    #[test]
    fn test_malformed_body_is_an_error() {
        let err = interpret_body("not json").unwrap_err();
        assert!(matches!(err, UpstreamError::MalformedBody { .. }));
        assert_eq!(err.outcome().reply_text(), BAD_RESPONSE);
    }

    #[test]
    fn test_fixed_reply_texts() {
        assert_eq!(RelayOutcome::Unnamed.reply_text(), "noname");
        assert_eq!(RelayOutcome::NoResponse.reply_text(), "no response");
        assert_eq!(RelayOutcome::ServerError.reply_text(), "Server Error!!!");
    }
}
