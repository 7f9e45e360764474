use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{CollectorUpdate, DashboardStats, LogEntry};

pub const COLLECTOR_UPDATE: &str = "collector-update";
pub const NEW_LOG: &str = "new-log";
pub const STATS_UPDATE: &str = "stats-update";

/// Tags the console subscribes to on connect. Everything else the server
/// broadcasts (acks, alerts, pongs) lands in [`Routed::Unrecognized`].
pub const SUBSCRIBED_KINDS: [&str; 3] = [COLLECTOR_UPDATE, NEW_LOG, STATS_UPDATE];

/// Outer shape of every push-channel message. The payload stays a raw
/// `Value` until the tag has been matched, so a bad payload can never take
/// the channel down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    CollectorUpdate(CollectorUpdate),
    NewLog(LogEntry),
    StatsUpdate(DashboardStats),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Routed {
    Event(PushEvent),
    Unrecognized { kind: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PushDecodeError {
    #[error("malformed push envelope: {0}")]
    Envelope(String),
    #[error("malformed '{kind}' payload: {detail}")]
    Payload { kind: String, detail: String },
}

/// Decode one text frame from the push channel. Fails closed: a recognized
/// tag with a payload that does not fit its shape is an error for that one
/// message, an unrecognized tag is reported as such, and neither outcome
/// affects later messages.
pub fn decode_push_message(text: &str) -> Result<Routed, PushDecodeError> {
    let envelope: PushEnvelope =
        serde_json::from_str(text).map_err(|err| PushDecodeError::Envelope(err.to_string()))?;
    decode_envelope(envelope)
}

pub fn decode_envelope(envelope: PushEnvelope) -> Result<Routed, PushDecodeError> {
    let PushEnvelope { kind, payload } = envelope;
    let event = match kind.as_str() {
        COLLECTOR_UPDATE => PushEvent::CollectorUpdate(decode_payload(&kind, payload)?),
        NEW_LOG => PushEvent::NewLog(decode_payload(&kind, payload)?),
        STATS_UPDATE => PushEvent::StatsUpdate(decode_payload(&kind, payload)?),
        _ => return Ok(Routed::Unrecognized { kind }),
    };
    Ok(Routed::Event(event))
}

fn decode_payload<T: DeserializeOwned>(kind: &str, payload: Value) -> Result<T, PushDecodeError> {
    serde_json::from_value(payload).map_err(|err| PushDecodeError::Payload {
        kind: kind.to_string(),
        detail: err.to_string(),
    })
}

/// Frame asking the server to broadcast events of `kind` to this session.
pub fn subscribe_frame(kind: &str) -> String {
    serde_json::json!({
        "type": "subscribe",
        "data": { "eventType": kind }
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_update_routes_to_its_variant() {
        let routed = decode_push_message(
            r#"{"type":"collector-update","payload":{"collectorName":"weather","status":"RUNNING","message":"cycle started"}}"#,
        )
        .expect("decode");
        match routed {
            Routed::Event(PushEvent::CollectorUpdate(update)) => {
                assert_eq!(update.collector_name, "weather");
                assert_eq!(update.status, "RUNNING");
                assert_eq!(update.message.as_deref(), Some("cycle started"));
            }
            other => panic!("unexpected route: {other:?}"),
        }
    }

    #[test]
    fn new_log_routes_to_its_variant() {
        let routed = decode_push_message(
            r#"{"type":"new-log","payload":{"timestamp":"2026-03-01T10:00:00","level":"ERROR","logger":"c.a.u.CollectorService","message":"boom","exception":"IOException"}}"#,
        )
        .expect("decode");
        match routed {
            Routed::Event(PushEvent::NewLog(entry)) => {
                assert_eq!(entry.level, "ERROR");
                assert_eq!(entry.logger, "c.a.u.CollectorService");
                assert_eq!(entry.exception.as_deref(), Some("IOException"));
            }
            other => panic!("unexpected route: {other:?}"),
        }
    }

    #[test]
    fn stats_update_routes_partial_fields() {
        let routed =
            decode_push_message(r#"{"type":"stats-update","payload":{"activeCollectors":3}}"#)
                .expect("decode");
        match routed {
            Routed::Event(PushEvent::StatsUpdate(stats)) => {
                assert_eq!(stats.active_collectors, Some(3));
                assert!(stats.total_contents.is_none());
            }
            other => panic!("unexpected route: {other:?}"),
        }
    }

    #[test]
    fn unrecognized_tag_is_reported_not_rejected() {
        for raw in [
            r#"{"type":"pong","payload":{"timestamp":"2026-03-01T10:00:00"}}"#,
            r#"{"type":"connection","payload":{"sessionId":"abc"}}"#,
            r#"{"type":"alert","payload":{"level":"warning","title":"disk"}}"#,
        ] {
            match decode_push_message(raw).expect("decode") {
                Routed::Unrecognized { .. } => {}
                other => panic!("unexpected route for {raw}: {other:?}"),
            }
        }
    }

    #[test]
    fn malformed_envelope_is_an_error() {
        let err = decode_push_message("{not json").unwrap_err();
        assert!(matches!(err, PushDecodeError::Envelope(_)));

        let err = decode_push_message(r#"{"payload":{}}"#).unwrap_err();
        assert!(matches!(err, PushDecodeError::Envelope(_)));
    }

    #[test]
    fn recognized_tag_with_bad_payload_fails_closed() {
        let err = decode_push_message(r#"{"type":"collector-update","payload":{"status":"x"}}"#)
            .unwrap_err();
        match err {
            PushDecodeError::Payload { kind, .. } => assert_eq!(kind, COLLECTOR_UPDATE),
            other => panic!("unexpected error: {other:?}"),
        }

        let err =
            decode_push_message(r#"{"type":"stats-update","payload":"not-an-object"}"#).unwrap_err();
        assert!(matches!(err, PushDecodeError::Payload { .. }));
    }

    #[test]
    fn missing_payload_defaults_to_null_value() {
        // The server's ack frames sometimes omit the payload entirely.
        match decode_push_message(r#"{"type":"subscribed"}"#).expect("decode") {
            Routed::Unrecognized { kind } => assert_eq!(kind, "subscribed"),
            other => panic!("unexpected route: {other:?}"),
        }
    }

    #[test]
    fn subscribe_frame_carries_event_type() {
        let frame = subscribe_frame(NEW_LOG);
        let value: Value = serde_json::from_str(&frame).expect("frame is json");
        assert_eq!(value["type"], "subscribe");
        assert_eq!(value["data"]["eventType"], "new-log");
    }
}
