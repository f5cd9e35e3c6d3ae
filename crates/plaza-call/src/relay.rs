//! Signaling relay: opaque payloads from one player to another.
//!
//! The relay never looks inside a payload. Offers, answers and candidates
//! all look the same from here.

use plaza_protocol::{PlayerId, ServerMessage, SignalPayload};

use crate::RelayError;

/// Where relayed messages go. Implemented by whatever owns the live
/// connections; tests use an in-memory stand-in.
pub trait Outbox {
    /// Whether `id` currently has a live connection.
    fn is_connected(&self, id: PlayerId) -> bool;

    /// Queues `msg` for `to`. Returns `false` if it could not be queued.
    fn deliver(&mut self, to: PlayerId, msg: ServerMessage) -> bool;
}

/// Forwards `payload` from `from` to `to`, unmodified.
///
/// Senders are not checked against the registry or against session state;
/// stray signaling is harmless and the clients sort it out.
///
/// # Errors
/// [`RelayError::TargetUnavailable`] if `to` has no live connection. The
/// message is dropped.
pub fn relay(
    outbox: &mut impl Outbox,
    from: PlayerId,
    to: PlayerId,
    payload: SignalPayload,
) -> Result<(), RelayError> {
    if !outbox.is_connected(to) {
        tracing::debug!(%from, %to, "signal target not connected, dropping");
        return Err(RelayError::TargetUnavailable(to));
    }

    if !outbox.deliver(to, ServerMessage::SignalReceived { from, payload }) {
        tracing::warn!(%from, %to, "signal target went away mid-relay, dropping");
        return Err(RelayError::TargetUnavailable(to));
    }

    tracing::trace!(%from, %to, "signal relayed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use serde_json::json;

    use super::*;

    #[derive(Default)]
    struct MemoryOutbox {
        connected: HashSet<PlayerId>,
        sent: Vec<(PlayerId, ServerMessage)>,
        refuse: bool,
    }

    impl Outbox for MemoryOutbox {
        fn is_connected(&self, id: PlayerId) -> bool {
            self.connected.contains(&id)
        }

        fn deliver(&mut self, to: PlayerId, msg: ServerMessage) -> bool {
            if self.refuse {
                return false;
            }
            self.sent.push((to, msg));
            true
        }
    }

    #[test]
    fn test_relay_connected_target_receives_payload_verbatim() {
        let mut outbox = MemoryOutbox {
            connected: HashSet::from([PlayerId(2)]),
            ..Default::default()
        };
        let payload = json!({"type": "offer", "sdp": "v=0\r\no=- 46117 2 IN IP4 127.0.0.1\r\n"});

        relay(&mut outbox, PlayerId(1), PlayerId(2), payload.clone()).unwrap();

        assert_eq!(
            outbox.sent,
            vec![(
                PlayerId(2),
                ServerMessage::SignalReceived {
                    from: PlayerId(1),
                    payload
                }
            )]
        );
    }

    #[test]
    fn test_relay_non_object_payloads_pass_through_unchanged() {
        let mut outbox = MemoryOutbox {
            connected: HashSet::from([PlayerId(2)]),
            ..Default::default()
        };
        let payloads = [
            json!(null),
            json!("candidate:0 1 UDP 2122252543 10.0.0.2 50000 typ host"),
            json!([1, 2, 3]),
            json!({"nested": {"sdpMLineIndex": 0, "usernameFragment": null}}),
        ];

        for payload in &payloads {
            relay(&mut outbox, PlayerId(1), PlayerId(2), payload.clone()).unwrap();
        }

        let received: Vec<SignalPayload> = outbox
            .sent
            .into_iter()
            .map(|(_, msg)| match msg {
                ServerMessage::SignalReceived { payload, .. } => payload,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(received, payloads);
    }

    #[test]
    fn test_relay_disconnected_target_is_dropped() {
        let mut outbox = MemoryOutbox::default();

        let err = relay(&mut outbox, PlayerId(1), PlayerId(2), json!("x")).unwrap_err();

        assert_eq!(err, RelayError::TargetUnavailable(PlayerId(2)));
        assert!(outbox.sent.is_empty());
    }

    #[test]
    fn test_relay_failed_delivery_reports_unavailable() {
        let mut outbox = MemoryOutbox {
            connected: HashSet::from([PlayerId(2)]),
            refuse: true,
            ..Default::default()
        };

        let result = relay(&mut outbox, PlayerId(1), PlayerId(2), json!("x"));

        assert_eq!(result, Err(RelayError::TargetUnavailable(PlayerId(2))));
    }

    #[test]
    fn test_relay_preserves_order_between_same_pair() {
        let mut outbox = MemoryOutbox {
            connected: HashSet::from([PlayerId(2)]),
            ..Default::default()
        };

        for i in 0..5 {
            relay(&mut outbox, PlayerId(1), PlayerId(2), json!({ "candidate": i })).unwrap();
        }

        let payloads: Vec<SignalPayload> = outbox
            .sent
            .into_iter()
            .filter_map(|(_, msg)| match msg {
                ServerMessage::SignalReceived { payload, .. } => Some(payload),
                _ => None,
            })
            .collect();
        let expected: Vec<SignalPayload> = (0..5).map(|i| json!({ "candidate": i })).collect();
        assert_eq!(payloads, expected);
    }
}
