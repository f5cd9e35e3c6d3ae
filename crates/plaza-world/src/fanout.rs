//! Broadcast/fan-out: who hears about what.
//!
//! Each joined player has one bounded FIFO channel drained by its
//! connection handler. Only the world actor writes to these channels, and
//! it handles one command at a time, so every receiver sees events in the
//! order the actor produced them. In particular, moves from any single
//! source arrive in the order they were applied.
//!
//! A player whose channel fills up has stopped reading. Their channel is
//! dropped on the spot and they are reported through
//! [`Fanout::take_lagging`] so the world can remove them.

use std::collections::HashMap;

use plaza_call::Outbox;
use plaza_protocol::{PlayerId, Recipient, ServerMessage};
use tokio::sync::mpsc::{self, error::TrySendError};

/// Channel sender for delivering outbound messages to a player.
pub type PlayerSender = mpsc::Sender<ServerMessage>;

/// Receiving end of a player's outbound channel, owned by the handler.
pub type PlayerReceiver = mpsc::Receiver<ServerMessage>;

/// Creates an outbound channel holding at most `capacity` undelivered
/// messages.
pub fn player_channel(capacity: usize) -> (PlayerSender, PlayerReceiver) {
    mpsc::channel(capacity.max(1))
}

/// Outbound channels for every joined player.
#[derive(Debug, Default)]
pub struct Fanout {
    senders: HashMap<PlayerId, PlayerSender>,
    lagging: Vec<PlayerId>,
}

impl Fanout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts delivering to `player`. Replaces any previous channel.
    pub fn insert(&mut self, player: PlayerId, sender: PlayerSender) {
        self.senders.insert(player, sender);
    }

    /// Stops delivering to `player`.
    pub fn remove(&mut self, player: PlayerId) -> bool {
        self.senders.remove(&player).is_some()
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }

    /// Sends `msg` to everyone `recipient` names.
    pub fn dispatch(&mut self, recipient: Recipient, msg: ServerMessage) {
        match recipient {
            Recipient::Player(pid) => {
                self.send_to(pid, msg);
            }
            Recipient::All | Recipient::AllExcept(_) => {
                let targets: Vec<PlayerId> = self
                    .senders
                    .keys()
                    .copied()
                    .filter(|pid| recipient != Recipient::AllExcept(*pid))
                    .collect();
                for pid in targets {
                    self.send_to(pid, msg.clone());
                }
            }
        }
    }

    /// Sends to a single player. Returns `false` if the player has no
    /// channel, the handler has already gone away, or the channel is full.
    ///
    /// A full channel drops the player's sender and marks them lagging.
    pub fn send_to(&mut self, player: PlayerId, msg: ServerMessage) -> bool {
        let Some(sender) = self.senders.get(&player) else {
            return false;
        };
        let capacity = sender.max_capacity();

        match sender.try_send(msg) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(%player, capacity, "outbound queue full, dropping player");
                self.senders.remove(&player);
                self.lagging.push(player);
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Players dropped for falling behind since the last call.
    pub fn take_lagging(&mut self) -> Vec<PlayerId> {
        std::mem::take(&mut self.lagging)
    }
}

impl Outbox for Fanout {
    fn is_connected(&self, id: PlayerId) -> bool {
        self.senders
            .get(&id)
            .is_some_and(|sender| !sender.is_closed())
    }

    fn deliver(&mut self, to: PlayerId, msg: ServerMessage) -> bool {
        self.send_to(to, msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(fanout: &mut Fanout, id: u64) -> PlayerReceiver {
        let (tx, rx) = player_channel(16);
        fanout.insert(PlayerId(id), tx);
        rx
    }

    fn left(id: u64) -> ServerMessage {
        ServerMessage::PeerLeft { id: PlayerId(id) }
    }

    #[test]
    fn test_dispatch_all_except_skips_source() {
        let mut fanout = Fanout::new();
        let mut a = joined(&mut fanout, 1);
        let mut b = joined(&mut fanout, 2);
        let mut c = joined(&mut fanout, 3);

        fanout.dispatch(Recipient::AllExcept(PlayerId(1)), left(9));

        assert!(a.try_recv().is_err());
        assert_eq!(b.try_recv().unwrap(), left(9));
        assert_eq!(c.try_recv().unwrap(), left(9));
    }

    #[test]
    fn test_dispatch_player_reaches_only_that_player() {
        let mut fanout = Fanout::new();
        let mut a = joined(&mut fanout, 1);
        let mut b = joined(&mut fanout, 2);

        fanout.dispatch(Recipient::Player(PlayerId(2)), left(9));

        assert!(a.try_recv().is_err());
        assert_eq!(b.try_recv().unwrap(), left(9));
    }

    #[test]
    fn test_dispatch_preserves_per_receiver_order() {
        let mut fanout = Fanout::new();
        let mut a = joined(&mut fanout, 1);

        for i in 0..10 {
            fanout.dispatch(Recipient::All, left(i));
        }

        for i in 0..10 {
            assert_eq!(a.try_recv().unwrap(), left(i));
        }
    }

    #[test]
    fn test_is_connected_false_after_receiver_dropped() {
        let mut fanout = Fanout::new();
        let rx = joined(&mut fanout, 1);
        assert!(fanout.is_connected(PlayerId(1)));

        drop(rx);

        assert!(!fanout.is_connected(PlayerId(1)));
        assert!(!fanout.deliver(PlayerId(1), left(2)));
        assert!(fanout.take_lagging().is_empty());
    }

    #[test]
    fn test_send_to_unknown_player_returns_false() {
        let mut fanout = Fanout::new();
        assert!(!fanout.send_to(PlayerId(5), left(1)));
        assert!(!fanout.is_connected(PlayerId(5)));
    }

    #[test]
    fn test_send_to_full_channel_drops_player_and_marks_lagging() {
        let mut fanout = Fanout::new();
        let (tx, mut slow) = player_channel(2);
        fanout.insert(PlayerId(1), tx);
        let mut fast = joined(&mut fanout, 2);

        for i in 0..3 {
            fanout.dispatch(Recipient::All, left(i));
        }

        assert_eq!(fanout.take_lagging(), vec![PlayerId(1)]);
        assert!(fanout.take_lagging().is_empty());
        assert!(!fanout.is_connected(PlayerId(1)));
        assert_eq!(fanout.len(), 1);

        // The slow reader keeps what was queued, then sees the close.
        assert_eq!(slow.try_recv().unwrap(), left(0));
        assert_eq!(slow.try_recv().unwrap(), left(1));
        assert!(matches!(
            slow.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));

        for i in 0..3 {
            assert_eq!(fast.try_recv().unwrap(), left(i));
        }
    }
}
