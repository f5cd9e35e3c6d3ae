//! The call-session orchestrator.
//!
//! Every relationship runs the same two-state machine:
//!
//! ```text
//!            relationship appears
//!   NONE  ------------------------>  ACTIVE
//!    ^                                  |
//!    +----------------------------------+
//!      relationship disappears, or a
//!      participant disconnects
//! ```
//!
//! The orchestrator only stores the `ACTIVE` ones. A transition fires when
//! the freshly computed relationship set differs from what is stored, so
//! seeing the same relationship again is a no-op and a session can neither
//! open twice nor outlive its participants.

use std::collections::{BTreeMap, BTreeSet};

use plaza_protocol::{CallTarget, PlayerId};
use plaza_proximity::Relationship;
use plaza_registry::PlayerRegistry;

use crate::CallEvent;

/// Observable state of one relationship key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    None,
    Active,
}

/// Book-keeping for one `ACTIVE` session.
#[derive(Debug, Clone)]
struct ActiveSession {
    /// Sweep cycle in which a participant was first seen missing from the
    /// registry. Only set if a disconnect slipped past
    /// [`CallOrchestrator::on_disconnect`].
    absent_since: Option<u64>,
}

/// Tracks which call sessions are live and emits the events that open and
/// close them.
#[derive(Debug, Default)]
pub struct CallOrchestrator {
    sessions: BTreeMap<Relationship, ActiveSession>,
    /// Recomputation counter used by the watchdog.
    cycle: u64,
}

impl CallOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Brings `player`'s sessions in line with `present`, the relationships
    /// involving `player` that hold right now.
    ///
    /// Call after every position change (and after join). Relationships in
    /// `present` that do not involve `player`, or that name an unregistered
    /// participant, are ignored. A `player` that is no longer registered is
    /// left to [`on_disconnect`](Self::on_disconnect); nothing is opened
    /// for it.
    pub fn sync_player(
        &mut self,
        player: PlayerId,
        present: &BTreeSet<Relationship>,
        registry: &PlayerRegistry,
    ) -> Vec<CallEvent> {
        let mut events = Vec::new();

        if registry.contains(player) {
            let stale: Vec<Relationship> = self
                .sessions
                .keys()
                .filter(|key| key.involves(player) && !present.contains(*key))
                .cloned()
                .collect();
            for key in stale {
                self.close(key, registry, &mut events);
            }

            for key in present {
                if !key.involves(player) {
                    tracing::warn!(%player, relationship = %key, "ignoring unrelated relationship");
                    continue;
                }
                self.open(key, registry, &mut events);
            }
        } else {
            tracing::debug!(%player, "sync for unregistered player skipped");
        }

        events.extend(self.sweep(registry));
        events
    }

    /// Full diff against every relationship in the world.
    ///
    /// [`sync_player`](Self::sync_player) is enough on the hot path; this is
    /// for callers that recompute everything at once (timer-batched mode,
    /// tests).
    pub fn reconcile(
        &mut self,
        all: &BTreeSet<Relationship>,
        registry: &PlayerRegistry,
    ) -> Vec<CallEvent> {
        let mut events = Vec::new();

        let stale: Vec<Relationship> = self
            .sessions
            .keys()
            .filter(|key| !all.contains(*key))
            .cloned()
            .collect();
        for key in stale {
            self.close(key, registry, &mut events);
        }
        for key in all {
            self.open(key, registry, &mut events);
        }

        events.extend(self.sweep(registry));
        events
    }

    /// Tears down every session `player` was part of.
    ///
    /// Remove the player from the registry first: close events go only to
    /// participants that are still registered, so the departed player is
    /// never addressed.
    pub fn on_disconnect(&mut self, player: PlayerId, registry: &PlayerRegistry) -> Vec<CallEvent> {
        let mut events = Vec::new();
        let keys: Vec<Relationship> = self
            .sessions
            .keys()
            .filter(|key| key.involves(player))
            .cloned()
            .collect();
        for key in keys {
            self.close(key, registry, &mut events);
        }
        events
    }

    /// Watchdog: closes sessions with a participant missing from the
    /// registry for more than one cycle.
    ///
    /// With `on_disconnect` wired correctly this never fires. It exists so
    /// that a missed transition heals itself instead of leaking a session.
    pub fn sweep(&mut self, registry: &PlayerRegistry) -> Vec<CallEvent> {
        self.cycle += 1;
        let cycle = self.cycle;

        let mut expired = Vec::new();
        for (key, session) in self.sessions.iter_mut() {
            let complete = key.participants().iter().all(|p| registry.contains(*p));
            match (complete, session.absent_since) {
                (true, _) => session.absent_since = None,
                (false, None) => session.absent_since = Some(cycle),
                (false, Some(since)) if cycle > since => expired.push(key.clone()),
                (false, Some(_)) => {}
            }
        }

        let mut events = Vec::new();
        for key in expired {
            tracing::warn!(relationship = %key, "watchdog closing orphaned session");
            self.close(key, registry, &mut events);
        }
        events
    }

    pub fn state(&self, key: &Relationship) -> SessionState {
        if self.sessions.contains_key(key) {
            SessionState::Active
        } else {
            SessionState::None
        }
    }

    /// Live sessions involving `player`.
    pub fn sessions_for(&self, player: PlayerId) -> Vec<Relationship> {
        self.sessions
            .keys()
            .filter(|key| key.involves(player))
            .cloned()
            .collect()
    }

    /// All live sessions.
    pub fn active(&self) -> impl Iterator<Item = &Relationship> + '_ {
        self.sessions.keys()
    }

    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    /// `NONE -> ACTIVE`. No-op if already active.
    fn open(&mut self, key: &Relationship, registry: &PlayerRegistry, events: &mut Vec<CallEvent>) {
        if self.sessions.contains_key(key) {
            return;
        }
        if !key.participants().iter().all(|p| registry.contains(*p)) {
            tracing::debug!(relationship = %key, "not opening session with a missing participant");
            return;
        }

        self.sessions
            .insert(key.clone(), ActiveSession { absent_since: None });
        tracing::info!(relationship = %key, "call session opened");

        for (to, target) in endpoints(key) {
            events.push(CallEvent::open(to, target));
        }
    }

    /// `ACTIVE -> NONE`. The session is dropped even if nobody is left to
    /// tell.
    fn close(&mut self, key: Relationship, registry: &PlayerRegistry, events: &mut Vec<CallEvent>) {
        if self.sessions.remove(&key).is_none() {
            return;
        }
        tracing::info!(relationship = %key, "call session closed");

        for (to, target) in endpoints(&key) {
            if registry.contains(to) {
                events.push(CallEvent::close(to, target));
            }
        }
    }
}

/// Each participant of `key` with the target it should see.
fn endpoints(key: &Relationship) -> Vec<(PlayerId, CallTarget)> {
    match key {
        Relationship::Pair(pair) => {
            let initiator = pair.initiator();
            pair.members()
                .into_iter()
                .filter_map(|me| {
                    let peer = pair.other(me)?;
                    Some((
                        me,
                        CallTarget::Peer {
                            peer,
                            initiator: me == initiator,
                        },
                    ))
                })
                .collect()
        }
        Relationship::Zone { player, zone, room } => vec![(
            *player,
            CallTarget::Zone {
                zone: zone.clone(),
                room: room.clone(),
            },
        )],
    }
}
