//! Relationship keys: what a call session is *about*.

use std::fmt;

use plaza_protocol::{PlayerId, ZoneId};

/// An unordered pair of distinct players, stored low id first.
///
/// Because construction sorts the ids, `PeerPair::new(a, b)` and
/// `PeerPair::new(b, a)` are the same value, and both peers agree on
/// [`initiator`](Self::initiator) without exchanging a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeerPair {
    low: PlayerId,
    high: PlayerId,
}

impl PeerPair {
    /// Returns `None` when `a == b`; nobody calls themselves.
    pub fn new(a: PlayerId, b: PlayerId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { low: a, high: b }),
            std::cmp::Ordering::Greater => Some(Self { low: b, high: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// The side that starts negotiation: the smaller id.
    pub fn initiator(&self) -> PlayerId {
        self.low
    }

    /// Both members, initiator first.
    pub fn members(&self) -> [PlayerId; 2] {
        [self.low, self.high]
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.low == id || self.high == id
    }

    /// The member that is not `id`, or `None` if `id` is not in the pair.
    pub fn other(&self, id: PlayerId) -> Option<PlayerId> {
        if id == self.low {
            Some(self.high)
        } else if id == self.high {
            Some(self.low)
        } else {
            None
        }
    }
}

/// A call relationship that is either true or false at any moment.
///
/// Ordered so sets of relationships iterate deterministically, which keeps
/// event order stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Relationship {
    /// Two players within the call radius.
    Pair(PeerPair),
    /// A player standing in a zone. `room` rides along so a close event can
    /// still name the room after the player has walked away.
    Zone {
        player: PlayerId,
        zone: ZoneId,
        room: String,
    },
}

impl Relationship {
    /// Players this relationship binds together.
    pub fn participants(&self) -> Vec<PlayerId> {
        match self {
            Self::Pair(pair) => pair.members().to_vec(),
            Self::Zone { player, .. } => vec![*player],
        }
    }

    pub fn involves(&self, id: PlayerId) -> bool {
        match self {
            Self::Pair(pair) => pair.contains(id),
            Self::Zone { player, .. } => *player == id,
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pair(pair) => {
                let [a, b] = pair.members();
                write!(f, "{a}<->{b}")
            }
            Self::Zone { player, zone, .. } => write!(f, "{player}@{zone}"),
        }
    }
}
