//! Session events produced by the orchestrator.

use plaza_protocol::{CallTarget, PlayerId, ServerMessage};

/// Direction of a session transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionChange {
    /// `NONE -> ACTIVE`
    Open,
    /// `ACTIVE -> NONE`
    Close,
}

/// One notification for one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallEvent {
    /// Who should hear about it.
    pub to: PlayerId,
    pub change: SessionChange,
    /// The peer or zone the session is with, from `to`'s point of view.
    pub target: CallTarget,
}

impl CallEvent {
    pub fn open(to: PlayerId, target: CallTarget) -> Self {
        Self {
            to,
            change: SessionChange::Open,
            target,
        }
    }

    pub fn close(to: PlayerId, target: CallTarget) -> Self {
        Self {
            to,
            change: SessionChange::Close,
            target,
        }
    }

    /// The wire message for this event.
    pub fn to_message(&self) -> ServerMessage {
        let target = self.target.clone();
        match self.change {
            SessionChange::Open => ServerMessage::SessionOpen { target },
            SessionChange::Close => ServerMessage::SessionClose { target },
        }
    }
}
