use plaza_protocol::PlayerId;

/// Why a signal was not forwarded.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RelayError {
    /// The target is not a live, joined player. The signal is dropped and
    /// the sender is not told; its own call setup will time out.
    #[error("relay target {0} is not connected")]
    TargetUnavailable(PlayerId),
}
