use derive_more::Display;

/// Recoverable rejections. The session answers the offending connection with one of
/// these and carries on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display)]
pub enum GameError {
    #[display(fmt = "You are already connected")]
    DuplicateId,
    #[display(fmt = "That is not allowed right now")]
    PhaseMismatch,
    #[display(fmt = "You have already voted this round")]
    AlreadyVoted,
    #[display(fmt = "You are not taking part in this round")]
    UnknownVoter,
    #[display(fmt = "That player is not taking part in this round")]
    UnknownAccused,
    #[display(fmt = "Not enough players to start a round")]
    InsufficientPlayers,
}

impl std::error::Error for GameError {}
