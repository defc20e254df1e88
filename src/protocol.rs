use crate::error::GameError;
use crate::game::game_phase::{GamePhase, VoteOutcome};
use crate::game::player::PlayerId;
use crate::game::RoundSeq;
use derive_more::Display;

/// Everything the session reacts to, in arrival order.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Connect(PlayerId),
    Disconnect(PlayerId),
    Vote { voter: PlayerId, accused: PlayerId },
    // Accepted and ignored. Reserved for scoring answers against the prompt.
    Answer { player: PlayerId, option: String },
    Reset { player: PlayerId },
    PhaseElapsed { round: RoundSeq, phase: GamePhase },
}

#[derive(Clone, Debug, PartialEq)]
pub enum ServerMessage {
    Joined { connected: usize, minimum: usize },
    AssignPrompt { prompt: String },
    ShowOptions { options: Vec<String> },
    OpenVoting { participants: Vec<PlayerId> },
    VoteResult { outcome: VoteOutcome },
    RoundAborted { reason: AbortReason },
    Rejected { error: GameError },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Display)]
pub enum AbortReason {
    #[display(fmt = "The odd one out left the game")]
    OddParticipantLeft,
    #[display(fmt = "Not enough players left to continue")]
    NotEnoughPlayers,
    #[display(fmt = "The round was reset")]
    Reset,
}

/// One outbound message for one player. Broadcasts are expanded into one dispatch per
/// recipient before they leave the session.
#[derive(Clone, Debug, PartialEq)]
pub struct Dispatch {
    pub to: PlayerId,
    pub message: ServerMessage,
}
