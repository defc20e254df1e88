use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GamePhase {
    Idle,
    Assigning,
    PromptSent,
    OptionsShown,
    Voting,
    Resolved,
}

impl GamePhase {
    /// The only phase a round may move to from `self`. Aborts bypass this and drop the
    /// round entirely.
    pub fn next(self) -> Option<GamePhase> {
        match self {
            GamePhase::Idle => Some(GamePhase::Assigning),
            GamePhase::Assigning => Some(GamePhase::PromptSent),
            GamePhase::PromptSent => Some(GamePhase::OptionsShown),
            GamePhase::OptionsShown => Some(GamePhase::Voting),
            GamePhase::Voting => Some(GamePhase::Resolved),
            GamePhase::Resolved => None,
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GamePhase::Idle => write!(f, "Idle"),
            GamePhase::Assigning => write!(f, "Assigning"),
            GamePhase::PromptSent => write!(f, "PromptSent"),
            GamePhase::OptionsShown => write!(f, "OptionsShown"),
            GamePhase::Voting => write!(f, "Voting"),
            GamePhase::Resolved => write!(f, "Resolved"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VoteOutcome {
    Correct,
    Incorrect,
}

impl fmt::Display for VoteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VoteOutcome::Correct => write!(f, "Correct! You found the mafia 👀"),
            VoteOutcome::Incorrect => write!(f, "Wrong! Mafia escaped 😈"),
        }
    }
}
