use crate::error::GameError;
use game_phase::*;
use player::*;
use rand::Rng;
use std::collections::HashMap;
use tokio::time::Instant;

pub mod game_phase;
pub mod player;

/// Monotonic per session. Timer triggers carry the sequence of the round that scheduled
/// them so a trigger outliving its round can be told apart from one for the current round.
#[derive(Eq, Hash, PartialEq, Ord, PartialOrd, Copy, Clone, Debug, derive_more::Display)]
pub struct RoundSeq(pub u64);

#[derive(Clone, Debug)]
pub struct Round {
    seq: RoundSeq,
    phase: GamePhase,
    // Snapshot taken at round start, in connection order. Never changes afterwards.
    participants: Vec<PlayerId>,
    odd_participant: PlayerId,
    shared_prompt: String,
    divergent_prompt: String,
    votes: HashMap<PlayerId, PlayerId>,
    started_at: Instant,
}

impl Round {
    /// Picks the odd participant uniformly from `participants` and returns a round in
    /// `GamePhase::Assigning`.
    pub fn assign<R: Rng + ?Sized>(
        seq: RoundSeq,
        participants: Vec<PlayerId>,
        shared_prompt: String,
        divergent_prompt: String,
        minimum_players: usize,
        rng: &mut R,
    ) -> Result<Round, GameError> {
        if participants.is_empty() || participants.len() < minimum_players {
            return Err(GameError::InsufficientPlayers);
        }

        let odd_participant = participants[rng.gen_range(0..participants.len())];

        Ok(Round {
            seq,
            phase: GamePhase::Assigning,
            participants,
            odd_participant,
            shared_prompt,
            divergent_prompt,
            votes: HashMap::new(),
            started_at: Instant::now(),
        })
    }

    pub fn seq(&self) -> RoundSeq {
        self.seq
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn participants(&self) -> &[PlayerId] {
        &self.participants
    }

    pub fn is_participant(&self, id: PlayerId) -> bool {
        self.participants.contains(&id)
    }

    pub fn odd_participant(&self) -> PlayerId {
        self.odd_participant
    }

    pub fn role_of(&self, id: PlayerId) -> Option<Role> {
        if !self.is_participant(id) {
            None
        } else if id == self.odd_participant {
            Some(Role::Odd)
        } else {
            Some(Role::Common)
        }
    }

    pub fn prompt_for(&self, id: PlayerId) -> Option<&str> {
        match self.role_of(id)? {
            Role::Odd => Some(&self.divergent_prompt),
            _ => Some(&self.shared_prompt),
        }
    }

    /// Every participant paired with the prompt they should see.
    pub fn prompts(&self) -> impl Iterator<Item = (PlayerId, &str)> + '_ {
        self.participants.iter().map(|&id| {
            let prompt = if id == self.odd_participant {
                self.divergent_prompt.as_str()
            } else {
                self.shared_prompt.as_str()
            };
            (id, prompt)
        })
    }

    pub fn vote_of(&self, voter: PlayerId) -> Option<PlayerId> {
        self.votes.get(&voter).copied()
    }

    pub fn vote_count(&self) -> usize {
        self.votes.len()
    }

    pub(crate) fn record_vote(&mut self, voter: PlayerId, accused: PlayerId) {
        self.votes.insert(voter, accused);
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Moves to `to` if it is the phase directly after the current one.
    pub fn advance_to(&mut self, to: GamePhase) -> Result<(), GameError> {
        if self.phase.next() == Some(to) {
            self.phase = to;
            Ok(())
        } else {
            Err(GameError::PhaseMismatch)
        }
    }
}
