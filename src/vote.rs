use crate::error::GameError;
use crate::game::game_phase::{GamePhase, VoteOutcome};
use crate::game::player::PlayerId;
use crate::game::Round;
use crate::player_registry::PlayerRegistry;

/// Records `voter`'s accusation and scores it. A correct accusation is worth one point.
///
/// Checks run in order: phase, voter, repeat vote, accused. The first failure wins and
/// nothing is recorded.
pub fn cast_vote<R: PlayerRegistry>(
    round: &mut Round,
    registry: &mut R,
    voter: PlayerId,
    accused: PlayerId,
) -> Result<VoteOutcome, GameError> {
    if round.phase() != GamePhase::Voting {
        return Err(GameError::PhaseMismatch);
    }
    if !round.is_participant(voter) || !registry.contains(voter) {
        return Err(GameError::UnknownVoter);
    }
    if round.vote_of(voter).is_some() {
        return Err(GameError::AlreadyVoted);
    }
    if !round.is_participant(accused) {
        return Err(GameError::UnknownAccused);
    }

    round.record_vote(voter, accused);
    registry.mark_voted(voter);

    if accused == round.odd_participant() {
        registry.award(voter, 1);
        Ok(VoteOutcome::Correct)
    } else {
        Ok(VoteOutcome::Incorrect)
    }
}
