pub mod local_player_registry;

use crate::error::GameError;
use crate::game::player::{Player, PlayerId, Role};

pub trait PlayerRegistry {
    fn add(&mut self, id: PlayerId) -> Result<&Player, GameError>;

    /// Returns the removed player, if it was connected.
    fn remove(&mut self, id: PlayerId) -> Option<Player>;

    fn get(&self, id: PlayerId) -> Option<&Player>;

    fn contains(&self, id: PlayerId) -> bool {
        self.get(id).is_some()
    }

    fn count(&self) -> usize;

    // Connection order
    fn ids(&self) -> Vec<PlayerId>;

    fn award(&mut self, id: PlayerId, points: u32) -> Option<u32>;

    fn set_role(&mut self, id: PlayerId, role: Role);

    fn mark_voted(&mut self, id: PlayerId);

    /// Drops roles and vote flags once a round is over. Scores stay.
    fn clear_round_state(&mut self);
}
