use crate::error::GameError;
use crate::game::player::{Player, PlayerId, Role};
use crate::player_registry::PlayerRegistry;

#[derive(Default)]
pub struct LocalPlayerRegistry {
    players: Vec<Player>,
}

impl LocalPlayerRegistry {
    pub fn new() -> LocalPlayerRegistry {
        LocalPlayerRegistry {
            players: Vec::new(),
        }
    }

    fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }
}

impl PlayerRegistry for LocalPlayerRegistry {
    fn add(&mut self, id: PlayerId) -> Result<&Player, GameError> {
        if self.contains(id) {
            return Err(GameError::DuplicateId);
        }

        self.players.push(Player::new(id));
        Ok(&self.players[self.players.len() - 1])
    }

    fn remove(&mut self, id: PlayerId) -> Option<Player> {
        let index = self.players.iter().position(|p| p.id == id)?;
        Some(self.players.remove(index))
    }

    fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    fn count(&self) -> usize {
        self.players.len()
    }

    fn ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id).collect()
    }

    fn award(&mut self, id: PlayerId, points: u32) -> Option<u32> {
        let player = self.get_mut(id)?;
        player.score += points;
        Some(player.score)
    }

    fn set_role(&mut self, id: PlayerId, role: Role) {
        if let Some(player) = self.get_mut(id) {
            player.role = role;
        }
    }

    fn mark_voted(&mut self, id: PlayerId) {
        if let Some(player) = self.get_mut(id) {
            player.has_voted = true;
        }
    }

    fn clear_round_state(&mut self) {
        for player in self.players.iter_mut() {
            player.role = Role::Unassigned;
            player.has_voted = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_starts_at_zero() {
        let mut registry = LocalPlayerRegistry::new();
        let player = registry.add(PlayerId(1)).unwrap();

        assert_eq!(player.score, 0);
        assert_eq!(player.role, Role::Unassigned);
        assert!(!player.has_voted);
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn duplicate_add_is_rejected() {
        let mut registry = LocalPlayerRegistry::new();
        registry.add(PlayerId(1)).unwrap();

        assert_eq!(
            registry.add(PlayerId(1)).unwrap_err(),
            GameError::DuplicateId
        );
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn remove_keeps_connection_order() {
        let mut registry = LocalPlayerRegistry::new();
        for id in 1..=4 {
            registry.add(PlayerId(id)).unwrap();
        }

        assert!(registry.remove(PlayerId(2)).is_some());
        assert!(registry.remove(PlayerId(2)).is_none());
        assert_eq!(registry.ids(), vec![PlayerId(1), PlayerId(3), PlayerId(4)]);
    }

    #[test]
    fn round_state_clears_but_score_stays() {
        let mut registry = LocalPlayerRegistry::new();
        registry.add(PlayerId(1)).unwrap();
        registry.set_role(PlayerId(1), Role::Odd);
        registry.mark_voted(PlayerId(1));
        assert_eq!(registry.award(PlayerId(1), 1), Some(1));
        assert_eq!(registry.award(PlayerId(9), 1), None);

        registry.clear_round_state();

        let player = registry.get(PlayerId(1)).unwrap();
        assert_eq!(player.role, Role::Unassigned);
        assert!(!player.has_voted);
        assert_eq!(player.score, 1);
    }
}
