/// Opaque connection handle. Unique per active connection; a reconnect gets a fresh
/// player with a fresh score.
#[derive(Eq, Hash, PartialEq, Ord, PartialOrd, Copy, Clone, Debug, derive_more::Display)]
pub struct PlayerId(pub i64);

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub score: u32,
    pub role: Role,
    pub has_voted: bool,
}

impl Player {
    pub fn new(id: PlayerId) -> Player {
        Player {
            id,
            score: 0,
            role: Role::Unassigned,
            has_voted: false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Role {
    Unassigned,
    Odd,
    Common,
}
