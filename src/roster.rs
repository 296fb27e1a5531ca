use crate::types::{Player, Role, Stone};

/// Join records observed so far. Roles are recomputed from scratch on every
/// query, so they depend only on which records have replicated, not on the
/// order they arrived in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    joins: Vec<Player>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a join. Duplicates from the same name are kept and occupy
    /// their own rank.
    pub fn add(&mut self, player: Player) {
        self.joins.push(player);
    }

    pub fn clear(&mut self) {
        self.joins.clear();
    }

    pub fn len(&self) -> usize {
        self.joins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joins.is_empty()
    }

    /// Join records ascending by timestamp. Equal timestamps fall back to
    /// the name so every peer ranks them identically.
    pub fn ranked(&self) -> Vec<(&Player, Role)> {
        let mut sorted: Vec<&Player> = self.joins.iter().collect();
        sorted.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.name.cmp(&b.name)));
        sorted
            .into_iter()
            .enumerate()
            .map(|(rank, player)| (player, Role::from_rank(rank)))
            .collect()
    }

    /// Role of the earliest join under `name`, if any.
    pub fn role_of(&self, name: &str) -> Option<Role> {
        self.ranked()
            .into_iter()
            .find(|(player, _)| player.name == name)
            .map(|(_, role)| role)
    }

    pub fn stone_of(&self, name: &str) -> Option<Stone> {
        self.role_of(name).and_then(Role::stone)
    }

    /// Name seated at black and white, in that order.
    pub fn seats(&self) -> [Option<String>; 2] {
        let ranked = self.ranked();
        let seat = |rank: usize| ranked.get(rank).map(|(player, _)| player.name.clone());
        [seat(0), seat(1)]
    }
}
