//! Player records and the owning collection
//!
//! Every helper returns a new `Player`; the `Ledger` swaps in a rebuilt
//! collection on each change so readers never observe a partial update.

use shared::{Cents, PlayerId};

use crate::domain::{BetChoice, Player};
use crate::errors::{EngineError, Result};

pub fn create_player(name: &str, starting_balance: Cents) -> Result<Player> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EngineError::InvalidInput(
            "player name cannot be empty".to_string(),
        ));
    }
    if starting_balance.is_negative() {
        return Err(EngineError::InvalidInput(format!(
            "starting balance cannot be negative: {}",
            starting_balance
        )));
    }

    Ok(Player {
        id: PlayerId::new(),
        name: name.to_string(),
        balance: starting_balance,
        wager: Cents::ZERO,
        choice: BetChoice::Skip,
    })
}

/// Set the wager from a decimal amount.
///
/// Rounds to the nearest cent (halves away from zero) and clamps into
/// `[0, balance]`. Out-of-range or non-finite input is clamped, never rejected.
pub fn set_wager(player: &Player, amount: f64) -> Player {
    let requested = match Cents::from_dollars(amount) {
        Ok(cents) => cents,
        Err(_) if amount > 0.0 => player.balance,
        Err(_) => Cents::ZERO,
    };
    let ceiling = player.balance.max(Cents::ZERO);
    Player {
        wager: requested.clamp(Cents::ZERO, ceiling),
        ..player.clone()
    }
}

/// Stake the whole balance
pub fn all_in(player: &Player) -> Player {
    Player {
        wager: player.balance.max(Cents::ZERO),
        ..player.clone()
    }
}

pub fn set_choice(player: &Player, choice: BetChoice) -> Player {
    Player {
        choice,
        ..player.clone()
    }
}

pub fn reset_for_new_round(player: &Player) -> Player {
    Player {
        wager: Cents::ZERO,
        choice: BetChoice::Skip,
        ..player.clone()
    }
}

/// Ordered owning collection of players
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    players: Vec<Player>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn add(&mut self, player: Player) {
        let mut players = self.players.clone();
        players.push(player);
        self.players = players;
    }

    pub fn remove(&mut self, id: PlayerId) -> Result<Player> {
        let removed = self
            .get(id)
            .cloned()
            .ok_or(EngineError::PlayerNotFound(id))?;
        self.players = self.players.iter().filter(|p| p.id != id).cloned().collect();
        Ok(removed)
    }

    /// Replace one player with `f(player)`, returning the updated record
    pub fn update<F>(&mut self, id: PlayerId, f: F) -> Result<Player>
    where
        F: FnOnce(&Player) -> Player,
    {
        let current = self.get(id).ok_or(EngineError::PlayerNotFound(id))?;
        let updated = f(current);
        if updated.id != id {
            return Err(EngineError::invariant(format!(
                "player update changed id {} to {}",
                id, updated.id
            )));
        }
        self.players = self
            .players
            .iter()
            .map(|p| if p.id == id { updated.clone() } else { p.clone() })
            .collect();
        Ok(updated)
    }

    /// Apply `f` to every player
    pub fn update_all<F>(&mut self, f: F)
    where
        F: Fn(&Player) -> Player,
    {
        self.players = self.players.iter().map(f).collect();
    }

    /// Swap in a whole new collection (used by settlement)
    pub fn replace_all(&mut self, players: Vec<Player>) -> Result<()> {
        let same_roster = players.len() == self.players.len()
            && players
                .iter()
                .zip(self.players.iter())
                .all(|(new, old)| new.id == old.id);
        if !same_roster {
            return Err(EngineError::invariant(
                "replacement roster does not match the ledger",
            ));
        }
        self.players = players;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_with_balance(cents: i64) -> Player {
        create_player("Alice", Cents::new(cents)).unwrap()
    }

    #[test]
    fn test_create_player_rejects_bad_input() {
        assert!(matches!(
            create_player("   ", Cents::new(100)),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            create_player("Bob", Cents::new(-1)),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_create_player_starts_without_bet() {
        let player = create_player("  Bob ", Cents::new(10_000)).unwrap();
        assert_eq!(player.name, "Bob");
        assert_eq!(player.wager, Cents::ZERO);
        assert_eq!(player.choice, BetChoice::Skip);

        let other = create_player("Bob", Cents::new(10_000)).unwrap();
        assert_ne!(player.id, other.id);
    }

    #[test]
    fn test_set_wager_rounds_to_nearest_cent() {
        let player = player_with_balance(10_000);
        assert_eq!(set_wager(&player, 12.346).wager, Cents::new(1_235));
        assert_eq!(set_wager(&player, 12.344).wager, Cents::new(1_234));
        assert_eq!(set_wager(&player, 0.125).wager, Cents::new(13));
    }

    #[test]
    fn test_set_wager_clamps_into_balance() {
        let player = player_with_balance(5_000);
        assert_eq!(set_wager(&player, -3.0).wager, Cents::ZERO);
        assert_eq!(set_wager(&player, 1e9).wager, Cents::new(5_000));
        assert_eq!(set_wager(&player, f64::INFINITY).wager, Cents::new(5_000));
        assert_eq!(set_wager(&player, f64::NAN).wager, Cents::ZERO);
        // balance untouched
        assert_eq!(set_wager(&player, 20.0).balance, Cents::new(5_000));
    }

    #[test]
    fn test_all_in_uses_exact_balance() {
        let player = player_with_balance(4_321);
        assert_eq!(all_in(&player).wager, Cents::new(4_321));
    }

    #[test]
    fn test_reset_keeps_balance() {
        let player = set_choice(&set_wager(&player_with_balance(8_000), 20.0), BetChoice::Draw);
        let reset = reset_for_new_round(&player);
        assert_eq!(reset.wager, Cents::ZERO);
        assert_eq!(reset.choice, BetChoice::Skip);
        assert_eq!(reset.balance, Cents::new(8_000));
    }

    #[test]
    fn test_ledger_update_and_remove() {
        let mut ledger = Ledger::new();
        let alice = player_with_balance(1_000);
        let bob = create_player("Bob", Cents::new(2_000)).unwrap();
        ledger.add(alice.clone());
        ledger.add(bob.clone());

        let updated = ledger
            .update(bob.id, |p| set_choice(p, BetChoice::Team2))
            .unwrap();
        assert_eq!(updated.choice, BetChoice::Team2);
        assert_eq!(ledger.get(alice.id).unwrap().choice, BetChoice::Skip);

        ledger.remove(alice.id).unwrap();
        assert_eq!(ledger.len(), 1);
        assert!(matches!(
            ledger.remove(alice.id),
            Err(EngineError::PlayerNotFound(_))
        ));
    }

    #[test]
    fn test_replace_all_requires_same_roster() {
        let mut ledger = Ledger::new();
        ledger.add(player_with_balance(1_000));
        let stranger = create_player("Mallory", Cents::new(1)).unwrap();
        assert!(ledger.replace_all(vec![stranger]).is_err());
        assert!(ledger.replace_all(Vec::new()).is_err());
    }
}
