//! The per-process game state machine.
//!
//! Each process owns one [`GameState`]: its player's identity, a view of
//! every territory derived from the message stream, and the pause flag.
//! There is no authoritative copy anywhere — consistency comes from all
//! processes applying the same deterministic rules to the same messages.
//!
//! The three `handle_*` entry points classify inbound messages; the
//! `command_*`/`spawn` entry points validate operator input and apply it
//! locally before it is published. Mapping classifications to broker
//! acknowledgements is the caller's job.

use std::collections::HashMap;

use peril_protocol::{
    ArmyMove, Player, PlayingState, Username, WarId, WarRecognition,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{GameError, WorldMap};

// ---------------------------------------------------------------------------
// Territory view
// ---------------------------------------------------------------------------

/// An attacking force that has entered a territory but whose war is not
/// yet resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incursion {
    /// Who moved in.
    pub attacker: Username,
    /// The committed force.
    pub units: u32,
}

/// One territory as this process currently sees it.
///
/// Invariant: exactly one owner at a time (`None` means unclaimed), and
/// `units` never goes negative — stale views are reconciled by
/// saturating instead of underflowing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerritoryState {
    /// The holding player, if any.
    pub owner: Option<Username>,
    /// Units stationed by the owner.
    pub units: u32,
    /// An unresolved attacking force, if a war is pending here.
    pub incursion: Option<Incursion>,
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Classification of an inbound army move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// An internal transfer or a claim of unheld ground; the world view
    /// was updated.
    Safe,
    /// The move entered this player's territory. The caller must
    /// publish the recognition to the defender-scoped war key.
    MakesWar(WarRecognition),
    /// The mover is this process's own player — its own move echoed
    /// back from the topic. Permanently invalid here; never retry.
    SamePlayerViolation,
}

/// Classification of an inbound war recognition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarOutcome {
    /// Addressed to neither this player as attacker nor defender —
    /// requeue so another consumer of the shared queue can claim it.
    NotInvolved,
    /// The defender has nothing to fight with. Permanently invalid.
    NoUnits,
    /// Combat resolved; this player lost. Carries the narrative line.
    OpponentWon { log: String },
    /// Combat resolved; this player won. Carries the narrative line.
    YouWon { log: String },
    /// Both committed forces destroyed each other.
    Draw { log: String },
    /// This recognition was already resolved on an earlier delivery.
    /// Combat is never re-run; the recorded line is returned so the
    /// caller can retry the log publication.
    AlreadyResolved { log: String },
}

/// A snapshot of the local player's standing, for the `status` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    /// The local player.
    pub username: Username,
    /// Whether the server has paused the game.
    pub paused: bool,
    /// Held territories and their garrisons, sorted by name.
    pub territories: Vec<(String, u32)>,
    /// Aggregate unit count across held territories.
    pub total_units: u32,
}

impl std::fmt::Display for StatusReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} — {} units{}",
            self.username,
            self.total_units,
            if self.paused { " (game paused)" } else { "" }
        )?;
        for (territory, units) in &self.territories {
            writeln!(f, "  {territory}: {units}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// The mutable per-process view of the game.
pub struct GameState {
    player: Player,
    map: WorldMap,
    territories: HashMap<String, TerritoryState>,
    paused: bool,
    /// Resolved war ids and their narrative lines — the idempotence
    /// ledger that keeps a redelivered recognition from re-running
    /// combat.
    resolved_wars: HashMap<WarId, String>,
}

impl GameState {
    /// Creates the state for one player on the given map. Every
    /// territory starts unclaimed.
    pub fn new(username: Username, map: WorldMap) -> Self {
        let territories = map
            .territories()
            .map(|name| (name.to_string(), TerritoryState::default()))
            .collect();
        Self {
            player: Player { username },
            map,
            territories,
            paused: false,
            resolved_wars: HashMap::new(),
        }
    }

    /// The local player.
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Whether the server has paused the game.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    fn username(&self) -> &Username {
        &self.player.username
    }

    fn territory(&self, name: &str) -> Result<&TerritoryState, GameError> {
        self.territories
            .get(name)
            .ok_or_else(|| GameError::UnknownTerritory(name.to_string()))
    }

    fn territory_mut(
        &mut self,
        name: &str,
    ) -> Result<&mut TerritoryState, GameError> {
        self.territories
            .get_mut(name)
            .ok_or_else(|| GameError::UnknownTerritory(name.to_string()))
    }

    // -----------------------------------------------------------------
    // Operator commands (validated locally, then published)
    // -----------------------------------------------------------------

    /// Stations fresh units on a territory, claiming it if unheld.
    pub fn spawn(
        &mut self,
        territory: &str,
        units: u32,
    ) -> Result<(), GameError> {
        if units == 0 {
            return Err(GameError::ZeroUnits);
        }
        let local = self.username().clone();
        let state = self.territory_mut(territory)?;
        match &state.owner {
            Some(owner) if *owner != local => {
                return Err(GameError::TerritoryHeld {
                    territory: territory.to_string(),
                    owner: owner.clone(),
                });
            }
            _ => {}
        }
        state.owner = Some(local);
        state.units += units;
        tracing::info!(territory, units, "units spawned");
        Ok(())
    }

    /// Validates and locally applies an operator move, returning the
    /// [`ArmyMove`] to broadcast.
    ///
    /// Moves are gated on the pause flag. A move into enemy territory
    /// records the committed force as an incursion there — the same
    /// record the defender's process makes when it observes the move,
    /// so both war resolvers later agree on the attacker's force.
    pub fn command_move(
        &mut self,
        from: &str,
        to: &str,
        units: u32,
    ) -> Result<ArmyMove, GameError> {
        if self.paused {
            return Err(GameError::GamePaused);
        }
        if units == 0 {
            return Err(GameError::ZeroUnits);
        }

        let local = self.username().clone();
        let source = self.territory(from)?;
        if source.owner.as_ref() != Some(&local) {
            return Err(GameError::NotYourTerritory(from.to_string()));
        }
        if source.units < units {
            return Err(GameError::NotEnoughUnits {
                territory: from.to_string(),
                available: source.units,
                requested: units,
            });
        }
        self.territory(to)?;
        if !self.map.are_adjacent(from, to) {
            return Err(GameError::NotAdjacent {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        self.territory_mut(from)?.units -= units;
        let destination = self.territory_mut(to)?;
        match destination.owner.clone() {
            None => {
                destination.owner = Some(local.clone());
                destination.units += units;
            }
            Some(owner) if owner == local => {
                destination.units += units;
            }
            Some(_) => {
                // Attacking: the force is committed, not stationed,
                // until the war resolves.
                record_incursion(destination, local.clone(), units);
            }
        }

        tracing::info!(from, to, units, "move applied locally");
        Ok(ArmyMove {
            player: self.player.clone(),
            from: from.to_string(),
            to: to.to_string(),
            units,
        })
    }

    /// The current standing of the local player.
    pub fn status(&self) -> StatusReport {
        let local = self.username();
        let mut territories: Vec<(String, u32)> = self
            .territories
            .iter()
            .filter(|(_, state)| state.owner.as_ref() == Some(local))
            .map(|(name, state)| (name.clone(), state.units))
            .collect();
        territories.sort();
        let total_units = territories.iter().map(|(_, units)| units).sum();
        StatusReport {
            username: local.clone(),
            paused: self.paused,
            territories,
            total_units,
        }
    }

    // -----------------------------------------------------------------
    // Inbound message handlers
    // -----------------------------------------------------------------

    /// Applies another player's broadcast move to the world view.
    pub fn handle_move(
        &mut self,
        mv: &ArmyMove,
    ) -> Result<MoveOutcome, GameError> {
        if mv.player.username == *self.username() {
            return Ok(MoveOutcome::SamePlayerViolation);
        }
        if mv.units == 0 {
            return Err(GameError::ZeroUnits);
        }

        // Units leave the source if our view agrees the mover held it.
        // Saturate rather than underflow on a stale view.
        let source = self.territory_mut(&mv.from)?;
        if source.owner == Some(mv.player.username.clone()) {
            source.units = source.units.saturating_sub(mv.units);
        }

        let local = self.username().clone();
        let destination = self.territory_mut(&mv.to)?;
        match destination.owner.clone() {
            None => {
                destination.owner = Some(mv.player.username.clone());
                destination.units += mv.units;
                Ok(MoveOutcome::Safe)
            }
            Some(owner) if owner == mv.player.username => {
                destination.units += mv.units;
                Ok(MoveOutcome::Safe)
            }
            Some(owner) => {
                record_incursion(
                    destination,
                    mv.player.username.clone(),
                    mv.units,
                );
                if owner == local {
                    Ok(MoveOutcome::MakesWar(WarRecognition {
                        id: WarId::new(),
                        attacker: mv.player.clone(),
                        defender: self.player.clone(),
                        territory: mv.to.clone(),
                    }))
                } else {
                    // Someone else's border dispute; their process
                    // declares the war.
                    Ok(MoveOutcome::Safe)
                }
            }
        }
    }

    /// Resolves a war recognition addressed to this player.
    pub fn handle_war(
        &mut self,
        rw: &WarRecognition,
    ) -> Result<WarOutcome, GameError> {
        let local = self.username().clone();
        if rw.attacker.username != local && rw.defender.username != local {
            return Ok(WarOutcome::NotInvolved);
        }
        if let Some(log) = self.resolved_wars.get(&rw.id) {
            return Ok(WarOutcome::AlreadyResolved { log: log.clone() });
        }

        let territory = self.territory(&rw.territory)?;
        let defender_force = if territory.owner == Some(rw.defender.username.clone()) {
            territory.units
        } else {
            0
        };
        if defender_force == 0 {
            return Ok(WarOutcome::NoUnits);
        }
        let attacker_force = territory
            .incursion
            .as_ref()
            .filter(|inc| inc.attacker == rw.attacker.username)
            .map_or(0, |inc| inc.units);

        // Deterministic comparison; the winner keeps its force, the
        // loser's committed units are destroyed. A draw destroys both.
        let (log, outcome) = if attacker_force > defender_force {
            let territory = self.territory_mut(&rw.territory)?;
            territory.owner = Some(rw.attacker.username.clone());
            territory.units = attacker_force;
            territory.incursion = None;
            let log = war_won_log(&rw.attacker.username, &rw.defender.username);
            let outcome = if rw.attacker.username == local {
                WarOutcome::YouWon { log: log.clone() }
            } else {
                WarOutcome::OpponentWon { log: log.clone() }
            };
            (log, outcome)
        } else if defender_force > attacker_force {
            let territory = self.territory_mut(&rw.territory)?;
            territory.incursion = None;
            let log = war_won_log(&rw.defender.username, &rw.attacker.username);
            let outcome = if rw.defender.username == local {
                WarOutcome::YouWon { log: log.clone() }
            } else {
                WarOutcome::OpponentWon { log: log.clone() }
            };
            (log, outcome)
        } else {
            let territory = self.territory_mut(&rw.territory)?;
            territory.units = 0;
            territory.incursion = None;
            let log = war_draw_log(&rw.attacker.username, &rw.defender.username);
            (log.clone(), WarOutcome::Draw { log })
        };

        self.resolved_wars.insert(rw.id, log);
        tracing::info!(war = %rw.id, territory = %rw.territory, "war resolved");
        Ok(outcome)
    }

    /// Applies a pause/resume broadcast. Unconditional and idempotent.
    pub fn handle_pause(&mut self, state: &PlayingState) {
        self.paused = state.is_paused;
        tracing::info!(paused = state.is_paused, "playing state updated");
    }
}

/// Records an attacking force at a contested territory. The latest
/// wave supersedes any earlier record: a redelivered move therefore
/// re-records the same force instead of inflating it.
fn record_incursion(territory: &mut TerritoryState, attacker: Username, units: u32) {
    territory.incursion = Some(Incursion { attacker, units });
}

fn war_won_log(winner: &Username, loser: &Username) -> String {
    format!("{winner} won a war against {loser}.")
}

fn war_draw_log(attacker: &Username, defender: &Username) -> String {
    format!("A war between {attacker} and {defender} resulted in a draw.")
}

// ---------------------------------------------------------------------------
// Spam lines
// ---------------------------------------------------------------------------

/// Nonsense narrative lines for the `spam` command.
const SPAM_LINES: &[&str] = &[
    "Such an old tactic, I expected better.",
    "My horse is faster than your entire army.",
    "I have seen ducks with more strategic sense.",
    "The antarctic front never sleeps.",
    "Your cartographers should be fired.",
    "History will not remember this blunder kindly.",
];

/// Picks a spam line with the given source of randomness. Seeded in
/// tests for reproducibility.
pub fn spam_line_with<R: Rng>(rng: &mut R) -> &'static str {
    SPAM_LINES[rng.random_range(0..SPAM_LINES.len())]
}

/// Picks a spam line with the process RNG.
pub fn spam_line() -> &'static str {
    spam_line_with(&mut rand::rng())
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn state_for(name: &str) -> GameState {
        GameState::new(Username::from(name), WorldMap::standard())
    }

    fn mv(player: &str, from: &str, to: &str, units: u32) -> ArmyMove {
        ArmyMove {
            player: Player::new(player),
            from: from.into(),
            to: to.into(),
            units,
        }
    }

    fn war(attacker: &str, defender: &str, territory: &str) -> WarRecognition {
        WarRecognition {
            id: WarId::new(),
            attacker: Player::new(attacker),
            defender: Player::new(defender),
            territory: territory.into(),
        }
    }

    // =====================================================================
    // spawn
    // =====================================================================

    #[test]
    fn test_spawn_claims_unheld_territory() {
        let mut gs = state_for("alice");
        gs.spawn("europe", 3).unwrap();
        let report = gs.status();
        assert_eq!(report.territories, vec![("europe".to_string(), 3)]);
        assert_eq!(report.total_units, 3);
    }

    #[test]
    fn test_spawn_reinforces_own_territory() {
        let mut gs = state_for("alice");
        gs.spawn("europe", 3).unwrap();
        gs.spawn("europe", 2).unwrap();
        assert_eq!(gs.status().total_units, 5);
    }

    #[test]
    fn test_spawn_rejects_enemy_territory() {
        let mut gs = state_for("alice");
        // bob claims asia in our view via his broadcast move.
        gs.handle_move(&mv("bob", "americas", "asia", 2)).unwrap();
        let err = gs.spawn("asia", 1).unwrap_err();
        assert!(matches!(err, GameError::TerritoryHeld { .. }));
    }

    #[test]
    fn test_spawn_rejects_unknown_territory_and_zero_units() {
        let mut gs = state_for("alice");
        assert!(matches!(
            gs.spawn("atlantis", 1),
            Err(GameError::UnknownTerritory(_))
        ));
        assert!(matches!(gs.spawn("europe", 0), Err(GameError::ZeroUnits)));
    }

    // =====================================================================
    // command_move — local validation
    // =====================================================================

    #[test]
    fn test_command_move_internal_transfer() {
        let mut gs = state_for("alice");
        gs.spawn("europe", 3).unwrap();
        let out = gs.command_move("europe", "asia", 2).unwrap();
        assert_eq!(out, mv("alice", "europe", "asia", 2));

        let report = gs.status();
        assert_eq!(
            report.territories,
            vec![("asia".to_string(), 2), ("europe".to_string(), 1)]
        );
    }

    #[test]
    fn test_command_move_rejects_unowned_source() {
        let mut gs = state_for("alice");
        let err = gs.command_move("europe", "asia", 1).unwrap_err();
        assert!(matches!(err, GameError::NotYourTerritory(_)));
    }

    #[test]
    fn test_command_move_rejects_non_adjacent_destination() {
        let mut gs = state_for("alice");
        gs.spawn("europe", 3).unwrap();
        let err = gs.command_move("europe", "australia", 1).unwrap_err();
        assert!(matches!(err, GameError::NotAdjacent { .. }));
    }

    #[test]
    fn test_command_move_rejects_oversized_force() {
        let mut gs = state_for("alice");
        gs.spawn("europe", 2).unwrap();
        let err = gs.command_move("europe", "asia", 3).unwrap_err();
        assert!(matches!(
            err,
            GameError::NotEnoughUnits {
                available: 2,
                requested: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_command_move_gated_on_pause() {
        let mut gs = state_for("alice");
        gs.spawn("europe", 3).unwrap();
        gs.handle_pause(&PlayingState { is_paused: true });
        assert!(matches!(
            gs.command_move("europe", "asia", 1),
            Err(GameError::GamePaused)
        ));
        // Resume lifts the gate.
        gs.handle_pause(&PlayingState { is_paused: false });
        assert!(gs.command_move("europe", "asia", 1).is_ok());
    }

    #[test]
    fn test_command_move_into_enemy_territory_records_incursion() {
        let mut gs = state_for("alice");
        gs.spawn("europe", 3).unwrap();
        // bob holds asia in our view.
        gs.handle_move(&mv("bob", "americas", "asia", 1)).unwrap();

        gs.command_move("europe", "asia", 2).unwrap();
        // Committed force is not stationed — asia still bob's.
        let report = gs.status();
        assert_eq!(report.territories, vec![("europe".to_string(), 1)]);
    }

    // =====================================================================
    // handle_move — inbound classification
    // =====================================================================

    #[test]
    fn test_handle_move_same_player_violation() {
        let mut gs = state_for("alice");
        gs.spawn("europe", 3).unwrap();
        let outcome = gs.handle_move(&mv("alice", "europe", "asia", 1)).unwrap();
        assert_eq!(outcome, MoveOutcome::SamePlayerViolation);
    }

    #[test]
    fn test_handle_move_into_unclaimed_is_safe() {
        let mut gs = state_for("alice");
        let outcome = gs.handle_move(&mv("bob", "americas", "asia", 2)).unwrap();
        assert_eq!(outcome, MoveOutcome::Safe);
        // bob now holds asia in our view, so spawning there is rejected.
        assert!(matches!(
            gs.spawn("asia", 1),
            Err(GameError::TerritoryHeld { .. })
        ));
    }

    #[test]
    fn test_handle_move_between_enemy_territories_is_safe() {
        let mut gs = state_for("alice");
        gs.handle_move(&mv("bob", "americas", "asia", 2)).unwrap();
        let outcome = gs.handle_move(&mv("bob", "asia", "americas", 1)).unwrap();
        assert_eq!(outcome, MoveOutcome::Safe);
    }

    #[test]
    fn test_handle_move_into_our_territory_makes_war() {
        let mut gs = state_for("bob");
        gs.spawn("asia", 1).unwrap();

        let outcome = gs.handle_move(&mv("alice", "europe", "asia", 2)).unwrap();
        match outcome {
            MoveOutcome::MakesWar(rw) => {
                assert_eq!(rw.attacker, Player::new("alice"));
                assert_eq!(rw.defender, Player::new("bob"));
                assert_eq!(rw.territory, "asia");
            }
            other => panic!("expected MakesWar, got {other:?}"),
        }
    }

    #[test]
    fn test_handle_move_into_third_party_territory_is_safe() {
        // carol watches alice invade bob: a fact to record, not
        // carol's war to declare.
        let mut gs = state_for("carol");
        gs.handle_move(&mv("bob", "americas", "asia", 1)).unwrap();
        let outcome = gs.handle_move(&mv("alice", "europe", "asia", 2)).unwrap();
        assert_eq!(outcome, MoveOutcome::Safe);
    }

    #[test]
    fn test_handle_move_unknown_territory_is_invalid() {
        let mut gs = state_for("alice");
        let result = gs.handle_move(&mv("bob", "atlantis", "asia", 1));
        assert!(matches!(result, Err(GameError::UnknownTerritory(_))));
    }

    #[test]
    fn test_handle_move_source_units_never_underflow() {
        let mut gs = state_for("alice");
        // Our view has bob holding americas with 1 unit; his move
        // claims 5 left. Saturate, don't wrap.
        gs.handle_move(&mv("bob", "europe", "americas", 1)).unwrap();
        gs.handle_move(&mv("bob", "americas", "asia", 5)).unwrap();
        let outcome = gs.handle_move(&mv("bob", "americas", "asia", 1)).unwrap();
        assert_eq!(outcome, MoveOutcome::Safe);
    }

    #[test]
    fn test_handle_move_redelivery_does_not_inflate_incursion() {
        // A move redelivered after a failed war-recognition publish
        // re-records the same committed force.
        let mut gs = state_for("bob");
        gs.spawn("asia", 3).unwrap();
        let attack = mv("alice", "europe", "asia", 2);
        gs.handle_move(&attack).unwrap();
        gs.handle_move(&attack).unwrap();

        let outcome = gs.handle_war(&war("alice", "bob", "asia")).unwrap();
        // 2 vs 3: bob wins. Had the force stacked to 4, alice would.
        assert!(matches!(outcome, WarOutcome::YouWon { .. }));
    }

    // =====================================================================
    // handle_war
    // =====================================================================

    /// Sets up bob's process with bob holding asia and alice having
    /// committed `attacker_units` against it.
    fn contested(defender_units: u32, attacker_units: u32) -> GameState {
        let mut gs = state_for("bob");
        if defender_units > 0 {
            gs.spawn("asia", defender_units).unwrap();
        }
        gs.handle_move(&mv("alice", "europe", "asia", attacker_units))
            .unwrap();
        gs
    }

    #[test]
    fn test_handle_war_not_involved_for_third_party() {
        let mut gs = state_for("carol");
        let outcome = gs.handle_war(&war("alice", "bob", "asia")).unwrap();
        assert_eq!(outcome, WarOutcome::NotInvolved);
    }

    #[test]
    fn test_handle_war_no_units_when_defender_empty() {
        let mut gs = state_for("bob");
        let outcome = gs.handle_war(&war("alice", "bob", "asia")).unwrap();
        assert_eq!(outcome, WarOutcome::NoUnits);
    }

    #[test]
    fn test_handle_war_attacker_wins_and_takes_territory() {
        let mut gs = contested(1, 2);
        let outcome = gs.handle_war(&war("alice", "bob", "asia")).unwrap();
        match outcome {
            WarOutcome::OpponentWon { log } => {
                assert_eq!(log, "alice won a war against bob.");
            }
            other => panic!("expected OpponentWon, got {other:?}"),
        }
        // asia is alice's now; bob holds nothing.
        assert!(matches!(
            gs.spawn("asia", 1),
            Err(GameError::TerritoryHeld { .. })
        ));
        assert_eq!(gs.status().total_units, 0);
    }

    #[test]
    fn test_handle_war_defender_wins_and_keeps_territory() {
        let mut gs = contested(3, 2);
        let outcome = gs.handle_war(&war("alice", "bob", "asia")).unwrap();
        match outcome {
            WarOutcome::YouWon { log } => {
                assert_eq!(log, "bob won a war against alice.");
            }
            other => panic!("expected YouWon, got {other:?}"),
        }
        assert_eq!(
            gs.status().territories,
            vec![("asia".to_string(), 3)]
        );
    }

    #[test]
    fn test_handle_war_draw_destroys_both_forces() {
        let mut gs = contested(2, 2);
        let outcome = gs.handle_war(&war("alice", "bob", "asia")).unwrap();
        assert!(matches!(outcome, WarOutcome::Draw { .. }));
        if let WarOutcome::Draw { log } = outcome {
            assert_eq!(
                log,
                "A war between alice and bob resulted in a draw."
            );
        }
        // Ownership unchanged, garrison gone.
        assert_eq!(gs.status().territories, vec![("asia".to_string(), 0)]);
    }

    #[test]
    fn test_handle_war_is_deterministic() {
        // Identical forces, identical outcome, every time.
        for _ in 0..10 {
            let mut gs = contested(1, 2);
            let outcome = gs.handle_war(&war("alice", "bob", "asia")).unwrap();
            assert!(matches!(outcome, WarOutcome::OpponentWon { .. }));
        }
    }

    #[test]
    fn test_handle_war_already_resolved_never_reruns_combat() {
        let mut gs = contested(1, 2);
        let rw = war("alice", "bob", "asia");
        let first = gs.handle_war(&rw).unwrap();
        let WarOutcome::OpponentWon { log } = first else {
            panic!("expected OpponentWon");
        };

        // Redelivery of the same recognition: the ledger answers, the
        // world stays as the first resolution left it.
        let before = gs.status();
        let second = gs.handle_war(&rw).unwrap();
        assert_eq!(second, WarOutcome::AlreadyResolved { log });
        assert_eq!(gs.status(), before);
    }

    #[test]
    fn test_handle_war_distinct_ids_resolve_independently() {
        let mut gs = contested(1, 2);
        gs.handle_war(&war("alice", "bob", "asia")).unwrap();
        // A different recognition (fresh id) for a later war is not
        // short-circuited by the ledger.
        let outcome = gs.handle_war(&war("alice", "bob", "asia")).unwrap();
        // Defender has no units left after losing asia.
        assert_eq!(outcome, WarOutcome::NoUnits);
    }

    #[test]
    fn test_handle_war_attacker_side_resolves_symmetrically() {
        // alice's own process: she commits 2 against bob's 1.
        let mut gs = state_for("alice");
        gs.spawn("europe", 3).unwrap();
        gs.handle_move(&mv("bob", "americas", "asia", 1)).unwrap();
        gs.command_move("europe", "asia", 2).unwrap();

        let outcome = gs.handle_war(&war("alice", "bob", "asia")).unwrap();
        match outcome {
            WarOutcome::YouWon { log } => {
                assert_eq!(log, "alice won a war against bob.");
            }
            other => panic!("expected YouWon, got {other:?}"),
        }
        // alice now stations her surviving force in asia.
        let report = gs.status();
        assert!(report.territories.contains(&("asia".to_string(), 2)));
    }

    #[test]
    fn test_handle_war_unknown_territory_is_invalid() {
        let mut gs = state_for("bob");
        let result = gs.handle_war(&war("alice", "bob", "atlantis"));
        assert!(matches!(result, Err(GameError::UnknownTerritory(_))));
    }

    // =====================================================================
    // pause
    // =====================================================================

    #[test]
    fn test_handle_pause_sets_flag_idempotently() {
        let mut gs = state_for("alice");
        assert!(!gs.is_paused());
        gs.handle_pause(&PlayingState { is_paused: true });
        gs.handle_pause(&PlayingState { is_paused: true });
        assert!(gs.is_paused());
        gs.handle_pause(&PlayingState { is_paused: false });
        assert!(!gs.is_paused());
    }

    // =====================================================================
    // spam lines
    // =====================================================================

    #[test]
    fn test_spam_line_reproducible_with_seeded_rng() {
        use rand::SeedableRng;
        use rand::rngs::StdRng;

        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            assert_eq!(spam_line_with(&mut a), spam_line_with(&mut b));
        }
    }
}
