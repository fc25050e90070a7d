//! The static world map.
//!
//! Adjacency is the deterministic rules table the state machine
//! consumes: it never changes during a game, and every process loads
//! the identical table, so two processes can validate the same move and
//! agree without talking to each other.

use std::collections::HashMap;

/// Territory adjacency, continent by continent. Symmetric by
/// construction — the unit test holds this invariant.
const ADJACENCY: &[(&str, &[&str])] = &[
    ("americas", &["europe", "asia", "antarctica"]),
    ("europe", &["americas", "africa", "asia"]),
    ("africa", &["europe", "asia", "antarctica"]),
    ("asia", &["americas", "europe", "africa", "australia"]),
    ("australia", &["asia", "antarctica"]),
    ("antarctica", &["americas", "africa", "australia"]),
];

/// The world map: territory names and which borders which.
#[derive(Debug, Clone)]
pub struct WorldMap {
    adjacency: HashMap<&'static str, &'static [&'static str]>,
}

impl WorldMap {
    /// Loads the standard six-continent map.
    pub fn standard() -> Self {
        Self {
            adjacency: ADJACENCY.iter().copied().collect(),
        }
    }

    /// Returns `true` if the named territory exists.
    pub fn contains(&self, territory: &str) -> bool {
        self.adjacency.contains_key(territory)
    }

    /// Returns `true` if `from` borders `to`. A territory never borders
    /// itself.
    pub fn are_adjacent(&self, from: &str, to: &str) -> bool {
        self.adjacency
            .get(from)
            .is_some_and(|neighbors| neighbors.contains(&to))
    }

    /// Iterates over every territory name.
    pub fn territories(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.adjacency.keys().copied()
    }
}

impl Default for WorldMap {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_all_six_continents() {
        let map = WorldMap::standard();
        for name in [
            "americas",
            "europe",
            "africa",
            "asia",
            "australia",
            "antarctica",
        ] {
            assert!(map.contains(name), "{name} missing");
        }
        assert_eq!(map.territories().count(), 6);
    }

    #[test]
    fn test_unknown_territory() {
        let map = WorldMap::standard();
        assert!(!map.contains("atlantis"));
        assert!(!map.are_adjacent("atlantis", "europe"));
    }

    #[test]
    fn test_adjacency_is_symmetric() {
        // If a borders b, b must border a — a one-way border would let
        // two processes disagree on the validity of the same move.
        let map = WorldMap::standard();
        for a in map.territories() {
            for b in map.territories() {
                assert_eq!(
                    map.are_adjacent(a, b),
                    map.are_adjacent(b, a),
                    "asymmetric border {a}/{b}"
                );
            }
        }
    }

    #[test]
    fn test_no_territory_borders_itself() {
        let map = WorldMap::standard();
        for name in map.territories() {
            assert!(!map.are_adjacent(name, name));
        }
    }

    #[test]
    fn test_selected_borders() {
        let map = WorldMap::standard();
        assert!(map.are_adjacent("europe", "asia"));
        assert!(map.are_adjacent("australia", "antarctica"));
        assert!(!map.are_adjacent("europe", "australia"));
        assert!(!map.are_adjacent("americas", "africa"));
    }
}
