//! Room configuration and the seat-driven room state.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Configuration shared by every room in a lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Number of player seats. The game starts the moment the last seat is
    /// taken, and joins beyond it are rejected.
    pub seats: usize,

    /// Whether connections may watch a room without a seat.
    pub allow_spectators: bool,

    /// Maximum number of spectators per room (0 = unlimited).
    pub max_spectators: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            seats: 2,
            allow_spectators: true,
            max_spectators: 0,
        }
    }
}

impl RoomConfig {
    /// Returns `true` if a room with `spectators` watchers can take another.
    pub fn has_spectator_slot(&self, spectators: usize) -> bool {
        self.max_spectators == 0 || spectators < self.max_spectators
    }
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// Where a room is in its life, derived from how many seats are taken.
///
/// ```text
/// WaitingForPlayers ──(last seat taken)──→ InProgress
/// ```
///
/// A room never goes back to `WaitingForPlayers` through a join; when a
/// player leaves mid-game the room reports `WaitingForPlayers` again and
/// the freed seat can be taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomState {
    WaitingForPlayers,
    InProgress,
}

impl RoomState {
    /// Computes the state for a room with `players` seated.
    pub fn for_players(players: usize, config: &RoomConfig) -> Self {
        if players >= config.seats {
            Self::InProgress
        } else {
            Self::WaitingForPlayers
        }
    }

    /// Returns `true` if the room has a free seat.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::WaitingForPlayers)
    }
}

impl std::fmt::Display for RoomState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WaitingForPlayers => write!(f, "WaitingForPlayers"),
            Self::InProgress => write!(f, "InProgress"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_config_default_is_two_seats_with_spectators() {
        let config = RoomConfig::default();
        assert_eq!(config.seats, 2);
        assert!(config.allow_spectators);
        assert_eq!(config.max_spectators, 0);
    }

    #[test]
    fn test_unlimited_spectators_always_have_a_slot() {
        let config = RoomConfig::default();
        assert!(config.has_spectator_slot(0));
        assert!(config.has_spectator_slot(10_000));
    }

    #[test]
    fn test_spectator_cap() {
        let config = RoomConfig {
            max_spectators: 2,
            ..RoomConfig::default()
        };
        assert!(config.has_spectator_slot(1));
        assert!(!config.has_spectator_slot(2));
    }

    #[test]
    fn test_room_state_follows_seats() {
        let config = RoomConfig::default();
        assert_eq!(RoomState::for_players(1, &config), RoomState::WaitingForPlayers);
        assert_eq!(RoomState::for_players(2, &config), RoomState::InProgress);
        assert!(RoomState::for_players(1, &config).is_joinable());
        assert!(!RoomState::for_players(2, &config).is_joinable());
    }

    #[test]
    fn test_room_config_fills_missing_fields_from_default() {
        let config: RoomConfig = serde_json::from_str(r#"{"max_spectators": 5}"#).unwrap();
        assert_eq!(config.seats, 2);
        assert_eq!(config.max_spectators, 5);
        assert!(config.allow_spectators);
    }

    #[test]
    fn test_room_state_display() {
        assert_eq!(RoomState::WaitingForPlayers.to_string(), "WaitingForPlayers");
        assert_eq!(RoomState::InProgress.to_string(), "InProgress");
    }
}
