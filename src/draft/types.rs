// Domain records shared by the arithmetic core and the store.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A franchise within a league. Identity is immutable; the display name
/// can be renamed between seasons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub league_id: i64,
    pub name: String,
}

/// One draft year for a league. `year` is unique per league.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub id: i64,
    pub league_id: i64,
    pub year: i32,
    /// Number of rounds to generate picks for.
    pub rounds: u32,
    /// How many early rounds are reserved for keepers.
    pub keeper_count: u32,
    /// Once set, pick regeneration and order edits are rejected.
    pub draft_lock: Option<DateTime<Utc>>,
    /// Once set, keeper submissions and regeneration are rejected.
    pub keepers_lock: Option<DateTime<Utc>>,
}

impl Draft {
    /// Whether the pick list may still be regenerated.
    pub fn picks_editable(&self) -> bool {
        self.draft_lock.is_none()
    }

    /// Whether keeper rows may still be changed.
    pub fn keepers_editable(&self) -> bool {
        self.keepers_lock.is_none()
    }
}

/// Join row linking a team into a draft, carrying the team's position in
/// the generation baseline order (0-based, ascending).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftTeam {
    pub draft_id: i64,
    pub team_id: i64,
    pub order: u32,
}

/// A single pick slot. `player_id = None` means the slot is open, not
/// that the row is missing: every draft holds a contiguous 1..rounds*teams
/// sequence of `overall` values once generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftPick {
    pub id: i64,
    pub draft_id: i64,
    pub team_id: i64,
    /// 1-based absolute pick index, unique within the draft.
    pub overall: u32,
    pub player_id: Option<i64>,
}

/// A retained player occupying one of a team's early-round slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keeper {
    pub id: i64,
    pub draft_id: i64,
    pub team_id: i64,
    /// The round whose pick this keeper consumes for its team.
    pub round: u32,
    /// Consecutive years kept, used for eligibility decrements.
    pub keeps: u32,
    pub player_id: Option<i64>,
}

/// A draftable player. `data` is an opaque scouting/ranking blob keyed by
/// string (e.g. "Rank", "ADP", "PlayerInfo"); values are strings, numbers,
/// or null. Never assume keys beyond the ones a caller documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub draft_id: i64,
    /// Unique within the draft; the carryover merge matches on it exactly.
    pub name: String,
    #[serde(default)]
    pub data: HashMap<String, serde_json::Value>,
}

impl Player {
    /// Read a numeric attribute from the data blob, if present and numeric.
    pub fn numeric(&self, key: &str) -> Option<f64> {
        self.data.get(key).and_then(|v| v.as_f64())
    }
}
