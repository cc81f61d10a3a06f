// Keeper slot generation and keeper-aware pick derivation.

use serde::{Deserialize, Serialize};

use super::order::OrderError;
use super::rounds;
use super::types::{DraftPick, Keeper};

/// An unsaved keeper slot produced by generation, before any team has
/// assigned a player to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeeperSlot {
    pub round: u32,
    pub team_id: i64,
}

/// Generate one keeper slot per team per keeper round 1..keeper_count,
/// grouped per round: with teams `[A, B]` and `keeper_count = 3` the result
/// is A1, B1, A2, B2, A3, B3.
///
/// Regeneration is destructive at the store layer: all existing keeper rows
/// for the draft are deleted and replaced by these slots.
pub fn generate_keeper_slots(
    team_ids: &[i64],
    keeper_count: u32,
) -> Result<Vec<KeeperSlot>, OrderError> {
    if team_ids.is_empty() {
        return Err(OrderError::EmptyTeams);
    }

    let mut slots = Vec::with_capacity(team_ids.len() * keeper_count as usize);
    for round in 1..=keeper_count {
        for &team_id in team_ids {
            slots.push(KeeperSlot { round, team_id });
        }
    }
    Ok(slots)
}

/// Replace one team's keeper rows with `new_rows`, leaving every other
/// team's rows untouched. Order: surviving rows first, then the new rows.
pub fn replace_team_keepers(
    all_keepers: Vec<Keeper>,
    team_id: i64,
    new_rows: Vec<Keeper>,
) -> Vec<Keeper> {
    let mut merged: Vec<Keeper> = all_keepers
        .into_iter()
        .filter(|k| k.team_id != team_id)
        .collect();
    merged.extend(new_rows);
    merged
}

/// Derive the pick list implied by the keeper rows: each pick whose
/// (round, team) matches a keeper takes that keeper's player; every other
/// pick is cleared to an open slot. The pick count and `overall` ordering
/// are preserved exactly.
///
/// Clearing an unmatched pick is intentional, not an error: applying
/// keepers resets the board to "keepers filled, everything else open".
pub fn apply_keepers_to_picks(
    picks: &[DraftPick],
    keepers: &[Keeper],
    teams_count: u32,
) -> Vec<DraftPick> {
    picks
        .iter()
        .map(|pick| {
            let round = rounds::round(pick.overall, teams_count);
            let keeper = keepers
                .iter()
                .find(|k| k.round == round && k.team_id == pick.team_id);
            DraftPick {
                player_id: keeper.and_then(|k| k.player_id),
                ..pick.clone()
            }
        })
        .collect()
}
