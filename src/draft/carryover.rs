// Previous-year keeper/draft history merge.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::rounds;
use super::types::{DraftPick, Keeper, Player};

/// Where a player went in the prior year's draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviousDraftInfo {
    /// Round the player was drafted (or kept) in last year.
    pub round: u32,
    pub pick: DraftPick,
    /// Present when the player was a keeper last year.
    pub keeper: Option<Keeper>,
}

/// A current-year player together with any prior-year history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerHistory {
    pub player: Player,
    pub previous: Option<PreviousDraftInfo>,
}

/// The prior year's draft, as loaded from the store.
#[derive(Debug, Clone, Copy)]
pub struct PreviousYear<'a> {
    pub picks: &'a [DraftPick],
    pub keepers: &'a [Keeper],
    pub players: &'a [Player],
    pub teams_count: u32,
}

/// Attach prior-year draft history to this year's players.
///
/// Matching is strictly by exact name equality between this year's player
/// list and last year's: no fuzzy matching, no trimming. When the league has
/// no prior-year draft the merge is skipped and players pass through with no
/// history attached.
pub fn merge_previous_year(
    players: Vec<Player>,
    previous: Option<PreviousYear<'_>>,
) -> Vec<PlayerHistory> {
    let previous = match previous {
        Some(prev) => prev,
        None => {
            info!("no prior-year draft; skipping carryover merge");
            return players
                .into_iter()
                .map(|player| PlayerHistory {
                    player,
                    previous: None,
                })
                .collect();
        }
    };

    // Name -> prior-year player id, then id -> pick/keeper.
    let prev_ids: HashMap<&str, i64> = previous
        .players
        .iter()
        .map(|p| (p.name.as_str(), p.id))
        .collect();
    let picks_by_player: HashMap<i64, &DraftPick> = previous
        .picks
        .iter()
        .filter_map(|p| p.player_id.map(|id| (id, p)))
        .collect();
    let keepers_by_player: HashMap<i64, &Keeper> = previous
        .keepers
        .iter()
        .filter_map(|k| k.player_id.map(|id| (id, k)))
        .collect();

    players
        .into_iter()
        .map(|player| {
            let info = prev_ids.get(player.name.as_str()).and_then(|prev_id| {
                picks_by_player.get(prev_id).map(|pick| PreviousDraftInfo {
                    round: rounds::round(pick.overall, previous.teams_count),
                    pick: (*pick).clone(),
                    keeper: keepers_by_player.get(prev_id).map(|k| (*k).clone()),
                })
            });
            PlayerHistory {
                player,
                previous: info,
            }
        })
        .collect()
}
