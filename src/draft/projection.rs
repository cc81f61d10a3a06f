// Expected draft position for undrafted players.

use super::rounds;

/// Estimate the overall pick where a player with rank-like value `rank` is
/// expected to go:
///
/// `expected = rank + picks_before - drafted_before - 1`
///
/// where `picks_before` is the on-the-clock pick's overall (falling back to
/// `rank` when nothing is on the clock) and `drafted_before` counts players
/// already off the board with a rank below `rank`. Keepers consume picks
/// without consuming ranked players, which is what pushes the estimate past
/// the raw rank. Clamped to 1 so the result stays a valid overall.
pub fn expected_overall(rank: u32, on_clock_overall: Option<u32>, drafted_before: u32) -> u32 {
    let picks_before = on_clock_overall.unwrap_or(rank);
    (rank as i64 + picks_before as i64 - drafted_before as i64 - 1).max(1) as u32
}

/// Round bucket for [`expected_overall`], capped at `max_round_filter` so
/// deep estimates collapse into a single "30+" style bucket.
pub fn expected_round(
    rank: u32,
    on_clock_overall: Option<u32>,
    drafted_before: u32,
    teams_count: u32,
    max_round_filter: u32,
) -> u32 {
    let overall = expected_overall(rank, on_clock_overall, drafted_before);
    rounds::round(overall, teams_count).min(max_round_filter)
}
