// Round and in-round position arithmetic.
//
// Every function here is total over non-negative input: a missing overall
// (0) or an empty draft (0 teams) yields the sentinel round instead of
// panicking, so callers can feed raw records straight through.

/// Round reported for a player with no pick position yet. Sorts after every
/// real round in any UI ordering.
pub const NO_OVERALL_ROUND: u32 = 99;

/// Compute the 1-based round for an absolute pick number.
///
/// `overall = 0` means "no position yet" and maps to [`NO_OVERALL_ROUND`].
pub fn round(overall: u32, teams_count: u32) -> u32 {
    round_or(overall, teams_count, NO_OVERALL_ROUND)
}

/// [`round`] with a caller-supplied sentinel for the no-position case.
pub fn round_or(overall: u32, teams_count: u32, no_overall: u32) -> u32 {
    if overall == 0 || teams_count == 0 {
        return no_overall;
    }
    (overall - 1) / teams_count + 1
}

/// Compute the 1-based position within its round for an absolute pick
/// number. Always in `1..=teams_count` for real input; the sentinel
/// convention matches [`round`].
pub fn round_pick(overall: u32, teams_count: u32) -> u32 {
    round_pick_or(overall, teams_count, NO_OVERALL_ROUND)
}

/// [`round_pick`] with a caller-supplied sentinel.
pub fn round_pick_or(overall: u32, teams_count: u32, no_overall: u32) -> u32 {
    if overall == 0 || teams_count == 0 {
        return no_overall;
    }
    (overall - 1) % teams_count + 1
}

/// Render an overall pick as `"RR:PP"`, both halves zero-padded to width 2
/// (round 3, pick 7 of a 10-team draft formats as `"03:07"`).
pub fn format_round_pick(overall: u32, teams_count: u32) -> String {
    format!(
        "{:02}:{:02}",
        round(overall, teams_count),
        round_pick(overall, teams_count)
    )
}
