// Per-team aggregation of season result history (export / all-time tables).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// How a stat field combines across seasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggKind {
    /// Accumulates across seasons.
    Sum,
    /// Accumulates `value / seasons_for_team` per season, i.e. an
    /// incremental mean. Already per-season in the output.
    Avg,
}

/// The fixed table of aggregated fields. Any other key in a season's stat
/// blob is ignored.
pub const SEASON_FIELDS: &[(&str, AggKind)] = &[
    ("Wins", AggKind::Sum),
    ("Losses", AggKind::Sum),
    ("Ties", AggKind::Sum),
    ("PointsFor", AggKind::Sum),
    ("PointsAgainst", AggKind::Sum),
    ("Moves", AggKind::Sum),
    ("Trades", AggKind::Sum),
    ("WinPct", AggKind::Avg),
    ("ERA", AggKind::Avg),
];

/// One team's result for one season. `data` is the free-form stat blob;
/// only numeric values under [`SEASON_FIELDS`] keys participate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonRecord {
    pub team_name: String,
    /// Final standing for the season, 1 = champion.
    pub season_finish: u32,
    #[serde(default)]
    pub data: HashMap<String, serde_json::Value>,
}

/// Aggregated all-time line for one team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamAggregate {
    pub team_name: String,
    pub seasons: u32,
    pub championships: u32,
    pub playoffs: u32,
    /// Field name -> aggregated value per [`SEASON_FIELDS`].
    pub totals: HashMap<String, f64>,
}

/// Aggregate season records per team.
///
/// Sum fields accumulate; avg fields accumulate `value / seasons` where
/// `seasons` is the team's total season count, computed once up front (so
/// the incremental mean equals the naive mean). `average_mode` additionally
/// divides every sum field by the season count for display, leaving avg
/// fields untouched. Output is sorted ascending by team name.
pub fn aggregate(
    records: &[SeasonRecord],
    playoff_threshold: u32,
    average_mode: bool,
) -> Vec<TeamAggregate> {
    // Season counts first: the avg accumulation below divides by the final
    // per-team count at every step.
    let mut season_counts: HashMap<&str, u32> = HashMap::new();
    for record in records {
        *season_counts.entry(record.team_name.as_str()).or_insert(0) += 1;
    }

    let mut by_team: HashMap<&str, TeamAggregate> = HashMap::new();
    for record in records {
        let seasons = season_counts[record.team_name.as_str()];
        let entry = by_team
            .entry(record.team_name.as_str())
            .or_insert_with(|| TeamAggregate {
                team_name: record.team_name.clone(),
                seasons,
                championships: 0,
                playoffs: 0,
                totals: HashMap::new(),
            });

        if record.season_finish == 1 {
            entry.championships += 1;
        }
        if record.season_finish <= playoff_threshold {
            entry.playoffs += 1;
        }

        for &(field, kind) in SEASON_FIELDS {
            let Some(value) = record.data.get(field).and_then(|v| v.as_f64()) else {
                continue;
            };
            let contribution = match kind {
                AggKind::Sum => value,
                AggKind::Avg => value / seasons as f64,
            };
            *entry.totals.entry(field.to_string()).or_insert(0.0) += contribution;
        }
    }

    let mut rows: Vec<TeamAggregate> = by_team.into_values().collect();

    if average_mode {
        for row in &mut rows {
            for &(field, kind) in SEASON_FIELDS {
                if kind == AggKind::Sum {
                    if let Some(total) = row.totals.get_mut(field) {
                        *total /= row.seasons as f64;
                    }
                }
            }
        }
    }

    rows.sort_by(|a, b| a.team_name.cmp(&b.team_name));
    rows
}
