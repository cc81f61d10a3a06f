// CSV import/export for draft history and season results.
//
// Import is all-or-nothing: a malformed row rejects the whole file so a
// partial history never reaches the store.

use std::collections::HashMap;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::draft::rounds;
use crate::draft::types::{DraftPick, Keeper};
use crate::stats::SeasonRecord;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CsvError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("validation error at row {row}: {message}")]
    Validation { row: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Import records
// ---------------------------------------------------------------------------

/// One imported draft-history row: where a player went in some past year.
/// `overall = 0` means the player was kept or otherwise never on the board.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftHistoryRow {
    pub draft_year: i32,
    pub team_name: String,
    pub player_name: String,
    pub overall: u32,
    pub keeps: u32,
    /// Any extra columns, preserved as the player's data blob.
    pub player_data: HashMap<String, serde_json::Value>,
}

/// One imported team-season result row, feeding the history aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonHistoryRow {
    pub draft_year: i32,
    pub record: SeasonRecord,
}

// ---------------------------------------------------------------------------
// Raw CSV serde structs (private)
// ---------------------------------------------------------------------------

/// Raw draft-history row. Known columns are named; everything else lands in
/// the flattened map and becomes the player data blob.
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawDraftRow {
    Year: i32,
    Team: String,
    Player: String,
    #[serde(default)]
    Overall: Option<u32>,
    #[serde(default)]
    Keeps: Option<u32>,
    #[serde(flatten)]
    extra: HashMap<String, serde_json::Value>,
}

/// Raw season-result row. Finish is the final standing (1 = champion); the
/// stat blob is whatever other columns the league tracked that year.
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawSeasonRow {
    Year: i32,
    Team: String,
    Finish: u32,
    #[serde(flatten)]
    extra: HashMap<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// Read draft-history rows from CSV. Headers: Year, Team, Player, plus
/// optional Overall and Keeps; remaining columns become player data.
pub fn read_draft_history<R: Read>(reader: R) -> Result<Vec<DraftHistoryRow>, CsvError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for (i, result) in csv_reader.deserialize::<RawDraftRow>().enumerate() {
        let row_number = i + 2; // 1-based, after the header row
        let raw = result?;
        if raw.Year <= 0 {
            return Err(CsvError::Validation {
                row: row_number,
                message: format!("Year must be positive, got {}", raw.Year),
            });
        }
        if raw.Team.is_empty() || raw.Player.is_empty() {
            return Err(CsvError::Validation {
                row: row_number,
                message: "Team and Player must not be empty".to_string(),
            });
        }
        rows.push(DraftHistoryRow {
            draft_year: raw.Year,
            team_name: raw.Team,
            player_name: raw.Player,
            overall: raw.Overall.unwrap_or(0),
            keeps: raw.Keeps.unwrap_or(0),
            player_data: raw.extra,
        });
    }
    Ok(rows)
}

/// Read team-season result rows from CSV. Headers: Year, Team, Finish;
/// remaining columns become the season stat blob.
pub fn read_season_history<R: Read>(reader: R) -> Result<Vec<SeasonHistoryRow>, CsvError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for (i, result) in csv_reader.deserialize::<RawSeasonRow>().enumerate() {
        let row_number = i + 2;
        let raw = result?;
        if raw.Year <= 0 {
            return Err(CsvError::Validation {
                row: row_number,
                message: format!("Year must be positive, got {}", raw.Year),
            });
        }
        if raw.Finish == 0 {
            return Err(CsvError::Validation {
                row: row_number,
                message: "Finish must be at least 1".to_string(),
            });
        }
        rows.push(SeasonHistoryRow {
            draft_year: raw.Year,
            record: SeasonRecord {
                team_name: raw.Team,
                season_finish: raw.Finish,
                data: raw.extra,
            },
        });
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[allow(non_snake_case)]
struct PickExportRow {
    Overall: u32,
    RoundPick: String,
    Team: String,
    Player: String,
}

#[derive(Debug, Serialize)]
#[allow(non_snake_case)]
struct KeeperExportRow {
    Round: u32,
    Team: String,
    Player: String,
    Keeps: u32,
}

fn name_or_id(names: &HashMap<i64, String>, id: i64) -> String {
    names.get(&id).cloned().unwrap_or_else(|| id.to_string())
}

/// Write a draft's pick list as CSV: Overall, RoundPick ("RR:PP"), Team,
/// Player. Open slots export an empty Player column.
pub fn write_picks<W: Write>(
    writer: W,
    picks: &[DraftPick],
    teams_count: u32,
    team_names: &HashMap<i64, String>,
    player_names: &HashMap<i64, String>,
) -> Result<(), CsvError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for pick in picks {
        csv_writer.serialize(PickExportRow {
            Overall: pick.overall,
            RoundPick: rounds::format_round_pick(pick.overall, teams_count),
            Team: name_or_id(team_names, pick.team_id),
            Player: pick
                .player_id
                .map(|id| name_or_id(player_names, id))
                .unwrap_or_default(),
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write a draft's keeper rows as CSV: Round, Team, Player, Keeps.
pub fn write_keepers<W: Write>(
    writer: W,
    keepers: &[Keeper],
    team_names: &HashMap<i64, String>,
    player_names: &HashMap<i64, String>,
) -> Result<(), CsvError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for keeper in keepers {
        csv_writer.serialize(KeeperExportRow {
            Round: keeper.round,
            Team: name_or_id(team_names, keeper.team_id),
            Player: keeper
                .player_id
                .map(|id| name_or_id(player_names, id))
                .unwrap_or_default(),
            Keeps: keeper.keeps,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}
