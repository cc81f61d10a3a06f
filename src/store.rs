// SQLite persistence for leagues, teams, drafts, picks, and keepers.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use tracing::info;

use crate::draft::keepers;
use crate::draft::order;
use crate::draft::types::{Draft, DraftPick, Keeper, Player, Team};

/// Domain failure conditions surfaced through `anyhow` (downcast to match).
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("draft {0} not found")]
    DraftNotFound(i64),

    #[error("pick {0} not found")]
    PickNotFound(i64),

    #[error("keeper {0} not found")]
    KeeperNotFound(i64),

    #[error("team {0} not found")]
    TeamNotFound(i64),

    #[error("draft {0} is locked; pick edits rejected")]
    DraftLocked(i64),

    #[error("keepers for draft {0} are locked; keeper edits rejected")]
    KeepersLocked(i64),
}

/// Outcome of a live pick selection. The update is conditional: it only
/// succeeds while the slot is still open, so two users racing for the same
/// slot produce exactly one `Selected` and one `Conflict`.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectOutcome {
    Selected,
    Conflict { current_player: Option<i64> },
}

/// A team's keeper submission, before row ids are assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct KeeperSubmission {
    pub round: u32,
    pub keeps: u32,
    pub player_id: Option<i64>,
}

/// SQLite-backed store. All mutations that replace whole row sets run in a
/// single transaction so failed regenerations leave existing data untouched.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral database (useful for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS leagues (
                id   INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS teams (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                league_id INTEGER NOT NULL REFERENCES leagues(id),
                name      TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS drafts (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                league_id    INTEGER NOT NULL REFERENCES leagues(id),
                year         INTEGER NOT NULL,
                rounds       INTEGER NOT NULL,
                keeper_count INTEGER NOT NULL DEFAULT 0,
                draft_lock   TEXT,
                keepers_lock TEXT,
                UNIQUE(league_id, year)
            );

            CREATE TABLE IF NOT EXISTS draft_teams (
                draft_id INTEGER NOT NULL REFERENCES drafts(id),
                team_id  INTEGER NOT NULL REFERENCES teams(id),
                ord      INTEGER NOT NULL,
                PRIMARY KEY (draft_id, team_id)
            );

            CREATE TABLE IF NOT EXISTS players (
                id       INTEGER PRIMARY KEY AUTOINCREMENT,
                draft_id INTEGER NOT NULL REFERENCES drafts(id),
                name     TEXT NOT NULL,
                data     TEXT NOT NULL DEFAULT '{}',
                UNIQUE(draft_id, name)
            );

            CREATE TABLE IF NOT EXISTS draft_picks (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                draft_id  INTEGER NOT NULL REFERENCES drafts(id),
                team_id   INTEGER NOT NULL REFERENCES teams(id),
                overall   INTEGER NOT NULL,
                player_id INTEGER REFERENCES players(id),
                UNIQUE(draft_id, overall)
            );

            CREATE TABLE IF NOT EXISTS keepers (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                draft_id  INTEGER NOT NULL REFERENCES drafts(id),
                team_id   INTEGER NOT NULL REFERENCES teams(id),
                round     INTEGER NOT NULL,
                keeps     INTEGER NOT NULL DEFAULT 0,
                player_id INTEGER REFERENCES players(id)
            );

            CREATE INDEX IF NOT EXISTS idx_picks_draft ON draft_picks(draft_id);
            CREATE INDEX IF NOT EXISTS idx_keepers_draft ON keepers(draft_id);
            CREATE INDEX IF NOT EXISTS idx_players_draft ON players(draft_id);
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    // ------------------------------------------------------------------
    // Leagues and teams
    // ------------------------------------------------------------------

    pub fn create_league(&self, name: &str) -> Result<i64> {
        let conn = self.conn();
        conn.execute("INSERT INTO leagues (name) VALUES (?1)", params![name])
            .context("failed to create league")?;
        Ok(conn.last_insert_rowid())
    }

    pub fn create_team(&self, league_id: i64, name: &str) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO teams (league_id, name) VALUES (?1, ?2)",
            params![league_id, name],
        )
        .context("failed to create team")?;
        Ok(conn.last_insert_rowid())
    }

    /// Rename a team. Identity is immutable; only the display name changes.
    pub fn rename_team(&self, team_id: i64, name: &str) -> Result<()> {
        let conn = self.conn();
        let changed = conn
            .execute(
                "UPDATE teams SET name = ?1 WHERE id = ?2",
                params![name, team_id],
            )
            .context("failed to rename team")?;
        if changed == 0 {
            bail!(StoreError::TeamNotFound(team_id));
        }
        Ok(())
    }

    pub fn teams(&self, league_id: i64) -> Result<Vec<Team>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT id, league_id, name FROM teams WHERE league_id = ?1 ORDER BY id")
            .context("failed to prepare teams query")?;
        let teams = stmt
            .query_map(params![league_id], |row| {
                Ok(Team {
                    id: row.get(0)?,
                    league_id: row.get(1)?,
                    name: row.get(2)?,
                })
            })
            .context("failed to query teams")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map team rows")?;
        Ok(teams)
    }

    // ------------------------------------------------------------------
    // Drafts
    // ------------------------------------------------------------------

    /// Create a draft for a league year. Years are unique per league, so a
    /// duplicate year fails.
    pub fn create_draft(
        &self,
        league_id: i64,
        year: i32,
        rounds: u32,
        keeper_count: u32,
    ) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO drafts (league_id, year, rounds, keeper_count) VALUES (?1, ?2, ?3, ?4)",
            params![league_id, year, rounds, keeper_count],
        )
        .context("failed to create draft")?;
        Ok(conn.last_insert_rowid())
    }

    pub fn draft(&self, draft_id: i64) -> Result<Draft> {
        let conn = self.conn();
        let draft = conn
            .query_row(
                "SELECT id, league_id, year, rounds, keeper_count, draft_lock, keepers_lock
                 FROM drafts WHERE id = ?1",
                params![draft_id],
                draft_from_row,
            )
            .optional()
            .context("failed to query draft")?;
        match draft {
            Some(draft) => Ok(draft),
            None => bail!(StoreError::DraftNotFound(draft_id)),
        }
    }

    /// Find a league's draft for a specific year (e.g. the prior year for
    /// the carryover merge). `None` when the league has no draft that year.
    pub fn draft_for_year(&self, league_id: i64, year: i32) -> Result<Option<Draft>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, league_id, year, rounds, keeper_count, draft_lock, keepers_lock
             FROM drafts WHERE league_id = ?1 AND year = ?2",
            params![league_id, year],
            draft_from_row,
        )
        .optional()
        .context("failed to query draft by year")
    }

    /// Stamp the draft lock; pick regeneration and order edits are rejected
    /// afterwards.
    pub fn lock_draft(&self, draft_id: i64) -> Result<()> {
        self.set_lock(draft_id, "draft_lock")
    }

    /// Stamp the keepers lock; keeper edits are rejected afterwards.
    pub fn lock_keepers(&self, draft_id: i64) -> Result<()> {
        self.set_lock(draft_id, "keepers_lock")
    }

    fn set_lock(&self, draft_id: i64, column: &str) -> Result<()> {
        let conn = self.conn();
        let changed = conn
            .execute(
                &format!("UPDATE drafts SET {column} = ?1 WHERE id = ?2"),
                params![Utc::now().to_rfc3339(), draft_id],
            )
            .with_context(|| format!("failed to set {column}"))?;
        if changed == 0 {
            bail!(StoreError::DraftNotFound(draft_id));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Draft team order
    // ------------------------------------------------------------------

    /// Replace the draft's participating-team list and baseline order.
    /// Rejected once the draft is locked.
    pub fn set_draft_order(&self, draft_id: i64, team_ids: &[i64]) -> Result<()> {
        let draft = self.draft(draft_id)?;
        if !draft.picks_editable() {
            bail!(StoreError::DraftLocked(draft_id));
        }

        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin transaction")?;
        tx.execute(
            "DELETE FROM draft_teams WHERE draft_id = ?1",
            params![draft_id],
        )
        .context("failed to clear draft teams")?;
        for (i, &team_id) in team_ids.iter().enumerate() {
            tx.execute(
                "INSERT INTO draft_teams (draft_id, team_id, ord) VALUES (?1, ?2, ?3)",
                params![draft_id, team_id, i as i64],
            )
            .context("failed to insert draft team")?;
        }
        tx.commit().context("failed to commit draft order")?;
        Ok(())
    }

    /// Participating team ids in baseline order.
    pub fn draft_team_ids(&self, draft_id: i64) -> Result<Vec<i64>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT team_id FROM draft_teams WHERE draft_id = ?1 ORDER BY ord")
            .context("failed to prepare draft teams query")?;
        let ids = stmt
            .query_map(params![draft_id], |row| row.get(0))
            .context("failed to query draft teams")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map draft team rows")?;
        Ok(ids)
    }

    // ------------------------------------------------------------------
    // Picks
    // ------------------------------------------------------------------

    /// Regenerate the full pick list from the baseline team order:
    /// delete-all then bulk-insert, in one transaction. Fails fast (leaving
    /// existing picks untouched) when the team list is empty or the draft
    /// is locked. Returns the number of picks created.
    pub fn regenerate_picks(&self, draft_id: i64) -> Result<usize> {
        let draft = self.draft(draft_id)?;
        if !draft.picks_editable() {
            bail!(StoreError::DraftLocked(draft_id));
        }
        let team_ids = self.draft_team_ids(draft_id)?;
        let slots = order::generate_order(&team_ids, draft.rounds)
            .context("pick generation rejected")?;

        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin transaction")?;
        tx.execute(
            "DELETE FROM draft_picks WHERE draft_id = ?1",
            params![draft_id],
        )
        .context("failed to delete existing picks")?;
        for slot in &slots {
            tx.execute(
                "INSERT INTO draft_picks (draft_id, team_id, overall) VALUES (?1, ?2, ?3)",
                params![draft_id, slot.team_id, slot.overall],
            )
            .context("failed to insert pick")?;
        }
        tx.commit().context("failed to commit pick regeneration")?;

        info!(
            draft_id,
            picks = slots.len(),
            "regenerated draft pick list"
        );
        Ok(slots.len())
    }

    /// All picks for a draft, ordered by overall.
    pub fn picks(&self, draft_id: i64) -> Result<Vec<DraftPick>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT id, draft_id, team_id, overall, player_id
                 FROM draft_picks WHERE draft_id = ?1 ORDER BY overall",
            )
            .context("failed to prepare picks query")?;
        let picks = stmt
            .query_map(params![draft_id], |row| {
                Ok(DraftPick {
                    id: row.get(0)?,
                    draft_id: row.get(1)?,
                    team_id: row.get(2)?,
                    overall: row.get(3)?,
                    player_id: row.get(4)?,
                })
            })
            .context("failed to query picks")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map pick rows")?;
        Ok(picks)
    }

    /// Live pick selection: fill the slot only if it is still open.
    ///
    /// The WHERE clause is the arbiter for concurrent picks: of two racing
    /// writers exactly one row-update succeeds, and the loser gets a
    /// [`SelectOutcome::Conflict`] carrying whatever is now stored.
    pub fn select_player(&self, pick_id: i64, player_id: i64) -> Result<SelectOutcome> {
        let conn = self.conn();
        let changed = conn
            .execute(
                "UPDATE draft_picks SET player_id = ?1 WHERE id = ?2 AND player_id IS NULL",
                params![player_id, pick_id],
            )
            .context("failed to select player for pick")?;
        if changed == 1 {
            return Ok(SelectOutcome::Selected);
        }

        let current: Option<Option<i64>> = conn
            .query_row(
                "SELECT player_id FROM draft_picks WHERE id = ?1",
                params![pick_id],
                |row| row.get(0),
            )
            .optional()
            .context("failed to read conflicting pick")?;
        match current {
            None => bail!(StoreError::PickNotFound(pick_id)),
            Some(current_player) => Ok(SelectOutcome::Conflict { current_player }),
        }
    }

    /// Administrative unset of a pick slot.
    pub fn clear_pick(&self, pick_id: i64) -> Result<()> {
        let conn = self.conn();
        let changed = conn
            .execute(
                "UPDATE draft_picks SET player_id = NULL WHERE id = ?1",
                params![pick_id],
            )
            .context("failed to clear pick")?;
        if changed == 0 {
            bail!(StoreError::PickNotFound(pick_id));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Keepers
    // ------------------------------------------------------------------

    /// Regenerate keeper slots from the baseline team order: one unassigned
    /// slot per team per keeper round, delete-all then bulk-insert. Returns
    /// the number of slots created.
    pub fn regenerate_keepers(&self, draft_id: i64) -> Result<usize> {
        let draft = self.draft(draft_id)?;
        if !draft.keepers_editable() {
            bail!(StoreError::KeepersLocked(draft_id));
        }
        let team_ids = self.draft_team_ids(draft_id)?;
        let slots = keepers::generate_keeper_slots(&team_ids, draft.keeper_count)
            .context("keeper generation rejected")?;

        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin transaction")?;
        tx.execute("DELETE FROM keepers WHERE draft_id = ?1", params![draft_id])
            .context("failed to delete existing keepers")?;
        for slot in &slots {
            tx.execute(
                "INSERT INTO keepers (draft_id, team_id, round) VALUES (?1, ?2, ?3)",
                params![draft_id, slot.team_id, slot.round],
            )
            .context("failed to insert keeper slot")?;
        }
        tx.commit().context("failed to commit keeper regeneration")?;

        info!(
            draft_id,
            keepers = slots.len(),
            "regenerated keeper slots"
        );
        Ok(slots.len())
    }

    /// All keeper rows for a draft, grouped by round then team order of
    /// insertion.
    pub fn keepers(&self, draft_id: i64) -> Result<Vec<Keeper>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT id, draft_id, team_id, round, keeps, player_id
                 FROM keepers WHERE draft_id = ?1 ORDER BY round, id",
            )
            .context("failed to prepare keepers query")?;
        let rows = stmt
            .query_map(params![draft_id], |row| {
                Ok(Keeper {
                    id: row.get(0)?,
                    draft_id: row.get(1)?,
                    team_id: row.get(2)?,
                    round: row.get(3)?,
                    keeps: row.get(4)?,
                    player_id: row.get(5)?,
                })
            })
            .context("failed to query keepers")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map keeper rows")?;
        Ok(rows)
    }

    /// Replace one team's keeper rows with its submission, leaving every
    /// other team's rows untouched. Rejected once keepers are locked.
    pub fn replace_team_keepers(
        &self,
        draft_id: i64,
        team_id: i64,
        submission: &[KeeperSubmission],
    ) -> Result<()> {
        let draft = self.draft(draft_id)?;
        if !draft.keepers_editable() {
            bail!(StoreError::KeepersLocked(draft_id));
        }

        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin transaction")?;
        tx.execute(
            "DELETE FROM keepers WHERE draft_id = ?1 AND team_id = ?2",
            params![draft_id, team_id],
        )
        .context("failed to delete team keepers")?;
        for row in submission {
            tx.execute(
                "INSERT INTO keepers (draft_id, team_id, round, keeps, player_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![draft_id, team_id, row.round, row.keeps, row.player_id],
            )
            .context("failed to insert keeper submission")?;
        }
        tx.commit().context("failed to commit keeper submission")?;
        Ok(())
    }

    /// Mutate a keeper row's administrative fields in place.
    pub fn update_keeper(
        &self,
        keeper_id: i64,
        round: u32,
        keeps: u32,
        player_id: Option<i64>,
    ) -> Result<()> {
        let conn = self.conn();
        let changed = conn
            .execute(
                "UPDATE keepers SET round = ?1, keeps = ?2, player_id = ?3 WHERE id = ?4",
                params![round, keeps, player_id, keeper_id],
            )
            .context("failed to update keeper")?;
        if changed == 0 {
            bail!(StoreError::KeeperNotFound(keeper_id));
        }
        Ok(())
    }

    /// Apply keepers to the pick list: every pick whose (round, team)
    /// matches a keeper takes that keeper's player, every other pick is
    /// cleared. Same overall values, new fill state, one transaction.
    pub fn apply_keepers(&self, draft_id: i64) -> Result<()> {
        let draft = self.draft(draft_id)?;
        if !draft.picks_editable() {
            bail!(StoreError::DraftLocked(draft_id));
        }
        let teams_count = self.draft_team_ids(draft_id)?.len() as u32;
        let picks = self.picks(draft_id)?;
        let keeper_rows = self.keepers(draft_id)?;
        let derived = keepers::apply_keepers_to_picks(&picks, &keeper_rows, teams_count);

        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin transaction")?;
        for pick in &derived {
            tx.execute(
                "UPDATE draft_picks SET player_id = ?1 WHERE id = ?2",
                params![pick.player_id, pick.id],
            )
            .context("failed to write derived pick")?;
        }
        tx.commit().context("failed to commit keeper application")?;

        info!(draft_id, "applied keepers to pick list");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Players
    // ------------------------------------------------------------------

    /// Insert a player or update their data blob if the name already exists
    /// in the draft. Returns the player's row id.
    pub fn upsert_player(
        &self,
        draft_id: i64,
        name: &str,
        data: &HashMap<String, serde_json::Value>,
    ) -> Result<i64> {
        let conn = self.conn();
        let data_json = serde_json::to_string(data).context("failed to serialize player data")?;
        let id: i64 = conn
            .query_row(
                "INSERT INTO players (draft_id, name, data)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(draft_id, name) DO UPDATE SET data = excluded.data
                 RETURNING id",
                params![draft_id, name, data_json],
                |row| row.get(0),
            )
            .context("failed to upsert player")?;
        Ok(id)
    }

    /// All players for a draft, ordered by name.
    pub fn players(&self, draft_id: i64) -> Result<Vec<Player>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT id, draft_id, name, data FROM players
                 WHERE draft_id = ?1 ORDER BY name",
            )
            .context("failed to prepare players query")?;
        let players = stmt
            .query_map(params![draft_id], |row| {
                let data_json: String = row.get(3)?;
                Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?, row.get::<_, String>(2)?, data_json))
            })
            .context("failed to query players")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map player rows")?
            .into_iter()
            .map(|(id, draft_id, name, data_json)| {
                let data = serde_json::from_str(&data_json)
                    .with_context(|| format!("corrupt data blob for player {id}"))?;
                Ok(Player {
                    id,
                    draft_id,
                    name,
                    data,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(players)
    }
}

/// Map a drafts row to a [`Draft`], parsing RFC 3339 lock timestamps.
fn draft_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Draft> {
    let draft_lock: Option<String> = row.get(5)?;
    let keepers_lock: Option<String> = row.get(6)?;
    Ok(Draft {
        id: row.get(0)?,
        league_id: row.get(1)?,
        year: row.get(2)?,
        rounds: row.get(3)?,
        keeper_count: row.get(4)?,
        draft_lock: draft_lock.and_then(parse_lock),
        keepers_lock: keepers_lock.and_then(parse_lock),
    })
}

fn parse_lock(text: String) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
