// Integration tests for the draft core.
//
// These tests exercise the crate end-to-end through its public API: CSV
// import feeding the store, order and keeper generation, keeper-aware pick
// derivation, live selection with broadcast fan-out, carryover across two
// draft years, and season-history aggregation.

use std::collections::HashMap;

use draftboard::broadcast::{draft_topic, Broadcast, ChannelBroadcast, DraftMessage};
use draftboard::config::Config;
use draftboard::csv_io;
use draftboard::draft::carryover::{merge_previous_year, PreviousYear};
use draftboard::draft::projection;
use draftboard::draft::rounds;
use draftboard::stats;
use draftboard::store::{KeeperSubmission, SelectOutcome, Store};

// ===========================================================================
// Test helpers
// ===========================================================================

/// Build a store with a league, `teams` teams, and one draft for `year`,
/// with the baseline order set to team creation order.
fn seeded_store(teams: usize, year: i32, rounds: u32, keeper_count: u32) -> (Store, i64, Vec<i64>) {
    let store = Store::open(":memory:").expect("in-memory store should open");
    let league_id = store.create_league("Brine Shrimp Invitational").unwrap();
    let team_ids: Vec<i64> = (1..=teams)
        .map(|i| store.create_team(league_id, &format!("Team {i}")).unwrap())
        .collect();
    let draft_id = store
        .create_draft(league_id, year, rounds, keeper_count)
        .unwrap();
    store.set_draft_order(draft_id, &team_ids).unwrap();
    (store, draft_id, team_ids)
}

// ===========================================================================
// Draft lifecycle
// ===========================================================================

#[test]
fn generate_keep_apply_then_draft() {
    let (store, draft_id, team_ids) = seeded_store(4, 2025, 5, 2);

    assert_eq!(store.regenerate_picks(draft_id).unwrap(), 20);
    assert_eq!(store.regenerate_keepers(draft_id).unwrap(), 8);

    // Team 1 submits one round-1 keeper.
    let kept = store
        .upsert_player(draft_id, "Bobby Witt Jr.", &HashMap::new())
        .unwrap();
    store
        .replace_team_keepers(
            draft_id,
            team_ids[0],
            &[KeeperSubmission {
                round: 1,
                keeps: 1,
                player_id: Some(kept),
            }],
        )
        .unwrap();
    store.apply_keepers(draft_id).unwrap();

    let picks = store.picks(draft_id).unwrap();
    assert_eq!(picks[0].player_id, Some(kept));
    assert_eq!(picks.iter().filter(|p| p.player_id.is_some()).count(), 1);

    // The draft proceeds: the next team fills its round-1 pick live.
    let drafted = store
        .upsert_player(draft_id, "Elly De La Cruz", &HashMap::new())
        .unwrap();
    assert_eq!(
        store.select_player(picks[1].id, drafted).unwrap(),
        SelectOutcome::Selected
    );

    // Round/position arithmetic agrees with the stored shape.
    for pick in &picks {
        let round = rounds::round(pick.overall, 4);
        let in_round = rounds::round_pick(pick.overall, 4);
        assert_eq!((round - 1) * 4 + in_round, pick.overall);
    }
}

#[tokio::test]
async fn pick_race_publishes_once_and_loser_refetches() {
    let (store, draft_id, _) = seeded_store(2, 2025, 1, 0);
    store.regenerate_picks(draft_id).unwrap();

    let config = Config::default();
    let hub = ChannelBroadcast::new(config.channel_capacity);
    let topic = draft_topic(draft_id);
    let mut room = hub.subscribe(&topic);

    let winner = store.upsert_player(draft_id, "Winner", &HashMap::new()).unwrap();
    let loser = store.upsert_player(draft_id, "Loser", &HashMap::new()).unwrap();
    let pick = store.picks(draft_id).unwrap()[0].clone();

    // Winner's write succeeds and only then is the room notified.
    assert_eq!(
        store.select_player(pick.id, winner).unwrap(),
        SelectOutcome::Selected
    );
    hub.publish(
        &topic,
        DraftMessage::PickMade {
            draft_id,
            pick_id: pick.id,
            overall: pick.overall,
        },
    )
    .await
    .unwrap();

    // Loser's conditional write reports the conflict; nothing is published.
    assert_eq!(
        store.select_player(pick.id, loser).unwrap(),
        SelectOutcome::Conflict {
            current_player: Some(winner)
        }
    );

    // The room saw exactly one signal, and a refetch shows the winner.
    assert_eq!(
        room.recv().await.unwrap(),
        DraftMessage::PickMade {
            draft_id,
            pick_id: pick.id,
            overall: pick.overall,
        }
    );
    assert!(room.try_recv().is_err());
    assert_eq!(store.picks(draft_id).unwrap()[0].player_id, Some(winner));
}

// ===========================================================================
// CSV import -> carryover across years
// ===========================================================================

#[test]
fn imported_history_feeds_carryover_merge() {
    let (store, prev_draft, team_ids) = seeded_store(2, 2024, 2, 1);
    store.regenerate_picks(prev_draft).unwrap();

    // Import last year's draft results.
    let csv_text = "\
Year,Team,Player,Overall,Keeps,Rank
2024,Team 1,Bobby Witt Jr.,1,1,1
2024,Team 2,Corbin Carroll,2,0,5
2024,Team 1,Late Rounder,3,0,40
";
    let rows = csv_io::read_draft_history(csv_text.as_bytes()).unwrap();
    assert_eq!(rows.len(), 3);

    let picks = store.picks(prev_draft).unwrap();
    for row in &rows {
        let player_id = store
            .upsert_player(prev_draft, &row.player_name, &row.player_data)
            .unwrap();
        let pick = picks.iter().find(|p| p.overall == row.overall).unwrap();
        store.select_player(pick.id, player_id).unwrap();
    }
    // Bobby Witt Jr. was also kept last year.
    store.regenerate_keepers(prev_draft).unwrap();
    let witt = store.players(prev_draft).unwrap()
        .into_iter()
        .find(|p| p.name == "Bobby Witt Jr.")
        .unwrap();
    let keeper_id = store
        .keepers(prev_draft)
        .unwrap()
        .into_iter()
        .find(|k| k.team_id == team_ids[0])
        .unwrap()
        .id;
    store.update_keeper(keeper_id, 1, 1, Some(witt.id)).unwrap();

    // This year's draft with an overlapping player pool.
    let draft = store.draft(prev_draft).unwrap();
    let this_draft = store.create_draft(draft.league_id, 2025, 2, 1).unwrap();
    for name in ["Bobby Witt Jr.", "Corbin Carroll", "Rookie Phenom"] {
        store.upsert_player(this_draft, name, &HashMap::new()).unwrap();
    }

    let prev_picks = store.picks(prev_draft).unwrap();
    let prev_keepers = store.keepers(prev_draft).unwrap();
    let prev_players = store.players(prev_draft).unwrap();
    let merged = merge_previous_year(
        store.players(this_draft).unwrap(),
        Some(PreviousYear {
            picks: &prev_picks,
            keepers: &prev_keepers,
            players: &prev_players,
            teams_count: 2,
        }),
    );

    let by_name: HashMap<&str, _> = merged
        .iter()
        .map(|h| (h.player.name.as_str(), h))
        .collect();

    // Overall 1 in a 2-team draft is round 1, and the keeper row rides along.
    let witt_history = by_name["Bobby Witt Jr."].previous.as_ref().unwrap();
    assert_eq!(witt_history.round, 1);
    assert_eq!(witt_history.pick.overall, 1);
    assert_eq!(witt_history.keeper.as_ref().unwrap().keeps, 1);

    // Drafted but not kept: pick history only.
    let carroll_history = by_name["Corbin Carroll"].previous.as_ref().unwrap();
    assert_eq!(carroll_history.round, 1);
    assert!(carroll_history.keeper.is_none());

    // New player: no history.
    assert!(by_name["Rookie Phenom"].previous.is_none());
}

#[test]
fn first_year_league_skips_carryover() {
    let (store, draft_id, _) = seeded_store(2, 2025, 2, 0);
    store.upsert_player(draft_id, "Anyone", &HashMap::new()).unwrap();

    let draft = store.draft(draft_id).unwrap();
    assert!(store.draft_for_year(draft.league_id, 2024).unwrap().is_none());

    let merged = merge_previous_year(store.players(draft_id).unwrap(), None);
    assert_eq!(merged.len(), 1);
    assert!(merged[0].previous.is_none());
}

// ===========================================================================
// Expected position during a live draft
// ===========================================================================

#[test]
fn expected_position_reflects_board_state() {
    let (store, draft_id, _) = seeded_store(10, 2025, 3, 0);
    store.regenerate_picks(draft_id).unwrap();

    // Ten picks already consumed; overall 10 is on the clock. A rank-5
    // player with nobody ranked below 5 drafted projects to overall 14.
    let picks = store.picks(draft_id).unwrap();
    let on_clock = picks.iter().find(|p| p.player_id.is_none()).unwrap();
    assert_eq!(on_clock.overall, 1); // fresh board

    assert_eq!(projection::expected_overall(5, Some(10), 0), 14);

    let config = Config::default();
    assert_eq!(
        projection::expected_round(5, Some(10), 0, 10, config.max_round_filter),
        2
    );
    // Deep ranks collapse into the ceiling bucket.
    assert_eq!(
        projection::expected_round(400, Some(10), 0, 10, config.max_round_filter),
        config.max_round_filter
    );
}

// ===========================================================================
// Season history: CSV -> aggregation -> export round trip
// ===========================================================================

#[test]
fn season_history_aggregates_from_csv() {
    let csv_text = "\
Year,Team,Finish,Wins,ERA
2022,Mudcats,1,10,3.00
2023,Mudcats,4,12,4.00
2023,Vorticists,8,7,5.25
";
    let rows = csv_io::read_season_history(csv_text.as_bytes()).unwrap();
    let records: Vec<stats::SeasonRecord> = rows.into_iter().map(|r| r.record).collect();

    let config = Config::default();
    let table = stats::aggregate(&records, config.playoff_threshold, false);
    assert_eq!(table.len(), 2);

    let mudcats = &table[0];
    assert_eq!(mudcats.team_name, "Mudcats");
    assert_eq!(mudcats.seasons, 2);
    assert_eq!(mudcats.championships, 1);
    assert_eq!(mudcats.playoffs, 2);
    assert_eq!(mudcats.totals["Wins"], 22.0);
    assert_eq!(mudcats.totals["ERA"], 3.5);

    let vorticists = &table[1];
    assert_eq!(vorticists.seasons, 1);
    assert_eq!(vorticists.playoffs, 0);

    // Average mode halves the sums and leaves the per-season fields alone.
    let averaged = stats::aggregate(&records, config.playoff_threshold, true);
    assert_eq!(averaged[0].totals["Wins"], 11.0);
    assert_eq!(averaged[0].totals["ERA"], 3.5);
}

#[test]
fn pick_export_matches_stored_draft() {
    let (store, draft_id, team_ids) = seeded_store(2, 2025, 2, 0);
    store.regenerate_picks(draft_id).unwrap();
    let player = store
        .upsert_player(draft_id, "Bobby Witt Jr.", &HashMap::new())
        .unwrap();
    let picks = store.picks(draft_id).unwrap();
    store.select_player(picks[0].id, player).unwrap();

    let league_id = store.draft(draft_id).unwrap().league_id;
    let team_names: HashMap<i64, String> = store
        .teams(league_id)
        .unwrap()
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect();
    let player_names: HashMap<i64, String> = store
        .players(draft_id)
        .unwrap()
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect();

    let mut out = Vec::new();
    csv_io::write_picks(
        &mut out,
        &store.picks(draft_id).unwrap(),
        team_ids.len() as u32,
        &team_names,
        &player_names,
    )
    .unwrap();

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 5); // header + 4 picks
    assert_eq!(lines[1], "1,01:01,Team 1,Bobby Witt Jr.");
    assert_eq!(lines[2], "2,01:02,Team 2,");
    assert_eq!(lines[3], "3,02:01,Team 1,");
}
