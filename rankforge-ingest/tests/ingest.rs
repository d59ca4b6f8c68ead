//! End-to-end coverage of the concrete scenarios a log file can present,
//! driven through `runner::ingest_file` against `InMemoryStorageDriver` so
//! no real Postgres instance is needed.

use std::io::Write;

use chrono::{SecondsFormat, TimeZone, Utc};
use rankforge_db::models::GameEventKind;
use rankforge_ingest::error::IngestError;
use rankforge_ingest::rating::RatingConfig;
use rankforge_ingest::runner::ingest_file;
use rankforge_ingest::storage::InMemoryStorageDriver;
use tempfile::NamedTempFile;

const KHANJER: (&str, &str) = ("Khanjer", "[U:1:1598851733]");
const BOB: (&str, &str) = ("Bob", "[U:1:222]");

fn ts(offset_secs: i64) -> String {
    Utc.timestamp_opt(1_700_000_000 + offset_secs, 0)
        .unwrap()
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn raw_line(offset_secs: i64, log: &str) -> String {
    serde_json::json!({
        "time": ts(offset_secs),
        "log": format!("L 01/01/2024 - 00:00:00: {log}"),
    })
    .to_string()
}

/// One round: a kill, then the compound `Round_End` block (`JSON_BEGIN`, six
/// header rows, one surviving-player row, `JSON_END`). Mirrors the fixture
/// shape hand-verified in `rankforge-parser`'s rewind test.
fn round_lines(offset: &mut i64, killer: (&str, &str), victim: (&str, &str)) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(raw_line(*offset, r#"World triggered "Round_Start""#));
    *offset += 1;
    lines.push(raw_line(
        *offset,
        &format!(
            r#""{}<3><{}><CT>" [0 0 0] killed "{}<4><{}><TERRORIST>" [0 0 0] with "ak47""#,
            killer.0, killer.1, victim.0, victim.1
        ),
    ));
    *offset += 1;
    lines.push(raw_line(*offset, r#"World triggered "Round_End""#));
    *offset += 1;
    lines.push(raw_line(*offset, "JSON_BEGIN"));
    *offset += 1;
    for h in 0..6 {
        lines.push(raw_line(*offset, &format!("header{h}")));
        *offset += 1;
    }
    lines.push(raw_line(
        *offset,
        &format!(r#""player_0": "{}:CT,1,0,0""#, killer.0),
    ));
    *offset += 1;
    lines.push(raw_line(*offset, "JSON_END"));
    *offset += 1;
    lines
}

fn bare_round_start(offset: &mut i64) -> String {
    let line = raw_line(*offset, r#"World triggered "Round_Start""#);
    *offset += 1;
    line
}

fn accolade_lines(offset: &mut i64, count: usize, player: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for n in 0..count {
        lines.push(raw_line(
            *offset,
            &format!("ACCOLADE, FINAL: {{acc{n}}},\t{player}<0>,\tVALUE: 1.0,\tPOS: 1,\tSCORE: 10.0"),
        ));
        *offset += 1;
    }
    lines
}

fn game_over_line(offset: &mut i64, team1: i32, team2: i32, duration: i32) -> String {
    let line = raw_line(
        *offset,
        &format!(
            "Game Over: competitive mg_active de_dust2 score {team1}:{team2} after {duration} min"
        ),
    );
    *offset += 1;
    line
}

fn write_fixture(lines: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    writeln!(file, "{}", lines.join("\n")).expect("write fixture");
    file
}

fn full_match(
    offset: &mut i64,
    rounds: usize,
    team1: i32,
    team2: i32,
    duration: i32,
    accolade_count: usize,
) -> Vec<String> {
    let mut lines = Vec::new();
    for _ in 0..rounds {
        lines.extend(round_lines(offset, KHANJER, BOB));
    }
    lines.extend(accolade_lines(offset, accolade_count, KHANJER.0));
    lines.push(game_over_line(offset, team1, team2, duration));
    lines
}

#[test]
fn s1_single_complete_match_commits_every_round_and_accolade() {
    let mut offset = 0i64;
    let lines = full_match(&mut offset, 16, 9, 7, 42, 10);
    let file = write_fixture(&lines);

    let mut driver = InMemoryStorageDriver::new();
    let stats = ingest_file(file.path(), &mut driver, &RatingConfig::default())
        .expect("ingest should succeed");

    assert_eq!(stats.games_committed, 1);
    assert_eq!(driver.games().len(), 1);
    let game = &driver.games()[0];
    assert_eq!(game.team1_score, 9);
    assert_eq!(game.team2_score, 7);
    assert_eq!(game.duration_minutes, Some(42));
    assert_eq!(driver.accolades().len(), 10);

    let round_starts: Vec<i32> = driver
        .events()
        .iter()
        .filter(|e| e.event_type == GameEventKind::RoundStart.as_i16())
        .filter_map(|e| e.round_number)
        .collect();
    let mut sorted = round_starts.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, (1..=16).collect::<Vec<_>>());

    let round_ends = driver
        .events()
        .iter()
        .filter(|e| e.event_type == GameEventKind::RoundEnd.as_i16())
        .count();
    assert_eq!(round_ends, 16);

    // Every non-RoundStart event references the round it belongs to.
    for event in driver.events() {
        if event.event_type != GameEventKind::RoundStart.as_i16() {
            assert!(event.round_start_event_id.is_some());
        }
        assert!(event.game_id > 0);
    }
}

#[test]
fn s2_reingesting_same_file_is_idempotent() {
    let mut offset = 0i64;
    let lines = full_match(&mut offset, 16, 9, 7, 42, 10);
    let file = write_fixture(&lines);

    let mut driver = InMemoryStorageDriver::new();
    let first = ingest_file(file.path(), &mut driver, &RatingConfig::default())
        .expect("first ingest should succeed");
    let second = ingest_file(file.path(), &mut driver, &RatingConfig::default())
        .expect("second ingest should succeed");

    assert_eq!(first.games_committed, 1);
    assert_eq!(second.games_committed, 0);
    assert_eq!(driver.games().len(), 1);
    assert_eq!(driver.accolades().len(), 10);
}

#[test]
fn s3_warmup_round_starts_are_discarded() {
    let mut offset = 0i64;
    let mut lines = Vec::new();
    for _ in 0..8 {
        lines.push(bare_round_start(&mut offset));
    }
    lines.extend(full_match(&mut offset, 8, 5, 3, 20, 6));
    let file = write_fixture(&lines);

    let mut driver = InMemoryStorageDriver::new();
    let stats = ingest_file(file.path(), &mut driver, &RatingConfig::default())
        .expect("ingest should succeed");

    assert_eq!(stats.games_committed, 1);
    let round_starts = driver
        .events()
        .iter()
        .filter(|e| e.event_type == GameEventKind::RoundStart.as_i16())
        .count();
    assert_eq!(round_starts, 8, "warmup round starts must not be persisted");
}

#[test]
fn s4_game_over_with_too_few_round_starts_is_parse_fatal() {
    let mut offset = 0i64;
    let mut lines = Vec::new();
    for _ in 0..10 {
        lines.push(bare_round_start(&mut offset));
    }
    lines.extend(accolade_lines(&mut offset, 6, KHANJER.0));
    lines.push(game_over_line(&mut offset, 9, 7, 42));
    let file = write_fixture(&lines);

    let mut driver = InMemoryStorageDriver::new();
    let result = ingest_file(file.path(), &mut driver, &RatingConfig::default());

    assert!(matches!(result, Err(IngestError::Parse { .. })));
    assert!(driver.games().is_empty(), "a fatal parse error must write nothing");
}

#[test]
fn s5_accolade_resolves_steam_id_from_a_prior_kill() {
    let mut offset = 0i64;
    let mut lines = round_lines(&mut offset, KHANJER, BOB);
    lines.push(raw_line(
        offset,
        &format!(
            "ACCOLADE, FINAL: {{5k}},\t{}<0>,\tVALUE: 1.0,\tPOS: 1,\tSCORE: 40.0",
            KHANJER.0
        ),
    ));
    offset += 1;
    lines.extend(accolade_lines(&mut offset, 5, BOB.0));
    lines.push(game_over_line(&mut offset, 1, 0, 1));
    let file = write_fixture(&lines);

    let mut driver = InMemoryStorageDriver::new();
    ingest_file(file.path(), &mut driver, &RatingConfig::default())
        .expect("ingest should succeed");

    let five_k = driver
        .accolades()
        .iter()
        .find(|a| a.accolade_type == "5k")
        .expect("5k accolade should be persisted");
    assert_eq!(five_k.player_name, KHANJER.0);
    assert_eq!(five_k.steam_id.as_deref(), Some(KHANJER.1));
}

#[test]
fn s6_rank_and_games_played_accumulate_across_matches_in_file_order() {
    let mut offset = 0i64;
    let mut lines = full_match(&mut offset, 1, 1, 0, 1, 6);
    lines.extend(full_match(&mut offset, 1, 1, 0, 1, 6));
    let file = write_fixture(&lines);

    let mut driver = InMemoryStorageDriver::new();
    let stats = ingest_file(file.path(), &mut driver, &RatingConfig::default())
        .expect("ingest should succeed");

    assert_eq!(stats.games_committed, 2);

    let killer = driver
        .player_stats(KHANJER.1)
        .expect("killer stats should exist");
    let victim = driver
        .player_stats(BOB.1)
        .expect("victim stats should exist");

    assert_eq!(killer.games_played, 2);
    assert_eq!(killer.kills, 2);
    assert_eq!(victim.games_played, 2);
    assert_eq!(victim.deaths, 2);

    // Khanjer won a kill in each match; as the standing favorite after match
    // one, his second win should swing his rank up again (smaller delta
    // than the even-odds first win, but still a strict gain).
    assert!(killer.rank > 1016.0);
    assert!(victim.rank < 984.0);
}
