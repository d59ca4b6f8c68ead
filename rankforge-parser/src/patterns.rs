//! The regex dictionary. One compiled pattern per recognized line shape,
//! built once via `lazy_static!` the way `mmoldb-ingest` keeps its
//! once-built lookups, and a handful of small helpers for the player/coord
//! fragments that show up inside several of them.

use lazy_static::lazy_static;
use regex::Regex;

use crate::event::{Coords, PlayerRef, Team};

const PLAYER: &str = r#""(?P<NAME>.+?)<(?P<UID>\d+)><(?P<STEAM>BOT|\[U:\d+:\d+\])><(?P<TEAM>CT|TERRORIST)>""#;
const VPLAYER: &str = r#""(?P<V_NAME>.+?)<(?P<V_UID>\d+)><(?P<V_STEAM>BOT|\[U:\d+:\d+\])><(?P<V_TEAM>CT|TERRORIST)>""#;

fn named(pattern: &str, prefix: &str) -> String {
    pattern
        .replace("NAME", &format!("{prefix}name"))
        .replace("UID", &format!("{prefix}uid"))
        .replace("STEAM", &format!("{prefix}steam"))
        .replace("TEAM", &format!("{prefix}team"))
}

lazy_static! {
    pub static ref TIMESTAMP_PREFIX: Regex =
        Regex::new(r"^L \d{2}/\d{2}/\d{4} - \d{2}:\d{2}:\d{2}: ").unwrap();

    pub static ref ROUND_START: Regex = Regex::new(r#"^World triggered "Round_Start"$"#).unwrap();

    pub static ref ROUND_END: Regex = Regex::new(r#"^World triggered "Round_End"$"#).unwrap();

    pub static ref BOMB_EXPLODED: Regex =
        Regex::new(r#"^World triggered "Bomb_Exploded"$"#).unwrap();

    pub static ref BOMB_TRIGGER: Regex = Regex::new(&format!(
        r#"^{} triggered "(?P<kind>Planted_The_Bomb|Defused_The_Bomb)"$"#,
        named(PLAYER, "")
    ))
    .unwrap();

    pub static ref KILL: Regex = Regex::new(&format!(
        r#"^{} \[(?P<x>-?\d+) (?P<y>-?\d+) (?P<z>-?\d+)\] killed {} \[(?P<v_x>-?\d+) (?P<v_y>-?\d+) (?P<v_z>-?\d+)\] with "(?P<weapon>[^"]+)"(?: \((?P<headshot>headshot)\))?$"#,
        named(PLAYER, ""),
        VPLAYER,
    ))
    .unwrap();

    pub static ref ASSIST: Regex = Regex::new(&format!(
        r#"^{} (?P<flash>flash-)?assisted killing {}$"#,
        named(PLAYER, ""),
        VPLAYER,
    ))
    .unwrap();

    pub static ref ATTACK: Regex = Regex::new(&format!(
        r#"^{} \[(?P<x>-?\d+) (?P<y>-?\d+) (?P<z>-?\d+)\] attacked {} \[(?P<v_x>-?\d+) (?P<v_y>-?\d+) (?P<v_z>-?\d+)\] with "(?P<weapon>[^"]+)" \(damage "(?P<damage>-?\d+)"\) \(damage_armor "(?P<armor_damage>-?\d+)"\) \(health "(?P<health>-?\d+)"\) \(armor "(?P<armor>-?\d+)"\) \(hitgroup "(?P<hitgroup>[^"]+)"\)$"#,
        named(PLAYER, ""),
        VPLAYER,
    ))
    .unwrap();

    pub static ref GAME_OVER: Regex = Regex::new(
        r#"^Game Over: (?P<mode>\S+) mg_active (?P<map>\S+) score (?P<s1>\d+):(?P<s2>\d+) after (?P<duration>\d+) min$"#
    )
    .unwrap();

    pub static ref ACCOLADE: Regex = Regex::new(
        r#"^ACCOLADE, FINAL: \{(?P<type>[^}]+)\},\s*(?P<name>.+?)<(?P<idx>\d+)>,\s*VALUE:\s*(?P<value>-?[\d.]+),\s*POS:\s*(?P<pos>\d+),\s*SCORE:\s*(?P<score>-?[\d.]+)$"#
    )
    .unwrap();
}

pub fn strip_timestamp(log: &str) -> &str {
    match TIMESTAMP_PREFIX.find(log) {
        Some(m) => &log[m.end()..],
        None => log,
    }
}

fn parse_player(captures: &regex::Captures, prefix: &str) -> Option<PlayerRef> {
    let name = captures.name(&format!("{prefix}name"))?.as_str().to_string();
    let user_id = captures
        .name(&format!("{prefix}uid"))?
        .as_str()
        .parse()
        .ok()?;
    let steam_token = captures.name(&format!("{prefix}steam"))?.as_str();
    let steam_id = if steam_token == "BOT" {
        None
    } else {
        Some(steam_token.to_string())
    };
    let team = Team::from_log_token(captures.name(&format!("{prefix}team"))?.as_str())?;

    Some(PlayerRef {
        name,
        user_id,
        steam_id,
        team,
    })
}

pub fn parse_actor(captures: &regex::Captures) -> Option<PlayerRef> {
    parse_player(captures, "")
}

pub fn parse_victim(captures: &regex::Captures) -> Option<PlayerRef> {
    parse_player(captures, "v_")
}

/// Parses an inline coordinate triple. A coordinate that fails to parse as
/// an integer is logged and treated as absent rather than failing the whole
/// line, per the event's own tolerance for partial data.
pub fn parse_coords(captures: &regex::Captures, prefix: &str) -> Option<Coords> {
    let x = captures.name(&format!("{prefix}x"))?.as_str().parse().ok();
    let y = captures.name(&format!("{prefix}y"))?.as_str().parse().ok();
    let z = captures.name(&format!("{prefix}z"))?.as_str().parse().ok();

    match (x, y, z) {
        (Some(x), Some(y), Some(z)) => Some(Coords { x, y, z }),
        _ => {
            log::warn!("coordinate triple with prefix '{prefix}' failed to parse, recording as absent");
            None
        }
    }
}
