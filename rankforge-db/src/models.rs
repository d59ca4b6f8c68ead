//! Diesel row types. Each persisted entity gets a `New*` (insertable) and a
//! `Db*` (queryable) struct, mirroring the teacher's `NewGame`/`DbGame` split.

use chrono::NaiveDateTime;
use diesel::prelude::*;

/// Discriminator for `game_events.event_type`. Replaces single-table
/// inheritance: every event kind lives in one table, tagged by this column,
/// with per-kind fields stored nullable on the same row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i16)]
pub enum GameEventKind {
    RoundStart = 0,
    RoundEnd = 1,
    Kill = 2,
    Assist = 3,
    Attack = 4,
    Bomb = 5,
}

impl GameEventKind {
    pub fn as_i16(self) -> i16 {
        self as i16
    }
}

impl TryFrom<i16> for GameEventKind {
    type Error = i16;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(GameEventKind::RoundStart),
            1 => Ok(GameEventKind::RoundEnd),
            2 => Ok(GameEventKind::Kill),
            3 => Ok(GameEventKind::Assist),
            4 => Ok(GameEventKind::Attack),
            5 => Ok(GameEventKind::Bomb),
            other => Err(other),
        }
    }
}

/// Tag for `game_events.assist_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
pub enum AssistKind {
    Regular = 0,
    Flash = 1,
}

impl AssistKind {
    pub fn as_i16(self) -> i16 {
        self as i16
    }
}

impl TryFrom<i16> for AssistKind {
    type Error = i16;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AssistKind::Regular),
            1 => Ok(AssistKind::Flash),
            other => Err(other),
        }
    }
}

/// Tag for `game_events.bomb_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
pub enum BombKind {
    Plant = 0,
    Defuse = 1,
    Explode = 2,
}

impl BombKind {
    pub fn as_i16(self) -> i16 {
        self as i16
    }
}

impl TryFrom<i16> for BombKind {
    type Error = i16;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(BombKind::Plant),
            1 => Ok(BombKind::Defuse),
            2 => Ok(BombKind::Explode),
            other => Err(other),
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::games)]
pub struct NewGame {
    pub map: String,
    pub mode: String,
    pub team1_score: i32,
    pub team2_score: i32,
    pub duration_minutes: Option<i32>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::games)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbGame {
    pub id: i64,
    pub map: String,
    pub mode: String,
    pub team1_score: i32,
    pub team2_score: i32,
    pub duration_minutes: Option<i32>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: NaiveDateTime,
}

#[derive(Debug, Clone, Default, Insertable)]
#[diesel(table_name = crate::schema::game_events)]
#[diesel(treat_none_as_default_value = false)]
pub struct NewGameEvent {
    pub game_id: i64,
    pub round_start_event_id: Option<i64>,
    pub event_type: i16,
    pub event_index: i32,
    pub timestamp: NaiveDateTime,
    pub round_number: Option<i32>,
    pub surviving_players: Option<serde_json::Value>,
    pub killer_steam_id: Option<String>,
    pub killer_name: Option<String>,
    pub victim_steam_id: Option<String>,
    pub victim_name: Option<String>,
    pub weapon: Option<String>,
    pub is_headshot: Option<bool>,
    pub pos_x: Option<i32>,
    pub pos_y: Option<i32>,
    pub pos_z: Option<i32>,
    pub assister_steam_id: Option<String>,
    pub assister_name: Option<String>,
    pub assist_type: Option<i16>,
    pub attacker_steam_id: Option<String>,
    pub attacker_name: Option<String>,
    pub damage: Option<f32>,
    pub armor_damage: Option<f32>,
    pub hit_group: Option<String>,
    pub health_remaining: Option<i32>,
    pub bomb_player_steam_id: Option<String>,
    pub bomb_player_name: Option<String>,
    pub bomb_type: Option<i16>,
    pub bomb_time_remaining: Option<f32>,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::game_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbGameEvent {
    pub id: i64,
    pub game_id: i64,
    pub round_start_event_id: Option<i64>,
    pub event_type: i16,
    pub event_index: i32,
    pub timestamp: NaiveDateTime,
    pub round_number: Option<i32>,
    pub surviving_players: Option<serde_json::Value>,
    pub killer_steam_id: Option<String>,
    pub killer_name: Option<String>,
    pub victim_steam_id: Option<String>,
    pub victim_name: Option<String>,
    pub weapon: Option<String>,
    pub is_headshot: Option<bool>,
    pub pos_x: Option<i32>,
    pub pos_y: Option<i32>,
    pub pos_z: Option<i32>,
    pub assister_steam_id: Option<String>,
    pub assister_name: Option<String>,
    pub assist_type: Option<i16>,
    pub attacker_steam_id: Option<String>,
    pub attacker_name: Option<String>,
    pub damage: Option<f32>,
    pub armor_damage: Option<f32>,
    pub hit_group: Option<String>,
    pub health_remaining: Option<i32>,
    pub bomb_player_steam_id: Option<String>,
    pub bomb_player_name: Option<String>,
    pub bomb_type: Option<i16>,
    pub bomb_time_remaining: Option<f32>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::accolades)]
pub struct NewAccolade {
    pub game_id: i64,
    pub accolade_type: String,
    pub player_name: String,
    pub steam_id: Option<String>,
    pub value: f64,
    pub position: i32,
    pub score: f64,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::accolades)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbAccolade {
    pub id: i64,
    pub game_id: i64,
    pub accolade_type: String,
    pub player_name: String,
    pub steam_id: Option<String>,
    pub value: f64,
    pub position: i32,
    pub score: f64,
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::player_stats)]
pub struct NewPlayerStats {
    pub steam_id: String,
    pub name: String,
    pub kills: i64,
    pub deaths: i64,
    pub assists: i64,
    pub hs_kills: i64,
    pub rounds_played: i64,
    pub games_played: i64,
    pub damage: f64,
    pub rank: f64,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::player_stats)]
#[diesel(primary_key(steam_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbPlayerStats {
    pub steam_id: String,
    pub name: String,
    pub kills: i64,
    pub deaths: i64,
    pub assists: i64,
    pub hs_kills: i64,
    pub rounds_played: i64,
    pub games_played: i64,
    pub damage: f64,
    pub rank: f64,
}

impl DbPlayerStats {
    pub fn initial(steam_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            steam_id: steam_id.into(),
            name: name.into(),
            kills: 0,
            deaths: 0,
            assists: 0,
            hs_kills: 0,
            rounds_played: 0,
            games_played: 0,
            damage: 0.0,
            rank: 1000.0,
        }
    }
}
