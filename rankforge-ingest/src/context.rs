//! The mutable, single-match scratchpad the event processor writes into
//! and the commit coordinator drains. Exactly one match is ever in flight
//! per file (spec §5's single-thread-per-file scheduling), so unlike the
//! persisted schema this context never needs a real `game_id` — it just
//! accumulates everything belonging to "the current match" and hands it
//! all to the coordinator at once.

use chrono::NaiveDateTime;
use hashbrown::HashMap;
use rankforge_db::models::NewGameEvent;

#[derive(Debug, Clone)]
pub struct PendingGame {
    pub map: String,
    pub mode: String,
    pub team1_score: i32,
    pub team2_score: i32,
    pub duration_minutes: Option<i32>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: NaiveDateTime,
}

/// A `NewGameEvent` not yet bound to real ids: `game_id` is a placeholder
/// and `round_start_event_id` is unset until the coordinator has inserted
/// this match's round starts and knows their assigned ids.
pub struct StagedEvent {
    pub round_number: Option<i32>,
    pub event: NewGameEvent,
}

#[derive(Debug, Clone)]
pub struct PendingAccolade {
    pub accolade_type: String,
    pub player_name: String,
    pub value: f64,
    pub position: i32,
    pub score: f64,
}

pub struct EventProcessingContext {
    pub current_game: Option<PendingGame>,
    pub current_round_number: Option<i32>,
    next_round_number: i32,
    next_event_index: i32,
    pub round_starts: Vec<StagedEvent>,
    pub pending_events: Vec<StagedEvent>,
    pub pending_accolades: Vec<PendingAccolade>,
    pub name_to_steam_id: HashMap<String, String>,
}

impl EventProcessingContext {
    pub fn new() -> Self {
        EventProcessingContext {
            current_game: None,
            current_round_number: None,
            next_round_number: 1,
            next_event_index: 0,
            round_starts: Vec::new(),
            pending_events: Vec::new(),
            pending_accolades: Vec::new(),
            name_to_steam_id: HashMap::new(),
        }
    }

    /// Called on commit and on any fatal mid-match error; this context's
    /// lifetime is exactly one match.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn take_next_round_number(&mut self) -> i32 {
        let round_number = self.next_round_number;
        self.next_round_number += 1;
        round_number
    }

    /// Source-file order within this match, assigned to every staged event
    /// (round starts included) as it's built, so rows that share a
    /// timestamp still sort correctly.
    pub fn take_next_event_index(&mut self) -> i32 {
        let index = self.next_event_index;
        self.next_event_index += 1;
        index
    }

    pub fn record_name(&mut self, name: &str, steam_id: Option<&str>) {
        if let Some(steam_id) = steam_id {
            self.name_to_steam_id
                .insert(name.to_string(), steam_id.to_string());
        }
    }
}

impl Default for EventProcessingContext {
    fn default() -> Self {
        Self::new()
    }
}
