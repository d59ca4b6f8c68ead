//! The rewind-on-Game_Over parser. `Game_Over` lines appear after the
//! rounds they conclude, so a game's id can't be known until its last
//! line is reached; this state machine tracks round-start positions while
//! "idle", then on an admitted `Game_Over` rewinds the cursor back to the
//! first round of that match and replays forward, now able to bind every
//! event to a real game.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::error::ParseError;
use crate::event::{BombKind, ParsedEvent};
use crate::line_reader::LogLine;
use crate::patterns::{self, strip_timestamp};

/// What a single `step` call produced: either a bound-for-processing event
/// plus the index to resume from, or nothing, with the index to resume
/// from regardless.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Event(ParsedEvent, usize),
    Skip(usize),
}

pub struct Parser<'a> {
    lines: &'a [LogLine],
    round_start_indices: Vec<usize>,
    match_started: bool,
    match_end_index: usize,
    pending: VecDeque<(ParsedEvent, usize)>,
}

impl<'a> Parser<'a> {
    pub fn new(lines: &'a [LogLine]) -> Self {
        Parser {
            lines,
            round_start_indices: Vec::new(),
            match_started: false,
            match_end_index: 0,
            pending: VecDeque::new(),
        }
    }

    fn line_text(&self, index: usize) -> &'a str {
        strip_timestamp(&self.lines[index].log)
    }

    #[cfg(test)]
    pub(crate) fn force_replaying_for_test(&mut self) {
        self.match_started = true;
    }

    /// `is_already_committed` backs the admission filter's duplicate check;
    /// it is the parser's only window into the storage layer, kept narrow
    /// and passed in per call so this crate never holds a borrow of the
    /// caller's storage driver for longer than one step.
    pub fn step(
        &mut self,
        i: usize,
        is_already_committed: &mut dyn FnMut(DateTime<Utc>) -> bool,
    ) -> Result<StepOutcome, ParseError> {
        if let Some((event, next)) = self.pending.pop_front() {
            return Ok(StepOutcome::Event(event, next));
        }

        let timestamp = self.lines[i].time;
        let text = self.line_text(i);

        if self.match_started && i == self.match_end_index {
            self.match_started = false;
            self.match_end_index = 0;
            return Ok(StepOutcome::Event(ParsedEvent::GameProcessed { timestamp }, i + 1));
        }

        if patterns::ROUND_START.is_match(text) {
            let is_replaying = self.match_end_index > 0 && i < self.match_end_index;
            if self.match_started && self.round_start_indices.is_empty() && !is_replaying {
                self.match_started = false;
            }
            if !self.match_started {
                self.round_start_indices.push(i);
                return Ok(StepOutcome::Skip(i + 1));
            }
        }

        if patterns::GAME_OVER.is_match(text) {
            return self.handle_game_over(i, text, timestamp, is_already_committed);
        }

        if !self.match_started {
            return Ok(StepOutcome::Skip(i + 1));
        }

        self.dispatch(i, text, timestamp)
    }

    /// Indices of the contiguous block of `ACCOLADE` lines immediately
    /// preceding `i`, in chronological (ascending) order. Empty if `i-1`
    /// isn't part of such a block.
    fn accolade_block_before(&self, i: usize) -> Vec<usize> {
        let mut cursor = i;
        while cursor > 0 {
            cursor -= 1;
            if self.line_text(cursor).contains("ACCOLADE") {
                break;
            }
        }
        if cursor == 0 && !self.line_text(0).contains("ACCOLADE") {
            return Vec::new();
        }

        let mut indices = Vec::new();
        let mut k = cursor;
        loop {
            if !self.line_text(k).contains("ACCOLADE") {
                break;
            }
            indices.push(k);
            if k == 0 {
                break;
            }
            k -= 1;
        }
        indices.reverse();
        indices
    }

    fn parse_accolade_at(&self, index: usize, timestamp: DateTime<Utc>) -> Option<ParsedEvent> {
        let caps = patterns::ACCOLADE.captures(self.line_text(index))?;
        Some(ParsedEvent::Accolade {
            timestamp,
            accolade_type: caps.name("type")?.as_str().to_string(),
            player_name: caps.name("name")?.as_str().to_string(),
            session_index: caps.name("idx")?.as_str().parse().ok()?,
            value: caps.name("value")?.as_str().parse().ok()?,
            position: caps.name("pos")?.as_str().parse().ok()?,
            score: caps.name("score")?.as_str().parse().ok()?,
        })
    }

    fn handle_game_over(
        &mut self,
        i: usize,
        text: &str,
        timestamp: DateTime<Utc>,
        is_already_committed: &mut dyn FnMut(DateTime<Utc>) -> bool,
    ) -> Result<StepOutcome, ParseError> {
        let accolade_indices = self.accolade_block_before(i);

        let admitted = accolade_indices.len() >= 6 && !is_already_committed(timestamp);
        if !admitted {
            self.round_start_indices.clear();
            self.match_started = false;
            return Ok(StepOutcome::Skip(i + 1));
        }

        let caps = patterns::GAME_OVER.captures(text).expect("already matched");
        let mode = caps.name("mode").unwrap().as_str().to_string();
        let map = caps.name("map").unwrap().as_str().to_string();
        let team1_score: i32 = caps.name("s1").unwrap().as_str().parse().unwrap();
        let team2_score: i32 = caps.name("s2").unwrap().as_str().parse().unwrap();
        let duration_minutes: Option<i32> =
            caps.name("duration").and_then(|m| m.as_str().parse().ok());

        let total_rounds = team1_score + team2_score;
        if (self.round_start_indices.len() as i32) < total_rounds {
            return Err(ParseError::NoMatchingRoundStart(i));
        }

        let rewind_from = self.round_start_indices.len() - total_rounds as usize;
        let rewind_index = self.round_start_indices[rewind_from].saturating_sub(1);
        self.round_start_indices.clear();

        self.match_end_index = i;
        self.match_started = true;

        for accolade_index in &accolade_indices {
            if let Some(event) = self.parse_accolade_at(*accolade_index, timestamp) {
                self.pending.push_back((event, i));
            }
        }

        self.pending.push_back((
            ParsedEvent::GameOver {
                timestamp,
                mode,
                map,
                team1_score,
                team2_score,
                duration_minutes,
            },
            rewind_index,
        ));

        let (event, next) = self.pending.pop_front().expect("just pushed at least one");
        Ok(StepOutcome::Event(event, next))
    }

    fn dispatch(
        &mut self,
        i: usize,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<StepOutcome, ParseError> {
        if patterns::ROUND_START.is_match(text) {
            return Ok(StepOutcome::Event(ParsedEvent::RoundStart { timestamp }, i + 1));
        }

        if let Some(caps) = patterns::KILL.captures(text) {
            let killer = patterns::parse_actor(&caps).ok_or(ParseError::MalformedLine(i))?;
            let victim = patterns::parse_victim(&caps).ok_or(ParseError::MalformedLine(i))?;
            let event = ParsedEvent::Kill {
                timestamp,
                killer,
                victim,
                weapon: caps.name("weapon").unwrap().as_str().to_string(),
                is_headshot: caps.name("headshot").is_some(),
                killer_coords: patterns::parse_coords(&caps, ""),
                victim_coords: patterns::parse_coords(&caps, "v_"),
            };
            return Ok(StepOutcome::Event(event, i + 1));
        }

        if let Some(caps) = patterns::ASSIST.captures(text) {
            let assister = patterns::parse_actor(&caps).ok_or(ParseError::MalformedLine(i))?;
            let victim = patterns::parse_victim(&caps).ok_or(ParseError::MalformedLine(i))?;
            let kind = if caps.name("flash").is_some() {
                crate::event::AssistKind::Flash
            } else {
                crate::event::AssistKind::Regular
            };
            return Ok(StepOutcome::Event(
                ParsedEvent::Assist {
                    timestamp,
                    assister,
                    victim,
                    kind,
                },
                i + 1,
            ));
        }

        if let Some(caps) = patterns::ATTACK.captures(text) {
            let attacker = patterns::parse_actor(&caps).ok_or(ParseError::MalformedLine(i))?;
            let victim = patterns::parse_victim(&caps).ok_or(ParseError::MalformedLine(i))?;
            let event = ParsedEvent::Attack {
                timestamp,
                attacker,
                victim,
                weapon: caps.name("weapon").unwrap().as_str().to_string(),
                damage: caps.name("damage").unwrap().as_str().parse().unwrap_or(0),
                armor_damage: caps
                    .name("armor_damage")
                    .unwrap()
                    .as_str()
                    .parse()
                    .unwrap_or(0),
                health_remaining: caps.name("health").unwrap().as_str().parse().unwrap_or(0),
                armor_remaining: caps.name("armor").unwrap().as_str().parse().unwrap_or(0),
                hit_group: caps.name("hitgroup").unwrap().as_str().to_string(),
                attacker_coords: patterns::parse_coords(&caps, ""),
                victim_coords: patterns::parse_coords(&caps, "v_"),
            };
            return Ok(StepOutcome::Event(event, i + 1));
        }

        if let Some(caps) = patterns::BOMB_TRIGGER.captures(text) {
            let player = patterns::parse_actor(&caps).ok_or(ParseError::MalformedLine(i))?;
            let kind = match caps.name("kind").unwrap().as_str() {
                "Planted_The_Bomb" => BombKind::Plant,
                _ => BombKind::Defuse,
            };
            return Ok(StepOutcome::Event(
                ParsedEvent::Bomb {
                    timestamp,
                    player: Some(player),
                    kind,
                    time_remaining: None,
                },
                i + 1,
            ));
        }

        if patterns::BOMB_EXPLODED.is_match(text) {
            return Ok(StepOutcome::Event(
                ParsedEvent::Bomb {
                    timestamp,
                    player: None,
                    kind: BombKind::Explode,
                    time_remaining: None,
                },
                i + 1,
            ));
        }

        if patterns::ROUND_END.is_match(text) {
            let (event, next) = self.parse_round_end_compound(i, timestamp)?;
            return Ok(StepOutcome::Event(event, next));
        }

        Ok(StepOutcome::Skip(i + 1))
    }

    fn parse_round_end_compound(
        &self,
        i: usize,
        timestamp: DateTime<Utc>,
    ) -> Result<(ParsedEvent, usize), ParseError> {
        let mut j = i + 1;
        loop {
            if j >= self.lines.len() {
                return Err(ParseError::UnterminatedRoundEndBlock(i));
            }
            let text = self.line_text(j);
            if text.contains("ACCOLADE") {
                return Ok((
                    ParsedEvent::RoundEnd {
                        timestamp,
                        surviving_players: Vec::new(),
                    },
                    j,
                ));
            }
            if text.contains("JSON_BEGIN") {
                break;
            }
            j += 1;
        }

        let mut survivors = Vec::new();
        let mut cursor = j + 1 + 6;
        loop {
            if cursor >= self.lines.len() {
                return Err(ParseError::UnterminatedRoundEndBlock(i));
            }
            let text = self.line_text(cursor);
            if text.contains("JSON_END") {
                return Ok((
                    ParsedEvent::RoundEnd {
                        timestamp,
                        surviving_players: survivors,
                    },
                    cursor,
                ));
            }
            if text.contains("player_") {
                if let Some(last_colon) = text.rfind(':') {
                    let after = &text[last_colon + 1..];
                    let token = after
                        .split(',')
                        .next()
                        .unwrap_or("")
                        .trim()
                        .trim_matches('"');
                    if !token.is_empty() {
                        survivors.push(token.to_string());
                    }
                }
            }
            cursor += 1;
        }
    }
}
