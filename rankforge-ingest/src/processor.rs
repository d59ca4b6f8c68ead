//! Dispatches one parsed event at a time into the match context. Replaces
//! the visitor-pattern double dispatch a class-hierarchy design would use
//! with a single match over the event's variant.

use rankforge_db::models::{AssistKind as DbAssistKind, BombKind as DbBombKind, GameEventKind, NewGameEvent};
use rankforge_parser::{AssistKind, BombKind, ParsedEvent, PlayerRef};

use crate::context::{EventProcessingContext, PendingAccolade, PendingGame, StagedEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Continue,
    ReadyToCommit,
}

fn base_event(
    ctx: &mut EventProcessingContext,
    kind: GameEventKind,
    round_number: Option<i32>,
    timestamp: chrono::DateTime<chrono::Utc>,
) -> NewGameEvent {
    NewGameEvent {
        game_id: 0,
        round_start_event_id: None,
        event_type: kind.as_i16(),
        event_index: ctx.take_next_event_index(),
        timestamp: timestamp.naive_utc(),
        round_number,
        ..Default::default()
    }
}

fn record_player(ctx: &mut EventProcessingContext, player: &PlayerRef) {
    ctx.record_name(&player.name, player.steam_id.as_deref());
}

pub fn process_event(ctx: &mut EventProcessingContext, event: ParsedEvent) -> ProcessOutcome {
    match event {
        ParsedEvent::GameOver {
            timestamp,
            mode,
            map,
            team1_score,
            team2_score,
            duration_minutes,
        } => {
            let start_time = duration_minutes
                .map(|minutes| timestamp.naive_utc() - chrono::Duration::seconds(minutes as i64 * 60));
            ctx.current_game = Some(PendingGame {
                map,
                mode,
                team1_score,
                team2_score,
                duration_minutes,
                start_time,
                end_time: timestamp.naive_utc(),
            });
            ProcessOutcome::Continue
        }

        ParsedEvent::RoundStart { timestamp } => {
            let round_number = ctx.take_next_round_number();
            ctx.current_round_number = Some(round_number);
            let event = base_event(ctx, GameEventKind::RoundStart, Some(round_number), timestamp);
            ctx.round_starts.push(StagedEvent {
                round_number: Some(round_number),
                event,
            });
            ProcessOutcome::Continue
        }

        ParsedEvent::Kill {
            timestamp,
            killer,
            victim,
            weapon,
            is_headshot,
            killer_coords,
            victim_coords,
        } => {
            record_player(ctx, &killer);
            record_player(ctx, &victim);
            let round_number = ctx.current_round_number;
            let mut event = base_event(ctx, GameEventKind::Kill, round_number, timestamp);
            event.killer_steam_id = killer.steam_id.clone();
            event.killer_name = Some(killer.name.clone());
            event.victim_steam_id = victim.steam_id.clone();
            event.victim_name = Some(victim.name.clone());
            event.weapon = Some(weapon);
            event.is_headshot = Some(is_headshot);
            if let Some(c) = killer_coords {
                event.pos_x = Some(c.x);
                event.pos_y = Some(c.y);
                event.pos_z = Some(c.z);
            }
            let _ = victim_coords; // game_events only carries the acting player's position
            ctx.pending_events.push(StagedEvent {
                round_number: ctx.current_round_number,
                event,
            });
            ProcessOutcome::Continue
        }

        ParsedEvent::Assist {
            timestamp,
            assister,
            victim,
            kind,
        } => {
            record_player(ctx, &assister);
            record_player(ctx, &victim);
            let round_number = ctx.current_round_number;
            let mut event = base_event(ctx, GameEventKind::Assist, round_number, timestamp);
            event.assister_steam_id = assister.steam_id.clone();
            event.assister_name = Some(assister.name.clone());
            event.victim_steam_id = victim.steam_id.clone();
            event.victim_name = Some(victim.name.clone());
            event.assist_type = Some(match kind {
                AssistKind::Regular => DbAssistKind::Regular.as_i16(),
                AssistKind::Flash => DbAssistKind::Flash.as_i16(),
            });
            ctx.pending_events.push(StagedEvent {
                round_number: ctx.current_round_number,
                event,
            });
            ProcessOutcome::Continue
        }

        ParsedEvent::Attack {
            timestamp,
            attacker,
            victim,
            weapon,
            damage,
            armor_damage,
            health_remaining,
            armor_remaining: _,
            hit_group,
            attacker_coords,
            victim_coords,
        } => {
            record_player(ctx, &attacker);
            record_player(ctx, &victim);
            let round_number = ctx.current_round_number;
            let mut event = base_event(ctx, GameEventKind::Attack, round_number, timestamp);
            event.attacker_steam_id = attacker.steam_id.clone();
            event.attacker_name = Some(attacker.name.clone());
            event.victim_steam_id = victim.steam_id.clone();
            event.victim_name = Some(victim.name.clone());
            event.weapon = Some(weapon);
            event.damage = Some(damage as f32);
            event.armor_damage = Some(armor_damage as f32);
            event.health_remaining = Some(health_remaining);
            event.hit_group = Some(hit_group);
            if let Some(c) = attacker_coords {
                event.pos_x = Some(c.x);
                event.pos_y = Some(c.y);
                event.pos_z = Some(c.z);
            }
            let _ = victim_coords; // game_events only carries the acting player's position
            ctx.pending_events.push(StagedEvent {
                round_number: ctx.current_round_number,
                event,
            });
            ProcessOutcome::Continue
        }

        ParsedEvent::Bomb {
            timestamp,
            player,
            kind,
            time_remaining,
        } => {
            if let Some(player) = &player {
                record_player(ctx, player);
            }
            let round_number = ctx.current_round_number;
            let mut event = base_event(ctx, GameEventKind::Bomb, round_number, timestamp);
            event.bomb_player_steam_id = player.as_ref().and_then(|p| p.steam_id.clone());
            event.bomb_player_name = player.as_ref().map(|p| p.name.clone());
            event.bomb_type = Some(match kind {
                BombKind::Plant => DbBombKind::Plant.as_i16(),
                BombKind::Defuse => DbBombKind::Defuse.as_i16(),
                BombKind::Explode => DbBombKind::Explode.as_i16(),
            });
            event.bomb_time_remaining = time_remaining.map(|t| t as f32);
            ctx.pending_events.push(StagedEvent {
                round_number: ctx.current_round_number,
                event,
            });
            ProcessOutcome::Continue
        }

        ParsedEvent::RoundEnd {
            timestamp,
            surviving_players,
        } => {
            let round_number = ctx.current_round_number;
            let mut event = base_event(ctx, GameEventKind::RoundEnd, round_number, timestamp);
            event.surviving_players = Some(serde_json::json!(surviving_players));
            ctx.pending_events.push(StagedEvent {
                round_number: ctx.current_round_number,
                event,
            });
            ctx.current_round_number = None;
            ProcessOutcome::Continue
        }

        ParsedEvent::Accolade {
            player_name,
            accolade_type,
            value,
            position,
            score,
            ..
        } => {
            ctx.pending_accolades.push(PendingAccolade {
                accolade_type,
                player_name,
                value,
                position,
                score,
            });
            ProcessOutcome::Continue
        }

        ParsedEvent::GameProcessed { .. } => ProcessOutcome::ReadyToCommit,
    }
}
