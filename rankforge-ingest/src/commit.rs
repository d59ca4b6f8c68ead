//! The commit coordinator: the mandatory flush order from spec §4.4,
//! explicit two-phase id patching in place of the framework-managed
//! cascade-persist the original relied on. Assign parent ids, then patch
//! the children that reference them, then batch-insert, then run the
//! rating engine over this match's kills before clearing the context.

use std::collections::HashMap;

use log::warn;
use rankforge_db::models::{DbPlayerStats, GameEventKind, NewAccolade, NewGame, NewPlayerStats};
use thiserror::Error;

use crate::context::EventProcessingContext;
use crate::rating::{self, RatingConfig};
use crate::storage::{StorageDriver, Transaction};

#[derive(Debug, Error)]
pub enum CommitError<E: std::error::Error + Send + Sync + 'static> {
    #[error("GameProcessed arrived with no GameOver in context")]
    MissingGame,
    #[error(transparent)]
    Storage(#[from] E),
}

/// Runs the whole flush described by spec §4.4 inside one storage
/// transaction, then clears `ctx` for the next match. On any error the
/// transaction is rolled back and nothing from this match is committed.
pub fn commit_match<D: StorageDriver>(
    driver: &mut D,
    ctx: &mut EventProcessingContext,
    rating_config: &RatingConfig,
) -> Result<(), CommitError<D::Error>> {
    let game = ctx.current_game.take().ok_or(CommitError::MissingGame)?;

    let round_starts = std::mem::take(&mut ctx.round_starts);
    let mut pending_events = std::mem::take(&mut ctx.pending_events);
    let pending_accolades = std::mem::take(&mut ctx.pending_accolades);
    let name_to_steam_id = std::mem::take(&mut ctx.name_to_steam_id);

    let new_game = NewGame {
        map: game.map,
        mode: game.mode,
        team1_score: game.team1_score,
        team2_score: game.team2_score,
        duration_minutes: game.duration_minutes,
        start_time: game.start_time,
        end_time: game.end_time,
    };

    let rounds_this_match = round_starts.len() as i64;
    let steam_id_to_name: HashMap<&String, &String> =
        name_to_steam_id.iter().map(|(name, id)| (id, name)).collect();
    let touched_steam_ids: Vec<String> = name_to_steam_id.values().cloned().collect();

    let result: Result<(), D::Error> = driver.with_transaction(&mut |tx| {
        let game_id = tx.insert_game(&new_game)?;

        let round_start_rows: Vec<_> = round_starts
            .iter()
            .map(|staged| {
                let mut event = staged.event.clone();
                event.game_id = game_id;
                event
            })
            .collect();
        let round_start_ids = tx.insert_events(&round_start_rows)?;

        for staged in pending_events.iter_mut() {
            staged.event.game_id = game_id;
            if let Some(round_number) = staged.round_number {
                if let Some(id) = round_start_ids.get((round_number - 1) as usize) {
                    staged.event.round_start_event_id = Some(*id);
                }
            }
        }
        let other_events: Vec<_> = pending_events.iter().map(|s| s.event.clone()).collect();
        tx.insert_events(&other_events)?;

        let new_accolades: Vec<NewAccolade> = pending_accolades
            .iter()
            .map(|accolade| {
                let steam_id = name_to_steam_id.get(&accolade.player_name).cloned();
                if steam_id.is_none() {
                    warn!(
                        "accolade for '{}' has no resolvable steam id, persisting without one",
                        accolade.player_name
                    );
                }
                NewAccolade {
                    game_id,
                    accolade_type: accolade.accolade_type.clone(),
                    player_name: accolade.player_name.clone(),
                    steam_id,
                    value: accolade.value,
                    position: accolade.position,
                    score: accolade.score,
                }
            })
            .collect();
        tx.insert_accolades(&new_accolades)?;

        update_player_stats(
            tx,
            &touched_steam_ids,
            &steam_id_to_name,
            &pending_events,
            rounds_this_match,
            rating_config,
        )?;

        Ok(())
    });

    result?;
    ctx.reset();
    Ok(())
}

/// Loads (and locks) every touched player's row, folds in this match's
/// deltas plus the sequential Elo updates from its kills, and writes the
/// results back. BOT steam-ids are never in `touched_steam_ids` since
/// `record_name` only records players with a known steam id.
fn update_player_stats<T: Transaction + ?Sized>(
    tx: &mut T,
    touched_steam_ids: &[String],
    steam_id_to_name: &HashMap<&String, &String>,
    pending_events: &[crate::context::StagedEvent],
    rounds_this_match: i64,
    rating_config: &RatingConfig,
) -> Result<(), T::Error> {
    let mut stats: HashMap<&str, DbPlayerStats> = HashMap::new();
    for steam_id in touched_steam_ids {
        let name = steam_id_to_name
            .get(steam_id)
            .map(|n| n.as_str())
            .unwrap_or("unknown");
        let row = tx
            .lock_player_stats(steam_id)?
            .unwrap_or_else(|| DbPlayerStats::initial(steam_id.clone(), name));
        stats.insert(steam_id.as_str(), row);
    }

    for staged in pending_events {
        let event = &staged.event;
        match GameEventKind::try_from(event.event_type) {
            Ok(GameEventKind::Kill) => {
                if let Some(killer) = event.killer_steam_id.as_deref() {
                    if let Some(row) = stats.get_mut(killer) {
                        row.kills += 1;
                        if event.is_headshot == Some(true) {
                            row.hs_kills += 1;
                        }
                    }
                }
                if let Some(victim) = event.victim_steam_id.as_deref() {
                    if let Some(row) = stats.get_mut(victim) {
                        row.deaths += 1;
                    }
                }
            }
            Ok(GameEventKind::Assist) => {
                if let Some(assister) = event.assister_steam_id.as_deref() {
                    if let Some(row) = stats.get_mut(assister) {
                        row.assists += 1;
                    }
                }
            }
            Ok(GameEventKind::Attack) => {
                if let Some(attacker) = event.attacker_steam_id.as_deref() {
                    if let Some(row) = stats.get_mut(attacker) {
                        row.damage += event.damage.unwrap_or(0.0) as f64;
                    }
                }
            }
            _ => {}
        }
    }

    // Elo rank: sequential over kill events in emitted order, per spec §4.5.
    for staged in pending_events {
        let event = &staged.event;
        if event.event_type != GameEventKind::Kill.as_i16() {
            continue;
        }
        let (Some(killer), Some(victim)) = (
            event.killer_steam_id.as_deref(),
            event.victim_steam_id.as_deref(),
        ) else {
            continue;
        };
        let killer_rank = stats
            .get(killer)
            .map(|r| r.rank)
            .unwrap_or(rating_config.initial_rank);
        let victim_rank = stats
            .get(victim)
            .map(|r| r.rank)
            .unwrap_or(rating_config.initial_rank);
        let (new_killer_rank, new_victim_rank) = rating::apply_kill(
            killer_rank,
            victim_rank,
            event.is_headshot == Some(true),
            rating_config,
        );
        if let Some(row) = stats.get_mut(killer) {
            row.rank = new_killer_rank;
        }
        if let Some(row) = stats.get_mut(victim) {
            row.rank = new_victim_rank;
        }
    }

    for steam_id in touched_steam_ids {
        let Some(row) = stats.get(steam_id.as_str()) else {
            continue;
        };
        let updated = NewPlayerStats {
            steam_id: row.steam_id.clone(),
            name: row.name.clone(),
            kills: row.kills,
            deaths: row.deaths,
            assists: row.assists,
            hs_kills: row.hs_kills,
            rounds_played: row.rounds_played + rounds_this_match,
            games_played: row.games_played + 1,
            damage: row.damage,
            rank: row.rank,
        };
        tx.save_player_stats(&updated)?;
    }

    Ok(())
}
