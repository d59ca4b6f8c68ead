//! The narrow interface the commit coordinator and rating engine require
//! from their collaborator. Neither module ever touches `PgConnection`
//! directly; they only see `&mut dyn Transaction`, so the same coordinator
//! code drives a real Postgres database in production and an in-memory
//! double in tests.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::PgConnection;
use rankforge_db::models::{DbAccolade, DbGame, DbGameEvent, DbPlayerStats, NewAccolade, NewGame, NewGameEvent, NewPlayerStats};

pub trait Transaction {
    type Error: std::error::Error + Send + Sync + 'static;

    fn insert_game(&mut self, game: &NewGame) -> Result<i64, Self::Error>;
    /// Inserts events in the given order, returning their assigned ids in
    /// the same order.
    fn insert_events(&mut self, events: &[NewGameEvent]) -> Result<Vec<i64>, Self::Error>;
    fn insert_accolades(&mut self, accolades: &[NewAccolade]) -> Result<(), Self::Error>;
    fn lock_player_stats(&mut self, steam_id: &str) -> Result<Option<DbPlayerStats>, Self::Error>;
    fn save_player_stats(&mut self, stats: &NewPlayerStats) -> Result<(), Self::Error>;
}

pub trait StorageDriver {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Admission filter's duplicate check (spec §4.1): has a `GameOver`
    /// already been committed with this exact timestamp?
    fn is_game_over_committed(&mut self, end_time: NaiveDateTime) -> Result<bool, Self::Error>;

    /// Runs `f` inside one storage transaction. Any `Err` returned from `f`
    /// rolls everything `f` did back; nothing it wrote becomes visible.
    fn with_transaction(
        &mut self,
        f: &mut dyn FnMut(&mut dyn Transaction<Error = Self::Error>) -> Result<(), Self::Error>,
    ) -> Result<(), Self::Error>;
}

pub struct PgTransaction<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> Transaction for PgTransaction<'a> {
    type Error = diesel::result::Error;

    fn insert_game(&mut self, game: &NewGame) -> Result<i64, Self::Error> {
        rankforge_db::db::insert_game(self.conn, game)
    }

    fn insert_events(&mut self, events: &[NewGameEvent]) -> Result<Vec<i64>, Self::Error> {
        rankforge_db::db::insert_game_events(self.conn, events)
    }

    fn insert_accolades(&mut self, accolades: &[NewAccolade]) -> Result<(), Self::Error> {
        rankforge_db::db::insert_accolades(self.conn, accolades).map(|_| ())
    }

    fn lock_player_stats(&mut self, steam_id: &str) -> Result<Option<DbPlayerStats>, Self::Error> {
        rankforge_db::db::lock_player_stats(self.conn, steam_id)
    }

    fn save_player_stats(&mut self, stats: &NewPlayerStats) -> Result<(), Self::Error> {
        rankforge_db::db::save_player_stats(self.conn, stats)
    }
}

/// One pooled connection per ingest worker thread (spec §5's concurrency
/// model); the pool itself is shared across threads.
pub struct PgStorageDriver {
    conn: PooledConnection<ConnectionManager<PgConnection>>,
}

impl PgStorageDriver {
    pub fn new(conn: PooledConnection<ConnectionManager<PgConnection>>) -> Self {
        PgStorageDriver { conn }
    }
}

impl StorageDriver for PgStorageDriver {
    type Error = diesel::result::Error;

    fn is_game_over_committed(&mut self, end_time: NaiveDateTime) -> Result<bool, Self::Error> {
        rankforge_db::db::find_committed_game_by_end_time(&mut self.conn, end_time)
    }

    fn with_transaction(
        &mut self,
        f: &mut dyn FnMut(&mut dyn Transaction<Error = Self::Error>) -> Result<(), Self::Error>,
    ) -> Result<(), Self::Error> {
        rankforge_db::db::with_transaction(&mut self.conn, |conn| {
            let mut tx = PgTransaction { conn };
            f(&mut tx)
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("in-memory storage error: {0}")]
pub struct InMemoryError(pub String);

#[derive(Default, Clone)]
struct InMemoryStore {
    games: Vec<DbGame>,
    events: Vec<DbGameEvent>,
    accolades: Vec<DbAccolade>,
    player_stats: HashMap<String, DbPlayerStats>,
    committed_end_times: HashSet<NaiveDateTime>,
}

/// A fully in-process stand-in for the storage layer, used by the
/// integration tests so they can exercise the whole ingest pipeline
/// without a real Postgres instance.
#[derive(Default)]
pub struct InMemoryStorageDriver {
    store: InMemoryStore,
}

impl InMemoryStorageDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn games(&self) -> &[DbGame] {
        &self.store.games
    }

    pub fn events(&self) -> &[DbGameEvent] {
        &self.store.events
    }

    pub fn accolades(&self) -> &[DbAccolade] {
        &self.store.accolades
    }

    pub fn player_stats(&self, steam_id: &str) -> Option<&DbPlayerStats> {
        self.store.player_stats.get(steam_id)
    }
}

struct InMemoryTransaction<'a> {
    store: &'a mut InMemoryStore,
}

impl<'a> Transaction for InMemoryTransaction<'a> {
    type Error = InMemoryError;

    fn insert_game(&mut self, game: &NewGame) -> Result<i64, Self::Error> {
        let id = self.store.games.len() as i64 + 1;
        self.store.games.push(DbGame {
            id,
            map: game.map.clone(),
            mode: game.mode.clone(),
            team1_score: game.team1_score,
            team2_score: game.team2_score,
            duration_minutes: game.duration_minutes,
            start_time: game.start_time,
            end_time: game.end_time,
        });
        self.store.committed_end_times.insert(game.end_time);
        Ok(id)
    }

    fn insert_events(&mut self, events: &[NewGameEvent]) -> Result<Vec<i64>, Self::Error> {
        let mut ids = Vec::with_capacity(events.len());
        for event in events {
            let id = self.store.events.len() as i64 + 1;
            self.store.events.push(DbGameEvent {
                id,
                game_id: event.game_id,
                round_start_event_id: event.round_start_event_id,
                event_type: event.event_type,
                event_index: event.event_index,
                timestamp: event.timestamp,
                round_number: event.round_number,
                surviving_players: event.surviving_players.clone(),
                killer_steam_id: event.killer_steam_id.clone(),
                killer_name: event.killer_name.clone(),
                victim_steam_id: event.victim_steam_id.clone(),
                victim_name: event.victim_name.clone(),
                weapon: event.weapon.clone(),
                is_headshot: event.is_headshot,
                pos_x: event.pos_x,
                pos_y: event.pos_y,
                pos_z: event.pos_z,
                assister_steam_id: event.assister_steam_id.clone(),
                assister_name: event.assister_name.clone(),
                assist_type: event.assist_type,
                attacker_steam_id: event.attacker_steam_id.clone(),
                attacker_name: event.attacker_name.clone(),
                damage: event.damage,
                armor_damage: event.armor_damage,
                hit_group: event.hit_group.clone(),
                health_remaining: event.health_remaining,
                bomb_player_steam_id: event.bomb_player_steam_id.clone(),
                bomb_player_name: event.bomb_player_name.clone(),
                bomb_type: event.bomb_type,
                bomb_time_remaining: event.bomb_time_remaining,
            });
            ids.push(id);
        }
        Ok(ids)
    }

    fn insert_accolades(&mut self, accolades: &[NewAccolade]) -> Result<(), Self::Error> {
        for accolade in accolades {
            let id = self.store.accolades.len() as i64 + 1;
            self.store.accolades.push(DbAccolade {
                id,
                game_id: accolade.game_id,
                accolade_type: accolade.accolade_type.clone(),
                player_name: accolade.player_name.clone(),
                steam_id: accolade.steam_id.clone(),
                value: accolade.value,
                position: accolade.position,
                score: accolade.score,
            });
        }
        Ok(())
    }

    fn lock_player_stats(&mut self, steam_id: &str) -> Result<Option<DbPlayerStats>, Self::Error> {
        Ok(self.store.player_stats.get(steam_id).cloned())
    }

    fn save_player_stats(&mut self, stats: &NewPlayerStats) -> Result<(), Self::Error> {
        self.store.player_stats.insert(
            stats.steam_id.clone(),
            DbPlayerStats {
                steam_id: stats.steam_id.clone(),
                name: stats.name.clone(),
                kills: stats.kills,
                deaths: stats.deaths,
                assists: stats.assists,
                hs_kills: stats.hs_kills,
                rounds_played: stats.rounds_played,
                games_played: stats.games_played,
                damage: stats.damage,
                rank: stats.rank,
            },
        );
        Ok(())
    }
}

impl StorageDriver for InMemoryStorageDriver {
    type Error = InMemoryError;

    fn is_game_over_committed(&mut self, end_time: NaiveDateTime) -> Result<bool, Self::Error> {
        Ok(self.store.committed_end_times.contains(&end_time))
    }

    fn with_transaction(
        &mut self,
        f: &mut dyn FnMut(&mut dyn Transaction<Error = Self::Error>) -> Result<(), Self::Error>,
    ) -> Result<(), Self::Error> {
        let snapshot = self.store.clone();
        let mut tx = InMemoryTransaction {
            store: &mut self.store,
        };
        match f(&mut tx) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.store = snapshot;
                Err(e)
            }
        }
    }
}
