//! Storage primitives consumed by the commit coordinator and rating engine.
//!
//! Grounded in `mmoldb-db/src/db/mod.rs::insert_games`: insert the parent,
//! obtain its assigned id via `RETURNING`, then batch-insert children that
//! reference it. The two-phase id-patching itself (assign ids, then patch
//! child foreign keys) stays in the core (`rankforge-ingest::commit`) per
//! the spec's design notes — this module only ever inserts rows it is
//! handed, it never decides ordering.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::PgConnection;

use crate::models::{DbPlayerStats, NewAccolade, NewGame, NewGameEvent, NewPlayerStats};
use crate::schema::{accolades, game_events, games, player_stats};

pub type QueryResult<T> = Result<T, diesel::result::Error>;

/// Runs `f` inside one transaction; any `Err` rolls the whole batch back,
/// matching `diesel::Connection::transaction`'s automatic-rollback-on-error
/// semantics used throughout the teacher's `db/mod.rs`.
pub fn with_transaction<T>(
    conn: &mut PgConnection,
    f: impl FnOnce(&mut PgConnection) -> QueryResult<T>,
) -> QueryResult<T> {
    conn.transaction(f)
}

pub fn insert_game(conn: &mut PgConnection, game: &NewGame) -> QueryResult<i64> {
    diesel::insert_into(games::table)
        .values(game)
        .returning(games::id)
        .get_result(conn)
}

/// Batch-inserts events in the given order and returns their assigned ids
/// in the same order, so the caller can map local indices to database ids.
pub fn insert_game_events(
    conn: &mut PgConnection,
    events: &[NewGameEvent],
) -> QueryResult<Vec<i64>> {
    if events.is_empty() {
        return Ok(Vec::new());
    }

    diesel::insert_into(game_events::table)
        .values(events)
        .returning(game_events::id)
        .get_results(conn)
}

pub fn insert_accolades(conn: &mut PgConnection, accolades_: &[NewAccolade]) -> QueryResult<usize> {
    if accolades_.is_empty() {
        return Ok(0);
    }

    diesel::insert_into(accolades::table)
        .values(accolades_)
        .execute(conn)
}

/// Admission filter's duplicate check (`spec.md` §4.1): has a `GameOver`
/// been committed with this exact timestamp already? `GameOver` rows are
/// stored as `games.end_time`, since `GameOver` carries no fields beyond
/// what already lives on the game row.
pub fn find_committed_game_by_end_time(
    conn: &mut PgConnection,
    end_time: NaiveDateTime,
) -> QueryResult<bool> {
    use crate::schema::games::dsl;

    diesel::select(diesel::dsl::exists(
        dsl::games.filter(dsl::end_time.eq(end_time)),
    ))
    .get_result(conn)
}

/// Reads the current stats row for `steam_id` with a row lock held for the
/// rest of the surrounding transaction, giving the rating engine's
/// read-modify-write the serialization `spec.md` §5 calls for without a
/// separate locking primitive.
pub fn lock_player_stats(
    conn: &mut PgConnection,
    steam_id: &str,
) -> QueryResult<Option<DbPlayerStats>> {
    use crate::schema::player_stats::dsl;

    dsl::player_stats
        .filter(dsl::steam_id.eq(steam_id))
        .select(DbPlayerStats::as_select())
        .for_update()
        .first(conn)
        .optional()
}

pub fn save_player_stats(conn: &mut PgConnection, stats: &NewPlayerStats) -> QueryResult<()> {
    use crate::schema::player_stats::dsl;

    diesel::insert_into(player_stats::table)
        .values(stats)
        .on_conflict(dsl::steam_id)
        .do_update()
        .set(stats)
        .execute(conn)?;

    Ok(())
}
