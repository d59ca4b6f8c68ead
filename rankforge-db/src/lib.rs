mod schema;

pub mod db;
pub mod migrations;
pub mod models;
pub mod pool;

pub use db::QueryResult;
pub use diesel::{Connection, PgConnection};
pub use migrations::{run_migrations, MigrationError};
pub use pool::{get_pool, ConnectionPool};
