use std::path::PathBuf;

use log::{error, info, warn};
use miette::IntoDiagnostic;
use rankforge_db::{get_pool, run_migrations};
use rankforge_ingest::config::IngestConfig;
use rankforge_ingest::rating::RatingConfig;
use rankforge_ingest::runner::ingest_file;
use rankforge_ingest::storage::PgStorageDriver;
use rayon::{ThreadPoolBuilder, ThreadPool};

fn main() -> miette::Result<()> {
    env_logger::init();

    let config = IngestConfig::load().into_diagnostic()?;
    let files = files_from_args()?;

    if files.is_empty() {
        warn!("no log files given on the command line, nothing to do");
        return Ok(());
    }

    run_migrations(&config.database_url).into_diagnostic()?;

    let pool = get_pool(&config.database_url, config.db_pool_size).into_diagnostic()?;
    let rating_config = RatingConfig::default();
    let parallelism = config.parallelism();

    info!(
        "ingesting {} file(s) with up to {} in flight",
        files.len(),
        parallelism
    );

    let pool_executor: ThreadPool = ThreadPoolBuilder::new()
        .num_threads(parallelism)
        .build()
        .into_diagnostic()?;

    // One pooled connection checked out per worker thread, held for that
    // thread's whole file per spec §5's single-thread-per-file scheduling.
    pool_executor.install(|| {
        rayon::scope(|scope| {
            for path in files {
                let pool = pool.clone();
                scope.spawn(move |_| {
                    let conn = match pool.get() {
                        Ok(conn) => conn,
                        Err(e) => {
                            error!("{}: couldn't check out a connection: {e}", path.display());
                            return;
                        }
                    };
                    let mut driver = PgStorageDriver::new(conn);
                    match ingest_file(&path, &mut driver, &rating_config) {
                        Ok(stats) => info!(
                            "{}: {} lines, {} games committed",
                            path.display(),
                            stats.lines_read,
                            stats.games_committed
                        ),
                        Err(e) => error!("{}: ingest failed: {e}", path.display()),
                    }
                });
            }
        });
    });

    Ok(())
}

fn files_from_args() -> miette::Result<Vec<PathBuf>> {
    Ok(std::env::args_os().skip(1).map(PathBuf::from).collect())
}
