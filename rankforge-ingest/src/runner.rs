//! Drives one log file from raw bytes to committed matches: read, parse,
//! process, and on `GameProcessed`, commit. Spec §5 assigns exactly one
//! file to one worker thread with one pooled connection, so everything
//! here is synchronous and single-threaded; `main.rs` is what fans this
//! out across files.

use std::path::Path;

use log::{error, info};
use rankforge_parser::{LineReader, Parser, StepOutcome};

use crate::commit;
use crate::context::EventProcessingContext;
use crate::error::IngestError;
use crate::processor::{self, ProcessOutcome};
use crate::rating::RatingConfig;
use crate::storage::StorageDriver;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    pub lines_read: usize,
    pub games_committed: u64,
}

pub fn ingest_file<D: StorageDriver>(
    path: &Path,
    driver: &mut D,
    rating_config: &RatingConfig,
) -> Result<IngestStats, IngestError> {
    let path_str = path.display().to_string();
    let contents = std::fs::read_to_string(path).map_err(|source| IngestError::ReadFile {
        path: path_str.clone(),
        source,
    })?;

    let reader = LineReader::from_ndjson(&contents).map_err(|source| IngestError::Parse {
        path: path_str.clone(),
        source,
    })?;

    let mut stats = IngestStats {
        lines_read: reader.len(),
        games_committed: 0,
    };

    if reader.is_empty() {
        return Ok(stats);
    }

    let mut parser = Parser::new(reader.as_slice());
    let mut ctx = EventProcessingContext::new();
    let mut i = 0usize;

    while i < reader.len() {
        let outcome = {
            let driver = &mut *driver;
            parser
                .step(i, &mut |end_time| {
                    driver
                        .is_game_over_committed(end_time.naive_utc())
                        .unwrap_or_else(|e| {
                            error!("{path_str}: duplicate check failed, admitting: {e}");
                            false
                        })
                })
                .map_err(|source| IngestError::Parse {
                    path: path_str.clone(),
                    source,
                })?
        };

        let next = match outcome {
            StepOutcome::Event(event, next) => {
                if processor::process_event(&mut ctx, event) == ProcessOutcome::ReadyToCommit {
                    commit::commit_match(driver, &mut ctx, rating_config).map_err(|source| {
                        IngestError::Commit {
                            path: path_str.clone(),
                            source: Box::new(source),
                        }
                    })?;
                    stats.games_committed += 1;
                }
                next
            }
            StepOutcome::Skip(next) => next,
        };

        i = next;
    }

    info!(
        "{path_str}: processed {} lines, committed {} games",
        stats.lines_read, stats.games_committed
    );

    Ok(stats)
}
