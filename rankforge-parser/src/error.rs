use thiserror::Error;

/// Errors the line reader and pattern dictionary can raise while walking a
/// log. Most malformed lines are simply skipped by the state machine (an
/// unrecognized line is not an error, it is silence); this type exists for
/// the handful of cases where a line matches a known shape but the payload
/// inside it cannot be trusted at all.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {0} is not valid NDJSON")]
    MalformedLine(usize),

    #[error("line {0} is missing the `time` field")]
    MissingTimestamp(usize),

    #[error("round-end block starting at line {0} never reached JSON_END or the next ACCOLADE")]
    UnterminatedRoundEndBlock(usize),

    #[error("Game_Over at line {0} has no matching Round_Start to rewind to")]
    NoMatchingRoundStart(usize),
}
