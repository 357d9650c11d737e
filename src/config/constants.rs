// Project-wide constants
//
// Centralised here so character bands, time budgets, and other magic values
// have one source of truth. Import via `use crate::config::constants::*;`.

/// Default bind address for the HTTP API server (localhost only).
pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8300";

/// Wall-clock budget for one LLM vendor call, in seconds.
///
/// Generation runs inside a synchronous request/response cycle; a stalled
/// vendor call must surface as a timeout, never hang the handler.
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Default maximum tokens for a generation request.
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Temperature for surgical edits (favor determinism).
pub const EDIT_TEMPERATURE: f32 = 0.1;

/// Temperature for creative statement generation (favor variety).
pub const GENERATION_TEMPERATURE: f32 = 0.7;

/// Every generated statement must start with this marker.
pub const STATEMENT_MARKER: &str = "- ";

/// Character band for two-sentence statements (inclusive).
///
/// Ranges, not exact targets: downstream form rendering is only
/// approximately proportional to character count, so the model is given a
/// sentence-count suggestion and a character range to trade against each
/// other.
pub const TWO_SENTENCE_CHAR_BAND: (usize, usize) = (200, 250);

/// Character band for three-sentence statements (inclusive).
pub const THREE_SENTENCE_CHAR_BAND: (usize, usize) = (300, 350);

/// Punctuation the output must never contain; commas only.
pub const FORBIDDEN_PUNCTUATION: [&str; 3] = ["—", ";", "/"];

/// Minimum length for a raw-text line to count as a candidate statement
/// when JSON parsing fails and the parser falls back to line splitting.
pub const MIN_CANDIDATE_LINE_LEN: usize = 40;

/// Partial-match floor: an inferred match must be at least this many
/// characters long.
pub const PARTIAL_MATCH_MIN_CHARS: usize = 10;

/// Partial-match floor: an inferred match must cover at least this fraction
/// of the original highlighted span.
pub const PARTIAL_MATCH_MIN_COVERAGE: f64 = 0.4;

/// Number of rewritten candidates returned by sentence-count conversion.
pub const CONVERT_VERSION_COUNT: usize = 3;
