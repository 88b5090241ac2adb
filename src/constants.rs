// src/constants.rs
//
// Application-wide constants extracted from magic numbers throughout the codebase.
// Each constant is documented with its purpose and usage context.

/// AnkiConnect protocol version sent with every request.
///
/// Version 6 is the envelope format this client speaks: requests carry
/// `{action, version, params}` and responses carry `{result, error}`.
///
/// Used in: `infrastructure/transport.rs`
pub const ANKI_CONNECT_VERSION: i64 = 6;

/// Default AnkiConnect endpoint on a local Anki instance.
///
/// Used in: `infrastructure/config.rs`
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8765";

/// Extension given to uploaded media files, replacing whatever the
/// source file carried.
///
/// Uploads are normalized to one extension so the `<img>` tag embedded in
/// the back field always matches the stored filename.
///
/// Used in: `infrastructure/media.rs`
pub const MEDIA_EXTENSION: &str = "jpg";

/// Exclusive lower bound on fact length (in characters) for inbox records.
///
/// Anything this short is a fragment or stray header, not a fact worth
/// turning into a card.
///
/// Used in: `domain/card.rs`
pub const FACT_MIN_CHARS: usize = 10;

/// Exclusive upper bound on fact length (in characters) for inbox records.
///
/// Used in: `domain/card.rs`
pub const FACT_MAX_CHARS: usize = 1000;

/// Maximum characters of front text shown in progress and report lines.
///
/// Used in: `util/text.rs` callers
pub const FRONT_PREVIEW_CHARS: usize = 50;

/// Delay in milliseconds after launching Anki before the first
/// availability probe.
///
/// Anki needs a few seconds to open the collection and start the
/// AnkiConnect listener; probing earlier just burns attempts.
///
/// Used in: `util/process.rs`
pub const LAUNCH_GRACE_MS: u64 = 4000;

/// Number of availability probes after launching Anki.
///
/// Used in: `util/process.rs`
pub const LAUNCH_POLL_ATTEMPTS: u32 = 10;

/// Delay in milliseconds between availability probes.
///
/// Used in: `util/process.rs`
pub const LAUNCH_POLL_DELAY_MS: u64 = 1000;

/// Default request timeout in seconds for AnkiConnect calls.
///
/// Used in: `infrastructure/config.rs`
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of transport-level retries per request.
///
/// Used in: `infrastructure/config.rs`
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default backoff in milliseconds between transport retries.
///
/// Backoff is linear: attempt N waits N times this value.
///
/// Used in: `infrastructure/config.rs`
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 250;
