//! # Score reporting and leaderboard storage
//!
//! The boundary collaborators around the 2048 engine: wire shapes for
//! score submission and leaderboard queries, pluggable score stores, a
//! player-identity lookup, and a fire-and-forget [`ScoreReporter`] that
//! the engine hands terminal scores to.
//!
//! Nothing in this crate can fail into the engine: store and identity
//! failures are logged and swallowed, and gameplay continues.

mod identity;
mod reporter;
mod store;

pub use identity::{EnvIdentity, FixedIdentity, IdentityProvider, ANONYMOUS};
pub use reporter::ScoreReporter;
pub use store::{JsonFileStore, MemoryStore, ScoreStore, StoreError, DEFAULT_TOP_LIMIT};

use serde::{Deserialize, Serialize};

/// Score-submission request body: `{"score": n}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub score: u32,
}

/// One leaderboard row: `{"username": ..., "score": n}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub username: String,
    pub score: u32,
}
