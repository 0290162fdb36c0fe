//! Core data types for the persisted ledger
//!
//! These records mirror the single JSON state document exactly; field names
//! on the wire are camelCase to stay compatible with documents written by
//! earlier builds of the app.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Vote balance granted to every newly created account.
pub const STARTING_VOTE_BALANCE: u64 = 10;

/// How long a pending registration stays verifiable: 15 minutes.
pub const PENDING_REGISTRATION_TTL_MILLIS: u64 = 15 * 60 * 1000;

/// A registered account.
///
/// Keyed in the document by lowercased email. The password is stored as an
/// opaque comparison string; hashing it is an explicit non-goal of this demo.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Lowercased email, the account's unique key.
    pub email: String,

    /// Display username, unique across accounts case-insensitively.
    pub username: String,

    /// Plaintext password (demo only).
    pub password: String,

    /// Account creation timestamp (millis since epoch).
    #[serde(default)]
    pub created_at: u64,

    /// Timestamp of the last accrual settlement. `None` until the first
    /// settlement initializes it.
    #[serde(default)]
    pub last_vote_update: Option<u64>,

    /// Spendable vote balance. Never negative.
    #[serde(default = "default_vote_balance")]
    pub vote_balance: u64,
}

fn default_vote_balance() -> u64 {
    STARTING_VOTE_BALANCE
}

impl User {
    /// Create a fresh account with the starting balance and the accrual
    /// clock anchored at `now`.
    pub fn new(email: &str, username: &str, password: &str, now: u64) -> Self {
        Self {
            email: email.to_lowercase(),
            username: username.to_string(),
            password: password.to_string(),
            created_at: now,
            last_vote_update: Some(now),
            vote_balance: STARTING_VOTE_BALANCE,
        }
    }
}

/// An unconfirmed sign-up awaiting email code verification.
///
/// At most one exists per email; re-registering replaces it.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRegistration {
    /// Lowercased email the code was sent to.
    pub email: String,

    /// Username the registrant asked for.
    pub username: String,

    /// Plaintext password to carry into the account on promotion.
    pub password: String,

    /// The 6-digit verification code, zero-padded ASCII digits.
    pub code: String,

    /// When the registration was submitted (millis since epoch).
    #[serde(default)]
    pub created_at: u64,

    /// When the code stops being accepted (millis since epoch).
    pub expires_at: u64,
}

impl PendingRegistration {
    /// Create a pending registration expiring
    /// [`PENDING_REGISTRATION_TTL_MILLIS`] after `now`.
    pub fn new(email: &str, username: &str, password: &str, code: String, now: u64) -> Self {
        Self {
            email: email.to_lowercase(),
            username: username.to_string(),
            password: password.to_string(),
            code,
            created_at: now,
            expires_at: now + PENDING_REGISTRATION_TTL_MILLIS,
        }
    }

    /// Whether the registration can no longer be verified at `now`.
    pub fn is_expired(&self, now: u64) -> bool {
        now > self.expires_at
    }
}

/// The scored record for a display name.
///
/// Independent of whether an account currently owns that name: entries are
/// created lazily the first time a name is claimed by a registration or
/// targeted by a vote ("floating" names). Entries are never deleted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Display casing of the name; last writer wins.
    #[serde(rename = "name")]
    pub display_name: String,

    /// Signed, unbounded score.
    #[serde(default)]
    pub score: i64,
}

impl LeaderboardEntry {
    /// A zero-score entry displaying `name` as typed.
    pub fn new(name: &str) -> Self {
        Self {
            display_name: name.to_string(),
            score: 0,
        }
    }
}

/// The whole persisted application state, as one JSON document.
///
/// Sections are insertion-ordered maps: leaderboard iteration order is the
/// order entries were first created, which the stable view sort relies on.
/// Each section defaults to empty so documents from older builds (or a
/// missing document) load without error.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StateDocument {
    /// Accounts keyed by lowercased email.
    #[serde(default)]
    pub users: IndexMap<String, User>,

    /// Leaderboard entries keyed by lowercased display name.
    #[serde(default)]
    pub leaderboard: IndexMap<String, LeaderboardEntry>,

    /// Pending registrations keyed by lowercased email.
    #[serde(default, rename = "pendingUsers")]
    pub pending_users: IndexMap<String, PendingRegistration>,
}
