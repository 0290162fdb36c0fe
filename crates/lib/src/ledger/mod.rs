//! The ledger: users, pending registrations, and leaderboard entries
//!
//! [`LedgerStore`] owns the whole [`StateDocument`] plus the storage handle,
//! and is the only place leaderboard scores are mutated. Persistence rewrites
//! the document atomically as a single JSON value after every mutating
//! operation, so a crash can never leave a partially written state behind.

mod errors;
mod types;

pub use errors::LedgerError;
pub use types::{
    LeaderboardEntry, PENDING_REGISTRATION_TTL_MILLIS, PendingRegistration, STARTING_VOTE_BALANCE,
    StateDocument, User,
};

use std::sync::Arc;

use indexmap::map::Entry;

use crate::{
    Result,
    backend::KeyValueStore,
    economy::{accrual_rate_per_hour, vote_power},
};

/// Storage key holding the JSON state document.
pub const STATE_KEY: &str = "voteAppState";

/// Storage key holding the current session's email, absent when logged out.
pub const SESSION_KEY: &str = "voteAppCurrentUser";

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Owns the persisted state document and mediates every mutation of it.
#[derive(Debug)]
pub struct LedgerStore {
    backend: Arc<dyn KeyValueStore>,
    doc: StateDocument,
}

impl LedgerStore {
    /// Load the ledger from storage.
    ///
    /// A missing or corrupt document falls back to an empty one rather than
    /// propagating: losing a demo leaderboard beats refusing to start.
    pub fn load(backend: Arc<dyn KeyValueStore>) -> Result<Self> {
        let doc = match backend.get(STATE_KEY)? {
            Some(raw) => match serde_json::from_str::<StateDocument>(&raw) {
                Ok(doc) => doc,
                Err(e) => {
                    tracing::warn!("State document is corrupt, starting empty: {e}");
                    StateDocument::default()
                }
            },
            None => StateDocument::default(),
        };
        Ok(Self { backend, doc })
    }

    /// Rewrite the whole document to storage.
    pub fn persist(&self) -> Result<()> {
        let json = serde_json::to_string(&self.doc)?;
        self.backend.set(STATE_KEY, &json)
    }

    /// Read-only view of the document.
    pub fn document(&self) -> &StateDocument {
        &self.doc
    }

    // === Users ===

    /// Look up an account by email (any casing).
    pub fn user(&self, email: &str) -> Option<&User> {
        self.doc.users.get(&email.to_lowercase())
    }

    /// Look up an account by email, as an error when absent.
    pub fn get_user(&self, email: &str) -> Result<&User> {
        let key = email.to_lowercase();
        self.doc
            .users
            .get(&key)
            .ok_or_else(|| LedgerError::UserNotFound { email: key }.into())
    }

    /// Look up an account mutably by email, as an error when absent.
    pub fn user_mut(&mut self, email: &str) -> Result<&mut User> {
        let key = email.to_lowercase();
        match self.doc.users.get_mut(&key) {
            Some(user) => Ok(user),
            None => Err(LedgerError::UserNotFound { email: key }.into()),
        }
    }

    /// Insert (or replace) an account, keyed by its lowercased email.
    pub fn insert_user(&mut self, user: User) {
        self.doc.users.insert(user.email.clone(), user);
    }

    /// Whether any account already uses `username`, compared
    /// case-insensitively.
    ///
    /// Linear scan over all users; an index would not change observable
    /// behavior at this scale.
    pub fn username_taken(&self, username: &str) -> bool {
        let lower = username.to_lowercase();
        self.doc
            .users
            .values()
            .any(|u| u.username.to_lowercase() == lower)
    }

    // === Leaderboard ===

    /// Idempotently make sure a leaderboard entry exists for `username`.
    ///
    /// Creates a zero-score entry keyed by the lowercased name if absent;
    /// otherwise refreshes only the display casing, never the score. A new
    /// account claiming a "floating" name therefore inherits its score.
    pub fn ensure_leaderboard_entry(&mut self, username: &str) {
        match self.doc.leaderboard.entry(username.to_lowercase()) {
            Entry::Occupied(mut occupied) => {
                occupied.get_mut().display_name = username.to_string();
            }
            Entry::Vacant(vacant) => {
                vacant.insert(LeaderboardEntry::new(username));
            }
        }
    }

    /// The score recorded for `username`, or 0 when no entry exists.
    /// Read-only: never creates an entry.
    pub fn score_of(&self, username: &str) -> i64 {
        self.doc
            .leaderboard
            .get(&username.to_lowercase())
            .map(|entry| entry.score)
            .unwrap_or(0)
    }

    /// Apply a vote from `actor_username` against `target_name`.
    ///
    /// This is the single mutation point for leaderboard scores. The target
    /// entry is created lazily with the name as typed when it does not exist
    /// yet. Returns the signed points applied (`delta x actor's vote power`).
    pub fn record_vote(
        &mut self,
        actor_username: &str,
        target_name: &str,
        delta: i8,
    ) -> Result<i64> {
        if !matches!(delta, -2 | -1 | 1 | 2) {
            return Err(LedgerError::InvalidVoteDelta { delta }.into());
        }

        let power = vote_power(self.score_of(actor_username)) as i64;
        let points = i64::from(delta) * power;

        let entry = self
            .doc
            .leaderboard
            .entry(target_name.to_lowercase())
            .or_insert_with(|| LeaderboardEntry::new(target_name));
        entry.score += points;

        tracing::debug!(
            actor = actor_username,
            target = target_name,
            delta,
            points,
            new_score = entry.score,
            "vote recorded"
        );
        Ok(points)
    }

    // === Accrual ===

    /// Settle time-based vote accrual for the account at `now`.
    ///
    /// Only whole votes are ever credited: `floor(elapsed_hours x rate)`.
    /// When that floors to zero the settlement timestamp is deliberately left
    /// unadvanced so fractional hours keep accumulating toward a future
    /// settlement. Idempotent under repeated calls at the same `now`.
    ///
    /// Returns the number of votes credited.
    pub fn settle_accrual(&mut self, email: &str, now: u64) -> Result<u64> {
        let key = email.to_lowercase();
        let user = self
            .doc
            .users
            .get_mut(&key)
            .ok_or(LedgerError::UserNotFound { email: key })?;
        let score = self
            .doc
            .leaderboard
            .get(&user.username.to_lowercase())
            .map(|entry| entry.score)
            .unwrap_or(0);
        let Some(last) = user.last_vote_update else {
            // First settlement anchors the accrual clock without crediting.
            user.last_vote_update = Some(now);
            return Ok(0);
        };

        if now <= last {
            return Ok(0);
        }

        let hours = (now - last) as f64 / MILLIS_PER_HOUR;
        let rate = accrual_rate_per_hour(score);
        let gained = (hours * f64::from(rate)).floor() as u64;
        if gained > 0 {
            user.vote_balance += gained;
            user.last_vote_update = Some(now);
            tracing::debug!(
                email = %user.email,
                gained,
                balance = user.vote_balance,
                "accrual settled"
            );
        }
        Ok(gained)
    }

    // === Pending registrations ===

    /// Insert a pending registration, replacing any earlier one for the
    /// same email.
    pub fn insert_pending(&mut self, pending: PendingRegistration) {
        self.doc
            .pending_users
            .insert(pending.email.clone(), pending);
    }

    /// The most recently created pending registration, if any.
    ///
    /// Verification resolves against this record regardless of which email
    /// the verifying session registered with; see `SessionManager::verify`.
    pub fn most_recent_pending(&self) -> Option<&PendingRegistration> {
        self.doc
            .pending_users
            .values()
            .fold(None, |best: Option<&PendingRegistration>, candidate| {
                match best {
                    // >= so that later insertions win created_at ties.
                    Some(current) if candidate.created_at >= current.created_at => Some(candidate),
                    Some(current) => Some(current),
                    None => Some(candidate),
                }
            })
    }

    /// Remove the pending registration for `email`, returning it if present.
    pub fn remove_pending(&mut self, email: &str) -> Option<PendingRegistration> {
        self.doc.pending_users.shift_remove(&email.to_lowercase())
    }

    // === Session pointer ===

    /// The persisted current-user email, if a session exists.
    pub fn session_email(&self) -> Result<Option<String>> {
        self.backend.get(SESSION_KEY)
    }

    /// Persist or clear the current-user email.
    pub fn set_session_email(&self, email: Option<&str>) -> Result<()> {
        match email {
            Some(email) => self.backend.set(SESSION_KEY, &email.to_lowercase()),
            None => self.backend.delete(SESSION_KEY),
        }
    }
}
