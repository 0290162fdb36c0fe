//! Session management
//!
//! [`SessionManager`] is the application context: it owns the
//! [`LedgerStore`], the clock, and the notifier, and tracks which user (if
//! any) is authenticated now as an explicit [`SessionState`] field. All auth
//! transitions (register, verify, login, logout, resume) run through it, and
//! every transition into `LoggedIn` settles vote accrual and persists.

mod errors;

pub use errors::SessionError;

use std::sync::Arc;

use rand::Rng;

use crate::{
    Result,
    clock::{Clock, millis_to_rfc3339},
    ledger::{LedgerStore, PendingRegistration, User},
    notify::NotificationSender,
    view::{self, LeaderboardRow, UserStatsView},
    vote::{self, VoteReceipt},
};

/// Which user, if any, is authenticated right now.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Nobody is authenticated.
    LoggedOut,
    /// A registration was submitted and its code dispatched; waiting for
    /// the user to type it back.
    AwaitingVerification {
        /// Lowercased email the pending registration was created under.
        email: String,
    },
    /// An account is authenticated.
    LoggedIn {
        /// Lowercased email of the authenticated account.
        email: String,
    },
}

/// The single application context tying auth state to the ledger.
pub struct SessionManager {
    ledger: LedgerStore,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn NotificationSender>,
    /// Whether registration is gated behind an emailed 6-digit code.
    verification: bool,
    state: SessionState,
}

impl SessionManager {
    /// Create a manager in the `LoggedOut` state.
    ///
    /// Call [`SessionManager::resume`] afterwards to pick up a persisted
    /// session from a previous run.
    pub fn new(
        ledger: LedgerStore,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn NotificationSender>,
        verification: bool,
    ) -> Self {
        Self {
            ledger,
            clock,
            notifier,
            verification,
            state: SessionState::LoggedOut,
        }
    }

    /// Current session state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Email of the authenticated user, if logged in.
    pub fn current_email(&self) -> Option<&str> {
        match &self.state {
            SessionState::LoggedIn { email } => Some(email),
            _ => None,
        }
    }

    /// Read-only access to the ledger.
    pub fn ledger(&self) -> &LedgerStore {
        &self.ledger
    }

    /// Mutable access to the ledger.
    pub fn ledger_mut(&mut self) -> &mut LedgerStore {
        &mut self.ledger
    }

    // === Transitions ===

    /// Restore the session persisted by a previous run.
    ///
    /// A pointer that resolves to a real account logs that user in
    /// (settling accrual on the way); a dangling pointer is cleared.
    pub fn resume(&mut self) -> Result<()> {
        match self.ledger.session_email()? {
            Some(email) if self.ledger.user(&email).is_some() => {
                let username = self
                    .ledger
                    .get_user(&email)?
                    .username
                    .clone();
                self.ledger.ensure_leaderboard_entry(&username);
                tracing::info!(email = %email, "session resumed");
                self.finish_login(&email)
            }
            Some(email) => {
                tracing::warn!(email = %email, "session pointer is dangling, clearing");
                self.ledger.set_session_email(None)?;
                self.state = SessionState::LoggedOut;
                Ok(())
            }
            None => {
                self.state = SessionState::LoggedOut;
                Ok(())
            }
        }
    }

    /// Register a new account.
    ///
    /// With verification disabled the account is created immediately and the
    /// session transitions to `LoggedIn`. With verification enabled a
    /// [`PendingRegistration`] is created and its code dispatched; dispatch
    /// failure surfaces [`SessionError::DeliveryFailed`] but keeps the
    /// already-persisted pending record, so a subsequent `verify` with the
    /// (undelivered) code still promotes it.
    pub async fn register(&mut self, email: &str, username: &str, password: &str) -> Result<()> {
        let email = email.trim().to_lowercase();
        let username = username.trim().to_string();

        if email.is_empty() || username.is_empty() || password.is_empty() {
            return Err(SessionError::MissingFields.into());
        }
        if self.ledger.user(&email).is_some() {
            return Err(SessionError::DuplicateEmail { email }.into());
        }
        if self.ledger.username_taken(&username) {
            return Err(SessionError::DuplicateUsername { username }.into());
        }

        let now = self.clock.now_millis();
        if !self.verification {
            self.ledger
                .insert_user(User::new(&email, &username, password, now));
            self.ledger.ensure_leaderboard_entry(&username);
            tracing::info!(email = %email, username = %username, "account registered");
            return self.finish_login(&email);
        }

        let code = generate_verification_code();
        let pending = PendingRegistration::new(&email, &username, password, code.clone(), now);
        tracing::info!(
            email = %email,
            expires = %millis_to_rfc3339(pending.expires_at),
            "registration pending verification"
        );
        self.ledger.insert_pending(pending);
        self.ledger.persist()?;

        if let Err(e) = self.notifier.send_code(&email, &code).await {
            tracing::warn!(email = %email, "verification code dispatch failed: {e}");
            return Err(SessionError::DeliveryFailed {
                reason: e.to_string(),
            }
            .into());
        }

        self.state = SessionState::AwaitingVerification { email };
        Ok(())
    }

    /// Verify a registration code and promote the pending registration to a
    /// full account.
    ///
    /// Operates on the most recently created pending registration, whichever
    /// email it belongs to. That matches the shipped behavior; keying by the
    /// email this session registered with would be sounder when several
    /// registrations are pending at once, but would be a behavior change.
    /// An expired registration is removed and must be resubmitted.
    pub fn verify(&mut self, code: &str) -> Result<()> {
        let now = self.clock.now_millis();
        let pending = match self.ledger.most_recent_pending() {
            Some(pending) => pending.clone(),
            None => return Err(SessionError::NoPendingRegistration.into()),
        };

        if pending.is_expired(now) {
            self.ledger.remove_pending(&pending.email);
            self.ledger.persist()?;
            tracing::info!(email = %pending.email, "pending registration expired");
            return Err(SessionError::VerificationExpired.into());
        }
        if pending.code != code.trim() {
            return Err(SessionError::IncorrectCode.into());
        }

        self.ledger.remove_pending(&pending.email);
        self.ledger
            .insert_user(User::new(&pending.email, &pending.username, &pending.password, now));
        self.ledger.ensure_leaderboard_entry(&pending.username);
        tracing::info!(email = %pending.email, username = %pending.username, "registration verified");
        self.finish_login(&pending.email)
    }

    /// Log an existing account in.
    pub fn login(&mut self, email: &str, username: &str, password: &str) -> Result<()> {
        let email = email.trim().to_lowercase();
        let username = username.trim().to_string();

        if email.is_empty() || username.is_empty() || password.is_empty() {
            return Err(SessionError::MissingFields.into());
        }

        let stored_username = match self.ledger.user(&email) {
            Some(user) if user.password == password => user.username.clone(),
            _ => return Err(SessionError::InvalidCredentials.into()),
        };
        if stored_username.to_lowercase() != username.to_lowercase() {
            return Err(SessionError::UsernameMismatch.into());
        }

        self.ledger.ensure_leaderboard_entry(&stored_username);
        tracing::info!(email = %email, "logged in");
        self.finish_login(&email)
    }

    /// Clear the session pointer unconditionally.
    pub fn logout(&mut self) -> Result<()> {
        self.ledger.set_session_email(None)?;
        self.state = SessionState::LoggedOut;
        tracing::info!("logged out");
        Ok(())
    }

    // === Operations on the authenticated user ===

    /// Parse and apply a vote command (`"<target name> <+2|+1|-1|-2>"`)
    /// from the authenticated user.
    pub fn cast_vote(&mut self, input: &str) -> Result<VoteReceipt> {
        let email = match &self.state {
            SessionState::LoggedIn { email } => email.clone(),
            _ => return Err(SessionError::NotLoggedIn.into()),
        };
        let command = vote::parse_vote_command(input)?;
        vote::apply_vote(&mut self.ledger, &email, &command, self.clock.now_millis())
    }

    /// Stats view for the authenticated user, settling accrual first.
    pub fn current_user_view(&mut self) -> Result<UserStatsView> {
        let email = match &self.state {
            SessionState::LoggedIn { email } => email.clone(),
            _ => return Err(SessionError::NotLoggedIn.into()),
        };
        view::current_user_view(&mut self.ledger, &email, self.clock.now_millis())
    }

    /// Ranked leaderboard view.
    pub fn leaderboard_view(&self) -> Vec<LeaderboardRow> {
        view::leaderboard_view(&self.ledger)
    }

    /// Settle accrual, persist, point the session at `email`, and enter
    /// `LoggedIn`. Every path into `LoggedIn` funnels through here.
    fn finish_login(&mut self, email: &str) -> Result<()> {
        let now = self.clock.now_millis();
        self.ledger.settle_accrual(email, now)?;
        self.ledger.set_session_email(Some(email))?;
        self.ledger.persist()?;
        self.state = SessionState::LoggedIn {
            email: email.to_string(),
        };
        Ok(())
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("state", &self.state)
            .field("verification", &self.verification)
            .finish()
    }
}

/// A uniform-random 6-digit code, zero-padded.
fn generate_verification_code() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}
