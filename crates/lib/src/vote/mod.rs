//! Vote command parsing and application
//!
//! A vote command is free text: every token but the last forms the target
//! name, the last token is the delta. Applying a vote settles the actor's
//! accrual, checks funds, records the score change through the ledger, then
//! debits the actor and resets their accrual clock.

mod errors;

pub use errors::VoteError;

use crate::{Result, ledger::LedgerStore};

/// A parsed vote: who to move, and by how much (before vote power).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteCommand {
    /// Target display name as typed, inner whitespace runs collapsed to
    /// single spaces.
    pub target_name: String,

    /// Requested magnitude and direction, one of -2, -1, 1, 2.
    pub delta: i8,
}

/// Parse `"<target name with spaces> <+2|+1|-1|-2>"`.
///
/// Splits on runs of whitespace; needs at least a name token and a delta
/// token. Anything else is [`VoteError::InvalidFormat`].
pub fn parse_vote_command(input: &str) -> Result<VoteCommand> {
    let invalid = || VoteError::InvalidFormat {
        input: input.to_string(),
    };

    let parts: Vec<&str> = input.split_whitespace().collect();
    if parts.len() < 2 {
        return Err(invalid().into());
    }

    let delta: i8 = parts[parts.len() - 1].parse().map_err(|_| invalid())?;
    if !matches!(delta, -2 | -1 | 1 | 2) {
        return Err(invalid().into());
    }

    let target_name = parts[..parts.len() - 1].join(" ");
    if target_name.is_empty() {
        return Err(invalid().into());
    }

    Ok(VoteCommand { target_name, delta })
}

/// What a successfully applied vote did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteReceipt {
    /// Votes debited from the actor (`|delta|`).
    pub cost: u64,

    /// Signed points applied to the target (`delta x actor's vote power`).
    pub points: i64,

    /// Actor's balance after the debit.
    pub new_balance: u64,
}

/// Apply a parsed vote from the user identified by `email` at `now`.
///
/// Settles accrual before checking funds, so votes earned up to this instant
/// are spendable. The debit resets the actor's accrual clock to `now`:
/// spending forfeits any fractional hour accumulated since the last
/// settlement. Self-votes are permitted.
pub fn apply_vote(
    ledger: &mut LedgerStore,
    email: &str,
    command: &VoteCommand,
    now: u64,
) -> Result<VoteReceipt> {
    ledger.settle_accrual(email, now)?;

    let user = ledger.get_user(email)?;
    let cost = u64::from(command.delta.unsigned_abs());
    let have = user.vote_balance;
    if have < cost {
        return Err(VoteError::InsufficientVotes { have, need: cost }.into());
    }
    let actor_username = user.username.clone();

    let points = ledger.record_vote(&actor_username, &command.target_name, command.delta)?;

    let user = ledger.user_mut(email)?;
    user.vote_balance -= cost;
    user.last_vote_update = Some(now);
    let new_balance = user.vote_balance;

    ledger.persist()?;

    Ok(VoteReceipt {
        cost,
        points,
        new_balance,
    })
}
