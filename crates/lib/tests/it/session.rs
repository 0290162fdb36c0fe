use podium::{SessionState, ledger::STARTING_VOTE_BALANCE};

use crate::helpers::{HOUR_MILLIS, MINUTE_MILLIS, TestContext, register_logged_in};

// === Registration without verification ===

#[tokio::test]
async fn register_creates_account_and_logs_in() {
    let mut ctx = TestContext::new(false);
    register_logged_in(&mut ctx, "Alice@Example.com", "Alice").await;

    assert_eq!(
        ctx.session.state(),
        &SessionState::LoggedIn {
            email: "alice@example.com".to_string()
        }
    );

    assert_eq!(ctx.session.current_email(), Some("alice@example.com"));

    let user = ctx.session.ledger().user("alice@example.com").unwrap();
    assert_eq!(user.vote_balance, STARTING_VOTE_BALANCE);
    assert_eq!(user.username, "Alice");
    assert_eq!(ctx.session.ledger().score_of("alice"), 0);
    assert_eq!(
        ctx.session.ledger().session_email().unwrap().as_deref(),
        Some("alice@example.com")
    );
}

#[tokio::test]
async fn register_rejects_empty_fields() {
    let mut ctx = TestContext::new(false);
    let err = ctx.session.register("", "alice", "pw").await.unwrap_err();
    assert!(err.is_validation_error());
    let err = ctx
        .session
        .register("a@b.c", "   ", "pw")
        .await
        .unwrap_err();
    assert!(err.is_validation_error());
    let err = ctx.session.register("a@b.c", "alice", "").await.unwrap_err();
    assert!(err.is_validation_error());
    assert_eq!(ctx.session.state(), &SessionState::LoggedOut);
}

#[tokio::test]
async fn register_rejects_duplicate_email_and_username() {
    let mut ctx = TestContext::new(false);
    register_logged_in(&mut ctx, "alice@example.com", "Alice").await;

    let err = ctx
        .session
        .register("ALICE@example.com", "other", "pw")
        .await
        .unwrap_err();
    assert!(err.is_validation_error(), "duplicate email: {err}");

    let err = ctx
        .session
        .register("new@example.com", "aLiCe", "pw")
        .await
        .unwrap_err();
    assert!(err.is_validation_error(), "duplicate username: {err}");
}

#[tokio::test]
async fn registering_a_floating_name_inherits_its_score() {
    let mut ctx = TestContext::new(false);
    register_logged_in(&mut ctx, "alice@example.com", "alice").await;
    // Alice votes Zoe up before Zoe has an account.
    ctx.session.cast_vote("Zoe +2").unwrap();
    ctx.session.logout().unwrap();

    register_logged_in(&mut ctx, "zoe@example.com", "Zoe").await;
    let stats = ctx.session.current_user_view().unwrap();
    assert_eq!(stats.score, 4, "floating score inherited");
}

// === Registration with verification ===

#[tokio::test]
async fn register_with_verification_creates_pending_and_dispatches() {
    let mut ctx = TestContext::new(true);
    ctx.session
        .register("bob@example.com", "bob", "pw")
        .await
        .unwrap();

    assert_eq!(
        ctx.session.state(),
        &SessionState::AwaitingVerification {
            email: "bob@example.com".to_string()
        }
    );
    // No account yet, only the pending record.
    assert!(ctx.session.ledger().user("bob@example.com").is_none());
    let pending = &ctx.session.ledger().document().pending_users["bob@example.com"];
    assert_eq!(pending.username, "bob");
    assert_eq!(pending.code.len(), 6);
    assert_eq!(ctx.notifier.last_code().as_deref(), Some(pending.code.as_str()));
    assert_eq!(
        pending.expires_at,
        pending.created_at + 15 * MINUTE_MILLIS
    );
}

#[tokio::test]
async fn verify_with_correct_code_promotes_to_account() {
    let mut ctx = TestContext::new(true);
    ctx.session
        .register("bob@example.com", "bob", "pw")
        .await
        .unwrap();
    let code = ctx.notifier.last_code().unwrap();

    ctx.clock.advance(5 * MINUTE_MILLIS);
    ctx.session.verify(&code).unwrap();

    assert_eq!(
        ctx.session.state(),
        &SessionState::LoggedIn {
            email: "bob@example.com".to_string()
        }
    );
    let user = ctx.session.ledger().user("bob@example.com").unwrap();
    assert_eq!(user.vote_balance, STARTING_VOTE_BALANCE);
    assert!(ctx.session.ledger().document().pending_users.is_empty());
    assert_eq!(ctx.session.ledger().score_of("bob"), 0);
}

#[tokio::test]
async fn verify_with_wrong_code_keeps_pending() {
    let mut ctx = TestContext::new(true);
    ctx.session
        .register("bob@example.com", "bob", "pw")
        .await
        .unwrap();

    // Derive a code guaranteed not to match the generated one.
    let code = ctx.notifier.last_code().unwrap();
    let wrong = if code == "000000" { "000001" } else { "000000" };

    let err = ctx.session.verify(wrong).unwrap_err();
    assert!(err.is_verification_error(), "wrong code rejected: {err}");
    assert!(
        !ctx.session
            .ledger()
            .document()
            .pending_users
            .is_empty()
    );
    assert!(ctx.session.ledger().user("bob@example.com").is_none());
}

#[tokio::test]
async fn verify_after_expiry_fails_and_removes_pending() {
    let mut ctx = TestContext::new(true);
    ctx.session
        .register("bob@example.com", "bob", "pw")
        .await
        .unwrap();
    let code = ctx.notifier.last_code().unwrap();

    ctx.clock.advance(15 * MINUTE_MILLIS + 1);
    let err = ctx.session.verify(&code).unwrap_err();
    assert!(err.is_verification_error(), "expired: {err}");
    assert!(ctx.session.ledger().document().pending_users.is_empty());

    // With the record gone, another attempt reports nothing pending.
    let err = ctx.session.verify(&code).unwrap_err();
    assert!(err.is_verification_error(), "nothing pending: {err}");
}

#[tokio::test]
async fn verify_at_exact_expiry_still_succeeds() {
    let mut ctx = TestContext::new(true);
    ctx.session
        .register("bob@example.com", "bob", "pw")
        .await
        .unwrap();
    let code = ctx.notifier.last_code().unwrap();

    // Expiry is strict: now > expires_at. Exactly at the boundary is fine.
    ctx.clock.advance(15 * MINUTE_MILLIS);
    ctx.session.verify(&code).unwrap();
    assert!(ctx.session.ledger().user("bob@example.com").is_some());
}

#[tokio::test]
async fn verify_resolves_most_recent_pending_registration() {
    let mut ctx = TestContext::new(true);
    ctx.session
        .register("first@example.com", "first", "pw")
        .await
        .unwrap();
    let first_code = ctx.notifier.last_code().unwrap();

    ctx.clock.advance(MINUTE_MILLIS);
    ctx.session
        .register("second@example.com", "second", "pw")
        .await
        .unwrap();
    let second_code = ctx.notifier.last_code().unwrap();

    // The first registration's code no longer verifies: resolution picks
    // the most recently created record, which belongs to "second".
    if first_code != second_code {
        let err = ctx.session.verify(&first_code).unwrap_err();
        assert!(err.is_verification_error());
    }

    ctx.session.verify(&second_code).unwrap();
    assert!(ctx.session.ledger().user("second@example.com").is_some());
    // First remains pending, now only reachable once second's record is gone.
    assert!(
        ctx.session
            .ledger()
            .document()
            .pending_users
            .contains_key("first@example.com")
    );
}

#[tokio::test]
async fn delivery_failure_surfaces_but_keeps_pending_record() {
    let mut ctx = TestContext::with_failing_delivery(true);
    let err = ctx
        .session
        .register("bob@example.com", "bob", "pw")
        .await
        .unwrap_err();
    assert!(err.is_delivery_error(), "delivery failure surfaced: {err}");
    assert_eq!(ctx.session.state(), &SessionState::LoggedOut);

    // The pending record survives the failed dispatch, so the (never
    // delivered) code still verifies. Documented behavior, not a bug fix.
    let code = ctx.notifier.last_code().unwrap();
    ctx.session.verify(&code).unwrap();
    assert!(ctx.session.ledger().user("bob@example.com").is_some());
}

// === Login / logout / resume ===

#[tokio::test]
async fn login_checks_credentials_and_username() {
    let mut ctx = TestContext::new(false);
    register_logged_in(&mut ctx, "alice@example.com", "Alice").await;
    ctx.session.logout().unwrap();

    let err = ctx
        .session
        .login("alice@example.com", "Alice", "wrong")
        .unwrap_err();
    assert!(err.is_credential_error());

    let err = ctx
        .session
        .login("nobody@example.com", "Alice", "password")
        .unwrap_err();
    assert!(err.is_credential_error());

    let err = ctx
        .session
        .login("alice@example.com", "NotAlice", "password")
        .unwrap_err();
    assert!(err.is_credential_error());

    // Email and username match case-insensitively.
    ctx.session
        .login("ALICE@example.com", "aLiCe", "password")
        .unwrap();
    assert_eq!(
        ctx.session.state(),
        &SessionState::LoggedIn {
            email: "alice@example.com".to_string()
        }
    );
}

#[tokio::test]
async fn logout_clears_the_session_pointer() {
    let mut ctx = TestContext::new(false);
    register_logged_in(&mut ctx, "alice@example.com", "alice").await;
    ctx.session.logout().unwrap();

    assert_eq!(ctx.session.state(), &SessionState::LoggedOut);
    assert_eq!(ctx.session.ledger().session_email().unwrap(), None);
    // Logging out while logged out is fine.
    ctx.session.logout().unwrap();
}

#[tokio::test]
async fn resume_restores_a_persisted_session() {
    let mut ctx = TestContext::new(false);
    register_logged_in(&mut ctx, "alice@example.com", "alice").await;

    let mut restarted = ctx.restart();
    restarted.resume().unwrap();
    assert_eq!(
        restarted.state(),
        &SessionState::LoggedIn {
            email: "alice@example.com".to_string()
        }
    );
}

#[tokio::test]
async fn resume_settles_accrual_for_time_passed_while_away() {
    let mut ctx = TestContext::new(false);
    register_logged_in(&mut ctx, "alice@example.com", "alice").await;

    // Two hours away at score 0 accrues 20 votes.
    ctx.clock.advance(2 * HOUR_MILLIS);
    let mut restarted = ctx.restart();
    restarted.resume().unwrap();
    assert_eq!(
        restarted.ledger().user("alice@example.com").unwrap().vote_balance,
        STARTING_VOTE_BALANCE + 20
    );
}

#[test]
fn resume_clears_a_dangling_pointer() {
    let ctx = TestContext::new(false);
    // A pointer with no matching account (e.g. document was reset).
    ctx.session
        .ledger()
        .set_session_email(Some("ghost@example.com"))
        .unwrap();

    let mut restarted = ctx.restart();
    restarted.resume().unwrap();
    assert_eq!(restarted.state(), &SessionState::LoggedOut);
    assert_eq!(restarted.ledger().session_email().unwrap(), None);
}

#[test]
fn resume_with_no_pointer_stays_logged_out() {
    let ctx = TestContext::new(false);
    let mut restarted = ctx.restart();
    restarted.resume().unwrap();
    assert_eq!(restarted.state(), &SessionState::LoggedOut);
}
