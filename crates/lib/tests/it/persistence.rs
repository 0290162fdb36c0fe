use std::sync::Arc;

use podium::{
    SessionState,
    backend::{InMemory, KeyValueStore},
    ledger::{LedgerStore, STATE_KEY},
};

use crate::helpers::{TestContext, register_logged_in};

#[tokio::test]
async fn document_wire_shape_matches_the_storage_contract() {
    let mut ctx = TestContext::new(false);
    register_logged_in(&mut ctx, "alice@example.com", "Alice").await;
    ctx.session.cast_vote("Carol +2").unwrap();

    let raw = ctx.backend.get(STATE_KEY).unwrap().unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();

    let user = &doc["users"]["alice@example.com"];
    assert_eq!(user["username"], "Alice");
    assert_eq!(user["voteBalance"], 8);
    assert!(user["lastVoteUpdate"].is_u64());
    assert!(user["createdAt"].is_u64());

    let carol = &doc["leaderboard"]["carol"];
    assert_eq!(carol["name"], "Carol");
    assert_eq!(carol["score"], 4);

    assert!(doc["pendingUsers"].is_object());
}

#[tokio::test]
async fn full_state_survives_a_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("podium.json");

    let mut ctx = TestContext::new(false);
    register_logged_in(&mut ctx, "alice@example.com", "alice").await;
    ctx.session.cast_vote("carol +2").unwrap();
    ctx.backend.save_to_file(&path).unwrap();

    // Cold start from the file: ledger, leaderboard, and session pointer
    // are all back.
    let backend = Arc::new(InMemory::load_from_file(&path).unwrap());
    let ledger = LedgerStore::load(backend.clone()).unwrap();
    assert_eq!(ledger.score_of("carol"), 4);
    assert_eq!(
        ledger.user("alice@example.com").unwrap().vote_balance,
        8
    );

    let mut restarted = ctx.restart_with_backend(backend);
    restarted.resume().unwrap();
    assert_eq!(
        restarted.state(),
        &SessionState::LoggedIn {
            email: "alice@example.com".to_string()
        }
    );
}

#[test]
fn corrupt_document_falls_back_to_empty_without_crashing() {
    let backend = Arc::new(InMemory::new());
    backend.set(STATE_KEY, "][ not json").unwrap();

    let ledger = LedgerStore::load(backend).unwrap();
    assert!(ledger.document().users.is_empty());
    assert!(ledger.document().leaderboard.is_empty());
    assert!(ledger.document().pending_users.is_empty());
}

#[test]
fn partial_documents_load_with_defaults() {
    let backend = Arc::new(InMemory::new());
    // A document from the pre-verification build: no pendingUsers section,
    // and a user record without a balance.
    backend
        .set(
            STATE_KEY,
            r#"{
                "users": {
                    "old@example.com": {
                        "email": "old@example.com",
                        "username": "old",
                        "password": "pw"
                    }
                },
                "leaderboard": {
                    "old": { "name": "old", "score": 7 }
                }
            }"#,
        )
        .unwrap();

    let ledger = LedgerStore::load(backend).unwrap();
    let user = ledger.user("old@example.com").unwrap();
    assert_eq!(user.vote_balance, 10);
    assert_eq!(user.last_vote_update, None);
    assert_eq!(ledger.score_of("old"), 7);
}
