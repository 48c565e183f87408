//! Balance, ledger history, and entitlement integration tests.

mod common;

use common::TestHarness;

// ============================================================================
// Balance
// ============================================================================

#[tokio::test]
async fn get_balance_after_purchase() {
    let harness = TestHarness::new();
    harness.purchase("evt_balance_1", 25, false).await;

    let response = harness
        .server
        .get("/v1/credits/balance")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["credits_remaining"], 25);
}

#[tokio::test]
async fn get_balance_without_account_fails() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get("/v1/credits/balance")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn get_balance_without_auth_fails() {
    let harness = TestHarness::new();

    let response = harness.server.get("/v1/credits/balance").await;

    response.assert_status_unauthorized();
}

// ============================================================================
// Ledger entries
// ============================================================================

#[tokio::test]
async fn list_entries_shows_purchases_and_debits() {
    let harness = TestHarness::new();
    harness.purchase("evt_entries_1", 10, false).await;

    harness
        .server
        .post("/v1/tools/run")
        .add_header("authorization", harness.user_auth_header())
        .json(&serde_json::json!({
            "tool_id": "summarizer",
            "model": "gpt-4",
            "prompt": "Summarize this"
        }))
        .await
        .assert_status_ok();

    let response = harness
        .server
        .get("/v1/credits/entries")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let entries = body["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(body["has_more"], false);

    // Newest first: the debit precedes the purchase
    assert_eq!(entries[0]["kind"], "debit");
    assert_eq!(entries[0]["amount"], -2);
    assert_eq!(entries[1]["kind"], "purchase");
    assert_eq!(entries[1]["amount"], 10);
}

#[tokio::test]
async fn list_entries_with_pagination() {
    let harness = TestHarness::new();
    harness.purchase("evt_page_1", 5, false).await;
    harness.purchase("evt_page_2", 5, false).await;
    harness.purchase("evt_page_3", 5, false).await;

    let response = harness
        .server
        .get("/v1/credits/entries?limit=2&offset=0")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["entries"].as_array().unwrap().len(), 2);
    assert_eq!(body["has_more"], true);

    let response = harness
        .server
        .get("/v1/credits/entries?limit=2&offset=2")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["entries"].as_array().unwrap().len(), 1);
    assert_eq!(body["has_more"], false);
}

#[tokio::test]
async fn list_entries_without_account_fails() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get("/v1/credits/entries")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn entries_are_isolated_per_user() {
    let harness = TestHarness::new();
    harness.purchase("evt_iso_1", 10, false).await;

    // Another user with no account sees nothing
    let response = harness
        .server
        .get("/v1/credits/entries")
        .add_header("authorization", TestHarness::other_user_auth_header())
        .await;

    response.assert_status_not_found();
}

// ============================================================================
// Entitlement
// ============================================================================

#[tokio::test]
async fn entitlement_defaults_to_not_premium() {
    let harness = TestHarness::new();
    harness.purchase("evt_ent_1", 10, false).await;

    let response = harness
        .server
        .get("/v1/entitlement")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["is_premium"], false);
    assert!(body.get("premium_expires").is_none());
}

#[tokio::test]
async fn entitlement_reflects_premium_purchase() {
    let harness = TestHarness::new();
    harness.purchase("evt_ent_2", 10, true).await;

    let response = harness
        .server
        .get("/v1/entitlement")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["is_premium"], true);
    assert!(body["premium_expires"].as_str().is_some());
}

#[tokio::test]
async fn entitlement_without_account_fails() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get("/v1/entitlement")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_not_found();
}
