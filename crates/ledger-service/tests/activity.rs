//! Activity log integration tests.

mod common;

use common::TestHarness;
use serde_json::json;

#[tokio::test]
async fn premium_user_activity_is_stored() {
    let harness = TestHarness::new();
    harness.purchase("evt_act_1", 10, true).await;

    let response = harness
        .server
        .post("/v1/activity")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({
            "tool_id": "summarizer",
            "inputs": {"prompt": "Summarize this"},
            "outputs": {"result": "A summary"}
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["stored"], true);
}

#[tokio::test]
async fn non_premium_user_activity_is_not_stored() {
    let harness = TestHarness::new();
    harness.purchase("evt_act_2", 10, false).await;

    let response = harness
        .server
        .post("/v1/activity")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({
            "tool_id": "summarizer",
            "inputs": {"prompt": "Summarize this"},
            "outputs": {"result": "A summary"}
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["stored"], false);
}

#[tokio::test]
async fn activity_with_missing_fields_fails() {
    let harness = TestHarness::new();
    harness.purchase("evt_act_3", 10, true).await;

    let response = harness
        .server
        .post("/v1/activity")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({
            "tool_id": "summarizer",
            "inputs": null,
            "outputs": {"result": "A summary"}
        }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn activity_without_auth_fails() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/activity")
        .json(&json!({
            "tool_id": "summarizer",
            "inputs": {},
            "outputs": {}
        }))
        .await;

    response.assert_status_unauthorized();
}
