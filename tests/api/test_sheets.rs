use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{mount_token_success, TestApp, PROBE_PATH};

#[tokio::test]
async fn diagnostics_report_missing_credentials_with_a_500() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app.get_test_sheets().await;

    assert_eq!(500, response.status().as_u16());

    let body: serde_json::Value = response.json().await.expect("Failed to parse response.");
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Missing environment variables");
    assert_eq!(body["diagnostics"]["spreadsheetId"], "NOT SET");
    assert_eq!(body["diagnostics"]["clientEmail"], "NOT SET");
    assert_eq!(body["diagnostics"]["privateKeyLength"], 0);
}

#[tokio::test]
async fn diagnostics_succeed_when_token_and_sample_read_work() {
    let test_app = TestApp::spawn_app_with_sheets().await;

    mount_token_success(test_app.sheets_server()).await;
    Mock::given(method("GET"))
        .and(path(PROBE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "range": "Sheet1!A1:A1",
            "values": [["Timestamp"]]
        })))
        .expect(1)
        .mount(test_app.sheets_server())
        .await;

    let response = test_app.get_test_sheets().await;

    assert_eq!(200, response.status().as_u16());

    let body: serde_json::Value = response.json().await.expect("Failed to parse response.");
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Google Sheets connection working!");
    assert_eq!(body["diagnostics"]["jwtCreated"], true);
    assert_eq!(body["diagnostics"]["tokenObtained"], true);
    assert_eq!(body["diagnostics"]["sheetsAccess"], true);
    assert_eq!(
        body["diagnostics"]["testRead"]["values"][0][0],
        "Timestamp"
    );
}

#[tokio::test]
async fn diagnostics_fail_with_a_500_when_the_token_exchange_is_rejected() {
    let test_app = TestApp::spawn_app_with_sheets().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(test_app.sheets_server())
        .await;

    let response = test_app.get_test_sheets().await;

    assert_eq!(500, response.status().as_u16());

    let body: serde_json::Value = response.json().await.expect("Failed to parse response.");
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to get access token");
    assert_eq!(body["diagnostics"]["jwtCreated"], true);
}

#[tokio::test]
async fn diagnostics_fail_with_a_500_when_the_sample_read_is_rejected() {
    let test_app = TestApp::spawn_app_with_sheets().await;

    mount_token_success(test_app.sheets_server()).await;
    Mock::given(method("GET"))
        .and(path(PROBE_PATH))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(test_app.sheets_server())
        .await;

    let response = test_app.get_test_sheets().await;

    assert_eq!(500, response.status().as_u16());

    let body: serde_json::Value = response.json().await.expect("Failed to parse response.");
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to access spreadsheet");
    assert_eq!(body["diagnostics"]["tokenObtained"], true);
}

#[tokio::test]
async fn diagnostics_describe_the_credential_shape() {
    let test_app = TestApp::spawn_app_with_sheets().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(500))
        .mount(test_app.sheets_server())
        .await;

    let response = test_app.get_test_sheets().await;
    let body: serde_json::Value = response.json().await.expect("Failed to parse response.");
    let diagnostics = &body["diagnostics"];

    assert_eq!(diagnostics["spreadsheetId"], "Set (test-spr...)");
    assert_eq!(
        diagnostics["clientEmail"],
        "Set (sheets-bot@test-project.iam.gserviceaccount.com)"
    );
    assert!(diagnostics["privateKeyLength"].as_u64().unwrap() > 0);
    assert_eq!(diagnostics["privateKeyHasRealNewlines"], true);
    assert_eq!(diagnostics["privateKeyHasEscapedNewlines"], false);
}
