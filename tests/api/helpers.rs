use reqwest::Response;
use secrecy::Secret;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use waitlist_api::config::get_configuration;
use waitlist_api::startup::Application;

const TEST_PRIVATE_KEY: &str = include_str!("fixtures/test_service_account_key.pem");

pub const TEST_SPREADSHEET_ID: &str = "test-spreadsheet-id";
pub const APPEND_PATH: &str = "/v4/spreadsheets/test-spreadsheet-id/values/Sheet1!A:M:append";
pub const PROBE_PATH: &str = "/v4/spreadsheets/test-spreadsheet-id/values/Sheet1!A1:A1";

pub struct TestApp {
    pub address: String,
    pub sheets_server: Option<MockServer>,
}

impl TestApp {
    /// Spawns the application without Sheets credentials (console mode).
    pub async fn spawn_app() -> TestApp {
        TestApp::spawn(false).await
    }

    /// Spawns the application with test credentials pointing at a wiremock
    /// server standing in for both the token endpoint and the Sheets API.
    pub async fn spawn_app_with_sheets() -> TestApp {
        TestApp::spawn(true).await
    }

    async fn spawn(with_sheets: bool) -> TestApp {
        let mut config = get_configuration().expect("Missing configuration file.");

        // We are using port 0 as way to define a different port per each test. Port 0 is a special case that operating systems
        // take into account: when port is 0, the OS will search for the first available port
        config.set_app_port(0);
        // Ambient GOOGLE_SHEETS_* variables must not leak into the tests
        config.sheets.clear_credentials();

        let sheets_server = if with_sheets {
            let server = MockServer::start().await;

            config
                .sheets
                .set_token_url(format!("{}/token", server.uri()));
            config.sheets.set_api_base_url(server.uri());
            config.sheets.set_credentials(
                String::from(TEST_SPREADSHEET_ID),
                String::from("sheets-bot@test-project.iam.gserviceaccount.com"),
                Secret::new(TEST_PRIVATE_KEY.to_string()),
            );

            Some(server)
        } else {
            None
        };

        let application = Application::build(config)
            .await
            .expect("Failed to build application.");
        let address = format!("http://127.0.0.1:{}", application.get_port());

        tokio::spawn(application.run_until_stop());

        TestApp {
            address,
            sheets_server,
        }
    }

    pub fn sheets_server(&self) -> &MockServer {
        self.sheets_server
            .as_ref()
            .expect("The test app was spawned without a Sheets mock server.")
    }

    pub async fn post_signup(&self, body: &serde_json::Value) -> Response {
        let client = reqwest::Client::new();
        let url = format!("{}/api/submit-signup", self.address);

        client
            .post(&url)
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_signup_raw(&self, body: String) -> Response {
        let client = reqwest::Client::new();
        let url = format!("{}/api/submit-signup", self.address);

        client
            .post(&url)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_test_sheets(&self) -> Response {
        let client = reqwest::Client::new();
        let url = format!("{}/api/test-sheets", self.address);

        client
            .get(&url)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

/// A body that passes every validation group.
pub fn valid_signup_body() -> serde_json::Value {
    serde_json::json!({
        "submissionId": "11111111-2222-3333-4444-555555555555",
        "fullName": "Ada Lovelace",
        "email": "ada@example.com",
        "ageRange": "25-34",
        "occupation": "Engineer",
        "currentTools": "Notion, Spreadsheets",
        "painPoints": "Forgetting tasks & deadlines",
        "topFeatures": "Smart daily planning, Habit builder",
        "mainGoal": "Build better habits",
        "willingToPay": "10-19",
        "priceJustification": "If it truly works",
        "referralSource": "Friend referral",
        "submittedAt": "2024-05-01T10:00:00.000Z"
    })
}

pub async fn mount_token_success(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "test-access-token",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .mount(server)
        .await;
}
