use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use std::time;

use crate::config::SheetsSettings;

const REQUEST_TIMEOUT: time::Duration = time::Duration::from_secs(10);
const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const PROBE_RANGE: &str = "Sheet1!A1:A1";

/// Server-to-server Google Sheets client authenticated with a service
/// account. Every failure is typed so the submission endpoint can fall back
/// to logging without ever surfacing it to the end user.
pub struct SheetsClient {
    http_client: Client,
    token_url: String,
    api_base_url: String,
    spreadsheet_id: String,
    client_email: String,
    private_key: Secret<String>,
    sheet_range: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    #[error("Failed to sign the service account assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("Failed to reach the Google API: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Failed to get access token")]
    TokenRejected,
    #[error("Failed to append to spreadsheet")]
    AppendRejected,
    #[error("Failed to access spreadsheet")]
    ReadRejected,
}

#[derive(serde::Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: i64,
    iat: i64,
}

#[derive(serde::Deserialize)]
struct TokenResponse {
    access_token: Secret<String>,
}

#[derive(serde::Serialize)]
struct AppendBody<'a> {
    values: Vec<&'a [String]>,
}

impl SheetsClient {
    /// Builds a client only when all three credentials are configured.
    pub fn from_settings(settings: &SheetsSettings) -> Option<SheetsClient> {
        let spreadsheet_id = settings.spreadsheet_id.clone()?;
        let client_email = settings.client_email.clone()?;
        let private_key = settings.private_key.clone()?;

        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap();

        Some(SheetsClient {
            http_client,
            token_url: settings.get_token_url(),
            api_base_url: settings.get_api_base_url(),
            spreadsheet_id,
            client_email,
            private_key,
            sheet_range: settings.sheet_range.clone(),
        })
    }

    /// Signs the RS256 JWT-bearer assertion for the token endpoint. Escaped
    /// newlines in the key, as injected by most deployment UIs, are
    /// normalized before parsing the PEM.
    pub fn create_assertion(&self) -> Result<String, SheetsError> {
        let now = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: SPREADSHEETS_SCOPE,
            aud: &self.token_url,
            exp: now + ASSERTION_LIFETIME_SECS,
            iat: now,
        };

        let pem = self.private_key.expose_secret().replace("\\n", "\n");
        let encoding_key = EncodingKey::from_rsa_pem(pem.as_bytes())?;
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)?;

        Ok(assertion)
    }

    #[tracing::instrument(name = "Exchange the service account assertion for a token", skip(self))]
    pub async fn fetch_access_token(&self) -> Result<Secret<String>, SheetsError> {
        let assertion = self.create_assertion()?;

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&[
                ("grant_type", JWT_BEARER_GRANT_TYPE),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::error!("Token error: {}", error_body);
            return Err(SheetsError::TokenRejected);
        }

        let token: TokenResponse = response.json().await?;

        Ok(token.access_token)
    }

    #[tracing::instrument(
        name = "Append a row to the waitlist spreadsheet",
        skip(self, access_token, row)
    )]
    pub async fn append_row(
        &self,
        access_token: &Secret<String>,
        row: &[String],
    ) -> Result<(), SheetsError> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}:append?valueInputOption=USER_ENTERED",
            self.api_base_url, self.spreadsheet_id, self.sheet_range
        );
        let body = AppendBody { values: vec![row] };

        let response = self
            .http_client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", access_token.expose_secret()),
            )
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::error!("Google Sheets API error: {}", error_body);
            return Err(SheetsError::AppendRejected);
        }

        Ok(())
    }

    /// Reads a single cell, used by the diagnostics endpoint to prove the
    /// credentials can reach the spreadsheet.
    pub async fn probe_read(
        &self,
        access_token: &Secret<String>,
    ) -> Result<serde_json::Value, SheetsError> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.api_base_url, self.spreadsheet_id, PROBE_RANGE
        );

        let response = self
            .http_client
            .get(&url)
            .header(
                "Authorization",
                format!("Bearer {}", access_token.expose_secret()),
            )
            .send()
            .await?;

        if !response.status().is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::error!("Google Sheets API error: {}", error_body);
            return Err(SheetsError::ReadRejected);
        }

        Ok(response.json().await?)
    }
}
