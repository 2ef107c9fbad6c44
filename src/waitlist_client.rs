use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use std::time;

const REQUEST_TIMEOUT: time::Duration = time::Duration::from_secs(10);
const DEFAULT_REFERRAL_SOURCE: &str = "organic";
const UNIQUE_VIOLATION_CODE: &str = "23505";

/// Client for the simple email-capture flow against the managed database's
/// REST API. Separate from the multi-step signup: this one only records an
/// email on the `waitlist` table and exposes the signup counter.
pub struct WaitlistClient {
    http_client: Client,
    base_url: String,
    api_key: Secret<String>,
}

#[derive(serde::Serialize)]
struct JoinWaitlistBody<'a> {
    email: String,
    name: Option<&'a str>,
    referral_source: &'a str,
}

#[derive(serde::Deserialize)]
struct RestError {
    #[serde(default)]
    code: String,
}

#[derive(Debug, thiserror::Error)]
pub enum WaitlistError {
    #[error("You're already on the list! 🎉")]
    AlreadyJoined,
    #[error("Something went wrong. Please try again.")]
    Failed,
}

impl WaitlistClient {
    pub fn from_settings(settings: &crate::config::WaitlistSettings) -> WaitlistClient {
        WaitlistClient::new(settings.get_base_url(), settings.get_api_key(), None)
    }

    pub fn new(
        base_url: String,
        api_key: Secret<String>,
        timeout: Option<time::Duration>,
    ) -> WaitlistClient {
        let http_client = Client::builder()
            .timeout(timeout.unwrap_or(REQUEST_TIMEOUT))
            .build()
            .unwrap();

        WaitlistClient {
            http_client,
            base_url,
            api_key,
        }
    }

    #[tracing::instrument(name = "Join the email waitlist", skip(self, email))]
    pub async fn join(
        &self,
        email: &str,
        name: Option<&str>,
        referral_source: Option<&str>,
    ) -> Result<(), WaitlistError> {
        let url = format!("{}/rest/v1/waitlist", self.base_url);
        let body = JoinWaitlistBody {
            email: email.trim().to_lowercase(),
            name,
            referral_source: referral_source.unwrap_or(DEFAULT_REFERRAL_SOURCE),
        };

        let response = self
            .http_client
            .post(&url)
            .header("apikey", self.api_key.expose_secret().as_str())
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Prefer", "return=minimal")
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                tracing::error!("Failed to reach the waitlist API: {:?}", err);
                WaitlistError::Failed
            })?;

        if response.status().is_success() {
            return Ok(());
        }

        let error: RestError = response.json().await.unwrap_or(RestError {
            code: String::new(),
        });

        if error.code == UNIQUE_VIOLATION_CODE {
            return Err(WaitlistError::AlreadyJoined);
        }

        Err(WaitlistError::Failed)
    }

    /// Exact waitlist size, read from the Content-Range header of a
    /// head-only count request.
    #[tracing::instrument(name = "Count waitlist signups", skip(self))]
    pub async fn count(&self) -> Result<u64, WaitlistError> {
        let url = format!("{}/rest/v1/waitlist?select=*", self.base_url);

        let response = self
            .http_client
            .head(&url)
            .header("apikey", self.api_key.expose_secret().as_str())
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Prefer", "count=exact")
            .send()
            .await
            .map_err(|err| {
                tracing::error!("Failed to reach the waitlist API: {:?}", err);
                WaitlistError::Failed
            })?;

        if !response.status().is_success() {
            return Err(WaitlistError::Failed);
        }

        response
            .headers()
            .get("Content-Range")
            .and_then(|value| value.to_str().ok())
            .and_then(|range| range.rsplit_once('/'))
            .and_then(|(_, total)| total.parse().ok())
            .ok_or(WaitlistError::Failed)
    }
}
