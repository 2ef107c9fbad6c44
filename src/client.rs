use chrono::{SecondsFormat, Utc};
use reqwest::Client;
use std::time;
use uuid::Uuid;

use crate::form::SignupAnswers;

const REQUEST_TIMEOUT: time::Duration = time::Duration::from_secs(10);
const MULTI_VALUE_SEPARATOR: &str = ", ";

/// Posts frozen signup answers to the submission endpoint. Issues exactly one
/// request per call; duplicate-row protection is the caller disabling its
/// submit control while a request is in flight.
pub struct SignupClient {
    http_client: Client,
    base_url: String,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitSignupBody {
    submission_id: String,
    full_name: String,
    email: String,
    age_range: String,
    occupation: String,
    current_tools: String,
    pain_points: String,
    top_features: String,
    main_goal: String,
    willing_to_pay: String,
    price_justification: String,
    referral_source: String,
    submitted_at: String,
}

#[derive(serde::Deserialize)]
struct SubmitSignupResponse {
    #[serde(default)]
    message: String,
}

#[derive(serde::Deserialize)]
struct SubmitSignupErrorResponse {
    #[serde(default)]
    error: String,
}

/// What the server accepted, echoed back to the UI.
#[derive(Debug)]
pub struct SubmissionReceipt {
    pub submission_id: Uuid,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The server rejected the submission; the message is surfaced verbatim.
    #[error("{0}")]
    Rejected(String),
    #[error("Network error. Please check your connection and try again.")]
    Connection,
}

impl SignupClient {
    pub fn new(base_url: String, timeout: Option<time::Duration>) -> SignupClient {
        let http_client = Client::builder()
            .timeout(timeout.unwrap_or(REQUEST_TIMEOUT))
            .build()
            .unwrap();

        SignupClient {
            http_client,
            base_url,
        }
    }

    /// Stamps a fresh submission id and the current time, then issues the
    /// single POST. The id travels in the body and in the X-Submission-ID
    /// header so the server can correlate even a malformed body.
    pub async fn submit(&self, answers: &SignupAnswers) -> Result<SubmissionReceipt, SubmitError> {
        let url = format!("{}/api/submit-signup", self.base_url);
        let submission_id = Uuid::new_v4();
        let body = SubmitSignupBody {
            submission_id: submission_id.to_string(),
            full_name: answers.full_name.clone(),
            email: answers.email.clone(),
            age_range: answers.age_range.clone(),
            occupation: answers.occupation.clone(),
            current_tools: answers.current_tools.join(MULTI_VALUE_SEPARATOR),
            pain_points: answers.pain_points.join(MULTI_VALUE_SEPARATOR),
            top_features: answers.top_features.join(MULTI_VALUE_SEPARATOR),
            main_goal: answers.main_goal.clone(),
            willing_to_pay: answers.willing_to_pay.clone(),
            price_justification: answers.price_justification.clone(),
            referral_source: answers.referral_source.clone(),
            submitted_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        let response = self
            .http_client
            .post(&url)
            .header("X-Submission-ID", submission_id.to_string())
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                tracing::error!("Failed to reach the signup endpoint: {:?}", err);
                SubmitError::Connection
            })?;

        if !response.status().is_success() {
            let error: SubmitSignupErrorResponse =
                response.json().await.map_err(|_| SubmitError::Connection)?;
            let message = if error.error.is_empty() {
                String::from("Something went wrong. Please try again.")
            } else {
                error.error
            };

            return Err(SubmitError::Rejected(message));
        }

        let accepted: SubmitSignupResponse =
            response.json().await.map_err(|_| SubmitError::Connection)?;

        Ok(SubmissionReceipt {
            submission_id,
            message: accepted.message,
        })
    }
}
