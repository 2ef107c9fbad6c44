use serde::Deserialize;

use crate::domain::signup_email::SignupEmail;
use crate::domain::signup_name::FullName;

/// Wire shape of a signup submission. Absent fields deserialize to empty
/// strings so presence checks can produce the step-specific messages instead
/// of a serde error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRecordBody {
    #[serde(default)]
    pub submission_id: Option<String>,
    // Step 1: Basics
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub age_range: String,
    #[serde(default)]
    pub occupation: String,
    // Step 2: Current Situation
    #[serde(default)]
    pub current_tools: String,
    #[serde(default)]
    pub pain_points: String,
    // Step 3: Wants & Needs
    #[serde(default)]
    pub top_features: String,
    #[serde(default)]
    pub main_goal: String,
    // Step 4: Pricing & Closing
    #[serde(default)]
    pub willing_to_pay: String,
    #[serde(default)]
    pub price_justification: Option<String>,
    #[serde(default)]
    pub referral_source: String,
    // Metadata
    #[serde(default)]
    pub submitted_at: Option<String>,
}

/// A fully validated submission. Multi-value fields stay in their delimited
/// wire form; the spreadsheet row carries them verbatim.
#[derive(Debug)]
pub struct SignupRecord {
    pub full_name: FullName,
    pub email: SignupEmail,
    pub age_range: String,
    pub occupation: String,
    pub current_tools: String,
    pub pain_points: String,
    pub top_features: String,
    pub main_goal: String,
    pub willing_to_pay: String,
    pub price_justification: Option<String>,
    pub referral_source: String,
}

/// Validation failures keyed by form step. The messages are part of the API
/// contract and are surfaced verbatim in 400 responses.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SignupValidationError {
    #[error("Missing required fields in Step 1")]
    MissingBasics,
    #[error("Missing required fields in Step 2")]
    MissingCurrentSituation,
    #[error("Missing required fields in Step 3")]
    MissingWants,
    #[error("Missing required fields in Step 4")]
    MissingPricing,
    #[error("Invalid email format")]
    InvalidEmail,
}

impl TryFrom<SignupRecordBody> for SignupRecord {
    type Error = SignupValidationError;

    // Groups are checked in step order and the first failure wins. The email
    // format check runs only after every group is known to be present.
    fn try_from(body: SignupRecordBody) -> Result<Self, Self::Error> {
        let full_name = FullName::parse(body.full_name)
            .map_err(|_| SignupValidationError::MissingBasics)?;

        if body.email.is_empty() || body.age_range.is_empty() || body.occupation.is_empty() {
            return Err(SignupValidationError::MissingBasics);
        }

        if body.current_tools.is_empty() || body.pain_points.is_empty() {
            return Err(SignupValidationError::MissingCurrentSituation);
        }

        if body.top_features.is_empty() || body.main_goal.is_empty() {
            return Err(SignupValidationError::MissingWants);
        }

        if body.willing_to_pay.is_empty() || body.referral_source.is_empty() {
            return Err(SignupValidationError::MissingPricing);
        }

        let email =
            SignupEmail::parse(body.email).map_err(|_| SignupValidationError::InvalidEmail)?;

        Ok(SignupRecord {
            full_name,
            email,
            age_range: body.age_range,
            occupation: body.occupation,
            current_tools: body.current_tools,
            pain_points: body.pain_points,
            top_features: body.top_features,
            main_goal: body.main_goal,
            willing_to_pay: body.willing_to_pay,
            price_justification: body.price_justification,
            referral_source: body.referral_source,
        })
    }
}

impl SignupRecord {
    /// Column layout of the waitlist sheet, A through M.
    pub fn to_sheet_row(&self, timestamp: &str, submission_id: &str) -> Vec<String> {
        vec![
            timestamp.to_string(),
            submission_id.to_string(),
            self.full_name.as_ref().to_string(),
            self.email.as_ref().to_string(),
            self.age_range.clone(),
            self.occupation.clone(),
            self.current_tools.clone(),
            self.pain_points.clone(),
            self.top_features.clone(),
            self.main_goal.clone(),
            self.willing_to_pay.clone(),
            self.price_justification.clone().unwrap_or_default(),
            self.referral_source.clone(),
        ]
    }
}
