use actix_web::{web, HttpRequest, HttpResponse, Responder};
use chrono::{SecondsFormat, Utc};
use serde_json::json;

use crate::domain::signup_record::{SignupRecord, SignupRecordBody};
use crate::sheets::{SheetsClient, SheetsError};
use crate::startup::SheetsIntegration;

const SUBMISSION_ID_HEADER: &str = "X-Submission-ID";
const UNEXPECTED_FAILURE_MESSAGE: &str = "Failed to process sign-up. Please try again.";

/// Where an accepted submission ended up. The user-facing flow reports
/// success for all three; the distinction is kept explicit so reconciliation
/// tooling can tell delivered rows from log-only ones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignupStorage {
    /// Appended to the external spreadsheet.
    Spreadsheet,
    /// The integration is unconfigured; the record only exists in the log.
    ConsoleLog,
    /// The append failed at runtime; the record was logged as a backup.
    BackupLog,
}

impl SignupStorage {
    pub fn message(&self) -> &'static str {
        match self {
            SignupStorage::Spreadsheet => "Sign-up recorded successfully",
            SignupStorage::ConsoleLog => "Sign-up recorded successfully (console mode)",
            SignupStorage::BackupLog => "Sign-up recorded (backup mode)",
        }
    }
}

#[tracing::instrument(
    name = "Submit signup handler",
    skip(request, body, sheets),
    fields(submission_id = tracing::field::Empty)
)]
pub async fn handle_submit_signup(
    request: HttpRequest,
    body: web::Bytes,
    sheets: web::Data<SheetsIntegration>,
) -> impl Responder {
    // A body that is not JSON at all is an unexpected failure, not a
    // validation one; field-level gaps are handled by the record validation.
    let parsed: SignupRecordBody = match serde_json::from_slice(&body) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::error!("Sign-up submission error: {:?}", err);
            return HttpResponse::InternalServerError()
                .json(json!({ "error": UNEXPECTED_FAILURE_MESSAGE }));
        }
    };

    // The header is the preferred source of truth for the submission id.
    let submission_id = request
        .headers()
        .get(SUBMISSION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(String::from)
        .or_else(|| parsed.submission_id.clone())
        .unwrap_or_else(|| String::from("unknown"));
    tracing::Span::current().record("submission_id", submission_id.as_str());

    let record: SignupRecord = match parsed.try_into() {
        Ok(record) => record,
        Err(err) => {
            tracing::warn!("Validation error: {}", err);
            return HttpResponse::BadRequest().json(json!({ "error": err.to_string() }));
        }
    };

    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let storage = store_signup(&record, &submission_id, &timestamp, sheets.get_ref()).await;

    HttpResponse::Ok().json(json!({
        "success": true,
        "message": storage.message(),
        "submissionId": submission_id,
    }))
}

/// Availability over consistency: every path out of here is a success from
/// the submitter's point of view. A record that cannot reach the spreadsheet
/// is logged instead and the failure stays server-side.
async fn store_signup(
    record: &SignupRecord,
    submission_id: &str,
    timestamp: &str,
    sheets: &SheetsIntegration,
) -> SignupStorage {
    let Some(client) = sheets.client() else {
        log_submission(record, submission_id, timestamp);
        tracing::info!("Google Sheets is not configured. Submission recorded to the log only.");
        return SignupStorage::ConsoleLog;
    };

    match append_to_spreadsheet(client, record, submission_id, timestamp).await {
        Ok(()) => {
            tracing::info!("Waitlist submission saved to Google Sheets: {}", submission_id);
            SignupStorage::Spreadsheet
        }
        Err(err) => {
            tracing::error!("Google Sheets error: {:?}", err);
            log_submission(record, submission_id, timestamp);
            SignupStorage::BackupLog
        }
    }
}

async fn append_to_spreadsheet(
    client: &SheetsClient,
    record: &SignupRecord,
    submission_id: &str,
    timestamp: &str,
) -> Result<(), SheetsError> {
    let access_token = client.fetch_access_token().await?;
    let row = record.to_sheet_row(timestamp, submission_id);

    client.append_row(&access_token, &row).await
}

/// The durability backstop: one structured event carrying the full record.
fn log_submission(record: &SignupRecord, submission_id: &str, timestamp: &str) {
    tracing::info!(
        submission_id,
        timestamp,
        full_name = record.full_name.as_ref(),
        email = record.email.as_ref(),
        age_range = %record.age_range,
        occupation = %record.occupation,
        current_tools = %record.current_tools,
        pain_points = %record.pain_points,
        top_features = %record.top_features,
        main_goal = %record.main_goal,
        willing_to_pay = %record.willing_to_pay,
        price_justification = record.price_justification.as_deref().unwrap_or("Not provided"),
        referral_source = %record.referral_source,
        "New waitlist submission"
    );
}
