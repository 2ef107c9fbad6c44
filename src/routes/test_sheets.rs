use actix_web::{web, HttpResponse, Responder};
use chrono::{SecondsFormat, Utc};
use secrecy::ExposeSecret;
use serde_json::{json, Map, Value};

use crate::config::SheetsSettings;
use crate::startup::SheetsIntegration;

/// Operator-facing connectivity diagnostics for the Sheets integration:
/// credential presence and shape, token exchange, and a sample read.
#[tracing::instrument(name = "Sheets diagnostics handler", skip(settings, sheets))]
pub async fn handle_test_sheets(
    settings: web::Data<SheetsSettings>,
    sheets: web::Data<SheetsIntegration>,
) -> impl Responder {
    let mut diagnostics = Map::new();
    diagnostics.insert(
        String::from("timestamp"),
        json!(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    );

    describe_credentials(&settings, &mut diagnostics);

    let Some(client) = sheets.client() else {
        return HttpResponse::InternalServerError().json(json!({
            "success": false,
            "error": "Missing environment variables",
            "diagnostics": diagnostics,
        }));
    };

    match client.create_assertion() {
        Ok(assertion) => {
            diagnostics.insert(String::from("jwtCreated"), json!(true));
            diagnostics.insert(String::from("jwtLength"), json!(assertion.len()));
        }
        Err(err) => {
            diagnostics.insert(String::from("error"), json!(err.to_string()));
            return HttpResponse::InternalServerError().json(json!({
                "success": false,
                "error": "Exception during test",
                "diagnostics": diagnostics,
            }));
        }
    }

    let access_token = match client.fetch_access_token().await {
        Ok(access_token) => {
            diagnostics.insert(String::from("tokenObtained"), json!(true));
            access_token
        }
        Err(err) => {
            diagnostics.insert(String::from("tokenError"), json!(err.to_string()));
            return HttpResponse::InternalServerError().json(json!({
                "success": false,
                "error": "Failed to get access token",
                "diagnostics": diagnostics,
            }));
        }
    };

    match client.probe_read(&access_token).await {
        Ok(sample) => {
            diagnostics.insert(String::from("sheetsAccess"), json!(true));
            diagnostics.insert(String::from("testRead"), sample);

            HttpResponse::Ok().json(json!({
                "success": true,
                "message": "Google Sheets connection working!",
                "diagnostics": diagnostics,
            }))
        }
        Err(err) => {
            diagnostics.insert(String::from("sheetsError"), json!(err.to_string()));
            HttpResponse::InternalServerError().json(json!({
                "success": false,
                "error": "Failed to access spreadsheet",
                "diagnostics": diagnostics,
            }))
        }
    }
}

// Presence and shape only; never the credential values themselves.
fn describe_credentials(settings: &SheetsSettings, diagnostics: &mut Map<String, Value>) {
    let spreadsheet_id = match &settings.spreadsheet_id {
        Some(spreadsheet_id) => {
            let prefix: String = spreadsheet_id.chars().take(8).collect();
            format!("Set ({}...)", prefix)
        }
        None => String::from("NOT SET"),
    };
    diagnostics.insert(String::from("spreadsheetId"), json!(spreadsheet_id));

    let client_email = match &settings.client_email {
        Some(client_email) => format!("Set ({})", client_email),
        None => String::from("NOT SET"),
    };
    diagnostics.insert(String::from("clientEmail"), json!(client_email));

    let private_key = settings
        .private_key
        .as_ref()
        .map(|private_key| private_key.expose_secret().clone());
    diagnostics.insert(
        String::from("privateKeyLength"),
        json!(private_key.as_deref().map(str::len).unwrap_or(0)),
    );
    diagnostics.insert(
        String::from("privateKeyHasEscapedNewlines"),
        json!(private_key
            .as_deref()
            .map(|key| key.contains("\\n"))
            .unwrap_or(false)),
    );
    diagnostics.insert(
        String::from("privateKeyHasRealNewlines"),
        json!(private_key
            .as_deref()
            .map(|key| key.contains('\n'))
            .unwrap_or(false)),
    );
}
