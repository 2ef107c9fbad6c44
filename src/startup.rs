use actix_web::dev::Server;
use actix_web::middleware::DefaultHeaders;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

use crate::config::{Settings, SheetsSettings};
use crate::routes::{handle_submit_signup, handle_test_sheets, health_check};
use crate::sheets::SheetsClient;

/// The Sheets integration if credentials are configured; None puts the
/// submission endpoint in console mode.
pub struct SheetsIntegration(Option<SheetsClient>);

impl SheetsIntegration {
    pub fn from_settings(settings: &SheetsSettings) -> SheetsIntegration {
        let client = SheetsClient::from_settings(settings);

        if client.is_none() {
            tracing::warn!(
                "Google Sheets credentials are not configured. Submissions will be logged only."
            );
        }

        SheetsIntegration(client)
    }

    pub fn client(&self) -> Option<&SheetsClient> {
        self.0.as_ref()
    }
}

pub struct Application {
    pub port: u16,
    pub server: Server,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, std::io::Error> {
        let sheets = SheetsIntegration::from_settings(&config.sheets);
        let listener =
            TcpListener::bind(config.get_address()).expect("Failed to bind the address.");
        let port = listener.local_addr()?.port();
        let server = run(listener, sheets, config.sheets.clone())?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stop(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    sheets: SheetsIntegration,
    sheets_settings: SheetsSettings,
) -> Result<Server, std::io::Error> {
    let sheets = web::Data::new(sheets);
    let sheets_settings = web::Data::new(sheets_settings);

    let server = HttpServer::new(move || {
        // App is where your application logic lives: routing, middlewares, request handler, etc
        App::new()
            // 'wrap' method adds a middleware to the App. This specific middleware provide incoming
            // request logger
            .wrap(TracingLogger::default())
            // Every response carries the same security headers, error paths included
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("X-Frame-Options", "DENY"))
                    .add(("X-XSS-Protection", "1; mode=block"))
                    .add(("Referrer-Policy", "strict-origin-when-cross-origin")),
            )
            .route("/health_check", web::get().to(health_check))
            .route("/api/submit-signup", web::post().to(handle_submit_signup))
            .route("/api/test-sheets", web::get().to(handle_test_sheets))
            .app_data(sheets.clone())
            .app_data(sheets_settings.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
