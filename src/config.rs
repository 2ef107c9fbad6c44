use config::{Config, ConfigError, File};
use secrecy::Secret;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Debug)]
pub enum Environment {
    Development,
    Production,
}

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub sheets: SheetsSettings,
    pub waitlist: WaitlistSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub base_url: String,
}

/// Google Sheets integration settings. The three credentials are optional:
/// when any of them is absent the service runs in console mode and records
/// submissions to the log only.
#[derive(serde::Deserialize, Clone)]
pub struct SheetsSettings {
    pub token_url: String,
    pub api_base_url: String,
    pub sheet_range: String,
    pub spreadsheet_id: Option<String>,
    pub client_email: Option<String>,
    // secrecy protects secret information and prevents them to be exposed (eg: via logs)
    pub private_key: Option<Secret<String>>,
}

#[derive(serde::Deserialize, Clone)]
pub struct WaitlistSettings {
    pub base_url: String,
    pub api_key: Secret<String>,
}

impl Settings {
    pub fn get_address(&self) -> String {
        format!(
            "{}:{}",
            self.application.get_host(),
            self.application.get_port()
        )
    }

    pub fn get_app_base_url(&self) -> String {
        self.application.get_base_url()
    }

    pub fn set_app_port(&mut self, port: u16) {
        self.application.port = port;
    }
}

impl SheetsSettings {
    /// True when all three service-account credentials are present.
    pub fn has_credentials(&self) -> bool {
        self.spreadsheet_id.is_some() && self.client_email.is_some() && self.private_key.is_some()
    }

    pub fn get_token_url(&self) -> String {
        self.token_url.clone()
    }

    pub fn get_api_base_url(&self) -> String {
        self.api_base_url.clone()
    }

    pub fn set_token_url(&mut self, new_token_url: String) {
        self.token_url = new_token_url
    }

    pub fn set_api_base_url(&mut self, new_base_url: String) {
        self.api_base_url = new_base_url
    }

    pub fn set_credentials(
        &mut self,
        spreadsheet_id: String,
        client_email: String,
        private_key: Secret<String>,
    ) {
        self.spreadsheet_id = Some(spreadsheet_id);
        self.client_email = Some(client_email);
        self.private_key = Some(private_key);
    }

    pub fn clear_credentials(&mut self) {
        self.spreadsheet_id = None;
        self.client_email = None;
        self.private_key = None;
    }

    /// The raw GOOGLE_SHEETS_* variables take precedence over the
    /// configuration files, so deployments can inject credentials without
    /// touching config/.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(private_key) = std::env::var("GOOGLE_SHEETS_PRIVATE_KEY") {
            if !private_key.is_empty() {
                self.private_key = Some(Secret::new(private_key));
            }
        }
        if let Ok(client_email) = std::env::var("GOOGLE_SHEETS_CLIENT_EMAIL") {
            if !client_email.is_empty() {
                self.client_email = Some(client_email);
            }
        }
        if let Ok(spreadsheet_id) = std::env::var("GOOGLE_SHEETS_SPREADSHEET_ID") {
            if !spreadsheet_id.is_empty() {
                self.spreadsheet_id = Some(spreadsheet_id);
            }
        }
    }
}

impl ApplicationSettings {
    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub fn get_host(&self) -> String {
        self.host.clone()
    }

    pub fn get_base_url(&self) -> String {
        self.base_url.clone()
    }
}

impl WaitlistSettings {
    pub fn get_base_url(&self) -> String {
        self.base_url.clone()
    }

    pub fn get_api_key(&self) -> Secret<String> {
        self.api_key.clone()
    }

    pub fn set_base_url(&mut self, new_base_url: String) {
        self.base_url = new_base_url
    }
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            unknown_env => Err(format!(
                "{} is not supported environment. Use either 'development' or 'production'.",
                unknown_env
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let root_path = std::env::current_dir().expect("Failed to determine the current directory");
    let config_directory = root_path.join("config");
    // Uses development environment by default
    let enviroment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "development".into())
        .try_into()
        .expect("Failed to parse APP_ENVIRONMENT");
    let config_base_filepath = config_directory.join("base");
    let config_env_filepath = config_directory.join(enviroment.as_str());

    // It merges the base configuration file with the one from the specific environment (development or production)
    let settings = Config::builder()
        .add_source(File::from(config_base_filepath).required(true))
        .add_source(File::from(config_env_filepath).required(true))
        // Merge settings from environment variables with a prefix of APP and "__" separator
        // E.g APP_APPLICATION__PORT would set Settings.application.port
        .add_source(config::Environment::with_prefix("app").separator("__"))
        .build()?;

    tracing::info!("Application environment = {:?}", enviroment);

    // Try to convert the value from the configuration file into a Settings type
    let mut settings: Settings = settings.try_deserialize()?;
    settings.sheets.apply_env_overrides();

    Ok(settings)
}
