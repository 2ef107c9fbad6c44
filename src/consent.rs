use chrono::Utc;
use rand::Rng;
use std::collections::HashMap;

const CONSENT_KEY: &str = "cookie_consent";
const PREFERENCES_KEY: &str = "cookie_preferences";
const VISITOR_ID_KEY: &str = "visitor_id";
const VISITOR_ID_LENGTH: usize = 12;

/// Key-value persistence the consent store writes through. Browser-backed
/// sessions plug in their own storage; tests and native callers use
/// `MemoryBackend`.
pub trait ConsentBackend {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
}

impl ConsentBackend for MemoryBackend {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConsentPreferences {
    pub necessary: bool,
    pub analytics: bool,
    pub marketing: bool,
    pub timestamp: i64,
}

impl ConsentPreferences {
    /// Defaults written when the visitor accepts the banner.
    pub fn accepted_defaults() -> ConsentPreferences {
        ConsentPreferences {
            necessary: true,
            analytics: true,
            marketing: false,
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

/// Single owner of the session's consent state, injected into whatever needs
/// it instead of reaching for storage at call sites.
pub struct ConsentStore<B: ConsentBackend> {
    backend: B,
}

impl<B: ConsentBackend> ConsentStore<B> {
    pub fn new(backend: B) -> ConsentStore<B> {
        ConsentStore { backend }
    }

    pub fn has_consented(&self) -> bool {
        self.backend.read(CONSENT_KEY).as_deref() == Some("true")
    }

    pub fn set_consent(&mut self, accepted: bool) {
        self.backend.write(CONSENT_KEY, accepted.to_string());

        if accepted {
            self.set_preferences(&ConsentPreferences::accepted_defaults());
        }
    }

    /// Unreadable or missing stored preferences read back as None.
    pub fn preferences(&self) -> Option<ConsentPreferences> {
        let stored = self.backend.read(PREFERENCES_KEY)?;

        serde_json::from_str(&stored).ok()
    }

    pub fn set_preferences(&mut self, preferences: &ConsentPreferences) {
        let serialized =
            serde_json::to_string(preferences).expect("Failed to serialize consent preferences");

        self.backend.write(PREFERENCES_KEY, serialized);
    }

    /// Drops the consent flag and preferences. The visitor id survives so a
    /// returning visitor keeps a stable identity.
    pub fn clear(&mut self) {
        self.backend.remove(CONSENT_KEY);
        self.backend.remove(PREFERENCES_KEY);
    }

    /// Generated once, persisted afterwards.
    pub fn visitor_id(&mut self) -> String {
        if let Some(visitor_id) = self.backend.read(VISITOR_ID_KEY) {
            return visitor_id;
        }

        let visitor_id = generate_visitor_id();
        self.backend.write(VISITOR_ID_KEY, visitor_id.clone());

        visitor_id
    }

    /// A no-op unless the visitor consented to analytics.
    pub fn track_event(&self, event_name: &str, data: Option<&serde_json::Value>) {
        let analytics_allowed = self
            .preferences()
            .map(|preferences| preferences.analytics)
            .unwrap_or(false);

        if !analytics_allowed {
            return;
        }

        tracing::info!(event = event_name, payload = ?data, "Analytics event");
    }
}

fn generate_visitor_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = std::iter::repeat_with(|| rng.sample(rand::distributions::Alphanumeric))
        .map(char::from)
        .take(VISITOR_ID_LENGTH)
        .collect();

    format!("v_{}", suffix)
}
