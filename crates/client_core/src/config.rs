use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use tracing::warn;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_CONFIG_FILE: &str = "console.toml";
pub const DEFAULT_PAGE_SIZE: u32 = 5;
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_UPLOAD_LINGER_MS: u64 = 2_000;

/// What the transport does after the backend answers 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnauthorizedPolicy {
    /// Clear the persisted session so the next private route redirects to login.
    #[default]
    Logout,
    /// Log the response and leave the session untouched.
    Ignore,
}

impl UnauthorizedPolicy {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "logout" => Some(Self::Logout),
            "ignore" | "log" => Some(Self::Ignore),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub auth_url: Option<String>,
    pub clients_url: Option<String>,
    pub policies_url: Option<String>,
    pub payments_url: Option<String>,
    pub search_url: Option<String>,
    pub notes_url: Option<String>,
    pub page_size: u32,
    pub search_debounce_ms: u64,
    pub upload_linger_ms: u64,
    pub session_file: PathBuf,
    pub export_dir: PathBuf,
    pub unauthorized: UnauthorizedPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            auth_url: None,
            clients_url: None,
            policies_url: None,
            payments_url: None,
            search_url: None,
            notes_url: None,
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
            upload_linger_ms: DEFAULT_UPLOAD_LINGER_MS,
            session_file: default_session_file(),
            export_dir: default_export_dir(),
            unauthorized: UnauthorizedPolicy::default(),
        }
    }
}

impl Settings {
    pub fn auth_url(&self) -> &str {
        self.auth_url.as_deref().unwrap_or(&self.api_url)
    }

    pub fn clients_url(&self) -> &str {
        self.clients_url.as_deref().unwrap_or(&self.api_url)
    }

    pub fn policies_url(&self) -> &str {
        self.policies_url.as_deref().unwrap_or(&self.api_url)
    }

    pub fn payments_url(&self) -> &str {
        self.payments_url.as_deref().unwrap_or(&self.api_url)
    }

    pub fn search_url(&self) -> &str {
        self.search_url.as_deref().unwrap_or(&self.api_url)
    }

    pub fn notes_url(&self) -> &str {
        self.notes_url.as_deref().unwrap_or(&self.api_url)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn upload_linger(&self) -> Duration {
        Duration::from_millis(self.upload_linger_ms)
    }

    fn apply(&mut self, key: &str, value: &str) {
        match key {
            "api_url" => self.api_url = normalize_base_url(value),
            "auth_url" => self.auth_url = Some(normalize_base_url(value)),
            "clients_url" => self.clients_url = Some(normalize_base_url(value)),
            "policies_url" => self.policies_url = Some(normalize_base_url(value)),
            "payments_url" => self.payments_url = Some(normalize_base_url(value)),
            "search_url" => self.search_url = Some(normalize_base_url(value)),
            "notes_url" => self.notes_url = Some(normalize_base_url(value)),
            "page_size" => match value.trim().parse::<u32>() {
                Ok(parsed) if parsed > 0 => self.page_size = parsed,
                _ => warn!(value, "ignoring invalid page_size"),
            },
            "search_debounce_ms" => match value.trim().parse::<u64>() {
                Ok(parsed) => self.search_debounce_ms = parsed,
                Err(_) => warn!(value, "ignoring invalid search_debounce_ms"),
            },
            "upload_linger_ms" => match value.trim().parse::<u64>() {
                Ok(parsed) => self.upload_linger_ms = parsed,
                Err(_) => warn!(value, "ignoring invalid upload_linger_ms"),
            },
            "session_file" => self.session_file = PathBuf::from(value),
            "export_dir" => self.export_dir = PathBuf::from(value),
            "unauthorized" => match UnauthorizedPolicy::parse(value) {
                Some(policy) => self.unauthorized = policy,
                None => warn!(value, "ignoring unknown unauthorized policy"),
            },
            _ => {}
        }
    }
}

const SETTING_KEYS: &[&str] = &[
    "api_url",
    "auth_url",
    "clients_url",
    "policies_url",
    "payments_url",
    "search_url",
    "notes_url",
    "page_size",
    "search_debounce_ms",
    "upload_linger_ms",
    "session_file",
    "export_dir",
    "unauthorized",
];

/// Defaults, then the optional config file, then `APP__*` environment
/// variables. `BROKER_API_URL` is accepted as a shorthand for the API base.
pub fn load_settings(config_path: Option<&Path>) -> Settings {
    let mut settings = Settings::default();

    let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<HashMap<String, toml::Value>>(&raw) {
            Ok(file_cfg) => {
                for (key, value) in &file_cfg {
                    let value = match value {
                        toml::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    settings.apply(key, &value);
                }
            }
            Err(err) => warn!(path = %path.display(), %err, "ignoring unreadable config file"),
        }
    }

    if let Ok(v) = std::env::var("BROKER_API_URL") {
        settings.apply("api_url", &v);
    }
    for key in SETTING_KEYS {
        let env_key = format!("APP__{}", key.to_ascii_uppercase());
        if let Ok(v) = std::env::var(&env_key) {
            settings.apply(key, &v);
        }
    }

    settings
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn default_session_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("broker-console")
        .join("session.json")
}

fn default_export_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn service_urls_fall_back_to_api_base() {
        let mut settings = Settings::default();
        settings.apply("api_url", "http://broker.test/api/");
        settings.apply("search_url", "http://search.test/api");

        assert_eq!(settings.api_url, "http://broker.test/api");
        assert_eq!(settings.clients_url(), "http://broker.test/api");
        assert_eq!(settings.search_url(), "http://search.test/api");
    }

    #[test]
    fn invalid_numbers_keep_defaults() {
        let mut settings = Settings::default();
        settings.apply("page_size", "zero");
        settings.apply("page_size", "0");
        settings.apply("search_debounce_ms", "-5");
        assert_eq!(settings.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(settings.search_debounce(), Duration::from_millis(300));
    }

    #[test]
    fn reads_flat_keys_from_config_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "api_url = \"http://file.test/api\"\npage_size = 10\nunauthorized = \"ignore\""
        )
        .expect("write config");

        let settings = load_settings(Some(file.path()));
        assert_eq!(settings.page_size, 10);
        assert_eq!(settings.unauthorized, UnauthorizedPolicy::Ignore);
    }
}
