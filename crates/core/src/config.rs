use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{AdvisorError, Result};

pub const DEFAULT_CONFIG: &str = "advisor.toml";
pub const DEFAULT_SITE_ORIGIN: &str = "https://abit.itmo.ru";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (itmo-advisor-bot)";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 25;
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 500;
pub const DB_FILE_NAME: &str = "itmo_advisor.db";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProgramConfig {
    pub code: String,
    pub name: String,
    pub url: String,
}

impl ProgramConfig {
    fn new(code: &str, name: &str, url: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

pub fn default_programs() -> Vec<ProgramConfig> {
    vec![
        ProgramConfig::new(
            "ai",
            "Искусственный интеллект",
            "https://abit.itmo.ru/program/master/ai",
        ),
        ProgramConfig::new(
            "ai_product",
            "Управление ИИ-продуктами (AI Product)",
            "https://abit.itmo.ru/program/master/ai_product",
        ),
    ]
}

#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub site_origin: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub request_delay_ms: u64,
    pub telegram_token: Option<String>,
    pub webhook_bind: Option<String>,
    /// Expected `X-Telegram-Bot-Api-Secret-Token` on webhook requests.
    pub webhook_secret: Option<String>,
    pub programs: Vec<ProgramConfig>,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        let data_dir = PathBuf::from("data");
        Self {
            db_path: data_dir.join(DB_FILE_NAME),
            data_dir,
            site_origin: DEFAULT_SITE_ORIGIN.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            telegram_token: None,
            webhook_bind: None,
            webhook_secret: None,
            programs: default_programs(),
        }
    }
}

/// On-disk shape of `advisor.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    data_dir: Option<PathBuf>,
    db_path: Option<PathBuf>,
    site_origin: Option<String>,
    user_agent: Option<String>,
    request_timeout_secs: Option<u64>,
    request_delay_ms: Option<u64>,
    telegram_token: Option<String>,
    webhook_bind: Option<String>,
    webhook_secret: Option<String>,
    programs: Option<Vec<ProgramConfig>>,
}

impl AdvisorConfig {
    /// Defaults, then the TOML file (if present), then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG));
        let mut config = Self::from_file(path)?;
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: FileConfig = toml::from_str(contents)?;
        let mut config = Self::default();
        if let Some(data_dir) = file.data_dir {
            config.set_data_dir(data_dir);
        }
        if let Some(db_path) = file.db_path {
            config.db_path = db_path;
        }
        if let Some(origin) = file.site_origin {
            config.site_origin = origin;
        }
        if let Some(agent) = file.user_agent {
            config.user_agent = agent;
        }
        if let Some(timeout) = file.request_timeout_secs {
            config.request_timeout_secs = timeout;
        }
        if let Some(delay) = file.request_delay_ms {
            config.request_delay_ms = delay;
        }
        config.telegram_token = file.telegram_token.or(config.telegram_token);
        config.webhook_bind = file.webhook_bind.or(config.webhook_bind);
        config.webhook_secret = file.webhook_secret.or(config.webhook_secret);
        if let Some(programs) = file.programs {
            if programs.is_empty() {
                return Err(AdvisorError::Other(
                    "config lists an empty `programs` table".to_string(),
                ));
            }
            config.programs = programs;
        }
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.apply_vars(|key| env::var(key).ok());
    }

    fn apply_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(dir) = non_empty("DATA_DIR") {
            self.set_data_dir(PathBuf::from(dir));
        }
        if let Some(db) = non_empty("DB_PATH") {
            self.db_path = PathBuf::from(db);
        }
        if let Some(agent) = non_empty("USER_AGENT") {
            self.user_agent = agent;
        }
        if let Some(timeout) = non_empty("REQUEST_TIMEOUT").and_then(|v| v.trim().parse().ok()) {
            self.request_timeout_secs = timeout;
        }
        if let Some(token) = non_empty("TELEGRAM_TOKEN") {
            self.telegram_token = Some(token);
        }
        if let Some(bind) = non_empty("WEBHOOK_BIND") {
            self.webhook_bind = Some(bind);
        }
        if let Some(secret) = non_empty("WEBHOOK_SECRET") {
            self.webhook_secret = Some(secret);
        }
    }

    /// Moves the database along with the data directory unless it was set
    /// explicitly somewhere else.
    pub fn set_data_dir(&mut self, data_dir: PathBuf) {
        if self.db_path == self.data_dir.join(DB_FILE_NAME) {
            self.db_path = data_dir.join(DB_FILE_NAME);
        }
        self.data_dir = data_dir;
    }

    pub fn plans_dir(&self) -> PathBuf {
        self.data_dir.join("plans")
    }

    pub fn program(&self, code: &str) -> Option<&ProgramConfig> {
        self.programs.iter().find(|p| p.code == code)
    }

    /// Like [`Self::program`], but an unknown code is an error.
    pub fn require_program(&self, code: &str) -> Result<&ProgramConfig> {
        self.program(code)
            .ok_or_else(|| AdvisorError::UnknownProgram(code.to_string()))
    }

    pub fn program_codes(&self) -> Vec<&str> {
        self.programs.iter().map(|p| p.code.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_itmo_programs() {
        let config = AdvisorConfig::default();
        assert_eq!(config.program_codes(), vec!["ai", "ai_product"]);
        assert_eq!(config.db_path, PathBuf::from("data").join(DB_FILE_NAME));
        assert_eq!(config.request_timeout_secs, 25);
        assert_eq!(config.plans_dir(), PathBuf::from("data").join("plans"));
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = AdvisorConfig::from_toml_str(
            r#"
            data_dir = "/tmp/advisor"
            request_delay_ms = 0

            [[programs]]
            code = "ai"
            name = "AI"
            url = "http://localhost/ai"
            "#,
        )
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/advisor"));
        assert_eq!(config.db_path, PathBuf::from("/tmp/advisor").join(DB_FILE_NAME));
        assert_eq!(config.request_delay_ms, 0);
        assert_eq!(config.programs.len(), 1);
        assert_eq!(config.program("ai").unwrap().url, "http://localhost/ai");
    }

    #[test]
    fn explicit_db_path_survives_data_dir_change() {
        let config = AdvisorConfig::from_toml_str(
            r#"
            db_path = "/var/lib/advisor.db"
            data_dir = "/tmp/advisor"
            "#,
        )
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/var/lib/advisor.db"));
    }

    #[test]
    fn env_vars_override_file() {
        let vars: HashMap<&str, &str> = [
            ("DATA_DIR", "/srv/data"),
            ("REQUEST_TIMEOUT", "5"),
            ("TELEGRAM_TOKEN", "123:abc"),
            ("WEBHOOK_SECRET", "s3cret"),
            ("USER_AGENT", "  "),
        ]
        .into_iter()
        .collect();
        let mut config = AdvisorConfig::default();
        config.apply_vars(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.data_dir, PathBuf::from("/srv/data"));
        assert_eq!(config.db_path, PathBuf::from("/srv/data").join(DB_FILE_NAME));
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.telegram_token.as_deref(), Some("123:abc"));
        assert_eq!(config.webhook_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AdvisorConfig::from_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.programs, default_programs());
    }

    #[test]
    fn unknown_program_code_is_an_error() {
        let config = AdvisorConfig::default();
        assert_eq!(config.require_program("ai_product").unwrap().code, "ai_product");
        let err = config.require_program("law").unwrap_err();
        assert!(matches!(err, AdvisorError::UnknownProgram(ref code) if code == "law"));
    }

    #[test]
    fn empty_program_list_is_rejected() {
        assert!(AdvisorConfig::from_toml_str("programs = []").is_err());
    }
}
