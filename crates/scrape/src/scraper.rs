use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use tracing::{info, warn};

use advisor_core::{AdvisorConfig, Program, ProgramConfig};
use advisor_rag::Repository;

use crate::html::{extract_faq_text, find_plan_link};

const DEFAULT_PLAN_EXT: &str = ".pdf";

/// A program page as stored after sync, with the plan file when one was
/// downloaded.
#[derive(Debug, Clone)]
pub struct SyncedProgram {
    pub program: Program,
    pub plan_path: Option<PathBuf>,
}

pub struct Scraper {
    http: Client,
    repo: Repository,
    config: AdvisorConfig,
}

impl Scraper {
    pub fn new(config: AdvisorConfig, repo: Repository) -> Result<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("failed to build http client")?;
        Ok(Self { http, repo, config })
    }

    pub fn fetch(&self, url: &str) -> Result<String> {
        self.http
            .get(url)
            .send()
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("{url} returned an error"))?
            .text()
            .with_context(|| format!("failed to read body of {url}"))
    }

    /// Fetches the program page and stores it with its plan link and FAQ.
    pub fn sync_program(&self, cfg: &ProgramConfig) -> Result<Program> {
        let html = self.fetch(&cfg.url)?;
        let plan_url = find_plan_link(&html, &self.config.site_origin);
        let faq_text = extract_faq_text(&html);
        info!(
            program = %cfg.code,
            plan = plan_url.as_deref().unwrap_or("-"),
            faq_chars = faq_text.chars().count(),
            "program page synced"
        );
        let program = Program {
            code: cfg.code.clone(),
            name: cfg.name.clone(),
            url: cfg.url.clone(),
            plan_url,
            about_html: Some(html),
            faq_text: Some(faq_text),
        };
        self.repo.upsert_program(&program)?;
        Ok(program)
    }

    /// Saves the plan document under `{data_dir}/plans/{code}{ext}`. Any
    /// failure is logged and yields `None`.
    pub fn download_plan(&self, program: &Program) -> Option<PathBuf> {
        let url = program.plan_url.as_deref()?;
        let path = self
            .config
            .plans_dir()
            .join(format!("{}{}", program.code, plan_extension(url)));
        match self.save_plan(url, &path) {
            Ok(bytes) => {
                info!(program = %program.code, path = %path.display(), bytes, "plan downloaded");
                Some(path)
            }
            Err(err) => {
                warn!(program = %program.code, url, "plan download failed: {err:#}");
                None
            }
        }
    }

    fn save_plan(&self, url: &str, path: &Path) -> Result<usize> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let body = self
            .http
            .get(url)
            .send()
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("{url} returned an error"))?
            .bytes()
            .context("failed to read plan body")?;
        fs::write(path, &body).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(body.len())
    }

    /// Syncs every configured program, pausing between page and plan
    /// requests.
    pub fn full_sync(&self) -> Result<Vec<SyncedProgram>> {
        let delay = Duration::from_millis(self.config.request_delay_ms);
        let mut synced = Vec::with_capacity(self.config.programs.len());
        for cfg in &self.config.programs {
            let program = self.sync_program(cfg)?;
            if !delay.is_zero() {
                thread::sleep(delay);
            }
            let plan_path = self.download_plan(&program);
            synced.push(SyncedProgram { program, plan_path });
        }
        Ok(synced)
    }
}

/// Extension of the URL's last path segment, query and fragment ignored.
pub fn plan_extension(url: &str) -> &str {
    let path = url.split(|c: char| c == '?' || c == '#').next().unwrap_or(url);
    let path = path
        .split_once("://")
        .map(|(_, rest)| rest.split_once('/').map(|(_, p)| p).unwrap_or(""))
        .unwrap_or(path);
    let segment = path.rsplit('/').next().unwrap_or(path);
    match segment.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < segment.len() => &segment[idx..],
        _ => DEFAULT_PLAN_EXT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn extension_comes_from_path() {
        assert_eq!(plan_extension("https://abit.itmo.ru/f/plan.docx?v=3"), ".docx");
        assert_eq!(plan_extension("https://abit.itmo.ru/f/plan.PDF"), ".PDF");
        assert_eq!(plan_extension("https://abit.itmo.ru/api/file/42"), ".pdf");
        assert_eq!(plan_extension("https://abit.itmo.ru"), ".pdf");
        assert_eq!(plan_extension("/files/.hidden"), ".pdf");
    }

    #[test]
    fn missing_plan_url_skips_download() {
        let dir = tempdir().unwrap();
        let mut config = AdvisorConfig::default();
        config.set_data_dir(dir.path().to_path_buf());
        let repo = Repository::open(&config.db_path).unwrap();
        let scraper = Scraper::new(config, repo).unwrap();
        let program = Program {
            code: "ai".into(),
            ..Program::default()
        };
        assert_eq!(scraper.download_plan(&program), None);
        assert!(!dir.path().join("plans").exists());
    }

    #[test]
    fn unreachable_plan_is_logged_not_fatal() {
        let dir = tempdir().unwrap();
        let mut config = AdvisorConfig::default();
        config.set_data_dir(dir.path().to_path_buf());
        config.request_timeout_secs = 1;
        let repo = Repository::open(&config.db_path).unwrap();
        let scraper = Scraper::new(config, repo).unwrap();
        let program = Program {
            code: "ai".into(),
            plan_url: Some("http://127.0.0.1:9/plan.pdf".into()),
            ..Program::default()
        };
        assert_eq!(scraper.download_plan(&program), None);
        assert!(!dir.path().join("plans/ai.pdf").exists());
    }
}
