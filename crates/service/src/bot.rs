use std::collections::HashMap;

use anyhow::Result;
use parking_lot::Mutex;
use tracing::{error, info};

use advisor_core::{
    format_recommendations, AdvisorConfig, BackgroundPolicy, ElectiveRecommender, Session, Step,
    REPLY_LIMIT, SWITCHED, SYNC_DONE, WELCOME,
};
use advisor_rag::{QaService, Repository, Retriever};
use advisor_scrape::{sync_all, ProgramSummary};

pub const SYNC_FAILED: &str = "Не удалось обновить данные. Попробуйте позже.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Switch,
    Sync,
    Recommend,
    Other(String),
}

impl Command {
    /// `/name` or `/name@botname`, arguments ignored. Plain text is not a
    /// command.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.split_whitespace().next()?.strip_prefix('/')?;
        let name = word.split('@').next().unwrap_or(word).to_lowercase();
        Some(match name.as_str() {
            "start" => Command::Start,
            "switch" => Command::Switch,
            "sync" => Command::Sync,
            "recommend" => Command::Recommend,
            _ => Command::Other(name),
        })
    }
}

/// Refreshes the stored programs and courses.
pub trait DataSync: Send + Sync {
    fn sync(&self, config: &AdvisorConfig, repo: &Repository) -> Result<Vec<ProgramSummary>>;
}

/// Scrapes the live program pages.
pub struct WebSync;

impl DataSync for WebSync {
    fn sync(&self, config: &AdvisorConfig, repo: &Repository) -> Result<Vec<ProgramSummary>> {
        sync_all(config, repo)
    }
}

/// Chat state and command handling shared by every transport. All methods
/// block, so async callers go through `spawn_blocking`.
pub struct Bot {
    config: AdvisorConfig,
    repo: Repository,
    qa: QaService,
    recommender: ElectiveRecommender,
    sessions: Mutex<HashMap<i64, Session>>,
    data_sync: Box<dyn DataSync>,
}

impl Bot {
    pub fn new(config: AdvisorConfig, repo: Repository, qa: QaService) -> Self {
        Self::with_sync(config, repo, qa, Box::new(WebSync))
    }

    pub fn with_sync(
        config: AdvisorConfig,
        repo: Repository,
        qa: QaService,
        data_sync: Box<dyn DataSync>,
    ) -> Self {
        Self {
            config,
            repo,
            qa,
            recommender: ElectiveRecommender::new(),
            sessions: Mutex::new(HashMap::new()),
            data_sync,
        }
    }

    /// Opens the repository named in `config` and indexes what it holds.
    pub fn open(config: AdvisorConfig) -> Result<Self> {
        let repo = Repository::open(&config.db_path)?;
        let qa = QaService::new(Retriever::build(&repo)?.shared());
        Ok(Self::new(config, repo, qa))
    }

    pub fn session(&self, user_id: i64) -> Session {
        self.sessions.lock().get(&user_id).cloned().unwrap_or_default()
    }

    /// Reply to one incoming text. Unknown commands get no reply.
    pub fn reply(&self, user_id: i64, text: &str) -> Option<String> {
        let reply = match Command::parse(text) {
            Some(Command::Start) => {
                self.sessions.lock().insert(user_id, Session::new());
                WELCOME.to_string()
            }
            Some(Command::Switch) => {
                self.sessions
                    .lock()
                    .entry(user_id)
                    .or_default()
                    .switch_program();
                SWITCHED.to_string()
            }
            Some(Command::Sync) => self.sync(),
            Some(Command::Recommend) => self.recommend(user_id),
            Some(Command::Other(name)) => {
                info!(user_id, command = %name, "unknown command ignored");
                return None;
            }
            None => self.converse(user_id, text),
        };
        Some(reply)
    }

    fn converse(&self, user_id: i64, text: &str) -> String {
        let (step, program) = {
            let mut sessions = self.sessions.lock();
            let session = sessions.entry(user_id).or_default();
            let step = session.step(text, BackgroundPolicy::Strict);
            (step, session.program_code.clone())
        };
        match step {
            Step::Question(question) => self.qa.answer(program.as_deref(), &question),
            other => other.bot_reply().unwrap_or_default(),
        }
    }

    fn recommend(&self, user_id: i64) -> String {
        let session = self.session(user_id);
        if let Some(blocker) = session.recommendation_blocker() {
            return blocker.to_string();
        }
        let program = session.program_code.unwrap_or_default();
        let background = session.background_key.unwrap_or_default();
        match self.repo.list_courses(Some(&program)) {
            Ok(courses) => format_recommendations(&self.recommender.recommend(
                &courses,
                &background,
                REPLY_LIMIT,
            )),
            Err(err) => {
                error!(user_id, "failed to load courses: {err:#}");
                format_recommendations(&[])
            }
        }
    }

    fn sync(&self) -> String {
        let result = self
            .data_sync
            .sync(&self.config, &self.repo)
            .and_then(|summaries| {
                let retriever = Retriever::build(&self.repo)?;
                *self.qa.retriever().write() = retriever;
                Ok(summaries)
            });
        match result {
            Ok(summaries) => {
                for summary in &summaries {
                    info!("{summary}");
                }
                SYNC_DONE.to_string()
            }
            Err(err) => {
                error!("sync failed: {err:#}");
                SYNC_FAILED.to_string()
            }
        }
    }
}
