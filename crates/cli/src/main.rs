mod console;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use advisor_core::{
    map_background, AdvisorConfig, ElectiveRecommender, DEFAULT_LIMIT, NO_RECOMMENDATIONS,
};
use advisor_rag::{QaService, Repository, Retriever};
use advisor_scrape::sync_all;

use crate::console::{course_lines, Console};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const VERSION_LONG: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (features: ",
    env!("ADVISOR_FEATURES"),
    ")"
);

#[derive(Parser, Debug)]
#[command(
    name = "itmo-advisor",
    version = VERSION,
    long_version = VERSION_LONG,
    about = "Advisor for the ITMO AI and AI Product master's programs"
)]
struct Cli {
    /// TOML config file (default: advisor.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    #[arg(long = "data-dir", global = true)]
    data_dir: Option<PathBuf>,
    /// Scrape pages and re-parse curricula before running the command
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    sync: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scrape program pages, download plans and re-parse curricula
    Sync {
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    /// Interactive console (default)
    Chat,
    /// Run the Telegram bot
    Bot {
        /// Serve the webhook on this address instead of long polling
        #[arg(long)]
        webhook: Option<String>,
    },
    /// Answer one question
    Ask {
        #[arg(long)]
        program: Option<String>,
        #[arg(required = true)]
        question: Vec<String>,
    },
    /// Rank electives for a background
    Recommend {
        #[arg(long)]
        program: String,
        /// Background key or a free-form description
        #[arg(long)]
        background: String,
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
    },
    /// List stored programs
    Programs,
    /// List stored courses
    Courses {
        #[arg(long)]
        program: Option<String>,
        #[arg(long, action = ArgAction::SetTrue)]
        electives: bool,
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    /// Write the retrieval corpus as JSONL
    ExportCorpus {
        #[arg(short = 'o', long = "out")]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    let repo = Repository::open(&config.db_path)?;
    let command = cli.command.unwrap_or(Commands::Chat);

    if cli.sync && !matches!(command, Commands::Sync { .. }) {
        run_sync(&config, &repo, false)?;
    }

    match command {
        Commands::Sync { json } => run_sync(&config, &repo, json)?,
        Commands::Chat => {
            let qa = QaService::new(Retriever::build(&repo)?.shared());
            let stdin = io::stdin();
            Console::new(&repo, &qa).run(stdin.lock(), io::stdout())?;
        }
        Commands::Bot { webhook } => {
            let mut config = config;
            if webhook.is_some() {
                config.webhook_bind = webhook;
            }
            let runtime = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;
            runtime.block_on(advisor_bot::serve(config))?;
        }
        Commands::Ask { program, question } => {
            let program = checked_program(&config, program)?;
            let qa = QaService::new(Retriever::build(&repo)?.shared());
            println!("{}", qa.answer(program.as_deref(), &question.join(" ")));
        }
        Commands::Recommend {
            program,
            background,
            limit,
        } => {
            let program = checked_program(&config, Some(program))?.unwrap_or_default();
            let background = map_background(&background)
                .map(str::to_string)
                .unwrap_or_else(|| background.trim().to_lowercase());
            let courses = repo.list_courses(Some(&program))?;
            let recs = ElectiveRecommender::new().recommend(&courses, &background, limit);
            if recs.is_empty() {
                println!("{NO_RECOMMENDATIONS}");
            } else {
                println!("{}", course_lines(&recs));
            }
        }
        Commands::Programs => {
            for program in repo.list_programs()? {
                let courses = repo.list_courses(Some(&program.code))?.len();
                println!(
                    "{}\t{}\t{}\tplan: {}\tcourses: {}",
                    program.code,
                    program.name,
                    program.url,
                    program.plan_url.as_deref().unwrap_or("—"),
                    courses
                );
            }
        }
        Commands::Courses {
            program,
            electives,
            json,
        } => {
            let program = checked_program(&config, program)?;
            let courses = repo
                .list_courses(program.as_deref())?
                .into_iter()
                .filter(|c| !electives || c.is_elective());
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            for course in courses {
                if json {
                    serde_json::to_writer(&mut out, &course)?;
                    writeln!(out)?;
                } else {
                    writeln!(
                        out,
                        "{}\t{}\t{}\t{}\t{}",
                        course.program_code,
                        course.semester_label(),
                        course.kind.as_str(),
                        course.credits.map(|c| c.to_string()).unwrap_or_else(|| "—".into()),
                        course.name
                    )?;
                }
            }
            out.flush()?;
        }
        Commands::ExportCorpus { out } => {
            let retriever = Retriever::build(&repo)?;
            let written = match out {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("failed to create {}", path.display()))?;
                    let written = retriever.export_corpus(BufWriter::new(file))?;
                    info!(path = %path.display(), "corpus exported");
                    written
                }
                None => retriever.export_corpus(io::stdout().lock())?,
            };
            eprintln!("{written} documents");
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// File and environment first, then the command-line overrides.
fn resolve_config(cli: &Cli) -> Result<AdvisorConfig> {
    let mut config = AdvisorConfig::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.data_dir {
        config.set_data_dir(dir.clone());
    }
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    Ok(config)
}

fn checked_program(config: &AdvisorConfig, program: Option<String>) -> Result<Option<String>> {
    let Some(code) = program.map(|p| p.trim().to_lowercase()) else {
        return Ok(None);
    };
    config
        .require_program(&code)
        .with_context(|| format!("expected one of: {}", config.program_codes().join(", ")))?;
    Ok(Some(code))
}

fn run_sync(config: &AdvisorConfig, repo: &Repository, json: bool) -> Result<()> {
    let summaries = sync_all(config, repo)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        for summary in &summaries {
            println!("{summary}");
        }
        println!("Синхронизация завершена.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_core::AdvisorError;

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from([
            "itmo-advisor",
            "ask",
            "--program",
            "ai",
            "какие",
            "экзамены?",
            "--db",
            "/tmp/x.db",
            "--sync",
        ])
        .unwrap();
        assert!(cli.sync);
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
        match cli.command {
            Some(Commands::Ask { program, question }) => {
                assert_eq!(program.as_deref(), Some("ai"));
                assert_eq!(question.join(" "), "какие экзамены?");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn chat_is_the_default_command() {
        let cli = Cli::try_parse_from(["itmo-advisor"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "itmo-advisor",
            "--config",
            dir.path().join("missing.toml").to_str().unwrap(),
            "--data-dir",
            dir.path().to_str().unwrap(),
            "programs",
        ])
        .unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.data_dir, dir.path());
        assert_eq!(config.db_path, dir.path().join("itmo_advisor.db"));
    }

    #[test]
    fn program_codes_are_validated() {
        let config = AdvisorConfig::default();
        assert_eq!(
            checked_program(&config, Some(" AI_Product ".into())).unwrap(),
            Some("ai_product".to_string())
        );
        let err = checked_program(&config, Some("law".into())).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AdvisorError>(),
            Some(AdvisorError::UnknownProgram(code)) if code == "law"
        ));
        assert_eq!(checked_program(&config, None).unwrap(), None);
    }
}
