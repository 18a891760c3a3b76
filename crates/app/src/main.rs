use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use course_core::GateOptions;
use services::{Clock, ProgressService, load_course};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

mod command;
mod config;
mod render;
mod runner;

use command::Command;
use config::AppConfig;
use runner::{Flow, Runner};

/// Work through a course from the terminal, one command per line.
#[derive(Debug, Parser)]
#[command(name = "course-runner", version)]
struct Cli {
    /// Course content JSON exported by the authoring system.
    #[arg(long)]
    course: PathBuf,

    /// Config file [default: <config dir>/course-runner/config.toml].
    #[arg(long)]
    config: Option<PathBuf>,

    /// Progress database URL. Overrides `database_url` from the config file.
    #[arg(long, env = "COURSE_DB_URL")]
    db: Option<String>,

    /// Start a new attempt instead of resuming the latest one.
    #[arg(long)]
    new_attempt: bool,

    /// Any revealed answer completes a lesson, right or wrong.
    #[arg(long)]
    lenient: bool,

    /// Open scenarios before every lesson is complete.
    #[arg(long)]
    unlocked: bool,
}

impl Cli {
    fn gate_options(&self, mut options: GateOptions) -> GateOptions {
        if self.lenient {
            options.require_correct_to_complete = false;
        }
        if self.unlocked {
            options.lock_scenarios_until_lessons_done = false;
        }
        options
    }

    fn database_url(&self, config: &AppConfig) -> String {
        let raw = self
            .db
            .clone()
            .or_else(|| config.database_url.clone())
            .unwrap_or_else(default_database_url);
        normalize_sqlite_url(raw)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();
}

fn default_database_url() -> String {
    let data_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    let path = data_dir.join("course-runner").join("progress.sqlite3");
    format!("sqlite://{}", path.display())
}

fn normalize_sqlite_url(raw: String) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:"
        || trimmed.starts_with("sqlite://")
        || trimmed.starts_with("sqlite:file:")
    {
        return trimmed.to_string();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Create the database file and its parent directory so `SQLite` can open it.
fn prepare_sqlite_file(db_url: &str) -> anyhow::Result<()> {
    let Some(path) = db_url.strip_prefix("sqlite://") else {
        // In-memory and `file:` URLs manage themselves.
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    anyhow::ensure!(!path.is_empty(), "invalid database url: {db_url}");

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("creating {}", path.display()))?;
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_path);
    let config = AppConfig::load_from(&config_path)?;
    let options = cli.gate_options(config.gate);
    let db_url = cli.database_url(&config);
    tracing::debug!(?options, db = %db_url, "resolved settings");

    let content = Arc::new(load_course(&cli.course)?);
    prepare_sqlite_file(&db_url)?;
    let service = ProgressService::new_sqlite(&db_url, Clock::default(), options).await?;
    let engine = if cli.new_attempt {
        service.start(content).await?
    } else {
        service.resume(content).await?
    };

    let mut runner = Runner::new(service, engine);
    let mut out = std::io::stdout();
    render::status(runner.engine(), &mut out)?;
    writeln!(out, "(type `help` for commands)")?;
    out.flush()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Command>() {
            Ok(command) => {
                if runner.execute(command, &mut out).await? == Flow::Quit {
                    break;
                }
            }
            Err(err) => writeln!(out, "{err}")?,
        }
        out.flush()?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();
    run(cli).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("course-runner").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn flags_relax_configured_gate() {
        let parsed = cli(&["--course", "c.json", "--lenient"]);
        let options = parsed.gate_options(GateOptions::default());
        assert!(!options.require_correct_to_complete);
        assert!(options.lock_scenarios_until_lessons_done);

        let parsed = cli(&["--course", "c.json", "--unlocked"]);
        assert_eq!(
            parsed.gate_options(GateOptions::default()),
            GateOptions {
                lock_scenarios_until_lessons_done: false,
                ..GateOptions::default()
            }
        );
    }

    #[test]
    fn db_flag_wins_over_config() {
        let config = AppConfig {
            database_url: Some("sqlite::memory:".into()),
            ..AppConfig::default()
        };
        let parsed = cli(&["--course", "c.json", "--db", "sqlite:file:x?mode=memory"]);
        assert_eq!(parsed.database_url(&config), "sqlite:file:x?mode=memory");
    }

    #[test]
    fn course_flag_is_required() {
        assert!(Cli::try_parse_from(["course-runner"]).is_err());
    }

    #[test]
    fn relative_paths_become_absolute_urls() {
        let url = normalize_sqlite_url("sqlite:progress.db".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("/progress.db"));
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
    }

    #[test]
    fn prepare_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("progress.sqlite3");
        prepare_sqlite_file(&format!("sqlite://{}", path.display())).unwrap();
        assert!(path.exists());
        prepare_sqlite_file("sqlite::memory:").unwrap();
    }
}
