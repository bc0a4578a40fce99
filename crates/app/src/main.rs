use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use hooks_core::Clock;
use hooks_core::model::TopicCatalog;
use services::LearningHub;
use tracing_subscriber::EnvFilter;

/// Number of hook topics in the shipped content catalog.
const DEFAULT_TOPIC_COUNT: NonZeroUsize = NonZeroUsize::new(16).unwrap();

const DEFAULT_DB_PATH: &str = "hooks-progress.sqlite3";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidTopicCount { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidTopicCount { raw } => {
                write!(f, "invalid topic count (expected a positive integer): {raw}")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid database url: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- status    [--db <sqlite_url>] [--topics <n>]");
    eprintln!("  cargo run -p app -- bookmarks [--db <sqlite_url>] [--topics <n>]");
    eprintln!("  cargo run -p app -- reset     [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:{DEFAULT_DB_PATH}");
    eprintln!("  --topics {DEFAULT_TOPIC_COUNT}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  HOOKS_DB_URL, HOOKS_TOPIC_COUNT, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Status,
    Bookmarks,
    Reset,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "status" => Some(Self::Status),
            "bookmarks" => Some(Self::Bookmarks),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }
}

struct Args {
    db: DbTarget,
    topic_count: NonZeroUsize,
}

impl Args {
    /// Flags override the `HOOKS_*` variables looked up through `env`.
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut db = match env("HOOKS_DB_URL") {
            Some(raw) => DbTarget::parse(&raw)?,
            None => DbTarget::parse(DEFAULT_DB_PATH)?,
        };
        let mut topic_count = match env("HOOKS_TOPIC_COUNT") {
            Some(raw) => parse_topic_count(raw)?,
            None => DEFAULT_TOPIC_COUNT,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => db = DbTarget::parse(&require_value(args, "--db")?)?,
                "--topics" => topic_count = parse_topic_count(require_value(args, "--topics")?)?,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db, topic_count })
    }
}

fn parse_topic_count(raw: String) -> Result<NonZeroUsize, ArgsError> {
    let parsed = raw.trim().parse::<NonZeroUsize>();
    parsed.map_err(|_| ArgsError::InvalidTopicCount { raw })
}

/// Where the progress database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DbTarget {
    Memory,
    File(PathBuf),
}

impl DbTarget {
    /// Accepts `sqlite::memory:`, a `sqlite:` / `sqlite://` URL or a bare path.
    /// Relative paths resolve against the working directory.
    fn parse(raw: &str) -> Result<Self, ArgsError> {
        let trimmed = raw.trim();
        if trimmed == "sqlite::memory:" {
            return Ok(Self::Memory);
        }

        let path = trimmed
            .strip_prefix("sqlite://")
            .or_else(|| trimmed.strip_prefix("sqlite:"))
            .unwrap_or(trimmed);
        if path.is_empty() {
            return Err(ArgsError::InvalidDbUrl {
                raw: raw.to_string(),
            });
        }

        let path = Path::new(path);
        if path.is_absolute() {
            return Ok(Self::File(path.to_path_buf()));
        }
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Ok(Self::File(cwd.join(path)))
    }

    fn url(&self) -> String {
        match self {
            Self::Memory => "sqlite::memory:".to_string(),
            Self::File(path) => format!("sqlite://{}", path.display()),
        }
    }

    /// sqlx refuses to open a missing file, so create it (and its directory) up front.
    fn ensure_exists(&self) -> std::io::Result<()> {
        let Self::File(path) = self else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(())
    }
}

fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

fn print_status(hub: &LearningHub) {
    let progress = hub.progress();
    println!(
        "completed: {}/{} ({}%)",
        progress.records().completed_count(),
        progress.catalog().topic_count(),
        progress.completion_percentage()
    );
    println!("time spent: {}", format_duration(progress.total_time_spent()));
    println!(
        "settings: theme={} difficulty={} auto_save={}",
        hub.settings().theme(),
        hub.settings().difficulty(),
        hub.settings().auto_save()
    );
    for (id, record) in progress.records().iter() {
        let mark = if record.completed() { "x" } else { " " };
        let star = if record.bookmarked() { "*" } else { "" };
        println!(
            "  [{mark}] {id}{star} {}",
            format_duration(record.time_spent_secs())
        );
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Status,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Status,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let parsed = Args::parse(&mut argv.into_iter(), |key| std::env::var(key).ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    parsed.db.ensure_exists()?;
    let db_url = parsed.db.url();
    let catalog = TopicCatalog::with_count(parsed.topic_count);
    let mut hub = LearningHub::sqlite(&db_url, Clock::system(), catalog).await?;
    tracing::debug!(db = %db_url, ?cmd, "hub ready");

    match cmd {
        Command::Status => print_status(&hub),
        Command::Bookmarks => {
            for id in hub.progress().records().bookmarked() {
                println!("{id}");
            }
        }
        Command::Reset => {
            hub.progress_mut().reset_progress().await;
            println!("progress cleared");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_with_env(raw: &[&str], env: &[(&str, &str)]) -> Result<Args, ArgsError> {
        let env: Vec<(String, String)> = env
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Args::parse(&mut raw.iter().map(ToString::to_string), move |key| {
            env.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
        })
    }

    fn args(raw: &[&str]) -> Result<Args, ArgsError> {
        args_with_env(raw, &[])
    }

    #[test]
    fn parses_flags() {
        let parsed = args(&["--db", "sqlite::memory:", "--topics", "12"]).unwrap();
        assert_eq!(parsed.db, DbTarget::Memory);
        assert_eq!(parsed.topic_count.get(), 12);
    }

    #[test]
    fn defaults_without_env_or_flags() {
        let parsed = args(&[]).unwrap();
        assert_eq!(parsed.topic_count, DEFAULT_TOPIC_COUNT);
        assert!(parsed.db.url().ends_with(DEFAULT_DB_PATH));
    }

    #[test]
    fn zero_topics_is_rejected() {
        assert!(matches!(
            args(&["--topics", "0"]),
            Err(ArgsError::InvalidTopicCount { .. })
        ));
    }

    #[test]
    fn topic_count_from_env() {
        let parsed = args_with_env(&[], &[("HOOKS_TOPIC_COUNT", "20")]).unwrap();
        assert_eq!(parsed.topic_count.get(), 20);

        let parsed = args_with_env(&["--topics", "8"], &[("HOOKS_TOPIC_COUNT", "20")]).unwrap();
        assert_eq!(parsed.topic_count.get(), 8);
    }

    #[test]
    fn invalid_topic_count_in_env_is_rejected() {
        for bad in ["0", "twenty", ""] {
            assert!(matches!(
                args_with_env(&[], &[("HOOKS_TOPIC_COUNT", bad)]),
                Err(ArgsError::InvalidTopicCount { .. })
            ));
        }
    }

    #[test]
    fn blank_db_is_rejected() {
        assert!(matches!(
            args_with_env(&[], &[("HOOKS_DB_URL", "  ")]),
            Err(ArgsError::InvalidDbUrl { .. })
        ));
        assert!(matches!(
            args(&["--db", "sqlite://"]),
            Err(ArgsError::InvalidDbUrl { .. })
        ));
    }

    #[test]
    fn missing_value_is_reported() {
        assert!(matches!(
            args(&["--db"]),
            Err(ArgsError::MissingValue { flag: "--db" })
        ));
    }

    #[test]
    fn relative_paths_become_absolute_urls() {
        let target = DbTarget::parse("sqlite:data/progress.sqlite3").unwrap();
        let url = target.url();
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/progress.sqlite3"));

        let target = DbTarget::parse("sqlite:///tmp/hooks.sqlite3").unwrap();
        assert_eq!(target, DbTarget::File(PathBuf::from("/tmp/hooks.sqlite3")));
    }

    #[test]
    fn durations_are_compact() {
        assert_eq!(format_duration(42), "42s");
        assert_eq!(format_duration(125), "2m 5s");
        assert_eq!(format_duration(3_720), "1h 2m");
    }
}
