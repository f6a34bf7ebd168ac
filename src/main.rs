use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use quizdesk::app::{App, Context};
use quizdesk::catalog::QuestionCatalog;
use quizdesk::catalog::question::Question;
use quizdesk::config::Config;
use quizdesk::roster::UserRoster;
use quizdesk::store::RecordStore;
use quizdesk::ui::console::{Console, TerminalConsole, Tone};

#[derive(Parser)]
#[command(name = "quizdesk", version, about = "Terminal quiz manager with adaptive practice")]
struct Cli {
    #[arg(short, long, help = "Directory holding the question and user files")]
    data_dir: Option<PathBuf>,

    #[arg(short, long, help = "Topic to load at startup")]
    topic: Option<String>,

    #[arg(short, long, help = "Log in as this user instead of prompting")]
    user: Option<String>,

    #[arg(short, long, help = "Rows per page in record screens")]
    rows: Option<usize>,

    #[arg(short, long, help = "Path to the config file")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => Config::load().unwrap_or_default(),
    };
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir.to_string_lossy().to_string();
    }
    if let Some(topic) = cli.topic {
        config.default_topic = topic;
    }
    if let Some(rows) = cli.rows {
        config.rows_per_page = rows;
    }
    config.validate();

    fs::create_dir_all(config.data_path())
        .with_context(|| format!("creating data directory {}", config.data_dir))?;
    init_logging(&config)?;
    info!(data_dir = %config.data_dir, topic = %config.default_topic, "starting");
    if cli.config.is_none() && !Config::config_path().exists() {
        if let Err(err) = Config::default().save() {
            warn!(error = %err, "could not write default config");
        }
    }

    let options = config.store_options();
    UserRoster::bootstrap(&options, &config.user_file)?;
    RecordStore::<Question>::create_if_missing(&options, &config.default_topic)?;

    let mut console = TerminalConsole::new(config.colors.clone());
    let users = UserRoster::open(
        options.clone(),
        &config.user_file,
        config.user_width,
        &mut console,
    )?;

    let actor = match &cli.user {
        Some(name) => {
            let actor = users.actor_for(name);
            if actor.is_none() {
                warn!(user = %name, "unknown user on command line");
                console.warn(&format!("Unknown user: {name}"));
            }
            actor
        }
        None => users.login(&mut console)?,
    };
    let Some(actor) = actor else {
        say_goodbye(&mut console);
        return Ok(());
    };

    let questions = QuestionCatalog::open(
        options,
        &config.default_topic,
        config.question_width,
        &mut console,
    )?;
    let mut app = App::new(users, questions, Context { actor, config });
    app.run(&mut console)?;

    say_goodbye(&mut console);
    info!("exiting");
    Ok(())
}

fn init_logging(config: &Config) -> Result<()> {
    let log_path = config.log_path();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("opening log file {}", log_path.display()))?;
    let filter =
        EnvFilter::try_from_env("QUIZDESK_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn say_goodbye(console: &mut dyn Console) {
    console.clear();
    console.say(Tone::Header, "Thank you and goodbye!");
}
