use std::fs;
use std::path::Path;

use tracing::warn;

use crate::app::{Context, Transition};
use crate::catalog::QuestionCatalog;
use crate::store::{SaveMode, StoreError};
use crate::ui::console::{Console, Tone};

/// Topic names: every `.csv` file in `data_dir` except the user roster, sorted.
pub fn list_topics(data_dir: &Path, user_file: &str) -> std::io::Result<Vec<String>> {
    let mut topics: Vec<String> = fs::read_dir(data_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
        .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().to_string()))
        .filter(|name| name != user_file)
        .collect();
    topics.sort();
    Ok(topics)
}

/// Let the operator pick another question file. Pending edits to the
/// current topic go through the usual save prompt first.
pub fn choose_topic(
    catalog: &mut QuestionCatalog,
    context: &Context,
    console: &mut dyn Console,
) -> Result<Transition, StoreError> {
    let config = &context.config;
    let topics = list_topics(&config.data_path(), &config.user_file)?;

    console.clear();
    console.say(Tone::Header, "These are our topics:");
    for (idx, topic) in topics.iter().enumerate() {
        console.say(Tone::Normal, &format!("{} - {topic}", idx + 1));
    }

    let topic = loop {
        let answer = console.ask_lower("Enter topic ID (or q to cancel):")?;
        if answer == "q" {
            return Ok(Transition::MAIN_MENU);
        }
        match answer.parse::<usize>() {
            Ok(n) if (1..=topics.len()).contains(&n) => break &topics[n - 1],
            _ => console.warn("Please choose a valid topic ID."),
        }
    };

    if catalog.store().is_dirty() {
        let outcome = catalog
            .store_mut()
            .save(&context.actor.name, SaveMode::Interactive(console))?;
        if !outcome.is_success() {
            warn!(topic = %catalog.topic(), "topic switch cancelled with pending changes");
            return Ok(Transition::MAIN_MENU);
        }
    }
    catalog.switch_topic(config.store_options(), topic, console)?;
    Ok(Transition::MAIN_MENU)
}
