use tracing::info;

use crate::app::Transition;
use crate::catalog::QuestionCatalog;
use crate::roster::Actor;
use crate::session::result::{ResultsLog, Tally, TestResult};
use crate::session::{read_answer, show_question};
use crate::store::{RecordId, StoreError};
use crate::ui::console::{Console, Tone};
use crate::ui::table::heading;

/// A fixed-length test over distinct, uniformly drawn questions.
///
/// Answers update the question statistics in memory only; the score goes to
/// the results log.
pub fn run(
    catalog: &mut QuestionCatalog,
    results: &ResultsLog,
    actor: &Actor,
    console: &mut dyn Console,
) -> Result<Transition, StoreError> {
    let title = format!("Test: {}", catalog.topic());
    heading(console, catalog.width(), &title, None);

    let Some(ids) = ask_questions(catalog, console)? else {
        return Ok(Transition::MAIN_MENU);
    };

    let mut tally = Tally::default();
    for (idx, id) in ids.iter().enumerate() {
        let number = idx + 1;
        heading(
            console,
            catalog.width(),
            &format!("{title} (question nr. {number})"),
            Some(format!("Current score: {}", tally.summary())),
        );
        let Some(question) = catalog.question(*id).cloned() else {
            continue;
        };
        show_question(console, catalog.width(), Some(number), &question);

        let answer = read_answer(console, &question, false)?.unwrap_or_default();
        let correct = catalog.record_answer(*id, &answer)?;
        tally.record(correct);
        if correct {
            console.say(Tone::Normal, "Correct.");
        } else {
            console.say(Tone::Warning, "Wrong.");
        }
        console.pause("Press Enter to continue.")?;
    }

    results.append(&TestResult::new(catalog.topic(), &actor.name, tally))?;
    info!(
        topic = %catalog.topic(),
        user = %actor.name,
        correct = tally.correct,
        attempted = tally.attempted,
        "test finished"
    );

    heading(console, catalog.width(), &title, None);
    console.pause(&format!(
        "Your final score is: {} answered correctly.",
        tally.summary()
    ))?;
    Ok(Transition::MAIN_MENU)
}

/// Prompt for the test length until the catalog can supply it.
fn ask_questions(
    catalog: &mut QuestionCatalog,
    console: &mut dyn Console,
) -> Result<Option<Vec<RecordId>>, StoreError> {
    let available = catalog.enabled_count();
    let prompt = format!("Please choose between 1 and {available} or q + enter to quit:");
    loop {
        console.say(Tone::Input, "How many test questions do you want to include?");
        let answer = console.ask_lower(&prompt)?;
        if answer == "q" {
            return Ok(None);
        }
        let Ok(count) = answer.parse::<usize>() else {
            console.warn(&prompt);
            continue;
        };
        match catalog.sample(count) {
            Ok(ids) => return Ok(Some(ids)),
            Err(err) => console.warn(&format!("{err}. {prompt}")),
        }
    }
}
