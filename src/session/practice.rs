use tracing::info;

use crate::app::Transition;
use crate::catalog::QuestionCatalog;
use crate::roster::Actor;
use crate::session::result::Tally;
use crate::session::{read_answer, show_question};
use crate::store::{SaveMode, StoreError};
use crate::ui::console::{Console, Tone};
use crate::ui::table::heading;

/// Adaptive practice. Questions are drawn one at a time, weighted towards
/// the ones answered badly, until the operator quits.
///
/// Statistics are always written back without asking, even if the session
/// ended on an error.
pub fn run(
    catalog: &mut QuestionCatalog,
    actor: &Actor,
    console: &mut dyn Console,
) -> Result<Transition, StoreError> {
    let rounds = play_rounds(catalog, console);
    catalog.store_mut().save(&actor.name, SaveMode::Silent)?;
    let tally = rounds?;

    info!(
        topic = %catalog.topic(),
        user = %actor.name,
        correct = tally.correct,
        attempted = tally.attempted,
        "practice finished"
    );
    heading(
        console,
        catalog.width(),
        &format!("Practise test: {}", catalog.topic()),
        None,
    );
    console.pause(&format!(
        "Your final score is: {} answered correctly.",
        tally.summary()
    ))?;
    Ok(Transition::MAIN_MENU)
}

fn play_rounds(
    catalog: &mut QuestionCatalog,
    console: &mut dyn Console,
) -> Result<Tally, StoreError> {
    let mut tally = Tally::default();
    loop {
        heading(
            console,
            catalog.width(),
            &format!("Practise test: {}", catalog.topic()),
            Some(format!("Current score: {}", tally.summary())),
        );

        let Some(id) = catalog.pick_adaptive() else {
            console.warn("There are no enabled questions in this topic.");
            return Ok(tally);
        };
        let Some(question) = catalog.question(id).cloned() else {
            return Ok(tally);
        };
        show_question(console, catalog.width(), None, &question);

        let Some(answer) = read_answer(console, &question, true)? else {
            return Ok(tally);
        };
        let correct = catalog.record_answer(id, &answer)?;
        tally.record(correct);

        if correct {
            console.say(Tone::Normal, "Correct answer. Congrats!");
        } else {
            console.say(Tone::Warning, "Wrong!!! Yikes!");
            console.say(
                Tone::Normal,
                &format!("The correct answer is: {}", question.correct),
            );
        }
        if console.ask_lower("Press Enter to continue or q to quit.")? == "q" {
            return Ok(tally);
        }
    }
}
