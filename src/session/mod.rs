pub mod exam;
pub mod practice;
pub mod result;

use std::io;

use crate::catalog::question::{AnswerKind, CHOICE_LABELS, Question};
use crate::ui::console::{Console, Tone};

/// Print a question and, for multiple choice, its labelled choices.
pub fn show_question(
    console: &mut dyn Console,
    width: usize,
    number: Option<usize>,
    question: &Question,
) {
    let label = match number {
        Some(n) => format!("Question {n}"),
        None => "Question".to_string(),
    };
    console.say(Tone::Normal, &format!("{label}: {}", question.text));
    if question.kind == AnswerKind::MultipleChoice {
        for (choice_label, choice) in CHOICE_LABELS.iter().zip(&question.choices) {
            console.say(Tone::Normal, &format!("({choice_label}) {choice}"));
        }
    }
    console.say(Tone::Normal, &"─".repeat(width));
}

/// Read an answer in the form the question expects. Multiple choice only
/// accepts A to D. `None` means the operator quit, if quitting is allowed.
pub fn read_answer(
    console: &mut dyn Console,
    question: &Question,
    allow_quit: bool,
) -> io::Result<Option<String>> {
    match question.kind {
        AnswerKind::MultipleChoice => {
            let prompt = if allow_quit {
                "Choose A, B, C or D, (or q to quit):"
            } else {
                "Choose A, B, C or D:"
            };
            loop {
                let answer = console.ask_upper(prompt)?;
                if allow_quit && answer == "Q" {
                    return Ok(None);
                }
                if CHOICE_LABELS.contains(&answer.as_str()) {
                    return Ok(Some(answer));
                }
            }
        }
        AnswerKind::FreeForm => {
            let prompt = if allow_quit {
                "Your answer (or q to quit):"
            } else {
                "Your answer:"
            };
            let answer = console.ask(prompt)?;
            if allow_quit && answer.eq_ignore_ascii_case("q") {
                return Ok(None);
            }
            Ok(Some(answer))
        }
    }
}
