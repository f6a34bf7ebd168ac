use std::io;

use crate::app::Location;
use crate::catalog::QuestionCatalog;
use crate::catalog::question::{AnswerKind, CHOICE_LABELS, Question};
use crate::screens::crud::{self, Manager};
use crate::session::result::score_to_str;
use crate::store::{RecordStore, StoreError};
use crate::ui::console::{Console, Tone};
use crate::ui::table::{Page, fit};

impl Manager for QuestionCatalog {
    type Item = Question;

    fn store(&self) -> &RecordStore<Question> {
        QuestionCatalog::store(self)
    }

    fn store_mut(&mut self) -> &mut RecordStore<Question> {
        QuestionCatalog::store_mut(self)
    }

    fn width(&self) -> usize {
        QuestionCatalog::width(self)
    }

    fn page(&self, location: Location) -> Page {
        if location == Location::Statistics {
            self.statistics_page()
        } else {
            self.manager_page()
        }
    }

    fn handle_add(&mut self, console: &mut dyn Console) -> Result<(), StoreError> {
        let Some(question) = input_question(console, None)? else {
            return Ok(());
        };
        if console.confirm("Review question and decide if you want to save it (y/n):")? {
            crud::add_reported(self.store_mut(), question, console)?;
        }
        Ok(())
    }

    fn handle_edit(&mut self, console: &mut dyn Console) -> Result<(), StoreError> {
        let Some(id) = crud::ask_id(self.store(), console)? else {
            return Ok(());
        };
        let Some(current) = self.question(id).cloned() else {
            return Ok(());
        };
        let Some(question) = input_question(console, Some(&current))? else {
            return Ok(());
        };
        if console.confirm("Do you really want to update this question? (y/n):")? {
            self.store_mut().update_record(id, question)?;
        }
        Ok(())
    }

    fn handle_toggle(&mut self, console: &mut dyn Console) -> Result<(), StoreError> {
        let Some(id) = crud::ask_id(self.store(), console)? else {
            return Ok(());
        };
        let Some(mut question) = self.question(id).cloned() else {
            return Ok(());
        };
        let verb = if question.enabled { "disable" } else { "enable" };
        if console.confirm(&format!("Do you want to {verb} question nr. {id}? (y/n):"))? {
            question.enabled = !question.enabled;
            self.store_mut().update_record(id, question)?;
        }
        Ok(())
    }
}

impl QuestionCatalog {
    fn manager_page(&self) -> Page {
        let store = self.store();
        let provenance = store.provenance();
        let text_width = self.width().saturating_sub(33);
        Page {
            title: format!(
                "Questions manager for: {} (last updated {} by {})",
                self.topic(),
                provenance.saved_at,
                provenance.saved_by
            ),
            columns: format!(" ID  Type  {}  Flag     Status", fit("Question", text_width)),
            page_label: Page::page_label(store.current_page(), store.total_pages()),
            rows: store
                .page()
                .iter()
                .map(|(id, entry)| {
                    let question = &entry.record;
                    format!(
                        "{id:3}. {:<4}  {}  {:<8} {:<7}",
                        question.kind.short_label(),
                        fit(&question.text, text_width),
                        question.status_label(),
                        entry.status.as_str()
                    )
                })
                .collect(),
        }
    }

    fn statistics_page(&self) -> Page {
        let store = self.store();
        let text_width = self.width().saturating_sub(40);
        let range = store.page_range();
        let ranked = self.ranked_ids();
        let rows = ranked
            .iter()
            .enumerate()
            .skip(range.start)
            .take(range.len())
            .filter_map(|(rank, id)| {
                let question = self.question(*id)?;
                Some(format!(
                    "{:3}. [{id:3}] {} {:>8} / {:<4} {:<8}",
                    rank + 1,
                    fit(&question.text, text_width),
                    score_to_str(question.times_correct, question.times_asked),
                    question.times_asked,
                    question.status_label()
                ))
            })
            .collect();
        Page {
            title: format!("Statistics for: {}", self.topic()),
            columns: format!(
                "Rank  ID   {} Score / total",
                fit("Question", text_width + 1)
            ),
            page_label: Page::page_label(store.current_page(), store.total_pages()),
            rows,
        }
    }
}

/// Walk the operator through every field of a question.
///
/// With `current` set, an empty answer keeps the existing value. Returns
/// `None` as soon as the operator types "q".
pub fn input_question(
    console: &mut dyn Console,
    current: Option<&Question>,
) -> io::Result<Option<Question>> {
    let mut question = current
        .cloned()
        .unwrap_or_else(|| Question::free_form("", ""));
    let editing = current.is_some();

    if editing {
        console.say(
            Tone::Header,
            &format!("Current question type: {}", question.kind.description()),
        );
    }
    loop {
        let answer = console.ask_lower("Set the answer type - free-form or multiple choice? f/m:")?;
        if answer == "q" {
            return Ok(None);
        }
        if answer.is_empty() && editing {
            break;
        }
        if let Some(kind) = AnswerKind::from_code(&answer) {
            question.kind = kind;
            break;
        }
    }

    if editing {
        console.say(
            Tone::Header,
            &format!("Current question text: {}", question.text),
        );
    }
    loop {
        let answer = console.ask("Question text:")?;
        if answer.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        if !answer.is_empty() {
            question.text = answer;
            break;
        }
        if editing {
            break;
        }
    }

    match question.kind {
        AnswerKind::FreeForm => question.choices = Default::default(),
        AnswerKind::MultipleChoice => {
            for (label, choice) in CHOICE_LABELS.iter().zip(question.choices.iter_mut()) {
                if editing {
                    console.say(
                        Tone::Header,
                        &format!("Current text for choice {label}: {choice}"),
                    );
                }
                let answer = console.ask(&format!("Set text for choice {label}:"))?;
                if answer.eq_ignore_ascii_case("q") {
                    return Ok(None);
                }
                if !answer.is_empty() {
                    *choice = answer;
                }
            }
        }
    }

    if editing {
        console.say(
            Tone::Header,
            &format!("Current correct answer: {}", question.correct),
        );
    }
    loop {
        let answer = console.ask("Set correct answer:")?;
        if answer.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        let keep = answer.is_empty() && editing && !question.correct.is_empty();
        match question.kind {
            AnswerKind::MultipleChoice => {
                let label = answer.to_uppercase();
                if CHOICE_LABELS.contains(&label.as_str()) {
                    question.correct = label;
                    break;
                }
                if keep && CHOICE_LABELS.contains(&question.correct.as_str()) {
                    break;
                }
                console.warn("Please choose A, B, C or D.");
            }
            AnswerKind::FreeForm => {
                if !answer.is_empty() {
                    question.correct = answer;
                    break;
                }
                if keep {
                    break;
                }
            }
        }
    }

    Ok(Some(question))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{RecordStatus, StoreOptions};
    use crate::ui::console::ScriptedConsole;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use tempfile::TempDir;

    fn catalog(dir: &TempDir) -> QuestionCatalog {
        std::fs::write(
            dir.path().join("quiz.csv"),
            "ID;Type;Question;Answer_A;Answer_B;Answer_C;Answer_D;Correct;Flag;Asked;Answered\n\
             2;2024-01-01 08:00:00;admin;Unused;Unused;Unused;Unused;Unused;Unused;Unused;Unused\n\
             1;f;Two plus two;;;;;4;1;3;1\n\
             2;m;Red planet;Venus;Mars;Jupiter;Saturn;B;1;2;2\n",
        )
        .unwrap();
        let options = StoreOptions {
            data_dir: dir.path().to_path_buf(),
            delimiter: b';',
            rows_per_page: 10,
        };
        let mut console = ScriptedConsole::default();
        let store = RecordStore::open(options, "quiz", &mut console).unwrap();
        QuestionCatalog::from_store(store, SmallRng::seed_from_u64(1), 100)
    }

    #[test]
    fn add_multiple_choice_question_after_review() {
        let dir = TempDir::new().unwrap();
        let mut catalog = catalog(&dir);
        let mut console = ScriptedConsole::new([
            "m", "Largest planet", "Mars", "Jupiter", "Venus", "Pluto", "e", "b", "y",
        ]);
        catalog.handle_add(&mut console).unwrap();

        assert!(console.contains("Please choose A, B, C or D."));
        let question = catalog.question(3).unwrap();
        assert_eq!(question.kind, AnswerKind::MultipleChoice);
        assert_eq!(question.correct, "B");
        assert_eq!(question.choices[1], "Jupiter");
        assert!(question.enabled);
        assert_eq!((question.times_asked, question.times_correct), (0, 0));
        assert_eq!(catalog.store().entry(3).unwrap().status, RecordStatus::New);
    }

    #[test]
    fn q_in_any_field_cancels_without_mutation() {
        let dir = TempDir::new().unwrap();
        let mut catalog = catalog(&dir);
        let mut console = ScriptedConsole::new(["m", "Largest planet", "Mars", "q"]);
        catalog.handle_add(&mut console).unwrap();
        assert!(!catalog.store().is_dirty());
        assert_eq!(catalog.store().len(), 2);
    }

    #[test]
    fn edit_keeps_blank_fields_and_clears_choices_for_free_form() {
        let dir = TempDir::new().unwrap();
        let mut catalog = catalog(&dir);
        let mut console = ScriptedConsole::new(["2", "f", "", "mars", "y"]);
        catalog.handle_edit(&mut console).unwrap();
        let question = catalog.question(2).unwrap();
        assert_eq!(question.kind, AnswerKind::FreeForm);
        assert_eq!(question.text, "Red planet");
        assert_eq!(question.correct, "mars");
        assert!(question.choices.iter().all(String::is_empty));
        assert_eq!((question.times_asked, question.times_correct), (2, 2));
    }

    #[test]
    fn toggle_flips_enabled_flag() {
        let dir = TempDir::new().unwrap();
        let mut catalog = catalog(&dir);
        let mut console = ScriptedConsole::new(["1", "y"]);
        catalog.handle_toggle(&mut console).unwrap();
        assert!(console.contains("Do you want to disable question nr. 1? (y/n):"));
        assert!(!catalog.question(1).unwrap().enabled);
        assert_eq!(
            catalog.store().entry(1).unwrap().status,
            RecordStatus::Updated
        );
    }

    #[test]
    fn statistics_page_is_ranked_by_success() {
        let dir = TempDir::new().unwrap();
        let catalog = catalog(&dir);
        let page = catalog.page(Location::Statistics);
        assert_eq!(page.rows.len(), 2);
        assert!(page.rows[0].starts_with("  1. [  2] Red planet"));
        assert!(page.rows[0].contains("100.0 %"));
        assert!(page.rows[1].contains("33.3 %"));

        let manager = catalog.page(Location::QuestionManager);
        assert!(manager.rows[0].starts_with("  1. Free  Two plus two"));
        assert!(manager.title.contains("quiz"));
    }
}
