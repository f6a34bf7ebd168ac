use std::fs;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tempfile::TempDir;

use quizdesk::app::{Action, App, Context, Location, Transition};
use quizdesk::catalog::QuestionCatalog;
use quizdesk::catalog::question::Question;
use quizdesk::config::Config;
use quizdesk::roster::UserRoster;
use quizdesk::store::{RecordStatus, RecordStore, StoreError};
use quizdesk::ui::console::ScriptedConsole;

const QUESTION_HEADER: &str =
    "ID;Type;Question;Answer_A;Answer_B;Answer_C;Answer_D;Correct;Flag;Asked;Answered";

struct Fixture {
    dir: TempDir,
    config: Config,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: dir.path().to_string_lossy().to_string(),
            default_topic: "general".to_string(),
            rows_per_page: 5,
            min_enabled_questions: 2,
            ..Config::default()
        };
        let fixture = Self { dir, config };
        fixture.write(
            "users.csv",
            "ID;Name;Type\n3;2024-01-01 08:00:00;setup\n1;admin;admin\n2;bob;user\n3;carol;user\n",
        );
        fixture.write_topic(
            "general",
            2,
            &["1;f;Say yes;;;;;yes;1;0;0", "2;f;Say yes again;;;;;yes;1;0;0"],
        );
        fixture
    }

    fn write(&self, name: &str, body: &str) {
        fs::write(self.dir.path().join(name), body).unwrap();
    }

    fn write_topic(&self, topic: &str, issued: u32, rows: &[&str]) {
        let mut body = format!(
            "{QUESTION_HEADER}\n{issued};2024-01-01 08:00:00;admin{}\n",
            ";Unused".repeat(8)
        );
        for row in rows {
            body.push_str(row);
            body.push('\n');
        }
        self.write(&format!("{topic}.csv"), &body);
    }

    fn app(&self, user: &str) -> App {
        let mut console = ScriptedConsole::default();
        let options = self.config.store_options();
        let users = UserRoster::open(options.clone(), "users", 70, &mut console).unwrap();
        let actor = users.actor_for(user).unwrap();
        let store = RecordStore::open(options, "general", &mut console).unwrap();
        let questions = QuestionCatalog::from_store(store, SmallRng::seed_from_u64(9), 100);
        App::new(
            users,
            questions,
            Context {
                actor,
                config: self.config.clone(),
            },
        )
    }

    fn reload_questions(&self, topic: &str) -> RecordStore<Question> {
        let mut console = ScriptedConsole::default();
        RecordStore::open(self.config.store_options(), topic, &mut console).unwrap()
    }
}

fn step(app: &mut App, console: &mut ScriptedConsole) -> Transition {
    app.step(console).unwrap()
}

#[test]
fn added_question_survives_cancel_and_lands_on_confirm() {
    let fixture = Fixture::new();
    let mut app = fixture.app("admin");
    let mut console = ScriptedConsole::new([
        "M", "A", "f", "What is three?", "three", "y", "S", "c", "S", "y", "",
    ]);

    assert_eq!(
        step(&mut app, &mut console),
        Transition::view(Location::QuestionManager)
    );
    assert_eq!(
        step(&mut app, &mut console),
        Transition::new(Location::QuestionManager, Action::Add)
    );
    assert_eq!(
        step(&mut app, &mut console),
        Transition::view(Location::QuestionManager)
    );
    assert_eq!(
        step(&mut app, &mut console),
        Transition::new(Location::QuestionManager, Action::Save)
    );

    // cancel keeps the operator on the screen with everything pending
    assert_eq!(
        step(&mut app, &mut console),
        Transition::view(Location::QuestionManager)
    );
    let store = app.questions().store();
    assert!(store.is_dirty());
    assert_eq!(store.len(), 3);
    assert_eq!(store.entry(3).unwrap().status, RecordStatus::New);
    assert_eq!(fixture.reload_questions("general").len(), 2);

    assert_eq!(
        step(&mut app, &mut console),
        Transition::new(Location::QuestionManager, Action::Save)
    );
    assert_eq!(step(&mut app, &mut console), Transition::MAIN_MENU);
    assert!(!app.questions().store().is_dirty());

    let reloaded = fixture.reload_questions("general");
    assert_eq!(reloaded.len(), 3);
    assert_eq!(reloaded.provenance().issued, 3);
    assert_eq!(reloaded.provenance().saved_by, "admin");
    assert_eq!(reloaded.get(3).unwrap().text, "What is three?");
    assert_eq!(console.remaining(), 0);
}

#[test]
fn first_administrator_cannot_be_deleted_through_the_screen() {
    let fixture = Fixture::new();
    let mut app = fixture.app("admin");
    let mut console = ScriptedConsole::new(["U", "D", "1", "", "Q"]);

    assert_eq!(
        step(&mut app, &mut console),
        Transition::view(Location::UserManager)
    );
    assert_eq!(
        step(&mut app, &mut console),
        Transition::new(Location::UserManager, Action::Delete)
    );
    assert_eq!(
        step(&mut app, &mut console),
        Transition::view(Location::UserManager)
    );
    assert_eq!(step(&mut app, &mut console), Transition::MAIN_MENU);

    let users = app.users().store();
    assert!(!users.is_dirty());
    assert_eq!(users.entry(1).unwrap().status, RecordStatus::Active);
}

#[test]
fn deleted_user_is_purged_on_save() {
    let fixture = Fixture::new();
    let mut app = fixture.app("admin");
    let mut console = ScriptedConsole::new(["U", "D", "3", "y", "Q", "y", ""]);
    for _ in 0..5 {
        step(&mut app, &mut console);
    }
    assert_eq!(app.current(), Transition::MAIN_MENU);
    assert_eq!(app.users().store().ids(), vec![1, 2]);

    let content = fs::read_to_string(fixture.dir.path().join("users.csv")).unwrap();
    assert!(!content.contains("carol"));
    assert!(content.lines().nth(1).unwrap().starts_with("3;"));
}

#[test]
fn invalid_keys_are_rejected_in_place() {
    let fixture = Fixture::new();
    let mut app = fixture.app("admin");
    let mut console = ScriptedConsole::new(["U", "Z", "X", "NN", "N"]);

    step(&mut app, &mut console);
    assert_eq!(
        step(&mut app, &mut console),
        Transition::view(Location::UserManager)
    );
    assert_eq!(console.remaining(), 0);
    assert!(console.contains("Please enter a valid action key."));
}

#[test]
fn standard_users_are_kept_out_of_management_screens() {
    let fixture = Fixture::new();
    let mut app = fixture.app("bob");
    let mut console = ScriptedConsole::new(["M", "", "U", ""]);

    assert_eq!(step(&mut app, &mut console), Transition::MAIN_MENU);
    assert_eq!(step(&mut app, &mut console), Transition::MAIN_MENU);
    assert!(console.contains("You have no permission to use this feature. Press enter to continue."));
}

#[test]
fn editing_own_record_updates_the_logged_in_actor() {
    let fixture = Fixture::new();
    let mut app = fixture.app("admin");
    let mut console = ScriptedConsole::new([
        "U", "E", "1", "root", "u", "y", "S", "y", "", "U", "",
    ]);

    step(&mut app, &mut console);
    step(&mut app, &mut console);
    assert_eq!(
        step(&mut app, &mut console),
        Transition::view(Location::UserManager)
    );
    assert_eq!(app.context().actor.name, "root");
    assert!(!app.context().actor.is_admin());

    step(&mut app, &mut console);
    assert_eq!(step(&mut app, &mut console), Transition::MAIN_MENU);
    let content = fs::read_to_string(fixture.dir.path().join("users.csv")).unwrap();
    assert!(content.lines().nth(1).unwrap().ends_with(";root"));
    assert_eq!(content.lines().nth(2).unwrap(), "1;root;user");

    assert_eq!(step(&mut app, &mut console), Transition::MAIN_MENU);
    assert!(console.contains("You have no permission to use this feature."));
    assert_eq!(console.remaining(), 0);
}

#[test]
fn quiz_screens_need_enough_enabled_questions() {
    let fixture = Fixture::new();
    fixture.write_topic(
        "general",
        2,
        &["1;f;Say yes;;;;;yes;1;0;0", "2;f;Say no;;;;;no;0;0;0"],
    );
    let mut app = fixture.app("bob");
    let mut console = ScriptedConsole::new(["P", "", "S", ""]);

    assert_eq!(step(&mut app, &mut console), Transition::MAIN_MENU);
    assert_eq!(step(&mut app, &mut console), Transition::MAIN_MENU);
    assert!(console.contains("You cannot use this feature as there are too few questions available."));
}

#[test]
fn practice_always_writes_statistics_back() {
    let fixture = Fixture::new();
    let mut app = fixture.app("bob");
    let mut console = ScriptedConsole::new(["P", "yes", "", "nope", "q", ""]);

    assert_eq!(
        step(&mut app, &mut console),
        Transition::view(Location::Practice)
    );
    assert_eq!(step(&mut app, &mut console), Transition::MAIN_MENU);
    assert!(console.contains("Your final score is: 1 of 2 = 50.0 % answered correctly."));
    assert!(!app.questions().store().is_dirty());

    let reloaded = fixture.reload_questions("general");
    let (asked, correct) = reloaded.iter().fold((0, 0), |(a, c), (_, entry)| {
        (a + entry.record.times_asked, c + entry.record.times_correct)
    });
    assert_eq!((asked, correct), (2, 1));
    assert_eq!(reloaded.provenance().saved_by, "bob");
}

#[test]
fn quitting_practice_immediately_still_saves() {
    let fixture = Fixture::new();
    let mut app = fixture.app("carol");
    let mut console = ScriptedConsole::new(["P", "q", ""]);
    step(&mut app, &mut console);
    assert_eq!(step(&mut app, &mut console), Transition::MAIN_MENU);
    assert_eq!(fixture.reload_questions("general").provenance().saved_by, "carol");
}

#[test]
fn test_session_logs_result_without_saving_catalog() {
    let fixture = Fixture::new();
    let mut app = fixture.app("bob");
    let mut console = ScriptedConsole::new(["T", "5", "abc", "2", "yes", "", "no", "", ""]);

    assert_eq!(
        step(&mut app, &mut console),
        Transition::view(Location::Test)
    );
    assert_eq!(step(&mut app, &mut console), Transition::MAIN_MENU);
    assert!(console.contains("5 questions requested but only 2 are enabled"));

    let log = fs::read_to_string(fixture.config.results_path()).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("general"));
    assert!(lines[0].contains("bob"));
    assert!(lines[0].ends_with(" 50.0 %"));

    assert!(app.questions().store().is_dirty());
    let on_disk = fixture.reload_questions("general");
    assert!(on_disk.iter().all(|(_, e)| e.record.times_asked == 0));
}

#[test]
fn topic_switch_respects_pending_changes() {
    let fixture = Fixture::new();
    fixture.write_topic("math", 1, &["1;m;Pick B;a;b;c;d;B;1;0;0"]);
    let mut app = fixture.app("admin");
    let mut console = ScriptedConsole::new([
        // a test leaves statistics pending in memory
        "T", "1", "yes", "", "",
        // switching asks first; cancel keeps the current topic
        "C", "7", "2", "c",
        // discarding reloads and then switches
        "C", "2", "n",
    ]);

    step(&mut app, &mut console);
    step(&mut app, &mut console);
    assert!(app.questions().store().is_dirty());

    step(&mut app, &mut console);
    assert_eq!(step(&mut app, &mut console), Transition::MAIN_MENU);
    assert_eq!(app.questions().topic(), "general");
    assert!(console.contains("Please choose a valid topic ID."));

    step(&mut app, &mut console);
    assert_eq!(step(&mut app, &mut console), Transition::MAIN_MENU);
    assert_eq!(app.questions().topic(), "math");
    assert_eq!(app.questions().store().len(), 1);
    assert!(!app.questions().store().is_dirty());
}

#[test]
fn aborting_a_malformed_topic_load_is_an_error() {
    let fixture = Fixture::new();
    fixture.write_topic("broken", 1, &["x;f;Bad id;;;;;a;1;0;0"]);
    let mut app = fixture.app("admin");
    let mut console = ScriptedConsole::new(["C", "1", "a"]);

    step(&mut app, &mut console);
    let err = app.step(&mut console).unwrap_err();
    assert!(matches!(err, StoreError::Aborted { row: 2, .. }));
    assert_eq!(app.questions().topic(), "general");
}

#[test]
fn statistics_pages_and_returns_to_menu() {
    let fixture = Fixture::new();
    let rows: Vec<String> = (1..=7)
        .map(|id| format!("{id};f;Question {id};;;;;a;1;{id};1"))
        .collect();
    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
    fixture.write_topic("general", 7, &rows);
    let mut app = fixture.app("bob");
    let mut console = ScriptedConsole::new(["S", "L", "N", "F", "Q"]);

    assert_eq!(
        step(&mut app, &mut console),
        Transition::view(Location::Statistics)
    );
    step(&mut app, &mut console);
    assert_eq!(app.questions().store().current_page(), 2);
    step(&mut app, &mut console);
    assert_eq!(app.questions().store().current_page(), 2);
    step(&mut app, &mut console);
    assert_eq!(app.questions().store().current_page(), 1);
    step(&mut app, &mut console);
    assert_eq!(app.current(), Transition::MAIN_MENU);
    assert!(console.contains("Statistics for: general"));
    assert!(console.contains("  1. [  1] Question 1"));
}

#[test]
fn quit_needs_confirmation() {
    let fixture = Fixture::new();
    let mut app = fixture.app("bob");
    let mut console = ScriptedConsole::new(["Q", "n", "Q", "y"]);

    assert_eq!(step(&mut app, &mut console), Transition::view(Location::Quit));
    assert_eq!(step(&mut app, &mut console), Transition::MAIN_MENU);
    app.run(&mut console).unwrap();
    assert!(app.current().is_terminal());
    assert_eq!(console.remaining(), 0);
}
